use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use url::Url;

use quiz_core::model::QuestionId;

/// Outcome of probing a single image. Failure is data, never an error:
/// a broken image degrades the presentation and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageProbe {
    Displayed,
    Failed,
}

/// A finished image load, tagged with the question it belongs to.
///
/// Probes resolve independently and in any order; the tag lets the
/// presentation side drop results that arrive after the session has
/// already advanced past the question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEvent {
    pub question_id: QuestionId,
    pub index: usize,
    pub probe: ImageProbe,
}

/// Resolves whether an image URL is renderable.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn probe(&self, url: &Url) -> ImageProbe;
}

/// Probes images over HTTP: a successful response carrying an `image/*`
/// content type counts as displayed, anything else as failed.
#[derive(Clone, Default)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn probe(&self, url: &Url) -> ImageProbe {
        let Ok(response) = self.client.get(url.clone()).send().await else {
            return ImageProbe::Failed;
        };
        if !response.status().is_success() {
            return ImageProbe::Failed;
        }
        let is_image = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("image/"));
        if is_image {
            ImageProbe::Displayed
        } else {
            ImageProbe::Failed
        }
    }
}

/// Offline fetcher for tests and demos: every URL displays unless it was
/// registered as failing.
#[derive(Clone, Default)]
pub struct ScriptedImageFetcher {
    failing: HashSet<Url>,
}

impl ScriptedImageFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing_on(mut self, url: Url) -> Self {
        self.failing.insert(url);
        self
    }
}

#[async_trait]
impl ImageFetcher for ScriptedImageFetcher {
    async fn probe(&self, url: &Url) -> ImageProbe {
        if self.failing.contains(url) {
            ImageProbe::Failed
        } else {
            ImageProbe::Displayed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_fetcher_fails_only_registered_urls() {
        let bad = Url::parse("https://example.org/b.jpg").unwrap();
        let good = Url::parse("https://example.org/a.jpg").unwrap();
        let fetcher = ScriptedImageFetcher::new().failing_on(bad.clone());

        assert_eq!(fetcher.probe(&good).await, ImageProbe::Displayed);
        assert_eq!(fetcher.probe(&bad).await, ImageProbe::Failed);
    }
}
