use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use quiz_core::model::{Question, QuestionDraft};

use crate::error::{CorpusLoadError, QuestionFetchError};
use crate::question_source::{CorpusSelector, QuestionSource};

/// HTTP client for a quiz backend speaking the corpus/question contract:
/// `POST /api/load-csv` or `POST /api/load-csv-data` to prime a corpus,
/// `GET /api/quiz-question` for the next question.
///
/// Timeouts are left to the transport; configure them on the injected
/// [`reqwest::Client`] if needed.
#[derive(Clone)]
pub struct HttpQuestionSource {
    client: Client,
    base_url: String,
}

impl HttpQuestionSource {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn prime(&self, selector: &CorpusSelector) -> Result<(), CorpusLoadError> {
        let request = match selector {
            CorpusSelector::Named(path) => self
                .client
                .post(self.endpoint("api/load-csv"))
                .json(&LoadCsvRequest { file_path: path }),
            CorpusSelector::Custom(names) => {
                if names.trim().is_empty() {
                    return Err(CorpusLoadError::EmptyCustomList);
                }
                self.client
                    .post(self.endpoint("api/load-csv-data"))
                    .json(&LoadListRequest { bird_names: names })
            }
        };

        let response = request.send().await?;
        let status = response.status();

        // The backend reports selector problems as {success:false, error}
        // with a 4xx status; prefer its message over the bare status code.
        match response.json::<StatusResponse>().await {
            Ok(body) if body.success => Ok(()),
            Ok(body) => Err(CorpusLoadError::Rejected(
                body.error.unwrap_or_else(|| "corpus load failed".into()),
            )),
            Err(_) if !status.is_success() => Err(CorpusLoadError::HttpStatus(status)),
            Err(e) => Err(CorpusLoadError::Http(e)),
        }
    }

    async fn next_question(&self) -> Result<Question, QuestionFetchError> {
        let response = self
            .client
            .get(self.endpoint("api/quiz-question"))
            .send()
            .await?;
        let status = response.status();

        let body = match response.json::<QuestionResponse>().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(QuestionFetchError::HttpStatus(status));
            }
            Err(e) => return Err(QuestionFetchError::Http(e)),
        };

        if !body.success {
            return Err(QuestionFetchError::Rejected(
                body.error.unwrap_or_else(|| "question fetch failed".into()),
            ));
        }

        // Missing fields fall through to draft validation, so a payload
        // with no answer or options surfaces as Malformed.
        let draft = QuestionDraft::new(
            body.correct_answer.unwrap_or_default(),
            body.options.unwrap_or_default(),
            body.images.map(|images| images.image_urls).unwrap_or_default(),
        );
        Ok(draft.validate()?)
    }
}

#[derive(Debug, Serialize)]
struct LoadCsvRequest<'a> {
    file_path: &'a str,
}

#[derive(Debug, Serialize)]
struct LoadListRequest<'a> {
    bird_names: &'a str,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    success: bool,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuestionResponse {
    success: bool,
    error: Option<String>,
    correct_answer: Option<String>,
    options: Option<Vec<String>>,
    images: Option<ImagesResponse>,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    image_urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_without_double_slash() {
        let source = HttpQuestionSource::new("http://127.0.0.1:5000/");
        assert_eq!(
            source.endpoint("api/quiz-question"),
            "http://127.0.0.1:5000/api/quiz-question"
        );
    }

    #[test]
    fn question_payload_deserializes_backend_shape() {
        let raw = r#"{
            "success": true,
            "correct_answer": "Canvasback",
            "options": ["Canvasback", "Redhead", "Scaup"],
            "images": {"image_urls": ["https://example.org/a.jpg"]}
        }"#;
        let body: QuestionResponse = serde_json::from_str(raw).unwrap();
        assert!(body.success);
        assert_eq!(body.correct_answer.as_deref(), Some("Canvasback"));
        assert_eq!(body.images.unwrap().image_urls.len(), 1);
    }

    #[test]
    fn error_payload_keeps_backend_message() {
        let raw = r#"{"success": false, "error": "No birds loaded. Load a CSV first."}"#;
        let body: QuestionResponse = serde_json::from_str(raw).unwrap();
        assert!(!body.success);
        assert_eq!(
            body.error.as_deref(),
            Some("No birds loaded. Load a CSV first.")
        );
    }
}
