use thiserror::Error;
use url::Url;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("correct answer cannot be empty")]
    EmptyCorrectAnswer,

    #[error("a question needs at least two options, got {0}")]
    TooFewOptions(usize),

    #[error("options cannot be empty strings")]
    EmptyOption,

    #[error("options do not contain the correct answer")]
    MissingCorrectOption,

    #[error("correct answer appears {0} times among the options")]
    DuplicatedCorrectOption(usize),
}

//
// ─── VALIDATED DOMAIN ENTITY ───────────────────────────────────────────────────
//

/// One quiz round: the canonical answer, the candidate options in their
/// presentation order, and zero or more subject images.
///
/// Immutable once constructed; advancing the session replaces the question,
/// it never edits one in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    correct_answer: String,
    options: Vec<String>,
    image_urls: Vec<Url>,
}

impl Question {
    /// Canonical label of the subject, case-preserving for display.
    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Candidate labels in the order they were received. Order is the
    /// presentation order; shuffling, if any, is the question source's job.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn image_urls(&self) -> &[Url] {
        &self.image_urls
    }

    /// Case-insensitive comparison against the canonical answer.
    #[must_use]
    pub fn is_correct(&self, selected: &str) -> bool {
        selected.trim().to_lowercase() == self.correct_answer.to_lowercase()
    }

    /// Knowledge-base page for the correct answer, with spaces mapped to
    /// underscores. `None` only if the answer cannot form a valid URL path.
    #[must_use]
    pub fn reference_link(&self) -> Option<Url> {
        let slug = self.correct_answer.replace(' ', "_");
        Url::parse(WIKI_BASE).ok()?.join(&slug).ok()
    }
}

const WIKI_BASE: &str = "https://en.wikipedia.org/wiki/";

//
// ─── DRAFT ENTITY (unvalidated input) ──────────────────────────────────────────
//

/// Question payload as received from a question source, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionDraft {
    pub correct_answer: String,
    pub options: Vec<String>,
    pub image_urls: Vec<String>,
}

impl QuestionDraft {
    #[must_use]
    pub fn new(
        correct_answer: impl Into<String>,
        options: Vec<String>,
        image_urls: Vec<String>,
    ) -> Self {
        Self {
            correct_answer: correct_answer.into(),
            options,
            image_urls,
        }
    }

    /// Validate the payload into an immutable [`Question`].
    ///
    /// The options must contain the correct answer, case-insensitively,
    /// exactly once. A corpus serving anything else is a fixture bug to
    /// surface, not a runtime case to tolerate. Image URLs that fail to
    /// parse are dropped: degraded media never fails a question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the answer or option set is malformed.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let correct_answer = self.correct_answer.trim().to_owned();
        if correct_answer.is_empty() {
            return Err(QuestionError::EmptyCorrectAnswer);
        }

        if self.options.len() < 2 {
            return Err(QuestionError::TooFewOptions(self.options.len()));
        }

        let options: Vec<String> = self
            .options
            .into_iter()
            .map(|opt| opt.trim().to_owned())
            .collect();
        if options.iter().any(String::is_empty) {
            return Err(QuestionError::EmptyOption);
        }

        let answer_lower = correct_answer.to_lowercase();
        let matches = options
            .iter()
            .filter(|opt| opt.to_lowercase() == answer_lower)
            .count();
        match matches {
            0 => return Err(QuestionError::MissingCorrectOption),
            1 => {}
            n => return Err(QuestionError::DuplicatedCorrectOption(n)),
        }

        let image_urls = self
            .image_urls
            .iter()
            .filter_map(|raw| Url::parse(raw.trim()).ok())
            .collect();

        Ok(Question {
            correct_answer,
            options,
            image_urls,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(answer: &str, options: &[&str]) -> QuestionDraft {
        QuestionDraft::new(
            answer,
            options.iter().map(|s| (*s).to_owned()).collect(),
            Vec::new(),
        )
    }

    #[test]
    fn validates_well_formed_question() {
        let question = draft("Canvasback", &["Canvasback", "Redhead", "Scaup"])
            .validate()
            .unwrap();
        assert_eq!(question.correct_answer(), "Canvasback");
        assert_eq!(question.options().len(), 3);
    }

    #[test]
    fn rejects_missing_correct_option() {
        let err = draft("Canvasback", &["Redhead", "Scaup"])
            .validate()
            .unwrap_err();
        assert_eq!(err, QuestionError::MissingCorrectOption);
    }

    #[test]
    fn rejects_duplicated_correct_option() {
        let err = draft("Canvasback", &["Canvasback", "canvasback", "Scaup"])
            .validate()
            .unwrap_err();
        assert_eq!(err, QuestionError::DuplicatedCorrectOption(2));
    }

    #[test]
    fn correct_option_match_is_case_insensitive() {
        let question = draft("Mallard", &["mallard", "Gadwall"]).validate().unwrap();
        assert!(question.is_correct("Mallard"));
        assert!(question.is_correct("mallard"));
        assert!(question.is_correct(" MALLARD "));
        assert!(!question.is_correct("Gadwall"));
    }

    #[test]
    fn rejects_empty_answer_and_short_option_sets() {
        assert_eq!(
            draft("  ", &["a", "b"]).validate().unwrap_err(),
            QuestionError::EmptyCorrectAnswer
        );
        assert_eq!(
            draft("a", &["a"]).validate().unwrap_err(),
            QuestionError::TooFewOptions(1)
        );
    }

    #[test]
    fn unparseable_image_urls_are_dropped() {
        let question = QuestionDraft::new(
            "Mallard",
            vec!["Mallard".into(), "Gadwall".into()],
            vec![
                "https://example.org/a.jpg".into(),
                "not a url".into(),
                "https://example.org/b.jpg".into(),
            ],
        )
        .validate()
        .unwrap();
        assert_eq!(question.image_urls().len(), 2);
    }

    #[test]
    fn reference_link_maps_spaces_to_underscores() {
        let question = draft("Common Goldeneye", &["Common Goldeneye", "Bufflehead"])
            .validate()
            .unwrap();
        let link = question.reference_link().unwrap();
        assert_eq!(
            link.as_str(),
            "https://en.wikipedia.org/wiki/Common_Goldeneye"
        );
    }
}
