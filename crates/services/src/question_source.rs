use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use quiz_core::model::Question;

use crate::error::{CorpusLoadError, QuestionFetchError};

/// Which set of subjects a session draws its questions from: a corpus
/// known to the source by name/path, or a raw user-supplied list.
///
/// What makes a custom list valid is the source's business; the client
/// only refuses to send one that is entirely blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSelector {
    Named(String),
    Custom(String),
}

impl CorpusSelector {
    #[must_use]
    pub fn named(path: impl Into<String>) -> Self {
        Self::Named(path.into())
    }

    #[must_use]
    pub fn custom(names: impl Into<String>) -> Self {
        Self::Custom(names.into())
    }
}

/// Contract the session controller consumes from a question backend.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Prepare the given corpus for quiz delivery.
    ///
    /// # Errors
    ///
    /// Returns `CorpusLoadError` when the source rejects the selector or
    /// the request fails.
    async fn prime(&self, selector: &CorpusSelector) -> Result<(), CorpusLoadError>;

    /// Produce the next question from the primed corpus.
    ///
    /// # Errors
    ///
    /// Returns `QuestionFetchError` when no corpus is primed, the request
    /// fails, or the payload is malformed.
    async fn next_question(&self) -> Result<Question, QuestionFetchError>;
}

/// Deterministic scripted source for tests and the offline demo.
///
/// Serves its fixture questions round-robin, in order. No shuffling:
/// randomization is a real backend's concern.
#[derive(Clone, Default)]
pub struct InMemoryQuestionSource {
    inner: Arc<Mutex<ScriptState>>,
}

#[derive(Default)]
struct ScriptState {
    primed: bool,
    questions: Vec<Question>,
    cursor: usize,
}

impl InMemoryQuestionSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A source already primed with the given fixtures.
    #[must_use]
    pub fn preloaded(questions: Vec<Question>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScriptState {
                primed: true,
                questions,
                cursor: 0,
            })),
        }
    }

    /// Append a fixture question to the script.
    ///
    /// # Errors
    ///
    /// Returns `CorpusLoadError::Rejected` if the script lock is poisoned.
    pub fn push_question(&self, question: Question) -> Result<(), CorpusLoadError> {
        let mut state = self
            .inner
            .lock()
            .map_err(|e| CorpusLoadError::Rejected(e.to_string()))?;
        state.questions.push(question);
        Ok(())
    }
}

#[async_trait]
impl QuestionSource for InMemoryQuestionSource {
    async fn prime(&self, selector: &CorpusSelector) -> Result<(), CorpusLoadError> {
        if let CorpusSelector::Custom(names) = selector {
            if names.trim().is_empty() {
                return Err(CorpusLoadError::EmptyCustomList);
            }
        }

        let mut state = self
            .inner
            .lock()
            .map_err(|e| CorpusLoadError::Rejected(e.to_string()))?;
        if state.questions.is_empty() {
            return Err(CorpusLoadError::Rejected(
                "no questions scripted for this corpus".into(),
            ));
        }
        state.primed = true;
        state.cursor = 0;
        Ok(())
    }

    async fn next_question(&self) -> Result<Question, QuestionFetchError> {
        let mut state = self
            .inner
            .lock()
            .map_err(|e| QuestionFetchError::Rejected(e.to_string()))?;
        if !state.primed || state.questions.is_empty() {
            return Err(QuestionFetchError::Rejected(
                "no corpus loaded; prime a corpus first".into(),
            ));
        }
        let question = state.questions[state.cursor % state.questions.len()].clone();
        state.cursor += 1;
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionDraft;

    fn question(answer: &str, other: &str) -> Question {
        QuestionDraft::new(answer, vec![answer.into(), other.into()], Vec::new())
            .validate()
            .unwrap()
    }

    #[tokio::test]
    async fn unprimed_source_rejects_question_requests() {
        let source = InMemoryQuestionSource::new();
        source.push_question(question("Mallard", "Gadwall")).unwrap();

        let err = source.next_question().await.unwrap_err();
        assert!(matches!(err, QuestionFetchError::Rejected(_)));

        source
            .prime(&CorpusSelector::named("waterfowl.csv"))
            .await
            .unwrap();
        assert!(source.next_question().await.is_ok());
    }

    #[tokio::test]
    async fn empty_custom_list_is_rejected() {
        let source = InMemoryQuestionSource::new();
        source.push_question(question("Mallard", "Gadwall")).unwrap();

        let err = source
            .prime(&CorpusSelector::custom("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, CorpusLoadError::EmptyCustomList));
    }

    #[tokio::test]
    async fn questions_are_served_round_robin() {
        let source = InMemoryQuestionSource::preloaded(vec![
            question("Mallard", "Gadwall"),
            question("Redhead", "Canvasback"),
        ]);

        let first = source.next_question().await.unwrap();
        let second = source.next_question().await.unwrap();
        let third = source.next_question().await.unwrap();
        assert_eq!(first.correct_answer(), "Mallard");
        assert_eq!(second.correct_answer(), "Redhead");
        assert_eq!(third.correct_answer(), "Mallard");
    }
}
