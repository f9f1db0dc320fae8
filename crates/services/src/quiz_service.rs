use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{AnswerOutcome, Question, QuestionId, Session, SessionState};

use crate::error::{CorpusLoadError, QuestionFetchError};
use crate::question_source::{CorpusSelector, QuestionSource};

/// The session controller: owns the [`Session`] and drives the question
/// lifecycle against an external question source.
///
/// All mutation goes through this type, one event at a time; nothing here
/// is fatal, and every failure leaves the session continuable.
pub struct QuizService {
    session: Session,
    source: Arc<dyn QuestionSource>,
    clock: Clock,
    next_question_id: u64,
}

impl QuizService {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self {
            session: Session::new(),
            source,
            clock: Clock::default_clock(),
            next_question_id: 1,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Prepare a corpus on the question source.
    ///
    /// # Errors
    ///
    /// Returns `CorpusLoadError` when the source rejects the selector.
    pub async fn prime(&self, selector: &CorpusSelector) -> Result<(), CorpusLoadError> {
        self.source.prime(selector).await
    }

    /// Start a session: zero the counters, store the corpus label, and
    /// fetch the first question.
    ///
    /// Priming beforehand is the caller's contract. If the first fetch
    /// fails (typically because the source was never primed), the session
    /// falls back to the setup state and the error is returned for display.
    ///
    /// # Errors
    ///
    /// Returns `QuestionFetchError` when the first question cannot be
    /// fetched.
    pub async fn start_session(
        &mut self,
        label: Option<String>,
    ) -> Result<(QuestionId, Question), QuestionFetchError> {
        self.session.begin(label, self.clock.now());
        match self.advance_question().await {
            Ok(served) => Ok(served),
            Err(e) => {
                self.session.reset();
                Err(e)
            }
        }
    }

    /// Fetch and install the next question.
    ///
    /// On failure the score is untouched and the session stays in
    /// `AwaitingQuestion`, so the caller may simply retry.
    ///
    /// # Errors
    ///
    /// Returns `QuestionFetchError` from the source, including malformed
    /// payloads.
    pub async fn advance_question(
        &mut self,
    ) -> Result<(QuestionId, Question), QuestionFetchError> {
        self.session.prepare_advance();
        let question = self.source.next_question().await?;

        let id = QuestionId::new(self.next_question_id);
        self.next_question_id += 1;
        self.session.install_question(id, question.clone());
        Ok((id, question))
    }

    /// Score the selected option. `None` means the submission was ignored:
    /// either the question was already scored or none is current.
    pub fn submit_answer(&mut self, selected: &str) -> Option<AnswerOutcome> {
        self.session.submit(selected)
    }

    /// Return to the setup state, keeping the score display intact until
    /// the next start.
    pub fn reset_session(&mut self) {
        self.session.reset();
    }

    /// Hand the corpus label to the title display, clearing it here.
    pub fn take_label(&mut self) -> Option<String> {
        self.session.take_label()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.session.correct_count()
    }

    #[must_use]
    pub fn incorrect_count(&self) -> u32 {
        self.session.incorrect_count()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question_source::InMemoryQuestionSource;
    use quiz_core::model::QuestionDraft;
    use quiz_core::time::fixed_clock;

    fn question(answer: &str, other: &str) -> Question {
        QuestionDraft::new(answer, vec![answer.into(), other.into()], Vec::new())
            .validate()
            .unwrap()
    }

    fn service(questions: Vec<Question>) -> QuizService {
        let source = Arc::new(InMemoryQuestionSource::preloaded(questions));
        QuizService::new(source).with_clock(fixed_clock())
    }

    #[tokio::test]
    async fn start_against_empty_source_falls_back_to_setup() {
        let source = Arc::new(InMemoryQuestionSource::new());
        let mut service = QuizService::new(source);

        let err = service.start_session(Some("Waterfowl".into())).await;
        assert!(err.is_err());
        assert_eq!(service.state(), SessionState::Setup);
        assert_eq!(service.correct_count(), 0);
    }

    #[tokio::test]
    async fn question_ids_increase_per_fetch() {
        let mut service = service(vec![question("Mallard", "Gadwall")]);

        let (first, _) = service.start_session(None).await.unwrap();
        service.submit_answer("Mallard");
        let (second, _) = service.advance_question().await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn submit_after_failed_advance_never_scores_the_old_question_again() {
        let mut service = service(vec![question("Mallard", "Gadwall")]);
        service.start_session(None).await.unwrap();
        service.submit_answer("Gadwall");
        assert_eq!(service.incorrect_count(), 1);

        service.source = Arc::new(InMemoryQuestionSource::new());
        assert!(service.advance_question().await.is_err());

        // The old question is still current, but resubmitting it must
        // stay a no-op with the tally unchanged.
        assert!(service.submit_answer("Gadwall").is_none());
        assert!(service.submit_answer("Mallard").is_none());
        assert_eq!(service.correct_count() + service.incorrect_count(), 1);
        assert_eq!(service.incorrect_count(), 1);
    }

    #[tokio::test]
    async fn failed_advance_preserves_score_and_is_retriable() {
        let mut service = service(vec![question("Mallard", "Gadwall")]);
        service.start_session(None).await.unwrap();
        service.submit_answer("Gadwall");
        assert_eq!(service.incorrect_count(), 1);

        // Swap in a source that refuses, then retry against a working one.
        let failing = Arc::new(InMemoryQuestionSource::new());
        service.source = failing;
        assert!(service.advance_question().await.is_err());
        assert_eq!(service.incorrect_count(), 1);
        assert_eq!(service.state(), SessionState::AwaitingQuestion);

        service.source = Arc::new(InMemoryQuestionSource::preloaded(vec![question(
            "Redhead",
            "Canvasback",
        )]));
        let (_, served) = service.advance_question().await.unwrap();
        assert_eq!(served.correct_answer(), "Redhead");
        assert!(!service.session().answered());
    }
}
