use chrono::{DateTime, Utc};
use url::Url;

use crate::model::{Question, QuestionId};

//
// ─── STATE MACHINE ─────────────────────────────────────────────────────────────
//

/// Lifecycle of a quiz session.
///
/// `Setup → AwaitingQuestion → AwaitingAnswer → Answered → AwaitingQuestion
/// → … → Setup` (explicit reset only). There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Setup,
    AwaitingQuestion,
    AwaitingAnswer,
    Answered,
}

/// Result of scoring a single submitted option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect {
        /// Canonical answer, case-preserving, for feedback display.
        correct_answer: String,
        /// Knowledge-base link for the correct answer.
        reference: Option<Url>,
    },
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One run of the quiz from start to reset: running score, corpus label,
/// and the question currently in play.
///
/// Mutated only by the session controller, one event at a time. Counters
/// are monotonically increasing and reset to zero only by [`Session::begin`].
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    correct_count: u32,
    incorrect_count: u32,
    label: Option<String>,
    current: Option<(QuestionId, Question)>,
    answered: bool,
    started_at: Option<DateTime<Utc>>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session: zero both counters, store the corpus label, and
    /// enter `AwaitingQuestion`.
    pub fn begin(&mut self, label: Option<String>, now: DateTime<Utc>) {
        self.state = SessionState::AwaitingQuestion;
        self.correct_count = 0;
        self.incorrect_count = 0;
        self.label = label;
        self.current = None;
        self.answered = false;
        self.started_at = Some(now);
    }

    /// Clear the answered flag ahead of fetching the next question.
    ///
    /// The previous question stays current until [`Session::install_question`]
    /// replaces it, so a fetch failure leaves the session retriable.
    pub fn prepare_advance(&mut self) {
        self.state = SessionState::AwaitingQuestion;
        self.answered = false;
    }

    /// Install a freshly fetched question and await an answer.
    pub fn install_question(&mut self, id: QuestionId, question: Question) {
        self.current = Some((id, question));
        self.answered = false;
        self.state = SessionState::AwaitingAnswer;
    }

    /// Score a selected option against the current question.
    ///
    /// Returns `None` when the question has already been scored, no
    /// question is current, or the session is not awaiting an answer: a
    /// repeated submit is a silent no-op, which is what enforces
    /// at-most-one-scored-answer-per-question. The state check matters on
    /// the failed-advance path, where the previous question stays current
    /// with the answered flag already cleared. Exactly one counter moves
    /// per `Some` outcome.
    pub fn submit(&mut self, selected: &str) -> Option<AnswerOutcome> {
        if self.answered || self.state != SessionState::AwaitingAnswer {
            return None;
        }
        let (_, question) = self.current.as_ref()?;

        self.answered = true;
        self.state = SessionState::Answered;

        if question.is_correct(selected) {
            self.correct_count += 1;
            Some(AnswerOutcome::Correct)
        } else {
            self.incorrect_count += 1;
            Some(AnswerOutcome::Incorrect {
                correct_answer: question.correct_answer().to_owned(),
                reference: question.reference_link(),
            })
        }
    }

    /// Return to the setup state. Counters keep their values until the
    /// next [`Session::begin`], so the score display survives a reset.
    pub fn reset(&mut self) {
        self.state = SessionState::Setup;
        self.current = None;
        self.answered = false;
        self.label = None;
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn incorrect_count(&self) -> u32 {
        self.incorrect_count
    }

    #[must_use]
    pub fn answered(&self) -> bool {
        self.answered
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Hand the corpus label to the title display, clearing it here.
    pub fn take_label(&mut self) -> Option<String> {
        self.label.take()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<(QuestionId, &Question)> {
        self.current.as_ref().map(|(id, question)| (*id, question))
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionDraft;
    use crate::time::fixed_now;

    fn question() -> Question {
        QuestionDraft::new(
            "Mallard",
            vec!["Mallard".into(), "Gadwall".into(), "Wigeon".into()],
            Vec::new(),
        )
        .validate()
        .unwrap()
    }

    fn active_session() -> Session {
        let mut session = Session::new();
        session.begin(Some("Waterfowl".into()), fixed_now());
        session.install_question(QuestionId::new(1), question());
        session
    }

    #[test]
    fn scoring_is_idempotent_per_question() {
        let mut session = active_session();

        assert!(session.submit("Gadwall").is_some());
        assert!(session.submit("Mallard").is_none());
        assert!(session.submit("Gadwall").is_none());

        assert_eq!(session.correct_count() + session.incorrect_count(), 1);
        assert_eq!(session.incorrect_count(), 1);
        assert_eq!(session.state(), SessionState::Answered);
    }

    #[test]
    fn comparison_is_case_insensitive() {
        let mut session = active_session();
        assert_eq!(session.submit("mallard"), Some(AnswerOutcome::Correct));
        assert_eq!(session.correct_count(), 1);
    }

    #[test]
    fn incorrect_outcome_carries_answer_and_reference() {
        let mut session = active_session();
        let outcome = session.submit("Wigeon").unwrap();
        match outcome {
            AnswerOutcome::Incorrect {
                correct_answer,
                reference,
            } => {
                assert_eq!(correct_answer, "Mallard");
                assert_eq!(
                    reference.unwrap().as_str(),
                    "https://en.wikipedia.org/wiki/Mallard"
                );
            }
            AnswerOutcome::Correct => panic!("expected incorrect outcome"),
        }
    }

    #[test]
    fn submit_without_question_is_a_no_op() {
        let mut session = Session::new();
        session.begin(None, fixed_now());
        assert!(session.submit("Mallard").is_none());
        assert_eq!(session.correct_count(), 0);
    }

    #[test]
    fn begin_zeroes_counters_after_reset() {
        let mut session = active_session();
        session.submit("Mallard");
        session.reset();

        // Score display survives the reset itself.
        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.state(), SessionState::Setup);
        assert!(session.current_question().is_none());

        session.begin(Some("Backyard Birds".into()), fixed_now());
        assert_eq!(session.correct_count(), 0);
        assert_eq!(session.incorrect_count(), 0);
    }

    #[test]
    fn scored_question_cannot_score_again_while_awaiting_the_next() {
        let mut session = active_session();
        session.submit("Gadwall");
        assert_eq!(session.incorrect_count(), 1);

        // A failed fetch leaves the old question current with the answered
        // flag cleared; it must still refuse to score a second time.
        session.prepare_advance();
        assert!(session.submit("Gadwall").is_none());
        assert!(session.submit("Mallard").is_none());
        assert_eq!(session.correct_count() + session.incorrect_count(), 1);
    }

    #[test]
    fn advancing_replaces_question_and_clears_answered() {
        let mut session = active_session();
        session.submit("Mallard");
        assert!(session.answered());

        session.prepare_advance();
        assert!(!session.answered());
        assert_eq!(session.state(), SessionState::AwaitingQuestion);
        // Old question stays current until the fetch succeeds.
        assert!(session.current_question().is_some());

        session.install_question(QuestionId::new(2), question());
        let (id, _) = session.current_question().unwrap();
        assert_eq!(id, QuestionId::new(2));
        assert!(!session.answered());
    }

    #[test]
    fn label_is_consumed_once() {
        let mut session = Session::new();
        session.begin(Some("Waterfowl".into()), fixed_now());
        assert_eq!(session.take_label().as_deref(), Some("Waterfowl"));
        assert_eq!(session.take_label(), None);
    }
}
