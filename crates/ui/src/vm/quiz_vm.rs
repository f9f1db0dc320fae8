use url::Url;

use quiz_core::model::{AnswerOutcome, ImageState, Question, QuestionId, QuestionRender};
use services::{ImageEvent, ImageProbe};

/// Which surface the app is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Setup,
    Quiz,
}

/// Visual marking applied to an option control after scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OptionMark {
    #[default]
    None,
    ChosenCorrect,
    ChosenIncorrect,
    RevealedCorrect,
}

/// A selectable answer control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionControl {
    label: String,
    enabled: bool,
    mark: OptionMark,
}

impl OptionControl {
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn mark(&self) -> OptionMark {
        self.mark
    }
}

/// Scoring feedback for the current question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect {
        correct_answer: String,
        reference: Option<Url>,
    },
}

impl Feedback {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        matches!(self, Feedback::Correct)
    }

    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Feedback::Correct => "Correct!".into(),
            Feedback::Incorrect { correct_answer, .. } => {
                format!("Incorrect! The correct answer is: {correct_answer}")
            }
        }
    }

    #[must_use]
    pub fn reference(&self) -> Option<&Url> {
        match self {
            Feedback::Correct => None,
            Feedback::Incorrect { reference, .. } => reference.as_ref(),
        }
    }
}

impl From<&AnswerOutcome> for Feedback {
    fn from(outcome: &AnswerOutcome) -> Self {
        match outcome {
            AnswerOutcome::Correct => Feedback::Correct,
            AnswerOutcome::Incorrect {
                correct_answer,
                reference,
            } => Feedback::Incorrect {
                correct_answer: correct_answer.clone(),
                reference: reference.clone(),
            },
        }
    }
}

const DEFAULT_TITLE: &str = "Bird Quiz";

/// Headless presentation adapter for the quiz.
///
/// Renders a question into image slots and option controls, and routes the
/// user's selection back to the session controller. Rendering here means
/// state a view can paint from; no widget toolkit is involved.
#[derive(Debug, Default)]
pub struct QuizVm {
    screen: Screen,
    title: String,
    error: Option<String>,
    question_id: Option<QuestionId>,
    render: QuestionRender,
    options: Vec<OptionControl>,
    locked: bool,
    chosen: Option<usize>,
    feedback: Option<Feedback>,
    enlarged: Option<usize>,
    correct_count: u32,
    incorrect_count: u32,
}

impl QuizVm {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            ..Self::default()
        }
    }

    /// Switch from setup to quiz mode, consuming the corpus label for the
    /// title and zeroing the score display.
    pub fn begin_quiz(&mut self, label: Option<&str>) {
        self.screen = Screen::Quiz;
        self.title = format!("{DEFAULT_TITLE} - {}", label.unwrap_or("Custom"));
        self.error = None;
        self.correct_count = 0;
        self.incorrect_count = 0;
    }

    /// Return to the setup screen. The score display is left intact; it
    /// resets when the next quiz begins.
    pub fn reset(&mut self) {
        self.screen = Screen::Setup;
        self.title = DEFAULT_TITLE.into();
        self.error = None;
        self.question_id = None;
        self.render = QuestionRender::default();
        self.options.clear();
        self.locked = false;
        self.chosen = None;
        self.feedback = None;
        self.enlarged = None;
    }

    /// Present a freshly served question: all image slots pending, one
    /// enabled control per option in received order, selection unlocked.
    pub fn present_question(&mut self, id: QuestionId, question: &Question) {
        self.question_id = Some(id);
        self.render = QuestionRender::new(question.image_urls());
        self.options = question
            .options()
            .iter()
            .map(|label| OptionControl {
                label: label.clone(),
                enabled: true,
                mark: OptionMark::None,
            })
            .collect();
        self.locked = false;
        self.chosen = None;
        self.feedback = None;
        self.enlarged = None;
        self.error = None;
    }

    /// Apply a finished image load to the current question.
    ///
    /// Returns false when the event was dropped: it belonged to a question
    /// the session has already advanced past, or its slot had settled.
    pub fn apply_image_event(&mut self, event: &ImageEvent) -> bool {
        if self.question_id != Some(event.question_id) {
            return false;
        }
        match event.probe {
            ImageProbe::Displayed => self.render.mark_displayed(event.index),
            ImageProbe::Failed => self.render.mark_failed(event.index),
        }
    }

    /// First selection wins: locks every control and returns the chosen
    /// label for the controller to score. `None` once locked; this is the
    /// UI-level double-submit guard, independent of the controller's.
    pub fn select_option(&mut self, index: usize) -> Option<String> {
        if self.locked {
            return None;
        }
        let label = self.options.get(index)?.label.clone();
        self.locked = true;
        self.chosen = Some(index);
        for option in &mut self.options {
            option.enabled = false;
        }
        Some(label)
    }

    /// Mark the chosen control with the scored outcome; on a miss the
    /// correct option is revealed as well.
    pub fn apply_outcome(&mut self, outcome: &AnswerOutcome) {
        let Some(chosen) = self.chosen else {
            return;
        };

        match outcome {
            AnswerOutcome::Correct => {
                if let Some(option) = self.options.get_mut(chosen) {
                    option.mark = OptionMark::ChosenCorrect;
                }
            }
            AnswerOutcome::Incorrect { correct_answer, .. } => {
                if let Some(option) = self.options.get_mut(chosen) {
                    option.mark = OptionMark::ChosenIncorrect;
                }
                let answer_lower = correct_answer.to_lowercase();
                for option in &mut self.options {
                    if option.label.to_lowercase() == answer_lower {
                        option.mark = OptionMark::RevealedCorrect;
                    }
                }
            }
        }
        self.feedback = Some(Feedback::from(outcome));
    }

    pub fn set_score(&mut self, correct: u32, incorrect: u32) {
        self.correct_count = correct;
        self.incorrect_count = incorrect;
    }

    #[must_use]
    pub fn score_line(&self) -> String {
        format!(
            "Correct: {} | Incorrect: {}",
            self.correct_count, self.incorrect_count
        )
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Neutral indicator when the question has nothing to show: either it
    /// came without images, or every one of them failed to load.
    #[must_use]
    pub fn placeholder_text(&self) -> Option<&'static str> {
        self.question_id?;
        if self.render.slots().is_empty() {
            Some("Images not available.")
        } else if self.render.needs_placeholder() {
            Some("Images could not be loaded.")
        } else {
            None
        }
    }

    /// Open the enlarged view of a displayed image. A pure presentation
    /// action; quiz state is untouched.
    pub fn open_image(&mut self, index: usize) -> bool {
        let displayed = self
            .render
            .slots()
            .get(index)
            .is_some_and(|slot| slot.state() == ImageState::Displayed);
        if displayed {
            self.enlarged = Some(index);
        }
        displayed
    }

    pub fn close_image(&mut self) {
        self.enlarged = None;
    }

    #[must_use]
    pub fn enlarged_image(&self) -> Option<&Url> {
        self.enlarged
            .and_then(|index| self.render.slots().get(index))
            .map(|slot| slot.url())
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn options(&self) -> &[OptionControl] {
        &self.options
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    #[must_use]
    pub fn render(&self) -> &QuestionRender {
        &self.render
    }

    pub fn visible_images(&self) -> impl Iterator<Item = &Url> {
        self.render.displayed()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
