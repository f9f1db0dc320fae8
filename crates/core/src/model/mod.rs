mod ids;
mod question;
mod render;
mod session;

pub use ids::QuestionId;
pub use question::{Question, QuestionDraft, QuestionError};
pub use render::{ImageState, ImageSlot, QuestionRender};
pub use session::{AnswerOutcome, Session, SessionState};
