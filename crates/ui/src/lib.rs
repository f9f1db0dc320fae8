#![forbid(unsafe_code)]

pub mod vm;

pub use vm::{Feedback, OptionControl, OptionMark, QuizVm, Screen};
