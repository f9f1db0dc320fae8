mod quiz_vm;

pub use quiz_vm::{Feedback, OptionControl, OptionMark, QuizVm, Screen};
