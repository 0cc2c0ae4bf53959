pub mod submit_feedback_command;

pub use submit_feedback_command::SubmitFeedbackCommand;
