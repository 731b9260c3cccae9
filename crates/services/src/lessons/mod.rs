mod workflow;

// Public API of the lesson subsystem.
pub use crate::error::LessonServiceError;
pub use workflow::{LessonAnswerResult, LessonLoopService};
