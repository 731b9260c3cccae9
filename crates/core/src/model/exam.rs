use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MockExamError {
    #[error("mock exam has no writing task")]
    MissingWritingTask,
    #[error("mock exam has no speaking task")]
    MissingSpeakingTask,
}

/// An objective (multiple-choice) exam question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// A free-response task scored by keywords, length and cohesion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamTask {
    pub prompt: String,
    pub keywords: BTreeSet<String>,
    pub min_words: u32,
}

/// Mock exam content: two objective and two free-response sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockExam {
    pub reading: Vec<ExamQuestion>,
    pub listening: Vec<ExamQuestion>,
    pub writing: Vec<ExamTask>,
    pub speaking: Vec<ExamTask>,
}

impl MockExam {
    /// Only the first writing and speaking tasks are ever administered.
    ///
    /// # Errors
    ///
    /// Returns `MockExamError` if either free-response section is empty.
    pub fn validate(&self) -> Result<(), MockExamError> {
        if self.writing.is_empty() {
            return Err(MockExamError::MissingWritingTask);
        }
        if self.speaking.is_empty() {
            return Err(MockExamError::MissingSpeakingTask);
        }
        Ok(())
    }

    #[must_use]
    pub fn writing_task(&self) -> Option<&ExamTask> {
        self.writing.first()
    }

    #[must_use]
    pub fn speaking_task(&self) -> Option<&ExamTask> {
        self.speaking.first()
    }
}
