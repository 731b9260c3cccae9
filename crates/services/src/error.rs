//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use lingua_core::content::ContentError;
use lingua_core::exam::ExamError;
use lingua_core::lesson::LessonError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::speech::CaptureError;

/// Errors emitted while reading lesson, curriculum, or exam files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid content in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ContentError,
    },
}

/// Errors emitted by `LessonLoopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonServiceError {
    #[error("unknown lesson: {0}")]
    UnknownLesson(String),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ExamService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamServiceError {
    #[error(transparent)]
    Exam(#[from] ExamError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Content(#[from] ContentLoadError),
}
