#![forbid(unsafe_code)]

pub mod app_services;
pub mod content_library;
pub mod error;
pub mod exam_service;
pub mod lessons;
pub mod progress_tracker;
pub mod review_pool_service;
pub mod speech;

pub use lingua_core::Clock;

pub use app_services::{AppServices, StageOverview};
pub use content_library::ContentLibrary;
pub use error::{AppServicesError, ContentLoadError, ExamServiceError, LessonServiceError};
pub use exam_service::ExamService;
pub use lessons::{LessonAnswerResult, LessonLoopService};
pub use progress_tracker::ProgressTracker;
pub use review_pool_service::{ReviewAnswer, ReviewPoolService};
pub use speech::{
    CaptureError, CaptureResponder, CaptureSlot, PendingCapture, SilentSynthesizer, SpeechIo,
    SpeechRecognizer, SpeechSynthesizer, UnavailableRecognizer, capture_channel,
};
