mod curriculum;
mod exam;
mod lesson;
mod review;
mod settings;

pub use curriculum::{CheckpointStatus, CurriculumStage};
pub use exam::{ExamQuestion, ExamTask, MockExam, MockExamError};
pub use lesson::{
    CategoryRecord, Lesson, LessonCategory, LessonRecord, LessonValidationError, PairItem, Step,
    StepBody, StepError, StepKind, StepRecord,
};
pub use review::{ReviewEntry, ReviewError, ReviewLevel};
pub use settings::{
    DEFAULT_TARGET_LANGUAGE, LearnerSettings, LearnerSettingsDraft, LearnerSettingsError,
    StreakPolicy,
};
