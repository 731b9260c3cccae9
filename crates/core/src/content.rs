//! Parsing of read-only course content (lesson catalog, curriculum, mock exam).
//!
//! Loading the bytes is the caller's concern; these functions only turn JSON text
//! into validated domain values.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{
    CategoryRecord, CurriculumStage, Lesson, LessonCategory, LessonValidationError, MockExam,
    MockExamError,
};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("invalid content JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Lesson(#[from] LessonValidationError),

    #[error(transparent)]
    Exam(#[from] MockExamError),

    #[error("duplicate lesson id: {0}")]
    DuplicateLessonId(String),
}

/// Parse the lesson catalog: a list of `{level, lessons}` groups.
///
/// # Errors
///
/// Returns `ContentError` for malformed JSON, invalid steps, or a lesson id used twice.
pub fn parse_catalog(json: &str) -> Result<Vec<LessonCategory>, ContentError> {
    let records: Vec<CategoryRecord> = serde_json::from_str(json)?;
    let categories = records
        .into_iter()
        .map(LessonCategory::from_record)
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    for lesson in categories.iter().flat_map(|c| c.lessons.iter()) {
        if !seen.insert(lesson.id()) {
            return Err(ContentError::DuplicateLessonId(lesson.id().to_string()));
        }
    }

    Ok(categories)
}

/// # Errors
///
/// Returns `ContentError::Json` for malformed JSON.
pub fn parse_curriculum(json: &str) -> Result<Vec<CurriculumStage>, ContentError> {
    Ok(serde_json::from_str(json)?)
}

/// # Errors
///
/// Returns `ContentError` for malformed JSON or an exam missing a free-response task.
pub fn parse_mock_exam(json: &str) -> Result<MockExam, ContentError> {
    let exam: MockExam = serde_json::from_str(json)?;
    exam.validate()?;
    Ok(exam)
}

#[must_use]
pub fn find_lesson<'a>(catalog: &'a [LessonCategory], lesson_id: &str) -> Option<&'a Lesson> {
    catalog.iter().find_map(|c| c.find(lesson_id))
}
