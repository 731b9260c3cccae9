use std::path::{Path, PathBuf};

use tracing::debug;

use lingua_core::content::{ContentError, find_lesson, parse_catalog, parse_curriculum, parse_mock_exam};
use lingua_core::model::{CurriculumStage, Lesson, LessonCategory, MockExam};

use crate::error::ContentLoadError;

pub const CATALOG_FILE: &str = "b2g_lessons.json";
pub const CURRICULUM_FILE: &str = "curriculum.json";
pub const MOCK_EXAM_FILE: &str = "b1_mock.json";

/// Read-only course content loaded once at startup.
#[derive(Debug, Clone)]
pub struct ContentLibrary {
    catalog: Vec<LessonCategory>,
    curriculum: Vec<CurriculumStage>,
    mock_exam: MockExam,
}

impl ContentLibrary {
    #[must_use]
    pub fn new(
        catalog: Vec<LessonCategory>,
        curriculum: Vec<CurriculumStage>,
        mock_exam: MockExam,
    ) -> Self {
        Self {
            catalog,
            curriculum,
            mock_exam,
        }
    }

    /// Load the three content files from `dir`.
    ///
    /// # Errors
    ///
    /// Returns `ContentLoadError` naming the file that could not be read or parsed.
    pub async fn load_dir(dir: &Path) -> Result<Self, ContentLoadError> {
        let catalog = load_file(dir.join(CATALOG_FILE), parse_catalog).await?;
        let curriculum = load_file(dir.join(CURRICULUM_FILE), parse_curriculum).await?;
        let mock_exam = load_file(dir.join(MOCK_EXAM_FILE), parse_mock_exam).await?;

        debug!(
            dir = %dir.display(),
            categories = catalog.len(),
            stages = curriculum.len(),
            "content loaded"
        );
        Ok(Self::new(catalog, curriculum, mock_exam))
    }

    #[must_use]
    pub fn catalog(&self) -> &[LessonCategory] {
        &self.catalog
    }

    #[must_use]
    pub fn curriculum(&self) -> &[CurriculumStage] {
        &self.curriculum
    }

    #[must_use]
    pub fn mock_exam(&self) -> &MockExam {
        &self.mock_exam
    }

    #[must_use]
    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        find_lesson(&self.catalog, lesson_id)
    }
}

async fn load_file<T>(
    path: PathBuf,
    parse: impl FnOnce(&str) -> Result<T, ContentError>,
) -> Result<T, ContentLoadError> {
    let json = match tokio::fs::read_to_string(&path).await {
        Ok(json) => json,
        Err(source) => return Err(ContentLoadError::Io { path, source }),
    };
    parse(&json).map_err(|source| ContentLoadError::Invalid { path, source })
}
