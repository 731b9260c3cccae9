use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use lingua_core::lesson::LessonSession;
use lingua_core::model::{CheckpointStatus, CurriculumStage, LearnerSettings};
use storage::repository::{KeyValueStore, Storage, StorageError};

use crate::content_library::ContentLibrary;
use crate::error::{AppServicesError, LessonServiceError};
use crate::exam_service::ExamService;
use crate::lessons::LessonLoopService;
use crate::progress_tracker::ProgressTracker;
use crate::review_pool_service::ReviewPoolService;
use crate::speech::SpeechIo;
use crate::Clock;

/// A curriculum stage with its checkpoint completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOverview {
    pub stage: CurriculumStage,
    pub status: CheckpointStatus,
}

/// Assembles app-facing services over one store and one content library.
#[derive(Clone)]
pub struct AppServices {
    settings: LearnerSettings,
    content: Arc<ContentLibrary>,
    review_pool: Arc<ReviewPoolService>,
    progress: Arc<ProgressTracker>,
    lesson_loop: Arc<LessonLoopService>,
    exam: Arc<ExamService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and content files in `content_dir`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or content loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        content_dir: &Path,
        clock: Clock,
        settings: LearnerSettings,
        speech: SpeechIo,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let content = ContentLibrary::load_dir(content_dir).await?;
        Ok(Self::from_parts(storage.kv, content, clock, settings, speech))
    }

    #[must_use]
    pub fn from_parts(
        kv: Arc<dyn KeyValueStore>,
        content: ContentLibrary,
        clock: Clock,
        settings: LearnerSettings,
        speech: SpeechIo,
    ) -> Self {
        let review_pool = Arc::new(ReviewPoolService::new(Arc::clone(&kv)));
        let progress = Arc::new(
            ProgressTracker::new(clock, Arc::clone(&kv)).with_policy(settings.streak_policy()),
        );
        let lesson_loop = Arc::new(LessonLoopService::new(
            settings.clone(),
            Arc::clone(&review_pool),
            Arc::clone(&progress),
            speech.clone(),
        ));
        let exam = Arc::new(ExamService::new(settings.clone(), speech));

        Self {
            settings,
            content: Arc::new(content),
            review_pool,
            progress,
            lesson_loop,
            exam,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &LearnerSettings {
        &self.settings
    }

    #[must_use]
    pub fn content(&self) -> Arc<ContentLibrary> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn review_pool(&self) -> Arc<ReviewPoolService> {
        Arc::clone(&self.review_pool)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn lesson_loop(&self) -> Arc<LessonLoopService> {
        Arc::clone(&self.lesson_loop)
    }

    #[must_use]
    pub fn exam(&self) -> Arc<ExamService> {
        Arc::clone(&self.exam)
    }

    /// Start a session for a lesson from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::UnknownLesson` if no lesson has this id.
    pub fn start_lesson(&self, lesson_id: &str) -> Result<LessonSession, LessonServiceError> {
        let lesson = self
            .content
            .lesson(lesson_id)
            .ok_or_else(|| LessonServiceError::UnknownLesson(lesson_id.to_string()))?;
        Ok(self.lesson_loop.start(lesson.clone()))
    }

    /// Curriculum stages with how many checkpoint lessons have a completion record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if completion records cannot be read.
    pub async fn curriculum_overview(&self) -> Result<Vec<StageOverview>, StorageError> {
        let mut completed = HashSet::new();
        for stage in self.content.curriculum() {
            for id in &stage.checkpoint_lesson_ids {
                if self.progress.lesson_score(id).await?.is_some() {
                    completed.insert(id.clone());
                }
            }
        }

        Ok(self
            .content
            .curriculum()
            .iter()
            .map(|stage| StageOverview {
                stage: stage.clone(),
                status: stage.checkpoint_status(|id| completed.contains(id)),
            })
            .collect())
    }
}
