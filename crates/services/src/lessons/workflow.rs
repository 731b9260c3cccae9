use std::sync::Arc;

use tracing::debug;

use lingua_core::lesson::{LessonSession, StepAnswer, StepFeedback};
use lingua_core::model::{LearnerSettings, Lesson, StepKind};
use lingua_core::progress::ProgressState;

use crate::error::LessonServiceError;
use crate::progress_tracker::ProgressTracker;
use crate::review_pool_service::ReviewPoolService;
use crate::speech::{CaptureError, PendingCapture, SpeechIo};

/// Result of answering a single step in a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonAnswerResult {
    pub feedback: StepFeedback,
    /// Counters after completion; set only on the final step.
    pub progress: Option<ProgressState>,
}

impl LessonAnswerResult {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.feedback.completion.is_some()
    }
}

/// Drives a `LessonSession` and persists its side effects.
#[derive(Clone)]
pub struct LessonLoopService {
    settings: LearnerSettings,
    review_pool: Arc<ReviewPoolService>,
    progress: Arc<ProgressTracker>,
    speech: SpeechIo,
}

impl LessonLoopService {
    #[must_use]
    pub fn new(
        settings: LearnerSettings,
        review_pool: Arc<ReviewPoolService>,
        progress: Arc<ProgressTracker>,
        speech: SpeechIo,
    ) -> Self {
        Self {
            settings,
            review_pool,
            progress,
            speech,
        }
    }

    #[must_use]
    pub fn start(&self, lesson: Lesson) -> LessonSession {
        debug!(lesson_id = lesson.id(), steps = lesson.step_count(), "lesson started");
        LessonSession::new(lesson)
    }

    /// Speak the target-language prompt of a listening step.
    /// Returns `false` when the current step has nothing to play.
    pub fn play_prompt(&self, session: &LessonSession) -> bool {
        let Some(step) = session.current_step() else {
            return false;
        };
        if step.kind() != StepKind::Listen {
            return false;
        }
        let Some(text) = step.prompt_target() else {
            return false;
        };
        self.speech
            .synthesizer
            .speak(text, self.settings.target_language());
        true
    }

    /// Start recognition for a speaking step in the target language.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError` if the recognizer is busy or unavailable.
    pub fn listen_for_answer(&self) -> Result<PendingCapture, CaptureError> {
        self.speech
            .recognizer
            .start_listening(self.settings.target_language())
    }

    /// Submit an answer, record a miss on a wrong answer, and record the
    /// completion after the last step.
    ///
    /// The session only advances once both writes succeed, so a failed call can
    /// be retried with the same answer. A retry after a failed completion write
    /// records the miss again.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Lesson` for a finished session or a mismatched
    /// answer kind, and `LessonServiceError::Storage` if persistence fails.
    pub async fn answer_current(
        &self,
        session: &mut LessonSession,
        answer: &StepAnswer,
    ) -> Result<LessonAnswerResult, LessonServiceError> {
        let mut next = session.clone();
        let feedback = next.submit(answer)?;

        if let Some(miss) = &feedback.miss {
            self.review_pool
                .add_miss(&miss.prompt_native, &miss.correct_answer)
                .await?;
        }

        let progress = match &feedback.completion {
            Some(done) => Some(
                self.progress
                    .complete_lesson(&done.lesson_id, done.score)
                    .await?,
            ),
            None => None,
        };

        *session = next;
        Ok(LessonAnswerResult { feedback, progress })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
