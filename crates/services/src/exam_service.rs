use tracing::info;

use lingua_core::exam::{ExamEngine, ExamError, ExamReport, ExamStage};
use lingua_core::model::{LearnerSettings, MockExam};

use crate::error::ExamServiceError;
use crate::speech::{PendingCapture, SpeechIo};

/// Glue between the exam state machine and speech playback and capture.
#[derive(Clone)]
pub struct ExamService {
    settings: LearnerSettings,
    speech: SpeechIo,
}

impl ExamService {
    #[must_use]
    pub fn new(settings: LearnerSettings, speech: SpeechIo) -> Self {
        Self { settings, speech }
    }

    /// # Errors
    ///
    /// Returns `ExamError::InvalidExam` if the exam lacks a writing or speaking task.
    pub fn start(&self, exam: MockExam) -> Result<ExamEngine, ExamError> {
        ExamEngine::new(exam)
    }

    /// Speak listening question `index`. Returns `false` outside the
    /// listening stage or for an index past the end.
    pub fn play_listening(&self, engine: &ExamEngine, index: usize) -> bool {
        if engine.stage() != ExamStage::Listening {
            return false;
        }
        let Some(question) = engine.listening_questions().get(index) else {
            return false;
        };
        self.speech
            .synthesizer
            .speak(&question.prompt, self.settings.target_language());
        true
    }

    /// Start recognition for the speaking task.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::WrongStage` before the speaking stage, and
    /// `CaptureError` if the recognizer refuses to start.
    pub fn start_speaking(&self, engine: &ExamEngine) -> Result<PendingCapture, ExamServiceError> {
        ensure_speaking_stage(engine)?;
        Ok(self
            .speech
            .recognizer
            .start_listening(self.settings.target_language())?)
    }

    /// Wait for the speaking transcript and score it. A failed capture scores
    /// as an empty transcript.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::WrongStage`, without waiting on the capture, if the
    /// exam is not at the speaking stage.
    pub async fn finish_speaking(
        &self,
        engine: &mut ExamEngine,
        capture: PendingCapture,
    ) -> Result<ExamReport, ExamServiceError> {
        ensure_speaking_stage(engine)?;
        let transcript = capture.transcript().await;
        let report = engine.submit_speaking(&transcript)?;
        info!(
            total = report.total,
            verdict = %report.verdict,
            "mock exam finished"
        );
        Ok(report)
    }
}

fn ensure_speaking_stage(engine: &ExamEngine) -> Result<(), ExamError> {
    if engine.stage() == ExamStage::Speaking {
        Ok(())
    } else {
        Err(ExamError::WrongStage {
            attempted: ExamStage::Speaking,
            current: engine.stage(),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use lingua_core::exam::Verdict;
    use lingua_core::model::{ExamQuestion, ExamTask};

    use crate::speech::{
        CaptureError, CaptureSlot, SilentSynthesizer, SpeechRecognizer, SpeechSynthesizer,
        capture_channel,
    };

    #[derive(Default)]
    struct RecordingSynthesizer {
        spoken: Mutex<Vec<String>>,
    }

    impl SpeechSynthesizer for RecordingSynthesizer {
        fn speak(&self, text: &str, _language_tag: &str) {
            self.spoken.lock().unwrap().push(text.to_string());
        }
    }

    #[derive(Default)]
    struct SlotRecognizer {
        slot: CaptureSlot,
    }

    impl SpeechRecognizer for SlotRecognizer {
        fn start_listening(&self, _language_tag: &str) -> Result<PendingCapture, CaptureError> {
            self.slot.begin()
        }
    }

    fn question(answer: &str) -> ExamQuestion {
        ExamQuestion {
            prompt: format!("Frage {answer}"),
            options: vec![answer.to_string(), "x".into()],
            answer: answer.to_string(),
        }
    }

    fn task() -> ExamTask {
        ExamTask {
            prompt: "Erzählen Sie".into(),
            keywords: ["familie".to_string()].into_iter().collect(),
            min_words: 5,
        }
    }

    fn exam() -> MockExam {
        MockExam {
            reading: vec![question("a")],
            listening: vec![question("b"), question("c")],
            writing: vec![task()],
            speaking: vec![task()],
        }
    }

    fn advance_to_speaking(engine: &mut ExamEngine) {
        engine.submit_reading(&[Some("a")]).unwrap();
        engine.submit_listening(&[Some("b"), Some("c")]).unwrap();
        engine
            .submit_writing("Meine Familie ist groß und deshalb laut")
            .unwrap();
    }

    #[test]
    fn listening_prompts_play_only_during_listening() {
        let synth = Arc::new(RecordingSynthesizer::default());
        let svc = ExamService::new(
            LearnerSettings::default(),
            SpeechIo::new(synth.clone(), Arc::new(SlotRecognizer::default())),
        );
        let mut engine = svc.start(exam()).unwrap();

        assert!(!svc.play_listening(&engine, 0));
        engine.submit_reading(&[Some("a")]).unwrap();
        assert!(svc.play_listening(&engine, 1));
        assert!(!svc.play_listening(&engine, 2));

        assert_eq!(synth.spoken.lock().unwrap().clone(), vec!["Frage c"]);
    }

    #[tokio::test]
    async fn speaking_capture_scores_transcript() {
        let recognizer = Arc::new(SlotRecognizer::default());
        let svc = ExamService::new(
            LearnerSettings::default(),
            SpeechIo::new(Arc::new(SilentSynthesizer), recognizer.clone()),
        );
        let mut engine = svc.start(exam()).unwrap();
        assert!(matches!(
            svc.start_speaking(&engine),
            Err(ExamServiceError::Exam(ExamError::WrongStage { .. }))
        ));

        advance_to_speaking(&mut engine);
        let capture = svc.start_speaking(&engine).unwrap();
        assert!(matches!(
            svc.start_speaking(&engine),
            Err(ExamServiceError::Capture(CaptureError::Busy))
        ));

        recognizer
            .slot
            .complete(Ok("Meine Familie wohnt in Berlin und ich auch".into()));
        let report = svc.finish_speaking(&mut engine, capture).await.unwrap();
        assert!(engine.is_finished());
        assert_eq!(report.reading, 5);
        assert_eq!(report.listening, 10);
        assert_eq!(report.verdict, Verdict::BorderlineOrBelow);
    }

    #[tokio::test]
    async fn finish_speaking_out_of_stage_fails_without_waiting() {
        let svc = ExamService::new(LearnerSettings::default(), SpeechIo::silent());
        let mut engine = svc.start(exam()).unwrap();
        let (_responder, capture) = capture_channel();

        let outcome = tokio::time::timeout(
            Duration::from_secs(1),
            svc.finish_speaking(&mut engine, capture),
        )
        .await
        .expect("returns before any transcript arrives");
        assert!(matches!(
            outcome,
            Err(ExamServiceError::Exam(ExamError::WrongStage {
                current: ExamStage::Reading,
                ..
            }))
        ));
        assert_eq!(engine.stage(), ExamStage::Reading);
    }

    #[tokio::test]
    async fn failed_capture_scores_as_empty() {
        let recognizer = Arc::new(SlotRecognizer::default());
        let svc = ExamService::new(
            LearnerSettings::default(),
            SpeechIo::new(Arc::new(SilentSynthesizer), recognizer.clone()),
        );
        let mut engine = svc.start(exam()).unwrap();
        advance_to_speaking(&mut engine);

        let capture = svc.start_speaking(&engine).unwrap();
        recognizer
            .slot
            .complete(Err(CaptureError::Recognition("timeout".into())));
        let report = svc.finish_speaking(&mut engine, capture).await.unwrap();
        assert_eq!(report.speaking, 0);
    }
}
