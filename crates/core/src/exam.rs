use std::fmt;

use thiserror::Error;

use crate::model::{ExamQuestion, ExamTask, MockExam, MockExamError};
use crate::scoring::{self, MAX_RESPONSE_SCORE, ResponseScore};

/// Points awarded per correctly answered objective question.
pub const POINTS_PER_QUESTION: u32 = 5;
/// Cap for every section.
pub const SECTION_MAX: u32 = MAX_RESPONSE_SCORE;
/// Minimum total for a pass.
pub const PASS_TOTAL: u32 = 60;
/// Minimum score every single section needs for a pass.
pub const PASS_SECTION_MIN: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamError {
    #[error(transparent)]
    InvalidExam(#[from] MockExamError),

    #[error("cannot submit {attempted} while the exam is at {current}")]
    WrongStage {
        attempted: ExamStage,
        current: ExamStage,
    },
}

//
// ─── STAGES ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamStage {
    Reading,
    Listening,
    Writing,
    Speaking,
    Finished,
}

impl ExamStage {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Reading => Self::Listening,
            Self::Listening => Self::Writing,
            Self::Writing => Self::Speaking,
            Self::Speaking | Self::Finished => Self::Finished,
        }
    }
}

impl fmt::Display for ExamStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reading => "reading",
            Self::Listening => "listening",
            Self::Writing => "writing",
            Self::Speaking => "speaking",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}

//
// ─── REPORT ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    BorderlineOrBelow,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("Likely pass"),
            Self::BorderlineOrBelow => f.write_str("Borderline or below"),
        }
    }
}

/// Final result of a mock exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamReport {
    pub reading: u32,
    pub listening: u32,
    pub writing: u32,
    pub speaking: u32,
    pub total: u32,
    pub verdict: Verdict,
}

impl ExamReport {
    /// Aggregate four section scores. A pass needs the total threshold and no weak section.
    #[must_use]
    pub fn from_sections(reading: u32, listening: u32, writing: u32, speaking: u32) -> Self {
        let total = reading + listening + writing + speaking;
        let weakest = reading.min(listening).min(writing).min(speaking);
        let verdict = if total >= PASS_TOTAL && weakest >= PASS_SECTION_MIN {
            Verdict::Pass
        } else {
            Verdict::BorderlineOrBelow
        };

        Self {
            reading,
            listening,
            writing,
            speaking,
            total,
            verdict,
        }
    }
}

impl fmt::Display for ExamReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mock Exam Result")?;
        writeln!(f, "Reading: {}/{SECTION_MAX}", self.reading)?;
        writeln!(f, "Listening: {}/{SECTION_MAX}", self.listening)?;
        writeln!(f, "Writing: {}/{SECTION_MAX}", self.writing)?;
        writeln!(f, "Speaking: {}/{SECTION_MAX}", self.speaking)?;
        writeln!(f, "Total: {}/{}", self.total, SECTION_MAX * 4)?;
        write!(f, "{}", self.verdict)
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Score a block of objective questions against the learner's choices.
///
/// `choices[i]` is the option picked for question `i`; `None` or a missing entry
/// means unanswered.
#[must_use]
pub fn score_objective<S: AsRef<str>>(questions: &[ExamQuestion], choices: &[Option<S>]) -> u32 {
    let correct = questions
        .iter()
        .zip(choices)
        .filter(|(q, chosen)| matches!(chosen, Some(c) if c.as_ref() == q.answer.as_str()))
        .count();
    u32::try_from(correct)
        .unwrap_or(u32::MAX)
        .saturating_mul(POINTS_PER_QUESTION)
        .min(SECTION_MAX)
}

/// Forward-only state machine over the four exam sections.
#[derive(Debug, Clone)]
pub struct ExamEngine {
    exam: MockExam,
    stage: ExamStage,
    reading: u32,
    listening: u32,
    writing: u32,
    report: Option<ExamReport>,
}

impl ExamEngine {
    /// # Errors
    ///
    /// Returns `ExamError::InvalidExam` if the exam lacks a writing or speaking task.
    pub fn new(exam: MockExam) -> Result<Self, ExamError> {
        exam.validate()?;
        Ok(Self {
            exam,
            stage: ExamStage::Reading,
            reading: 0,
            listening: 0,
            writing: 0,
            report: None,
        })
    }

    #[must_use]
    pub fn stage(&self) -> ExamStage {
        self.stage
    }

    #[must_use]
    pub fn exam(&self) -> &MockExam {
        &self.exam
    }

    #[must_use]
    pub fn report(&self) -> Option<&ExamReport> {
        self.report.as_ref()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stage == ExamStage::Finished
    }

    #[must_use]
    pub fn reading_questions(&self) -> &[ExamQuestion] {
        &self.exam.reading
    }

    #[must_use]
    pub fn listening_questions(&self) -> &[ExamQuestion] {
        &self.exam.listening
    }

    /// The writing task; present by construction.
    #[must_use]
    pub fn writing_task(&self) -> &ExamTask {
        &self.exam.writing[0]
    }

    /// The speaking task; present by construction.
    #[must_use]
    pub fn speaking_task(&self) -> &ExamTask {
        &self.exam.speaking[0]
    }

    /// # Errors
    ///
    /// Returns `ExamError::WrongStage` unless the exam is at the reading stage.
    pub fn submit_reading<S: AsRef<str>>(&mut self, choices: &[Option<S>]) -> Result<u32, ExamError> {
        self.enter(ExamStage::Reading)?;
        self.reading = score_objective(&self.exam.reading, choices);
        self.stage = self.stage.next();
        Ok(self.reading)
    }

    /// # Errors
    ///
    /// Returns `ExamError::WrongStage` unless the exam is at the listening stage.
    pub fn submit_listening<S: AsRef<str>>(
        &mut self,
        choices: &[Option<S>],
    ) -> Result<u32, ExamError> {
        self.enter(ExamStage::Listening)?;
        self.listening = score_objective(&self.exam.listening, choices);
        self.stage = self.stage.next();
        Ok(self.listening)
    }

    /// # Errors
    ///
    /// Returns `ExamError::WrongStage` unless the exam is at the writing stage.
    pub fn submit_writing(&mut self, text: &str) -> Result<ResponseScore, ExamError> {
        self.enter(ExamStage::Writing)?;
        let task = self.writing_task();
        let breakdown = scoring::score_breakdown(text, &task.keywords, task.min_words);
        self.writing = breakdown.total;
        self.stage = self.stage.next();
        Ok(breakdown)
    }

    /// Score the speaking transcript and finish the exam.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::WrongStage` unless the exam is at the speaking stage.
    pub fn submit_speaking(&mut self, transcript: &str) -> Result<ExamReport, ExamError> {
        self.enter(ExamStage::Speaking)?;
        let task = self.speaking_task();
        let speaking = scoring::score(transcript, &task.keywords, task.min_words);
        let report = ExamReport::from_sections(self.reading, self.listening, self.writing, speaking);
        self.report = Some(report);
        self.stage = self.stage.next();
        Ok(report)
    }

    fn enter(&self, attempted: ExamStage) -> Result<(), ExamError> {
        if self.stage == attempted {
            Ok(())
        } else {
            Err(ExamError::WrongStage {
                attempted,
                current: self.stage,
            })
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answer: &str) -> ExamQuestion {
        ExamQuestion {
            prompt: "Wo wohnt Anna?".into(),
            options: vec!["Berlin".into(), "Hamburg".into(), answer.into()],
            answer: answer.into(),
        }
    }

    fn task(min_words: u32) -> ExamTask {
        ExamTask {
            prompt: "Schreiben Sie über Ihren Urlaub.".into(),
            keywords: ["urlaub", "familie"].into_iter().map(String::from).collect(),
            min_words,
        }
    }

    fn exam() -> MockExam {
        MockExam {
            reading: (0..5).map(|_| question("München")).collect(),
            listening: (0..5).map(|_| question("Köln")).collect(),
            writing: vec![task(10)],
            speaking: vec![task(5)],
        }
    }

    fn all(answer: &str) -> Vec<Option<String>> {
        vec![Some(answer.to_string()); 5]
    }

    #[test]
    fn five_correct_answers_fill_the_section() {
        let questions: Vec<_> = (0..5).map(|_| question("München")).collect();
        assert_eq!(score_objective(&questions, &all("München")), 25);
    }

    #[test]
    fn objective_section_is_capped() {
        let questions: Vec<_> = (0..7).map(|_| question("München")).collect();
        let choices = vec![Some("München"); 7];
        assert_eq!(score_objective(&questions, &choices), 25);
    }

    #[test]
    fn unanswered_and_wrong_questions_score_nothing() {
        let questions: Vec<_> = (0..5).map(|_| question("München")).collect();
        let choices = vec![Some("München"), None, Some("Berlin")];
        assert_eq!(score_objective(&questions, &choices), 5);
    }

    #[test]
    fn full_marks_pass() {
        let report = ExamReport::from_sections(25, 25, 25, 25);
        assert_eq!(report.total, 100);
        assert_eq!(report.verdict, Verdict::Pass);
    }

    #[test]
    fn weak_section_blocks_pass() {
        let report = ExamReport::from_sections(25, 25, 25, 5);
        assert_eq!(report.total, 80);
        assert_eq!(report.verdict, Verdict::BorderlineOrBelow);
    }

    #[test]
    fn pass_boundaries() {
        assert_eq!(ExamReport::from_sections(15, 15, 15, 15).verdict, Verdict::Pass);
        assert_eq!(
            ExamReport::from_sections(15, 15, 15, 14).verdict,
            Verdict::BorderlineOrBelow
        );
        assert_eq!(ExamReport::from_sections(25, 25, 10, 10).verdict, Verdict::Pass);
    }

    #[test]
    fn engine_walks_all_four_stages() {
        let mut engine = ExamEngine::new(exam()).unwrap();
        assert_eq!(engine.submit_reading(&all("München")).unwrap(), 25);
        assert_eq!(engine.submit_listening(&all("Köln")).unwrap(), 25);

        let writing = engine
            .submit_writing("Mein Urlaub mit der Familie war schön, weil die Sonne schien.")
            .unwrap();
        // 11 words >= 10 (6), 2 keywords (4), "weil" (1).
        assert_eq!(writing.total, 11);

        let report = engine.submit_speaking("").unwrap();
        assert_eq!(report.speaking, 0);
        assert_eq!(report.total, 61);
        assert_eq!(report.verdict, Verdict::BorderlineOrBelow);
        assert!(engine.is_finished());
        assert_eq!(engine.report(), Some(&report));
    }

    #[test]
    fn sections_cannot_be_skipped_or_repeated() {
        let mut engine = ExamEngine::new(exam()).unwrap();
        let err = engine.submit_writing("zu früh").unwrap_err();
        assert_eq!(
            err,
            ExamError::WrongStage {
                attempted: ExamStage::Writing,
                current: ExamStage::Reading
            }
        );

        engine.submit_reading(&all("München")).unwrap();
        assert!(engine.submit_reading(&all("München")).is_err());
        assert_eq!(engine.stage(), ExamStage::Listening);
    }

    #[test]
    fn exam_without_speaking_task_is_rejected() {
        let mut content = exam();
        content.speaking.clear();
        assert_eq!(
            ExamEngine::new(content).unwrap_err(),
            ExamError::InvalidExam(MockExamError::MissingSpeakingTask)
        );
    }

    #[test]
    fn report_renders_summary() {
        let text = ExamReport::from_sections(20, 15, 12, 18).to_string();
        assert_eq!(
            text,
            "Mock Exam Result\nReading: 20/25\nListening: 15/25\nWriting: 12/25\nSpeaking: 18/25\nTotal: 65/100\nLikely pass"
        );
    }
}
