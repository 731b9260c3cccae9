use thiserror::Error;

use crate::model::{Lesson, Step, StepBody, StepKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson already finished")]
    Finished,

    #[error("answer does not fit the current {expected} step")]
    AnswerMismatch { expected: StepKind },
}

/// What the learner did on the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAnswer {
    /// Picked an option of a multiple-choice step.
    Choice(String),
    /// Selected a pair of a matching step, by index.
    MatchPair(usize),
    /// Moved past a listening step.
    Continue,
    /// Typed recall.
    Typed(String),
    /// Transcript returned by speech recognition; empty when nothing was heard.
    Spoken(String),
}

/// A prompt the learner got wrong, to be queued for review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewMiss {
    pub prompt_native: String,
    pub correct_answer: String,
}

/// Emitted once, when the last step is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonCompletion {
    pub lesson_id: String,
    pub score: u32,
    pub total: usize,
}

/// Result of submitting one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFeedback {
    pub step_index: usize,
    pub kind: StepKind,
    /// `None` for steps without a right answer (listening, unscored choice).
    pub correct: Option<bool>,
    pub miss: Option<ReviewMiss>,
    pub completion: Option<LessonCompletion>,
}

/// Aggregated view of lesson progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonProgress {
    pub step: usize,
    pub total: usize,
    pub score: u32,
    pub is_finished: bool,
}

/// Steps through a lesson one submission at a time.
#[derive(Debug, Clone)]
pub struct LessonSession {
    lesson: Lesson,
    current: usize,
    score: u32,
    finished: bool,
}

impl LessonSession {
    #[must_use]
    pub fn new(lesson: Lesson) -> Self {
        Self {
            lesson,
            current: 0,
            score: 0,
            finished: false,
        }
    }

    #[must_use]
    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    #[must_use]
    pub fn step_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        if self.finished {
            None
        } else {
            self.lesson.steps().get(self.current)
        }
    }

    #[must_use]
    pub fn progress(&self) -> LessonProgress {
        LessonProgress {
            step: self.current,
            total: self.lesson.step_count(),
            score: self.score,
            is_finished: self.finished,
        }
    }

    /// Evaluate `answer` against the current step and advance.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Finished` once the last step has been submitted, and
    /// `LessonError::AnswerMismatch` if the answer kind does not fit the step. Neither
    /// error changes the session.
    pub fn submit(&mut self, answer: &StepAnswer) -> Result<StepFeedback, LessonError> {
        let Some(step) = self.current_step() else {
            return Err(LessonError::Finished);
        };
        let kind = step.kind();
        let correct = evaluate(step, answer)?;

        let miss = match correct {
            Some(false) => Some(ReviewMiss {
                prompt_native: step.prompt_native().to_string(),
                correct_answer: step.review_answer().to_string(),
            }),
            _ => None,
        };
        if correct == Some(true) {
            self.score += 1;
        }

        let step_index = self.current;
        let completion = if self.current + 1 < self.lesson.step_count() {
            self.current += 1;
            None
        } else {
            self.finished = true;
            Some(LessonCompletion {
                lesson_id: self.lesson.id().to_string(),
                score: self.score,
                total: self.lesson.step_count(),
            })
        };

        Ok(StepFeedback {
            step_index,
            kind,
            correct,
            miss,
            completion,
        })
    }
}

fn evaluate(step: &Step, answer: &StepAnswer) -> Result<Option<bool>, LessonError> {
    let verdict = match (step.body(), answer) {
        (StepBody::Mcq { answer: expected, .. }, StepAnswer::Choice(chosen)) => {
            expected.as_ref().map(|expected| expected == chosen)
        }
        // Any selected pair counts as a match.
        (StepBody::Match { .. }, StepAnswer::MatchPair(_)) => Some(true),
        (StepBody::Listen, StepAnswer::Continue) => None,
        (StepBody::TypeIn { answer: expected }, StepAnswer::Typed(given))
        | (StepBody::Speak { answer: expected }, StepAnswer::Spoken(given)) => {
            Some(normalize(given) == normalize(expected))
        }
        _ => {
            return Err(LessonError::AnswerMismatch {
                expected: step.kind(),
            });
        }
    };
    Ok(verdict)
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PairItem;

    fn mcq(answer: Option<&str>) -> Step {
        Step::new(
            "আপেল",
            None,
            StepBody::Mcq {
                options: vec!["der Apfel".into(), "die Birne".into()],
                answer: answer.map(str::to_string),
            },
        )
        .unwrap()
    }

    fn typein(answer: &str) -> Step {
        Step::new(
            "ধন্যবাদ",
            None,
            StepBody::TypeIn {
                answer: answer.into(),
            },
        )
        .unwrap()
    }

    fn listen() -> Step {
        Step::new("শোনো", Some("Guten Morgen".into()), StepBody::Listen).unwrap()
    }

    fn session(steps: Vec<Step>) -> LessonSession {
        LessonSession::new(Lesson::new("a1-1", "Basics", "A1", steps).unwrap())
    }

    #[test]
    fn three_step_lesson_scores_and_records_single_miss() {
        let mut s = session(vec![mcq(Some("der Apfel")), typein("Danke"), listen()]);

        let first = s.submit(&StepAnswer::Choice("der Apfel".into())).unwrap();
        assert_eq!(first.correct, Some(true));
        assert!(first.completion.is_none());

        let second = s.submit(&StepAnswer::Typed("Bitte".into())).unwrap();
        assert_eq!(second.correct, Some(false));
        assert_eq!(
            second.miss,
            Some(ReviewMiss {
                prompt_native: "ধন্যবাদ".into(),
                correct_answer: "Danke".into(),
            })
        );

        let third = s.submit(&StepAnswer::Continue).unwrap();
        assert_eq!(third.correct, None);
        assert!(third.miss.is_none());
        assert_eq!(
            third.completion,
            Some(LessonCompletion {
                lesson_id: "a1-1".into(),
                score: 1,
                total: 3,
            })
        );
        assert!(s.is_finished());
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn submitting_after_finish_is_rejected() {
        let mut s = session(vec![listen()]);
        s.submit(&StepAnswer::Continue).unwrap();
        assert_eq!(s.submit(&StepAnswer::Continue), Err(LessonError::Finished));
        assert!(s.current_step().is_none());
        assert_eq!(s.step_index(), 0);
    }

    #[test]
    fn mismatched_answer_does_not_advance() {
        let mut s = session(vec![typein("Danke"), listen()]);
        let err = s.submit(&StepAnswer::Continue).unwrap_err();
        assert_eq!(
            err,
            LessonError::AnswerMismatch {
                expected: StepKind::TypeIn
            }
        );
        assert_eq!(s.step_index(), 0);
    }

    #[test]
    fn typed_answers_ignore_case_and_padding() {
        let mut s = session(vec![typein("Danke schön"), listen()]);
        let fb = s.submit(&StepAnswer::Typed("  danke SCHÖN ".into())).unwrap();
        assert_eq!(fb.correct, Some(true));
    }

    #[test]
    fn mcq_option_comparison_is_exact() {
        let mut s = session(vec![mcq(Some("der Apfel")), listen()]);
        let fb = s.submit(&StepAnswer::Choice("Der Apfel".into())).unwrap();
        assert_eq!(fb.correct, Some(false));
        assert_eq!(fb.miss.unwrap().correct_answer, "der Apfel");
    }

    #[test]
    fn unscored_mcq_neither_scores_nor_misses() {
        let mut s = session(vec![mcq(None), listen()]);
        let fb = s.submit(&StepAnswer::Choice("die Birne".into())).unwrap();
        assert_eq!(fb.correct, None);
        assert!(fb.miss.is_none());
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn any_match_selection_is_correct() {
        let step = Step::new(
            "মিলাও",
            None,
            StepBody::Match {
                pairs: vec![PairItem::new("এক", "eins")],
            },
        )
        .unwrap();
        let mut s = session(vec![step]);
        let fb = s.submit(&StepAnswer::MatchPair(7)).unwrap();
        assert_eq!(fb.correct, Some(true));
        assert_eq!(fb.completion.unwrap().score, 1);
    }

    #[test]
    fn empty_transcript_is_a_miss_on_speak_step() {
        let step = Step::new(
            "সুপ্রভাত",
            Some("Guten Morgen".into()),
            StepBody::Speak {
                answer: "Guten Morgen".into(),
            },
        )
        .unwrap();
        let mut s = session(vec![step]);
        let fb = s.submit(&StepAnswer::Spoken(String::new())).unwrap();
        assert_eq!(fb.correct, Some(false));
        assert_eq!(fb.miss.unwrap().correct_answer, "Guten Morgen");
    }

    #[test]
    fn progress_tracks_position() {
        let mut s = session(vec![listen(), listen()]);
        assert_eq!(
            s.progress(),
            LessonProgress {
                step: 0,
                total: 2,
                score: 0,
                is_finished: false
            }
        );
        s.submit(&StepAnswer::Continue).unwrap();
        assert_eq!(s.progress().step, 1);
    }
}
