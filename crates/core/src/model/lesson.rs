use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a step record cannot become a `Step`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepError {
    #[error("unknown step type: {0}")]
    UnknownKind(String),

    #[error("step prompt cannot be empty")]
    EmptyPrompt,

    #[error("{kind} step requires at least one option")]
    MissingOptions { kind: StepKind },

    #[error("match step requires at least one pair")]
    MissingPairs,

    #[error("{kind} step requires an answer")]
    MissingAnswer { kind: StepKind },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonValidationError {
    #[error("lesson id cannot be empty")]
    EmptyId,

    #[error("lesson {lesson_id} has no steps")]
    NoSteps { lesson_id: String },

    #[error("lesson {lesson_id}, step {index}: {source}")]
    Step {
        lesson_id: String,
        index: usize,
        #[source]
        source: StepError,
    },
}

//
// ─── STEP KIND ─────────────────────────────────────────────────────────────────
//

/// Closed set of exercise types a lesson step can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Mcq,
    Match,
    Listen,
    TypeIn,
    Speak,
}

impl StepKind {
    /// Parses the `type` tag used in lesson content.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "mcq" => Some(Self::Mcq),
            "match" => Some(Self::Match),
            "listen" => Some(Self::Listen),
            "typein" => Some(Self::TypeIn),
            "speak" => Some(Self::Speak),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Mcq => "mcq",
            Self::Match => "match",
            Self::Listen => "listen",
            Self::TypeIn => "typein",
            Self::Speak => "speak",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

//
// ─── STEP ──────────────────────────────────────────────────────────────────────
//

/// A native/target word pair shown in a matching exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairItem {
    #[serde(alias = "bn")]
    pub native: String,
    #[serde(alias = "de")]
    pub target: String,
}

impl PairItem {
    #[must_use]
    pub fn new(native: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            native: native.into(),
            target: target.into(),
        }
    }
}

/// Variant-specific payload of a step.
///
/// An `Mcq` without an answer is an unscored practice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepBody {
    Mcq {
        options: Vec<String>,
        answer: Option<String>,
    },
    Match {
        pairs: Vec<PairItem>,
    },
    Listen,
    TypeIn {
        answer: String,
    },
    Speak {
        answer: String,
    },
}

impl StepBody {
    #[must_use]
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Mcq { .. } => StepKind::Mcq,
            Self::Match { .. } => StepKind::Match,
            Self::Listen => StepKind::Listen,
            Self::TypeIn { .. } => StepKind::TypeIn,
            Self::Speak { .. } => StepKind::Speak,
        }
    }
}

/// One validated exercise inside a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    prompt_native: String,
    prompt_target: Option<String>,
    body: StepBody,
}

impl Step {
    /// Build a step, enforcing the per-variant requirements.
    ///
    /// # Errors
    ///
    /// Returns `StepError` when the prompt is blank, an `Mcq` has no options, a `Match`
    /// has no pairs, or a `TypeIn`/`Speak` answer is blank.
    pub fn new(
        prompt_native: impl Into<String>,
        prompt_target: Option<String>,
        body: StepBody,
    ) -> Result<Self, StepError> {
        let prompt_native = prompt_native.into();
        if prompt_native.trim().is_empty() {
            return Err(StepError::EmptyPrompt);
        }

        match &body {
            StepBody::Mcq { options, .. } if options.is_empty() => {
                return Err(StepError::MissingOptions {
                    kind: StepKind::Mcq,
                });
            }
            StepBody::Match { pairs } if pairs.is_empty() => return Err(StepError::MissingPairs),
            StepBody::TypeIn { answer } | StepBody::Speak { answer } if answer.trim().is_empty() => {
                return Err(StepError::MissingAnswer { kind: body.kind() });
            }
            _ => {}
        }

        Ok(Self {
            prompt_native,
            prompt_target: prompt_target.filter(|t| !t.trim().is_empty()),
            body,
        })
    }

    #[must_use]
    pub fn kind(&self) -> StepKind {
        self.body.kind()
    }

    #[must_use]
    pub fn prompt_native(&self) -> &str {
        &self.prompt_native
    }

    #[must_use]
    pub fn prompt_target(&self) -> Option<&str> {
        self.prompt_target.as_deref()
    }

    #[must_use]
    pub fn body(&self) -> &StepBody {
        &self.body
    }

    /// The expected answer, when the variant carries one.
    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        match &self.body {
            StepBody::Mcq { answer, .. } => answer.as_deref(),
            StepBody::TypeIn { answer } | StepBody::Speak { answer } => Some(answer),
            StepBody::Match { .. } | StepBody::Listen => None,
        }
    }

    /// Text recorded in the review pool when this step is missed.
    ///
    /// Falls back from the answer to the target prompt, then the first pair's target.
    #[must_use]
    pub fn review_answer(&self) -> &str {
        if let Some(answer) = self.answer() {
            return answer;
        }
        if let Some(target) = self.prompt_target() {
            return target;
        }
        match &self.body {
            StepBody::Match { pairs } => pairs.first().map_or("", |p| p.target.as_str()),
            _ => "",
        }
    }
}

//
// ─── CONTENT RECORDS ───────────────────────────────────────────────────────────
//

/// Loose step shape as it appears in lesson JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(alias = "promptBn")]
    pub prompt_native: String,
    #[serde(alias = "promptDe", default)]
    pub prompt_target: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub pairs: Option<Vec<PairItem>>,
}

impl StepRecord {
    /// Validate the record into a typed `Step`.
    ///
    /// # Errors
    ///
    /// Returns `StepError` if the type tag is unknown or a required field is missing.
    pub fn validate(self) -> Result<Step, StepError> {
        let kind = StepKind::from_tag(&self.kind).ok_or(StepError::UnknownKind(self.kind))?;
        let body = match kind {
            StepKind::Mcq => StepBody::Mcq {
                options: self.options.unwrap_or_default(),
                answer: self.answer,
            },
            StepKind::Match => StepBody::Match {
                pairs: self.pairs.unwrap_or_default(),
            },
            StepKind::Listen => StepBody::Listen,
            StepKind::TypeIn => StepBody::TypeIn {
                answer: self.answer.ok_or(StepError::MissingAnswer { kind })?,
            },
            StepKind::Speak => StepBody::Speak {
                answer: self.answer.ok_or(StepError::MissingAnswer { kind })?,
            },
        };
        Step::new(self.prompt_native, self.prompt_target, body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecord {
    pub id: String,
    pub title: String,
    pub level: String,
    pub steps: Vec<StepRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub level: String,
    pub lessons: Vec<LessonRecord>,
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// An immutable, validated lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: String,
    title: String,
    level: String,
    steps: Vec<Step>,
}

impl Lesson {
    /// # Errors
    ///
    /// Returns `LessonValidationError` if the id is blank or `steps` is empty.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        level: impl Into<String>,
        steps: Vec<Step>,
    ) -> Result<Self, LessonValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(LessonValidationError::EmptyId);
        }
        if steps.is_empty() {
            return Err(LessonValidationError::NoSteps { lesson_id: id });
        }
        Ok(Self {
            id,
            title: title.into(),
            level: level.into(),
            steps,
        })
    }

    /// # Errors
    ///
    /// Returns `LessonValidationError::Step` naming the first invalid step.
    pub fn from_record(record: LessonRecord) -> Result<Self, LessonValidationError> {
        let LessonRecord {
            id,
            title,
            level,
            steps,
        } = record;

        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| {
                step.validate().map_err(|source| LessonValidationError::Step {
                    lesson_id: id.clone(),
                    index,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(id, title, level, steps)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

/// Lessons grouped under one proficiency level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonCategory {
    pub level: String,
    pub lessons: Vec<Lesson>,
}

impl LessonCategory {
    /// # Errors
    ///
    /// Returns the first lesson validation failure.
    pub fn from_record(record: CategoryRecord) -> Result<Self, LessonValidationError> {
        let lessons = record
            .lessons
            .into_iter()
            .map(Lesson::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            level: record.level,
            lessons,
        })
    }

    #[must_use]
    pub fn find(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id() == lesson_id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
