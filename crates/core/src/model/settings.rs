use thiserror::Error;

/// How a repeat completion on the same calendar day affects the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreakPolicy {
    /// Every completion on an active day counts, so repeats keep incrementing.
    #[default]
    IncrementOnRepeat,
    /// At most one increment per calendar day.
    OncePerDay,
}

impl StreakPolicy {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "increment" => Some(Self::IncrementOnRepeat),
            "once-per-day" => Some(Self::OncePerDay),
            _ => None,
        }
    }
}

pub const DEFAULT_TARGET_LANGUAGE: &str = "de-DE";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LearnerSettings {
    target_language: String,
    streak_policy: StreakPolicy,
}

#[derive(Clone, Debug, Default)]
pub struct LearnerSettingsDraft {
    pub target_language: Option<String>,
    pub streak_policy: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LearnerSettingsError {
    #[error("invalid language tag: {0}")]
    InvalidLanguageTag(String),
    #[error("unknown streak policy: {0} (expected `increment` or `once-per-day`)")]
    UnknownStreakPolicy(String),
}

impl LearnerSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft into settings.
    ///
    /// # Errors
    ///
    /// Returns `LearnerSettingsError` if the language tag is malformed or the streak
    /// policy name is unknown.
    pub fn validate(self) -> Result<LearnerSettings, LearnerSettingsError> {
        let target_language = match normalize_optional(self.target_language) {
            Some(tag) if is_language_tag(&tag) => tag,
            Some(tag) => return Err(LearnerSettingsError::InvalidLanguageTag(tag)),
            None => DEFAULT_TARGET_LANGUAGE.to_string(),
        };

        let streak_policy = match normalize_optional(self.streak_policy) {
            Some(name) => StreakPolicy::from_name(&name)
                .ok_or(LearnerSettingsError::UnknownStreakPolicy(name))?,
            None => StreakPolicy::default(),
        };

        Ok(LearnerSettings {
            target_language,
            streak_policy,
        })
    }
}

impl LearnerSettings {
    #[must_use]
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    #[must_use]
    pub fn streak_policy(&self) -> StreakPolicy {
        self.streak_policy
    }

    #[must_use]
    pub fn with_streak_policy(mut self, policy: StreakPolicy) -> Self {
        self.streak_policy = policy;
        self
    }
}

impl Default for LearnerSettings {
    fn default() -> Self {
        Self {
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            streak_policy: StreakPolicy::default(),
        }
    }
}

// Accepts `de`, `de-DE`, `zh-Hant-TW`: alphabetic primary subtag, alphanumeric rest.
fn is_language_tag(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let primary_ok = parts
        .next()
        .is_some_and(|p| (2..=3).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphabetic()));
    primary_ok && parts.all(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
