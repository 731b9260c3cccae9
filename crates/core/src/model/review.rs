use std::fmt;

use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur when building review pool values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("invalid review level value: {0}")]
    InvalidLevel(u8),
}

//
// ─── REVIEW LEVEL ─────────────────────────────────────────────────────────────
//

/// Leitner box an entry sits in.
///
/// - `0`: freshly missed
/// - `1`: recalled once
/// - `2`: recalled twice; the next correct answer masters it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ReviewLevel(u8);

impl ReviewLevel {
    pub const NEW: Self = Self(0);
    pub const MAX: Self = Self(2);

    /// Converts a numeric level (0-2) to a `ReviewLevel`.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidLevel` if the value is above 2.
    pub fn from_u8(value: u8) -> Result<Self, ReviewError> {
        if value <= Self::MAX.0 {
            Ok(Self(value))
        } else {
            Err(ReviewError::InvalidLevel(value))
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Next level up, saturating at `MAX`.
    #[must_use]
    pub fn promoted(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX.0))
    }

    #[must_use]
    pub fn is_max(self) -> bool {
        self == Self::MAX
    }
}

impl fmt::Display for ReviewLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── REVIEW ENTRY ─────────────────────────────────────────────────────────────
//

/// A missed prompt waiting in the review pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub level: ReviewLevel,
    pub prompt_native: String,
    pub correct_answer: String,
}

impl ReviewEntry {
    #[must_use]
    pub fn new(
        level: ReviewLevel,
        prompt_native: impl Into<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            level,
            prompt_native: prompt_native.into(),
            correct_answer: correct_answer.into(),
        }
    }

    /// Trimmed, case-insensitive comparison of a typed recall against the answer.
    #[must_use]
    pub fn accepts(&self, typed: &str) -> bool {
        typed.trim().to_lowercase() == self.correct_answer.trim().to_lowercase()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_level_conversion_works() {
        assert_eq!(ReviewLevel::from_u8(0).unwrap(), ReviewLevel::NEW);
        assert_eq!(ReviewLevel::from_u8(2).unwrap(), ReviewLevel::MAX);
        let err = ReviewLevel::from_u8(3).unwrap_err();
        assert!(matches!(err, ReviewError::InvalidLevel(3)));
    }

    #[test]
    fn promotion_saturates_at_max() {
        let level = ReviewLevel::NEW.promoted().promoted().promoted();
        assert_eq!(level, ReviewLevel::MAX);
        assert!(level.is_max());
    }

    #[test]
    fn typed_recall_ignores_case_and_padding() {
        let entry = ReviewEntry::new(ReviewLevel::NEW, "ধন্যবাদ", "Danke");
        assert!(entry.accepts("  danke "));
        assert!(!entry.accepts("bitte"));
    }
}
