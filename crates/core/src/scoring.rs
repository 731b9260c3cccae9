//! Rubric scoring for free-text and transcribed spoken responses.
//!
//! A response earns up to 25 points from three sub-scores:
//!
//! | rubric   | max | rule                                                  |
//! |----------|-----|-------------------------------------------------------|
//! | length   | 10  | word count against `min_words` thresholds             |
//! | keywords | 8   | 2 per distinct keyword found (case-insensitive)       |
//! | cohesion | 7   | 1 per distinct connector found (case-insensitive)     |

use std::collections::BTreeSet;

/// Maximum points a single response can earn.
pub const MAX_RESPONSE_SCORE: u32 = 25;

pub const MAX_LENGTH_SCORE: u32 = 10;
pub const MAX_KEYWORD_SCORE: u32 = 8;
pub const MAX_COHESION_SCORE: u32 = 7;

/// Discourse connectors that signal a structured answer.
pub const CONNECTORS: [&str; 11] = [
    "weil",
    "deshalb",
    "obwohl",
    "zuerst",
    "danach",
    "schließlich",
    "aber",
    "und",
    "oder",
    "denn",
    "dass",
];

/// Sub-score breakdown of a scored response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseScore {
    pub length: u32,
    pub keywords: u32,
    pub cohesion: u32,
    pub total: u32,
}

/// Score `text` and return only the capped total.
#[must_use]
pub fn score<I, S>(text: &str, keywords: I, min_words: u32) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    score_breakdown(text, keywords, min_words).total
}

/// Score `text` against the keyword set and minimum word count.
///
/// Keywords are compared case-insensitively as substrings of the whole text and
/// each distinct keyword counts once.
#[must_use]
pub fn score_breakdown<I, S>(text: &str, keywords: I, min_words: u32) -> ResponseScore
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let word_count = u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX);
    let length = length_score(word_count, min_words);

    let lower = text.to_lowercase();

    let distinct: BTreeSet<String> = keywords
        .into_iter()
        .map(|k| k.as_ref().to_lowercase())
        .collect();
    let hits = count_u32(distinct.iter().filter(|k| lower.contains(k.as_str())).count());
    let keywords = hits.saturating_mul(2).min(MAX_KEYWORD_SCORE);

    let connectors = count_u32(CONNECTORS.iter().filter(|c| lower.contains(**c)).count());
    let cohesion = connectors.min(MAX_COHESION_SCORE);

    ResponseScore {
        length,
        keywords,
        cohesion,
        total: (length + keywords + cohesion).min(MAX_RESPONSE_SCORE),
    }
}

fn length_score(word_count: u32, min_words: u32) -> u32 {
    if word_count >= min_words.saturating_add(40) {
        MAX_LENGTH_SCORE
    } else if word_count >= min_words.saturating_add(20) {
        8
    } else if word_count >= min_words {
        6
    } else if word_count >= min_words / 2 {
        3
    } else {
        0
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
