//! Leveled pool of missed prompts and its persisted string encoding.
//!
//! The blob is `entry(;;entry)*` where each entry is `level:prompt||answer`.
//! A `|` inside prompt or answer is written as `/`, so that substitution is lossy.
//! Entries in memory always hold the escaped text.

use crate::model::{ReviewEntry, ReviewLevel};

pub const ENTRY_SEPARATOR: &str = ";;";
pub const ANSWER_SEPARATOR: &str = "||";
pub const LEVEL_SEPARATOR: char = ':';

/// Replace the reserved `|` so the text cannot break the entry framing.
#[must_use]
pub fn escape(text: &str) -> String {
    text.replace('|', "/")
}

/// In-memory view of the review pool in stored (insertion) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPool {
    entries: Vec<ReviewEntry>,
}

impl ReviewPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a persisted blob, skipping any segment that is not a well-formed entry.
    #[must_use]
    pub fn decode(blob: &str) -> Self {
        let entries = blob
            .split(ENTRY_SEPARATOR)
            .filter(|segment| !segment.trim().is_empty())
            .filter_map(parse_entry)
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn encode(&self) -> String {
        self.entries
            .iter()
            .map(encode_entry)
            .collect::<Vec<_>>()
            .join(ENTRY_SEPARATOR)
    }

    /// Entries in stored order.
    #[must_use]
    pub fn entries(&self) -> &[ReviewEntry] {
        &self.entries
    }

    /// Entries ordered by ascending level, stored order kept within a level.
    #[must_use]
    pub fn by_level(&self) -> Vec<ReviewEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|e| e.level);
        sorted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a level-0 entry. Repeated misses of one prompt accumulate.
    pub fn add_miss(&mut self, prompt_native: &str, correct_answer: &str) {
        self.entries.push(ReviewEntry::new(
            ReviewLevel::NEW,
            escape(prompt_native),
            escape(correct_answer),
        ));
    }

    /// Raise the first entry for `prompt_native` by one level (capped).
    ///
    /// Returns the level that entry now has, or `None` when no entry matches.
    pub fn promote(&mut self, prompt_native: &str) -> Option<ReviewLevel> {
        let key = escape(prompt_native);
        let entry = self.entries.iter_mut().find(|e| e.prompt_native == key)?;
        entry.level = entry.level.promoted();
        Some(entry.level)
    }

    /// Delete every entry with this exact prompt/answer pair, returning how many went.
    pub fn remove(&mut self, prompt_native: &str, correct_answer: &str) -> usize {
        let prompt = escape(prompt_native);
        let answer = escape(correct_answer);
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.prompt_native == prompt && e.correct_answer == answer));
        before - self.entries.len()
    }
}

impl FromIterator<ReviewEntry> for ReviewPool {
    fn from_iter<T: IntoIterator<Item = ReviewEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn encode_entry(entry: &ReviewEntry) -> String {
    format!(
        "{}{LEVEL_SEPARATOR}{}{ANSWER_SEPARATOR}{}",
        entry.level,
        escape(&entry.prompt_native),
        escape(&entry.correct_answer)
    )
}

fn parse_entry(segment: &str) -> Option<ReviewEntry> {
    let mut parts = segment.split(ANSWER_SEPARATOR);
    let (header, answer) = match (parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(answer), None) => (header, answer),
        _ => return None,
    };
    let (level, prompt) = header.split_once(LEVEL_SEPARATOR)?;
    let level = level.parse::<u8>().ok()?;
    let level = ReviewLevel::from_u8(level).ok()?;
    Some(ReviewEntry::new(level, prompt, answer))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
