//! Keys under which learner state is persisted.

pub const XP: &str = "xp";
pub const STREAK: &str = "streak";
pub const LAST_DAY: &str = "last_day";
pub const REVIEW_POOL: &str = "review_pool";

const LESSON_DONE_PREFIX: &str = "done_";

/// Key of the completion record for one lesson.
#[must_use]
pub fn lesson_done(lesson_id: &str) -> String {
    format!("{LESSON_DONE_PREFIX}{lesson_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_done_key_has_prefix() {
        assert_eq!(lesson_done("a1-greetings"), "done_a1-greetings");
    }
}
