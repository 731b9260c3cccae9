use chrono::NaiveDate;

use crate::model::StreakPolicy;

/// Flat XP award per completed lesson, independent of its score.
pub const XP_PER_LESSON: u32 = 10;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Learner counters persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub xp: u32,
    pub streak: u32,
    pub last_active_day: Option<NaiveDate>,
}

impl ProgressState {
    /// State after completing one lesson on `today`.
    ///
    /// The streak continues when the last active day is today or yesterday and
    /// restarts at 1 otherwise. With `StreakPolicy::IncrementOnRepeat` a second
    /// completion on the same day increments again.
    #[must_use]
    pub fn after_lesson(&self, today: NaiveDate, policy: StreakPolicy) -> Self {
        let yesterday = today.pred_opt();
        let streak = match self.last_active_day {
            Some(last) if last == today => match policy {
                StreakPolicy::IncrementOnRepeat => self.streak.saturating_add(1),
                StreakPolicy::OncePerDay => self.streak.max(1),
            },
            Some(last) if Some(last) == yesterday => self.streak.saturating_add(1),
            _ => 1,
        };

        Self {
            xp: self.xp.saturating_add(XP_PER_LESSON),
            streak,
            last_active_day: Some(today),
        }
    }
}

/// Render a day the way it is persisted (`YYYY-MM-DD`).
#[must_use]
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parse a persisted day, returning `None` for anything unreadable.
#[must_use]
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DAY_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state(streak: u32, last: Option<NaiveDate>) -> ProgressState {
        ProgressState {
            xp: 40,
            streak,
            last_active_day: last,
        }
    }

    #[test]
    fn yesterday_extends_streak() {
        let today = day(2024, 3, 1);
        let next = state(4, Some(day(2024, 2, 29))).after_lesson(today, StreakPolicy::default());
        assert_eq!(next.streak, 5);
        assert_eq!(next.xp, 50);
        assert_eq!(next.last_active_day, Some(today));
    }

    #[test]
    fn two_days_ago_resets_streak() {
        let today = day(2024, 3, 1);
        let next = state(4, Some(day(2024, 2, 28))).after_lesson(today, StreakPolicy::default());
        assert_eq!(next.streak, 1);
    }

    #[test]
    fn first_lesson_starts_streak() {
        let next = ProgressState::default().after_lesson(day(2024, 1, 1), StreakPolicy::default());
        assert_eq!(next, state_with(10, 1, day(2024, 1, 1)));
    }

    fn state_with(xp: u32, streak: u32, last: NaiveDate) -> ProgressState {
        ProgressState {
            xp,
            streak,
            last_active_day: Some(last),
        }
    }

    #[test]
    fn same_day_repeat_increments_by_default() {
        let today = day(2024, 3, 1);
        let next = state(2, Some(today)).after_lesson(today, StreakPolicy::IncrementOnRepeat);
        assert_eq!(next.streak, 3);
    }

    #[test]
    fn same_day_repeat_is_idempotent_once_per_day() {
        let today = day(2024, 3, 1);
        let next = state(2, Some(today)).after_lesson(today, StreakPolicy::OncePerDay);
        assert_eq!(next.streak, 2);
        assert_eq!(next.xp, 50);
    }

    #[test]
    fn future_last_day_resets_streak() {
        let next = state(9, Some(day(2024, 5, 1))).after_lesson(day(2024, 3, 1), StreakPolicy::default());
        assert_eq!(next.streak, 1);
    }

    #[test]
    fn days_round_trip_through_persisted_form() {
        let d = day(2024, 2, 29);
        assert_eq!(format_day(d), "2024-02-29");
        assert_eq!(parse_day("2024-02-29"), Some(d));
        assert_eq!(parse_day("yesterday"), None);
    }
}
