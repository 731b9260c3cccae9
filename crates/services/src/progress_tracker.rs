use std::sync::Arc;

use tracing::{info, warn};

use lingua_core::model::StreakPolicy;
use lingua_core::progress::{ProgressState, format_day, parse_day};
use storage::keys;
use storage::repository::{KeyValueStore, StorageError};

use crate::Clock;

/// Records lesson completions and maintains XP and the daily streak.
#[derive(Clone)]
pub struct ProgressTracker {
    clock: Clock,
    kv: Arc<dyn KeyValueStore>,
    policy: StreakPolicy,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(clock: Clock, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            kv,
            policy: StreakPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: StreakPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> StreakPolicy {
        self.policy
    }

    /// Persisted counters. Values that fail to parse read as absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn state(&self) -> Result<ProgressState, StorageError> {
        let xp = self.read_counter(keys::XP).await?.unwrap_or(0);
        let streak = self.read_counter(keys::STREAK).await?.unwrap_or(0);
        let last_active_day = match self.kv.get(keys::LAST_DAY).await? {
            Some(raw) => {
                let day = parse_day(&raw);
                if day.is_none() {
                    warn!(key = keys::LAST_DAY, value = %raw, "ignoring unparseable day");
                }
                day
            }
            None => None,
        };
        Ok(ProgressState {
            xp,
            streak,
            last_active_day,
        })
    }

    /// Store the lesson score, then award XP and advance the streak for today.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any key cannot be read or written.
    pub async fn complete_lesson(&self, lesson_id: &str, score: u32) -> Result<ProgressState, StorageError> {
        self.kv
            .set(&keys::lesson_done(lesson_id), &score.to_string())
            .await?;

        let today = self.clock.today();
        let next = self.state().await?.after_lesson(today, self.policy);

        self.kv.set(keys::XP, &next.xp.to_string()).await?;
        self.kv.set(keys::STREAK, &next.streak.to_string()).await?;
        self.kv.set(keys::LAST_DAY, &format_day(today)).await?;

        info!(
            lesson_id,
            score,
            xp = next.xp,
            streak = next.streak,
            "lesson completed"
        );
        Ok(next)
    }

    /// Score recorded for a completed lesson, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn lesson_score(&self, lesson_id: &str) -> Result<Option<u32>, StorageError> {
        self.read_counter(&keys::lesson_done(lesson_id)).await
    }

    async fn read_counter(&self, key: &str) -> Result<Option<u32>, StorageError> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(None);
        };
        match raw.trim().parse::<u32>() {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(key, value = %raw, error = %err, "ignoring unparseable counter");
                Ok(None)
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
