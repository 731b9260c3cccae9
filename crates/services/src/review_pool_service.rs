use std::sync::Arc;

use tracing::{debug, info};

use lingua_core::model::{ReviewEntry, ReviewLevel};
use lingua_core::review_pool::ReviewPool;
use storage::keys;
use storage::repository::{KeyValueStore, StorageError};

//
// ─── REVIEW ANSWER ─────────────────────────────────────────────────────────────
//

/// Outcome of a typed recall against a pool entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAnswer {
    /// Correct at the top level; the entry left the pool.
    Mastered,
    /// Correct below the top level. `level` is what the stored match now holds,
    /// which differs from the answered entry when the prompt is duplicated.
    Promoted { level: ReviewLevel },
    /// Wrong; the pool is unchanged.
    Incorrect,
    /// Correct, but the entry is no longer stored; the pool is unchanged.
    Missing,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Persists missed prompts under the `review_pool` key.
///
/// Every mutation is a read-modify-write of the whole blob. Segments that fail
/// to decode are dropped on the next rewrite.
#[derive(Clone)]
pub struct ReviewPoolService {
    kv: Arc<dyn KeyValueStore>,
}

impl ReviewPoolService {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Current pool as stored; an absent key is an empty pool.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn load(&self) -> Result<ReviewPool, StorageError> {
        let blob = self.kv.get(keys::REVIEW_POOL).await?;
        Ok(blob.map(|b| ReviewPool::decode(&b)).unwrap_or_default())
    }

    async fn save(&self, pool: &ReviewPool) -> Result<(), StorageError> {
        self.kv.set(keys::REVIEW_POOL, &pool.encode()).await
    }

    /// Append a level-0 entry. Duplicates are kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the pool cannot be read or written.
    pub async fn add_miss(&self, prompt_native: &str, correct_answer: &str) -> Result<(), StorageError> {
        let mut pool = self.load().await?;
        pool.add_miss(prompt_native, correct_answer);
        self.save(&pool).await?;
        debug!(prompt = prompt_native, size = pool.len(), "review miss recorded");
        Ok(())
    }

    /// Entries ordered by ascending level, stored order within a level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the pool cannot be read.
    pub async fn entries(&self) -> Result<Vec<ReviewEntry>, StorageError> {
        Ok(self.load().await?.by_level())
    }

    /// Promote the first entry with this prompt and return its new level.
    /// Returns `None`, without writing, when no entry matches.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the pool cannot be read or written.
    pub async fn promote(&self, prompt_native: &str) -> Result<Option<ReviewLevel>, StorageError> {
        let mut pool = self.load().await?;
        let Some(level) = pool.promote(prompt_native) else {
            return Ok(None);
        };
        self.save(&pool).await?;
        debug!(prompt = prompt_native, %level, "review entry promoted");
        Ok(Some(level))
    }

    /// Delete every entry with this exact prompt and answer. Nothing is
    /// written when no entry matches.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the pool cannot be read or written.
    pub async fn remove(&self, prompt_native: &str, correct_answer: &str) -> Result<usize, StorageError> {
        let mut pool = self.load().await?;
        let removed = pool.remove(prompt_native, correct_answer);
        if removed > 0 {
            self.save(&pool).await?;
        }
        Ok(removed)
    }

    /// Drop the whole pool.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key cannot be removed.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.kv.remove(keys::REVIEW_POOL).await?;
        info!("review pool cleared");
        Ok(())
    }

    /// Check a typed recall and apply the result to the pool.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the pool cannot be read or written.
    pub async fn answer(&self, entry: &ReviewEntry, typed: &str) -> Result<ReviewAnswer, StorageError> {
        if !entry.accepts(typed) {
            return Ok(ReviewAnswer::Incorrect);
        }

        if entry.level.is_max() {
            if self.remove(&entry.prompt_native, &entry.correct_answer).await? == 0 {
                return Ok(ReviewAnswer::Missing);
            }
            info!(prompt = %entry.prompt_native, "review entry mastered");
            return Ok(ReviewAnswer::Mastered);
        }

        match self.promote(&entry.prompt_native).await? {
            Some(level) => Ok(ReviewAnswer::Promoted { level }),
            None => Ok(ReviewAnswer::Missing),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
