//! Persistence boundary.
//!
//! The engine never writes anywhere itself. After every commit it hands a
//! [`StoreChange`] to an injected [`PersistenceNotifier`], which is free to
//! debounce, batch, or drop it.

use crate::types::{ItemKey, ReviewHistory, ScheduleState, DEFAULT_EASE_FACTOR};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What changed in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreChange {
    Reviewed { key: ItemKey },
    Attempted { key: ItemKey },
    Reset { key: ItemKey },
}

impl StoreChange {
    pub fn key(&self) -> &ItemKey {
        match self {
            Self::Reviewed { key } | Self::Attempted { key } | Self::Reset { key } => key,
        }
    }
}

/// Receives a signal after each committed change. Must not block.
pub trait PersistenceNotifier: Send {
    fn notify(&self, change: &StoreChange);
}

/// Discards every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl PersistenceNotifier for NoopNotifier {
    fn notify(&self, _change: &StoreChange) {}
}

impl<F> PersistenceNotifier for F
where
    F: Fn(&StoreChange) + Send,
{
    fn notify(&self, change: &StoreChange) {
        self(change)
    }
}

/// Flat, row-shaped form of a history entry for column stores.
///
/// Timestamps are epoch milliseconds. The `sm2_*` columns are all `None` for
/// an item that has attempts but no schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub key: ItemKey,
    pub attempts: u32,
    pub correct: u32,
    #[serde(default)]
    pub last_review: Option<i64>,
    #[serde(default)]
    pub sm2_interval: Option<f64>,
    #[serde(default)]
    pub sm2_repetitions: Option<u32>,
    #[serde(default)]
    pub sm2_ef: Option<f64>,
    #[serde(default)]
    pub sm2_next_review: Option<i64>,
}

impl HistoryRecord {
    pub fn from_history(key: &ItemKey, history: &ReviewHistory) -> Self {
        let schedule = history.schedule.as_ref();
        Self {
            key: key.clone(),
            attempts: history.attempts,
            correct: history.correct,
            last_review: history.last_review_at.map(|t| t.timestamp_millis()),
            sm2_interval: schedule.map(|s| s.interval),
            sm2_repetitions: schedule.map(|s| s.repetitions),
            sm2_ef: schedule.map(|s| s.ease_factor),
            sm2_next_review: schedule.map(|s| s.next_review_at.timestamp_millis()),
        }
    }

    /// Rebuild the history entry. A row with any `sm2_*` column set gets a
    /// schedule, with missing columns taking seed values. Corrupt values are
    /// repaired.
    pub fn into_history(self) -> (ItemKey, ReviewHistory) {
        let has_schedule = self.sm2_interval.is_some()
            || self.sm2_repetitions.is_some()
            || self.sm2_ef.is_some()
            || self.sm2_next_review.is_some();

        let schedule = has_schedule.then(|| ScheduleState {
            interval: self.sm2_interval.unwrap_or(0.0),
            repetitions: self.sm2_repetitions.unwrap_or(0),
            ease_factor: self.sm2_ef.unwrap_or(DEFAULT_EASE_FACTOR),
            next_review_at: self
                .sm2_next_review
                .and_then(DateTime::from_timestamp_millis)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        });

        let mut history = ReviewHistory {
            attempts: self.attempts,
            correct: self.correct,
            last_review_at: self.last_review.and_then(DateTime::from_timestamp_millis),
            schedule,
        };
        history.sanitize();

        (self.key, history)
    }
}
