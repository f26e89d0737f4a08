//! Core types for the scheduling engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Ease factor given to an item on its first review.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Lowest ease factor any schedule may hold.
pub const MINIMUM_EASE_FACTOR: f64 = 1.3;

/// Stable key identifying a catalog item in the history map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(String);

impl ItemKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for an item that carries a numeric id.
    pub fn from_id(id: i64) -> Self {
        Self(id.to_string())
    }

    /// Fallback key derived from item content.
    ///
    /// Editing the content changes the key and orphans its history; give items
    /// ids if they can be edited.
    pub fn from_content(content: &str) -> Self {
        Self(content.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ItemKey {
    fn from(id: i64) -> Self {
        Self::from_id(id)
    }
}

impl From<&str> for ItemKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ItemKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Anything the engine can schedule.
///
/// The engine never looks at item content beyond what is needed to build a key.
pub trait Keyed {
    /// Numeric id, when the item has one.
    fn id(&self) -> Option<i64>;

    /// Content used as a fallback key for items without an id.
    fn content_key(&self) -> &str;
}

/// Resolve the history key for an item.
///
/// The numeric id wins when present. Items without an id fall back to their
/// trimmed content, so editing that content detaches the item from its history.
pub fn resolve_key<T: Keyed + ?Sized>(item: &T) -> ItemKey {
    match item.id() {
        Some(id) => ItemKey::from_id(id),
        None => ItemKey::from_content(item.content_key()),
    }
}

/// Minimal catalog entry: an optional id and the content it stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub content: String,
}

impl CatalogItem {
    pub fn new(id: Option<i64>, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }
}

impl Keyed for CatalogItem {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn content_key(&self) -> &str {
        &self.content
    }
}

/// Review grade on the 0-5 SM-2 scale.
///
/// Construction always clamps, so a `Grade` is in range by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const AGAIN: Self = Self(0);
    pub const HARD: Self = Self(3);
    pub const GOOD: Self = Self(4);
    pub const EASY: Self = Self(5);

    /// Lowest grade counted as a successful recall.
    pub const PASS_THRESHOLD: u8 = 3;

    /// Create a grade, clamping the value to `0..=5`.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, 5) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_pass(self) -> bool {
        self.0 >= Self::PASS_THRESHOLD
    }

    /// Map a right/wrong answer onto the grade scale.
    /// Wrong -> Again (0), Correct -> Good (4)
    pub fn from_correct(correct: bool) -> Self {
        if correct { Self::GOOD } else { Self::AGAIN }
    }
}

impl From<i64> for Grade {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<i32> for Grade {
    fn from(value: i32) -> Self {
        Self::new(i64::from(value))
    }
}

impl From<u8> for Grade {
    fn from(value: u8) -> Self {
        Self::new(i64::from(value))
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

/// SRS state of a single item.
///
/// Missing fields load as seed values and `null` numbers as NaN, so a damaged
/// record still deserializes and can be repaired by [`ScheduleState::sanitize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleState {
    /// Days until the next review.
    #[serde(deserialize_with = "nan_if_null")]
    pub interval: f64,
    /// Consecutive successful reviews since the last lapse.
    #[serde(deserialize_with = "default_if_null")]
    pub repetitions: u32,
    #[serde(deserialize_with = "nan_if_null")]
    pub ease_factor: f64,
    #[serde(
        serialize_with = "chrono::serde::ts_milliseconds::serialize",
        deserialize_with = "epoch_if_null"
    )]
    pub next_review_at: DateTime<Utc>,
}

fn nan_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

fn default_if_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn epoch_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH))
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self {
            interval: 0.0,
            repetitions: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            next_review_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl ScheduleState {
    /// Repair values no valid update could have produced.
    ///
    /// Returns `true` when anything was changed.
    pub fn sanitize(&mut self) -> bool {
        let mut changed = false;

        if !self.interval.is_finite() || self.interval < 0.0 {
            self.interval = 0.0;
            changed = true;
        }

        if self.ease_factor.is_nan() || self.ease_factor == f64::INFINITY {
            self.ease_factor = DEFAULT_EASE_FACTOR;
            changed = true;
        } else if self.ease_factor < MINIMUM_EASE_FACTOR {
            self.ease_factor = MINIMUM_EASE_FACTOR;
            changed = true;
        }

        changed
    }
}

/// Output of a grade calculation, before the caller places it in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleOutcome {
    pub interval: f64,
    pub repetitions: u32,
    pub ease_factor: f64,
}

impl ScheduleOutcome {
    pub fn into_state(self, next_review_at: DateTime<Utc>) -> ScheduleState {
        ScheduleState {
            interval: self.interval,
            repetitions: self.repetitions,
            ease_factor: self.ease_factor,
            next_review_at,
        }
    }
}

/// Everything the engine remembers about one item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewHistory {
    #[serde(default, deserialize_with = "default_if_null")]
    pub attempts: u32,
    #[serde(default, deserialize_with = "default_if_null")]
    pub correct: u32,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_review_at: Option<DateTime<Utc>>,
    /// Missing until the first graded review; such items are due immediately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleState>,
}

impl ReviewHistory {
    pub fn sanitize(&mut self) -> bool {
        let mut changed = false;

        if self.correct > self.attempts {
            self.correct = self.attempts;
            changed = true;
        }

        if let Some(schedule) = self.schedule.as_mut() {
            changed |= schedule.sanitize();
        }

        changed
    }

    /// Share of attempts answered correctly, `None` before the first attempt.
    pub fn accuracy(&self) -> Option<f64> {
        if self.attempts == 0 {
            None
        } else {
            Some(f64::from(self.correct) / f64::from(self.attempts))
        }
    }
}

/// Intervals (days) a review would produce for each answer button.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewIntervals {
    pub fail: f64,
    pub hard: f64,
    pub easy: f64,
}
