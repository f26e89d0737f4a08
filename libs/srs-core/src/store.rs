//! In-memory review history, keyed by item.

use crate::error::Result;
use crate::types::{ItemKey, ReviewHistory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// History entries for every item the learner has touched.
///
/// Serializes as a JSON object keyed by item key. Deserializing repairs corrupt
/// entries and drops ones that cannot be read at all. Reads are public, writes go through the engine so the counters and
/// schedule stay consistent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScheduleStore {
    entries: BTreeMap<ItemKey, ReviewHistory>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing entries, repairing corrupt values.
    pub fn from_entries(entries: impl IntoIterator<Item = (ItemKey, ReviewHistory)>) -> Self {
        let mut store = Self {
            entries: entries.into_iter().collect(),
        };
        store.sanitize();
        store
    }

    /// Load a JSON snapshot produced by [`ScheduleStore::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, key: &ItemKey) -> Option<&ReviewHistory> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemKey, &ReviewHistory)> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> BTreeMap<ItemKey, ReviewHistory> {
        self.entries
    }

    /// Entry for `key`, created with empty counters if missing.
    pub(crate) fn entry_or_insert(
        &mut self,
        key: &ItemKey,
        last_review_at: Option<DateTime<Utc>>,
    ) -> &mut ReviewHistory {
        self.entries
            .entry(key.clone())
            .or_insert_with(|| ReviewHistory {
                last_review_at,
                ..ReviewHistory::default()
            })
    }

    pub(crate) fn remove(&mut self, key: &ItemKey) -> Option<ReviewHistory> {
        self.entries.remove(key)
    }

    fn sanitize(&mut self) {
        for (key, history) in self.entries.iter_mut() {
            if history.sanitize() {
                warn!(key = %key, "repaired corrupt review history");
            }
        }
    }
}

impl<'de> Deserialize<'de> for ScheduleStore {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<ItemKey, serde_json::Value>::deserialize(deserializer)?;
        let entries = raw.into_iter().filter_map(|(key, value)| {
            match serde_json::from_value::<ReviewHistory>(value) {
                Ok(history) => Some((key, history)),
                Err(e) => {
                    warn!(key = %key, error = %e, "dropped unreadable review history");
                    None
                }
            }
        });
        Ok(Self::from_entries(entries))
    }
}

impl FromIterator<(ItemKey, ReviewHistory)> for ScheduleStore {
    fn from_iter<I: IntoIterator<Item = (ItemKey, ReviewHistory)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}
