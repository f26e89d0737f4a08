//! Due queue selection.

use crate::store::ScheduleStore;
use crate::types::{resolve_key, ItemKey, Keyed};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// A catalog item whose review time has arrived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DueItem<'a, T> {
    pub key: ItemKey,
    pub item: &'a T,
    /// Epoch for items that have attempts but no schedule yet.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub next_review_at: DateTime<Utc>,
}

/// Collect the items due at `now`, most overdue first, at most `limit` of them.
///
/// Items without any history are left to whatever introduces new material.
/// Items with history but no schedule sort first. Each key is emitted once,
/// for its first occurrence in the catalog.
pub fn select_due<'a, T: Keyed>(
    catalog: &'a [T],
    store: &ScheduleStore,
    limit: usize,
    now: DateTime<Utc>,
) -> Vec<DueItem<'a, T>> {
    let mut seen = HashSet::new();
    let mut due = Vec::new();

    for item in catalog {
        let key = resolve_key(item);
        if seen.contains(&key) {
            continue;
        }
        let Some(history) = store.get(&key) else {
            continue;
        };

        let next_review_at = match &history.schedule {
            None => DateTime::<Utc>::UNIX_EPOCH,
            Some(schedule) if schedule.next_review_at <= now => schedule.next_review_at,
            Some(_) => continue,
        };

        seen.insert(key.clone());
        due.push(DueItem {
            key,
            item,
            next_review_at,
        });
    }

    // Stable sort keeps catalog order among items due at the same instant
    due.sort_by_key(|entry| entry.next_review_at);
    due.truncate(limit);
    due
}
