//! Test fixtures and factory functions for creating test data.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

use srs_core::{CatalogItem, ItemKey, ReviewHistory, ScheduleState, ScheduleStore};

pub fn start() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// Three numbered words and one content-keyed word.
pub fn catalog() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new(Some(1), "학교"),
        CatalogItem::new(Some(2), "가족"),
        CatalogItem::new(Some(3), "사랑"),
        CatalogItem::new(None, "바다"),
    ]
}

/// History with a schedule due `overdue` before [`start`].
pub fn due_history(overdue: Duration, interval: f64, repetitions: u32) -> ReviewHistory {
    let next_review_at = start() - overdue;
    ReviewHistory {
        attempts: repetitions.max(1),
        correct: repetitions,
        last_review_at: Some(next_review_at - Duration::days(interval as i64)),
        schedule: Some(ScheduleState {
            interval,
            repetitions,
            ease_factor: 2.5,
            next_review_at,
        }),
    }
}

/// Item 1 due an hour ago, item 2 due a day ago, item 3 due next week.
pub fn mixed_store() -> ScheduleStore {
    ScheduleStore::from_entries([
        (ItemKey::from_id(1), due_history(Duration::hours(1), 6.0, 2)),
        (ItemKey::from_id(2), due_history(Duration::days(1), 1.0, 1)),
        (ItemKey::from_id(3), due_history(-Duration::days(7), 15.0, 3)),
    ])
}

/// Body for POST /api/study/review.
pub fn review_request(key: &str, grade: i64) -> Value {
    json!({ "key": key, "grade": grade })
}

/// Body for POST /api/study/attempt.
pub fn attempt_request(key: &str, correct: bool) -> Value {
    json!({ "key": key, "correct": correct })
}
