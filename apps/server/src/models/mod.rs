//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use srs_core::{CatalogItem, DueItem, Grade, ItemKey, ReviewHistory, ScheduleState};

#[derive(Debug, Default, Deserialize)]
pub struct StudyQueueQuery {
    pub limit: Option<usize>,
}

/// One due item in the study queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub key: ItemKey,
    pub item: CatalogItem,
    pub next_review_at: DateTime<Utc>,
}

impl From<DueItem<'_, CatalogItem>> for QueueEntry {
    fn from(due: DueItem<'_, CatalogItem>) -> Self {
        Self {
            key: due.key,
            item: due.item.clone(),
            next_review_at: due.next_review_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudyQueueResponse {
    pub items: Vec<QueueEntry>,
    /// Total due, regardless of the limit.
    pub due_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReviewRequest {
    pub key: ItemKey,
    /// Clamped to 0..=5.
    pub grade: Grade,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReviewResponse {
    pub state: ScheduleState,
    pub next_due: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordAttemptRequest {
    pub key: ItemKey,
    pub correct: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemResponse {
    pub key: ItemKey,
    /// Absent when the key is not in the catalog.
    pub item: Option<CatalogItem>,
    pub history: ReviewHistory,
    pub accuracy: Option<f64>,
}

/// Reject blank keys before they reach the engine.
pub fn require_key(key: &ItemKey) -> crate::error::Result<()> {
    if key.as_str().trim().is_empty() {
        return Err(crate::error::ApiError::BadRequest(
            "item key must not be empty".to_string(),
        ));
    }
    Ok(())
}
