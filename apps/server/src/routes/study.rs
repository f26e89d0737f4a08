//! Study endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use srs_core::{ItemKey, PreviewIntervals, ReviewHistory};

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// GET /api/study/queue
pub async fn queue(
    State(state): State<AppState>,
    Query(query): Query<StudyQueueQuery>,
) -> Result<Json<StudyQueueResponse>> {
    let engine = state.engine()?;
    let limit = query.limit.unwrap_or(engine.config().default_queue_limit);

    let items = engine
        .queue(limit)
        .into_iter()
        .map(QueueEntry::from)
        .collect();

    Ok(Json(StudyQueueResponse {
        items,
        due_count: engine.due_count(),
    }))
}

/// POST /api/study/review
pub async fn review(
    State(state): State<AppState>,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<Json<SubmitReviewResponse>> {
    require_key(&payload.key)?;

    let mut engine = state.engine()?;
    let next_state = engine.submit_review(&payload.key, payload.grade);
    tracing::info!(key = %payload.key, grade = payload.grade.value(), "review submitted");

    Ok(Json(SubmitReviewResponse {
        next_due: next_state.next_review_at,
        state: next_state,
    }))
}

/// GET /api/study/preview/:key
pub async fn preview(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<PreviewIntervals>> {
    let key = ItemKey::new(key);
    require_key(&key)?;

    let mut engine = state.engine()?;
    Ok(Json(engine.preview_intervals(&key)))
}

/// POST /api/study/attempt
pub async fn attempt(
    State(state): State<AppState>,
    Json(payload): Json<RecordAttemptRequest>,
) -> Result<Json<ReviewHistory>> {
    require_key(&payload.key)?;

    let mut engine = state.engine()?;
    let history = engine.record_attempt(&payload.key, payload.correct);
    tracing::info!(key = %payload.key, correct = payload.correct, "attempt recorded");

    Ok(Json(history))
}
