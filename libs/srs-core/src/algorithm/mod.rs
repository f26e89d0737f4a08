//! Spaced repetition algorithm implementations.

pub mod sm2;

use crate::config::SchedulerConfig;
use crate::error::{EngineError, Result};
use crate::jitter::JitterSource;
use crate::types::{Grade, ScheduleOutcome, ScheduleState};
use chrono::{DateTime, Utc};

/// Trait for spaced repetition algorithms.
pub trait SchedulingAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// State a never-reviewed item starts from.
    fn initial_state(&self) -> ScheduleState;

    /// Compute the schedule that follows a review graded `grade`.
    ///
    /// `now` is only used to measure how late the review is relative to
    /// `last_review_at`; placing the result in time is up to the caller.
    fn calculate(
        &self,
        grade: Grade,
        prior: &ScheduleState,
        last_review_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        jitter: &mut dyn JitterSource,
    ) -> ScheduleOutcome;
}

/// Build the algorithm named in the config.
pub fn get_algorithm(config: &SchedulerConfig) -> Result<Box<dyn SchedulingAlgorithm>> {
    match config.algorithm.as_str() {
        "sm2" => Ok(Box::new(sm2::Sm2::from_config(config))),
        other => Err(EngineError::UnknownAlgorithm(other.to_string())),
    }
}
