//! Scheduler configuration.

use crate::error::{EngineError, Result};
use crate::types::{DEFAULT_EASE_FACTOR, MINIMUM_EASE_FACTOR};
use serde::{Deserialize, Serialize};

/// Tunables for the scheduler. Every field has a default, so partial JSON
/// documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub algorithm: String,
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Growth applied to mature items graded "hard".
    pub hard_multiplier: f64,
    /// Extra growth on top of the ease factor for "easy".
    pub easy_bonus: f64,
    /// Growth for an item recovering from a lapse.
    pub relearn_multiplier: f64,
    /// Share of the interval a mature item keeps when it lapses.
    pub lapse_retention: f64,
    /// Items with a longer interval than this count as mature on a lapse.
    pub mature_threshold_days: f64,
    pub graduating_interval_days: f64,
    pub second_interval_days: f64,
    /// Half-width of the relative fuzz applied to long intervals.
    pub fuzz_ratio: f64,
    /// Intervals at or below this are never fuzzed.
    pub fuzz_min_interval_days: f64,
    pub default_queue_limit: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            algorithm: "sm2".to_string(),
            initial_ease: DEFAULT_EASE_FACTOR,
            minimum_ease: MINIMUM_EASE_FACTOR,
            hard_multiplier: 1.2,
            easy_bonus: 1.3,
            relearn_multiplier: 1.2,
            lapse_retention: 0.2,
            mature_threshold_days: 10.0,
            graduating_interval_days: 1.0,
            second_interval_days: 6.0,
            fuzz_ratio: 0.05,
            fuzz_min_interval_days: 2.0,
            default_queue_limit: 50,
        }
    }
}

impl SchedulerConfig {
    /// Parse a JSON config document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the schedule invariants.
    pub fn validate(&self) -> Result<()> {
        if self.minimum_ease < MINIMUM_EASE_FACTOR || !self.minimum_ease.is_finite() {
            return Err(invalid(
                "minimum_ease",
                format!("must be a finite value of at least {MINIMUM_EASE_FACTOR}"),
            ));
        }
        if !self.initial_ease.is_finite() || self.initial_ease < self.minimum_ease {
            return Err(invalid("initial_ease", "must be at least minimum_ease"));
        }

        let positive = [
            ("hard_multiplier", self.hard_multiplier),
            ("easy_bonus", self.easy_bonus),
            ("relearn_multiplier", self.relearn_multiplier),
            ("graduating_interval_days", self.graduating_interval_days),
            ("second_interval_days", self.second_interval_days),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, "must be a positive finite number"));
            }
        }

        if !(0.0..=1.0).contains(&self.lapse_retention) {
            return Err(invalid("lapse_retention", "must be within 0..=1"));
        }
        if !self.mature_threshold_days.is_finite() || self.mature_threshold_days < 0.0 {
            return Err(invalid("mature_threshold_days", "must not be negative"));
        }
        if !(0.0..0.5).contains(&self.fuzz_ratio) {
            return Err(invalid("fuzz_ratio", "must be within 0..0.5"));
        }
        if !self.fuzz_min_interval_days.is_finite() || self.fuzz_min_interval_days < 1.0 {
            return Err(invalid("fuzz_min_interval_days", "must be at least 1"));
        }
        if self.default_queue_limit == 0 {
            return Err(invalid("default_queue_limit", "must be greater than zero"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}
