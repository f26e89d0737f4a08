//! SM-2 spaced repetition algorithm.
//!
//! Based on SuperMemo 2 with a few departures:
//! - late but correct reviews are credited with the real elapsed time
//! - "hard" grows slowly and ignores the ease factor, "easy" earns a bonus
//! - a lapse on a mature item keeps part of its interval instead of resetting
//! - intervals longer than a couple of days are fuzzed to spread reviews out

use super::SchedulingAlgorithm;
use crate::clock::elapsed_days;
use crate::config::SchedulerConfig;
use crate::jitter::JitterSource;
use crate::types::{Grade, ScheduleOutcome, ScheduleState};
use chrono::{DateTime, Utc};

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub easy_bonus: f64,
    pub hard_multiplier: f64,
    pub relearn_multiplier: f64,
    pub lapse_retention: f64,
    pub mature_threshold: f64,
    pub graduating_interval: f64,
    pub second_interval: f64,
    pub fuzz_ratio: f64,
    pub fuzz_min_interval: f64,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

impl Sm2 {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            initial_ease: config.initial_ease,
            minimum_ease: config.minimum_ease,
            easy_bonus: config.easy_bonus,
            hard_multiplier: config.hard_multiplier,
            relearn_multiplier: config.relearn_multiplier,
            lapse_retention: config.lapse_retention,
            mature_threshold: config.mature_threshold_days,
            graduating_interval: config.graduating_interval_days,
            second_interval: config.second_interval_days,
            fuzz_ratio: config.fuzz_ratio,
            fuzz_min_interval: config.fuzz_min_interval_days,
        }
    }
}

impl SchedulingAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_state(&self) -> ScheduleState {
        ScheduleState {
            ease_factor: self.initial_ease,
            ..ScheduleState::default()
        }
    }

    fn calculate(
        &self,
        grade: Grade,
        prior: &ScheduleState,
        last_review_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        jitter: &mut dyn JitterSource,
    ) -> ScheduleOutcome {
        let (interval, repetitions) = if grade.is_pass() {
            let effective = self.effective_interval(prior.interval, last_review_at, now);
            (
                self.pass_interval(grade, prior, effective),
                prior.repetitions.saturating_add(1),
            )
        } else {
            (self.lapse_interval(prior.interval), 0)
        };

        ScheduleOutcome {
            interval: self.fuzz(interval, jitter),
            repetitions,
            ease_factor: self.next_ease(prior.ease_factor, grade),
        }
    }
}

impl Sm2 {
    /// Scheduled interval, or the real gap if the item was reviewed late.
    fn effective_interval(
        &self,
        scheduled: f64,
        last_review_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> f64 {
        match last_review_at {
            Some(last) => {
                let elapsed = elapsed_days(last, now);
                if elapsed > scheduled { elapsed } else { scheduled }
            }
            None => scheduled,
        }
    }

    fn pass_interval(&self, grade: Grade, prior: &ScheduleState, effective: f64) -> f64 {
        let interval = match prior.repetitions {
            // Recovering from a lapse grows gently instead of restarting at 1
            0 if prior.interval > self.graduating_interval => {
                (prior.interval * self.relearn_multiplier).round()
            }
            0 => self.graduating_interval,
            1 => self.second_interval,
            _ => match grade {
                Grade::HARD => (effective * self.hard_multiplier).round(),
                Grade::EASY => (effective * prior.ease_factor * self.easy_bonus).round(),
                _ => (effective * prior.ease_factor).round(),
            },
        };
        interval.max(1.0)
    }

    fn lapse_interval(&self, scheduled: f64) -> f64 {
        if scheduled > self.mature_threshold {
            (scheduled * self.lapse_retention).round().max(1.0)
        } else {
            1.0
        }
    }

    fn next_ease(&self, ease: f64, grade: Grade) -> f64 {
        let q = 5.0 - f64::from(grade.value());
        (ease + (0.1 - q * (0.08 + q * 0.02))).max(self.minimum_ease)
    }

    fn fuzz(&self, interval: f64, jitter: &mut dyn JitterSource) -> f64 {
        if interval > self.fuzz_min_interval {
            (interval * (1.0 + jitter.offset(self.fuzz_ratio))).round()
        } else {
            interval
        }
    }
}
