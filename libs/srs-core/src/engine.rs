//! The review engine: one store, one catalog, one caller.
//!
//! All operations are synchronous and take `&mut self` when they touch the
//! store. A host that shares an engine between threads has to serialize access
//! itself, e.g. by wrapping it in a mutex.

use crate::algorithm::{get_algorithm, sm2::Sm2, SchedulingAlgorithm};
use crate::clock::{add_days, Clock};
use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::jitter::{JitterSource, RandomJitter};
use crate::persistence::{NoopNotifier, PersistenceNotifier, StoreChange};
use crate::queue::{select_due, DueItem};
use crate::store::ScheduleStore;
use crate::types::{
    resolve_key, Grade, ItemKey, Keyed, PreviewIntervals, ReviewHistory, ScheduleOutcome,
    ScheduleState,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Spaced-repetition scheduler bound to one learner's history.
pub struct ReviewEngine<T> {
    catalog: Vec<T>,
    store: ScheduleStore,
    config: SchedulerConfig,
    algorithm: Box<dyn SchedulingAlgorithm>,
    jitter: Box<dyn JitterSource>,
    clock: Clock,
    notifier: Box<dyn PersistenceNotifier>,
}

impl<T: Keyed> ReviewEngine<T> {
    /// Wire an engine to a catalog and the learner's stored history.
    ///
    /// Starts with the default SM-2 config, OS-seeded jitter, the system clock
    /// and no persistence.
    pub fn init(catalog: Vec<T>, store: ScheduleStore) -> Self {
        let config = SchedulerConfig::default();
        Self {
            algorithm: Box::new(Sm2::from_config(&config)),
            catalog,
            store,
            config,
            jitter: Box::new(RandomJitter::from_os_rng()),
            clock: Clock::System,
            notifier: Box::new(NoopNotifier),
        }
    }

    /// Replace the scheduler config, validating it first.
    pub fn with_config(mut self, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        self.algorithm = get_algorithm(&config)?;
        self.config = config;
        Ok(self)
    }

    pub fn with_jitter(mut self, jitter: impl JitterSource + 'static) -> Self {
        self.jitter = Box::new(jitter);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: impl PersistenceNotifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn catalog(&self) -> &[T] {
        &self.catalog
    }

    /// Swap in a refreshed catalog. History is untouched.
    pub fn set_catalog(&mut self, catalog: Vec<T>) {
        self.catalog = catalog;
    }

    /// First catalog item resolving to `key`.
    pub fn find_item(&self, key: &ItemKey) -> Option<&T> {
        self.catalog.iter().find(|item| &resolve_key(*item) == key)
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    pub fn into_store(self) -> ScheduleStore {
        self.store
    }

    pub fn history(&self, key: &ItemKey) -> Option<&ReviewHistory> {
        self.store.get(key)
    }

    /// Run the grade calculation without touching the store.
    ///
    /// `prior` is repaired first if it holds corrupt values.
    pub fn calculate(
        &mut self,
        grade: impl Into<Grade>,
        prior: &ScheduleState,
        last_review_at: Option<DateTime<Utc>>,
    ) -> ScheduleOutcome {
        let mut prior = prior.clone();
        prior.sanitize();
        let now = self.clock.now();
        self.algorithm
            .calculate(grade.into(), &prior, last_review_at, now, self.jitter.as_mut())
    }

    /// Due items at the current time, most overdue first.
    pub fn queue(&self, limit: usize) -> Vec<DueItem<'_, T>> {
        select_due(&self.catalog, &self.store, limit, self.clock.now())
    }

    /// Number of items currently due.
    pub fn due_count(&self) -> usize {
        self.queue(usize::MAX).len()
    }

    /// Grade a review of `key` and commit the new schedule.
    ///
    /// Unknown keys get a fresh history entry; the first review therefore sees
    /// zero elapsed time.
    pub fn submit_review(&mut self, key: &ItemKey, grade: impl Into<Grade>) -> ScheduleState {
        let grade = grade.into();
        let now = self.clock.now();
        let seed = self.algorithm.initial_state();

        let entry = self.store.entry_or_insert(key, Some(now));
        let prior = entry.schedule.get_or_insert(seed).clone();
        let outcome = self.algorithm.calculate(
            grade,
            &prior,
            entry.last_review_at,
            now,
            self.jitter.as_mut(),
        );

        let state = outcome.into_state(add_days(now, outcome.interval));
        entry.schedule = Some(state.clone());
        entry.last_review_at = Some(now);
        entry.attempts = entry.attempts.saturating_add(1);
        if grade.is_pass() {
            entry.correct = entry.correct.saturating_add(1);
        }

        debug!(
            key = %key,
            grade = grade.value(),
            interval = state.interval,
            repetitions = state.repetitions,
            ease_factor = state.ease_factor,
            "review committed"
        );
        self.notifier.notify(&StoreChange::Reviewed { key: key.clone() });

        state
    }

    /// Record a right/wrong answer from outside the review queue.
    ///
    /// A wrong answer on an item that already has a schedule counts as a lapse
    /// and makes the item due immediately.
    pub fn record_attempt(&mut self, key: &ItemKey, correct: bool) -> ReviewHistory {
        let now = self.clock.now();

        let entry = self.store.entry_or_insert(key, None);
        entry.attempts = entry.attempts.saturating_add(1);
        if correct {
            entry.correct = entry.correct.saturating_add(1);
        }
        entry.last_review_at = Some(now);

        if !correct {
            if let Some(schedule) = entry.schedule.as_mut() {
                let outcome = self.algorithm.calculate(
                    Grade::AGAIN,
                    schedule,
                    None,
                    now,
                    self.jitter.as_mut(),
                );
                *schedule = outcome.into_state(now);
                debug!(key = %key, interval = schedule.interval, "lapse recorded");
            }
        }

        let snapshot = entry.clone();
        self.notifier.notify(&StoreChange::Attempted { key: key.clone() });
        snapshot
    }

    /// Intervals a review of `key` would produce for fail, hard and easy.
    /// Nothing is committed.
    pub fn preview_intervals(&mut self, key: &ItemKey) -> PreviewIntervals {
        let now = self.clock.now();
        let (prior, last_review_at) = match self.store.get(key) {
            Some(history) => (
                history
                    .schedule
                    .clone()
                    .unwrap_or_else(|| self.algorithm.initial_state()),
                history.last_review_at,
            ),
            None => (self.algorithm.initial_state(), None),
        };

        let algorithm = self.algorithm.as_ref();
        let jitter = self.jitter.as_mut();
        let mut interval_for = |grade: Grade| {
            algorithm
                .calculate(grade, &prior, last_review_at, now, &mut *jitter)
                .interval
        };

        PreviewIntervals {
            fail: interval_for(Grade::AGAIN),
            hard: interval_for(Grade::HARD),
            easy: interval_for(Grade::EASY),
        }
    }

    /// Forget everything about `key`. Returns the removed entry, if any.
    pub fn reset_item(&mut self, key: &ItemKey) -> Option<ReviewHistory> {
        let removed = self.store.remove(key)?;
        debug!(key = %key, "review history reset");
        self.notifier.notify(&StoreChange::Reset { key: key.clone() });
        Some(removed)
    }
}
