//! Common test utilities for integration tests.
//!
//! Each test gets its own engine with a fixed clock and no jitter, so
//! intervals and due times are deterministic.

pub mod fixtures;

use std::sync::{Arc, Mutex};

use axum::Router;
use chrono::{DateTime, Duration, Utc};
use srs_core::{Clock, NoJitter, ReviewEngine, ScheduleStore, StoreChange};

use srs_server::{build_router, AppState};

pub struct TestContext {
    pub state: AppState,
    pub changes: Arc<Mutex<Vec<StoreChange>>>,
}

impl TestContext {
    /// Context over the fixture catalog with an empty history.
    pub fn new() -> Self {
        Self::with_store(ScheduleStore::new())
    }

    pub fn with_store(store: ScheduleStore) -> Self {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);

        let engine = ReviewEngine::init(fixtures::catalog(), store)
            .with_jitter(NoJitter)
            .with_clock(Clock::fixed(fixtures::start()))
            .with_notifier(move |change: &StoreChange| sink.lock().unwrap().push(change.clone()));

        Self {
            state: AppState::new(engine),
            changes,
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Move the engine clock forward.
    pub fn advance(&self, by: Duration) {
        self.state.engine.lock().unwrap().clock_mut().advance(by);
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.state.engine.lock().unwrap().now()
    }

    pub fn changes(&self) -> Vec<StoreChange> {
        self.changes.lock().unwrap().clone()
    }
}
