//! Spaced-repetition scheduling engine.
//!
//! Provides:
//! - A modified SM-2 grade calculator (late-review credit, soft lapses, fuzz)
//! - An in-memory schedule store with JSON snapshots
//! - Due queue selection over an item catalog
//! - A review engine that commits reviews and previews intervals
//! - Shared types (ScheduleState, ReviewHistory, Grade, ItemKey, etc.)

pub mod algorithm;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod jitter;
pub mod persistence;
pub mod queue;
pub mod store;
pub mod types;

pub use algorithm::{get_algorithm, SchedulingAlgorithm};
pub use clock::Clock;
pub use config::SchedulerConfig;
pub use engine::ReviewEngine;
pub use error::{EngineError, Result};
pub use jitter::{FixedJitter, JitterSource, NoJitter, RandomJitter};
pub use persistence::{HistoryRecord, NoopNotifier, PersistenceNotifier, StoreChange};
pub use queue::{select_due, DueItem};
pub use store::ScheduleStore;
pub use types::{
    resolve_key, CatalogItem, Grade, ItemKey, Keyed, PreviewIntervals, ReviewHistory,
    ScheduleOutcome, ScheduleState, DEFAULT_EASE_FACTOR, MINIMUM_EASE_FACTOR,
};
