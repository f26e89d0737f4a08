//! Debounced history persistence.
//!
//! The engine signals every committed change through a [`ChannelNotifier`].
//! A background task collects signals until the channel has been quiet for
//! the debounce window, or until the batch has waited `max_wait`, then
//! snapshots the store and writes it once. The task
//! only holds a weak handle to the engine, so dropping the engine closes the
//! channel and ends the task.

use std::sync::{Arc, Weak};
use std::time::Duration;

use srs_core::{PersistenceNotifier, StoreChange};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::services::storage::FileStorage;
use crate::{Engine, SharedEngine};

/// Forwards store changes to the saver task without blocking.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: UnboundedSender<StoreChange>,
}

impl PersistenceNotifier for ChannelNotifier {
    fn notify(&self, change: &StoreChange) {
        if self.tx.send(change.clone()).is_err() {
            tracing::warn!(key = %change.key(), "saver stopped, change not persisted");
        }
    }
}

/// Create a notifier and the receiving end for [`spawn_saver`].
pub fn channel() -> (ChannelNotifier, UnboundedReceiver<StoreChange>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelNotifier { tx }, rx)
}

/// When to write a batch of changes.
#[derive(Debug, Clone, Copy)]
pub struct SaveSchedule {
    /// Quiet period after the last change.
    pub debounce: Duration,
    /// Longest a change may wait while changes keep arriving.
    pub max_wait: Duration,
}

/// Spawn the saver task. It runs until every [`ChannelNotifier`] is dropped.
pub fn spawn_saver(
    engine: &SharedEngine,
    storage: Arc<FileStorage>,
    rx: UnboundedReceiver<StoreChange>,
    schedule: SaveSchedule,
) -> JoinHandle<()> {
    tokio::spawn(run_saver(Arc::downgrade(engine), storage, rx, schedule))
}

async fn run_saver(
    engine: Weak<std::sync::Mutex<Engine>>,
    storage: Arc<FileStorage>,
    mut rx: UnboundedReceiver<StoreChange>,
    schedule: SaveSchedule,
) {
    while let Some(first) = rx.recv().await {
        let mut pending = 1usize;
        let deadline = Instant::now() + schedule.max_wait;

        loop {
            let quiet_until = (Instant::now() + schedule.debounce).min(deadline);
            match tokio::time::timeout_at(quiet_until, rx.recv()).await {
                Ok(Some(_)) => pending += 1,
                Ok(None) | Err(_) => break,
            }
        }

        let Some(engine) = engine.upgrade() else {
            break;
        };
        // A poisoned lock still holds a consistent store: every commit is a
        // single synchronous section.
        let snapshot = match engine.lock() {
            Ok(guard) => guard.store().clone(),
            Err(poisoned) => poisoned.into_inner().store().clone(),
        };
        drop(engine);

        match storage.save_history(&snapshot).await {
            Ok(()) => tracing::info!(
                changes = pending,
                last_key = %first.key(),
                "persisted review history"
            ),
            Err(e) => tracing::warn!(error = %e, changes = pending, "failed to persist review history"),
        }
    }
    tracing::debug!("saver stopped");
}
