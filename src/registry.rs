//! In-memory registry of mocks.
//!
//! All operations go through a single mutex around the ordered mock list, so
//! matching, CRUD and eviction always see a consistent set. Insertion order is
//! kept: `list` returns it and `find` scans in it.
//!
//! Expiry is driven by a background task that runs [`Registry::evict_expired`]
//! on a fixed period. Tests can call `evict_expired` directly with any `now`.

use crate::mock::Mock;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// How often the expiry task runs.
pub const EVICTION_PERIOD: Duration = Duration::from_secs(60);

/// What `add` did with the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// New id, appended at the end
    Inserted,
    /// Existing id, replaced in place
    Replaced,
}

/// Ordered store of mocks, shared between request handlers and the expiry task.
#[derive(Default)]
pub struct Registry {
    mocks: Mutex<Vec<Mock>>,
    expiry_task: Mutex<Option<JoinHandle<()>>>,
}

impl Registry {
    /// Create an empty registry with no expiry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert a mock, or replace the one with the same id.
    pub fn add(&self, mut mock: Mock) -> AddOutcome {
        mock.touch(Utc::now());
        let mut mocks = self.mocks.lock();
        match mocks.iter_mut().find(|m| m.id() == mock.id()) {
            Some(existing) => {
                debug!(mock_id = %mock.id(), "Replacing mock");
                *existing = mock;
                AddOutcome::Replaced
            }
            None => {
                debug!(mock_id = %mock.id(), "Adding mock");
                mocks.push(mock);
                AddOutcome::Inserted
            }
        }
    }

    /// Replace an existing mock in place. Returns false if the id is unknown.
    pub fn update(&self, mut mock: Mock) -> bool {
        let mut mocks = self.mocks.lock();
        let Some(existing) = mocks.iter_mut().find(|m| m.id() == mock.id()) else {
            return false;
        };
        mock.touch(Utc::now());
        debug!(mock_id = %mock.id(), "Updating mock");
        *existing = mock;
        true
    }

    /// Look up a mock by id. A lookup counts as access.
    pub fn get(&self, id: &str) -> Option<Mock> {
        let mut mocks = self.mocks.lock();
        let mock = mocks.iter_mut().find(|m| m.id() == id)?;
        mock.touch(Utc::now());
        Some(mock.clone())
    }

    /// Snapshot of all mocks in insertion order.
    pub fn list(&self) -> Vec<Mock> {
        self.mocks.lock().clone()
    }

    /// Remove a mock by id. Returns false if the id is unknown.
    pub fn delete(&self, id: &str) -> bool {
        let mut mocks = self.mocks.lock();
        match mocks.iter().position(|m| m.id() == id) {
            Some(index) => {
                mocks.remove(index);
                debug!(mock_id = %id, "Deleted mock");
                true
            }
            None => false,
        }
    }

    /// Remove every mock.
    pub fn clear(&self) {
        let mut mocks = self.mocks.lock();
        let removed = mocks.len();
        mocks.clear();
        debug!(removed, "Cleared mocks");
    }

    /// First mock, in insertion order, that matches the request.
    pub fn find(&self, method: &str, url: &str, body: Option<&Value>) -> Option<Mock> {
        let mut mocks = self.mocks.lock();
        let mock = mocks.iter_mut().find(|m| m.matches(method, url, body))?;
        mock.touch(Utc::now());
        Some(mock.clone())
    }

    pub fn len(&self) -> usize {
        self.mocks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mocks.lock().is_empty()
    }

    /// Run one eviction pass, removing mocks idle for at least `ttl`.
    ///
    /// Returns the number of mocks removed.
    pub fn evict_expired(&self, ttl: TimeDelta, now: DateTime<Utc>) -> usize {
        let mut mocks = self.mocks.lock();
        let before = mocks.len();
        mocks.retain(|m| {
            m.last_access()
                .checked_add_signed(ttl)
                .map_or(true, |deadline| deadline > now)
        });
        let removed = before - mocks.len();
        if removed > 0 {
            info!(removed, "Deleted {} expired mocks", removed);
        }
        removed
    }

    /// Whether an expiry task is currently running.
    pub fn expiry_active(&self) -> bool {
        self.expiry_task.lock().is_some()
    }

    /// Start expiring mocks idle for `minutes`.
    ///
    /// Ignored once a task is running; the first configuration wins. A value
    /// of zero or less starts nothing. Returns whether a task was started.
    pub fn configure_expiry(self: &Arc<Self>, minutes: i64) -> bool {
        if minutes <= 0 {
            return false;
        }
        let ttl = Duration::from_secs(minutes.unsigned_abs().saturating_mul(60));
        self.configure_expiry_with(ttl, EVICTION_PERIOD)
    }

    /// Start an expiry task with an explicit idle limit and pass period.
    ///
    /// Must be called from within a tokio runtime.
    pub fn configure_expiry_with(self: &Arc<Self>, ttl: Duration, period: Duration) -> bool {
        let mut task = self.expiry_task.lock();
        if task.is_some() {
            debug!("Mock expiry already configured, ignoring");
            return false;
        }

        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        let period = period.max(Duration::from_millis(1));
        info!(
            ttl_secs = ttl.num_seconds(),
            period_secs = period.as_secs_f64(),
            "Starting mock expiry task"
        );
        *task = Some(spawn_expiry_task(Arc::downgrade(self), ttl, period));
        true
    }

    /// Stop the expiry task, if any. The registry can be configured again after.
    pub fn stop_expiry(&self) {
        if let Some(task) = self.expiry_task.lock().take() {
            task.abort();
            info!("Mock expiry task stopped");
        }
    }
}

fn spawn_expiry_task(registry: Weak<Registry>, ttl: TimeDelta, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Skip the first tick (which fires immediately)
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(registry) = registry.upgrade() else {
                debug!("Registry dropped, expiry task exiting");
                return;
            };

            let pass = catch_unwind(AssertUnwindSafe(|| registry.evict_expired(ttl, Utc::now())));
            if pass.is_err() {
                error!("Mock eviction pass panicked, retrying on next tick");
            }
        }
    })
}

impl Drop for Registry {
    fn drop(&mut self) {
        if let Some(task) = self.expiry_task.get_mut().take() {
            task.abort();
        }
    }
}
