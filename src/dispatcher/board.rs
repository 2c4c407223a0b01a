//! # Status board - shared job lifecycle registry.
//!
//! [`StatusBoard`] maps class-prefixed job keys to their [`JobState`]. It is
//! the dispatcher's only externally observable surface: UI layers poll it (or
//! subscribe to the bus) to render "collecting…" / "queued…" / nothing.
//!
//! ## Rules
//! - Absence of a key **is** the absent state; there is no third variant.
//! - O(1) lookup and update per key.
//! - Safe to read from any thread at any time, including mid-drain: per-key
//!   updates are atomic under the lock, so a read never observes a
//!   half-applied transition.
//! - Mutations are initiated only by lane code (admission and completion
//!   paths); everything else reads.
//!
//! The lock is a `std::sync::RwLock`, not an async lock: reads must work
//! from non-async contexts (a UI thread polling between frames) and no
//! critical section ever awaits.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Lifecycle state of a tracked job.
///
/// A job that is not tracked at all is *absent* — represented as `None` at
/// the API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Waiting in its class's FIFO list for a free slot.
    Queued,
    /// Occupying a slot; its unit of work is in flight.
    Running,
}

/// Shared registry of job lifecycle states, keyed by class-prefixed keys.
///
/// Thread-safe and cloneable - multiple references share the same internal
/// state.
#[derive(Clone, Default)]
pub(super) struct StatusBoard {
    inner: Arc<RwLock<HashMap<Arc<str>, JobState>>>,
}

impl StatusBoard {
    /// Creates a new, empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or replaces the state for a key.
    pub fn set(&self, key: &Arc<str>, state: JobState) {
        self.inner
            .write()
            .expect("status board lock poisoned")
            .insert(Arc::clone(key), state);
    }

    /// Removes the entry for a key, returning the key to the absent state.
    pub fn remove(&self, key: &str) {
        self.inner
            .write()
            .expect("status board lock poisoned")
            .remove(key);
    }

    /// Returns the current state for a key, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<JobState> {
        self.inner
            .read()
            .expect("status board lock poisoned")
            .get(key)
            .copied()
    }

    /// Returns true if the key is tracked (queued or running).
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .read()
            .expect("status board lock poisoned")
            .contains_key(key)
    }

    /// Returns a snapshot of all tracked keys and states, sorted by key.
    pub fn snapshot(&self) -> Vec<(String, JobState)> {
        let guard = self.inner.read().expect("status board lock poisoned");
        let mut entries: Vec<(String, JobState)> = guard
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.inner.read().expect("status board lock poisoned").len()
    }

    /// Returns true if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
