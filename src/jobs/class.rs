//! # Job classes.
//!
//! The dispatcher rate-limits two categories of collection work
//! independently. Each class owns its own slot ceiling and wait list; the
//! classes share only the status board, whose keyspace is partitioned by
//! class-prefixed keys so identities can never collide across classes.

use std::sync::Arc;

/// Category of background collection work, rate-limited independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobClass {
    /// Coarse-grained collection covering a whole target (e.g. one store).
    ///
    /// Expensive per run; the default ceiling is 2.
    Bulk,

    /// Fine-grained collection covering a single item (e.g. one keyword).
    ///
    /// Cheap per run; the default ceiling is 6.
    Unit,
}

impl JobClass {
    /// Returns the stable lowercase label used in keys, events, and logs.
    pub fn label(&self) -> &'static str {
        match self {
            JobClass::Bulk => "bulk",
            JobClass::Unit => "unit",
        }
    }

    /// Builds the class-prefixed board key for a job identity.
    ///
    /// The prefix partitions the shared board keyspace: `"bulk:x"` and
    /// `"unit:x"` are distinct entries even for an identical identity.
    pub fn key_for(&self, identity: &str) -> Arc<str> {
        Arc::from(format!("{}:{}", self.label(), identity))
    }
}

impl std::fmt::Display for JobClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
