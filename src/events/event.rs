//! # Lifecycle events emitted by the dispatcher.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Job lifecycle events**: admission flow (queued, starting, completed, failed, skipped)
//! - **Subscriber events**: fan-out health (overflow, panic)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! class-prefixed job key, the job class, and failure reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use jobvisor::{Event, EventKind, JobClass};
//!
//! let ev = Event::new(EventKind::JobFailed)
//!     .with_job("bulk:store-42")
//!     .with_class(JobClass::Bulk)
//!     .with_reason("http 503");
//!
//! assert_eq!(ev.kind, EventKind::JobFailed);
//! assert_eq!(ev.job.as_deref(), Some("bulk:store-42"));
//! assert_eq!(ev.reason.as_deref(), Some("http 503"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::jobs::JobClass;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of dispatcher events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Job lifecycle events ===
    /// Job could not be admitted immediately and joined its class wait list.
    ///
    /// Sets:
    /// - `job`: class-prefixed key
    /// - `class`: job class
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    JobQueued,

    /// Job was granted a slot and is being launched.
    ///
    /// Emitted on both the immediate-admission path and the drain path.
    ///
    /// Sets:
    /// - `job`: class-prefixed key
    /// - `class`: job class
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    JobStarting,

    /// Job's unit of work completed successfully; its slot was freed.
    ///
    /// Sets:
    /// - `job`: class-prefixed key
    /// - `class`: job class
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    JobCompleted,

    /// Job's unit of work failed or panicked; its slot was freed anyway.
    ///
    /// Sets:
    /// - `job`: class-prefixed key
    /// - `class`: job class
    /// - `reason`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    JobFailed,

    /// Submission was suppressed because the identity is already tracked.
    ///
    /// Sets:
    /// - `job`: class-prefixed key
    /// - `class`: job class
    /// - `reason`: `"duplicate"`
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    JobSkipped,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `job`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `job`: subscriber name
    /// - `reason`: panic info/message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubscriberPanicked,
}

/// Dispatcher event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Class-prefixed job key (or subscriber name for subscriber events).
    pub job: Option<Arc<str>>,
    /// Class of the job, if applicable.
    pub class: Option<JobClass>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            job: None,
            class: None,
            reason: None,
        }
    }

    /// Attaches a job key (or subscriber name).
    #[inline]
    pub fn with_job(mut self, job: impl Into<Arc<str>>) -> Self {
        self.job = Some(job.into());
        self
    }

    /// Attaches a job class.
    #[inline]
    pub fn with_class(mut self, class: JobClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_job(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_job(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::JobQueued);
        let b = Event::new(EventKind::JobQueued);
        let c = Event::new(EventKind::JobCompleted);
        assert!(a.seq < b.seq);
        assert!(b.seq < c.seq);
    }

    #[test]
    fn builders_set_fields() {
        let ev = Event::new(EventKind::JobSkipped)
            .with_job("unit:kw-7")
            .with_class(JobClass::Unit)
            .with_reason("duplicate");

        assert_eq!(ev.kind, EventKind::JobSkipped);
        assert_eq!(ev.job.as_deref(), Some("unit:kw-7"));
        assert_eq!(ev.class, Some(JobClass::Unit));
        assert_eq!(ev.reason.as_deref(), Some("duplicate"));
    }

    #[test]
    fn subscriber_helpers_fill_name_and_reason() {
        let ev = Event::subscriber_overflow("metrics", "full");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.job.as_deref(), Some("metrics"));
        assert_eq!(ev.reason.as_deref(), Some("full"));
    }
}
