//! # Job abstraction.
//!
//! This module defines the [`Job`] trait: an async unit of collection work
//! identified by a stable name. The common handle type is [`JobRef`], an
//! `Arc<dyn Job>` suitable for sharing across the runtime.
//!
//! The dispatcher never inspects what a job does; it only uses the name for
//! identity tracking and the returned future for completion signaling. There
//! is no cancellation parameter: a submitted job's slot is released only by
//! its own completion, and collaborators that need timeouts resolve their
//! future on timeout themselves.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::JobError;

/// Boxed future produced by one job execution.
pub type BoxJobFuture = Pin<Box<dyn Future<Output = Result<(), JobError>> + Send + 'static>>;

/// Shared handle to a job (`Arc<dyn Job>`).
pub type JobRef = Arc<dyn Job>;

/// # Asynchronous unit of collection work.
///
/// A `Job` has a stable [`name`](Job::name) — its identity within a job
/// class — and a [`spawn`](Job::spawn) method that produces a **fresh**
/// future per call. The future's resolution (success or failure) is the only
/// signal the dispatcher consumes.
///
/// # Example
/// ```
/// use jobvisor::{BoxJobFuture, Job, JobError};
///
/// struct StoreCollect {
///     store_id: String,
/// }
///
/// impl Job for StoreCollect {
///     fn name(&self) -> &str {
///         &self.store_id
///     }
///
///     fn spawn(&self) -> BoxJobFuture {
///         Box::pin(async move {
///             // fetch, parse, persist...
///             Ok::<(), JobError>(())
///         })
///     }
/// }
/// ```
pub trait Job: Send + Sync + 'static {
    /// Returns the job's identity within its class.
    ///
    /// Must be non-empty and stable for the lifetime of the job; the
    /// dispatcher uses it for duplicate suppression and status tracking.
    fn name(&self) -> &str;

    /// Creates one execution of the unit of work.
    ///
    /// Called at most once per admitted submission. Implementations should
    /// return a fresh future owning its own state.
    fn spawn(&self) -> BoxJobFuture;
}
