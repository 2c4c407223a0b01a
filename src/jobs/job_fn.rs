//! # Function-backed job (`JobFn`)
//!
//! [`JobFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per
//! spawn. This avoids shared mutable state between executions.
//!
//! ## Concurrency semantics
//! - Each call to [`Job::spawn`] creates a **new** future owning its state.
//! - No hidden mutation between submissions; if shared state is needed, use
//!   an explicit `Arc<...>` inside the closure.
//!
//! ## Example
//! ```rust
//! use jobvisor::{JobError, JobFn, JobRef};
//!
//! let job: JobRef = JobFn::arc("store-42", || async {
//!     // do work...
//!     Ok::<_, JobError>(())
//! });
//!
//! assert_eq!(job.name(), "store-42");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use crate::error::JobError;
use crate::jobs::job::{BoxJobFuture, Job};

/// Function-backed job implementation.
///
/// Wraps a closure that *creates* a new future per spawn.
#[derive(Debug)]
pub struct JobFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> JobFn<F> {
    /// Creates a new function-backed job.
    ///
    /// Prefer [`JobFn::arc`] when you immediately need a [`JobRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the job and returns it as a shared handle (`Arc<dyn Job>`).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Job for JobFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static, // Fn, not FnOnce
    Fut: Future<Output = Result<(), JobError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self) -> BoxJobFuture {
        let fut = (self.f)();
        Box::pin(fut)
    }
}
