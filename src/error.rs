//! Error types used by the jobvisor dispatcher and jobs.
//!
//! This module defines three error enums:
//!
//! - [`ConfigError`] — invalid dispatcher configuration, raised at build time.
//! - [`DispatchError`] — programmer misuse of [`submit`](crate::Dispatcher::submit).
//! - [`JobError`] — failures raised by individual job executions.
//!
//! All types provide `as_label` helpers (snake_case) for logging/metrics.
//!
//! Note that a *duplicate submission* is not an error: a caller cannot
//! reliably know a job's current state before calling, so the dispatcher
//! suppresses the duplicate silently and publishes a
//! [`JobSkipped`](crate::EventKind::JobSkipped) event instead.

use thiserror::Error;

/// # Errors produced by dispatcher configuration validation.
///
/// Raised by [`DispatcherBuilder::build`](crate::DispatcherBuilder::build)
/// before any runtime state is created. A zero slot count indicates an
/// integration bug, not a runtime condition, and fails fast.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A job class was configured with zero concurrency slots.
    #[error("{class} slot count must be positive")]
    ZeroSlots {
        /// Label of the misconfigured class (`"bulk"` or `"unit"`).
        class: &'static str,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroSlots { .. } => "config_zero_slots",
        }
    }
}

/// # Errors returned by [`Dispatcher::submit`](crate::Dispatcher::submit).
///
/// These cover programmer misuse only. A submission that merely has to wait
/// (lane at capacity) or that duplicates a tracked identity is **not** an
/// error — it is queued or suppressed respectively.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The job identity (its `name()`) was empty.
    #[error("job identity must not be empty")]
    EmptyIdentity,

    /// The dispatcher was closed; new submissions are rejected.
    ///
    /// Already-queued jobs still drain and running jobs finish.
    #[error("dispatcher is closed")]
    Closed,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jobvisor::DispatchError;
    ///
    /// assert_eq!(DispatchError::EmptyIdentity.as_label(), "dispatch_empty_identity");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::EmptyIdentity => "dispatch_empty_identity",
            DispatchError::Closed => "dispatch_closed",
        }
    }
}

/// # Errors produced by job execution.
///
/// Returned by a job's unit of work. Opaque to the dispatcher's bookkeeping:
/// any outcome — success, error, or panic — frees the job's slot. The error
/// surfaces only through the [`JobFailed`](crate::EventKind::JobFailed)
/// event's reason field; callers surface failures to users through their own
/// channel.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum JobError {
    /// The collection work failed.
    #[error("collection failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The unit of work panicked.
    ///
    /// Constructed by the completion hook when it catches an unwind; jobs do
    /// not return this themselves.
    #[error("job panicked: {reason}")]
    Panicked {
        /// Formatted panic payload.
        reason: String,
    },
}

impl JobError {
    /// Convenience constructor for [`JobError::Failed`].
    pub fn failed(error: impl Into<String>) -> Self {
        JobError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jobvisor::JobError;
    ///
    /// let err = JobError::failed("connection refused");
    /// assert_eq!(err.as_label(), "job_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Failed { .. } => "job_failed",
            JobError::Panicked { .. } => "job_panicked",
        }
    }
}
