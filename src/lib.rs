//! # jobvisor
//!
//! **Jobvisor** is a lightweight bounded-concurrency dispatcher for
//! background collection jobs.
//!
//! It accepts a stream of "start this collection job" requests, enforces an
//! independent concurrency ceiling per job class, queues overflow requests
//! FIFO, and automatically drains the queue as running jobs finish. The
//! crate is designed as a building block for dashboard backends and agents
//! that fan collection work out to external services.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │     Job      │   │     Job      │   │     Job      │
//!     │ (bulk class) │   │ (unit class) │   │ (unit class) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher                                                       │
//! │  - Bulk lane (ceiling 2): active count + FIFO wait list           │
//! │  - Unit lane (ceiling 6): active count + FIFO wait list           │
//! │  - StatusBoard (shared, class-prefixed keys)                      │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ completion   │   │ completion   │   │ completion   │
//!     │ hook (spawn) │   │ hook (spawn) │   │ hook (spawn) │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ Publishes        │ Publishes        │ Publishes
//!      │ - JobStarting    │ - JobCompleted   │ - JobFailed
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber listener   │
//!                       │    (in Dispatcher)     │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          (per-sub queues + workers)
//! ```
//!
//! ### Lifecycle
//! ```text
//! submit(class, job)
//!   │
//!   ├─► identity already queued/running ─► suppressed (JobSkipped)
//!   ├─► slot free  ─► Running, launch unit of work      (JobStarting)
//!   └─► lane full  ─► Queued, append to FIFO wait list  (JobQueued)
//!
//! unit of work resolves (Ok, Err, or panic)
//!   │
//!   ├─► publish JobCompleted / JobFailed
//!   └─► slot freed, identity cleared
//!         └─► drain: promote waiting jobs while slots are free
//! ```
//!
//! A job's slot is released only by its own completion; the dispatcher
//! exposes no cancel operation. Failures are opaque: any outcome frees the
//! slot and bookkeeping stays consistent.
//!
//! ## Features
//! | Area              | Description                                                          | Key types / traits                   |
//! |-------------------|----------------------------------------------------------------------|--------------------------------------|
//! | **Admission**     | Per-class ceilings, FIFO overflow queues, duplicate suppression.     | [`Dispatcher`], [`JobClass`]         |
//! | **Status**        | Per-identity lifecycle states for UI polling.                        | [`JobState`]                         |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, custom subscribers).   | [`Subscribe`], [`Event`]             |
//! | **Errors**        | Typed errors for configuration, submission, and job execution.       | [`ConfigError`], [`DispatchError`], [`JobError`] |
//! | **Jobs**          | Define jobs as functions or structs, easy to compose and submit.     | [`JobRef`], [`JobFn`], [`Job`]       |
//! | **Configuration** | Fix per-class ceilings and bus capacity at construction.             | [`DispatcherConfig`]                 |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use jobvisor::{Dispatcher, DispatcherConfig, JobClass, JobError, JobFn, JobState};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = Dispatcher::new(DispatcherConfig::default())?;
//!
//!     // Define a collection job; the dispatcher only controls when it runs.
//!     let job = JobFn::arc("store-42", || async {
//!         // fetch, parse, persist...
//!         Ok::<_, JobError>(())
//!     });
//!
//!     dispatcher.submit(JobClass::Bulk, job)?;
//!     assert_eq!(
//!         dispatcher.state(JobClass::Bulk, "store-42"),
//!         Some(JobState::Running)
//!     );
//!
//!     dispatcher.wait_idle().await;
//!     assert!(dispatcher.state(JobClass::Bulk, "store-42").is_none());
//!     Ok(())
//! }
//! ```

mod config;
mod dispatcher;
mod error;
mod events;
mod jobs;
mod subscribers;

// ---- Public re-exports ----

pub use config::DispatcherConfig;
pub use dispatcher::{Dispatcher, DispatcherBuilder, JobState};
pub use error::{ConfigError, DispatchError, JobError};
pub use events::{Event, EventKind};
pub use jobs::{BoxJobFuture, Job, JobClass, JobFn, JobRef};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
