//! # Launch one admitted job and hook its completion.
//!
//! Wraps a unit of work so that, upon its asynchronous completion, it
//! invariably publishes exactly one terminal event and releases the job's
//! slot via [`Lane::on_finished`]. This fires on the success path, the error
//! path, **and** the panic path - a unit of work that unwinds must still
//! free its slot, otherwise the class permanently loses capacity.
//!
//! ## Event flow
//! ```text
//! Success:
//!   job future → Ok(())  → publish JobCompleted → on_finished
//!
//! Failure:
//!   job future → Err(e)  → publish JobFailed    → on_finished
//!
//! Panic:
//!   job future unwinds   → publish JobFailed    → on_finished
//!                          (reason from the caught panic payload)
//! ```
//!
//! The hook does not retry, transform errors beyond labeling, or inspect the
//! unit of work's result.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::error::JobError;
use crate::events::{Bus, Event, EventKind};
use crate::jobs::JobClass;

use super::lane::{Lane, PendingJob};

/// Spawns the job's unit of work, fire-and-forget.
///
/// The spawned task owns a clone of the lane, so lane bookkeeping outlives
/// the dispatcher handle for as long as the job runs.
pub(super) fn launch(lane: Lane, pending: PendingJob) {
    tokio::spawn(async move {
        let PendingJob { key, job } = pending;

        let res = AssertUnwindSafe(async { job.spawn().await })
            .catch_unwind()
            .await;

        let bus = lane.bus().clone();
        let class = lane.class();
        match res {
            Ok(Ok(())) => publish_completed(&bus, class, &key),
            Ok(Err(err)) => publish_failed(&bus, class, &key, &err),
            Err(panic) => {
                tracing::warn!(job = %key, "unit of work panicked");
                let err = JobError::Panicked {
                    reason: format!("{panic:?}"),
                };
                publish_failed(&bus, class, &key, &err);
            }
        }

        lane.on_finished(&key);
    });
}

/// Publishes `JobCompleted` (successful unit of work).
fn publish_completed(bus: &Bus, class: JobClass, key: &Arc<str>) {
    bus.publish(
        Event::new(EventKind::JobCompleted)
            .with_job(Arc::clone(key))
            .with_class(class),
    );
}

/// Publishes `JobFailed` with the failure reason.
fn publish_failed(bus: &Bus, class: JobClass, key: &Arc<str>, err: &JobError) {
    bus.publish(
        Event::new(EventKind::JobFailed)
            .with_job(Arc::clone(key))
            .with_class(class)
            .with_reason(err.to_string()),
    );
}
