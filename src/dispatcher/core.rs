//! # Dispatcher: bounded-concurrency admission for collection jobs.
//!
//! The [`Dispatcher`] owns two admission lanes (one per [`JobClass`]), the
//! shared status board, the event bus, and the subscriber fan-out. It is the
//! crate's single entry point: UI-layer code calls
//! [`submit`](Dispatcher::submit) once per collection request and polls
//! [`state`](Dispatcher::state) (or subscribes to events) to render per-item
//! status.
//!
//! ## High-level architecture
//! ```text
//! caller ──► Dispatcher::submit(class, job)
//!                 │
//!                 ├─► Bulk lane (ceiling 2) ──┐       ┌──► StatusBoard
//!                 └─► Unit lane (ceiling 6) ──┤ mutate├──► (shared keyspace,
//!                                             │       │    class-prefixed keys)
//!                                             ▼       │
//!                                      completion hook┘
//!                                             │ publish
//!                                             ▼
//!    Bus ──► subscriber_listener ──► SubscriberSet ──► worker per subscriber
//! ```
//!
//! ## Rules
//! - `submit` is non-blocking and never suspends; there is no central
//!   scheduler task. All admission happens in the caller's context, all
//!   completion bookkeeping in the completed job's task.
//! - The lanes share no counters or wait lists: a full Bulk lane never
//!   delays Unit admission and vice versa.
//! - Duplicate submissions (identity already queued or running) are
//!   suppressed, not errored.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Notify, broadcast};

use crate::config::DispatcherConfig;
use crate::error::{ConfigError, DispatchError};
use crate::events::{Bus, Event};
use crate::jobs::{JobClass, JobRef};
use crate::subscribers::SubscriberSet;

use super::board::{JobState, StatusBoard};
use super::builder::DispatcherBuilder;
use super::lane::Lane;

/// Coordinates per-class admission, status tracking, and event delivery.
pub struct Dispatcher {
    cfg: DispatcherConfig,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    board: StatusBoard,
    bulk: Lane,
    unit: Lane,
    idle: Arc<Notify>,
    closed: AtomicBool,
}

impl Dispatcher {
    /// Returns a builder for a dispatcher with the given configuration.
    pub fn builder(cfg: DispatcherConfig) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }

    /// Builds a dispatcher with no subscribers.
    ///
    /// Shorthand for `Dispatcher::builder(cfg).build()`.
    pub fn new(cfg: DispatcherConfig) -> Result<Arc<Self>, ConfigError> {
        Self::builder(cfg).build()
    }

    pub(super) fn from_parts(
        cfg: DispatcherConfig,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        board: StatusBoard,
        bulk: Lane,
        unit: Lane,
        idle: Arc<Notify>,
    ) -> Self {
        Self {
            cfg,
            bus,
            subs,
            board,
            bulk,
            unit,
            idle,
            closed: AtomicBool::new(false),
        }
    }

    /// Submits a collection job to its class's lane.
    ///
    /// Idempotent and non-blocking: returns immediately in every case.
    /// - If the identity is already queued or running, the submission is
    ///   suppressed (a [`JobSkipped`](crate::EventKind::JobSkipped) event is
    ///   published) and `Ok(())` is returned.
    /// - If the lane has a free slot, the job starts immediately.
    /// - Otherwise it joins the lane's FIFO wait list and starts when a slot
    ///   frees up.
    ///
    /// ### Errors
    /// - [`DispatchError::EmptyIdentity`] if `job.name()` is empty.
    /// - [`DispatchError::Closed`] after [`close`](Dispatcher::close).
    pub fn submit(&self, class: JobClass, job: JobRef) -> Result<(), DispatchError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DispatchError::Closed);
        }
        if job.name().is_empty() {
            return Err(DispatchError::EmptyIdentity);
        }

        self.lane(class).submit(job);
        Ok(())
    }

    /// Returns the lifecycle state of an identity within a class.
    ///
    /// `None` means the identity is not tracked (absent): it either never
    /// ran or its last run completed.
    pub fn state(&self, class: JobClass, identity: &str) -> Option<JobState> {
        self.board.get(&class.key_for(identity))
    }

    /// True if the identity is currently queued or running in the class.
    pub fn is_busy(&self, class: JobClass, identity: &str) -> bool {
        self.state(class, identity).is_some()
    }

    /// Number of jobs of the class currently running.
    pub fn active_count(&self, class: JobClass) -> usize {
        self.lane(class).active()
    }

    /// Number of jobs of the class waiting for a slot.
    pub fn queued_count(&self, class: JobClass) -> usize {
        self.lane(class).queued()
    }

    /// Snapshot of all tracked jobs across both classes, sorted by key.
    pub fn snapshot(&self) -> Vec<(String, JobState)> {
        self.board.snapshot()
    }

    /// Creates a receiver observing all subsequent dispatcher events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// The configuration the dispatcher was built with.
    pub fn config(&self) -> &DispatcherConfig {
        &self.cfg
    }

    /// Rejects all further submissions.
    ///
    /// Already-queued jobs still drain and running jobs run to completion;
    /// only new [`submit`](Dispatcher::submit) calls fail with
    /// [`DispatchError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// True once [`close`](Dispatcher::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// True if both lanes have no running and no waiting jobs.
    pub fn is_idle(&self) -> bool {
        self.bulk.is_idle() && self.unit.is_idle()
    }

    /// Completes once both lanes are idle.
    ///
    /// Returns immediately if the dispatcher is already idle.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register interest before checking, so a completion landing
            // between the check and the await still wakes us.
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    ///
    /// Holds the set weakly so the listener cannot keep the dispatcher's bus
    /// alive on its own; it exits when the bus closes or the set is gone.
    /// Lagged receivers skip missed events and keep going.
    pub(super) fn spawn_subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::downgrade(&self.subs);

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        let Some(set) = set.upgrade() else { break };
                        set.emit(&ev);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged");
                        continue;
                    }
                }
            }
        });
    }

    fn lane(&self, class: JobClass) -> &Lane {
        match class {
            JobClass::Bulk => &self.bulk,
            JobClass::Unit => &self.unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;
    use crate::events::EventKind;
    use crate::jobs::JobFn;

    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::sync::Notify;

    /// Polls a condition until it holds, failing the test after two seconds.
    async fn eventually(what: &str, mut cond: impl FnMut() -> bool) {
        let waited = tokio::time::timeout(Duration::from_secs(2), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "timed out waiting for {what}");
    }

    /// A job that completes only when its gate is signaled.
    fn gated(name: &str, gate: &Arc<Notify>) -> JobRef {
        let gate = Arc::clone(gate);
        JobFn::arc(name.to_string(), move || {
            let gate = Arc::clone(&gate);
            async move {
                gate.notified().await;
                Ok::<(), JobError>(())
            }
        })
    }

    /// A gated job that also counts how many times its work actually ran.
    fn gated_counted(name: &str, gate: &Arc<Notify>, runs: &Arc<AtomicUsize>) -> JobRef {
        let gate = Arc::clone(gate);
        let runs = Arc::clone(runs);
        JobFn::arc(name.to_string(), move || {
            let gate = Arc::clone(&gate);
            let runs = Arc::clone(&runs);
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
                Ok::<(), JobError>(())
            }
        })
    }

    /// A job that records the peak number of its class's jobs in flight.
    fn tracking(
        name: &str,
        current: &Arc<AtomicUsize>,
        peak: &Arc<AtomicUsize>,
        done: &Arc<AtomicUsize>,
    ) -> JobRef {
        let current = Arc::clone(current);
        let peak = Arc::clone(peak);
        let done = Arc::clone(done);
        JobFn::arc(name.to_string(), move || {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            let done = Arc::clone(&done);
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(15)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                done.fetch_add(1, Ordering::SeqCst);
                Ok::<(), JobError>(())
            }
        })
    }

    fn dispatcher(bulk: usize, unit: usize) -> Arc<Dispatcher> {
        Dispatcher::new(DispatcherConfig {
            bulk_slots: bulk,
            unit_slots: unit,
            bus_capacity: 256,
        })
        .expect("valid config")
    }

    #[tokio::test]
    async fn immediate_then_queued_then_promoted() {
        // Ceiling 2: A and B run immediately, C queues; completing A
        // promotes C while B stays untouched.
        let d = dispatcher(2, 6);
        let (ga, gb, gc) = (
            Arc::new(Notify::new()),
            Arc::new(Notify::new()),
            Arc::new(Notify::new()),
        );

        d.submit(JobClass::Bulk, gated("a", &ga)).unwrap();
        d.submit(JobClass::Bulk, gated("b", &gb)).unwrap();
        d.submit(JobClass::Bulk, gated("c", &gc)).unwrap();

        assert_eq!(d.state(JobClass::Bulk, "a"), Some(JobState::Running));
        assert_eq!(d.state(JobClass::Bulk, "b"), Some(JobState::Running));
        assert_eq!(d.state(JobClass::Bulk, "c"), Some(JobState::Queued));
        assert_eq!(d.active_count(JobClass::Bulk), 2);
        assert_eq!(d.queued_count(JobClass::Bulk), 1);

        ga.notify_one();
        eventually("a to finish", || d.state(JobClass::Bulk, "a").is_none()).await;

        assert_eq!(d.state(JobClass::Bulk, "c"), Some(JobState::Running));
        assert_eq!(d.state(JobClass::Bulk, "b"), Some(JobState::Running));

        gb.notify_one();
        gc.notify_one();
        d.wait_idle().await;
        assert!(d.snapshot().is_empty());
    }

    #[tokio::test]
    async fn duplicate_while_running_is_suppressed() {
        let d = dispatcher(2, 6);
        let gate = Arc::new(Notify::new());
        let runs = Arc::new(AtomicUsize::new(0));

        d.submit(JobClass::Bulk, gated_counted("a", &gate, &runs))
            .unwrap();
        eventually("first run to start", || runs.load(Ordering::SeqCst) == 1).await;

        // Second submission of the same identity while it runs: no-op.
        d.submit(JobClass::Bulk, gated_counted("a", &gate, &runs))
            .unwrap();
        assert_eq!(d.active_count(JobClass::Bulk), 1);
        assert_eq!(d.queued_count(JobClass::Bulk), 0);

        gate.notify_one();
        d.wait_idle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_while_queued_is_suppressed() {
        let d = dispatcher(1, 6);
        let (ga, gb) = (Arc::new(Notify::new()), Arc::new(Notify::new()));
        let runs = Arc::new(AtomicUsize::new(0));

        d.submit(JobClass::Bulk, gated("a", &ga)).unwrap();
        d.submit(JobClass::Bulk, gated_counted("b", &gb, &runs))
            .unwrap();
        d.submit(JobClass::Bulk, gated_counted("b", &gb, &runs))
            .unwrap();

        assert_eq!(d.state(JobClass::Bulk, "b"), Some(JobState::Queued));
        assert_eq!(d.queued_count(JobClass::Bulk), 1);

        ga.notify_one();
        eventually("b to start", || {
            d.state(JobClass::Bulk, "b") == Some(JobState::Running)
        })
        .await;
        gb.notify_one();
        d.wait_idle().await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn waiting_jobs_are_promoted_in_submission_order() {
        // Ceiling 1 serializes the lane, exposing the promotion order.
        let d = dispatcher(1, 6);
        let gates: Vec<Arc<Notify>> = (0..4).map(|_| Arc::new(Notify::new())).collect();
        let order = Arc::new(std::sync::Mutex::new(Vec::<String>::new()));

        for (i, gate) in gates.iter().enumerate() {
            let name = format!("j{i}");
            let gate = Arc::clone(gate);
            let order = Arc::clone(&order);
            let job = JobFn::arc(name.clone(), move || {
                let gate = Arc::clone(&gate);
                let order = Arc::clone(&order);
                let name = name.clone();
                async move {
                    order.lock().unwrap().push(name);
                    gate.notified().await;
                    Ok::<(), JobError>(())
                }
            });
            d.submit(JobClass::Bulk, job).unwrap();
        }

        for (i, gate) in gates.iter().enumerate() {
            let name = format!("j{i}");
            eventually("job to start", || {
                d.state(JobClass::Bulk, &name) == Some(JobState::Running)
            })
            .await;
            gate.notify_one();
        }
        d.wait_idle().await;

        let order = order.lock().unwrap();
        assert_eq!(*order, vec!["j0", "j1", "j2", "j3"]);
    }

    #[tokio::test]
    async fn failing_job_frees_its_slot() {
        let d = dispatcher(1, 6);
        let gate = Arc::new(Notify::new());

        let failing =
            JobFn::arc("bad", || async { Err::<(), _>(JobError::failed("http 503")) });
        d.submit(JobClass::Bulk, failing).unwrap();
        d.submit(JobClass::Bulk, gated("next", &gate)).unwrap();

        // The failure must return "bad" to absent and promote "next".
        eventually("failed job to clear", || {
            d.state(JobClass::Bulk, "bad").is_none()
        })
        .await;
        eventually("next to start", || {
            d.state(JobClass::Bulk, "next") == Some(JobState::Running)
        })
        .await;

        gate.notify_one();
        d.wait_idle().await;
    }

    #[tokio::test]
    async fn panicking_job_frees_its_slot() {
        let d = dispatcher(1, 6);
        let gate = Arc::new(Notify::new());

        let panicking = JobFn::arc("boom", || async {
            panic!("collector exploded");
            #[allow(unreachable_code)]
            Ok::<(), JobError>(())
        });
        d.submit(JobClass::Bulk, panicking).unwrap();
        d.submit(JobClass::Bulk, gated("next", &gate)).unwrap();

        eventually("panicked job to clear", || {
            d.state(JobClass::Bulk, "boom").is_none()
        })
        .await;
        eventually("next to start", || {
            d.state(JobClass::Bulk, "next") == Some(JobState::Running)
        })
        .await;

        gate.notify_one();
        d.wait_idle().await;
        assert_eq!(d.active_count(JobClass::Bulk), 0);
    }

    #[tokio::test]
    async fn full_bulk_lane_does_not_block_unit_admission() {
        let d = dispatcher(2, 6);
        let gates: Vec<Arc<Notify>> = (0..2).map(|_| Arc::new(Notify::new())).collect();

        d.submit(JobClass::Bulk, gated("s1", &gates[0])).unwrap();
        d.submit(JobClass::Bulk, gated("s2", &gates[1])).unwrap();
        assert_eq!(d.active_count(JobClass::Bulk), 2);

        let kw_gate = Arc::new(Notify::new());
        d.submit(JobClass::Unit, gated("kw", &kw_gate)).unwrap();
        assert_eq!(d.state(JobClass::Unit, "kw"), Some(JobState::Running));

        // Same identity in the other class is a distinct key.
        let s1_gate = Arc::new(Notify::new());
        d.submit(JobClass::Unit, gated("s1", &s1_gate)).unwrap();
        assert_eq!(d.state(JobClass::Unit, "s1"), Some(JobState::Running));

        for g in gates.iter().chain([&kw_gate, &s1_gate]) {
            g.notify_one();
        }
        d.wait_idle().await;
    }

    #[tokio::test]
    async fn ceilings_hold_under_burst_and_all_jobs_complete() {
        let d = dispatcher(2, 6);

        let bulk_current = Arc::new(AtomicUsize::new(0));
        let bulk_peak = Arc::new(AtomicUsize::new(0));
        let unit_current = Arc::new(AtomicUsize::new(0));
        let unit_peak = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicUsize::new(0));

        for i in 0..10 {
            d.submit(
                JobClass::Bulk,
                tracking(&format!("store-{i}"), &bulk_current, &bulk_peak, &done),
            )
            .unwrap();
            d.submit(
                JobClass::Unit,
                tracking(&format!("kw-{i}"), &unit_current, &unit_peak, &done),
            )
            .unwrap();
        }

        eventually("all 20 jobs to complete", || {
            done.load(Ordering::SeqCst) == 20
        })
        .await;
        d.wait_idle().await;

        assert!(bulk_peak.load(Ordering::SeqCst) <= 2, "bulk ceiling breached");
        assert!(unit_peak.load(Ordering::SeqCst) <= 6, "unit ceiling breached");
        assert!(d.snapshot().is_empty());
    }

    #[tokio::test]
    async fn empty_identity_fails_fast() {
        let d = dispatcher(2, 6);
        let job = JobFn::arc("", || async { Ok::<(), JobError>(()) });
        assert_eq!(
            d.submit(JobClass::Bulk, job),
            Err(DispatchError::EmptyIdentity)
        );
    }

    #[tokio::test]
    async fn close_rejects_new_but_drains_queued() {
        let d = dispatcher(1, 6);
        let (ga, gb) = (Arc::new(Notify::new()), Arc::new(Notify::new()));

        d.submit(JobClass::Bulk, gated("a", &ga)).unwrap();
        d.submit(JobClass::Bulk, gated("b", &gb)).unwrap();

        d.close();
        assert!(d.is_closed());
        let late = JobFn::arc("late", || async { Ok::<(), JobError>(()) });
        assert_eq!(d.submit(JobClass::Bulk, late), Err(DispatchError::Closed));

        // Queued work survives close.
        ga.notify_one();
        eventually("b to be promoted", || {
            d.state(JobClass::Bulk, "b") == Some(JobState::Running)
        })
        .await;
        gb.notify_one();
        d.wait_idle().await;
    }

    #[tokio::test]
    async fn wait_idle_returns_immediately_when_idle() {
        let d = dispatcher(2, 6);
        tokio::time::timeout(Duration::from_millis(100), d.wait_idle())
            .await
            .expect("wait_idle should not block an idle dispatcher");
    }

    #[tokio::test]
    async fn lifecycle_events_are_published() {
        let d = dispatcher(1, 6);
        let mut rx = d.subscribe();
        let (ga, gb) = (Arc::new(Notify::new()), Arc::new(Notify::new()));

        d.submit(JobClass::Bulk, gated("a", &ga)).unwrap();
        d.submit(JobClass::Bulk, gated("b", &gb)).unwrap();
        d.submit(JobClass::Bulk, gated("b", &gb)).unwrap(); // duplicate
        ga.notify_one();
        gb.notify_one();
        d.wait_idle().await;

        let mut kinds = Vec::new();
        while let Ok(Ok(ev)) =
            tokio::time::timeout(Duration::from_millis(200), rx.recv()).await
        {
            kinds.push((ev.kind, ev.job.as_deref().map(str::to_owned)));
        }

        let of = |k: EventKind, j: &str| (k, Some(j.to_string()));
        assert!(kinds.contains(&of(EventKind::JobStarting, "bulk:a")));
        assert!(kinds.contains(&of(EventKind::JobQueued, "bulk:b")));
        assert!(kinds.contains(&of(EventKind::JobSkipped, "bulk:b")));
        assert!(kinds.contains(&of(EventKind::JobCompleted, "bulk:a")));
        assert!(kinds.contains(&of(EventKind::JobStarting, "bulk:b")));
        assert!(kinds.contains(&of(EventKind::JobCompleted, "bulk:b")));
    }

    #[tokio::test]
    async fn failure_event_carries_reason() {
        let d = dispatcher(1, 6);
        let mut rx = d.subscribe();

        let failing =
            JobFn::arc("bad", || async { Err::<(), _>(JobError::failed("http 503")) });
        d.submit(JobClass::Bulk, failing).unwrap();
        d.wait_idle().await;

        let mut failed = None;
        while let Ok(Ok(ev)) =
            tokio::time::timeout(Duration::from_millis(200), rx.recv()).await
        {
            if ev.kind == EventKind::JobFailed {
                failed = Some(ev);
                break;
            }
        }
        let failed = failed.expect("JobFailed event");
        assert_eq!(failed.job.as_deref(), Some("bulk:bad"));
        assert_eq!(failed.class, Some(JobClass::Bulk));
        assert!(failed.reason.as_deref().unwrap().contains("http 503"));
    }
}
