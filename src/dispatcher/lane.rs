//! # Lane - per-class admission controller.
//!
//! A [`Lane`] owns one job class's concurrency bookkeeping: the active-slot
//! count, the FIFO wait list, and the drain guard. It decides immediate-run
//! vs enqueue on submission and re-admits waiting jobs as slots free up.
//!
//! ## Architecture
//! ```text
//! submit(job) ──► duplicate? ──► publish JobSkipped, done
//!                    │
//!                    ├─► slot free ──► active += 1, board=Running,
//!                    │                 publish JobStarting, launch
//!                    │
//!                    └─► lane full ──► board=Queued, push_back,
//!                                      publish JobQueued
//!
//! completion hook ──► on_finished(key) ──► active -= 1, board cleared
//!                                          └─► drain():
//!                                                while slot free && waiting:
//!                                                  pop_front, active += 1,
//!                                                  board=Running, launch
//! ```
//!
//! ## Rules
//! - `submit` never blocks and never suspends; launches are fire-and-forget
//!   `tokio::spawn`s.
//! - The wait list is strictly FIFO and unbounded; no pending job is ever
//!   duplicated or dropped.
//! - All admission decisions happen inside one critical section of the lane
//!   mutex, so two racing submissions of the same identity cannot both be
//!   admitted.
//! - Drain admits at most one job per lock acquisition and launches outside
//!   the lock; the `draining` flag keeps two passes from over-admitting, and
//!   the `redrain` bit re-runs the pass for any completion that raced with
//!   it (no missed wake-ups).
//! - Critical sections never await; lock order is lane → board, never the
//!   reverse.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::events::{Bus, Event, EventKind};
use crate::jobs::{JobClass, JobRef};

use super::board::{JobState, StatusBoard};
use super::completion;

/// A submission waiting for a free slot.
///
/// Consumed exactly once, in submission order.
pub(super) struct PendingJob {
    /// Class-prefixed board key.
    pub key: Arc<str>,
    /// The unit of work to launch when a slot frees.
    pub job: JobRef,
}

/// Mutable lane state, guarded by the lane mutex.
struct LaneState {
    /// Number of jobs of this class currently occupying slots.
    active: usize,
    /// FIFO wait list of submissions that could not be admitted immediately.
    waiting: VecDeque<PendingJob>,
    /// A drain pass is in flight; competing passes must not run.
    draining: bool,
    /// A completion raced with the in-flight drain pass; run another pass
    /// before releasing the guard.
    redrain: bool,
}

/// Outcome of the admission decision, resolved under the lane lock.
enum Decision {
    Duplicate,
    Launch(PendingJob),
    Enqueued,
}

/// Per-class admission controller.
///
/// Cheap to clone; clones share the same lane state. The completion hook
/// holds a clone for the lifetime of each launched job, so bookkeeping stays
/// alive as long as any job of this class is in flight.
#[derive(Clone)]
pub(super) struct Lane {
    class: JobClass,
    slots: usize,
    state: Arc<Mutex<LaneState>>,
    board: StatusBoard,
    bus: Bus,
    idle: Arc<Notify>,
}

impl Lane {
    /// Creates a lane with the given slot ceiling.
    ///
    /// The ceiling must be positive; configuration validation enforces this
    /// before any lane is constructed.
    pub fn new(
        class: JobClass,
        slots: usize,
        board: StatusBoard,
        bus: Bus,
        idle: Arc<Notify>,
    ) -> Self {
        Self {
            class,
            slots,
            state: Arc::new(Mutex::new(LaneState {
                active: 0,
                waiting: VecDeque::new(),
                draining: false,
                redrain: false,
            })),
            board,
            bus,
            idle,
        }
    }

    /// Returns the lane's job class.
    pub fn class(&self) -> JobClass {
        self.class
    }

    /// Shared event bus (used by the completion hook).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Number of jobs currently occupying slots.
    pub fn active(&self) -> usize {
        self.lock().active
    }

    /// Number of jobs waiting for a slot.
    pub fn queued(&self) -> usize {
        self.lock().waiting.len()
    }

    /// True if the lane has no running and no waiting jobs.
    pub fn is_idle(&self) -> bool {
        let st = self.lock();
        st.active == 0 && st.waiting.is_empty()
    }

    /// Handles one submission: duplicate-suppress, run immediately, or queue.
    ///
    /// Identity validation happens at the dispatcher surface; by the time a
    /// job reaches the lane its name is non-empty.
    pub fn submit(&self, job: JobRef) {
        let key = self.class.key_for(job.name());

        let decision = {
            let mut st = self.lock();
            if self.board.contains(&key) {
                Decision::Duplicate
            } else if st.active < self.slots {
                st.active += 1;
                self.board.set(&key, JobState::Running);
                Decision::Launch(PendingJob {
                    key: Arc::clone(&key),
                    job,
                })
            } else {
                self.board.set(&key, JobState::Queued);
                st.waiting.push_back(PendingJob {
                    key: Arc::clone(&key),
                    job,
                });
                Decision::Enqueued
            }
        };

        match decision {
            Decision::Duplicate => {
                self.bus.publish(
                    Event::new(EventKind::JobSkipped)
                        .with_job(Arc::clone(&key))
                        .with_class(self.class)
                        .with_reason("duplicate"),
                );
            }
            Decision::Launch(pending) => {
                self.publish_starting(&pending.key);
                completion::launch(self.clone(), pending);
            }
            Decision::Enqueued => {
                self.bus.publish(
                    Event::new(EventKind::JobQueued)
                        .with_job(Arc::clone(&key))
                        .with_class(self.class),
                );
            }
        }

        self.drain();
    }

    /// Completion callback: frees the slot, clears the board entry, and
    /// drains. Invoked by the completion hook for every outcome.
    pub fn on_finished(&self, key: &Arc<str>) {
        {
            let mut st = self.lock();
            if st.active == 0 {
                // A release with nothing active would mean double-completion.
                tracing::warn!(class = %self.class, job = %key, "slot release with no active jobs");
            } else {
                st.active -= 1;
            }
            self.board.remove(key);
        }

        self.drain();
        self.idle.notify_waiters();
    }

    /// Promotes waiting jobs into free slots until the lane is full or the
    /// wait list is empty.
    ///
    /// This is a loop, not a single step: several jobs may complete in a
    /// burst, and each freed slot must be able to admit one more waiting job
    /// before control returns to the caller. At most one job is admitted per
    /// lock acquisition and the launch happens outside the lock; the
    /// `draining` guard keeps concurrent passes from both observing
    /// `active < slots` and over-admitting.
    pub fn drain(&self) {
        {
            let mut st = self.lock();
            if st.draining {
                st.redrain = true;
                return;
            }
            st.draining = true;
        }

        loop {
            let next = {
                let mut st = self.lock();
                if st.active < self.slots {
                    match st.waiting.pop_front() {
                        Some(pending) => {
                            st.active += 1;
                            self.board.set(&pending.key, JobState::Running);
                            Some(pending)
                        }
                        None => None,
                    }
                } else {
                    None
                }
            };

            match next {
                Some(pending) => {
                    self.publish_starting(&pending.key);
                    completion::launch(self.clone(), pending);
                }
                None => {
                    let mut st = self.lock();
                    if st.redrain {
                        // A completion raced with this pass; run it again
                        // before giving up the guard.
                        st.redrain = false;
                        continue;
                    }
                    st.draining = false;
                    return;
                }
            }
        }
    }

    fn publish_starting(&self, key: &Arc<str>) {
        self.bus.publish(
            Event::new(EventKind::JobStarting)
                .with_job(Arc::clone(key))
                .with_class(self.class),
        );
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LaneState> {
        self.state.lock().expect("lane lock poisoned")
    }
}
