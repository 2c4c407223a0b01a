//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [queued] job=bulk:store-42
//! [starting] job=bulk:store-42
//! [completed] job=bulk:store-42
//! [failed] job=unit:kw-7 reason="collection failed: http 503"
//! [skipped] job=bulk:store-42 reason="duplicate"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let job = e.job.as_deref().unwrap_or("?");
        match e.kind {
            EventKind::JobQueued => {
                println!("[queued] job={job}");
            }
            EventKind::JobStarting => {
                println!("[starting] job={job}");
            }
            EventKind::JobCompleted => {
                println!("[completed] job={job}");
            }
            EventKind::JobFailed => {
                println!("[failed] job={job} reason={:?}", e.reason);
            }
            EventKind::JobSkipped => {
                println!("[skipped] job={job} reason={:?}", e.reason);
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] subscriber={job} reason={:?}", e.reason);
            }
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panicked] subscriber={job} reason={:?}", e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
