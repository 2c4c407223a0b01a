//! Minimal dispatcher demo: submit a burst of bulk collection jobs and
//! watch the lifecycle events as the lane admits, queues, and drains them.
//!
//! Run with: `cargo run --example collect`

use std::time::Duration;

use jobvisor::{Dispatcher, DispatcherConfig, JobClass, JobError, JobFn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dispatcher = Dispatcher::new(DispatcherConfig::default())?;
    let mut events = dispatcher.subscribe();

    let printer = tokio::spawn(async move {
        while let Ok(ev) = events.recv().await {
            println!("{:>3} {:?} job={:?}", ev.seq, ev.kind, ev.job);
        }
    });

    // Default bulk ceiling is 2, so two of these run immediately and the
    // rest wait their turn.
    for i in 0..5 {
        let job = JobFn::arc(format!("store-{i}"), move || async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, JobError>(())
        });
        dispatcher.submit(JobClass::Bulk, job)?;
    }

    // Resubmitting a tracked identity is suppressed.
    let dup = JobFn::arc("store-0", || async { Ok::<_, JobError>(()) });
    dispatcher.submit(JobClass::Bulk, dup)?;

    dispatcher.wait_idle().await;
    drop(dispatcher);
    let _ = printer.await;
    Ok(())
}
