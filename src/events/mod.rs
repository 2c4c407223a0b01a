//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the dispatcher's lanes,
//! the completion hook, and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: lane admission/drain paths, the completion hook,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the dispatcher's subscriber listener (fans out to
//!   `SubscriberSet`) and anything holding a receiver from
//!   [`Dispatcher::subscribe`](crate::Dispatcher::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
