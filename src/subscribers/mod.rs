//! # Event subscribers for the jobvisor dispatcher.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out, and a simple built-in [`LogWriter`] (behind the `logging`
//! feature) for handling lifecycle events broadcast through the dispatcher's
//! bus.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   lanes / completion hooks ── publish(Event) ──► Bus
//!                                                   │
//!                                          subscriber listener
//!                                                   │
//!                                                   ▼
//!                                             SubscriberSet
//!                                    ┌──────────────┼──────────────┐
//!                                    ▼              ▼              ▼
//!                               [queue S1]     [queue S2]     [queue SN]
//!                                    ▼              ▼              ▼
//!                               worker S1      worker S2      worker SN
//!                                    ▼              ▼              ▼
//!                              s1.on_event    s2.on_event    sN.on_event
//! ```

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
