//! Dispatcher core: admission, status tracking, and completion plumbing.
//!
//! The only public API from this module is [`Dispatcher`] (with its builder
//! and the [`JobState`] read model). Internal modules:
//! - [`lane`]: per-class admission controller (active count, FIFO wait list, drain);
//! - [`board`]: shared identity → lifecycle-state registry;
//! - [`completion`]: wraps a unit of work so any outcome frees its slot;
//! - [`builder`]: wires bus, subscribers, lanes, and board together.

mod board;
mod builder;
mod completion;
mod core;
mod lane;

pub use board::JobState;
pub use builder::DispatcherBuilder;
pub use core::Dispatcher;
