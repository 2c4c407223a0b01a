use std::sync::Arc;

use tokio::sync::Notify;

use crate::config::DispatcherConfig;
use crate::error::ConfigError;
use crate::events::Bus;
use crate::jobs::JobClass;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::board::StatusBoard;
use super::core::Dispatcher;
use super::lane::Lane;

/// Builder for constructing a [`Dispatcher`].
pub struct DispatcherBuilder {
    cfg: DispatcherConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: DispatcherConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events (queued, starting, completed,
    /// failed, skipped) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds and returns the dispatcher.
    ///
    /// Validates the configuration first (fail fast on a zero slot count),
    /// then wires the event bus, subscriber workers, the shared status
    /// board, and the two admission lanes.
    pub fn build(self) -> Result<Arc<Dispatcher>, ConfigError> {
        self.cfg.validate()?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
        let board = StatusBoard::new();
        let idle = Arc::new(Notify::new());

        let bulk = Lane::new(
            JobClass::Bulk,
            self.cfg.bulk_slots,
            board.clone(),
            bus.clone(),
            Arc::clone(&idle),
        );
        let unit = Lane::new(
            JobClass::Unit,
            self.cfg.unit_slots,
            board.clone(),
            bus.clone(),
            Arc::clone(&idle),
        );

        let dispatcher = Arc::new(Dispatcher::from_parts(
            self.cfg, bus, subs, board, bulk, unit, idle,
        ));
        dispatcher.spawn_subscriber_listener();
        Ok(dispatcher)
    }
}
