//! # Dispatcher configuration.
//!
//! [`DispatcherConfig`] fixes the per-class concurrency ceilings and the
//! event bus capacity at construction time. Ceilings are not runtime-mutable.
//!
//! # Example
//! ```
//! use jobvisor::DispatcherConfig;
//!
//! let mut cfg = DispatcherConfig::default();
//! cfg.bulk_slots = 1;
//!
//! assert_eq!(cfg.bulk_slots, 1);
//! assert_eq!(cfg.unit_slots, 6);
//! assert!(cfg.validate().is_ok());
//! ```

use crate::error::ConfigError;
use crate::jobs::JobClass;

/// Configuration for the [`Dispatcher`](crate::Dispatcher).
///
/// Controls how many jobs of each class may run concurrently and how large
/// the event bus ring buffer is.
#[derive(Clone, Copy, Debug)]
pub struct DispatcherConfig {
    /// Concurrency ceiling for [`JobClass::Bulk`] jobs.
    pub bulk_slots: usize,
    /// Concurrency ceiling for [`JobClass::Unit`] jobs.
    pub unit_slots: usize,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for DispatcherConfig {
    /// Provides the default configuration:
    /// - `bulk_slots = 2`
    /// - `unit_slots = 6`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            bulk_slots: 2,
            unit_slots: 6,
            bus_capacity: 1024,
        }
    }
}

impl DispatcherConfig {
    /// Returns the slot ceiling for the given class.
    pub fn slots_for(&self, class: JobClass) -> usize {
        match class {
            JobClass::Bulk => self.bulk_slots,
            JobClass::Unit => self.unit_slots,
        }
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    pub(crate) fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Checks that every class has a positive slot count.
    ///
    /// A zero ceiling would make its class permanently unable to admit work,
    /// which is an integration bug; it is rejected at build time rather than
    /// tolerated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bulk_slots == 0 {
            return Err(ConfigError::ZeroSlots {
                class: JobClass::Bulk.label(),
            });
        }
        if self.unit_slots == 0 {
            return Err(ConfigError::ZeroSlots {
                class: JobClass::Unit.label(),
            });
        }
        Ok(())
    }
}
