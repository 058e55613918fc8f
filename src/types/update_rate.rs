//! Delivery rate control for packet subscriptions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rate at which a subscription hands packets to the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum UpdateRate {
    /// Every packet the reader produces
    Native,

    /// At most this many packets per second, latest wins.
    /// Rates at or above the sensor rate fall back to Native
    Max(u32),
}

impl UpdateRate {
    /// Effective rate for a sensor producing `source_hz` packets per second
    pub fn normalize(self, source_hz: f64) -> Self {
        match self {
            UpdateRate::Native => UpdateRate::Native,
            UpdateRate::Max(0) => UpdateRate::Native,
            UpdateRate::Max(hz) if hz as f64 >= source_hz => UpdateRate::Native,
            UpdateRate::Max(hz) => UpdateRate::Max(hz),
        }
    }

    /// Interval between deliveries, if throttling applies
    pub fn throttle_interval(self, source_hz: f64) -> Option<Duration> {
        match self.normalize(source_hz) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}
