//! Retrieval status and timestamp matching policy

use serde::{Deserialize, Serialize};

/// Outcome of a retrieval from the time-indexed buffer.
///
/// Only `Ok` packets carry a payload and pose. `Wait` and `Discarded` are
/// regular results that the caller branches on, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Status {
    /// The packet was evicted from the buffer (or never matched)
    Discarded,
    /// The packet is available
    Ok,
    /// The packet has not been produced yet
    Wait,
}

impl Status {
    /// Map a backend status code (`-1`, `0`, `1`) to a status.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Status::Discarded),
            0 => Some(Status::Ok),
            1 => Some(Status::Wait),
            _ => None,
        }
    }

    /// Backend status code for this status.
    pub const fn code(self) -> i32 {
        match self {
            Status::Discarded => -1,
            Status::Ok => 0,
            Status::Wait => 1,
        }
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Status::Ok)
    }
}

/// Which neighbour wins when retrieving by timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum TimePreference {
    /// Nearest packet at or before the requested time
    PreferPast,
    /// Closest packet in absolute distance
    #[default]
    PreferNearest,
    /// Nearest packet at or after the requested time
    PreferFuture,
}

impl TimePreference {
    /// Backend code (`-1`, `0`, `1`).
    pub const fn code(self) -> i32 {
        match self {
            TimePreference::PreferPast => -1,
            TimePreference::PreferNearest => 0,
            TimePreference::PreferFuture => 1,
        }
    }
}
