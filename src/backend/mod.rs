//! Streaming backend interface.
//!
//! The native acquisition library runs its own capture threads and keeps a
//! bounded, time-indexed history per opened stream. This module defines the
//! seam the session layer talks to ([`Backend`]) and an in-process
//! implementation of the same buffer semantics ([`LoopbackBackend`]).
//!
//! Handles returned by a backend are plain identifiers; ownership and
//! release-on-drop live in [`StreamSession`](crate::StreamSession) and
//! [`Packet`](crate::Packet).

mod loopback;
mod ring;

use std::sync::Arc;

pub use loopback::{Feed, LoopbackBackend, LoopbackStats};
pub use ring::{Entry, Lookup, TimeIndexedBuffer};

use crate::Result;
use crate::config::Configuration;
use crate::types::{Status, TimePreference};

/// Identifier of an open native stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(pub u64);

/// Identifier of a retrieved native packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketId(pub u64);

/// One retrieval result as delivered by the backend.
///
/// `payload` and `pose` are only meaningful when `status` is `Ok`. The
/// packet must be handed back through [`Backend::release_packet`] whatever
/// its status.
#[derive(Debug, Clone)]
pub struct RawPacket {
    pub frame_stamp: i64,
    pub status: Status,
    pub timestamp: u64,
    pub payload: Arc<[u8]>,
    pub pose: Arc<[u8]>,
    pub id: PacketId,
}

/// Native streaming backend.
///
/// Implementations need not make retrieval on one stream handle thread-safe;
/// callers serialize calls per handle. Calls on distinct handles may run
/// concurrently.
pub trait Backend: Send + Sync {
    /// Acquire a stream with a history of `buffer_size` packets.
    ///
    /// Fails with [`StreamError::Connection`](crate::StreamError::Connection)
    /// when the device is unreachable or rejects the configuration.
    fn open_stream(
        &self,
        host: &str,
        port: u16,
        buffer_size: usize,
        configuration: &Configuration,
    ) -> Result<StreamHandle>;

    fn release_stream(&self, handle: StreamHandle);

    fn get_by_index(&self, handle: StreamHandle, frame_stamp: i64) -> Result<RawPacket>;

    fn get_by_timestamp(
        &self,
        handle: StreamHandle,
        timestamp: u64,
        preference: TimePreference,
        tiebreak_right: bool,
    ) -> Result<RawPacket>;

    fn release_packet(&self, id: PacketId);

    /// Frame `(width, height)` negotiated for a video or extended depth stream.
    fn get_pv_dimensions(&self, handle: StreamHandle) -> Result<(u32, u32)>;
}
