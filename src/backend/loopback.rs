//! In-process backend with the native library's buffer semantics
//!
//! A [`Feed`] plays the role of a device port: every packet pushed into it is
//! appended to the history of each stream currently open on that
//! `(host, port)`, with per-stream frame stamps starting at 0.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

use super::ring::{Lookup, TimeIndexedBuffer};
use super::{Backend, PacketId, RawPacket, StreamHandle};
use crate::config::Configuration;
use crate::types::{Pose, StreamPort, TimePreference};
use crate::{Result, StreamError};

/// Counters describing backend activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopbackStats {
    pub streams_opened: u64,
    pub streams_released: u64,
    pub open_streams: usize,
    pub packets_issued: u64,
    pub packets_released: u64,
    pub outstanding_packets: usize,
    /// Releases of packet ids that were not outstanding
    pub duplicate_releases: u64,
    pub dimension_queries: u64,
}

struct FeedState {
    dimensions: Option<(u32, u32)>,
}

struct StreamState {
    key: (String, u16),
    buffer: TimeIndexedBuffer,
}

#[derive(Default)]
struct LoopbackState {
    feeds: HashMap<(String, u16), FeedState>,
    streams: HashMap<u64, StreamState>,
    outstanding: HashSet<u64>,
    next_stream: u64,
    next_packet: u64,
    stats: LoopbackStats,
}

impl LoopbackState {
    fn stream(&self, handle: StreamHandle) -> Result<&StreamState> {
        self.streams
            .get(&handle.0)
            .ok_or_else(|| StreamError::backend("lookup", format!("unknown stream {}", handle.0)))
    }

    fn issue(
        &mut self,
        handle: StreamHandle,
        lookup: impl FnOnce(&TimeIndexedBuffer) -> Lookup<'_>,
    ) -> Result<RawPacket> {
        let id = PacketId(self.next_packet);
        let stream = self.stream(handle)?;
        let found = lookup(&stream.buffer);
        let status = found.status();

        let packet = match found {
            Lookup::Found(entry) => RawPacket {
                frame_stamp: entry.frame_stamp,
                status,
                timestamp: entry.timestamp,
                payload: Arc::clone(&entry.payload),
                pose: Arc::clone(&entry.pose),
                id,
            },
            Lookup::Wait | Lookup::Discarded => RawPacket {
                frame_stamp: -1,
                status,
                timestamp: 0,
                payload: Arc::from(Vec::new()),
                pose: Arc::from(Vec::new()),
                id,
            },
        };

        self.next_packet += 1;
        self.outstanding.insert(id.0);
        self.stats.packets_issued += 1;
        trace!(packet = id.0, ?status, frame_stamp = packet.frame_stamp, "Issued packet");
        Ok(packet)
    }
}

/// In-process [`Backend`] backed by [`TimeIndexedBuffer`]s.
///
/// Cloning yields another handle to the same backend.
#[derive(Clone, Default)]
pub struct LoopbackBackend {
    state: Arc<Mutex<LoopbackState>>,
}

impl LoopbackBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LoopbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a device port at `host` and return its producer side.
    pub fn feed(&self, host: impl Into<String>, port: StreamPort) -> Feed {
        self.register(host.into(), port, None)
    }

    /// Register a video or extended depth port with its negotiated frame size.
    pub fn feed_with_dimensions(
        &self,
        host: impl Into<String>,
        port: StreamPort,
        width: u32,
        height: u32,
    ) -> Feed {
        self.register(host.into(), port, Some((width, height)))
    }

    fn register(&self, host: String, port: StreamPort, dimensions: Option<(u32, u32)>) -> Feed {
        let key = (host, port.number());
        debug!(host = %key.0, port = key.1, ?dimensions, "Registered loopback feed");
        self.lock().feeds.insert(key.clone(), FeedState { dimensions });
        Feed { backend: self.clone(), key }
    }

    pub fn stats(&self) -> LoopbackStats {
        let state = self.lock();
        LoopbackStats {
            open_streams: state.streams.len(),
            outstanding_packets: state.outstanding.len(),
            ..state.stats
        }
    }
}

impl Backend for LoopbackBackend {
    fn open_stream(
        &self,
        host: &str,
        port: u16,
        buffer_size: usize,
        configuration: &Configuration,
    ) -> Result<StreamHandle> {
        let mut state = self.lock();
        let key = (host.to_string(), port);

        let Some(feed) = state.feeds.get(&key) else {
            return Err(StreamError::connection_failed(host, port, "no device listening"));
        };
        if buffer_size == 0 {
            return Err(StreamError::connection_failed(host, port, "buffer size must be positive"));
        }
        if let Some((width, height)) = feed.dimensions {
            let requested = (configuration.get_int("width"), configuration.get_int("height"));
            if let (Some(w), Some(h)) = requested {
                if (w, h) != (width as i64, height as i64) {
                    return Err(StreamError::connection_failed(
                        host,
                        port,
                        format!("unsupported resolution {}x{}", w, h),
                    ));
                }
            }
        }

        let handle = StreamHandle(state.next_stream);
        state.next_stream += 1;
        state
            .streams
            .insert(handle.0, StreamState { key, buffer: TimeIndexedBuffer::new(buffer_size) });
        state.stats.streams_opened += 1;
        debug!(host, port, buffer_size, stream = handle.0, "Opened loopback stream");
        Ok(handle)
    }

    fn release_stream(&self, handle: StreamHandle) {
        let mut state = self.lock();
        if state.streams.remove(&handle.0).is_some() {
            state.stats.streams_released += 1;
            debug!(stream = handle.0, "Released loopback stream");
        }
    }

    fn get_by_index(&self, handle: StreamHandle, frame_stamp: i64) -> Result<RawPacket> {
        self.lock().issue(handle, |buffer| buffer.get_by_index(frame_stamp))
    }

    fn get_by_timestamp(
        &self,
        handle: StreamHandle,
        timestamp: u64,
        preference: TimePreference,
        tiebreak_right: bool,
    ) -> Result<RawPacket> {
        self.lock()
            .issue(handle, |buffer| buffer.get_by_timestamp(timestamp, preference, tiebreak_right))
    }

    fn release_packet(&self, id: PacketId) {
        let mut state = self.lock();
        if state.outstanding.remove(&id.0) {
            state.stats.packets_released += 1;
        } else {
            state.stats.duplicate_releases += 1;
        }
    }

    fn get_pv_dimensions(&self, handle: StreamHandle) -> Result<(u32, u32)> {
        let mut state = self.lock();
        state.stats.dimension_queries += 1;
        let key = state.stream(handle)?.key.clone();
        state
            .feeds
            .get(&key)
            .and_then(|feed| feed.dimensions)
            .ok_or_else(|| StreamError::backend("get_pv_dimensions", "stream has no frame size"))
    }
}

/// Producer side of a loopback device port.
pub struct Feed {
    backend: LoopbackBackend,
    key: (String, u16),
}

impl Feed {
    /// Publish a packet to every stream open on this port.
    ///
    /// Returns the number of streams that received it.
    pub fn push(&self, timestamp: u64, payload: impl Into<Arc<[u8]>>, pose: Option<Pose>) -> usize {
        let payload = payload.into();
        let pose: Arc<[u8]> = match pose {
            Some(pose) => Arc::from(pose.to_le_bytes().to_vec()),
            None => Arc::from(Vec::new()),
        };

        let mut state = self.backend.lock();
        let mut reached = 0;
        for stream in state.streams.values_mut().filter(|s| s.key == self.key) {
            stream.buffer.push(timestamp, Arc::clone(&payload), Arc::clone(&pose));
            reached += 1;
        }
        trace!(port = self.key.1, timestamp, reached, "Pushed packet");
        reached
    }

    /// Take the port offline; streams already open keep their history.
    pub fn disconnect(self) {
        debug!(host = %self.key.0, port = self.key.1, "Disconnected loopback feed");
        self.backend.lock().feeds.remove(&self.key);
    }
}
