//! Stream sessions: one open native stream per `(host, port)`.
//!
//! A session moves through `Closed → Open → Closed`. [`StreamSession::open`]
//! and [`StreamSession::close`] are idempotent, and dropping an open session
//! closes it. Retrieval is only valid while open.
//!
//! Retrieval takes `&mut self`, so calls on one session are serialized by
//! the caller; separate sessions are independent and may live on separate
//! threads.
//!
//! ```rust
//! use hlstream::{LoopbackBackend, StreamSession, StreamConfig, Status};
//! use hlstream::types::StreamPort;
//! use std::sync::Arc;
//!
//! let backend = LoopbackBackend::new();
//! let feed = backend.feed("10.0.0.2", StreamPort::SpatialInput);
//!
//! let mut session = StreamSession::new(
//!     Arc::new(backend.clone()),
//!     "10.0.0.2",
//!     StreamPort::SpatialInput,
//!     32,
//!     StreamConfig::for_port(StreamPort::SpatialInput),
//! );
//! session.open()?;
//! feed.push(1_000, vec![0u8; 16], None);
//!
//! let packet = session.get_by_index(0)?;
//! assert_eq!(packet.status(), Status::Ok);
//! assert_eq!(session.get_by_index(1)?.status(), Status::Wait);
//! # Ok::<(), hlstream::StreamError>(())
//! ```

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::backend::{Backend, RawPacket, StreamHandle};
use crate::codec::FrameLayout;
use crate::config::StreamConfig;
use crate::packet::Packet;
use crate::types::{StreamPort, TimePreference};
use crate::{Result, StreamError};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open,
}

impl SessionState {
    fn name(self) -> &'static str {
        match self {
            SessionState::Closed => "closed",
            SessionState::Open => "open",
        }
    }
}

/// Connection to one sensor port with a bounded, time-indexed history.
pub struct StreamSession {
    backend: Arc<dyn Backend>,
    host: String,
    port: StreamPort,
    buffer_size: usize,
    config: StreamConfig,
    handle: Option<StreamHandle>,
    /// Resolved on the first payload-bearing decode
    layout: Option<FrameLayout>,
}

impl StreamSession {
    /// Create a closed session. The configuration is owned by the session
    /// and cannot change afterwards.
    pub fn new(
        backend: Arc<dyn Backend>,
        host: impl Into<String>,
        port: StreamPort,
        buffer_size: usize,
        config: StreamConfig,
    ) -> Self {
        Self {
            backend,
            host: host.into(),
            port,
            buffer_size,
            config,
            handle: None,
            layout: None,
        }
    }

    /// Create a closed session with the device defaults for `port`.
    pub fn with_defaults(
        backend: Arc<dyn Backend>,
        host: impl Into<String>,
        port: StreamPort,
        buffer_size: usize,
    ) -> Self {
        Self::new(backend, host, port, buffer_size, StreamConfig::for_port(port))
    }

    /// Acquire the native stream. Does nothing if already open.
    pub fn open(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }

        if self.config.kind() != self.port.kind() {
            return Err(StreamError::connection_failed(
                self.host.clone(),
                self.port.number(),
                format!("{:?} configuration does not apply to {}", self.config.kind(), self.port),
            ));
        }

        let handle = self.backend.open_stream(
            &self.host,
            self.port.number(),
            self.buffer_size,
            &self.config.to_options(),
        )?;
        self.handle = Some(handle);
        info!(
            host = %self.host,
            port = %self.port,
            buffer_size = self.buffer_size,
            "Stream opened"
        );
        Ok(())
    }

    /// Release the native stream. Does nothing if already closed.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.backend.release_stream(handle);
            info!(host = %self.host, port = %self.port, "Stream closed");
        }
    }

    pub fn state(&self) -> SessionState {
        if self.handle.is_some() { SessionState::Open } else { SessionState::Closed }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> StreamPort {
        self.port
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Decoding layout, if it has been resolved.
    pub fn layout(&self) -> Option<FrameLayout> {
        self.layout
    }

    /// Packet with the given frame stamp.
    ///
    /// Evicted stamps come back as `Discarded` and stamps not produced yet as
    /// `Wait`; neither is an error.
    pub fn get_by_index(&mut self, frame_stamp: i64) -> Result<Packet> {
        let handle = self.require_open("get_by_index")?;
        let raw = self.backend.get_by_index(handle, frame_stamp)?;
        self.unpack(handle, raw)
    }

    /// Packet whose timestamp best matches `timestamp`.
    ///
    /// With [`TimePreference::PreferNearest`] and two equally near packets,
    /// `tiebreak_right` picks the later one.
    pub fn get_by_timestamp(
        &mut self,
        timestamp: u64,
        preference: TimePreference,
        tiebreak_right: bool,
    ) -> Result<Packet> {
        let handle = self.require_open("get_by_timestamp")?;
        let raw = self.backend.get_by_timestamp(handle, timestamp, preference, tiebreak_right)?;
        self.unpack(handle, raw)
    }

    fn require_open(&self, operation: &'static str) -> Result<StreamHandle> {
        self.handle.ok_or_else(|| StreamError::lifecycle(operation, self.state().name()))
    }

    fn unpack(&mut self, handle: StreamHandle, raw: RawPacket) -> Result<Packet> {
        let backend = Arc::clone(&self.backend);
        Packet::decode(raw, backend, |payload| {
            let layout = self.resolve_layout(handle)?;
            layout.decode(payload)
        })
    }

    fn resolve_layout(&mut self, handle: StreamHandle) -> Result<FrameLayout> {
        if let Some(layout) = self.layout {
            return Ok(layout);
        }

        let layout = match &self.config {
            StreamConfig::RmVlc(_) => FrameLayout::RmVlc,
            StreamConfig::RmDepthAhat(_) => FrameLayout::RmDepthAhat,
            StreamConfig::RmDepthLongthrow(_) => FrameLayout::RmDepthLongthrow,
            StreamConfig::PersonalVideo(pv) => {
                let (width, height) = self.backend.get_pv_dimensions(handle)?;
                FrameLayout::Pv {
                    width: width as usize,
                    height: height as usize,
                    bpp: pv.decoded_format.bytes_per_pixel(),
                }
            }
            StreamConfig::Microphone(mic) => {
                FrameLayout::Microphone { profile: mic.profile, level: mic.level }
            }
            StreamConfig::ExtendedAudio(audio) => {
                FrameLayout::ExtendedAudio { profile: audio.profile }
            }
            StreamConfig::ExtendedDepth(_) => {
                let (width, height) = self.backend.get_pv_dimensions(handle)?;
                FrameLayout::ExtendedDepth { width: width as usize, height: height as usize }
            }
            StreamConfig::RmImu(_)
            | StreamConfig::SpatialInput(_)
            | StreamConfig::ExtendedEyeTracking(_) => FrameLayout::Raw,
        };

        debug!(port = %self.port, ?layout, "Resolved frame layout");
        self.layout = Some(layout);
        Ok(layout)
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if self.handle.is_some() {
            warn!(host = %self.host, port = %self.port, "Session dropped while open, closing");
            self.close();
        }
    }
}

impl fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSession")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("buffer_size", &self.buffer_size)
            .field("state", &self.state())
            .field("layout", &self.layout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LoopbackBackend;
    use crate::codec::{PV_METADATA_SIZE, RM_VLC_TRAILER_SIZE};
    use crate::config::PvConfig;
    use crate::types::{Pose, PvDecodedFormat, RM_VLC, Status};

    const HOST: &str = "127.0.0.1";

    fn session(backend: &LoopbackBackend, port: StreamPort, config: StreamConfig) -> StreamSession {
        StreamSession::new(Arc::new(backend.clone()), HOST, port, 16, config)
    }

    #[test]
    fn retrieval_requires_open_session() {
        let backend = LoopbackBackend::new();
        let _feed = backend.feed(HOST, StreamPort::RmVlcLeftFront);
        let mut session = StreamSession::with_defaults(
            Arc::new(backend.clone()),
            HOST,
            StreamPort::RmVlcLeftFront,
            8,
        );

        assert!(matches!(
            session.get_by_index(0),
            Err(StreamError::Lifecycle { operation: "get_by_index", state: "closed" })
        ));

        session.open().unwrap();
        session.close();
        assert!(matches!(
            session.get_by_timestamp(0, TimePreference::PreferPast, false),
            Err(StreamError::Lifecycle { .. })
        ));
    }

    #[test]
    fn open_and_close_are_idempotent() {
        let backend = LoopbackBackend::new();
        let feed = backend.feed(HOST, StreamPort::RmImuAccelerometer);
        let mut session = StreamSession::with_defaults(
            Arc::new(backend.clone()),
            HOST,
            StreamPort::RmImuAccelerometer,
            8,
        );

        session.open().unwrap();
        session.open().unwrap();
        assert_eq!(backend.stats().streams_opened, 1);
        assert_eq!(session.state(), SessionState::Open);

        feed.push(5, vec![1u8, 2], None);
        let packet = session.get_by_index(0).unwrap();
        assert_eq!(packet.payload().unwrap().and_then(|f| f.as_raw()), Some(&[1u8, 2][..]));
        drop(packet);

        session.close();
        session.close();
        assert_eq!(backend.stats().streams_released, 1);
        assert_eq!(backend.stats().open_streams, 0);
    }

    #[test]
    fn dropping_open_session_releases_stream() {
        let backend = LoopbackBackend::new();
        let _feed = backend.feed(HOST, StreamPort::SpatialInput);
        {
            let mut session = StreamSession::with_defaults(
                Arc::new(backend.clone()),
                HOST,
                StreamPort::SpatialInput,
                4,
            );
            session.open().unwrap();
        }
        assert_eq!(backend.stats().open_streams, 0);
    }

    #[test]
    fn mismatched_configuration_is_rejected_at_open() {
        let backend = LoopbackBackend::new();
        let _feed = backend.feed(HOST, StreamPort::Microphone);
        let gyroscope = StreamConfig::for_port(StreamPort::RmImuGyroscope);
        let mut session = session(&backend, StreamPort::Microphone, gyroscope);

        assert!(matches!(session.open(), Err(StreamError::Connection { .. })));
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn pv_dimensions_are_queried_once() {
        let backend = LoopbackBackend::new();
        let feed = backend.feed_with_dimensions(HOST, StreamPort::PersonalVideo, 8, 6);
        let config = PvConfig::new(8, 6, 30).with_decoded_format(PvDecodedFormat::Gray);
        let mut session = session(&backend, StreamPort::PersonalVideo, config.into());
        session.open().unwrap();

        for i in 0..5u64 {
            feed.push(i * 100, vec![0u8; 8 * 6 + PV_METADATA_SIZE], Some(Pose::IDENTITY));
        }
        assert_eq!(backend.stats().dimension_queries, 0);

        for stamp in 0..5 {
            let packet = session.get_by_index(stamp).unwrap();
            let frame = packet.payload().unwrap().and_then(|f| f.as_pv()).unwrap();
            assert_eq!(frame.image.shape(), (6, 8, 1));
        }
        assert_eq!(backend.stats().dimension_queries, 1);
        assert_eq!(session.layout(), Some(FrameLayout::Pv { width: 8, height: 6, bpp: 1 }));
    }

    #[test]
    fn non_ok_packets_do_not_resolve_layout() {
        let backend = LoopbackBackend::new();
        let _feed = backend.feed_with_dimensions(HOST, StreamPort::ExtendedDepth, 4, 4);
        let mut session = StreamSession::with_defaults(
            Arc::new(backend.clone()),
            HOST,
            StreamPort::ExtendedDepth,
            4,
        );
        session.open().unwrap();

        let packet = session.get_by_index(0).unwrap();
        assert_eq!(packet.status(), Status::Wait);
        assert_eq!(backend.stats().dimension_queries, 0);
        assert_eq!(session.layout(), None);
    }

    #[test]
    fn decode_failure_releases_packet() {
        let backend = LoopbackBackend::new();
        let feed = backend.feed(HOST, StreamPort::RmVlcLeftLeft);
        let mut session = StreamSession::with_defaults(
            Arc::new(backend.clone()),
            HOST,
            StreamPort::RmVlcLeftLeft,
            4,
        );
        session.open().unwrap();

        feed.push(1, vec![0u8; RM_VLC.pixels() + RM_VLC_TRAILER_SIZE - 1], None);
        assert!(matches!(session.get_by_index(0), Err(StreamError::OutOfBounds { .. })));

        let stats = backend.stats();
        assert_eq!(stats.packets_issued, 1);
        assert_eq!(stats.packets_released, 1);
        assert_eq!(stats.outstanding_packets, 0);
    }
}
