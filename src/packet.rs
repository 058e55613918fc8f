//! Retrieved packets and their native handles.
//!
//! A [`Packet`] owns the native packet it was decoded from. The native side
//! is released exactly once: either through [`Packet::release`] or when the
//! packet is dropped, whichever comes first. A second release is a no-op.
//!
//! After release the decoded payload and pose are gone: [`Packet::payload`]
//! and [`Packet::pose`] return [`StreamError::UseAfterRelease`]. The scalar
//! header fields (`frame_stamp`, `status`, `timestamp`) stay readable.
//! Rasters cloned out of a frame before release remain valid since they
//! share the payload buffer.

use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::backend::{Backend, PacketId, RawPacket};
use crate::codec::unpack_pose;
use crate::types::{Frame, Pose, Status};
use crate::{Result, StreamError};

/// Releases a native packet on drop.
struct PacketHandle {
    backend: Arc<dyn Backend>,
    id: Option<PacketId>,
}

impl PacketHandle {
    fn release(&mut self) {
        if let Some(id) = self.id.take() {
            trace!(packet = id.0, "Releasing packet");
            self.backend.release_packet(id);
        }
    }
}

impl Drop for PacketHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// One retrieval result with its decoded payload.
pub struct Packet {
    frame_stamp: i64,
    status: Status,
    timestamp: u64,
    payload: Option<Frame>,
    pose: Option<Pose>,
    handle: PacketHandle,
}

impl Packet {
    /// Wrap a raw backend packet, decoding the payload when the status is `Ok`.
    ///
    /// If decoding fails the native packet is released before the error is
    /// returned.
    pub(crate) fn decode<F>(raw: RawPacket, backend: Arc<dyn Backend>, decode: F) -> Result<Self>
    where
        F: FnOnce(&Arc<[u8]>) -> Result<Frame>,
    {
        let handle = PacketHandle { backend, id: Some(raw.id) };

        let (payload, pose) = if raw.status.is_ok() {
            (Some(decode(&raw.payload)?), unpack_pose(&raw.pose))
        } else {
            (None, None)
        };

        Ok(Self {
            frame_stamp: raw.frame_stamp,
            status: raw.status,
            timestamp: raw.timestamp,
            payload,
            pose,
            handle,
        })
    }

    pub fn frame_stamp(&self) -> i64 {
        self.frame_stamp
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    pub fn is_released(&self) -> bool {
        self.handle.id.is_none()
    }

    /// Decoded frame; `None` unless the status is `Ok`.
    pub fn payload(&self) -> Result<Option<&Frame>> {
        self.ensure_live()?;
        Ok(self.payload.as_ref())
    }

    /// Pose; `None` unless the status is `Ok` and the stream carries poses.
    pub fn pose(&self) -> Result<Option<&Pose>> {
        self.ensure_live()?;
        Ok(self.pose.as_ref())
    }

    /// Move the decoded frame out, leaving `None` behind.
    pub fn take_payload(&mut self) -> Result<Option<Frame>> {
        self.ensure_live()?;
        Ok(self.payload.take())
    }

    /// Release the native packet now. Calling this again does nothing.
    pub fn release(&mut self) {
        self.payload = None;
        self.pose = None;
        self.handle.release();
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_released() {
            return Err(StreamError::UseAfterRelease { frame_stamp: self.frame_stamp });
        }
        Ok(())
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("frame_stamp", &self.frame_stamp)
            .field("status", &self.status)
            .field("timestamp", &self.timestamp)
            .field("has_payload", &self.payload.is_some())
            .field("has_pose", &self.pose.is_some())
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LoopbackBackend;
    use crate::codec::FrameLayout;
    use crate::session::StreamSession;
    use crate::types::StreamPort;
    use proptest::prelude::*;

    fn raw(status: Status, payload: Vec<u8>, pose: Vec<u8>, id: u64) -> RawPacket {
        RawPacket {
            frame_stamp: 7,
            status,
            timestamp: 1_000,
            payload: payload.into(),
            pose: pose.into(),
            id: PacketId(id),
        }
    }

    fn counting_backend() -> (LoopbackBackend, Arc<dyn Backend>) {
        let backend = LoopbackBackend::new();
        let shared: Arc<dyn Backend> = Arc::new(backend.clone());
        (backend, shared)
    }

    proptest! {
        #[test]
        fn prop_non_ok_packets_carry_nothing(
            payload in prop::collection::vec(any::<u8>(), 0..256),
            pose in prop::collection::vec(any::<u8>(), 0..128),
            discarded in any::<bool>(),
        ) {
            let (_, backend) = counting_backend();
            let status = if discarded { Status::Discarded } else { Status::Wait };
            let packet = Packet::decode(raw(status, payload, pose, 1), backend, |p| {
                FrameLayout::Raw.decode(p)
            })
            .unwrap();

            prop_assert!(packet.payload().unwrap().is_none());
            prop_assert!(packet.pose().unwrap().is_none());
        }
    }

    #[test]
    fn ok_packet_exposes_payload_and_pose() {
        let (_, backend) = counting_backend();
        let pose = Pose::IDENTITY.to_le_bytes().to_vec();
        let packet =
            Packet::decode(raw(Status::Ok, vec![1, 2, 3], pose, 1), backend, |p| {
                FrameLayout::Raw.decode(p)
            })
            .unwrap();

        assert_eq!(packet.payload().unwrap().and_then(Frame::as_raw), Some(&[1u8, 2, 3][..]));
        assert_eq!(packet.pose().unwrap(), Some(&Pose::IDENTITY));
    }

    #[test]
    fn short_pose_is_absent() {
        let (_, backend) = counting_backend();
        let packet = Packet::decode(raw(Status::Ok, vec![1], vec![0; 32], 1), backend, |p| {
            FrameLayout::Raw.decode(p)
        })
        .unwrap();
        assert!(packet.pose().unwrap().is_none());
    }

    #[test]
    fn double_release_is_noop() {
        let loopback = LoopbackBackend::new();
        let feed = loopback.feed("10.0.0.7", StreamPort::SpatialInput);
        let mut session = StreamSession::with_defaults(
            Arc::new(loopback.clone()),
            "10.0.0.7",
            StreamPort::SpatialInput,
            4,
        );
        session.open().unwrap();
        feed.push(1, vec![0u8; 8], None);

        let mut packet = session.get_by_index(0).unwrap();
        packet.release();
        packet.release();
        drop(packet);

        let stats = loopback.stats();
        assert_eq!(stats.packets_issued, 1);
        assert_eq!(stats.packets_released, 1);
        assert_eq!(stats.duplicate_releases, 0);
    }

    #[test]
    fn access_after_release_is_guarded() {
        let (_, backend) = counting_backend();
        let mut packet = Packet::decode(raw(Status::Ok, vec![9], vec![], 3), backend, |p| {
            FrameLayout::Raw.decode(p)
        })
        .unwrap();
        packet.release();

        assert!(packet.is_released());
        assert!(matches!(packet.payload(), Err(StreamError::UseAfterRelease { frame_stamp: 7 })));
        assert!(matches!(packet.pose(), Err(StreamError::UseAfterRelease { .. })));
        assert!(matches!(packet.take_payload(), Err(StreamError::UseAfterRelease { .. })));
        assert_eq!(packet.status(), Status::Ok);
        assert_eq!(packet.timestamp(), 1_000);
    }

    #[test]
    fn decode_failure_still_releases() {
        let (loopback, backend) = counting_backend();
        let result = Packet::decode(raw(Status::Ok, vec![0; 10], vec![], 5), backend, |p| {
            FrameLayout::RmVlc.decode(p)
        });

        assert!(matches!(result, Err(StreamError::OutOfBounds { .. })));
        assert_eq!(loopback.stats().duplicate_releases, 1);
    }
}
