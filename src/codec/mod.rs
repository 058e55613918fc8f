//! Frame codec: typed views over backend payloads.
//!
//! Every decoder reinterprets contiguous byte ranges of the shared payload
//! at fixed offsets. Rasters are zero-copy [`Raster`](crate::types::Raster)
//! views; scalar metadata is read with checked little-endian reads. A
//! payload shorter than its declared layout fails with
//! [`StreamError::OutOfBounds`](crate::StreamError::OutOfBounds) before any
//! field is read. Bytes past the end of the layout are ignored.
//!
//! ```rust
//! use hlstream::codec::{FrameLayout, unpack_pose};
//! use hlstream::types::Pose;
//! use std::sync::Arc;
//!
//! let pose = unpack_pose(&Pose::IDENTITY.to_le_bytes());
//! assert_eq!(pose, Some(Pose::IDENTITY));
//! assert_eq!(unpack_pose(&[0u8; 63]), None);
//!
//! let layout = FrameLayout::ExtendedDepth { width: 2, height: 1 };
//! let payload: Arc<[u8]> = vec![1, 0, 2, 0, 2, 0, 1, 0].into();
//! let frame = layout.decode(&payload).unwrap();
//! assert_eq!(frame.as_extended_depth().unwrap().width, 2);
//! ```

mod audio;
mod reader;
mod research_mode;
mod video;

use std::sync::Arc;

pub use audio::{unpack_extended_audio, unpack_microphone};
pub use research_mode::{
    RM_DEPTH_TRAILER_SIZE, RM_VLC_TRAILER_SIZE, unpack_rm_depth_ahat, unpack_rm_depth_longthrow,
    unpack_rm_vlc,
};
pub use video::{EXTENDED_DEPTH_TRAILER_SIZE, PV_METADATA_SIZE, unpack_extended_depth, unpack_pv};

use crate::Result;
use crate::types::{AacLevel, AudioProfile, Frame, Pose};

/// Size of an encoded pose matrix.
pub const POSE_SIZE: usize = 64;

/// Decode a 4×4 `f32` pose. Buffers shorter than 64 bytes carry no pose.
pub fn unpack_pose(bytes: &[u8]) -> Option<Pose> {
    if bytes.len() < POSE_SIZE {
        return None;
    }
    let mut rows = [[0f32; 4]; 4];
    for (i, chunk) in bytes[..POSE_SIZE].chunks_exact(4).enumerate() {
        rows[i / 4][i % 4] = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Some(Pose(rows))
}

/// Fully resolved decoding parameters for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLayout {
    RmVlc,
    RmDepthAhat,
    RmDepthLongthrow,
    Pv { width: usize, height: usize, bpp: usize },
    Microphone { profile: AudioProfile, level: AacLevel },
    ExtendedAudio { profile: AudioProfile },
    ExtendedDepth { width: usize, height: usize },
    /// Payload handed through untouched
    Raw,
}

impl FrameLayout {
    /// Decode `payload` according to this layout.
    pub fn decode(&self, payload: &Arc<[u8]>) -> Result<Frame> {
        Ok(match *self {
            FrameLayout::RmVlc => Frame::RmVlc(unpack_rm_vlc(payload)?),
            FrameLayout::RmDepthAhat => Frame::RmDepth(unpack_rm_depth_ahat(payload)?),
            FrameLayout::RmDepthLongthrow => Frame::RmDepth(unpack_rm_depth_longthrow(payload)?),
            FrameLayout::Pv { width, height, bpp } => {
                Frame::Pv(unpack_pv(payload, width, height, bpp)?)
            }
            FrameLayout::Microphone { profile, level } => {
                Frame::Audio(unpack_microphone(payload, profile, level)?)
            }
            FrameLayout::ExtendedAudio { profile } => {
                Frame::Audio(unpack_extended_audio(payload, profile)?)
            }
            FrameLayout::ExtendedDepth { width, height } => {
                Frame::ExtendedDepth(unpack_extended_depth(payload, width, height)?)
            }
            FrameLayout::Raw => Frame::Raw(Arc::clone(payload)),
        })
    }
}
