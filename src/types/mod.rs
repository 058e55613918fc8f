//! Core types for decoded sensor data.
//!
//! This module provides the data structures shared by the codec, the packet
//! handle and the stream session:
//! - [`Status`] and [`TimePreference`] mirror the backend's retrieval codes
//! - [`StreamPort`] names the headset's sensor channels and their [`StreamKind`]
//! - [`Raster`] is a bounds-checked, zero-copy view over a shared payload
//! - [`Frame`] is the tagged union of decoded frames
//!
//! ## Usage Example
//!
//! ```rust
//! use hlstream::types::{PvDecodedFormat, Raster, StreamPort, StreamKind};
//! use std::sync::Arc;
//!
//! assert_eq!(StreamPort::PersonalVideo.kind(), StreamKind::PersonalVideo);
//! assert_eq!(PvDecodedFormat::Rgba.bytes_per_pixel(), 4);
//!
//! let payload: Arc<[u8]> = vec![0u8; 12].into();
//! let image = Raster::<u8>::view(&payload, 0, [2, 2, 3], "example").unwrap();
//! assert_eq!(image.shape(), (2, 2, 3));
//! ```

mod formats;
mod frame;
mod port;
mod raster;
mod status;
mod update_rate;

pub use formats::{
    AacLevel, AudioProfile, PngFilterMode, PvDecodedFormat, RM_DEPTH_AHAT, RM_DEPTH_LONGTHROW,
    RM_VLC, SensorGeometry, StreamMode, VideoProfile,
};
pub use frame::{
    AudioFrame, AudioSamples, ExtendedDepthFrame, Frame, Pose, PvFrame, RmDepthFrame, RmVlcFrame,
};
pub use port::{StreamKind, StreamPort};
pub use raster::{Element, Raster};
pub use status::{Status, TimePreference};
pub use update_rate::UpdateRate;
