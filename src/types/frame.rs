//! Decoded sensor frame records

use std::sync::Arc;

use super::Raster;

/// Camera or rig pose as a 4×4 row-major transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose(pub [[f32; 4]; 4]);

impl Pose {
    pub const IDENTITY: Pose = Pose([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub fn rows(&self) -> &[[f32; 4]; 4] {
        &self.0
    }

    /// Little-endian encoding as delivered by the backend.
    pub fn to_le_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        for (i, value) in self.0.iter().flatten().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&value.to_le_bytes());
        }
        out
    }
}

/// Visible light camera frame.
#[derive(Debug, Clone)]
pub struct RmVlcFrame {
    /// Grayscale image, `480 × 640 × 1`
    pub image: Raster<u8>,
    pub sensor_ticks: u64,
    pub exposure: u64,
    pub gain: u32,
}

/// AHAT or Long Throw depth frame.
#[derive(Debug, Clone)]
pub struct RmDepthFrame {
    pub depth: Raster<u16>,
    /// Active brightness, same shape as `depth`
    pub ab: Raster<u16>,
    pub sensor_ticks: u64,
}

/// Personal video frame with per-frame camera metadata.
#[derive(Debug, Clone)]
pub struct PvFrame {
    /// `height × width × bpp`
    pub image: Raster<u8>,
    pub focal_length: [f32; 2],
    pub principal_point: [f32; 2],
    pub exposure_time: u64,
    pub exposure_compensation: [u64; 2],
    pub lens_position: u32,
    pub focus_state: u32,
    pub iso_speed: u32,
    pub white_balance: u32,
    pub iso_gains: [f32; 2],
    pub white_balance_gains: [f32; 3],
    pub resolution: [u16; 2],
}

/// Planar audio samples, one row per channel.
#[derive(Debug, Clone)]
pub enum AudioSamples {
    F32(Raster<f32>),
    I16(Raster<i16>),
}

/// Microphone or extended audio frame.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: AudioSamples,
}

impl AudioFrame {
    pub fn channels(&self) -> usize {
        match &self.samples {
            AudioSamples::F32(raster) => raster.rows(),
            AudioSamples::I16(raster) => raster.rows(),
        }
    }

    /// Samples per channel.
    pub fn samples_per_channel(&self) -> usize {
        match &self.samples {
            AudioSamples::F32(raster) => raster.cols(),
            AudioSamples::I16(raster) => raster.cols(),
        }
    }
}

/// Extended depth frame.
#[derive(Debug, Clone)]
pub struct ExtendedDepthFrame {
    /// `height × width × 1`
    pub depth: Raster<u16>,
    pub width: u16,
    pub height: u16,
}

/// A decoded payload, tagged by stream type.
#[derive(Debug, Clone)]
pub enum Frame {
    RmVlc(RmVlcFrame),
    RmDepth(RmDepthFrame),
    Pv(PvFrame),
    Audio(AudioFrame),
    ExtendedDepth(ExtendedDepthFrame),
    /// Streams delivered without a typed layout (IMU, spatial input, eye tracking)
    Raw(Arc<[u8]>),
}

impl Frame {
    pub fn as_rm_vlc(&self) -> Option<&RmVlcFrame> {
        match self {
            Frame::RmVlc(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_rm_depth(&self) -> Option<&RmDepthFrame> {
        match self {
            Frame::RmDepth(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_pv(&self) -> Option<&PvFrame> {
        match self {
            Frame::Pv(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioFrame> {
        match self {
            Frame::Audio(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_extended_depth(&self) -> Option<&ExtendedDepthFrame> {
        match self {
            Frame::ExtendedDepth(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            Frame::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }
}
