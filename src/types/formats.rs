//! Encoding options and fixed sensor parameters

use serde::{Deserialize, Serialize};

/// Pixel layout of decoded personal video frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum PvDecodedFormat {
    #[default]
    Bgr,
    Rgb,
    Bgra,
    Rgba,
    Gray,
}

impl PvDecodedFormat {
    /// Resolve a raw format code.
    ///
    /// Codes are taken modulo 5, so out-of-range values alias onto a valid
    /// format instead of failing.
    pub const fn from_code(code: u8) -> Self {
        match code % 5 {
            0 => PvDecodedFormat::Bgr,
            1 => PvDecodedFormat::Rgb,
            2 => PvDecodedFormat::Bgra,
            3 => PvDecodedFormat::Rgba,
            _ => PvDecodedFormat::Gray,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            PvDecodedFormat::Bgr => 0,
            PvDecodedFormat::Rgb => 1,
            PvDecodedFormat::Bgra => 2,
            PvDecodedFormat::Rgba => 3,
            PvDecodedFormat::Gray => 4,
        }
    }

    /// Bytes per pixel of the decoded raster.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PvDecodedFormat::Bgr | PvDecodedFormat::Rgb => 3,
            PvDecodedFormat::Bgra | PvDecodedFormat::Rgba => 4,
            PvDecodedFormat::Gray => 1,
        }
    }
}

/// Audio encoding profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum AudioProfile {
    Aac12000,
    Aac16000,
    Aac20000,
    #[default]
    Aac24000,
    Raw,
}

impl AudioProfile {
    pub const fn code(self) -> u8 {
        match self {
            AudioProfile::Aac12000 => 0,
            AudioProfile::Aac16000 => 1,
            AudioProfile::Aac20000 => 2,
            AudioProfile::Aac24000 => 3,
            AudioProfile::Raw => 0xFF,
        }
    }

    pub const fn is_raw(self) -> bool {
        matches!(self, AudioProfile::Raw)
    }
}

/// AAC encoding level. For raw microphone audio, `L5` selects the
/// full-quality array capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum AacLevel {
    #[default]
    L2,
    L4,
    L5,
}

impl AacLevel {
    pub const fn code(self) -> u8 {
        match self {
            AacLevel::L2 => 0x29,
            AacLevel::L4 => 0x2A,
            AacLevel::L5 => 0x2B,
        }
    }
}

/// Video encoding profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum VideoProfile {
    H264Base,
    H264Main,
    #[default]
    H264High,
    H265Main,
    Raw,
}

impl VideoProfile {
    pub const fn code(self) -> u8 {
        match self {
            VideoProfile::H264Base => 0,
            VideoProfile::H264Main => 1,
            VideoProfile::H264High => 2,
            VideoProfile::H265Main => 3,
            VideoProfile::Raw => 0xFF,
        }
    }
}

/// Operating mode of a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum StreamMode {
    /// Data only
    Mode0,
    /// Data and pose
    #[default]
    Mode1,
    /// Calibration query
    Mode2,
}

impl StreamMode {
    pub const fn code(self) -> u8 {
        match self {
            StreamMode::Mode0 => 0,
            StreamMode::Mode1 => 1,
            StreamMode::Mode2 => 2,
        }
    }
}

/// PNG filter used for Long Throw depth compression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum PngFilterMode {
    Automatic,
    Disable,
    None,
    Sub,
    Up,
    Avg,
    #[default]
    Paeth,
    Adaptive,
}

impl PngFilterMode {
    pub const fn code(self) -> u8 {
        match self {
            PngFilterMode::Automatic => 0,
            PngFilterMode::Disable => 1,
            PngFilterMode::None => 2,
            PngFilterMode::Sub => 3,
            PngFilterMode::Up => 4,
            PngFilterMode::Avg => 5,
            PngFilterMode::Paeth => 6,
            PngFilterMode::Adaptive => 7,
        }
    }
}

/// Fixed geometry of a research mode sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorGeometry {
    pub width: usize,
    pub height: usize,
    pub fps: u32,
}

impl SensorGeometry {
    pub const fn pixels(&self) -> usize {
        self.width * self.height
    }
}

/// Visible light cameras (grayscale).
pub const RM_VLC: SensorGeometry = SensorGeometry { width: 640, height: 480, fps: 30 };

/// Short range (articulated hand tracking) depth.
pub const RM_DEPTH_AHAT: SensorGeometry = SensorGeometry { width: 512, height: 512, fps: 45 };

/// Long range depth.
pub const RM_DEPTH_LONGTHROW: SensorGeometry = SensorGeometry { width: 320, height: 288, fps: 5 };
