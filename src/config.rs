//! Per-stream configuration records.
//!
//! [`StreamConfig`] is a closed set of per-stream-type records. Each record
//! starts from the device defaults and is adjusted with builder setters.
//! Cross-field consistency is not checked here; unsupported combinations are
//! rejected by the backend when the session opens.
//!
//! Configurations can also be loaded from YAML:
//!
//! ```rust
//! use hlstream::{StreamConfig, types::PvDecodedFormat};
//!
//! let config = StreamConfig::from_yaml(
//!     "stream: personal_video\nwidth: 640\nheight: 360\ndecoded_format: rgba\n",
//! )?;
//! let StreamConfig::PersonalVideo(pv) = &config else { unreachable!() };
//! assert_eq!(pv.decoded_format, PvDecodedFormat::Rgba);
//! assert_eq!(pv.framerate, 30);
//! # Ok::<(), hlstream::StreamError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::types::{
    AacLevel, AudioProfile, PngFilterMode, PvDecodedFormat, StreamKind, StreamMode, StreamPort,
    VideoProfile,
};
use crate::{Result, StreamError};

/// Visible light camera options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct RmVlcConfig {
    pub mode: StreamMode,
    pub divisor: u32,
    pub profile: VideoProfile,
    pub bitrate: Option<u32>,
}

impl Default for RmVlcConfig {
    fn default() -> Self {
        Self { mode: StreamMode::Mode1, divisor: 1, profile: VideoProfile::H265Main, bitrate: None }
    }
}

/// AHAT depth options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct RmDepthAhatConfig {
    pub mode: StreamMode,
    pub divisor: u32,
    pub profile_ab: VideoProfile,
    pub bitrate: Option<u32>,
}

impl Default for RmDepthAhatConfig {
    fn default() -> Self {
        Self {
            mode: StreamMode::Mode1,
            divisor: 1,
            profile_ab: VideoProfile::H265Main,
            bitrate: None,
        }
    }
}

/// Long Throw depth options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct RmDepthLongthrowConfig {
    pub mode: StreamMode,
    pub divisor: u32,
    pub png_filter: PngFilterMode,
}

impl Default for RmDepthLongthrowConfig {
    fn default() -> Self {
        Self { mode: StreamMode::Mode1, divisor: 1, png_filter: PngFilterMode::Paeth }
    }
}

/// IMU options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct RmImuConfig {
    pub mode: StreamMode,
}

/// Personal video options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct PvConfig {
    pub mode: StreamMode,
    pub width: u32,
    pub height: u32,
    pub framerate: u32,
    pub divisor: u32,
    pub profile: VideoProfile,
    pub bitrate: Option<u32>,
    pub decoded_format: PvDecodedFormat,
}

impl Default for PvConfig {
    fn default() -> Self {
        Self {
            mode: StreamMode::Mode1,
            width: 1920,
            height: 1080,
            framerate: 30,
            divisor: 1,
            profile: VideoProfile::H265Main,
            bitrate: None,
            decoded_format: PvDecodedFormat::Bgr,
        }
    }
}

impl PvConfig {
    pub fn new(width: u32, height: u32, framerate: u32) -> Self {
        Self { width, height, framerate, ..Self::default() }
    }

    pub fn with_mode(mut self, mode: StreamMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_profile(mut self, profile: VideoProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn with_decoded_format(mut self, format: PvDecodedFormat) -> Self {
        self.decoded_format = format;
        self
    }

    /// Select the decoded format by raw code (taken modulo 5).
    pub fn with_decoded_format_code(self, code: u8) -> Self {
        self.with_decoded_format(PvDecodedFormat::from_code(code))
    }
}

/// Microphone options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct MicrophoneConfig {
    pub profile: AudioProfile,
    pub level: AacLevel,
}

impl MicrophoneConfig {
    pub fn new(profile: AudioProfile, level: AacLevel) -> Self {
        Self { profile, level }
    }
}

/// Spatial input has no options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct SpatialInputConfig {}

/// Extended eye tracking options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct EyeTrackingConfig {
    pub framerate: u32,
}

impl Default for EyeTrackingConfig {
    fn default() -> Self {
        Self { framerate: 30 }
    }
}

/// Extended audio (mixed microphone / application audio) options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ExtendedAudioConfig {
    pub mixer_mode: u32,
    pub loopback_gain: f32,
    pub microphone_gain: f32,
    pub profile: AudioProfile,
    pub level: AacLevel,
}

impl Default for ExtendedAudioConfig {
    fn default() -> Self {
        Self {
            mixer_mode: 0,
            loopback_gain: 1.0,
            microphone_gain: 1.0,
            profile: AudioProfile::Aac24000,
            level: AacLevel::L2,
        }
    }
}

/// Extended depth (external depth camera) options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ExtendedDepthConfig {
    pub media_index: u32,
    pub stride_mask: u32,
    pub mode: StreamMode,
    pub divisor: u32,
}

impl Default for ExtendedDepthConfig {
    fn default() -> Self {
        Self { media_index: 0xFFFF_FFFF, stride_mask: 0x3F, mode: StreamMode::Mode0, divisor: 1 }
    }
}

/// Configuration for one stream, by stream type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stream", rename_all = "snake_case")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum StreamConfig {
    RmVlc(RmVlcConfig),
    RmDepthAhat(RmDepthAhatConfig),
    RmDepthLongthrow(RmDepthLongthrowConfig),
    RmImu(RmImuConfig),
    PersonalVideo(PvConfig),
    Microphone(MicrophoneConfig),
    SpatialInput(SpatialInputConfig),
    ExtendedEyeTracking(EyeTrackingConfig),
    ExtendedAudio(ExtendedAudioConfig),
    ExtendedDepth(ExtendedDepthConfig),
}

impl StreamConfig {
    /// Device defaults for the stream on `port`.
    pub fn for_port(port: StreamPort) -> Self {
        match port.kind() {
            StreamKind::RmVlc => StreamConfig::RmVlc(RmVlcConfig::default()),
            StreamKind::RmDepthAhat => StreamConfig::RmDepthAhat(RmDepthAhatConfig::default()),
            StreamKind::RmDepthLongthrow => {
                StreamConfig::RmDepthLongthrow(RmDepthLongthrowConfig::default())
            }
            StreamKind::RmImu => StreamConfig::RmImu(RmImuConfig::default()),
            StreamKind::PersonalVideo => StreamConfig::PersonalVideo(PvConfig::default()),
            StreamKind::Microphone => StreamConfig::Microphone(MicrophoneConfig::default()),
            StreamKind::SpatialInput => StreamConfig::SpatialInput(SpatialInputConfig::default()),
            StreamKind::ExtendedEyeTracking => {
                StreamConfig::ExtendedEyeTracking(EyeTrackingConfig::default())
            }
            StreamKind::ExtendedAudio => {
                StreamConfig::ExtendedAudio(ExtendedAudioConfig::default())
            }
            StreamKind::ExtendedDepth => {
                StreamConfig::ExtendedDepth(ExtendedDepthConfig::default())
            }
        }
    }

    /// Stream type this configuration applies to.
    pub fn kind(&self) -> StreamKind {
        match self {
            StreamConfig::RmVlc(_) => StreamKind::RmVlc,
            StreamConfig::RmDepthAhat(_) => StreamKind::RmDepthAhat,
            StreamConfig::RmDepthLongthrow(_) => StreamKind::RmDepthLongthrow,
            StreamConfig::RmImu(_) => StreamKind::RmImu,
            StreamConfig::PersonalVideo(_) => StreamKind::PersonalVideo,
            StreamConfig::Microphone(_) => StreamKind::Microphone,
            StreamConfig::SpatialInput(_) => StreamKind::SpatialInput,
            StreamConfig::ExtendedEyeTracking(_) => StreamKind::ExtendedEyeTracking,
            StreamConfig::ExtendedAudio(_) => StreamKind::ExtendedAudio,
            StreamConfig::ExtendedDepth(_) => StreamKind::ExtendedDepth,
        }
    }

    /// Nominal packet rate, used to normalize subscription rates.
    pub fn nominal_hz(&self) -> f64 {
        match self {
            StreamConfig::RmVlc(c) => crate::types::RM_VLC.fps as f64 / c.divisor.max(1) as f64,
            StreamConfig::RmDepthAhat(c) => {
                crate::types::RM_DEPTH_AHAT.fps as f64 / c.divisor.max(1) as f64
            }
            StreamConfig::RmDepthLongthrow(c) => {
                crate::types::RM_DEPTH_LONGTHROW.fps as f64 / c.divisor.max(1) as f64
            }
            StreamConfig::PersonalVideo(c) => c.framerate as f64 / c.divisor.max(1) as f64,
            StreamConfig::ExtendedEyeTracking(c) => c.framerate as f64,
            StreamConfig::ExtendedDepth(c) => 30.0 / c.divisor.max(1) as f64,
            // Audio chunks and IMU batches arrive at roughly this rate
            StreamConfig::RmImu(_)
            | StreamConfig::Microphone(_)
            | StreamConfig::ExtendedAudio(_)
            | StreamConfig::SpatialInput(_) => 60.0,
        }
    }

    /// Option mapping handed to the backend.
    pub fn to_options(&self) -> Configuration {
        let mut options = Configuration::default();
        match self {
            StreamConfig::RmVlc(c) => {
                options.set("mode", c.mode.code());
                options.set("divisor", c.divisor);
                options.set("profile", c.profile.code());
                options.set_optional("bitrate", c.bitrate);
            }
            StreamConfig::RmDepthAhat(c) => {
                options.set("mode", c.mode.code());
                options.set("divisor", c.divisor);
                options.set("profile_ab", c.profile_ab.code());
                options.set_optional("bitrate", c.bitrate);
            }
            StreamConfig::RmDepthLongthrow(c) => {
                options.set("mode", c.mode.code());
                options.set("divisor", c.divisor);
                options.set("png_filter", c.png_filter.code());
            }
            StreamConfig::RmImu(c) => {
                options.set("mode", c.mode.code());
            }
            StreamConfig::PersonalVideo(c) => {
                options.set("mode", c.mode.code());
                options.set("width", c.width);
                options.set("height", c.height);
                options.set("framerate", c.framerate);
                options.set("divisor", c.divisor);
                options.set("profile", c.profile.code());
                options.set_optional("bitrate", c.bitrate);
                options.set("decoded_format", c.decoded_format.code());
            }
            StreamConfig::Microphone(c) => {
                options.set("profile", c.profile.code());
                options.set("level", c.level.code());
            }
            StreamConfig::SpatialInput(_) => {}
            StreamConfig::ExtendedEyeTracking(c) => {
                options.set("framerate", c.framerate);
            }
            StreamConfig::ExtendedAudio(c) => {
                options.set("mixer_mode", c.mixer_mode);
                options.insert("loopback_gain", OptionValue::Float(c.loopback_gain as f64));
                options.insert("microphone_gain", OptionValue::Float(c.microphone_gain as f64));
                options.set("profile", c.profile.code());
                options.set("level", c.level.code());
            }
            StreamConfig::ExtendedDepth(c) => {
                options.set("media_index", c.media_index);
                options.set("stride_mask", c.stride_mask);
                options.set("mode", c.mode.code());
                options.set("divisor", c.divisor);
            }
        }
        options
    }

    /// Parse a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: StreamConfig = serde_yaml_ng::from_str(yaml)?;
        debug!(kind = ?config.kind(), "Parsed stream configuration");
        Ok(config)
    }

    /// Read and parse a YAML configuration file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| StreamError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml(&yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

impl From<PvConfig> for StreamConfig {
    fn from(config: PvConfig) -> Self {
        StreamConfig::PersonalVideo(config)
    }
}

impl From<MicrophoneConfig> for StreamConfig {
    fn from(config: MicrophoneConfig) -> Self {
        StreamConfig::Microphone(config)
    }
}

/// A single backend option value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionValue {
    Int(i64),
    Float(f64),
}

/// Immutable option-name → value mapping passed to `open_stream`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    options: BTreeMap<&'static str, OptionValue>,
}

impl Configuration {
    fn set(&mut self, name: &'static str, value: impl Into<i64>) {
        self.options.insert(name, OptionValue::Int(value.into()));
    }

    fn set_optional(&mut self, name: &'static str, value: Option<u32>) {
        if let Some(value) = value {
            self.set(name, value);
        }
    }

    fn insert(&mut self, name: &'static str, value: OptionValue) {
        self.options.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<OptionValue> {
        self.options.get(name).copied()
    }

    /// Integer option, if present and integral.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            OptionValue::Int(value) => Some(value),
            OptionValue::Float(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, OptionValue)> + '_ {
        self.options.iter().map(|(name, value)| (*name, *value))
    }
}
