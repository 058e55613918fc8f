//! Sensor stream ports exposed by the headset

use serde::{Deserialize, Serialize};

/// Logical sensor data channel on the headset.
///
/// Each variant maps to the TCP port the streaming service listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum StreamPort {
    RmVlcLeftFront,
    RmVlcLeftLeft,
    RmVlcRightFront,
    RmVlcRightRight,
    RmDepthAhat,
    RmDepthLongthrow,
    RmImuAccelerometer,
    RmImuGyroscope,
    RmImuMagnetometer,
    PersonalVideo,
    Microphone,
    SpatialInput,
    ExtendedEyeTracking,
    ExtendedAudio,
    ExtendedVideo,
    ExtendedDepth,
}

/// Decoder family selected by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    RmVlc,
    RmDepthAhat,
    RmDepthLongthrow,
    RmImu,
    PersonalVideo,
    Microphone,
    SpatialInput,
    ExtendedEyeTracking,
    ExtendedAudio,
    ExtendedDepth,
}

impl StreamPort {
    pub const ALL: [StreamPort; 16] = [
        StreamPort::RmVlcLeftFront,
        StreamPort::RmVlcLeftLeft,
        StreamPort::RmVlcRightFront,
        StreamPort::RmVlcRightRight,
        StreamPort::RmDepthAhat,
        StreamPort::RmDepthLongthrow,
        StreamPort::RmImuAccelerometer,
        StreamPort::RmImuGyroscope,
        StreamPort::RmImuMagnetometer,
        StreamPort::PersonalVideo,
        StreamPort::Microphone,
        StreamPort::SpatialInput,
        StreamPort::ExtendedEyeTracking,
        StreamPort::ExtendedAudio,
        StreamPort::ExtendedVideo,
        StreamPort::ExtendedDepth,
    ];

    /// TCP port number used by the streaming service.
    pub const fn number(self) -> u16 {
        match self {
            StreamPort::RmVlcLeftFront => 3800,
            StreamPort::RmVlcLeftLeft => 3801,
            StreamPort::RmVlcRightFront => 3802,
            StreamPort::RmVlcRightRight => 3803,
            StreamPort::RmDepthAhat => 3804,
            StreamPort::RmDepthLongthrow => 3805,
            StreamPort::RmImuAccelerometer => 3806,
            StreamPort::RmImuGyroscope => 3807,
            StreamPort::RmImuMagnetometer => 3808,
            StreamPort::PersonalVideo => 3810,
            StreamPort::Microphone => 3811,
            StreamPort::SpatialInput => 3812,
            StreamPort::ExtendedEyeTracking => 3817,
            StreamPort::ExtendedAudio => 3818,
            StreamPort::ExtendedVideo => 3819,
            StreamPort::ExtendedDepth => 3821,
        }
    }

    /// Look up a port by its TCP port number.
    pub fn from_number(number: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|port| port.number() == number)
    }

    /// Decoder family for packets on this port.
    ///
    /// Extended video shares the personal video layout.
    pub const fn kind(self) -> StreamKind {
        match self {
            StreamPort::RmVlcLeftFront
            | StreamPort::RmVlcLeftLeft
            | StreamPort::RmVlcRightFront
            | StreamPort::RmVlcRightRight => StreamKind::RmVlc,
            StreamPort::RmDepthAhat => StreamKind::RmDepthAhat,
            StreamPort::RmDepthLongthrow => StreamKind::RmDepthLongthrow,
            StreamPort::RmImuAccelerometer
            | StreamPort::RmImuGyroscope
            | StreamPort::RmImuMagnetometer => StreamKind::RmImu,
            StreamPort::PersonalVideo | StreamPort::ExtendedVideo => StreamKind::PersonalVideo,
            StreamPort::Microphone => StreamKind::Microphone,
            StreamPort::SpatialInput => StreamKind::SpatialInput,
            StreamPort::ExtendedEyeTracking => StreamKind::ExtendedEyeTracking,
            StreamPort::ExtendedAudio => StreamKind::ExtendedAudio,
            StreamPort::ExtendedDepth => StreamKind::ExtendedDepth,
        }
    }
}

impl std::fmt::Display for StreamPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({})", self, self.number())
    }
}
