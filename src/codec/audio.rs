//! Microphone and extended audio layouts
//!
//! Samples are planar: the payload holds all samples of channel 0, then all
//! samples of channel 1.

use std::sync::Arc;

use crate::types::{AacLevel, AudioFrame, AudioProfile, AudioSamples, Element, Raster};
use crate::{Result, StreamError};

/// Decode a microphone payload.
///
/// - AAC profiles deliver decoded 2-channel `f32`
/// - raw at [`AacLevel::L5`] delivers 1-channel `f32` (array capture)
/// - raw otherwise delivers 1-channel `i16`
pub fn unpack_microphone(
    payload: &Arc<[u8]>,
    profile: AudioProfile,
    level: AacLevel,
) -> Result<AudioFrame> {
    let samples = match (profile.is_raw(), level) {
        (false, _) => AudioSamples::F32(planar(payload, 2, "microphone")?),
        (true, AacLevel::L5) => AudioSamples::F32(planar(payload, 1, "microphone")?),
        (true, _) => AudioSamples::I16(planar(payload, 1, "microphone")?),
    };
    Ok(AudioFrame { samples })
}

/// Decode an extended audio payload: AAC → 2-channel `f32`, raw → 1-channel `i16`.
pub fn unpack_extended_audio(payload: &Arc<[u8]>, profile: AudioProfile) -> Result<AudioFrame> {
    let samples = if profile.is_raw() {
        AudioSamples::I16(planar(payload, 1, "extended_audio")?)
    } else {
        AudioSamples::F32(planar(payload, 2, "extended_audio")?)
    };
    Ok(AudioFrame { samples })
}

fn planar<T: Element>(
    payload: &Arc<[u8]>,
    channels: usize,
    context: &'static str,
) -> Result<Raster<T>> {
    let frame_bytes = channels * T::SIZE;
    let remainder = payload.len() % frame_bytes;
    if remainder != 0 {
        return Err(StreamError::out_of_bounds(
            context,
            payload.len() + (frame_bytes - remainder),
            payload.len(),
        ));
    }
    Raster::view(payload, 0, [channels, payload.len() / frame_bytes, 1], context)
}
