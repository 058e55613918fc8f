//! Research mode camera layouts (visible light and depth)

use std::sync::Arc;

use super::reader::TrailerReader;
use crate::Result;
use crate::types::{
    RM_DEPTH_AHAT, RM_DEPTH_LONGTHROW, RM_VLC, Raster, RmDepthFrame, RmVlcFrame, SensorGeometry,
};

/// Bytes following the VLC image: sensor ticks, exposure, gain.
pub const RM_VLC_TRAILER_SIZE: usize = 20;

/// Bytes following the two depth rasters: sensor ticks.
pub const RM_DEPTH_TRAILER_SIZE: usize = 8;

/// Decode a visible light camera payload.
///
/// Layout: `[image: PIXELS][sensor_ticks: u64][exposure: u64][gain: u32]`
pub fn unpack_rm_vlc(payload: &Arc<[u8]>) -> Result<RmVlcFrame> {
    let pixels = RM_VLC.pixels();
    let trailer = TrailerReader::new(payload, pixels, RM_VLC_TRAILER_SIZE, "rm_vlc")?;
    let image = Raster::view(payload, 0, [RM_VLC.height, RM_VLC.width, 1], "rm_vlc image")?;

    Ok(RmVlcFrame {
        image,
        sensor_ticks: trailer.read(0)?,
        exposure: trailer.read(8)?,
        gain: trailer.read(16)?,
    })
}

/// Decode an AHAT depth payload.
pub fn unpack_rm_depth_ahat(payload: &Arc<[u8]>) -> Result<RmDepthFrame> {
    unpack_rm_depth(payload, RM_DEPTH_AHAT, "rm_depth_ahat")
}

/// Decode a Long Throw depth payload.
pub fn unpack_rm_depth_longthrow(payload: &Arc<[u8]>) -> Result<RmDepthFrame> {
    unpack_rm_depth(payload, RM_DEPTH_LONGTHROW, "rm_depth_longthrow")
}

// [depth: PIXELS * 2][ab: PIXELS * 2][sensor_ticks: u64]
fn unpack_rm_depth(
    payload: &Arc<[u8]>,
    geometry: SensorGeometry,
    context: &'static str,
) -> Result<RmDepthFrame> {
    let raster_bytes = geometry.pixels() * 2;
    let trailer = TrailerReader::new(payload, raster_bytes * 2, RM_DEPTH_TRAILER_SIZE, context)?;
    let shape = [geometry.height, geometry.width, 1];

    Ok(RmDepthFrame {
        depth: Raster::view(payload, 0, shape, context)?,
        ab: Raster::view(payload, raster_bytes, shape, context)?,
        sensor_ticks: trailer.read(0)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StreamError;

    fn vlc_payload(len: usize) -> Arc<[u8]> {
        let pixels = RM_VLC.pixels();
        let mut data = vec![0u8; len];
        for (i, byte) in data.iter_mut().take(pixels).enumerate() {
            *byte = (i % 251) as u8;
        }
        if len >= pixels + RM_VLC_TRAILER_SIZE {
            data[pixels..pixels + 8].copy_from_slice(&123_456_789u64.to_le_bytes());
            data[pixels + 8..pixels + 16].copy_from_slice(&4_000u64.to_le_bytes());
            data[pixels + 16..pixels + 20].copy_from_slice(&77u32.to_le_bytes());
        }
        data.into()
    }

    #[test]
    fn rm_vlc_exact_size_decodes() {
        let payload = vlc_payload(RM_VLC.pixels() + RM_VLC_TRAILER_SIZE);
        let frame = unpack_rm_vlc(&payload).unwrap();

        assert_eq!(frame.image.shape(), (480, 640, 1));
        assert_eq!(frame.image.get(0, 1, 0), Some(1));
        assert_eq!(frame.image.get(1, 0, 0), Some((640 % 251) as u8));
        assert_eq!(frame.sensor_ticks, 123_456_789);
        assert_eq!(frame.exposure, 4_000);
        assert_eq!(frame.gain, 77);
    }

    #[test]
    fn rm_vlc_one_byte_short_is_out_of_bounds() {
        let payload = vlc_payload(RM_VLC.pixels() + RM_VLC_TRAILER_SIZE - 1);
        let err = unpack_rm_vlc(&payload).unwrap_err();

        match err {
            StreamError::OutOfBounds { required, available, .. } => {
                assert_eq!(required, RM_VLC.pixels() + RM_VLC_TRAILER_SIZE);
                assert_eq!(available, required - 1);
            }
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
    }

    #[test]
    fn depth_rasters_use_word_offsets() {
        let pixels = RM_DEPTH_LONGTHROW.pixels();
        let mut data = Vec::with_capacity(pixels * 4 + 8);
        data.extend((0..pixels).flat_map(|i| (i as u16).to_le_bytes()));
        data.extend((0..pixels).flat_map(|i| (i as u16 ^ 0xFFFF).to_le_bytes()));
        data.extend_from_slice(&42u64.to_le_bytes());
        let payload: Arc<[u8]> = data.into();

        let frame = unpack_rm_depth_longthrow(&payload).unwrap();
        assert_eq!(frame.depth.shape(), (288, 320, 1));
        assert_eq!(frame.ab.shape(), (288, 320, 1));
        assert_eq!(frame.depth.get(0, 5, 0), Some(5));
        assert_eq!(frame.ab.get(0, 5, 0), Some(5 ^ 0xFFFF));
        assert_eq!(frame.sensor_ticks, 42);
    }

    #[test]
    fn ahat_without_ticks_is_out_of_bounds() {
        let payload: Arc<[u8]> = vec![0u8; RM_DEPTH_AHAT.pixels() * 4].into();
        assert!(matches!(
            unpack_rm_depth_ahat(&payload),
            Err(StreamError::OutOfBounds { .. })
        ));
    }
}
