//! Personal video and extended depth layouts
//!
//! Frame dimensions for these streams depend on the capture configuration,
//! so callers pass them in after querying the backend once.

use std::sync::Arc;

use super::reader::TrailerReader;
use crate::Result;
use crate::types::{ExtendedDepthFrame, PvFrame, Raster};

/// Camera metadata appended after every personal video image.
pub const PV_METADATA_SIZE: usize = 80;

/// Resolution pair appended after every extended depth raster.
pub const EXTENDED_DEPTH_TRAILER_SIZE: usize = 4;

/// Decode a personal video payload of `height × width × bpp` pixels.
///
/// Metadata offsets after the image (`b = width * height * bpp`):
///
/// | offset  | field                 | type     |
/// |---------|-----------------------|----------|
/// | b + 0   | focal_length          | 2 × f32  |
/// | b + 8   | principal_point       | 2 × f32  |
/// | b + 16  | exposure_time         | u64      |
/// | b + 24  | exposure_compensation | 2 × u64  |
/// | b + 40  | lens_position         | u32      |
/// | b + 44  | focus_state           | u32      |
/// | b + 48  | iso_speed             | u32      |
/// | b + 52  | white_balance         | u32      |
/// | b + 56  | iso_gains             | 2 × f32  |
/// | b + 64  | white_balance_gains   | 3 × f32  |
/// | b + 76  | resolution            | 2 × u16  |
pub fn unpack_pv(payload: &Arc<[u8]>, width: usize, height: usize, bpp: usize) -> Result<PvFrame> {
    let image_bytes = width.saturating_mul(height).saturating_mul(bpp);
    let meta = TrailerReader::new(payload, image_bytes, PV_METADATA_SIZE, "pv")?;

    Ok(PvFrame {
        image: Raster::view(payload, 0, [height, width, bpp], "pv image")?,
        focal_length: meta.read_array(0)?,
        principal_point: meta.read_array(8)?,
        exposure_time: meta.read(16)?,
        exposure_compensation: meta.read_array(24)?,
        lens_position: meta.read(40)?,
        focus_state: meta.read(44)?,
        iso_speed: meta.read(48)?,
        white_balance: meta.read(52)?,
        iso_gains: meta.read_array(56)?,
        white_balance_gains: meta.read_array(64)?,
        resolution: meta.read_array(76)?,
    })
}

/// Decode an extended depth payload: `[depth: width * height * 2][resolution: 2 × u16]`.
pub fn unpack_extended_depth(
    payload: &Arc<[u8]>,
    width: usize,
    height: usize,
) -> Result<ExtendedDepthFrame> {
    let depth_bytes = width.saturating_mul(height).saturating_mul(2);
    let trailer =
        TrailerReader::new(payload, depth_bytes, EXTENDED_DEPTH_TRAILER_SIZE, "extended_depth")?;
    let [res_width, res_height]: [u16; 2] = trailer.read_array(0)?;

    Ok(ExtendedDepthFrame {
        depth: Raster::view(payload, 0, [height, width, 1], "extended_depth")?,
        width: res_width,
        height: res_height,
    })
}
