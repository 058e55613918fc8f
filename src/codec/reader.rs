//! Checked little-endian field reads at fixed payload offsets

use crate::types::Element;
use crate::{Result, StreamError};

/// Reads scalar metadata that trails a raster inside a payload.
///
/// The whole trailer is bounds-checked on construction, so a short payload
/// fails with `OutOfBounds` before any field is read.
pub(crate) struct TrailerReader<'a> {
    data: &'a [u8],
    base: usize,
    context: &'static str,
}

impl<'a> TrailerReader<'a> {
    pub(crate) fn new(
        data: &'a [u8],
        base: usize,
        trailer_len: usize,
        context: &'static str,
    ) -> Result<Self> {
        let required = base
            .checked_add(trailer_len)
            .ok_or(StreamError::out_of_bounds(context, usize::MAX, data.len()))?;
        if required > data.len() {
            return Err(StreamError::out_of_bounds(context, required, data.len()));
        }
        Ok(Self { data, base, context })
    }

    /// Scalar at `base + offset`.
    pub(crate) fn read<T: Element>(&self, offset: usize) -> Result<T> {
        let start = self.base + offset;
        let bytes = self
            .data
            .get(start..start + T::SIZE)
            .ok_or(StreamError::out_of_bounds(self.context, start + T::SIZE, self.data.len()))?;
        Ok(T::read_le(bytes))
    }

    /// `N` consecutive scalars starting at `base + offset`.
    pub(crate) fn read_array<T: Element + Default, const N: usize>(
        &self,
        offset: usize,
    ) -> Result<[T; N]> {
        let mut out = [T::default(); N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.read(offset + i * T::SIZE)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fields_relative_to_base() {
        let mut data = vec![0xAA; 3];
        data.extend_from_slice(&7u64.to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&2.5f32.to_le_bytes());

        let reader = TrailerReader::new(&data, 3, 16, "test").unwrap();
        assert_eq!(reader.read::<u64>(0).unwrap(), 7);
        assert_eq!(reader.read_array::<f32, 2>(8).unwrap(), [1.5, 2.5]);
    }

    #[test]
    fn short_trailer_fails_up_front() {
        let data = vec![0u8; 10];
        let err = TrailerReader::new(&data, 4, 8, "test").err().unwrap();
        assert!(matches!(
            err,
            StreamError::OutOfBounds { required: 12, available: 10, .. }
        ));
    }
}
