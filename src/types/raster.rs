//! Zero-copy shaped views over packet payloads

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::{Result, StreamError};

/// Scalar types that can be read from little-endian payload bytes.
pub trait Element: Copy + Sized {
    /// Size of one element in bytes.
    const SIZE: usize;

    /// Read one element from exactly `Self::SIZE` bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($($ty:ty),*) => {
        $(
            impl Element for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_element!(u8, u16, i16, u32, u64, f32);

/// A `rows × cols × channels` view into a shared payload buffer.
///
/// The view keeps the payload alive through an `Arc`, so it stays valid
/// after the packet that produced it is released. Elements are decoded on
/// access; nothing is copied until [`Raster::to_vec`].
#[derive(Clone)]
pub struct Raster<T> {
    data: Arc<[u8]>,
    offset: usize,
    shape: [usize; 3],
    _element: PhantomData<T>,
}

impl<T: Element> Raster<T> {
    /// Create a view, checking that the shape fits inside `data`.
    pub fn view(
        data: &Arc<[u8]>,
        offset: usize,
        shape: [usize; 3],
        context: &'static str,
    ) -> Result<Self> {
        let required = shape
            .iter()
            .try_fold(T::SIZE, |acc, dim| acc.checked_mul(*dim))
            .and_then(|bytes| bytes.checked_add(offset))
            .ok_or(StreamError::out_of_bounds(context, usize::MAX, data.len()))?;

        if required > data.len() {
            return Err(StreamError::out_of_bounds(context, required, data.len()));
        }

        Ok(Self { data: Arc::clone(data), offset, shape, _element: PhantomData })
    }

    /// `(rows, cols, channels)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.shape[0], self.shape[1], self.shape[2])
    }

    pub fn rows(&self) -> usize {
        self.shape[0]
    }

    pub fn cols(&self) -> usize {
        self.shape[1]
    }

    pub fn channels(&self) -> usize {
        self.shape[2]
    }

    /// Number of elements in the view.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw little-endian bytes covered by the view.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[self.offset..self.offset + self.len() * T::SIZE]
    }

    /// Element at `(row, col, channel)`, or `None` outside the shape.
    pub fn get(&self, row: usize, col: usize, channel: usize) -> Option<T> {
        let [rows, cols, channels] = self.shape;
        if row >= rows || col >= cols || channel >= channels {
            return None;
        }
        let index = (row * cols + col) * channels + channel;
        let start = self.offset + index * T::SIZE;
        Some(T::read_le(&self.data[start..start + T::SIZE]))
    }

    /// Elements in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.as_bytes().chunks_exact(T::SIZE).map(T::read_le)
    }

    /// Copy the elements out of the payload.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<T> fmt::Debug for Raster<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("element", &std::any::type_name::<T>())
            .field("shape", &self.shape)
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(bytes: Vec<u8>) -> Arc<[u8]> {
        bytes.into()
    }

    #[test]
    fn view_reads_little_endian_elements() {
        let data = payload([1u16, 2, 3, 4, 5, 6].iter().flat_map(|v| v.to_le_bytes()).collect());
        let raster = Raster::<u16>::view(&data, 0, [2, 3, 1], "test").unwrap();

        assert_eq!(raster.shape(), (2, 3, 1));
        assert_eq!(raster.get(0, 0, 0), Some(1));
        assert_eq!(raster.get(1, 2, 0), Some(6));
        assert_eq!(raster.get(2, 0, 0), None);
        assert_eq!(raster.to_vec(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn view_honours_offset_and_channels() {
        let data = payload(vec![9, 9, 10, 11, 12, 13, 14, 15]);
        let raster = Raster::<u8>::view(&data, 2, [1, 2, 3], "test").unwrap();

        assert_eq!(raster.get(0, 1, 0), Some(13));
        assert_eq!(raster.get(0, 1, 2), Some(15));
        assert_eq!(raster.as_bytes(), &[10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn view_rejects_short_buffers() {
        let data = payload(vec![0; 11]);
        let err = Raster::<u32>::view(&data, 0, [1, 3, 1], "test").unwrap_err();

        match err {
            StreamError::OutOfBounds { required, available, .. } => {
                assert_eq!(required, 12);
                assert_eq!(available, 11);
            }
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
    }

    #[test]
    fn view_rejects_overflowing_shapes() {
        let data = payload(vec![0; 4]);
        let result = Raster::<u64>::view(&data, 0, [usize::MAX, 2, 1], "test");
        assert!(matches!(result, Err(StreamError::OutOfBounds { .. })));
    }

    #[test]
    fn view_outlives_source_handle() {
        let data = payload(vec![7; 4]);
        let raster = Raster::<u8>::view(&data, 0, [2, 2, 1], "test").unwrap();
        drop(data);
        assert_eq!(raster.to_vec(), vec![7; 4]);
    }
}
