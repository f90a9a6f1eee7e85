//! Bounds-checked byte access for E32 decoding

use crate::formats::e32::types::{DecodeError, Result};

/// Extension trait for bounds-checked access to byte slices
pub trait ReadExt {
    fn read_u8_at(&self, offset: usize) -> Option<u8>;
    fn read_slice_at(&self, offset: usize, len: usize) -> Option<&[u8]>;

    /// Little-endian unsigned integer of 1 to 8 bytes
    fn read_le_at(&self, offset: usize, width: usize) -> Option<u64> {
        debug_assert!((1..=8).contains(&width), "unsupported width {width}");
        let bytes = self.read_slice_at(offset, width)?;
        Some(
            bytes
                .iter()
                .rev()
                .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
        )
    }
}

impl ReadExt for [u8] {
    #[inline(always)]
    fn read_u8_at(&self, offset: usize) -> Option<u8> {
        self.get(offset).copied()
    }

    #[inline(always)]
    fn read_slice_at(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.get(offset..offset.checked_add(len)?)
    }
}

/// Immutable view over a raw image with `OutOfRange` reporting.
///
/// A failed read always reports the offset and width that were requested.
#[derive(Debug, Clone, Copy)]
pub struct ByteSource<'data> {
    data: &'data [u8],
}

impl<'data> ByteSource<'data> {
    pub fn new(data: &'data [u8]) -> Self {
        Self { data }
    }

    /// Total length of the underlying buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes available from `offset` to the end of the buffer
    pub fn remaining_from(&self, offset: usize) -> usize {
        self.data.len().saturating_sub(offset)
    }

    /// Read `width` raw bytes at `offset`
    pub fn read(&self, offset: usize, width: usize) -> Result<&'data [u8]> {
        self.data
            .read_slice_at(offset, width)
            .ok_or_else(|| self.out_of_range(offset, width))
    }

    /// Read a little-endian unsigned integer of 1 to 8 bytes at `offset`
    pub fn read_le(&self, offset: usize, width: usize) -> Result<u64> {
        self.data
            .read_le_at(offset, width)
            .ok_or_else(|| self.out_of_range(offset, width))
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        self.data
            .read_u8_at(offset)
            .ok_or_else(|| self.out_of_range(offset, 1))
    }

    fn out_of_range(&self, offset: usize, width: usize) -> DecodeError {
        DecodeError::OutOfRange {
            offset,
            width,
            len: self.data.len(),
        }
    }
}
