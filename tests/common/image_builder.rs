//! Builder for synthetic E32 headers.
//!
//! Writes fields at their documented offsets so tests never depend on a
//! real toolchain producing images.

use e32image::formats::e32::{layout, EXPORT_DESC_FULL_BITMAP, EXPORT_DESC_NO_HOLES, MIN_HEADER_SIZE};

#[derive(Debug, Clone)]
pub struct ImageBuilder {
    data: Vec<u8>,
    export_desc: Vec<u8>,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self {
            data: vec![0u8; layout::EXPORT_DESC.offset],
            export_desc: Vec::new(),
        }
    }

    fn put(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn word(self, spec: &layout::FieldSpec, value: u32) -> Self {
        self.put(spec.offset, &value.to_le_bytes())
    }

    pub fn uids(self, uid1: u32, uid2: u32, uid3: u32) -> Self {
        self.word(&layout::UID1, uid1)
            .word(&layout::UID2, uid2)
            .word(&layout::UID3, uid3)
    }

    pub fn signature(self, sig: &[u8; 4]) -> Self {
        self.put(layout::SIGNATURE.offset, sig)
    }

    pub fn flags(self, flags: u32) -> Self {
        self.word(&layout::FLAGS, flags)
    }

    pub fn time(self, micros: u64) -> Self {
        self.put(layout::TIME.offset, &micros.to_le_bytes())
    }

    /// No-holes description for `count` exports
    pub fn exports(self, count: u32) -> Self {
        self.word(&layout::EXPORT_DIR_COUNT, count)
            .export_desc(EXPORT_DESC_NO_HOLES, 0, &[])
    }

    /// Full bitmap with the given 0-based slots marked as holes
    pub fn exports_with_holes(self, count: u32, holes: &[usize]) -> Self {
        let mut bitmap = vec![0u8; (count as usize).div_ceil(8)];
        for &slot in holes {
            bitmap[slot / 8] |= 1 << (slot % 8);
        }
        let size = bitmap.len() as u16;
        self.word(&layout::EXPORT_DIR_COUNT, count)
            .export_desc(EXPORT_DESC_FULL_BITMAP, size, &bitmap)
    }

    pub fn export_desc(mut self, desc_type: u8, declared_size: u16, bytes: &[u8]) -> Self {
        self = self.put(layout::EXPORT_DESC_SIZE.offset, &declared_size.to_le_bytes());
        self.data[layout::EXPORT_DESC_TYPE.offset] = desc_type;
        self.export_desc = bytes.to_vec();
        self
    }

    /// Header bytes, padded to at least the minimum header size
    pub fn build(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        out.extend_from_slice(&self.export_desc);
        if out.len() < MIN_HEADER_SIZE {
            out.resize(MIN_HEADER_SIZE, 0);
        }
        out
    }
}
