//! Export description decoding.
//!
//! The bitmap that follows the fixed header has no static size: its length
//! is `ceil(export_dir_count / 8)` bytes, so this phase can only run once
//! the fixed phase has produced the export count and the description
//! type/size sub-fields. Each bit describes one export ordinal slot, least
//! significant bit first within a byte; a set bit marks a hole.

use serde::Serialize;
use tracing::{debug, warn};

use crate::formats::e32::header::FixedHeader;
use crate::formats::e32::layout::EXPORT_DESC;
use crate::formats::e32::types::*;
use crate::formats::e32::utils::ByteSource;

/// Encoding named by `iExportDescType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportDescType {
    /// All exports present; nothing follows the type byte.
    NoHoles,
    /// One bit per ordinal.
    FullBitmap,
    /// Meta-bitmap of 8-ordinal groups followed by the groups that have holes.
    SparseBitmap8,
}

impl ExportDescType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            EXPORT_DESC_NO_HOLES => Some(Self::NoHoles),
            EXPORT_DESC_FULL_BITMAP => Some(Self::FullBitmap),
            EXPORT_DESC_SPARSE_BITMAP8 => Some(Self::SparseBitmap8),
            _ => None,
        }
    }
}

/// Bytes needed for one bit per ordinal
#[inline]
pub fn bitmap_len(export_count: u32) -> usize {
    (export_count as usize).div_ceil(8)
}

/// Dependent phase: decode the hole bitmap sized by the fixed-phase export count.
///
/// Unsupported encodings and size mismatches are pushed onto `diagnostics`;
/// only reads past the end of the buffer are fatal.
pub fn decode_export_bitmap(
    src: &ByteSource<'_>,
    fixed: &FixedHeader,
    diagnostics: &mut Vec<DecodeDiagnostic>,
) -> Result<Vec<bool>> {
    let count = fixed.export_dir_count;

    let Some(desc_type) = ExportDescType::from_u8(fixed.export_desc_type) else {
        let diag = DecodeDiagnostic::UnsupportedBitmapEncoding {
            encoding: fixed.export_desc_type,
        };
        warn!(%diag, "export bitmap left empty");
        diagnostics.push(diag);
        return Ok(Vec::new());
    };

    check_export_count(src, count)?;
    debug!(?desc_type, count, declared = fixed.export_desc_size, "decoding export description");

    match desc_type {
        ExportDescType::NoHoles => Ok(vec![false; count as usize]),
        ExportDescType::FullBitmap => {
            let expected = bitmap_len(count);
            let bytes = src.read(EXPORT_DESC.offset, expected)?;
            check_declared_size(fixed.export_desc_size, expected, diagnostics);
            Ok(expand(bytes.iter().copied(), count))
        }
        ExportDescType::SparseBitmap8 => {
            decode_sparse(src, count, fixed.export_desc_size, diagnostics)
        }
    }
}

/// A count whose bitmap could not fit in the rest of the buffer is rejected
/// before any allocation sized by it.
fn check_export_count(src: &ByteSource<'_>, count: u32) -> Result<()> {
    let available = src.remaining_from(EXPORT_DESC.offset);
    if (count as u64) > (available as u64) * 8 {
        warn!(count, available, "export count inconsistent with image size");
        return Err(DecodeError::OutOfRange {
            offset: EXPORT_DESC.offset,
            width: bitmap_len(count),
            len: src.len(),
        });
    }
    Ok(())
}

fn decode_sparse(
    src: &ByteSource<'_>,
    count: u32,
    declared: u16,
    diagnostics: &mut Vec<DecodeDiagnostic>,
) -> Result<Vec<bool>> {
    let groups = bitmap_len(count);
    let meta_len = groups.div_ceil(8);
    let meta = src.read(EXPORT_DESC.offset, meta_len)?;

    let mut next = EXPORT_DESC.offset + meta_len;
    let mut bytes = Vec::with_capacity(groups);
    for group in 0..groups {
        if meta[group >> 3] & (1 << (group & 7)) != 0 {
            bytes.push(src.read_u8(next)?);
            next += 1;
        } else {
            // Groups left out of the meta-bitmap have no holes.
            bytes.push(0);
        }
    }

    check_declared_size(declared, next - EXPORT_DESC.offset, diagnostics);
    Ok(expand(bytes, count))
}

fn check_declared_size(declared: u16, expected: usize, diagnostics: &mut Vec<DecodeDiagnostic>) {
    if usize::from(declared) != expected {
        let diag = DecodeDiagnostic::ExportDescSizeMismatch { declared, expected };
        warn!(%diag, "export description size mismatch");
        diagnostics.push(diag);
    }
}

/// LSB-first expansion, dropping padding bits past `count`
fn expand(bytes: impl IntoIterator<Item = u8>, count: u32) -> Vec<bool> {
    bytes
        .into_iter()
        .flat_map(|b| (0..8).map(move |bit| b & (1 << bit) != 0))
        .take(count as usize)
        .collect()
}
