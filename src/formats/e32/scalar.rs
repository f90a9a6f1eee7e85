//! Fixed-field decoding driven by the layout table

use tracing::trace;

use crate::formats::e32::header::FixedHeader;
use crate::formats::e32::layout::{self, FieldKind, FieldSpec};
use crate::formats::e32::types::*;
use crate::formats::e32::utils::ByteSource;

/// Decode one fixed-width field from its layout entry
pub fn decode_field(src: &ByteSource<'_>, spec: &FieldSpec) -> Result<FieldValue> {
    let offset = spec.offset;
    let Some(width) = spec.width.fixed() else {
        // Sized by a previously decoded count; see `bitmap`.
        return Err(DecodeError::VariableWidth { field: spec.name });
    };
    let value = match spec.kind {
        FieldKind::Word32 => FieldValue::Word(src.read_le(offset, width)? as u32),
        FieldKind::Word16 => FieldValue::Half(src.read_le(offset, width)? as u16),
        FieldKind::Byte => FieldValue::Byte(src.read_le(offset, width)? as u8),
        FieldKind::Bitmask32 => FieldValue::Flags(src.read_le(offset, width)? as u32),
        FieldKind::SplitVersion16_16 => {
            FieldValue::Version(ModuleVersion::from_word(src.read_le(offset, width)? as u32))
        }
        FieldKind::SplitTime64 => {
            let lo = src.read_le(offset, 4)?;
            let hi = src.read_le(offset + 4, 4)?;
            FieldValue::Time((hi << 32) | lo)
        }
        FieldKind::Opaque => {
            let mut out = [0u8; 4];
            out.copy_from_slice(src.read(offset, width)?);
            FieldValue::Opaque(out)
        }
        FieldKind::VarBitmap => return Err(DecodeError::VariableWidth { field: spec.name }),
    };
    trace!(field = spec.name, offset, %value, "decoded field");
    Ok(value)
}

/// Decode every fixed field into its named value, in offset order
pub fn decode_fields(data: &[u8]) -> Result<Vec<(&'static str, FieldValue)>> {
    let src = ByteSource::new(data);
    layout::fixed_fields()
        .map(|spec| decode_field(&src, spec).map(|value| (spec.name, value)))
        .collect()
}

/// Fixed phase: every field up to and including the export description type.
///
/// Fails with `OutOfRange` before reading anything if the buffer is shorter
/// than [`MIN_HEADER_SIZE`]. The error names the first field that does not
/// fit, or the bitmap area when every fixed field fits but the minimum is
/// still not met.
pub fn decode_fixed(src: &ByteSource<'_>) -> Result<FixedHeader> {
    if src.len() < MIN_HEADER_SIZE {
        return Err(short_header(src.len()));
    }

    let mut fixed = FixedHeader::default();
    for spec in layout::fixed_fields() {
        fixed.set_value(spec.id, &decode_field(src, spec)?);
    }
    Ok(fixed)
}

fn short_header(len: usize) -> DecodeError {
    let (offset, width) = layout::fixed_fields()
        .find(|spec| spec.end().is_some_and(|end| end > len))
        .map(|spec| (spec.offset, spec.width.fixed().unwrap_or(0)))
        .unwrap_or((layout::EXPORT_DESC.offset, MIN_HEADER_SIZE - layout::EXPORT_DESC.offset));
    DecodeError::OutOfRange { offset, width, len }
}
