//! Byte-level checks of every fixed field against the layout table.

use e32image::formats::e32::{decode, layout, FieldValue, FieldWidth, E32_HEADER_LAYOUT, MIN_HEADER_SIZE};

fn le(data: &[u8], offset: usize, width: usize) -> u64 {
    data[offset..offset + width]
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

#[test]
fn every_field_is_little_endian_at_its_offset() {
    // A handful of byte patterns; the export count and type are pinned so
    // the bitmap phase has nothing to read.
    for seed in [1u32, 0x55, 0xA7, 0xFF] {
        let mut data: Vec<u8> = (0..MIN_HEADER_SIZE as u32)
            .map(|i| (i.wrapping_mul(seed).wrapping_add(seed >> 1)) as u8)
            .collect();
        data[92..96].fill(0);
        data[154] = 0;

        let header = decode(&data).unwrap();
        for spec in layout::fixed_fields() {
            let FieldWidth::Fixed(width) = spec.width else {
                unreachable!()
            };
            let value = header.field(spec.name).unwrap();
            assert_eq!(
                value.as_u64(),
                Some(le(&data, spec.offset, width)),
                "{} at {}",
                spec.name,
                spec.offset
            );
        }
    }
}

#[test]
fn layout_covers_the_minimum_header() {
    let last_fixed = layout::fixed_fields().last().unwrap();
    assert_eq!(last_fixed.end(), Some(layout::EXPORT_DESC.offset));
    assert!(layout::EXPORT_DESC.offset < MIN_HEADER_SIZE);
    assert_eq!(E32_HEADER_LAYOUT.last().unwrap().width, FieldWidth::Variable);
}

#[test]
fn time_is_split_low_then_high() {
    let mut data = vec![0u8; MIN_HEADER_SIZE];
    data[36..40].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
    data[40..44].copy_from_slice(&0x00E0_0000u32.to_le_bytes());
    let header = decode(&data).unwrap();
    assert_eq!(header.field("time"), Some(FieldValue::Time(0x00E0_0000_DEAD_BEEF)));
    assert_eq!(header.field("iTimeLo"), header.field("time"));
}
