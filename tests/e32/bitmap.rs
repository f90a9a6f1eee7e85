use e32image::formats::e32::{
    decode, DecodeDiagnostic, DecodeError, EXPORT_DESC_SPARSE_BITMAP8, MIN_HEADER_SIZE,
};

use crate::common::ImageBuilder;

#[test]
fn bitmap_length_follows_export_count() {
    for count in [1u32, 7, 8, 9, 64, 100] {
        let data = ImageBuilder::new().exports_with_holes(count, &[]).build();
        let header = decode(&data).unwrap();
        assert_eq!(header.export_bitmap.len(), count as usize);
        assert!(header.diagnostics.is_empty(), "count {count}");
    }
}

#[test]
fn holes_are_reported_by_ordinal() {
    let data = ImageBuilder::new().exports_with_holes(17, &[0, 8, 16]).build();
    let header = decode(&data).unwrap();
    assert_eq!(header.missing_ordinals().collect::<Vec<_>>(), vec![1, 9, 17]);
}

#[test]
fn sparse_encoding_expands_to_full_length() {
    // 16 ordinals: group 0 absent, group 1 has a hole in its top slot.
    let data = ImageBuilder::new()
        .word(&e32image::formats::e32::layout::EXPORT_DIR_COUNT, 16)
        .export_desc(EXPORT_DESC_SPARSE_BITMAP8, 2, &[0b10, 0x80])
        .build();
    let header = decode(&data).unwrap();
    assert_eq!(header.export_bitmap.len(), 16);
    assert_eq!(header.missing_ordinals().collect::<Vec<_>>(), vec![16]);
}

#[test]
fn unknown_encoding_keeps_the_rest_of_the_header() {
    let data = ImageBuilder::new()
        .uids(7, 8, 9)
        .word(&e32image::formats::e32::layout::EXPORT_DIR_COUNT, 8)
        .export_desc(0x42, 1, &[0xFF])
        .build();
    let header = decode(&data).unwrap();
    assert_eq!(header.fixed.uid3, 9);
    assert!(header.export_bitmap.is_empty());
    assert_eq!(
        header.diagnostics,
        vec![DecodeDiagnostic::UnsupportedBitmapEncoding { encoding: 0x42 }]
    );
}

#[test]
fn export_count_larger_than_image_fails() {
    let mut data = ImageBuilder::new().exports_with_holes(200, &[]).build();
    data.truncate(MIN_HEADER_SIZE);
    assert!(matches!(
        decode(&data),
        Err(DecodeError::OutOfRange { offset: 155, len: 160, .. })
    ));
}
