use e32image::formats::e32::{
    header::UNIX_EPOCH_MICROS, layout, uid, BuildGeneration, Compression, DecodeDiagnostic,
    DecodeError, DecodeOptions, E32Decoder, FieldValue, DYNAMIC_LIBRARY_UID, E32_HEADER_LAYOUT,
    MIN_HEADER_SIZE,
};
use e32image::decode;

use crate::common::ImageBuilder;

#[test]
fn all_zero_header_decodes_to_defaults() {
    let header = decode(&[0u8; MIN_HEADER_SIZE]).unwrap();
    assert_eq!(header.fixed.uid1, 0);
    assert_eq!(header.fixed.flags, 0);
    assert_eq!(header.build_generation, BuildGeneration::Legacy);
    assert!(header.export_bitmap.is_empty());
    assert!(header.diagnostics.is_empty());
    assert_eq!(header.compression(), Compression::None);
}

#[test]
fn modern_flag_is_bit_3_only() {
    let header = decode(&ImageBuilder::new().flags(0x8).build()).unwrap();
    assert_eq!(header.fixed.flags, 8);
    assert_eq!(header.build_generation, BuildGeneration::Modern);

    let header = decode(&ImageBuilder::new().flags(0xFFFF_FFF7).build()).unwrap();
    assert_eq!(header.build_generation, BuildGeneration::Legacy);
}

#[test]
fn every_truncation_is_out_of_range() {
    let data = ImageBuilder::new().build();
    for len in [0, 1, 4, 43, 44, 100, 154, MIN_HEADER_SIZE - 1] {
        match decode(&data[..len]) {
            Err(DecodeError::OutOfRange { len: reported, .. }) => assert_eq!(reported, len),
            other => panic!("length {len}: expected OutOfRange, got {other:?}"),
        }
    }
}

#[test]
fn typical_dll_header() {
    let data = ImageBuilder::new()
        .uids(DYNAMIC_LIBRARY_UID, 0x1000_008D, 0x1020_3040)
        .signature(b"EPOC")
        .flags(0x0200_0029)
        .word(&layout::MODULE_VERSION, 0x000A_0000)
        .word(&layout::PRIORITY_CPU, 0x2000_015E)
        .word(&layout::COMPRESSION_TYPE, 0x101F_7AFC)
        .time(UNIX_EPOCH_MICROS as u64 + 1_200_000_000_000_000)
        .exports(5)
        .build();

    let header = decode(&data).unwrap();
    assert!(header.has_epoc_signature());
    assert!(header.is_dll());
    assert_eq!(header.build_generation, BuildGeneration::Modern);
    assert_eq!(header.module_version().to_string(), "10.0");
    assert_eq!(header.compression(), Compression::Deflate);
    assert!(header.cpu().is_arm());
    assert_eq!(header.creation_time().unwrap().timestamp(), 1_200_000_000);
    assert_eq!(header.export_bitmap, vec![false; 5]);
    assert_eq!(header.missing_ordinals().count(), 0);
}

#[test]
fn field_lookup_by_name_and_alias() {
    let data = ImageBuilder::new().uids(1, 2, 3).flags(0x18).build();
    let header = decode(&data).unwrap();

    assert_eq!(header.field("uid2"), Some(FieldValue::Word(2)));
    assert_eq!(header.field("iUid3"), Some(FieldValue::Word(3)));
    assert_eq!(header.field("iFlags"), Some(FieldValue::Flags(0x18)));
    assert_eq!(header.field("export_desc"), Some(FieldValue::Bitmap(vec![])));
    assert_eq!(header.field("iUid4"), None);

    let names: Vec<&str> = header.fields().iter().map(|(n, _)| *n).collect();
    assert_eq!(names.first(), Some(&"uid1"));
    assert_eq!(names.last(), Some(&"export_desc"));

    for spec in E32_HEADER_LAYOUT.iter() {
        for alias in spec.aliases {
            assert_eq!(header.field(alias), header.field(spec.name), "alias {alias}");
        }
    }
}

#[test]
fn split_words_answer_to_both_halves() {
    let data = ImageBuilder::new()
        .time(7u64 << 32)
        .word(&layout::PRIORITY_CPU, 0x2000_015E)
        .word(&layout::SECURE_ID, 0x1020_3040)
        .word(&layout::CAPABILITIES_LO, 0x0000_00FF)
        .build();
    let header = decode(&data).unwrap();

    let time = Some(FieldValue::Time(7u64 << 32));
    assert_eq!(header.field("iTimeLo"), time);
    assert_eq!(header.field("iTimeHi"), time);

    let priority_cpu = Some(FieldValue::Word(0x2000_015E));
    assert_eq!(header.field("iProcessPriority"), priority_cpu);
    assert_eq!(header.field("iCpuIdentifier"), priority_cpu);

    assert_eq!(
        header.field("iS.iSecureId"),
        Some(FieldValue::Opaque(0x1020_3040u32.to_le_bytes()))
    );
    assert_eq!(header.field("iS.iCaps[0]"), Some(FieldValue::Opaque([0xFF, 0, 0, 0])));
    assert_eq!(header.field("iS.iVendorId"), Some(FieldValue::Opaque([0; 4])));
    assert_eq!(header.field("iS.iCaps[1]"), Some(FieldValue::Opaque([0; 4])));
}

#[test]
fn reencoded_fixed_fields_match_input() {
    let mut data: Vec<u8> = (0..MIN_HEADER_SIZE as u32).map(|i| (i * 31 + 7) as u8).collect();
    // Keep the bitmap phase trivial: no exports, no-holes encoding.
    data[92..96].fill(0);
    data[154] = 0;

    let header = decode(&data).unwrap();
    let encoded = header.encode_fixed_fields();
    assert_eq!(&encoded[..layout::EXPORT_DESC.offset], &data[..layout::EXPORT_DESC.offset]);
}

#[test]
fn json_report_names_every_field() {
    let data = ImageBuilder::new()
        .uids(DYNAMIC_LIBRARY_UID, 0, 0)
        .exports_with_holes(4, &[2])
        .build();
    let header = decode(&data).unwrap();
    let json: serde_json::Value = serde_json::from_str(&header.to_json().unwrap()).unwrap();

    for spec in layout::fixed_fields() {
        let key = match spec.id {
            layout::FieldId::SecureId
            | layout::FieldId::VendorId
            | layout::FieldId::CapabilitiesLo
            | layout::FieldId::CapabilitiesHi => continue,
            _ => spec.name,
        };
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["uid1"], DYNAMIC_LIBRARY_UID);
    assert_eq!(json["export_bitmap"], serde_json::json!([false, false, true, false]));
    assert_eq!(json["diagnostics"], serde_json::json!([]));
}

#[test]
fn validation_options() {
    let data = ImageBuilder::new().uids(DYNAMIC_LIBRARY_UID, 0, 0).build();

    // Off by default.
    assert!(decode(&data).unwrap().diagnostics.is_empty());

    let options = DecodeOptions {
        validate_uid_checksum: true,
        validate_signature: true,
        strict: false,
    };
    let header = E32Decoder::with_options(options.clone()).decode(&data).unwrap();
    assert_eq!(header.diagnostics.len(), 2);
    assert!(matches!(
        header.diagnostics[0],
        DecodeDiagnostic::UidChecksumMismatch { stored: 0, .. }
    ));
    assert_eq!(header.diagnostics[1], DecodeDiagnostic::SignatureMismatch { found: 0 });

    let fixed = ImageBuilder::new()
        .uids(DYNAMIC_LIBRARY_UID, 0, 0)
        .word(&layout::UID_CHECKSUM, uid::uid_checksum(DYNAMIC_LIBRARY_UID, 0, 0))
        .signature(b"EPOC")
        .build();
    let strict = E32Decoder::with_options(DecodeOptions { strict: true, ..options });
    assert!(strict.decode(&fixed).unwrap().diagnostics.is_empty());
    assert!(matches!(
        strict.decode(&data),
        Err(DecodeError::Rejected(DecodeDiagnostic::UidChecksumMismatch { .. }))
    ));
}

#[test]
fn decoding_is_deterministic() {
    let data = ImageBuilder::new().flags(0x8).exports_with_holes(20, &[0, 19]).build();
    assert_eq!(decode(&data).unwrap(), decode(&data).unwrap());
}

#[test]
fn decode_encode_decode_is_stable() {
    let data = ImageBuilder::new()
        .uids(DYNAMIC_LIBRARY_UID, 0x1000_008D, 0x2000_1234)
        .signature(b"EPOC")
        .flags(0x0200_4809)
        .time(0x00E0_1234_5678_9ABC)
        .word(&layout::EXCEPTION_DESCRIPTOR, 0x0000_2001)
        .exports_with_holes(42, &[3, 41])
        .build();
    let first = decode(&data).unwrap();

    let tail = layout::EXPORT_DESC.offset;
    let mut rebuilt = first.encode_fixed_fields()[..tail].to_vec();
    rebuilt.extend_from_slice(&data[tail..]);

    let second = decode(&rebuilt).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.exception_descriptor_offset(), Some(0x2000));
}
