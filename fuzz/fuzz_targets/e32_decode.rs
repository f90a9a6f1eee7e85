#![no_main]
use libfuzzer_sys::fuzz_target;

use e32image::formats::e32::{DecodeOptions, E32Decoder};

fuzz_target!(|data: &[u8]| {
    let decoder = E32Decoder::with_options(DecodeOptions {
        validate_uid_checksum: true,
        validate_signature: true,
        strict: false,
    });
    if let Ok(header) = decoder.decode(data) {
        let bytes = header.encode_fixed_fields();
        assert_eq!(&bytes[..155], &data[..155]);
        let _ = header.to_json();
    }
});
