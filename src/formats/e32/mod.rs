//! Symbian E32 image header decoder

pub mod bitmap;
pub mod flags;
pub mod header;
pub mod layout;
pub mod scalar;
pub mod types;
pub mod uid;
pub mod utils;

pub use bitmap::ExportDescType;
pub use flags::{FlagInfo, ImageFlags};
pub use header::{E32Header, FixedHeader};
pub use layout::{FieldId, FieldKind, FieldSpec, FieldWidth, E32_HEADER_LAYOUT};
pub use types::*;

use tracing::{debug, warn};

use utils::ByteSource;

/// E32 header decoder
#[derive(Debug, Clone, Default)]
pub struct E32Decoder {
    options: DecodeOptions,
}

impl E32Decoder {
    /// Create decoder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create decoder with custom options
    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode a header from the start of `data`.
    ///
    /// Runs the fixed phase over every fixed-width field, then the export
    /// bitmap phase sized by the fixed-phase count. Either phase failing on
    /// a short buffer fails the whole decode.
    pub fn decode(&self, data: &[u8]) -> Result<E32Header> {
        let span = crate::span_trace!("e32_decode", len = data.len());
        let _guard = span.enter();

        let src = ByteSource::new(data);
        let fixed = scalar::decode_fixed(&src)?;
        let build_generation = flags::build_generation(fixed.flags);

        let mut diagnostics = Vec::new();
        let export_bitmap = bitmap::decode_export_bitmap(&src, &fixed, &mut diagnostics)?;

        if self.options.validate_uid_checksum {
            let computed = uid::uid_checksum(fixed.uid1, fixed.uid2, fixed.uid3);
            if computed != fixed.uid_checksum {
                let diag = DecodeDiagnostic::UidChecksumMismatch {
                    stored: fixed.uid_checksum,
                    computed,
                };
                warn!(%diag, "uid check failed");
                diagnostics.push(diag);
            }
        }

        if self.options.validate_signature && fixed.signature != EPOC_SIGNATURE {
            let diag = DecodeDiagnostic::SignatureMismatch {
                found: fixed.signature,
            };
            warn!(%diag, "signature check failed");
            diagnostics.push(diag);
        }

        if self.options.strict {
            if let Some(first) = diagnostics.first() {
                return Err(DecodeError::Rejected(first.clone()));
            }
        }

        debug!(
            %build_generation,
            exports = export_bitmap.len(),
            diagnostics = diagnostics.len(),
            "decoded e32 header"
        );

        Ok(E32Header {
            fixed,
            build_generation,
            export_bitmap,
            diagnostics,
        })
    }
}

/// Decode with default options
pub fn decode(data: &[u8]) -> Result<E32Header> {
    E32Decoder::new().decode(data)
}
