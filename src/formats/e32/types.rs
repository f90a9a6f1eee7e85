//! Core E32 data types and constants

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest buffer that can hold every fixed header field
pub const MIN_HEADER_SIZE: usize = 160;

/// `iSignature` of a well-formed image, "EPOC" read little-endian
pub const EPOC_SIGNATURE: u32 = 0x434F_5045;

// UID values
pub const DYNAMIC_LIBRARY_UID: u32 = 0x1000_0079;
pub const EXECUTABLE_IMAGE_UID: u32 = 0x1000_007A;

// Compression UIDs
pub const COMPRESSION_NONE: u32 = 0;
pub const COMPRESSION_DEFLATE: u32 = 0x101F_7AFC;
pub const COMPRESSION_BYTE_PAIR: u32 = 0x1028_22AA;

// Export description types
pub const EXPORT_DESC_NO_HOLES: u8 = 0x00;
pub const EXPORT_DESC_FULL_BITMAP: u8 = 0x01;
pub const EXPORT_DESC_SPARSE_BITMAP8: u8 = 0x02;
pub const EXPORT_DESC_XIP: u8 = 0xFF;

/// Fatal decode errors. No partial header is returned alongside these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("read of {width} bytes at offset {offset:#x} exceeds image length {len}")]
    OutOfRange {
        offset: usize,
        width: usize,
        len: usize,
    },

    #[error("field {field} has no fixed width")]
    VariableWidth { field: &'static str },

    #[error("rejected in strict mode: {0}")]
    Rejected(DecodeDiagnostic),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Non-fatal findings attached to an otherwise complete header
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeDiagnostic {
    #[error("unsupported export bitmap encoding {encoding:#04x}")]
    UnsupportedBitmapEncoding { encoding: u8 },

    #[error("export description size {declared} does not match expected {expected}")]
    ExportDescSizeMismatch { declared: u16, expected: usize },

    #[error("uid checksum {stored:#010x} does not match computed {computed:#010x}")]
    UidChecksumMismatch { stored: u32, computed: u32 },

    #[error("image signature {found:#010x} is not EPOC")]
    SignatureMismatch { found: u32 },
}

/// Decoder behaviour switches. Everything beyond the export bitmap checks is opt-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Recompute the checked-UID value and compare it with `uid_checksum`.
    pub validate_uid_checksum: bool,
    /// Require the "EPOC" signature.
    pub validate_signature: bool,
    /// Turn the first diagnostic into [`DecodeError::Rejected`].
    pub strict: bool,
}

/// Kernel ABI generation derived from the flags word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildGeneration {
    /// EKA1
    Legacy,
    /// EKA2
    Modern,
    /// Never produced by the flag classification; kept for records built elsewhere.
    Unknown,
}

impl fmt::Display for BuildGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "EKA1"),
            Self::Modern => write!(f, "EKA2"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// `iModuleVersion`: high half major, low half minor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ModuleVersion {
    pub major: u16,
    pub minor: u16,
}

impl ModuleVersion {
    pub fn from_word(word: u32) -> Self {
        Self {
            major: (word >> 16) as u16,
            minor: (word & 0xFFFF) as u16,
        }
    }

    pub fn to_word(self) -> u32 {
        (u32::from(self.major) << 16) | u32::from(self.minor)
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Version of the tool that produced the image (`TVersion` layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolsVersion {
    pub major: i8,
    pub minor: i8,
    pub build: i16,
}

impl ToolsVersion {
    pub fn from_word(word: u32) -> Self {
        let b = word.to_le_bytes();
        Self {
            major: b[0] as i8,
            minor: b[1] as i8,
            build: i16::from_le_bytes([b[2], b[3]]),
        }
    }
}

impl fmt::Display for ToolsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}.{:02}({:03})", self.major, self.minor, self.build)
    }
}

/// Compression scheme named by `iCompressionType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Compression {
    None,
    Deflate,
    BytePair,
    Other(u32),
}

impl From<u32> for Compression {
    fn from(value: u32) -> Self {
        match value {
            COMPRESSION_NONE => Self::None,
            COMPRESSION_DEFLATE => Self::Deflate,
            COMPRESSION_BYTE_PAIR => Self::BytePair,
            other => Self::Other(other),
        }
    }
}

/// CPU identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cpu {
    Unknown, // 0x0000
    X86,     // 0x1000
    ArmV4,   // 0x2000
    ArmV5,   // 0x2001
    ArmV6,   // 0x2002
    MCore,   // 0x4000
    Other(u16),
}

impl Cpu {
    pub fn is_arm(&self) -> bool {
        matches!(self, Self::ArmV4 | Self::ArmV5 | Self::ArmV6)
    }
}

impl From<u16> for Cpu {
    fn from(value: u16) -> Self {
        match value {
            0x0000 => Self::Unknown,
            0x1000 => Self::X86,
            0x2000 => Self::ArmV4,
            0x2001 => Self::ArmV5,
            0x2002 => Self::ArmV6,
            0x4000 => Self::MCore,
            other => Self::Other(other),
        }
    }
}

/// Process priority of an executable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessPriority {
    Low,
    Background,
    Foreground,
    High,
    WindowServer,
    FileServer,
    RealTimeServer,
    Supervisor,
    Other(u16),
}

impl From<u16> for ProcessPriority {
    fn from(value: u16) -> Self {
        match value {
            150 => Self::Low,
            250 => Self::Background,
            350 => Self::Foreground,
            450 => Self::High,
            650 => Self::WindowServer,
            750 => Self::FileServer,
            850 => Self::RealTimeServer,
            950 => Self::Supervisor,
            other => Self::Other(other),
        }
    }
}

/// Security words, kept as uninterpreted bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SecurityInfo {
    pub secure_id: [u8; 4],
    pub vendor_id: [u8; 4],
    pub capabilities: [[u8; 4]; 2],
}

impl Serialize for SecurityInfo {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("SecurityInfo", 3)?;
        s.serialize_field("secure_id", &hex::encode(self.secure_id))?;
        s.serialize_field("vendor_id", &hex::encode(self.vendor_id))?;
        s.serialize_field(
            "capabilities",
            &[
                hex::encode(self.capabilities[0]),
                hex::encode(self.capabilities[1]),
            ],
        )?;
        s.end()
    }
}

/// A decoded field as seen through the named mapping view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Byte(u8),
    Half(u16),
    Word(u32),
    Flags(u32),
    Version(ModuleVersion),
    Time(u64),
    Opaque(#[serde(serialize_with = "serialize_hex")] [u8; 4]),
    Bitmap(Vec<bool>),
}

fn serialize_hex<S: serde::Serializer>(
    bytes: &[u8; 4],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

impl FieldValue {
    /// Integer view of a scalar value, as stored little-endian in the image
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Byte(v) => Some(u64::from(*v)),
            Self::Half(v) => Some(u64::from(*v)),
            Self::Word(v) | Self::Flags(v) => Some(u64::from(*v)),
            Self::Version(v) => Some(u64::from(v.to_word())),
            Self::Time(v) => Some(*v),
            Self::Opaque(b) => Some(u64::from(u32::from_le_bytes(*b))),
            Self::Bitmap(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(v) => write!(f, "0x{:02x}", v),
            Self::Half(v) => write!(f, "0x{:04x}", v),
            Self::Word(v) | Self::Flags(v) => write!(f, "0x{:08x}", v),
            Self::Version(v) => write!(f, "{}", v),
            Self::Time(v) => write!(f, "0x{:016x}", v),
            Self::Opaque(b) => write!(f, "{}", hex::encode(b)),
            Self::Bitmap(bits) => {
                for &hole in bits {
                    f.write_str(if hole { "1" } else { "0" })?;
                }
                Ok(())
            }
        }
    }
}
