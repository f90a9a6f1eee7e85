//! Decoded header records

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::formats::e32::flags::{FlagInfo, ImageFlags};
use crate::formats::e32::layout::{self, FieldId, FieldSpec, E32_HEADER_LAYOUT};
use crate::formats::e32::types::*;

/// Microseconds from 0 AD (nominal Gregorian) to 1970-01-01
pub const UNIX_EPOCH_MICROS: i64 = 62_168_256_000_000_000;

/// Every fixed-width field, as produced by the fixed phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixedHeader {
    pub uid1: u32,
    pub uid2: u32,
    pub uid3: u32,
    pub uid_checksum: u32,
    pub signature: u32,
    pub header_crc: u32,
    pub module_version: ModuleVersion,
    pub compression_type: u32,
    pub tools_version: u32,
    pub time: u64,
    pub flags: u32,
    pub code_size: u32,
    pub data_size: u32,
    pub heap_size_min: u32,
    pub heap_size_max: u32,
    pub stack_size: u32,
    pub bss_size: u32,
    pub entry_point: u32,
    pub code_base: u32,
    pub data_base: u32,
    pub dll_ref_table_count: u32,
    pub export_dir_offset: u32,
    pub export_dir_count: u32,
    pub text_size: u32,
    pub code_offset: u32,
    pub data_offset: u32,
    pub import_offset: u32,
    pub code_reloc_offset: u32,
    pub data_reloc_offset: u32,
    pub priority_cpu: u32,
    pub uncompressed_size: u32,
    pub security: SecurityInfo,
    pub exception_descriptor: u32,
    pub spare: u32,
    pub export_desc_size: u16,
    pub export_desc_type: u8,
}

impl FixedHeader {
    /// Value of one fixed field through the named view
    pub fn value(&self, id: FieldId) -> Option<FieldValue> {
        let v = match id {
            FieldId::Uid1 => FieldValue::Word(self.uid1),
            FieldId::Uid2 => FieldValue::Word(self.uid2),
            FieldId::Uid3 => FieldValue::Word(self.uid3),
            FieldId::UidChecksum => FieldValue::Word(self.uid_checksum),
            FieldId::Signature => FieldValue::Word(self.signature),
            FieldId::HeaderCrc => FieldValue::Word(self.header_crc),
            FieldId::ModuleVersion => FieldValue::Version(self.module_version),
            FieldId::CompressionType => FieldValue::Word(self.compression_type),
            FieldId::ToolsVersion => FieldValue::Word(self.tools_version),
            FieldId::Time => FieldValue::Time(self.time),
            FieldId::Flags => FieldValue::Flags(self.flags),
            FieldId::CodeSize => FieldValue::Word(self.code_size),
            FieldId::DataSize => FieldValue::Word(self.data_size),
            FieldId::HeapSizeMin => FieldValue::Word(self.heap_size_min),
            FieldId::HeapSizeMax => FieldValue::Word(self.heap_size_max),
            FieldId::StackSize => FieldValue::Word(self.stack_size),
            FieldId::BssSize => FieldValue::Word(self.bss_size),
            FieldId::EntryPoint => FieldValue::Word(self.entry_point),
            FieldId::CodeBase => FieldValue::Word(self.code_base),
            FieldId::DataBase => FieldValue::Word(self.data_base),
            FieldId::DllRefTableCount => FieldValue::Word(self.dll_ref_table_count),
            FieldId::ExportDirOffset => FieldValue::Word(self.export_dir_offset),
            FieldId::ExportDirCount => FieldValue::Word(self.export_dir_count),
            FieldId::TextSize => FieldValue::Word(self.text_size),
            FieldId::CodeOffset => FieldValue::Word(self.code_offset),
            FieldId::DataOffset => FieldValue::Word(self.data_offset),
            FieldId::ImportOffset => FieldValue::Word(self.import_offset),
            FieldId::CodeRelocOffset => FieldValue::Word(self.code_reloc_offset),
            FieldId::DataRelocOffset => FieldValue::Word(self.data_reloc_offset),
            FieldId::PriorityCpu => FieldValue::Word(self.priority_cpu),
            FieldId::UncompressedSize => FieldValue::Word(self.uncompressed_size),
            FieldId::SecureId => FieldValue::Opaque(self.security.secure_id),
            FieldId::VendorId => FieldValue::Opaque(self.security.vendor_id),
            FieldId::CapabilitiesLo => FieldValue::Opaque(self.security.capabilities[0]),
            FieldId::CapabilitiesHi => FieldValue::Opaque(self.security.capabilities[1]),
            FieldId::ExceptionDescriptor => FieldValue::Word(self.exception_descriptor),
            FieldId::Spare => FieldValue::Word(self.spare),
            FieldId::ExportDescSize => FieldValue::Half(self.export_desc_size),
            FieldId::ExportDescType => FieldValue::Byte(self.export_desc_type),
            FieldId::ExportDesc => return None,
        };
        Some(v)
    }

    /// Store a decoded value under its field; the inverse of [`Self::value`]
    pub fn set_value(&mut self, id: FieldId, value: &FieldValue) {
        let Some(raw) = value.as_u64() else {
            return;
        };
        let word = raw as u32;
        match id {
            FieldId::Uid1 => self.uid1 = word,
            FieldId::Uid2 => self.uid2 = word,
            FieldId::Uid3 => self.uid3 = word,
            FieldId::UidChecksum => self.uid_checksum = word,
            FieldId::Signature => self.signature = word,
            FieldId::HeaderCrc => self.header_crc = word,
            FieldId::ModuleVersion => self.module_version = ModuleVersion::from_word(word),
            FieldId::CompressionType => self.compression_type = word,
            FieldId::ToolsVersion => self.tools_version = word,
            FieldId::Time => self.time = raw,
            FieldId::Flags => self.flags = word,
            FieldId::CodeSize => self.code_size = word,
            FieldId::DataSize => self.data_size = word,
            FieldId::HeapSizeMin => self.heap_size_min = word,
            FieldId::HeapSizeMax => self.heap_size_max = word,
            FieldId::StackSize => self.stack_size = word,
            FieldId::BssSize => self.bss_size = word,
            FieldId::EntryPoint => self.entry_point = word,
            FieldId::CodeBase => self.code_base = word,
            FieldId::DataBase => self.data_base = word,
            FieldId::DllRefTableCount => self.dll_ref_table_count = word,
            FieldId::ExportDirOffset => self.export_dir_offset = word,
            FieldId::ExportDirCount => self.export_dir_count = word,
            FieldId::TextSize => self.text_size = word,
            FieldId::CodeOffset => self.code_offset = word,
            FieldId::DataOffset => self.data_offset = word,
            FieldId::ImportOffset => self.import_offset = word,
            FieldId::CodeRelocOffset => self.code_reloc_offset = word,
            FieldId::DataRelocOffset => self.data_reloc_offset = word,
            FieldId::PriorityCpu => self.priority_cpu = word,
            FieldId::UncompressedSize => self.uncompressed_size = word,
            FieldId::SecureId => self.security.secure_id = word.to_le_bytes(),
            FieldId::VendorId => self.security.vendor_id = word.to_le_bytes(),
            FieldId::CapabilitiesLo => self.security.capabilities[0] = word.to_le_bytes(),
            FieldId::CapabilitiesHi => self.security.capabilities[1] = word.to_le_bytes(),
            FieldId::ExceptionDescriptor => self.exception_descriptor = word,
            FieldId::Spare => self.spare = word,
            FieldId::ExportDescSize => self.export_desc_size = raw as u16,
            FieldId::ExportDescType => self.export_desc_type = raw as u8,
            FieldId::ExportDesc => {}
        }
    }

    /// Write the fixed fields back at their documented offsets.
    ///
    /// Produces a [`MIN_HEADER_SIZE`] buffer; bytes not covered by a fixed
    /// field are zero.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; MIN_HEADER_SIZE];
        for spec in layout::fixed_fields() {
            if let Some(value) = self.value(spec.id) {
                write_field(&mut out, spec, &value);
            }
        }
        out
    }
}

fn write_field(out: &mut [u8], spec: &FieldSpec, value: &FieldValue) {
    let Some(width) = spec.width.fixed() else {
        return;
    };
    let bytes = match value {
        FieldValue::Opaque(b) => b.to_vec(),
        other => match other.as_u64() {
            Some(v) => v.to_le_bytes()[..width].to_vec(),
            None => return,
        },
    };
    out[spec.offset..spec.offset + width].copy_from_slice(&bytes);
}

/// A fully decoded header. Immutable once returned by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct E32Header {
    #[serde(flatten)]
    pub fixed: FixedHeader,
    pub build_generation: BuildGeneration,
    /// One entry per export ordinal slot, `true` = hole
    pub export_bitmap: Vec<bool>,
    pub diagnostics: Vec<DecodeDiagnostic>,
}

impl E32Header {
    /// `(name, value)` pairs for every field in layout order, bitmap last
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        E32_HEADER_LAYOUT
            .iter()
            .map(|spec| (spec.name, self.value_of(spec)))
            .collect()
    }

    /// Look a field up by canonical name or Symbian alias
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        layout::find(name).map(|spec| self.value_of(spec))
    }

    fn value_of(&self, spec: &FieldSpec) -> FieldValue {
        self.fixed
            .value(spec.id)
            .unwrap_or_else(|| FieldValue::Bitmap(self.export_bitmap.clone()))
    }

    /// Fixed fields re-encoded at their offsets
    pub fn encode_fixed_fields(&self) -> Vec<u8> {
        self.fixed.encode()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn image_flags(&self) -> ImageFlags {
        ImageFlags::from_bits_retain(self.fixed.flags)
    }

    pub fn flag_info(&self) -> FlagInfo {
        FlagInfo::from_flags(self.fixed.flags)
    }

    pub fn is_dll(&self) -> bool {
        self.image_flags().contains(ImageFlags::DLL)
    }

    pub fn has_epoc_signature(&self) -> bool {
        self.fixed.signature == EPOC_SIGNATURE
    }

    pub fn module_version(&self) -> ModuleVersion {
        self.fixed.module_version
    }

    pub fn tools_version(&self) -> ToolsVersion {
        ToolsVersion::from_word(self.fixed.tools_version)
    }

    pub fn compression(&self) -> Compression {
        Compression::from(self.fixed.compression_type)
    }

    /// Raw creation time, microseconds since 0 AD
    pub fn time(&self) -> u64 {
        self.fixed.time
    }

    /// Creation time on the UTC calendar, if representable
    pub fn creation_time(&self) -> Option<DateTime<Utc>> {
        let micros = i64::try_from(self.fixed.time).ok()?;
        DateTime::from_timestamp_micros(micros.checked_sub(UNIX_EPOCH_MICROS)?)
    }

    pub fn process_priority(&self) -> ProcessPriority {
        ProcessPriority::from((self.fixed.priority_cpu & 0xFFFF) as u16)
    }

    pub fn cpu(&self) -> Cpu {
        Cpu::from((self.fixed.priority_cpu >> 16) as u16)
    }

    pub fn security_info(&self) -> SecurityInfo {
        self.fixed.security
    }

    /// Offset of the exception descriptor from the start of code, when valid
    pub fn exception_descriptor_offset(&self) -> Option<u32> {
        let xd = self.fixed.exception_descriptor;
        if xd & 1 != 0 && xd != u32::MAX {
            Some(xd & !1)
        } else {
            None
        }
    }

    /// Ordinals (1-based) of the export slots marked as holes
    pub fn missing_ordinals(&self) -> impl Iterator<Item = u32> + '_ {
        self.export_bitmap
            .iter()
            .enumerate()
            .filter(|&(_, &hole)| hole)
            .map(|(i, _)| i as u32 + 1)
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
