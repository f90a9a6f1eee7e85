//! The E32 header field table.
//!
//! One canonical description of every header field: where it lives, how
//! wide it is and how its bytes are interpreted. Canonical names are the
//! generic snake_case ones; the Symbian member names are accepted as aliases.

use serde::Serialize;

/// How a field's bytes are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    /// Plain little-endian 32-bit word
    Word32,
    /// Little-endian 16-bit word
    Word16,
    /// Single byte
    Byte,
    /// Low 16 bits minor, high 16 bits major
    SplitVersion16_16,
    /// `TimeLo` followed by `TimeHi`, composed as `(hi << 32) | lo`
    SplitTime64,
    /// Flags word
    Bitmask32,
    /// Four bytes exposed unchanged
    Opaque,
    /// Trailing bitmap sized by `export_dir_count`
    VarBitmap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldWidth {
    Fixed(usize),
    Variable,
}

impl FieldWidth {
    pub fn fixed(self) -> Option<usize> {
        match self {
            Self::Fixed(n) => Some(n),
            Self::Variable => None,
        }
    }
}

/// Identity of each header field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldId {
    Uid1,
    Uid2,
    Uid3,
    UidChecksum,
    Signature,
    HeaderCrc,
    ModuleVersion,
    CompressionType,
    ToolsVersion,
    Time,
    Flags,
    CodeSize,
    DataSize,
    HeapSizeMin,
    HeapSizeMax,
    StackSize,
    BssSize,
    EntryPoint,
    CodeBase,
    DataBase,
    DllRefTableCount,
    ExportDirOffset,
    ExportDirCount,
    TextSize,
    CodeOffset,
    DataOffset,
    ImportOffset,
    CodeRelocOffset,
    DataRelocOffset,
    PriorityCpu,
    UncompressedSize,
    SecureId,
    VendorId,
    CapabilitiesLo,
    CapabilitiesHi,
    ExceptionDescriptor,
    Spare,
    ExportDescSize,
    ExportDescType,
    ExportDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub id: FieldId,
    pub name: &'static str,
    /// Symbian member names; split words list one name per half
    pub aliases: &'static [&'static str],
    pub offset: usize,
    pub width: FieldWidth,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn word(
        id: FieldId,
        name: &'static str,
        aliases: &'static [&'static str],
        offset: usize,
    ) -> Self {
        Self::new(id, name, aliases, offset, 4, FieldKind::Word32)
    }

    const fn new(
        id: FieldId,
        name: &'static str,
        aliases: &'static [&'static str],
        offset: usize,
        width: usize,
        kind: FieldKind,
    ) -> Self {
        Self {
            id,
            name,
            aliases,
            offset,
            width: FieldWidth::Fixed(width),
            kind,
        }
    }

    /// Offset one past the field, `None` for the variable bitmap
    pub fn end(&self) -> Option<usize> {
        self.width.fixed().map(|w| self.offset + w)
    }

    pub fn is_fixed(&self) -> bool {
        self.kind != FieldKind::VarBitmap
    }

    /// Matches the canonical name or any Symbian alias
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

use FieldId as F;

pub const UID1: FieldSpec = FieldSpec::word(F::Uid1, "uid1", &["iUid1"], 0);
pub const UID2: FieldSpec = FieldSpec::word(F::Uid2, "uid2", &["iUid2"], 4);
pub const UID3: FieldSpec = FieldSpec::word(F::Uid3, "uid3", &["iUid3"], 8);
pub const UID_CHECKSUM: FieldSpec = FieldSpec::word(F::UidChecksum, "uid_checksum", &["iUidChecksum"], 12);
pub const SIGNATURE: FieldSpec = FieldSpec::word(F::Signature, "signature", &["iSignature"], 16);
pub const HEADER_CRC: FieldSpec = FieldSpec::word(F::HeaderCrc, "header_crc", &["iHeaderCrc"], 20);
pub const MODULE_VERSION: FieldSpec = FieldSpec::new(
    F::ModuleVersion,
    "module_version",
    &["iModuleVersion"],
    24,
    4,
    FieldKind::SplitVersion16_16,
);
pub const COMPRESSION_TYPE: FieldSpec =
    FieldSpec::word(F::CompressionType, "compression_type", &["iCompressionType"], 28);
pub const TOOLS_VERSION: FieldSpec = FieldSpec::word(F::ToolsVersion, "tools_version", &["iToolsVersion"], 32);
pub const TIME: FieldSpec = FieldSpec::new(
    F::Time,
    "time",
    &["iTimeLo", "iTimeHi"],
    36,
    8,
    FieldKind::SplitTime64,
);
pub const FLAGS: FieldSpec = FieldSpec::new(F::Flags, "flags", &["iFlags"], 44, 4, FieldKind::Bitmask32);
pub const CODE_SIZE: FieldSpec = FieldSpec::word(F::CodeSize, "code_size", &["iCodeSize"], 48);
pub const DATA_SIZE: FieldSpec = FieldSpec::word(F::DataSize, "data_size", &["iDataSize"], 52);
pub const HEAP_SIZE_MIN: FieldSpec = FieldSpec::word(F::HeapSizeMin, "heap_size_min", &["iHeapSizeMin"], 56);
pub const HEAP_SIZE_MAX: FieldSpec = FieldSpec::word(F::HeapSizeMax, "heap_size_max", &["iHeapSizeMax"], 60);
pub const STACK_SIZE: FieldSpec = FieldSpec::word(F::StackSize, "stack_size", &["iStackSize"], 64);
pub const BSS_SIZE: FieldSpec = FieldSpec::word(F::BssSize, "bss_size", &["iBssSize"], 68);
pub const ENTRY_POINT: FieldSpec = FieldSpec::word(F::EntryPoint, "entry_point", &["iEntryPoint"], 72);
pub const CODE_BASE: FieldSpec = FieldSpec::word(F::CodeBase, "code_base", &["iCodeBase"], 76);
pub const DATA_BASE: FieldSpec = FieldSpec::word(F::DataBase, "data_base", &["iDataBase"], 80);
pub const DLL_REF_TABLE_COUNT: FieldSpec =
    FieldSpec::word(F::DllRefTableCount, "dll_ref_table_count", &["iDllRefTableCount"], 84);
pub const EXPORT_DIR_OFFSET: FieldSpec =
    FieldSpec::word(F::ExportDirOffset, "export_dir_offset", &["iExportDirOffset"], 88);
pub const EXPORT_DIR_COUNT: FieldSpec =
    FieldSpec::word(F::ExportDirCount, "export_dir_count", &["iExportDirCount"], 92);
pub const TEXT_SIZE: FieldSpec = FieldSpec::word(F::TextSize, "text_size", &["iTextSize"], 96);
pub const CODE_OFFSET: FieldSpec = FieldSpec::word(F::CodeOffset, "code_offset", &["iCodeOffset"], 100);
pub const DATA_OFFSET: FieldSpec = FieldSpec::word(F::DataOffset, "data_offset", &["iDataOffset"], 104);
pub const IMPORT_OFFSET: FieldSpec = FieldSpec::word(F::ImportOffset, "import_offset", &["iImportOffset"], 108);
pub const CODE_RELOC_OFFSET: FieldSpec =
    FieldSpec::word(F::CodeRelocOffset, "code_reloc_offset", &["iCodeRelocOffset"], 112);
pub const DATA_RELOC_OFFSET: FieldSpec =
    FieldSpec::word(F::DataRelocOffset, "data_reloc_offset", &["iDataRelocOffset"], 116);
// iProcessPriority in the low half, iCpuIdentifier in the high half
pub const PRIORITY_CPU: FieldSpec = FieldSpec::word(
    F::PriorityCpu,
    "priority_cpu",
    &["iProcessPriority", "iCpuIdentifier"],
    120,
);
pub const UNCOMPRESSED_SIZE: FieldSpec =
    FieldSpec::word(F::UncompressedSize, "uncompressed_size", &["iUncompressedSize"], 124);
pub const SECURE_ID: FieldSpec =
    FieldSpec::new(F::SecureId, "secure_id", &["iS.iSecureId"], 128, 4, FieldKind::Opaque);
pub const VENDOR_ID: FieldSpec =
    FieldSpec::new(F::VendorId, "vendor_id", &["iS.iVendorId"], 132, 4, FieldKind::Opaque);
pub const CAPABILITIES_LO: FieldSpec =
    FieldSpec::new(F::CapabilitiesLo, "capabilities_lo", &["iS.iCaps[0]"], 136, 4, FieldKind::Opaque);
pub const CAPABILITIES_HI: FieldSpec =
    FieldSpec::new(F::CapabilitiesHi, "capabilities_hi", &["iS.iCaps[1]"], 140, 4, FieldKind::Opaque);
pub const EXCEPTION_DESCRIPTOR: FieldSpec =
    FieldSpec::word(F::ExceptionDescriptor, "exception_descriptor", &["iExceptionDescriptor"], 144);
pub const SPARE: FieldSpec = FieldSpec::word(F::Spare, "spare", &["iSpare2"], 148);
pub const EXPORT_DESC_SIZE: FieldSpec = FieldSpec::new(
    F::ExportDescSize,
    "export_desc_size",
    &["iExportDescSize"],
    152,
    2,
    FieldKind::Word16,
);
pub const EXPORT_DESC_TYPE: FieldSpec = FieldSpec::new(
    F::ExportDescType,
    "export_desc_type",
    &["iExportDescType"],
    154,
    1,
    FieldKind::Byte,
);
pub const EXPORT_DESC: FieldSpec = FieldSpec {
    id: F::ExportDesc,
    name: "export_desc",
    aliases: &["iExportDesc"],
    offset: 155,
    width: FieldWidth::Variable,
    kind: FieldKind::VarBitmap,
};

/// Every header field in ascending offset order; the bitmap is last.
pub static E32_HEADER_LAYOUT: [FieldSpec; 40] = [
    UID1,
    UID2,
    UID3,
    UID_CHECKSUM,
    SIGNATURE,
    HEADER_CRC,
    MODULE_VERSION,
    COMPRESSION_TYPE,
    TOOLS_VERSION,
    TIME,
    FLAGS,
    CODE_SIZE,
    DATA_SIZE,
    HEAP_SIZE_MIN,
    HEAP_SIZE_MAX,
    STACK_SIZE,
    BSS_SIZE,
    ENTRY_POINT,
    CODE_BASE,
    DATA_BASE,
    DLL_REF_TABLE_COUNT,
    EXPORT_DIR_OFFSET,
    EXPORT_DIR_COUNT,
    TEXT_SIZE,
    CODE_OFFSET,
    DATA_OFFSET,
    IMPORT_OFFSET,
    CODE_RELOC_OFFSET,
    DATA_RELOC_OFFSET,
    PRIORITY_CPU,
    UNCOMPRESSED_SIZE,
    SECURE_ID,
    VENDOR_ID,
    CAPABILITIES_LO,
    CAPABILITIES_HI,
    EXCEPTION_DESCRIPTOR,
    SPARE,
    EXPORT_DESC_SIZE,
    EXPORT_DESC_TYPE,
    EXPORT_DESC,
];

/// Fixed-width fields in offset order
pub fn fixed_fields() -> impl Iterator<Item = &'static FieldSpec> {
    E32_HEADER_LAYOUT.iter().filter(|spec| spec.is_fixed())
}

/// Look a field up by canonical name or alias
pub fn find(name: &str) -> Option<&'static FieldSpec> {
    E32_HEADER_LAYOUT.iter().find(|spec| spec.matches(name))
}

pub fn spec_for(id: FieldId) -> &'static FieldSpec {
    // The table holds every FieldId exactly once, in declaration order.
    &E32_HEADER_LAYOUT[id as usize]
}
