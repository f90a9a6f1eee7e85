//! Flags word interpretation

use bitflags::bitflags;
use serde::Serialize;

use crate::formats::e32::types::BuildGeneration;

/// Bit that separates EKA2 images from EKA1 images
pub const BUILD_GENERATION_BIT: u32 = 0x0000_0008;

pub const HEADER_FORMAT_MASK: u32 = 0x0F00_0000;
pub const HEADER_FORMAT_ORIGINAL: u32 = 0x0000_0000;
pub const HEADER_FORMAT_J: u32 = 0x0100_0000;
pub const HEADER_FORMAT_V: u32 = 0x0200_0000;

pub const ABI_MASK: u32 = 0x0000_0018;
pub const ABI_GCC98R2: u32 = 0x0000_0000;
pub const ABI_EABI: u32 = 0x0000_0008;

pub const ENTRY_POINT_MASK: u32 = 0x0000_00E0;
pub const ENTRY_POINT_EKA1: u32 = 0x0000_0000;
pub const ENTRY_POINT_EKA2: u32 = 0x0000_0020;

pub const IMPORT_FORMAT_MASK: u32 = 0xF000_0000;
pub const IMPORT_FORMAT_PE: u32 = 0x0000_0000;
pub const IMPORT_FORMAT_ELF: u32 = 0x1000_0000;
pub const IMPORT_FORMAT_PE2: u32 = 0x2000_0000;

pub const HW_FLOAT_MASK: u32 = 0x00F0_0000;
pub const HW_FLOAT_SHIFT: u32 = 20;

bitflags! {
    /// Individually meaningful bits of `iFlags`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageFlags: u32 {
        const DLL = 0x0000_0001;
        const NO_CALL_ENTRY_POINT = 0x0000_0002;
        const FIXED_ADDRESS_EXE = 0x0000_0004;
        // Pre-2.00 tools; doubles as the EABI bit once a header format is set
        const OLD_J = 0x0000_0008;
        const OLD_ELF = 0x0000_0010;
        const CODE_UNPAGED = 0x0000_0100;
        const CODE_PAGED = 0x0000_0200;
        const NAMED_EXPORT_DATA = 0x0000_0400;
        const DEBUGGABLE = 0x0000_0800;
        const DATA_UNPAGED = 0x0000_1000;
        const DATA_PAGED = 0x0000_2000;
        const SMP_SAFE = 0x0000_4000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeaderFormat {
    Original,
    J,
    V,
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Abi {
    Gcc98r2,
    Eabi,
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryPointFormat {
    Eka1,
    Eka2,
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportFormat {
    Pe,
    Elf,
    Pe2,
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FloatingPoint {
    None,
    Vfpv2,
    Vfpv3,
    Other(u32),
}

/// Everything derivable from one flags word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagInfo {
    pub build_generation: BuildGeneration,
    pub header_format: HeaderFormat,
    pub abi: Abi,
    pub entry_point: EntryPointFormat,
    pub import_format: ImportFormat,
    pub floating_point: FloatingPoint,
}

impl FlagInfo {
    pub fn from_flags(flags: u32) -> Self {
        Self {
            build_generation: build_generation(flags),
            header_format: header_format(flags),
            abi: abi(flags),
            entry_point: entry_point_format(flags),
            import_format: import_format(flags),
            floating_point: floating_point(flags),
        }
    }
}

/// Classify the kernel ABI generation from the flags word
pub fn build_generation(flags: u32) -> BuildGeneration {
    if flags & BUILD_GENERATION_BIT != 0 {
        BuildGeneration::Modern
    } else {
        BuildGeneration::Legacy
    }
}

fn header_format_bits(flags: u32) -> u32 {
    if flags & HEADER_FORMAT_MASK != 0 {
        flags & HEADER_FORMAT_MASK
    } else if flags & ImageFlags::OLD_J.bits() != 0 {
        HEADER_FORMAT_J
    } else {
        HEADER_FORMAT_ORIGINAL
    }
}

pub fn header_format(flags: u32) -> HeaderFormat {
    match header_format_bits(flags) {
        HEADER_FORMAT_ORIGINAL => HeaderFormat::Original,
        HEADER_FORMAT_J => HeaderFormat::J,
        HEADER_FORMAT_V => HeaderFormat::V,
        other => HeaderFormat::Other(other >> 24),
    }
}

pub fn abi(flags: u32) -> Abi {
    let bits = if flags & HEADER_FORMAT_MASK != 0 {
        flags & ABI_MASK
    } else if flags & ImageFlags::OLD_ELF.bits() != 0 {
        ABI_EABI
    } else {
        ABI_GCC98R2
    };
    match bits {
        ABI_GCC98R2 => Abi::Gcc98r2,
        ABI_EABI => Abi::Eabi,
        other => Abi::Other(other >> 3),
    }
}

pub fn entry_point_format(flags: u32) -> EntryPointFormat {
    let bits = if flags & HEADER_FORMAT_MASK != 0 {
        flags & ENTRY_POINT_MASK
    } else if flags & ImageFlags::OLD_J.bits() != 0 {
        ENTRY_POINT_EKA2
    } else {
        ENTRY_POINT_EKA1
    };
    match bits {
        ENTRY_POINT_EKA1 => EntryPointFormat::Eka1,
        ENTRY_POINT_EKA2 => EntryPointFormat::Eka2,
        other => EntryPointFormat::Other(other >> 5),
    }
}

pub fn import_format(flags: u32) -> ImportFormat {
    let bits = if flags & HEADER_FORMAT_MASK != 0 {
        flags & IMPORT_FORMAT_MASK
    } else if flags & ImageFlags::OLD_ELF.bits() != 0 {
        IMPORT_FORMAT_ELF
    } else {
        IMPORT_FORMAT_PE
    };
    match bits {
        IMPORT_FORMAT_PE => ImportFormat::Pe,
        IMPORT_FORMAT_ELF => ImportFormat::Elf,
        IMPORT_FORMAT_PE2 => ImportFormat::Pe2,
        other => ImportFormat::Other(other >> 28),
    }
}

pub fn floating_point(flags: u32) -> FloatingPoint {
    match (flags & HW_FLOAT_MASK) >> HW_FLOAT_SHIFT {
        0 => FloatingPoint::None,
        1 => FloatingPoint::Vfpv2,
        2 => FloatingPoint::Vfpv3,
        other => FloatingPoint::Other(other),
    }
}
