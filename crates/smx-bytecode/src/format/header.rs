//! Container header and fixed sub-headers.
//!
//! All structures are packed little-endian; field order follows the byte
//! layout exactly.

use serde::Serialize;

use crate::constants::{
    CODE_HEADER_SIZE, COMPRESSION_GZ, DATA_HEADER_SIZE, HEADER_SIZE, MAGIC, SECTION_ENTRY_SIZE,
    TABLE_HEADER_SIZE,
};

/// Container header - first 24 bytes of the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Magic bytes: b"FFPS"
    pub magic: [u8; 4],
    pub version: u16,
    /// 0 = none, 1 = zlib-compressed payload
    pub compression: u8,
    /// Size of the file on disk
    pub disk_size: u32,
    /// Size of the image once the payload is decompressed
    pub image_size: u32,
    pub section_count: u8,
    /// Offset of the section-name string table
    pub string_table: u32,
    /// Offset of the first byte covered by compression
    pub data_offset: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: 0x0102,
            compression: 0,
            disk_size: 0,
            image_size: 0,
            section_count: 0,
            string_table: 0,
            data_offset: 0,
        }
    }
}

impl Header {
    /// Decode header from the first 24 bytes.
    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u16::from_le_bytes([bytes[4], bytes[5]]),
            compression: bytes[6],
            disk_size: u32::from_le_bytes([bytes[7], bytes[8], bytes[9], bytes[10]]),
            image_size: u32::from_le_bytes([bytes[11], bytes[12], bytes[13], bytes[14]]),
            section_count: bytes[15],
            string_table: u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
            data_offset: u32::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]),
        }
    }

    /// Encode header to 24 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6] = self.compression;
        bytes[7..11].copy_from_slice(&self.disk_size.to_le_bytes());
        bytes[11..15].copy_from_slice(&self.image_size.to_le_bytes());
        bytes[15] = self.section_count;
        bytes[16..20].copy_from_slice(&self.string_table.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.data_offset.to_le_bytes());
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn is_compressed(&self) -> bool {
        self.compression == COMPRESSION_GZ
    }
}

/// Section directory entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionEntry {
    /// Offset of the name in the header string table
    pub name_offset: u32,
    pub data_offset: u32,
    pub size: u32,
}

impl SectionEntry {
    pub fn from_bytes(bytes: &[u8; SECTION_ENTRY_SIZE]) -> Self {
        Self {
            name_offset: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            data_offset: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            size: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; SECTION_ENTRY_SIZE] {
        let mut bytes = [0u8; SECTION_ENTRY_SIZE];
        bytes[0..4].copy_from_slice(&self.name_offset.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.data_offset.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.size.to_le_bytes());
        bytes
    }
}

/// `.code` sub-header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CodeHeader {
    pub code_size: u32,
    pub cell_size: u8,
    pub code_version: u8,
    pub flags: u16,
    /// Entry point, relative to the code segment
    pub main: u32,
    /// Offset of the code bytes, relative to the section start
    pub code: u32,
    pub features: u32,
}

impl CodeHeader {
    pub fn from_bytes(bytes: &[u8; CODE_HEADER_SIZE]) -> Self {
        Self {
            code_size: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            cell_size: bytes[4],
            code_version: bytes[5],
            flags: u16::from_le_bytes([bytes[6], bytes[7]]),
            main: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            code: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            features: u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; CODE_HEADER_SIZE] {
        let mut bytes = [0u8; CODE_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.code_size.to_le_bytes());
        bytes[4] = self.cell_size;
        bytes[5] = self.code_version;
        bytes[6..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.main.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.code.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.features.to_le_bytes());
        bytes
    }
}

/// `.data` sub-header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DataHeader {
    /// Bytes stored in the file
    pub data_size: u32,
    /// Bytes occupied in memory; the excess over `data_size` reads as zero
    pub mem_size: u32,
    /// Offset of the data bytes, relative to the section start
    pub data: u32,
}

impl DataHeader {
    pub fn from_bytes(bytes: &[u8; DATA_HEADER_SIZE]) -> Self {
        Self {
            data_size: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            mem_size: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            data: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; DATA_HEADER_SIZE] {
        let mut bytes = [0u8; DATA_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.data_size.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.mem_size.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.data.to_le_bytes());
        bytes
    }
}

/// Header shared by the `rtti.*` and `.dbg.*` metadata tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableHeader {
    pub header_size: u32,
    pub row_size: u32,
    pub row_count: u32,
}

impl TableHeader {
    pub fn from_bytes(bytes: &[u8; TABLE_HEADER_SIZE]) -> Self {
        Self {
            header_size: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            row_size: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            row_count: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; TABLE_HEADER_SIZE] {
        let mut bytes = [0u8; TABLE_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.header_size.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.row_size.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.row_count.to_le_bytes());
        bytes
    }
}
