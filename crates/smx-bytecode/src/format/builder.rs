//! Container emission.
//!
//! [`ContainerBuilder`] produces well-formed SMX images. The loader tests,
//! the CLI tests and downstream lifter tests build their fixtures with it.

use indexmap::IndexMap;

use super::header::{CodeHeader, DataHeader, Header, SectionEntry};
use crate::constants::{
    CELL_SIZE, CODE_HEADER_SIZE, COMPRESSION_GZ, COMPRESSION_NONE, DATA_HEADER_SIZE, HEADER_SIZE,
    SECTION_ENTRY_SIZE,
};

/// Encode cells as little-endian bytes.
pub fn encode_cells(cells: &[i32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(cells.len() * CELL_SIZE);
    for cell in cells {
        out.extend_from_slice(&cell.to_le_bytes());
    }
    out
}

/// NUL-terminated string pool with deduplication.
#[derive(Clone, Debug, Default)]
pub struct StringTable {
    bytes: Vec<u8>,
    offsets: IndexMap<String, u32>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of `s`, appending it on first use.
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&offset) = self.offsets.get(s) {
            return offset;
        }
        let offset = self.bytes.len() as u32;
        self.bytes.extend_from_slice(s.as_bytes());
        self.bytes.push(0);
        self.offsets.insert(s.to_string(), offset);
        offset
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Builds an SMX container section by section.
///
/// Layout: header, section directory, section-name table, then payloads in
/// insertion order. With compression enabled, everything after the
/// section-name table is one zlib stream.
#[derive(Clone, Debug, Default)]
pub struct ContainerBuilder {
    sections: Vec<(String, Vec<u8>)>,
    compressed: bool,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    /// Append a raw section.
    pub fn section(mut self, name: &str, payload: Vec<u8>) -> Self {
        self.sections.push((name.to_string(), payload));
        self
    }

    /// Append a `.code` section. `main` is relative to the code segment.
    pub fn code(self, code: &[u8], main: u32) -> Self {
        let header = CodeHeader {
            code_size: code.len() as u32,
            cell_size: CELL_SIZE as u8,
            code_version: 13,
            flags: 0,
            main,
            code: CODE_HEADER_SIZE as u32,
            features: 0,
        };
        let mut payload = header.to_bytes().to_vec();
        payload.extend_from_slice(code);
        self.section(".code", payload)
    }

    /// Append a `.data` section backing `data` with `mem_size` bytes of memory.
    pub fn data(self, data: &[u8], mem_size: u32) -> Self {
        let header = DataHeader {
            data_size: data.len() as u32,
            mem_size,
            data: DATA_HEADER_SIZE as u32,
        };
        let mut payload = header.to_bytes().to_vec();
        payload.extend_from_slice(data);
        self.section(".data", payload)
    }

    pub fn build(self) -> Vec<u8> {
        let mut names = StringTable::new();
        let name_offsets: Vec<u32> = self
            .sections
            .iter()
            .map(|(name, _)| names.intern(name))
            .collect();

        let string_table = HEADER_SIZE + self.sections.len() * SECTION_ENTRY_SIZE;
        let data_offset = string_table + names.len();

        let mut directory = Vec::with_capacity(self.sections.len() * SECTION_ENTRY_SIZE);
        let mut payload = Vec::new();
        for ((_, bytes), name_offset) in self.sections.iter().zip(name_offsets) {
            let entry = SectionEntry {
                name_offset,
                data_offset: (data_offset + payload.len()) as u32,
                size: bytes.len() as u32,
            };
            directory.extend_from_slice(&entry.to_bytes());
            payload.extend_from_slice(bytes);
        }

        let image_size = data_offset + payload.len();
        let (compression, stored) = if self.compressed {
            let deflated = miniz_oxide::deflate::compress_to_vec_zlib(&payload, 6);
            (COMPRESSION_GZ, deflated)
        } else {
            (COMPRESSION_NONE, payload)
        };

        let header = Header {
            compression,
            disk_size: (data_offset + stored.len()) as u32,
            image_size: image_size as u32,
            section_count: self.sections.len() as u8,
            string_table: string_table as u32,
            data_offset: data_offset as u32,
            ..Header::default()
        };

        let mut out = Vec::with_capacity(data_offset + stored.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&directory);
        out.extend_from_slice(names.as_bytes());
        out.extend_from_slice(&stored);
        out
    }
}
