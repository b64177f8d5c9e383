//! Container and machine constants.

/// Magic bytes at offset 0 of every SMX container.
pub const MAGIC: [u8; 4] = *b"FFPS";

/// Size of a machine cell in bytes. Every operand and stack slot is one cell.
pub const CELL_SIZE: usize = 4;

/// Virtual base address of the code segment.
pub const CODE_SEGMENT: u64 = 0x1000_0000;

/// Virtual base address of the data segment.
pub const DATA_SEGMENT: u64 = 0x2000_0000;

/// Container header size in bytes (packed).
pub const HEADER_SIZE: usize = 24;

/// Section directory entry size in bytes.
pub const SECTION_ENTRY_SIZE: usize = 12;

/// `.code` sub-header size in bytes.
pub const CODE_HEADER_SIZE: usize = 20;

/// `.data` sub-header size in bytes.
pub const DATA_HEADER_SIZE: usize = 12;

/// Header size shared by all `rtti.*` and `.dbg.*` metadata tables.
pub const TABLE_HEADER_SIZE: usize = 12;

/// Payload stored as-is.
pub const COMPRESSION_NONE: u8 = 0;

/// Payload stored as a zlib stream.
pub const COMPRESSION_GZ: u8 = 1;
