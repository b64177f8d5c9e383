//! Named sections and their row layouts.

use smx_core::{ByteReader, ReadError};

use super::header::TableHeader;
use super::module::ModuleError;
use crate::constants::TABLE_HEADER_SIZE;

/// Every section the loader understands, in parse order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    Names,
    Code,
    Data,
    Publics,
    Pubvars,
    Natives,
    RttiData,
    RttiMethods,
    RttiNatives,
    RttiClassdefs,
    RttiFields,
    RttiEnumStructs,
    RttiEnumStructFields,
    RttiEnums,
    RttiTypedefs,
    RttiTypesets,
    DbgFiles,
    DbgLines,
    DbgInfo,
    DbgMethods,
    DbgGlobals,
    DbgLocals,
}

impl SectionKind {
    /// Parse order. `.names` and `rtti.data` come before every section
    /// that resolves names or decodes types through them.
    pub const ALL: [SectionKind; 22] = [
        Self::Names,
        Self::Code,
        Self::Data,
        Self::Publics,
        Self::Pubvars,
        Self::Natives,
        Self::RttiData,
        Self::RttiMethods,
        Self::RttiNatives,
        Self::RttiClassdefs,
        Self::RttiFields,
        Self::RttiEnumStructs,
        Self::RttiEnumStructFields,
        Self::RttiEnums,
        Self::RttiTypedefs,
        Self::RttiTypesets,
        Self::DbgFiles,
        Self::DbgLines,
        Self::DbgInfo,
        Self::DbgMethods,
        Self::DbgGlobals,
        Self::DbgLocals,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Names => ".names",
            Self::Code => ".code",
            Self::Data => ".data",
            Self::Publics => ".publics",
            Self::Pubvars => ".pubvars",
            Self::Natives => ".natives",
            Self::RttiData => "rtti.data",
            Self::RttiMethods => "rtti.methods",
            Self::RttiNatives => "rtti.natives",
            Self::RttiClassdefs => "rtti.classdefs",
            Self::RttiFields => "rtti.fields",
            Self::RttiEnumStructs => "rtti.enumstructs",
            Self::RttiEnumStructFields => "rtti.enumstruct_fields",
            Self::RttiEnums => "rtti.enums",
            Self::RttiTypedefs => "rtti.typedefs",
            Self::RttiTypesets => "rtti.typesets",
            Self::DbgFiles => ".dbg.files",
            Self::DbgLines => ".dbg.lines",
            Self::DbgInfo => ".dbg.info",
            Self::DbgMethods => ".dbg.methods",
            Self::DbgGlobals => ".dbg.globals",
            Self::DbgLocals => ".dbg.locals",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// A fixed-size row in a section.
pub trait Row: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, ReadError>;

    fn write(&self, out: &mut Vec<u8>);
}

/// `.publics` and `.pubvars` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicRow {
    pub address: u32,
    pub name: u32,
}

/// `.natives` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeRow {
    pub name: u32,
}

/// `rtti.methods` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MethodRow {
    pub name: u32,
    pub pcode_start: u32,
    pub pcode_end: u32,
    /// Offset of the signature in `rtti.data`
    pub signature: u32,
}

/// `rtti.natives` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RttiNativeRow {
    pub name: u32,
    pub signature: u32,
}

/// `rtti.classdefs` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassdefRow {
    pub flags: u32,
    pub name: u32,
    pub first_field: u32,
    pub reserved: [u32; 4],
}

/// `rtti.fields` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldRow {
    pub flags: u16,
    pub name: u32,
    pub type_id: u32,
}

/// `rtti.enumstructs` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnumStructRow {
    pub name: u32,
    pub first_field: u32,
    pub size: u32,
}

/// `rtti.enumstruct_fields` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnumStructFieldRow {
    pub name: u32,
    pub type_id: u32,
    pub offset: u32,
}

/// `rtti.enums` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnumRow {
    pub name: u32,
    pub reserved: [u32; 3],
}

/// `rtti.typedefs` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypedefRow {
    pub name: u32,
    pub type_id: u32,
}

/// `rtti.typesets` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypesetRow {
    pub name: u32,
    pub signature: u32,
}

/// `.dbg.methods` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebugMethodRow {
    pub method_index: u16,
    pub first_local: u32,
}

/// `.dbg.globals` and `.dbg.locals` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebugVarRow {
    pub address: i32,
    pub vclass: u8,
    pub name: u32,
    pub code_start: u32,
    pub code_end: u32,
    pub type_id: u32,
}

/// `.dbg.files` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebugFileRow {
    pub address: u32,
    pub name: u32,
}

/// `.dbg.lines` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebugLineRow {
    pub address: u32,
    pub line: u32,
}

/// `.dbg.info` contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugInfoRow {
    pub num_files: u32,
    pub num_lines: u32,
    pub num_syms: u32,
    pub num_arrays: u32,
}

macro_rules! u32_row {
    ($ty:ident { $($field:ident),* }) => {
        impl Row for $ty {
            const SIZE: usize = 4 * [$(stringify!($field)),*].len();

            fn read(r: &mut ByteReader<'_>) -> Result<Self, ReadError> {
                Ok(Self { $($field: r.read_u32()?,)* })
            }

            fn write(&self, out: &mut Vec<u8>) {
                $(out.extend_from_slice(&self.$field.to_le_bytes());)*
            }
        }
    };
}

u32_row!(PublicRow { address, name });
u32_row!(NativeRow { name });
u32_row!(MethodRow { name, pcode_start, pcode_end, signature });
u32_row!(RttiNativeRow { name, signature });
u32_row!(EnumStructRow { name, first_field, size });
u32_row!(EnumStructFieldRow { name, type_id, offset });
u32_row!(TypedefRow { name, type_id });
u32_row!(TypesetRow { name, signature });
u32_row!(DebugFileRow { address, name });
u32_row!(DebugLineRow { address, line });
u32_row!(DebugInfoRow { num_files, num_lines, num_syms, num_arrays });

impl Row for ClassdefRow {
    const SIZE: usize = 28;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, ReadError> {
        Ok(Self {
            flags: r.read_u32()?,
            name: r.read_u32()?,
            first_field: r.read_u32()?,
            reserved: [r.read_u32()?, r.read_u32()?, r.read_u32()?, r.read_u32()?],
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.name.to_le_bytes());
        out.extend_from_slice(&self.first_field.to_le_bytes());
        for r in self.reserved {
            out.extend_from_slice(&r.to_le_bytes());
        }
    }
}

impl Row for EnumRow {
    const SIZE: usize = 16;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, ReadError> {
        Ok(Self {
            name: r.read_u32()?,
            reserved: [r.read_u32()?, r.read_u32()?, r.read_u32()?],
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.name.to_le_bytes());
        for r in self.reserved {
            out.extend_from_slice(&r.to_le_bytes());
        }
    }
}

impl Row for FieldRow {
    const SIZE: usize = 10;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, ReadError> {
        Ok(Self {
            flags: r.read_u16()?,
            name: r.read_u32()?,
            type_id: r.read_u32()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.name.to_le_bytes());
        out.extend_from_slice(&self.type_id.to_le_bytes());
    }
}

impl Row for DebugMethodRow {
    const SIZE: usize = 6;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, ReadError> {
        Ok(Self {
            method_index: r.read_u16()?,
            first_local: r.read_u32()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.method_index.to_le_bytes());
        out.extend_from_slice(&self.first_local.to_le_bytes());
    }
}

impl Row for DebugVarRow {
    const SIZE: usize = 21;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, ReadError> {
        Ok(Self {
            address: r.read_i32()?,
            vclass: r.read_u8()?,
            name: r.read_u32()?,
            code_start: r.read_u32()?,
            code_end: r.read_u32()?,
            type_id: r.read_u32()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.address.to_le_bytes());
        out.push(self.vclass);
        out.extend_from_slice(&self.name.to_le_bytes());
        out.extend_from_slice(&self.code_start.to_le_bytes());
        out.extend_from_slice(&self.code_end.to_le_bytes());
        out.extend_from_slice(&self.type_id.to_le_bytes());
    }
}

/// Read a headerless section of back-to-back rows. Trailing bytes that do
/// not fill a whole row are ignored.
pub fn read_rows<T: Row>(section: &[u8]) -> Result<Vec<T>, ReadError> {
    let count = section.len() / T::SIZE;
    let mut r = ByteReader::new(section);
    (0..count).map(|_| T::read(&mut r)).collect()
}

/// Read a metadata table: a [`TableHeader`] followed by `row_count` rows
/// spaced `row_size` bytes apart, starting `header_size` bytes in.
pub fn read_table<T: Row>(kind: SectionKind, section: &[u8]) -> Result<Vec<T>, ModuleError> {
    let bad = |reason: String| ModuleError::BadTable {
        section: kind.name(),
        reason,
    };

    let head: &[u8; TABLE_HEADER_SIZE] = section
        .get(..TABLE_HEADER_SIZE)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| bad(format!("{} bytes is too small for a table header", section.len())))?;
    let header = TableHeader::from_bytes(head);

    if (header.header_size as usize) < TABLE_HEADER_SIZE {
        return Err(bad(format!("header size {} is too small", header.header_size)));
    }
    if (header.row_size as usize) < T::SIZE {
        return Err(bad(format!(
            "row size {} is smaller than {}",
            header.row_size,
            T::SIZE
        )));
    }

    let end = u64::from(header.row_size) * u64::from(header.row_count)
        + u64::from(header.header_size);
    if end > section.len() as u64 {
        return Err(ModuleError::TableOutOfBounds {
            section: kind.name(),
            rows: header.row_count,
            row_size: header.row_size,
            size: section.len(),
        });
    }

    (0..header.row_count as usize)
        .map(|i| {
            let at = header.header_size as usize + i * header.row_size as usize;
            T::read(&mut ByteReader::at(section, at)).map_err(ModuleError::from)
        })
        .collect()
}

/// Encode a metadata table with the canonical header and row size.
pub fn write_table<T: Row>(rows: &[T]) -> Vec<u8> {
    let header = TableHeader {
        header_size: TABLE_HEADER_SIZE as u32,
        row_size: T::SIZE as u32,
        row_count: rows.len() as u32,
    };
    let mut out = header.to_bytes().to_vec();
    for row in rows {
        row.write(&mut out);
    }
    out
}

/// Encode back-to-back rows with no header.
pub fn write_rows<T: Row>(rows: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rows.len() * T::SIZE);
    for row in rows {
        row.write(&mut out);
    }
    out
}
