//! SMX container loading.
//!
//! [`Module`] parses a container once, in a fixed order: header, optional
//! payload decompression, section directory, then every known section in
//! [`SectionKind::ALL`] order. The result is immutable.

use std::collections::BTreeMap;
use std::io;
use std::ops::Range;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use smx_core::{ReadError, read_cstr};

use super::header::{CodeHeader, DataHeader, Header, SectionEntry};
use super::sections::{
    ClassdefRow, DebugFileRow, DebugInfoRow, DebugLineRow, DebugMethodRow, DebugVarRow,
    EnumRow, EnumStructFieldRow, EnumStructRow, FieldRow, MethodRow, NativeRow, PublicRow,
    RttiNativeRow, SectionKind, TypedefRow, TypesetRow, read_rows, read_table,
};
use super::typesig::{FunctionSig, NamedKind, TypeDesc, decode_function, decode_type};
use crate::constants::{
    CELL_SIZE, CODE_HEADER_SIZE, CODE_SEGMENT, COMPRESSION_GZ, COMPRESSION_NONE,
    DATA_HEADER_SIZE, DATA_SEGMENT, HEADER_SIZE, MAGIC, SECTION_ENTRY_SIZE,
};
use crate::isa::relocate;

/// Module load error.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("invalid magic: expected FFPS")]
    InvalidMagic,
    #[error("file too small: {0} bytes (minimum {HEADER_SIZE})")]
    FileTooSmall(usize),
    #[error("unsupported compression: {0}")]
    UnsupportedCompression(u8),
    #[error("compressed payload [{start}..{end}) exceeds file of {size} bytes")]
    PayloadOutOfBounds { start: u32, end: u32, size: usize },
    #[error("image of {size} bytes exceeds limit of {limit} bytes")]
    ImageTooLarge { size: u32, limit: usize },
    #[error("decompression failed: {0}")]
    Decompress(String),
    #[error("image size mismatch: expected {expected} bytes, got {actual}")]
    ImageSizeMismatch { expected: usize, actual: usize },
    #[error("section {name} [{offset}..+{size}) exceeds image of {image_size} bytes")]
    SectionOutOfBounds {
        name: String,
        offset: u32,
        size: u32,
        image_size: usize,
    },
    #[error("{section}: {rows} rows of {row_size} bytes exceed section of {size} bytes")]
    TableOutOfBounds {
        section: &'static str,
        rows: u32,
        row_size: u32,
        size: usize,
    },
    #[error("{section}: {reason}")]
    BadTable {
        section: &'static str,
        reason: String,
    },
    #[error("bad string at offset {offset} in {table}: {source}")]
    BadString {
        table: &'static str,
        offset: u32,
        source: ReadError,
    },
    #[error("{section} payload [{offset:#x}..+{size:#x}) exceeds the section end at {end:#x}")]
    PayloadOutsideSection {
        section: String,
        offset: u64,
        size: u64,
        end: u64,
    },
    #[error("{section} requires section {missing}")]
    MissingSection {
        section: &'static str,
        missing: &'static str,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("read error: {0}")]
    Read(#[from] ReadError),
}

impl ModuleError {
    /// The input is not an SMX container at all, as opposed to a corrupt one.
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::InvalidMagic)
    }
}

/// Limits applied while loading.
#[derive(Clone, Copy, Debug)]
pub struct LoadOptions {
    /// Largest accepted image size (default: 256 MiB).
    pub(crate) max_image_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_image_size: 256 * 1024 * 1024,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest accepted image size in bytes.
    pub fn max_image_size(mut self, size: usize) -> Self {
        self.max_image_size = size;
        self
    }

    pub fn get_max_image_size(&self) -> usize {
        self.max_image_size
    }
}

/// Section directory entry with its name resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

impl Section {
    fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.size as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SegmentKind {
    Code,
    Data,
}

/// Virtual address range backed by image bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub base: u64,
    pub mem_size: u64,
    pub file_offset: u64,
    /// Bytes backed by the image; the rest of `mem_size` reads as zero.
    pub file_size: u64,
}

impl Segment {
    pub fn end(&self) -> u64 {
        self.base + self.mem_size
    }

    pub fn contains(&self, address: u64) -> bool {
        (self.base..self.end()).contains(&address)
    }
}

/// Public function or variable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub name: String,
    pub address: u64,
}

/// Native import.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Native {
    pub name: String,
    pub signature: Option<FunctionSig>,
}

/// Where a function was discovered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FunctionSource {
    Entry,
    Public,
    Rtti,
}

/// Known function start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Function {
    pub name: String,
    pub address: u64,
    /// End address, when `rtti.methods` records it.
    pub end: Option<u64>,
    pub signature: Option<FunctionSig>,
    pub source: FunctionSource,
}

/// `rtti.methods` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Method {
    pub name: String,
    pub start: u64,
    pub end: u64,
    pub signature: Option<FunctionSig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Classdef {
    pub name: String,
    pub flags: u32,
    pub first_field: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub flags: u16,
    pub ty: Option<TypeDesc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnumStruct {
    pub name: String,
    pub first_field: u32,
    pub size: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnumStructField {
    pub name: String,
    pub ty: Option<TypeDesc>,
    pub offset: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Typedef {
    pub name: String,
    pub ty: Option<TypeDesc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Typeset {
    pub name: String,
    /// Offset of the member list in `rtti.data`.
    pub signature: u32,
}

/// Type metadata from the `rtti.*` tables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Rtti {
    pub methods: Vec<Method>,
    pub classdefs: Vec<Classdef>,
    pub fields: Vec<Field>,
    pub enum_structs: Vec<EnumStruct>,
    pub enum_struct_fields: Vec<EnumStructField>,
    pub enums: Vec<String>,
    pub typedefs: Vec<Typedef>,
    pub typesets: Vec<Typeset>,
}

/// `.dbg.globals` / `.dbg.locals` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DebugVariable {
    pub name: String,
    /// Data-relative for globals, frame-relative for locals.
    pub address: i32,
    pub vclass: u8,
    pub code_start: u32,
    pub code_end: u32,
    pub ty: Option<TypeDesc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DebugFile {
    pub address: u32,
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DebugLine {
    pub address: u32,
    pub line: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DebugMethod {
    pub method_index: u16,
    pub first_local: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DebugCounts {
    pub num_files: u32,
    pub num_lines: u32,
    pub num_syms: u32,
    pub num_arrays: u32,
}

/// Contents of the `.dbg.*` sections.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DebugInfo {
    pub files: Vec<DebugFile>,
    pub lines: Vec<DebugLine>,
    pub counts: Option<DebugCounts>,
    pub methods: Vec<DebugMethod>,
    pub globals: Vec<DebugVariable>,
    pub locals: Vec<DebugVariable>,
}

/// Serializable overview of a loaded module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModuleSummary<'a> {
    pub header: &'a Header,
    pub code: Option<&'a CodeHeader>,
    pub data: Option<&'a DataHeader>,
    pub sections: &'a [Section],
    pub segments: Vec<Segment>,
    pub entry_point: Option<u64>,
    pub functions: Vec<&'a Function>,
    pub publics: &'a [Symbol],
    pub pubvars: &'a [Symbol],
    pub natives: Vec<&'a Native>,
    pub rtti: &'a Rtti,
    pub debug: &'a DebugInfo,
}

/// A loaded SMX container.
#[derive(Debug)]
pub struct Module {
    /// File bytes with the payload decompressed.
    image: Vec<u8>,
    header: Header,
    sections: Vec<Section>,
    names: Option<Range<usize>>,
    code_header: Option<CodeHeader>,
    data_header: Option<DataHeader>,
    code: Option<Segment>,
    data: Option<Segment>,
    publics: Vec<Symbol>,
    pubvars: Vec<Symbol>,
    natives: IndexMap<String, Native>,
    /// Map index of each native table row, in row order.
    native_rows: Vec<usize>,
    functions: BTreeMap<u64, Function>,
    rtti: Rtti,
    debug: DebugInfo,
}

impl Module {
    /// Whether `bytes` starts with the SMX magic.
    pub fn is_valid(bytes: &[u8]) -> bool {
        bytes.get(..4) == Some(&MAGIC[..])
    }

    /// Load a module from owned bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ModuleError> {
        Self::from_bytes_with(bytes, LoadOptions::default())
    }

    /// Load a module from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModuleError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    /// Load a module with explicit limits.
    pub fn from_bytes_with(bytes: Vec<u8>, options: LoadOptions) -> Result<Self, ModuleError> {
        if !Self::is_valid(&bytes) {
            return Err(ModuleError::InvalidMagic);
        }
        let head: &[u8; HEADER_SIZE] = bytes
            .get(..HEADER_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or(ModuleError::FileTooSmall(bytes.len()))?;
        let header = Header::from_bytes(head);

        let image = match header.compression {
            COMPRESSION_NONE => bytes,
            COMPRESSION_GZ => decompress(&bytes, &header, &options)?,
            other => return Err(ModuleError::UnsupportedCompression(other)),
        };

        let sections = read_directory(&image, &header)?;
        let parsed = Loader::new(&image).run(&sections)?;

        let mut natives = IndexMap::new();
        let mut native_rows = Vec::with_capacity(parsed.natives.len());
        for name in parsed.natives {
            let entry = natives.entry(name.clone());
            native_rows.push(entry.index());
            entry.or_insert(Native {
                name,
                signature: None,
            });
        }
        let index_rtti_rows = native_rows.is_empty();
        for native in parsed.rtti_natives {
            let entry = natives.entry(native.name.clone());
            if index_rtti_rows {
                native_rows.push(entry.index());
            }
            let entry = entry.or_insert(Native {
                name: native.name,
                signature: None,
            });
            if entry.signature.is_none() {
                entry.signature = native.signature;
            }
        }

        let mut module = Self {
            image,
            header,
            sections,
            names: parsed.names,
            code_header: parsed.code_header,
            data_header: parsed.data_header,
            code: parsed.code,
            data: parsed.data,
            publics: parsed.publics,
            pubvars: parsed.pubvars,
            natives,
            native_rows,
            functions: BTreeMap::new(),
            rtti: parsed.rtti,
            debug: parsed.debug,
        };
        module.functions = module.discover_functions();
        Ok(module)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The container bytes with the payload decompressed.
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn code_header(&self) -> Option<&CodeHeader> {
        self.code_header.as_ref()
    }

    pub fn data_header(&self) -> Option<&DataHeader> {
        self.data_header.as_ref()
    }

    /// Mapped segments, code first.
    pub fn segments(&self) -> Vec<Segment> {
        self.code.iter().chain(self.data.iter()).copied().collect()
    }

    pub fn code_segment(&self) -> Option<&Segment> {
        self.code.as_ref()
    }

    pub fn data_segment(&self) -> Option<&Segment> {
        self.data.as_ref()
    }

    pub fn code_base(&self) -> u64 {
        CODE_SEGMENT
    }

    pub fn data_base(&self) -> u64 {
        DATA_SEGMENT
    }

    /// Absolute address of `main`.
    pub fn entry_point(&self) -> Option<u64> {
        self.code_header.map(|h| CODE_SEGMENT + u64::from(h.main))
    }

    pub fn publics(&self) -> &[Symbol] {
        &self.publics
    }

    pub fn pubvars(&self) -> &[Symbol] {
        &self.pubvars
    }

    /// Natives in first-seen order, `.natives` before `rtti.natives`.
    pub fn natives(&self) -> impl Iterator<Item = &Native> {
        self.natives.values()
    }

    /// Native called by `sysreq` with `index`, counted in native table rows.
    pub fn native(&self, index: usize) -> Option<&Native> {
        let i = *self.native_rows.get(index)?;
        self.natives.get_index(i).map(|(_, n)| n)
    }

    /// Native imported under `name`.
    pub fn native_named(&self, name: &str) -> Option<&Native> {
        self.natives.get(name)
    }

    /// Known functions keyed by start address.
    pub fn functions(&self) -> &BTreeMap<u64, Function> {
        &self.functions
    }

    pub fn function_named(&self, name: &str) -> Option<&Function> {
        self.functions.values().find(|f| f.name == name)
    }

    pub fn rtti(&self) -> &Rtti {
        &self.rtti
    }

    pub fn debug(&self) -> &DebugInfo {
        &self.debug
    }

    /// Absolute address of a `.dbg.globals` entry.
    pub fn global_address(&self, var: &DebugVariable) -> u64 {
        relocate(DATA_SEGMENT, var.address)
    }

    /// String at `offset` in `.names`.
    pub fn name(&self, offset: u32) -> Option<&str> {
        let names = self.image.get(self.names.clone()?)?;
        read_cstr(names, offset as usize).ok()
    }

    /// Display name of a named type, when its table is present.
    pub fn named_type_name(&self, kind: NamedKind, index: u32) -> Option<&str> {
        let i = index as usize;
        let name = match kind {
            NamedKind::Enum => self.rtti.enums.get(i)?,
            NamedKind::Typedef => &self.rtti.typedefs.get(i)?.name,
            NamedKind::Typeset => &self.rtti.typesets.get(i)?.name,
            NamedKind::Classdef => &self.rtti.classdefs.get(i)?.name,
            NamedKind::EnumStruct => &self.rtti.enum_structs.get(i)?.name,
        };
        Some(name.as_str())
    }

    /// Byte at a virtual address. Unbacked segment memory reads as zero.
    pub fn read_byte(&self, address: u64) -> Option<u8> {
        let seg = self.segments().into_iter().find(|s| s.contains(address))?;
        let offset = address - seg.base;
        if offset >= seg.file_size {
            return Some(0);
        }
        self.image.get((seg.file_offset + offset) as usize).copied()
    }

    /// Cell at a virtual address.
    pub fn read_cell(&self, address: u64) -> Option<i32> {
        let mut b = [0u8; CELL_SIZE];
        for (i, byte) in b.iter_mut().enumerate() {
            *byte = self.read_byte(address.checked_add(i as u64)?)?;
        }
        Some(i32::from_le_bytes(b))
    }

    /// Code bytes from `address` to the end of the code segment.
    pub fn code_bytes_at(&self, address: u64) -> Option<&[u8]> {
        let seg = self.code.as_ref()?;
        if !seg.contains(address) {
            return None;
        }
        let start = (seg.file_offset + (address - seg.base)) as usize;
        let end = (seg.file_offset + seg.file_size) as usize;
        self.image.get(start..end)
    }

    pub fn summary(&self) -> ModuleSummary<'_> {
        ModuleSummary {
            header: &self.header,
            code: self.code_header.as_ref(),
            data: self.data_header.as_ref(),
            sections: &self.sections,
            segments: self.segments(),
            entry_point: self.entry_point(),
            functions: self.functions.values().collect(),
            publics: &self.publics,
            pubvars: &self.pubvars,
            natives: self.natives().collect(),
            rtti: &self.rtti,
            debug: &self.debug,
        }
    }

    /// Merge the entry point, publics and `rtti.methods` into one map.
    /// Later sources rename earlier ones at the same address.
    fn discover_functions(&self) -> BTreeMap<u64, Function> {
        let mut functions = BTreeMap::new();
        if let Some(entry) = self.entry_point() {
            upsert(&mut functions, entry, "main", FunctionSource::Entry);
        }
        for public in &self.publics {
            upsert(&mut functions, public.address, &public.name, FunctionSource::Public);
        }
        for method in &self.rtti.methods {
            let f = upsert(&mut functions, method.start, &method.name, FunctionSource::Rtti);
            f.end = Some(method.end);
            f.signature = method.signature.clone();
        }
        functions
    }
}

fn upsert<'a>(
    functions: &'a mut BTreeMap<u64, Function>,
    address: u64,
    name: &str,
    source: FunctionSource,
) -> &'a mut Function {
    let f = functions.entry(address).or_insert_with(|| Function {
        name: String::new(),
        address,
        end: None,
        signature: None,
        source,
    });
    f.name = name.to_string();
    f.source = source;
    f
}

fn decompress(bytes: &[u8], header: &Header, options: &LoadOptions) -> Result<Vec<u8>, ModuleError> {
    if header.image_size as usize > options.max_image_size {
        return Err(ModuleError::ImageTooLarge {
            size: header.image_size,
            limit: options.max_image_size,
        });
    }
    let start = header.data_offset as usize;
    let end = header.disk_size as usize;
    if start < HEADER_SIZE || start > end || end > bytes.len() {
        return Err(ModuleError::PayloadOutOfBounds {
            start: header.data_offset,
            end: header.disk_size,
            size: bytes.len(),
        });
    }
    let expected = (header.image_size as usize)
        .checked_sub(start)
        .ok_or(ModuleError::ImageSizeMismatch {
            expected: start,
            actual: header.image_size as usize,
        })?;

    let inflated = miniz_oxide::inflate::decompress_to_vec_zlib_with_limit(&bytes[start..end], expected)
        .map_err(|e| ModuleError::Decompress(format!("{:?}", e.status)))?;
    log::trace!(
        "inflated {} payload bytes into {}",
        end - start,
        inflated.len()
    );
    if inflated.len() != expected {
        return Err(ModuleError::ImageSizeMismatch {
            expected,
            actual: inflated.len(),
        });
    }

    let mut image = Vec::with_capacity(start + inflated.len());
    image.extend_from_slice(&bytes[..start]);
    image.extend_from_slice(&inflated);
    Ok(image)
}

fn read_directory(image: &[u8], header: &Header) -> Result<Vec<Section>, ModuleError> {
    let mut sections = Vec::with_capacity(header.section_count as usize);
    for i in 0..header.section_count as usize {
        let at = HEADER_SIZE + i * SECTION_ENTRY_SIZE;
        let raw: &[u8; SECTION_ENTRY_SIZE] = image
            .get(at..at + SECTION_ENTRY_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or(ReadError::OutOfBounds {
                offset: at,
                len: SECTION_ENTRY_SIZE,
                size: image.len(),
            })?;
        let entry = SectionEntry::from_bytes(raw);
        let name_at = header.string_table as usize + entry.name_offset as usize;
        let name = read_cstr(image, name_at).map_err(|source| ModuleError::BadString {
            table: "header string table",
            offset: entry.name_offset,
            source,
        })?;

        let section = Section {
            name: name.to_string(),
            offset: entry.data_offset,
            size: entry.size,
        };
        if u64::from(entry.data_offset) + u64::from(entry.size) > image.len() as u64 {
            return Err(ModuleError::SectionOutOfBounds {
                name: section.name,
                offset: entry.data_offset,
                size: entry.size,
                image_size: image.len(),
            });
        }
        sections.push(section);
    }
    Ok(sections)
}

struct RttiNative {
    name: String,
    signature: Option<FunctionSig>,
}

/// Everything parsed from named sections.
#[derive(Default)]
struct Parsed {
    names: Option<Range<usize>>,
    code_header: Option<CodeHeader>,
    data_header: Option<DataHeader>,
    code: Option<Segment>,
    data: Option<Segment>,
    publics: Vec<Symbol>,
    pubvars: Vec<Symbol>,
    natives: Vec<String>,
    rtti_natives: Vec<RttiNative>,
    rtti: Rtti,
    debug: DebugInfo,
}

struct Loader<'a> {
    image: &'a [u8],
    names: Option<&'a [u8]>,
    rtti_data: Option<&'a [u8]>,
    out: Parsed,
}

impl<'a> Loader<'a> {
    fn new(image: &'a [u8]) -> Self {
        Self {
            image,
            names: None,
            rtti_data: None,
            out: Parsed::default(),
        }
    }

    fn run(mut self, sections: &[Section]) -> Result<Parsed, ModuleError> {
        for section in sections {
            if SectionKind::from_name(&section.name).is_none() {
                log::debug!("skipping unknown section {}", section.name);
            }
        }
        for kind in SectionKind::ALL {
            // first entry wins when a name repeats
            if let Some(section) = sections.iter().find(|s| s.name == kind.name()) {
                log::debug!("parsing section {} ({} bytes)", section.name, section.size);
                self.parse(kind, section)?;
            }
        }
        Ok(self.out)
    }

    fn parse(&mut self, kind: SectionKind, section: &Section) -> Result<(), ModuleError> {
        let image = self.image;
        let bytes = &image[section.range()];
        match kind {
            SectionKind::Names => {
                self.names = Some(bytes);
                self.out.names = Some(section.range());
            }
            SectionKind::Code => self.parse_code(section, bytes)?,
            SectionKind::Data => self.parse_data(section, bytes)?,
            SectionKind::Publics => {
                for row in read_rows::<PublicRow>(bytes)? {
                    self.out.publics.push(Symbol {
                        name: self.name(kind, row.name)?,
                        address: CODE_SEGMENT + u64::from(row.address),
                    });
                }
            }
            SectionKind::Pubvars => {
                for row in read_rows::<PublicRow>(bytes)? {
                    self.out.pubvars.push(Symbol {
                        name: self.name(kind, row.name)?,
                        address: DATA_SEGMENT + u64::from(row.address),
                    });
                }
            }
            SectionKind::Natives => {
                for row in read_rows::<NativeRow>(bytes)? {
                    let name = self.name(kind, row.name)?;
                    self.out.natives.push(name);
                }
            }
            SectionKind::RttiData => self.rtti_data = Some(bytes),
            SectionKind::RttiMethods => {
                for row in read_table::<MethodRow>(kind, bytes)? {
                    self.out.rtti.methods.push(Method {
                        name: self.name(kind, row.name)?,
                        start: CODE_SEGMENT + u64::from(row.pcode_start),
                        end: CODE_SEGMENT + u64::from(row.pcode_end),
                        signature: self.function_sig(kind, row.signature),
                    });
                }
            }
            SectionKind::RttiNatives => {
                for row in read_table::<RttiNativeRow>(kind, bytes)? {
                    let native = RttiNative {
                        name: self.name(kind, row.name)?,
                        signature: self.function_sig(kind, row.signature),
                    };
                    self.out.rtti_natives.push(native);
                }
            }
            SectionKind::RttiClassdefs => {
                for row in read_table::<ClassdefRow>(kind, bytes)? {
                    self.out.rtti.classdefs.push(Classdef {
                        name: self.name(kind, row.name)?,
                        flags: row.flags,
                        first_field: row.first_field,
                    });
                }
            }
            SectionKind::RttiFields => {
                for row in read_table::<FieldRow>(kind, bytes)? {
                    self.out.rtti.fields.push(Field {
                        name: self.name(kind, row.name)?,
                        flags: row.flags,
                        ty: self.type_desc(kind, row.type_id),
                    });
                }
            }
            SectionKind::RttiEnumStructs => {
                for row in read_table::<EnumStructRow>(kind, bytes)? {
                    self.out.rtti.enum_structs.push(EnumStruct {
                        name: self.name(kind, row.name)?,
                        first_field: row.first_field,
                        size: row.size,
                    });
                }
            }
            SectionKind::RttiEnumStructFields => {
                for row in read_table::<EnumStructFieldRow>(kind, bytes)? {
                    self.out.rtti.enum_struct_fields.push(EnumStructField {
                        name: self.name(kind, row.name)?,
                        ty: self.type_desc(kind, row.type_id),
                        offset: row.offset,
                    });
                }
            }
            SectionKind::RttiEnums => {
                for row in read_table::<EnumRow>(kind, bytes)? {
                    let name = self.name(kind, row.name)?;
                    self.out.rtti.enums.push(name);
                }
            }
            SectionKind::RttiTypedefs => {
                for row in read_table::<TypedefRow>(kind, bytes)? {
                    self.out.rtti.typedefs.push(Typedef {
                        name: self.name(kind, row.name)?,
                        ty: self.type_desc(kind, row.type_id),
                    });
                }
            }
            SectionKind::RttiTypesets => {
                for row in read_table::<TypesetRow>(kind, bytes)? {
                    self.out.rtti.typesets.push(Typeset {
                        name: self.name(kind, row.name)?,
                        signature: row.signature,
                    });
                }
            }
            SectionKind::DbgFiles => {
                for row in read_rows::<DebugFileRow>(bytes)? {
                    self.out.debug.files.push(DebugFile {
                        address: row.address,
                        name: self.name(kind, row.name)?,
                    });
                }
            }
            SectionKind::DbgLines => {
                let lines = read_rows::<DebugLineRow>(bytes)?;
                self.out.debug.lines = lines
                    .into_iter()
                    .map(|row| DebugLine {
                        address: row.address,
                        line: row.line,
                    })
                    .collect();
            }
            SectionKind::DbgInfo => {
                let info = read_rows::<DebugInfoRow>(bytes)?;
                self.out.debug.counts = info.first().map(|row| DebugCounts {
                    num_files: row.num_files,
                    num_lines: row.num_lines,
                    num_syms: row.num_syms,
                    num_arrays: row.num_arrays,
                });
            }
            SectionKind::DbgMethods => {
                let rows = read_table::<DebugMethodRow>(kind, bytes)?;
                self.out.debug.methods = rows
                    .into_iter()
                    .map(|row| DebugMethod {
                        method_index: row.method_index,
                        first_local: row.first_local,
                    })
                    .collect();
            }
            SectionKind::DbgGlobals => {
                for row in read_table::<DebugVarRow>(kind, bytes)? {
                    let var = self.debug_var(kind, &row)?;
                    self.out.debug.globals.push(var);
                }
            }
            SectionKind::DbgLocals => {
                for row in read_table::<DebugVarRow>(kind, bytes)? {
                    let var = self.debug_var(kind, &row)?;
                    self.out.debug.locals.push(var);
                }
            }
        }
        Ok(())
    }

    fn parse_code(&mut self, section: &Section, bytes: &[u8]) -> Result<(), ModuleError> {
        let head: &[u8; CODE_HEADER_SIZE] = bytes
            .get(..CODE_HEADER_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or(ReadError::OutOfBounds {
                offset: section.offset as usize,
                len: CODE_HEADER_SIZE,
                size: bytes.len(),
            })?;
        let header = CodeHeader::from_bytes(head);
        let file_offset = u64::from(section.offset) + u64::from(header.code);
        self.check_backed(section, file_offset, u64::from(header.code_size))?;

        self.out.code = Some(Segment {
            kind: SegmentKind::Code,
            base: CODE_SEGMENT,
            mem_size: u64::from(header.code_size),
            file_offset,
            file_size: u64::from(header.code_size),
        });
        self.out.code_header = Some(header);
        Ok(())
    }

    fn parse_data(&mut self, section: &Section, bytes: &[u8]) -> Result<(), ModuleError> {
        let head: &[u8; DATA_HEADER_SIZE] = bytes
            .get(..DATA_HEADER_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or(ReadError::OutOfBounds {
                offset: section.offset as usize,
                len: DATA_HEADER_SIZE,
                size: bytes.len(),
            })?;
        let header = DataHeader::from_bytes(head);
        if header.data_size > header.mem_size {
            return Err(ModuleError::BadTable {
                section: SectionKind::Data.name(),
                reason: format!(
                    "data size {} exceeds memory size {}",
                    header.data_size, header.mem_size
                ),
            });
        }
        let file_offset = u64::from(section.offset) + u64::from(header.data);
        self.check_backed(section, file_offset, u64::from(header.data_size))?;

        self.out.data = Some(Segment {
            kind: SegmentKind::Data,
            base: DATA_SEGMENT,
            mem_size: u64::from(header.mem_size),
            file_offset,
            file_size: u64::from(header.data_size),
        });
        self.out.data_header = Some(header);
        Ok(())
    }

    /// The payload `[start, start + len)` must lie inside `section`.
    fn check_backed(&self, section: &Section, start: u64, len: u64) -> Result<(), ModuleError> {
        let end = u64::from(section.offset) + u64::from(section.size);
        if start + len > end {
            return Err(ModuleError::PayloadOutsideSection {
                section: section.name.clone(),
                offset: start,
                size: len,
                end,
            });
        }
        Ok(())
    }

    fn name(&self, kind: SectionKind, offset: u32) -> Result<String, ModuleError> {
        let names = self.names.ok_or(ModuleError::MissingSection {
            section: kind.name(),
            missing: SectionKind::Names.name(),
        })?;
        read_cstr(names, offset as usize)
            .map(str::to_string)
            .map_err(|source| ModuleError::BadString {
                table: SectionKind::Names.name(),
                offset,
                source,
            })
    }

    /// Type at `offset` in `rtti.data`. A malformed signature only drops
    /// the type of the row that references it.
    fn type_desc(&self, kind: SectionKind, offset: u32) -> Option<TypeDesc> {
        let Some(data) = self.rtti_data else {
            log::debug!("{} has no rtti.data to decode types from", kind.name());
            return None;
        };
        decode_type(data, offset)
            .inspect_err(|e| log::warn!("{}: bad type at rtti.data+{offset}: {e}", kind.name()))
            .ok()
    }

    fn function_sig(&self, kind: SectionKind, offset: u32) -> Option<FunctionSig> {
        let Some(data) = self.rtti_data else {
            log::debug!("{} has no rtti.data to decode signatures from", kind.name());
            return None;
        };
        decode_function(data, offset)
            .inspect_err(|e| {
                log::warn!("{}: bad signature at rtti.data+{offset}: {e}", kind.name())
            })
            .ok()
    }

    fn debug_var(&self, kind: SectionKind, row: &DebugVarRow) -> Result<DebugVariable, ModuleError> {
        Ok(DebugVariable {
            name: self.name(kind, row.name)?,
            address: row.address,
            vclass: row.vclass,
            code_start: row.code_start,
            code_end: row.code_end,
            ty: self.type_desc(kind, row.type_id),
        })
    }
}
