//! The SMX container format: headers, section tables, type signatures,
//! loading, emission and dumping.

mod builder;
mod dump;
mod header;
mod module;
mod sections;
mod typesig;

#[cfg(test)]
mod typesig_tests;

pub use builder::{ContainerBuilder, StringTable, encode_cells};
pub use dump::{dump, dump_code, dump_tables};
pub use header::{CodeHeader, DataHeader, Header, SectionEntry, TableHeader};
pub use module::{
    Classdef, DebugCounts, DebugFile, DebugInfo, DebugLine, DebugMethod, DebugVariable,
    EnumStruct, EnumStructField, Field, Function, FunctionSource, LoadOptions, Method, Module,
    ModuleError, ModuleSummary, Native, Rtti, Section, Segment, SegmentKind, Symbol, Typedef,
    Typeset,
};
pub use sections::{
    ClassdefRow, DebugFileRow, DebugInfoRow, DebugLineRow, DebugMethodRow, DebugVarRow, EnumRow,
    EnumStructFieldRow, EnumStructRow, FieldRow, MethodRow, NativeRow, PublicRow, RttiNativeRow,
    Row, SectionKind, TypedefRow, TypesetRow, read_rows, read_table, write_rows, write_table,
};
pub use typesig::{
    FunctionSig, NamedKind, PrimitiveKind, TypeDecoder, TypeDesc, TypeError, decode_function,
    decode_type, tag,
};
