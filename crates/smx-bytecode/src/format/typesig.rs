//! Type signatures stored in `rtti.data`.
//!
//! A signature is a self-describing byte stream: an optional const byte,
//! then a kind tag, then tag-specific payload. Composite kinds recurse.
//! Enum, typedef, typeset, classdef and enum-struct references carry a
//! varint index into their `rtti.*` table and are kept unresolved.

use std::fmt;

use serde::Serialize;
use smx_core::{ByteReader, ReadError};

/// Kind tags.
pub mod tag {
    pub const BOOL: u8 = 0x01;
    pub const INT32: u8 = 0x06;
    pub const FLOAT32: u8 = 0x0c;
    pub const CHAR8: u8 = 0x0e;
    pub const ANY: u8 = 0x10;
    pub const TOP_FUNCTION: u8 = 0x11;

    pub const FIXED_ARRAY: u8 = 0x30;
    pub const ARRAY: u8 = 0x31;
    pub const FUNCTION: u8 = 0x32;

    pub const ENUM: u8 = 0x42;
    pub const TYPEDEF: u8 = 0x43;
    pub const TYPESET: u8 = 0x44;
    pub const CLASSDEF: u8 = 0x45;
    pub const ENUM_STRUCT: u8 = 0x46;

    pub const VOID: u8 = 0x70;
    pub const VARIADIC: u8 = 0x71;
    pub const BY_REF: u8 = 0x72;
    pub const CONST: u8 = 0x73;
}

/// Nesting beyond this is treated as corrupt input.
const MAX_DEPTH: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error("unknown type tag {tag:#04x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },
    #[error("type signature at offset {0} nests too deeply")]
    TooDeep(usize),
}

/// Scalar kinds. All but `Float32` are 4-byte integers at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PrimitiveKind {
    Bool,
    Int32,
    Float32,
    Char8,
    Any,
    TopFunction,
}

impl PrimitiveKind {
    pub fn is_float(self) -> bool {
        self == Self::Float32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int32 => "int",
            Self::Float32 => "float",
            Self::Char8 => "char",
            Self::Any => "any",
            Self::TopFunction => "Function",
        }
    }
}

/// Side tables a named type can refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NamedKind {
    Enum,
    Typedef,
    Typeset,
    Classdef,
    EnumStruct,
}

impl NamedKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Enum => "enum",
            Self::Typedef => "typedef",
            Self::Typeset => "typeset",
            Self::Classdef => "classdef",
            Self::EnumStruct => "enumstruct",
        }
    }
}

/// Decoded function signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FunctionSig {
    /// `None` for void.
    pub ret: Option<Box<TypeDesc>>,
    pub args: Vec<TypeDesc>,
    pub variadic: bool,
}

/// Decoded type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TypeDesc {
    Primitive(PrimitiveKind),
    FixedArray { size: u32, inner: Box<TypeDesc> },
    Array(Box<TypeDesc>),
    Function(FunctionSig),
    /// By-reference argument.
    ByRef(Box<TypeDesc>),
    /// Unresolved reference into an `rtti.*` table.
    Named { kind: NamedKind, index: u32 },
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => f.write_str(kind.name()),
            Self::FixedArray { size, inner } => write!(f, "{inner}[{size}]"),
            Self::Array(inner) => write!(f, "{inner}[]"),
            Self::Function(sig) => write!(f, "{sig}"),
            Self::ByRef(inner) => write!(f, "&{inner}"),
            Self::Named { kind, index } => write!(f, "{}#{index}", kind.name()),
        }
    }
}

impl fmt::Display for FunctionSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ret {
            Some(ret) => write!(f, "function {ret}(")?,
            None => f.write_str("function void(")?,
        }
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        if self.variadic {
            if !self.args.is_empty() {
                f.write_str(", ")?;
            }
            f.write_str("...")?;
        }
        f.write_str(")")
    }
}

/// Decode the type starting at `offset` in `rtti_data`.
pub fn decode_type(rtti_data: &[u8], offset: u32) -> Result<TypeDesc, TypeError> {
    TypeDecoder::new(rtti_data, offset).decode_type()
}

/// Decode a function signature body (argument count first) at `offset`.
pub fn decode_function(rtti_data: &[u8], offset: u32) -> Result<FunctionSig, TypeError> {
    TypeDecoder::new(rtti_data, offset).decode_function()
}

/// Recursive-descent decoder over `rtti.data`.
pub struct TypeDecoder<'a> {
    reader: ByteReader<'a>,
    depth: usize,
    start: usize,
}

impl<'a> TypeDecoder<'a> {
    pub fn new(rtti_data: &'a [u8], offset: u32) -> Self {
        Self {
            reader: ByteReader::at(rtti_data, offset as usize),
            depth: 0,
            start: offset as usize,
        }
    }

    /// Offset just past the last decoded byte.
    pub fn offset(&self) -> usize {
        self.reader.offset()
    }

    pub fn decode_type(&mut self) -> Result<TypeDesc, TypeError> {
        self.nested(|this| {
            // constness does not change the layout
            this.reader.eat(tag::CONST);
            let at = this.reader.offset();
            let b = this.reader.read_u8()?;
            let ty = match b {
                tag::BOOL => TypeDesc::Primitive(PrimitiveKind::Bool),
                tag::INT32 => TypeDesc::Primitive(PrimitiveKind::Int32),
                tag::FLOAT32 => TypeDesc::Primitive(PrimitiveKind::Float32),
                tag::CHAR8 => TypeDesc::Primitive(PrimitiveKind::Char8),
                tag::ANY => TypeDesc::Primitive(PrimitiveKind::Any),
                tag::TOP_FUNCTION => TypeDesc::Primitive(PrimitiveKind::TopFunction),
                tag::FIXED_ARRAY => {
                    let size = this.reader.read_varint()?;
                    let inner = this.decode_type()?;
                    TypeDesc::FixedArray {
                        size,
                        inner: Box::new(inner),
                    }
                }
                tag::ARRAY => TypeDesc::Array(Box::new(this.decode_type()?)),
                tag::FUNCTION => TypeDesc::Function(this.decode_function()?),
                tag::ENUM => this.named(NamedKind::Enum)?,
                tag::TYPEDEF => this.named(NamedKind::Typedef)?,
                tag::TYPESET => this.named(NamedKind::Typeset)?,
                tag::CLASSDEF => this.named(NamedKind::Classdef)?,
                tag::ENUM_STRUCT => this.named(NamedKind::EnumStruct)?,
                tag => return Err(TypeError::UnknownTag { tag, offset: at }),
            };
            Ok(ty)
        })
    }

    pub fn decode_function(&mut self) -> Result<FunctionSig, TypeError> {
        self.nested(|this| {
            let argc = this.reader.read_u8()?;
            let variadic = this.reader.eat(tag::VARIADIC);
            let ret = if this.reader.eat(tag::VOID) {
                None
            } else {
                Some(Box::new(this.decode_type()?))
            };
            let mut args = Vec::with_capacity(argc as usize);
            for _ in 0..argc {
                let by_ref = this.reader.eat(tag::BY_REF);
                let arg = this.decode_type()?;
                args.push(if by_ref {
                    TypeDesc::ByRef(Box::new(arg))
                } else {
                    arg
                });
            }
            Ok(FunctionSig {
                ret,
                args,
                variadic,
            })
        })
    }

    fn named(&mut self, kind: NamedKind) -> Result<TypeDesc, TypeError> {
        let index = self.reader.read_varint()?;
        Ok(TypeDesc::Named { kind, index })
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, TypeError>,
    ) -> Result<T, TypeError> {
        if self.depth >= MAX_DEPTH {
            return Err(TypeError::TooDeep(self.start));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
