#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! SMX (SourcePawn) bytecode containers and the SourcePawn instruction set.
//!
//! This crate contains:
//! - The opcode table, instruction decoder, disassembler and branch metadata
//! - The container loader, type-signature decoder, builder and dump
//! - Whole-function analysis (switch resolution)

pub mod analysis;
pub mod constants;
pub mod format;
pub mod isa;

#[cfg(test)]
mod analysis_tests;

pub use constants::{CELL_SIZE, CODE_SEGMENT, DATA_SEGMENT, MAGIC};
pub use format::{
    ContainerBuilder, Function, FunctionSig, LoadOptions, Module, ModuleError, Native, Segment,
    SegmentKind, TypeDesc, dump, encode_cells,
};
pub use isa::{
    Branch, DecodeError, Instruction, InstructionInfo, Opcode, OperandKind, Token, TokenKind,
    decode, disassemble, disassemble_text, instruction_info,
};
