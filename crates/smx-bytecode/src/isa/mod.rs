//! The SMX instruction set: opcode table, decoder, disassembler and
//! per-instruction branch metadata.

mod branch;
mod decode;
mod disasm;
mod opcodes;

#[cfg(test)]
mod branch_tests;
#[cfg(test)]
mod decode_tests;
#[cfg(test)]
mod opcodes_tests;

pub use branch::{Branch, InstructionInfo, branches, instruction_info};
pub use decode::{CaseEntry, DecodeError, Decoded, Instruction, decode};
pub use disasm::{
    Token, TokenKind, TokenText, disassemble, disassemble_text, hex, relocate, render_operand,
    tokens,
};
pub use opcodes::{OPCODE_COUNT, Opcode, OperandKind, fixed_cells, mnemonic, operand_kinds};
