//! Instruction decoding.
//!
//! An instruction is a run of 4-byte little-endian cells: the opcode cell
//! followed by operand cells. Every opcode has a fixed length except
//! `casetbl`, whose length is `3 + 2 * case_count` cells.

use smx_core::read_u32_le;

use super::opcodes::{OPCODE_COUNT, Opcode, OperandKind};
use crate::constants::CELL_SIZE;

/// Why an instruction could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown opcode {0}")]
    UnknownOpcode(u32),
    #[error("opcode {} is never generated and has no encoding", .0.mnemonic())]
    Ungenerated(Opcode),
    #[error("truncated instruction: needs {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },
}

/// Opcode and total encoded length of one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub address: u64,
    pub opcode: Opcode,
    /// Length in cells, `casetbl` entries included.
    pub cells: usize,
}

impl Decoded {
    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.cells * CELL_SIZE
    }

    pub fn next_address(&self) -> u64 {
        self.address + self.len() as u64
    }
}

/// Decode the instruction at the start of `bytes`, located at `address`.
///
/// Fails if the opcode word is unknown or ungenerated, or if fewer bytes
/// are available than the instruction occupies.
pub fn decode(bytes: &[u8], address: u64) -> Result<Decoded, DecodeError> {
    let raw = read_u32_le(bytes, 0).map_err(|_| DecodeError::Truncated {
        needed: CELL_SIZE,
        available: bytes.len(),
    })?;
    if raw >= OPCODE_COUNT {
        return Err(DecodeError::UnknownOpcode(raw));
    }
    let opcode = Opcode::from_u32(raw).ok_or(DecodeError::UnknownOpcode(raw))?;
    if !opcode.is_generated() {
        return Err(DecodeError::Ungenerated(opcode));
    }

    let cells = match opcode {
        Opcode::CaseTbl => {
            let count = read_u32_le(bytes, CELL_SIZE).map_err(|_| DecodeError::Truncated {
                needed: 2 * CELL_SIZE,
                available: bytes.len(),
            })?;
            (count as usize)
                .checked_mul(2)
                .and_then(|n| n.checked_add(opcode.cells() as usize))
                .ok_or(DecodeError::Truncated {
                    needed: usize::MAX,
                    available: bytes.len(),
                })?
        }
        _ => opcode.cells() as usize,
    };

    let needed = cells.checked_mul(CELL_SIZE).unwrap_or(usize::MAX);
    if bytes.len() < needed {
        return Err(DecodeError::Truncated {
            needed,
            available: bytes.len(),
        });
    }
    Ok(Decoded {
        address,
        opcode,
        cells,
    })
}

/// One entry of a case table, with raw (unrelocated) values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaseEntry {
    pub value: i32,
    pub target: i32,
}

/// A decoded instruction borrowing its encoded bytes.
#[derive(Clone, Copy, Debug)]
pub struct Instruction<'a> {
    pub address: u64,
    pub opcode: Opcode,
    bytes: &'a [u8],
}

impl<'a> Instruction<'a> {
    /// Decode the instruction at the start of `bytes`, located at `address`.
    pub fn decode(bytes: &'a [u8], address: u64) -> Result<Self, DecodeError> {
        let decoded = decode(bytes, address)?;
        Ok(Self {
            address,
            opcode: decoded.opcode,
            bytes: &bytes[..decoded.len()],
        })
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Address of the next instruction in sequence.
    pub fn next_address(&self) -> u64 {
        self.address + self.len() as u64
    }

    /// Raw operand cell `index` (0 is the cell after the opcode), or 0 if the
    /// instruction has no such cell.
    pub fn operand(&self, index: usize) -> i32 {
        self.cell(index + 1)
    }

    pub fn operand_kinds(&self) -> &'static [OperandKind] {
        self.opcode.operands()
    }

    /// Raw values of the declared operands, in order.
    pub fn operands(&self) -> impl Iterator<Item = (OperandKind, i32)> + '_ {
        self.operand_kinds()
            .iter()
            .enumerate()
            .map(|(i, &kind)| (kind, self.operand(i)))
    }

    /// Default target and entries of a `casetbl`.
    pub fn case_table(&self) -> Option<(i32, Vec<CaseEntry>)> {
        if self.opcode != Opcode::CaseTbl {
            return None;
        }
        let count = self.operand(0) as u32 as usize;
        let entries = (0..count)
            .map(|i| CaseEntry {
                value: self.operand(2 + 2 * i),
                target: self.operand(3 + 2 * i),
            })
            .collect();
        Some((self.operand(1), entries))
    }

    fn cell(&self, index: usize) -> i32 {
        read_u32_le(self.bytes, index * CELL_SIZE).map_or(0, |v| v as i32)
    }
}
