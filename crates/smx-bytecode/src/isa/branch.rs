//! Control-flow metadata per instruction.

use serde::Serialize;

use super::decode::{DecodeError, Instruction};
use super::disasm::relocate;
use super::opcodes::Opcode;

/// One control-flow edge leaving an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Branch {
    FunctionReturn,
    SystemCall,
    Call(u64),
    Unconditional(u64),
    True(u64),
    False(u64),
    /// Targets are only known after case-table analysis.
    Indirect,
}

/// Length and outgoing edges of one instruction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InstructionInfo {
    pub length: usize,
    pub branches: Vec<Branch>,
}

/// Edges leaving an already decoded instruction.
pub fn branches(insn: &Instruction<'_>, code_base: u64) -> Vec<Branch> {
    let target = || relocate(code_base, insn.operand(0));
    match insn.opcode {
        Opcode::Halt | Opcode::Retn => vec![Branch::FunctionReturn],
        Opcode::SysreqC | Opcode::SysreqN => vec![Branch::SystemCall],
        Opcode::Call => vec![Branch::Call(target())],
        Opcode::Jump => vec![Branch::Unconditional(target())],
        op if op.is_conditional_jump() => {
            vec![Branch::True(target()), Branch::False(insn.address + 8)]
        }
        Opcode::Switch => vec![Branch::Indirect],
        _ => Vec::new(),
    }
}

/// Length and branch edges of the instruction at the start of `bytes`.
pub fn instruction_info(
    bytes: &[u8],
    address: u64,
    code_base: u64,
    _data_base: u64,
) -> Result<InstructionInfo, DecodeError> {
    let insn = Instruction::decode(bytes, address)?;
    Ok(InstructionInfo {
        length: insn.len(),
        branches: branches(&insn, code_base),
    })
}
