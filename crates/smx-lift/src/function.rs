//! Whole-function lifting.

use std::ops::Range;

use log::trace;
use smx_bytecode::format::Module;
use smx_bytecode::isa::Instruction;

use crate::emitter::{IlEmitter, IlFunction};
use crate::lifter::{LiftError, lift};

/// Lift the instructions in `range`.
///
/// Every instruction start gets an address label before lifting, so
/// branches inside the range become `goto`s and branches leaving it stay
/// computed jumps.
pub fn lift_function(module: &Module, range: Range<u64>) -> Result<IlFunction, LiftError> {
    let code_base = module.code_base();
    let data_base = module.data_base();

    let mut starts = Vec::new();
    let mut address = range.start;
    while address < range.end {
        let bytes = module
            .code_bytes_at(address)
            .ok_or(LiftError::OutsideCode(address))?;
        let insn = Instruction::decode(bytes, address)
            .map_err(|source| LiftError::Decode { address, source })?;
        starts.push(address);
        address = insn.next_address();
    }

    let mut il = IlFunction::new();
    for &start in &starts {
        il.add_address_label(start);
    }
    for &start in &starts {
        if let Some(label) = il.address_label(start) {
            il.mark_label(label);
        }
        let bytes = module
            .code_bytes_at(start)
            .ok_or(LiftError::OutsideCode(start))?;
        lift(bytes, start, code_base, data_base, &mut il)?;
    }
    trace!(
        "lifted {:#x}..{:#x}: {} instructions, {} statements",
        range.start,
        range.end,
        starts.len(),
        il.len()
    );
    Ok(il)
}
