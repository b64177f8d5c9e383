//! Post-load analysis over whole functions.
//!
//! `switch` jumps through a case table placed elsewhere in the code, so a
//! single instruction cannot report its targets. This pass walks each
//! function, follows every `switch` to its `casetbl` and records the
//! resolved targets.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::format::Module;
use crate::isa::{Instruction, Opcode, relocate};

/// Address range of every known function.
///
/// A function ends at its `rtti.methods` end when recorded, otherwise at
/// the next known function or the end of the code segment.
pub fn function_ranges(module: &Module) -> Vec<Range<u64>> {
    let Some(code) = module.code_segment() else {
        return Vec::new();
    };
    let starts: Vec<_> = module.functions().values().collect();
    starts
        .iter()
        .enumerate()
        .filter(|(_, f)| code.contains(f.address))
        .map(|(i, f)| {
            let next = starts.get(i + 1).map_or(code.end(), |n| n.address);
            let end = f.end.unwrap_or(next).min(code.end());
            f.address..end.max(f.address)
        })
        .collect()
}

/// Instructions of `range` in order. Stops at the first undecodable
/// instruction, logging it.
pub fn instructions(module: &Module, range: Range<u64>) -> Vec<Instruction<'_>> {
    let mut out = Vec::new();
    let mut address = range.start;
    while address < range.end {
        let Some(bytes) = module.code_bytes_at(address) else {
            break;
        };
        match Instruction::decode(bytes, address) {
            Ok(insn) => {
                address = insn.next_address();
                out.push(insn);
            }
            Err(e) => {
                log::warn!("{address:#x}: {e}; function walk stopped");
                break;
            }
        }
    }
    out
}

/// Targets of the `switch` at `insn`: the default first, then each case in
/// table order. `None` if the operand does not point at a `casetbl`.
pub fn resolve_switch(module: &Module, insn: &Instruction<'_>) -> Option<Vec<u64>> {
    if insn.opcode != Opcode::Switch {
        return None;
    }
    let base = module.code_base();
    let table_address = relocate(base, insn.operand(0));
    let table = Instruction::decode(module.code_bytes_at(table_address)?, table_address).ok()?;
    let (default, cases) = table.case_table()?;

    let mut targets = Vec::with_capacity(cases.len() + 1);
    targets.push(relocate(base, default));
    targets.extend(cases.iter().map(|c| relocate(base, c.target)));
    Some(targets)
}

/// Resolve every `switch` in `functions`, keyed by the `switch` address.
pub fn resolve_switches(
    module: &Module,
    functions: &[Range<u64>],
) -> BTreeMap<u64, Vec<u64>> {
    let mut out = BTreeMap::new();
    for range in functions {
        for insn in instructions(module, range.clone()) {
            if insn.opcode != Opcode::Switch {
                continue;
            }
            match resolve_switch(module, &insn) {
                Some(targets) => {
                    out.insert(insn.address, targets);
                }
                None => log::warn!("{:#x}: switch without a case table", insn.address),
            }
        }
    }
    out
}
