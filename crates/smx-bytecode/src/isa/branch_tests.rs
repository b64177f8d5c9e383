use super::branch::*;
use super::opcodes::Opcode;
use crate::constants::{CODE_SEGMENT, DATA_SEGMENT};
use crate::format::encode_cells;

fn info(cells: &[i32], address: u64) -> InstructionInfo {
    instruction_info(&encode_cells(cells), address, CODE_SEGMENT, DATA_SEGMENT)
        .expect("decodes")
}

#[test]
fn returns_and_system_calls() {
    assert_eq!(
        info(&[Opcode::Retn as i32], 0).branches,
        [Branch::FunctionReturn]
    );
    assert_eq!(
        info(&[Opcode::Halt as i32, 0], 0).branches,
        [Branch::FunctionReturn]
    );
    assert_eq!(
        info(&[Opcode::SysreqC as i32, 1], 0).branches,
        [Branch::SystemCall]
    );
    let sysreq_n = info(&[Opcode::SysreqN as i32, 1, 2], 0);
    assert_eq!(sysreq_n.branches, [Branch::SystemCall]);
    assert_eq!(sysreq_n.length, 12);
}

#[test]
fn call_and_jump_targets() {
    assert_eq!(
        info(&[Opcode::Call as i32, 0x20], 0).branches,
        [Branch::Call(CODE_SEGMENT + 0x20)]
    );
    assert_eq!(
        info(&[Opcode::Jump as i32, 0x30], 0).branches,
        [Branch::Unconditional(CODE_SEGMENT + 0x30)]
    );
}

#[test]
fn false_edge_is_next_instruction() {
    let conds = Opcode::ALL.iter().filter(|op| op.is_conditional_jump());
    for &op in conds {
        let address = CODE_SEGMENT + 0x54;
        let i = info(&[op as i32, 0x100], address);
        assert_eq!(i.length, 8);
        assert_eq!(
            i.branches,
            [Branch::True(CODE_SEGMENT + 0x100), Branch::False(address + 8)],
            "{}",
            op.mnemonic()
        );
    }
}

#[test]
fn switch_is_indirect() {
    assert_eq!(
        info(&[Opcode::Switch as i32, 0x80], 0).branches,
        [Branch::Indirect]
    );
}

#[test]
fn plain_instructions_have_no_edges() {
    let i = info(&[Opcode::Add as i32], 0);
    assert!(i.branches.is_empty());
    assert_eq!(i.length, 4);

    let casetbl = info(&[Opcode::CaseTbl as i32, 1, 0x40, 5, 0x10], 0);
    assert!(casetbl.branches.is_empty());
    assert_eq!(casetbl.length, 20);
}
