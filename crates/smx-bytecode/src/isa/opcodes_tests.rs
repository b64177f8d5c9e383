use super::opcodes::*;

#[test]
fn table_covers_every_ordinal() {
    assert_eq!(Opcode::ALL.len(), OPCODE_COUNT as usize + 1);
    for raw in 0..OPCODE_COUNT {
        let op = Opcode::from_u32(raw).expect("every ordinal is an opcode");
        assert_eq!(op as u32, raw);
    }
    assert_eq!(Opcode::from_u32(255), Some(Opcode::Case));
    assert_eq!(Opcode::from_u32(OPCODE_COUNT), None);
}

#[test]
fn operand_count_fits_length() {
    for &op in Opcode::ALL {
        if op.is_generated() {
            assert!(
                op.operands().len() < op.cells() as usize,
                "{} declares more operands than cells",
                op.mnemonic()
            );
        } else {
            assert!(op.operands().is_empty(), "{}", op.mnemonic());
        }
    }
}

#[test]
fn representative_entries() {
    assert_eq!(Opcode::Proc.mnemonic(), "proc");
    assert_eq!(Opcode::Proc.cells(), 1);
    assert_eq!(Opcode::SysreqN.cells(), 3);
    assert_eq!(
        Opcode::SysreqN.operands(),
        &[OperandKind::NativeIndex, OperandKind::Constant]
    );
    assert_eq!(Opcode::CaseTbl.cells(), 3);
    assert_eq!(Opcode::InitarrayAlt.cells(), 6);
    assert_eq!(Opcode::RndToNearest.mnemonic(), "round");
    assert_eq!(Opcode::TrackerPopSetheap.mnemonic(), "trk.pop");
    assert_eq!(Opcode::Push5Adr.operands().len(), 5);
}

#[test]
fn ungenerated_have_zero_length() {
    for op in [Opcode::LrefPri, Opcode::Jrel, Opcode::SysreqPri, Opcode::FirstFake] {
        assert!(!op.is_generated());
        assert_eq!(op.cells(), 0);
    }
    assert!(Opcode::Nop.is_generated());
}

#[test]
fn raw_lookups_never_fail() {
    assert_eq!(mnemonic(49), "call");
    assert_eq!(mnemonic(192), "unknown");
    assert_eq!(mnemonic(u32::MAX), "unknown");
    assert_eq!(fixed_cells(154), 3);
    assert_eq!(fixed_cells(1000), 1);
    assert_eq!(operand_kinds(51), &[OperandKind::JumpTarget]);
    assert!(operand_kinds(4242).is_empty());
    assert!(operand_kinds(78).is_empty());
}

#[test]
fn conditional_jumps() {
    let conds: Vec<_> = Opcode::ALL
        .iter()
        .filter(|op| op.is_conditional_jump())
        .map(|op| op.mnemonic())
        .collect();
    assert_eq!(
        conds,
        ["jzer", "jnz", "jeq", "jneq", "jsless", "jsleq", "jsgrtr", "jsgeq"]
    );
}
