//! Tests for instruction decoding.

use super::decode::*;
use super::opcodes::Opcode;
use crate::constants::CODE_SEGMENT;
use crate::format::encode_cells;

/// Opcode word padded with enough zero cells for any fixed-length form.
fn padded(op: Opcode) -> Vec<u8> {
    let mut cells = vec![0i32; 8];
    cells[0] = op as i32;
    encode_cells(&cells)
}

#[test]
fn fixed_lengths_match_table() {
    for &op in Opcode::ALL {
        if !op.is_generated() || matches!(op, Opcode::CaseTbl | Opcode::Case) {
            continue;
        }
        let decoded = decode(&padded(op), CODE_SEGMENT).expect("generated opcode decodes");
        assert_eq!(decoded.opcode, op);
        assert_eq!(decoded.len(), op.cells() as usize * 4, "{}", op.mnemonic());
    }
}

#[test]
fn casetbl_length_depends_on_count() {
    for n in [0usize, 1, 3, 10] {
        let mut cells = vec![Opcode::CaseTbl as i32, n as i32, 0x40];
        for i in 0..n {
            cells.push(i as i32);
            cells.push(0x100 + 8 * i as i32);
        }
        let decoded = decode(&encode_cells(&cells), CODE_SEGMENT).expect("casetbl decodes");
        assert_eq!(decoded.len(), (3 + 2 * n) * 4);
    }
}

#[test]
fn decoded_form_carries_address() {
    let bytes = encode_cells(&[Opcode::Push2C as i32, 1, 2]);
    let decoded = decode(&bytes, CODE_SEGMENT + 0x20).expect("decodes");
    assert_eq!(
        decoded,
        Decoded {
            address: CODE_SEGMENT + 0x20,
            opcode: Opcode::Push2C,
            cells: 3,
        }
    );
    assert_eq!(decoded.next_address(), CODE_SEGMENT + 0x2c);
}

#[test]
fn unknown_opcode() {
    let bytes = encode_cells(&[192, 0]);
    assert_eq!(decode(&bytes, CODE_SEGMENT), Err(DecodeError::UnknownOpcode(192)));

    let bytes = encode_cells(&[-1]);
    assert_eq!(decode(&bytes, CODE_SEGMENT), Err(DecodeError::UnknownOpcode(u32::MAX)));

    // the case pseudo-opcode is not an instruction word
    let bytes = encode_cells(&[255, 0, 0]);
    assert_eq!(decode(&bytes, CODE_SEGMENT), Err(DecodeError::UnknownOpcode(255)));
}

#[test]
fn ungenerated_opcode() {
    let bytes = encode_cells(&[Opcode::Jrel as i32, 0]);
    assert_eq!(decode(&bytes, CODE_SEGMENT), Err(DecodeError::Ungenerated(Opcode::Jrel)));
}

#[test]
fn truncated_instructions() {
    assert_eq!(
        decode(&[0x31, 0x00], CODE_SEGMENT),
        Err(DecodeError::Truncated {
            needed: 4,
            available: 2
        })
    );

    let bytes = encode_cells(&[Opcode::SysreqN as i32, 3]);
    assert_eq!(
        decode(&bytes, CODE_SEGMENT),
        Err(DecodeError::Truncated {
            needed: 12,
            available: 8
        })
    );

    let bytes = encode_cells(&[Opcode::CaseTbl as i32, 2, 0, 1, 0x10]);
    assert_eq!(
        decode(&bytes, CODE_SEGMENT),
        Err(DecodeError::Truncated {
            needed: 28,
            available: 20
        })
    );
}

#[test]
fn casetbl_count_missing() {
    let bytes = encode_cells(&[Opcode::CaseTbl as i32]);
    assert!(matches!(
        decode(&bytes, CODE_SEGMENT),
        Err(DecodeError::Truncated { needed: 8, .. })
    ));
}

#[test]
fn instruction_operands() {
    let bytes = encode_cells(&[Opcode::SysreqN as i32, 7, 2, Opcode::Proc as i32]);
    let insn = Instruction::decode(&bytes, 0x1000_0010).expect("decodes");
    assert_eq!(insn.len(), 12);
    assert_eq!(insn.next_address(), 0x1000_001c);
    assert_eq!(insn.operand(0), 7);
    assert_eq!(insn.operand(1), 2);
    assert_eq!(insn.operand(5), 0);
    assert!(insn.case_table().is_none());
}

#[test]
fn instruction_case_table() {
    let bytes = encode_cells(&[Opcode::CaseTbl as i32, 2, 0x40, 1, 0x10, -3, 0x20]);
    let insn = Instruction::decode(&bytes, 0).expect("decodes");
    let (default, entries) = insn.case_table().expect("is a case table");
    assert_eq!(default, 0x40);
    assert_eq!(
        entries,
        vec![
            CaseEntry {
                value: 1,
                target: 0x10
            },
            CaseEntry {
                value: -3,
                target: 0x20
            },
        ]
    );
}
