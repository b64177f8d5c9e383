//! Tests for function ranges and switch resolution.

use indoc::indoc;

use crate::analysis::*;
use crate::constants::CODE_SEGMENT;
use crate::format::{ContainerBuilder, Module, PublicRow, encode_cells, write_rows};
use crate::isa::Opcode;

const SWITCH_AT: u64 = CODE_SEGMENT + 0x0c;

/// `main` dispatching through a case table, then a second public function.
fn switch_module(code: &[i32]) -> Module {
    let bytes = ContainerBuilder::new()
        .section(".names", b"other\0".to_vec())
        .section(".publics", write_rows(&[PublicRow { address: 0x3c, name: 0 }]))
        .code(&encode_cells(code), 0)
        .build();
    Module::from_bytes(bytes).expect("fixture loads")
}

fn switch_code(table: i32) -> Vec<i32> {
    vec![
        Opcode::Proc as i32,
        Opcode::LoadSPri as i32,
        12,
        Opcode::Switch as i32,
        table,
        Opcode::ConstPri as i32,
        1,
        Opcode::Retn as i32,
        // 0x20
        Opcode::CaseTbl as i32,
        2,
        0x1c,
        1,
        0x14,
        2,
        0x1c,
        // 0x3c
        Opcode::Proc as i32,
        Opcode::Retn as i32,
    ]
}

#[test]
fn functions_end_at_next_start() {
    let module = switch_module(&switch_code(0x20));
    assert_eq!(
        function_ranges(&module),
        [
            CODE_SEGMENT..CODE_SEGMENT + 0x3c,
            CODE_SEGMENT + 0x3c..CODE_SEGMENT + 0x44,
        ]
    );
}

#[test]
fn walk_includes_case_table() {
    let module = switch_module(&switch_code(0x20));
    let listing: String = instructions(&module, CODE_SEGMENT..CODE_SEGMENT + 0x3c)
        .iter()
        .map(|i| format!("{:#x} {}\n", i.address, i.opcode.mnemonic()))
        .collect();
    assert_eq!(
        listing,
        indoc! {"
            0x10000000 proc
            0x10000004 load.s.pri
            0x1000000c switch
            0x10000014 const.pri
            0x1000001c retn
            0x10000020 casetbl
        "}
    );
}

#[test]
fn switch_targets_are_default_then_cases() {
    let module = switch_module(&switch_code(0x20));
    let switches = resolve_switches(&module, &function_ranges(&module));
    assert_eq!(switches.len(), 1);
    assert_eq!(
        switches[&SWITCH_AT],
        [CODE_SEGMENT + 0x1c, CODE_SEGMENT + 0x14, CODE_SEGMENT + 0x1c]
    );
}

#[test]
fn switch_into_non_table_is_unresolved() {
    let module = switch_module(&switch_code(0x14));
    let switches = resolve_switches(&module, &function_ranges(&module));
    assert!(switches.is_empty());

    let insns = instructions(&module, CODE_SEGMENT..CODE_SEGMENT + 0x14);
    assert_eq!(resolve_switch(&module, &insns[2]), None);
    assert_eq!(resolve_switch(&module, &insns[0]), None);
}

#[test]
fn invalid_instruction_stops_only_its_function() {
    let mut code = switch_code(0x20);
    code[1] = 0xbeef;
    let module = switch_module(&code);

    let ranges = function_ranges(&module);
    assert_eq!(instructions(&module, ranges[0].clone()).len(), 1);
    assert_eq!(instructions(&module, ranges[1].clone()).len(), 2);
    assert!(resolve_switches(&module, &ranges).is_empty());
}
