//! Tests for per-instruction lifting.

use smx_bytecode::constants::{CODE_SEGMENT, DATA_SEGMENT};
use smx_bytecode::format::encode_cells;
use smx_bytecode::isa::{DecodeError, Opcode};

use crate::emitter::{IlEmitter, IlFunction, NoopEmitter};
use crate::il::Reg;
use crate::interp::{Exit, Machine};
use crate::lifter::{LiftError, lift};

fn lift_cells(cells: &[i32]) -> IlFunction {
    let mut il = IlFunction::new();
    lift(&encode_cells(cells), CODE_SEGMENT, CODE_SEGMENT, DATA_SEGMENT, &mut il).expect("lifts");
    il
}

fn listing(cells: &[i32]) -> Vec<String> {
    lift_cells(cells).stmts().iter().map(ToString::to_string).collect()
}

#[test]
fn frame_setup_and_teardown() {
    assert_eq!(
        listing(&[Opcode::Proc as i32]),
        ["push(frm)", "push(heap)", "frm = sp"]
    );
    assert_eq!(
        listing(&[Opcode::Retn as i32]),
        ["heap = pop", "frm = pop", "return(pop)"]
    );
}

#[test]
fn call_pops_argument_count_and_drops_arguments() {
    assert_eq!(
        listing(&[Opcode::Call as i32, 0x20]),
        ["temp1 = pop", "call(0x10000020)", "sp = sp + (temp1 * 4)"]
    );
}

#[test]
fn native_calls() {
    assert_eq!(listing(&[Opcode::SysreqC as i32, 7]), ["push(7)", "syscall"]);
    assert_eq!(
        listing(&[Opcode::SysreqN as i32, 3, 2]),
        ["push(3)", "syscall", "sp = sp + (3 * 4)"]
    );
}

#[test]
fn data_operands_are_relocated() {
    assert_eq!(listing(&[Opcode::LoadPri as i32, 8]), ["pri = [0x20000008]"]);
    assert_eq!(listing(&[Opcode::StorAlt as i32, 8]), ["[0x20000008] = alt"]);
    assert_eq!(listing(&[Opcode::Zero as i32, 4]), ["[0x20000004] = 0"]);
    assert_eq!(listing(&[Opcode::Const as i32, 4, 7]), ["[0x20000004] = 7"]);
    assert_eq!(
        listing(&[Opcode::Inc as i32, 0]),
        ["[0x20000000] = [0x20000000] + 1"]
    );
    assert_eq!(
        listing(&[Opcode::LoadBoth as i32, 0, 4]),
        ["pri = [0x20000000]", "alt = [0x20000004]"]
    );
}

#[test]
fn frame_operands() {
    assert_eq!(listing(&[Opcode::LoadSPri as i32, -4]), ["pri = [frm + -4]"]);
    assert_eq!(listing(&[Opcode::AddrAlt as i32, 12]), ["alt = frm + 12"]);
    assert_eq!(listing(&[Opcode::LrefSPri as i32, 12]), ["pri = [[frm + 12]]"]);
    assert_eq!(listing(&[Opcode::SrefSAlt as i32, 12]), ["[[frm + 12]] = alt"]);
    assert_eq!(listing(&[Opcode::ZeroS as i32, -8]), ["[frm + -8] = 0"]);
    assert_eq!(listing(&[Opcode::DecS as i32, 16]), ["[frm + 16] = [frm + 16] - 1"]);
}

#[test]
fn indirect_increment_goes_through_pri() {
    assert_eq!(listing(&[Opcode::IncI as i32]), ["[pri] = [pri] + 1"]);
    assert_eq!(listing(&[Opcode::DecI as i32]), ["[pri] = [pri] - 1"]);
}

#[test]
fn sized_memory_access() {
    assert_eq!(listing(&[Opcode::LodbI as i32, 1]), ["pri:1 = [pri]:1"]);
    assert_eq!(listing(&[Opcode::StrbI as i32, 2]), ["[alt]:2 = pri"]);
    assert_eq!(listing(&[Opcode::LodbI as i32, 4]), ["pri = [pri]"]);
}

#[test]
fn multi_push_emits_one_push_per_operand() {
    assert_eq!(
        listing(&[Opcode::Push3S as i32, 12, 16, 20]),
        ["push([frm + 12])", "push([frm + 16])", "push([frm + 20])"]
    );
    assert_eq!(
        listing(&[Opcode::Push2C as i32, 1, 2]),
        ["push(1)", "push(2)"]
    );
    assert_eq!(
        listing(&[Opcode::Push2 as i32, 0, 4]),
        ["push([0x20000000])", "push([0x20000004])"]
    );
}

#[test]
fn division_sends_remainder_to_alt() {
    assert_eq!(
        listing(&[Opcode::Sdiv as i32]),
        ["temp0 = pri /s alt", "alt = pri %s alt", "pri = temp0"]
    );
    assert_eq!(
        listing(&[Opcode::SdivAlt as i32]),
        ["temp0 = alt /s pri", "alt = alt %s pri", "pri = temp0"]
    );
}

#[test]
fn array_indexing() {
    assert_eq!(listing(&[Opcode::Lidx as i32]), ["pri = [alt + (pri * 4)]"]);
    assert_eq!(listing(&[Opcode::IdxaddrB as i32, 2]), ["pri = alt + (pri << 2)"]);
}

#[test]
fn float_operands_come_from_the_stack() {
    assert_eq!(
        listing(&[Opcode::FloatDiv as i32]),
        ["temp0 = pop", "temp1 = pop", "pri = temp0 f/ temp1"]
    );
    assert_eq!(listing(&[Opcode::RndToFloor as i32]), ["pri = pop", "pri = floor(pri)"]);
}

#[test]
fn unsupported_operations_emit_a_marker() {
    assert_eq!(listing(&[Opcode::Movs as i32, 8]), ["unimplemented"]);
    assert_eq!(listing(&[Opcode::FloatCmp as i32]), ["unimplemented"]);
    assert_eq!(listing(&[Opcode::Genarray as i32, 1]), ["unimplemented"]);
}

#[test]
fn markers_emit_nothing() {
    assert!(listing(&[Opcode::Break as i32]).is_empty());
    assert!(listing(&[Opcode::Bounds as i32, 10]).is_empty());
    assert_eq!(listing(&[Opcode::Nop as i32]), ["nop"]);
}

#[test]
fn conditional_jump_without_known_targets() {
    let il = lift_cells(&[Opcode::Jeq as i32, 0x40]);
    insta::assert_snapshot!(il.to_string(), @r"
        0  if (pri == alt) then L0 else L1
    L0:
        1  jump(0x10000040)
    L1:
        2  jump(0x10000008)
    ");
}

#[test]
fn conditional_jump_with_known_targets() {
    let mut il = IlFunction::new();
    let target = il.add_address_label(CODE_SEGMENT + 0x40);
    let next = il.add_address_label(CODE_SEGMENT + 8);
    let code = encode_cells(&[Opcode::Jzer as i32, 0x40]);
    lift(&code, CODE_SEGMENT, CODE_SEGMENT, DATA_SEGMENT, &mut il).expect("lifts");

    assert_eq!(il.len(), 1);
    assert_eq!(
        il.stmts()[0].to_string(),
        format!("if (pri == 0) then {target} else {next}")
    );
}

#[test]
fn conditional_jump_with_known_fallthrough_only() {
    let mut il = IlFunction::new();
    il.add_address_label(CODE_SEGMENT + 8);
    let code = encode_cells(&[Opcode::Jsless as i32, 0x40]);
    lift(&code, CODE_SEGMENT, CODE_SEGMENT, DATA_SEGMENT, &mut il).expect("lifts");

    let stmts: Vec<_> = il.stmts().iter().map(ToString::to_string).collect();
    assert_eq!(stmts, ["if (pri <s alt) then L1 else L0", "jump(0x10000040)"]);
}

#[test]
fn conditional_jump_with_known_target_only() {
    // loop back to a labeled start; the fallthrough leaves the lifted range
    let code = encode_cells(&[Opcode::IncPri as i32, Opcode::Jsless as i32, 0]);
    let mut il = IlFunction::new();
    let top = il.add_address_label(CODE_SEGMENT);
    il.mark_label(top);
    let mut offset = 0;
    while offset < code.len() {
        let address = CODE_SEGMENT + offset as u64;
        offset += lift(&code[offset..], address, CODE_SEGMENT, DATA_SEGMENT, &mut il).expect("lifts");
    }

    insta::assert_snapshot!(il.to_string(), @r"
    L0 @ 0x10000000:
        0  pri = pri + 1
        1  if (pri <s alt) then L0 else L1
    L1:
        2  jump(0x1000000c)
    ");

    let mut m = Machine::new();
    m.set_reg(Reg::Alt, 3);
    assert_eq!(m.run(&il).unwrap(), Exit::Jump(CODE_SEGMENT + 0xc));
    assert_eq!(m.reg(Reg::Pri), 3);

    let mut m = Machine::new();
    m.set_reg(Reg::Pri, 7);
    assert_eq!(m.run(&il).unwrap(), Exit::Jump(CODE_SEGMENT + 0xc));
    assert_eq!(m.reg(Reg::Pri), 8);
}

#[test]
fn jump_prefers_known_label() {
    assert_eq!(listing(&[Opcode::Jump as i32, 0x40]), ["jump(0x10000040)"]);

    let mut il = IlFunction::new();
    il.add_address_label(CODE_SEGMENT + 0x40);
    let code = encode_cells(&[Opcode::Jump as i32, 0x40]);
    lift(&code, CODE_SEGMENT, CODE_SEGMENT, DATA_SEGMENT, &mut il).expect("lifts");
    assert_eq!(il.stmts()[0].to_string(), "goto L0");
}

#[test]
fn case_table_becomes_compare_chain() {
    let il = lift_cells(&[Opcode::CaseTbl as i32, 2, 0x40, 1, 0x10, 5, 0x20]);
    insta::assert_snapshot!(il.to_string(), @r"
        0  if (pri == 1) then L1 else L0
    L1:
        1  jump(0x10000010)
    L0:
        2  if (pri == 5) then L3 else L2
    L3:
        3  jump(0x10000020)
    L2:
        4  jump(0x10000040)
    ");
}

#[test]
fn logical_not_uses_two_assignments() {
    let il = lift_cells(&[Opcode::Not as i32]);
    insta::assert_snapshot!(il.to_string(), @r"
        0  if (pri != 0) then L0 else L1
    L0:
        1  pri = 0
        2  goto L2
    L1:
        3  pri = 1
    L2:
    ");
}

#[test]
fn fill_loops_over_cells() {
    let il = lift_cells(&[Opcode::Fill as i32, 12]);
    insta::assert_snapshot!(il.to_string(), @r"
        0  temp0 = 12
    L0:
        1  temp0 = temp0 - 4
        2  [alt + temp0] = pri
        3  if (temp0 >s 0) then L0 else L1
    L1:
    ");
}

#[test]
fn returns_encoded_length() {
    let code = encode_cells(&[Opcode::CaseTbl as i32, 1, 0, 3, 0, Opcode::Retn as i32]);
    let len = lift(&code, CODE_SEGMENT, CODE_SEGMENT, DATA_SEGMENT, &mut NoopEmitter).unwrap();
    assert_eq!(len, 20);

    let code = encode_cells(&[Opcode::Push5C as i32, 1, 2, 3, 4, 5]);
    let len = lift(&code, CODE_SEGMENT, CODE_SEGMENT, DATA_SEGMENT, &mut NoopEmitter).unwrap();
    assert_eq!(len, 24);
}

#[test]
fn decode_failures_are_reported() {
    let mut sink = NoopEmitter;
    let err = lift(
        &encode_cells(&[Opcode::Lctrl as i32, 0]),
        CODE_SEGMENT,
        CODE_SEGMENT,
        DATA_SEGMENT,
        &mut sink,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LiftError::Decode {
            address: CODE_SEGMENT,
            source: DecodeError::Ungenerated(Opcode::Lctrl),
        }
    ));

    let err = lift(&[0x27, 0, 0, 0], 0x10, 0, 0, &mut sink).unwrap_err();
    assert_eq!(
        err.to_string(),
        "0x10: truncated instruction: needs 8 bytes, 4 available"
    );
}

#[test]
fn noop_emitter_has_no_labels() {
    assert_eq!(NoopEmitter.label_for_address(CODE_SEGMENT), None);
}
