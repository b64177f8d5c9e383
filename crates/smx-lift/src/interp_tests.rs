//! Tests for the IL interpreter.

use smx_bytecode::constants::{CODE_SEGMENT, DATA_SEGMENT};
use smx_bytecode::format::encode_cells;
use smx_bytecode::isa::Opcode;

use crate::emitter::IlFunction;
use crate::il::Reg;
use crate::interp::{Effect, EvalError, EvalLimits, Exit, Machine};
use crate::lifter::lift;

const STACK_TOP: u32 = 0x1000;

fn lift_cells(cells: &[i32]) -> IlFunction {
    let code = encode_cells(cells);
    let mut il = IlFunction::new();
    let mut offset = 0;
    while offset < code.len() {
        let address = CODE_SEGMENT + offset as u64;
        offset += lift(&code[offset..], address, CODE_SEGMENT, DATA_SEGMENT, &mut il).expect("lifts");
    }
    il
}

fn machine() -> Machine {
    let mut m = Machine::new();
    m.set_reg(Reg::Sp, STACK_TOP);
    m
}

fn float(v: f32) -> u32 {
    v.to_bits()
}

#[test]
fn call_drops_counted_arguments() {
    for n in [0u32, 1, 5] {
        let mut m = machine();
        m.push(n);
        let exit = m.run(&lift_cells(&[Opcode::Call as i32, 0x20])).unwrap();

        assert_eq!(exit, Exit::Fallthrough);
        assert_eq!(
            m.effects(),
            [Effect::Call {
                target: CODE_SEGMENT + 0x20,
                sp: STACK_TOP,
            }]
        );
        assert_eq!(m.reg(Reg::Sp), STACK_TOP + n * 4, "n = {n}");
    }
}

#[test]
fn native_call_sees_index_and_drops_arguments() {
    let mut m = machine();
    m.run(&lift_cells(&[Opcode::SysreqN as i32, 3, 2])).unwrap();

    assert_eq!(
        m.effects(),
        [Effect::SystemCall {
            native: 3,
            sp: STACK_TOP - 4,
        }]
    );
    assert_eq!(m.reg(Reg::Sp), STACK_TOP + 8);
}

#[test]
fn frame_round_trip() {
    let mut m = machine();
    m.set_reg(Reg::Frm, 0x55);
    m.set_reg(Reg::Heap, 0x77);
    m.push(0x99);

    let exit = m.run(&lift_cells(&[Opcode::Proc as i32, Opcode::Retn as i32])).unwrap();

    assert_eq!(exit, Exit::Return(0x99));
    assert_eq!(m.reg(Reg::Frm), 0x55);
    assert_eq!(m.reg(Reg::Heap), 0x77);
    assert_eq!(m.reg(Reg::Sp), STACK_TOP);
}

#[test]
fn signed_division_truncates_toward_zero() {
    let cases = [(-7, 2, -3, -1), (7, -2, -3, 1), (-7, -2, 3, -1), (i32::MIN, -1, i32::MIN, 0)];
    for (dividend, divisor, quotient, remainder) in cases {
        let mut m = machine();
        m.set_reg(Reg::Pri, dividend as u32);
        m.set_reg(Reg::Alt, divisor as u32);
        m.run(&lift_cells(&[Opcode::Sdiv as i32])).unwrap();
        assert_eq!(m.reg(Reg::Pri) as i32, quotient, "{dividend} / {divisor}");
        assert_eq!(m.reg(Reg::Alt) as i32, remainder, "{dividend} % {divisor}");
    }

    let mut m = machine();
    m.set_reg(Reg::Pri, 2);
    m.set_reg(Reg::Alt, -7i32 as u32);
    m.run(&lift_cells(&[Opcode::SdivAlt as i32])).unwrap();
    assert_eq!(m.reg(Reg::Pri) as i32, -3);
    assert_eq!(m.reg(Reg::Alt) as i32, -1);
}

#[test]
fn division_by_zero_is_an_error() {
    let mut m = machine();
    m.set_reg(Reg::Pri, 1);
    let err = m.run(&lift_cells(&[Opcode::Sdiv as i32])).unwrap_err();
    assert_eq!(err, EvalError::DivisionByZero { index: 0 });
}

#[test]
fn logical_not_normalizes() {
    for (input, expected) in [(0, 1), (1, 0), (5, 0), (u32::MAX, 0)] {
        let mut m = machine();
        m.set_reg(Reg::Pri, input);
        let exit = m.run(&lift_cells(&[Opcode::Not as i32])).unwrap();
        assert_eq!(exit, Exit::Fallthrough);
        assert_eq!(m.reg(Reg::Pri), expected, "!{input}");
    }
}

#[test]
fn conditional_jump_takes_either_side() {
    let il = lift_cells(&[Opcode::Jsless as i32, 0x40]);

    let mut m = machine();
    m.set_reg(Reg::Pri, -1i32 as u32);
    m.set_reg(Reg::Alt, 1);
    assert_eq!(m.run(&il).unwrap(), Exit::Jump(CODE_SEGMENT + 0x40));

    let mut m = machine();
    m.set_reg(Reg::Pri, 1);
    m.set_reg(Reg::Alt, 1);
    assert_eq!(m.run(&il).unwrap(), Exit::Jump(CODE_SEGMENT + 8));
}

#[test]
fn case_table_dispatch() {
    let il = lift_cells(&[Opcode::CaseTbl as i32, 2, 0x40, 1, 0x10, 5, 0x20]);
    for (pri, target) in [(1, 0x10), (5, 0x20), (9, 0x40), (0, 0x40)] {
        let mut m = machine();
        m.set_reg(Reg::Pri, pri);
        assert_eq!(m.run(&il).unwrap(), Exit::Jump(CODE_SEGMENT + target), "pri = {pri}");
    }
}

#[test]
fn fill_writes_every_cell() {
    let mut m = machine();
    m.set_reg(Reg::Alt, 0x100);
    m.set_reg(Reg::Pri, 7);
    m.run(&lift_cells(&[Opcode::Fill as i32, 12])).unwrap();

    assert_eq!(m.read(0x100, 4), 7);
    assert_eq!(m.read(0x104, 4), 7);
    assert_eq!(m.read(0x108, 4), 7);
    assert_eq!(m.read(0x10c, 4), 0);
    assert_eq!(m.read(0xfc, 4), 0);
}

#[test]
fn sized_loads_and_stores() {
    let mut m = machine();
    m.write(0x100, 4, 0x1122_3344);
    m.set_reg(Reg::Pri, 0x100);
    m.run(&lift_cells(&[Opcode::LodbI as i32, 1])).unwrap();
    assert_eq!(m.reg(Reg::Pri), 0x44);

    let mut m = machine();
    m.set_reg(Reg::Alt, 0x200);
    m.set_reg(Reg::Pri, 0xaabb_ccdd);
    m.run(&lift_cells(&[Opcode::StrbI as i32, 2])).unwrap();
    assert_eq!(m.read(0x200, 4), 0xccdd);
}

#[test]
fn data_accesses_use_absolute_addresses() {
    let mut m = machine();
    m.run(&lift_cells(&[Opcode::Const as i32, 8, 42, Opcode::LoadPri as i32, 8]))
        .unwrap();
    assert_eq!(m.read(DATA_SEGMENT as u32 + 8, 4), 42);
    assert_eq!(m.reg(Reg::Pri), 42);
}

#[test]
fn heap_tracker_push_and_pop() {
    let mut m = machine();
    m.set_reg(Reg::Heap, 0x200);
    m.run(&lift_cells(&[Opcode::TrackerPushC as i32, 16])).unwrap();
    assert_eq!(m.read(0x200, 4), 16);
    assert_eq!(m.reg(Reg::Heap), 0x204);

    m.run(&lift_cells(&[Opcode::TrackerPopSetheap as i32])).unwrap();
    assert_eq!(m.reg(Reg::Heap), 0x200 - 16);
}

#[test]
fn swap_exchanges_register_and_stack_top() {
    let mut m = machine();
    m.push(11);
    m.set_reg(Reg::Pri, 22);
    m.run(&lift_cells(&[Opcode::SwapPri as i32])).unwrap();
    assert_eq!(m.reg(Reg::Pri), 11);
    assert_eq!(m.pop(), 22);
    assert_eq!(m.reg(Reg::Sp), STACK_TOP);
}

#[test]
fn float_arithmetic_pops_left_operand_first() {
    let mut m = machine();
    m.push(float(2.0));
    m.push(float(6.0));
    m.run(&lift_cells(&[Opcode::FloatDiv as i32])).unwrap();
    assert_eq!(f32::from_bits(m.reg(Reg::Pri)), 3.0);
    assert_eq!(m.reg(Reg::Sp), STACK_TOP);
}

#[test]
fn float_rounding() {
    let cases = [
        (Opcode::RndToNearest, 2.5, 3),
        (Opcode::RndToFloor, -1.5, -2),
        (Opcode::RndToCeil, 1.25, 2),
    ];
    for (op, input, expected) in cases {
        let mut m = machine();
        m.push(float(input));
        m.run(&lift_cells(&[op as i32])).unwrap();
        assert_eq!(m.reg(Reg::Pri) as i32, expected, "{op:?}({input})");
    }

    let mut m = machine();
    m.push(-3i32 as u32);
    m.run(&lift_cells(&[Opcode::Float as i32])).unwrap();
    assert_eq!(f32::from_bits(m.reg(Reg::Pri)), -3.0);
}

#[test]
fn halt_and_unimplemented() {
    let mut m = machine();
    assert_eq!(m.run(&lift_cells(&[Opcode::Halt as i32, 0])).unwrap(), Exit::Halt);

    let mut m = machine();
    let err = m.run(&lift_cells(&[Opcode::Nop as i32, Opcode::Movs as i32, 4])).unwrap_err();
    assert_eq!(err, EvalError::Unimplemented { index: 1 });
}

#[test]
fn fuel_bounds_execution() {
    let mut m = Machine::with_limits(EvalLimits::new().exec_fuel(10));
    m.set_reg(Reg::Alt, 0x100);
    let err = m.run(&lift_cells(&[Opcode::Fill as i32, 400])).unwrap_err();
    assert_eq!(err, EvalError::ExecFuelExhausted(10));
    assert_eq!(EvalLimits::default().get_exec_fuel(), 100_000);
}
