//! Per-instruction lifting.
//!
//! Each instruction becomes a short statement sequence. Operand addresses
//! are relocated here, so emitted IL only carries absolute addresses.

use smx_bytecode::isa::{DecodeError, Instruction, Opcode, relocate};

use crate::emitter::IlEmitter;
use crate::il::{BinOp, Cond, Expr, Reg, Stmt, UnOp};

const CELL: i32 = 4;

#[derive(Debug, thiserror::Error)]
pub enum LiftError {
    #[error("{address:#x}: {source}")]
    Decode {
        address: u64,
        #[source]
        source: DecodeError,
    },
    #[error("{address:#x}: {} has no lifting", .opcode.mnemonic())]
    NotLiftable { address: u64, opcode: Opcode },
    #[error("{0:#x} is outside the code segment")]
    OutsideCode(u64),
}

/// Everything a handler needs about the instruction being lifted.
#[derive(Clone, Copy, Debug)]
pub struct LiftContext<'a> {
    pub insn: Instruction<'a>,
    pub code_base: u64,
    pub data_base: u64,
}

impl<'a> LiftContext<'a> {
    pub fn new(insn: Instruction<'a>, code_base: u64, data_base: u64) -> Self {
        Self {
            insn,
            code_base,
            data_base,
        }
    }

    pub fn address(&self) -> u64 {
        self.insn.address
    }

    /// Address of the next instruction in sequence.
    pub fn fallthrough(&self) -> u64 {
        self.insn.next_address()
    }

    pub fn param(&self, index: usize) -> i32 {
        self.insn.operand(index)
    }

    fn constant(&self, index: usize) -> Expr {
        Expr::Const(self.param(index))
    }

    pub fn code_target(&self, index: usize) -> u64 {
        relocate(self.code_base, self.param(index))
    }

    pub fn data_address(&self, index: usize) -> u64 {
        relocate(self.data_base, self.param(index))
    }

    fn data_ptr(&self, index: usize) -> Expr {
        Expr::ConstPtr(self.data_address(index))
    }

    /// `frm + operand`.
    fn frame(&self, index: usize) -> Expr {
        Expr::add(Expr::reg(Reg::Frm), self.constant(index))
    }

    /// Operand as a `lodb.i`/`strb.i` access width.
    fn width(&self) -> u8 {
        match self.param(0) {
            1 => 1,
            2 => 2,
            _ => 4,
        }
    }
}

/// Lift the instruction at the start of `bytes`, located at `address`.
/// Returns the encoded length consumed.
pub fn lift<E: IlEmitter + ?Sized>(
    bytes: &[u8],
    address: u64,
    code_base: u64,
    data_base: u64,
    il: &mut E,
) -> Result<usize, LiftError> {
    let insn =
        Instruction::decode(bytes, address).map_err(|source| LiftError::Decode { address, source })?;
    let ctx = LiftContext::new(insn, code_base, data_base);
    lift_instruction(&ctx, il)?;
    Ok(insn.len())
}

fn reg(r: Reg) -> Expr {
    Expr::reg(r)
}

const PRI: Reg = Reg::Pri;
const ALT: Reg = Reg::Alt;
const TEMP0: Reg = Reg::Temp(0);
const TEMP1: Reg = Reg::Temp(1);

/// Emit the statements for one decoded instruction.
pub fn lift_instruction<E: IlEmitter + ?Sized>(
    ctx: &LiftContext<'_>,
    il: &mut E,
) -> Result<(), LiftError> {
    use Opcode as Op;

    match ctx.insn.opcode {
        Op::None | Op::Nop => il.emit(Stmt::Nop),
        Op::Break | Op::Endproc | Op::Bounds => {}

        Op::LoadPri => il.emit(Stmt::set(PRI, Expr::load(ctx.data_ptr(0)))),
        Op::LoadAlt => il.emit(Stmt::set(ALT, Expr::load(ctx.data_ptr(0)))),
        Op::LoadSPri => il.emit(Stmt::set(PRI, Expr::load(ctx.frame(0)))),
        Op::LoadSAlt => il.emit(Stmt::set(ALT, Expr::load(ctx.frame(0)))),
        Op::LrefSPri => il.emit(Stmt::set(PRI, Expr::load(Expr::load(ctx.frame(0))))),
        Op::LrefSAlt => il.emit(Stmt::set(ALT, Expr::load(Expr::load(ctx.frame(0))))),
        Op::LoadI => il.emit(Stmt::set(PRI, Expr::load(reg(PRI)))),
        Op::LodbI => {
            let size = ctx.width();
            il.emit(Stmt::SetReg {
                size,
                reg: PRI,
                value: Expr::load_sized(size, reg(PRI)),
            });
        }
        Op::LoadBoth => {
            il.emit(Stmt::set(PRI, Expr::load(ctx.data_ptr(0))));
            il.emit(Stmt::set(ALT, Expr::load(ctx.data_ptr(1))));
        }
        Op::LoadSBoth => {
            il.emit(Stmt::set(PRI, Expr::load(ctx.frame(0))));
            il.emit(Stmt::set(ALT, Expr::load(ctx.frame(1))));
        }

        Op::ConstPri => il.emit(Stmt::set(PRI, ctx.constant(0))),
        Op::ConstAlt => il.emit(Stmt::set(ALT, ctx.constant(0))),
        Op::Const => il.emit(Stmt::store(ctx.data_ptr(0), ctx.constant(1))),
        Op::ConstS => il.emit(Stmt::store(ctx.frame(0), ctx.constant(1))),
        Op::AddrPri => il.emit(Stmt::set(PRI, ctx.frame(0))),
        Op::AddrAlt => il.emit(Stmt::set(ALT, ctx.frame(0))),

        Op::StorPri => il.emit(Stmt::store(ctx.data_ptr(0), reg(PRI))),
        Op::StorAlt => il.emit(Stmt::store(ctx.data_ptr(0), reg(ALT))),
        Op::StorSPri => il.emit(Stmt::store(ctx.frame(0), reg(PRI))),
        Op::StorSAlt => il.emit(Stmt::store(ctx.frame(0), reg(ALT))),
        Op::SrefSPri => il.emit(Stmt::store(Expr::load(ctx.frame(0)), reg(PRI))),
        Op::SrefSAlt => il.emit(Stmt::store(Expr::load(ctx.frame(0)), reg(ALT))),
        Op::StorI => il.emit(Stmt::store(reg(ALT), reg(PRI))),
        Op::StrbI => il.emit(Stmt::Store {
            size: ctx.width(),
            addr: reg(ALT),
            value: reg(PRI),
        }),

        Op::Lidx => il.emit(Stmt::set(PRI, Expr::load(scaled_index(Expr::Const(CELL))))),
        Op::LidxB => il.emit(Stmt::set(PRI, Expr::load(shifted_index(ctx.constant(0))))),
        Op::Idxaddr => il.emit(Stmt::set(PRI, scaled_index(Expr::Const(CELL)))),
        Op::IdxaddrB => il.emit(Stmt::set(PRI, shifted_index(ctx.constant(0)))),

        Op::MovePri => il.emit(Stmt::set(PRI, reg(ALT))),
        Op::MoveAlt => il.emit(Stmt::set(ALT, reg(PRI))),
        Op::Xchg => {
            il.emit(Stmt::set(TEMP0, reg(PRI)));
            il.emit(Stmt::set(PRI, reg(ALT)));
            il.emit(Stmt::set(ALT, reg(TEMP0)));
        }

        Op::PushPri => il.emit(Stmt::Push(reg(PRI))),
        Op::PushAlt => il.emit(Stmt::Push(reg(ALT))),
        Op::PushC | Op::Push2C | Op::Push3C | Op::Push4C | Op::Push5C => {
            push_each(ctx, il, |ctx, i| ctx.constant(i))
        }
        Op::Push | Op::Push2 | Op::Push3 | Op::Push4 | Op::Push5 => {
            push_each(ctx, il, |ctx, i| Expr::load(ctx.data_ptr(i)))
        }
        Op::PushS | Op::Push2S | Op::Push3S | Op::Push4S | Op::Push5S => {
            push_each(ctx, il, |ctx, i| Expr::load(ctx.frame(i)))
        }
        Op::PushAdr | Op::Push2Adr | Op::Push3Adr | Op::Push4Adr | Op::Push5Adr => {
            push_each(ctx, il, |ctx, i| ctx.frame(i))
        }
        Op::PopPri => il.emit(Stmt::set(PRI, Expr::Pop)),
        Op::PopAlt => il.emit(Stmt::set(ALT, Expr::Pop)),
        Op::SwapPri => swap(il, PRI),
        Op::SwapAlt => swap(il, ALT),

        Op::Stack => il.emit(Stmt::set(Reg::Sp, Expr::add(reg(Reg::Sp), ctx.constant(0)))),
        Op::Heap => {
            il.emit(Stmt::set(ALT, reg(Reg::Heap)));
            il.emit(Stmt::set(Reg::Heap, Expr::add(reg(Reg::Heap), ctx.constant(0))));
        }
        Op::TrackerPushC => {
            il.emit(Stmt::store(reg(Reg::Heap), ctx.constant(0)));
            il.emit(Stmt::set(Reg::Heap, Expr::add(reg(Reg::Heap), Expr::Const(CELL))));
        }
        Op::TrackerPopSetheap => {
            il.emit(Stmt::set(Reg::Heap, Expr::sub(reg(Reg::Heap), Expr::Const(CELL))));
            il.emit(Stmt::set(
                Reg::Heap,
                Expr::sub(reg(Reg::Heap), Expr::load(reg(Reg::Heap))),
            ));
        }

        Op::Proc => {
            il.emit(Stmt::Push(reg(Reg::Frm)));
            il.emit(Stmt::Push(reg(Reg::Heap)));
            il.emit(Stmt::set(Reg::Frm, reg(Reg::Sp)));
        }
        Op::Retn => {
            il.emit(Stmt::set(Reg::Heap, Expr::Pop));
            il.emit(Stmt::set(Reg::Frm, Expr::Pop));
            il.emit(Stmt::Ret(Expr::Pop));
        }
        Op::Call => {
            // The argument count sits on top of the stack; the callee leaves
            // the arguments for the caller to drop.
            il.emit(Stmt::set(TEMP1, Expr::Pop));
            il.emit(Stmt::Call(Expr::ConstPtr(ctx.code_target(0))));
            il.emit(Stmt::set(
                Reg::Sp,
                Expr::add(reg(Reg::Sp), Expr::mul(reg(TEMP1), Expr::Const(CELL))),
            ));
        }
        Op::Halt => il.emit(Stmt::NoReturn),
        Op::SysreqC => {
            il.emit(Stmt::Push(ctx.constant(0)));
            il.emit(Stmt::SystemCall);
        }
        Op::SysreqN => {
            il.emit(Stmt::Push(ctx.constant(0)));
            il.emit(Stmt::SystemCall);
            il.emit(Stmt::set(
                Reg::Sp,
                Expr::add(
                    reg(Reg::Sp),
                    Expr::mul(Expr::Const(ctx.param(1).wrapping_add(1)), Expr::Const(CELL)),
                ),
            ));
        }

        Op::Jump | Op::Switch => goto_or_jump(il, ctx.code_target(0)),
        Op::Jzer => jump_cond(ctx, il, Expr::compare(Cond::Eq, reg(PRI), Expr::Const(0))),
        Op::Jnz => jump_cond(ctx, il, Expr::compare(Cond::Ne, reg(PRI), Expr::Const(0))),
        Op::Jeq => jump_cond(ctx, il, compare_pri_alt(Cond::Eq)),
        Op::Jneq => jump_cond(ctx, il, compare_pri_alt(Cond::Ne)),
        Op::Jsless => jump_cond(ctx, il, compare_pri_alt(Cond::Slt)),
        Op::Jsleq => jump_cond(ctx, il, compare_pri_alt(Cond::Sle)),
        Op::Jsgrtr => jump_cond(ctx, il, compare_pri_alt(Cond::Sgt)),
        Op::Jsgeq => jump_cond(ctx, il, compare_pri_alt(Cond::Sge)),
        Op::CaseTbl => case_chain(ctx, il),

        Op::Add => binary(il, PRI, BinOp::Add, reg(PRI), reg(ALT)),
        Op::Sub => binary(il, PRI, BinOp::Sub, reg(PRI), reg(ALT)),
        Op::SubAlt => binary(il, PRI, BinOp::Sub, reg(ALT), reg(PRI)),
        Op::Smul => binary(il, PRI, BinOp::Mul, reg(PRI), reg(ALT)),
        Op::And => binary(il, PRI, BinOp::And, reg(PRI), reg(ALT)),
        Op::Or => binary(il, PRI, BinOp::Or, reg(PRI), reg(ALT)),
        Op::Xor => binary(il, PRI, BinOp::Xor, reg(PRI), reg(ALT)),
        Op::Shl => binary(il, PRI, BinOp::Shl, reg(PRI), reg(ALT)),
        Op::Shr => binary(il, PRI, BinOp::Lsr, reg(PRI), reg(ALT)),
        Op::Sshr => binary(il, PRI, BinOp::Asr, reg(PRI), reg(ALT)),
        Op::AddC => binary(il, PRI, BinOp::Add, reg(PRI), ctx.constant(0)),
        Op::SmulC => binary(il, PRI, BinOp::Mul, reg(PRI), ctx.constant(0)),
        Op::ShlCPri => binary(il, PRI, BinOp::Shl, reg(PRI), ctx.constant(0)),
        Op::ShlCAlt => binary(il, ALT, BinOp::Shl, reg(ALT), ctx.constant(0)),
        Op::ShrCPri => binary(il, PRI, BinOp::Lsr, reg(PRI), ctx.constant(0)),
        Op::ShrCAlt => binary(il, ALT, BinOp::Lsr, reg(ALT), ctx.constant(0)),
        Op::Sdiv => divide(il, PRI, ALT),
        Op::SdivAlt => divide(il, ALT, PRI),
        Op::Neg => il.emit(Stmt::set(PRI, Expr::unary(UnOp::Neg, reg(PRI)))),
        Op::Invert => il.emit(Stmt::set(PRI, Expr::unary(UnOp::Not, reg(PRI)))),
        Op::Not => logical_not(il),
        Op::StradjustPri => il.emit(Stmt::set(
            PRI,
            Expr::binary(
                BinOp::Asr,
                Expr::add(reg(PRI), Expr::Const(CELL)),
                Expr::Const(2),
            ),
        )),

        Op::ZeroPri => il.emit(Stmt::set(PRI, Expr::Const(0))),
        Op::ZeroAlt => il.emit(Stmt::set(ALT, Expr::Const(0))),
        Op::Zero => il.emit(Stmt::store(ctx.data_ptr(0), Expr::Const(0))),
        Op::ZeroS => il.emit(Stmt::store(ctx.frame(0), Expr::Const(0))),

        Op::Eq => il.emit(Stmt::set(PRI, compare_pri_alt(Cond::Eq))),
        Op::Neq => il.emit(Stmt::set(PRI, compare_pri_alt(Cond::Ne))),
        Op::Sless => il.emit(Stmt::set(PRI, compare_pri_alt(Cond::Slt))),
        Op::Sleq => il.emit(Stmt::set(PRI, compare_pri_alt(Cond::Sle))),
        Op::Sgrtr => il.emit(Stmt::set(PRI, compare_pri_alt(Cond::Sgt))),
        Op::Sgeq => il.emit(Stmt::set(PRI, compare_pri_alt(Cond::Sge))),
        Op::EqCPri => il.emit(Stmt::set(
            PRI,
            Expr::compare(Cond::Eq, reg(PRI), ctx.constant(0)),
        )),
        Op::EqCAlt => il.emit(Stmt::set(
            PRI,
            Expr::compare(Cond::Eq, reg(ALT), ctx.constant(0)),
        )),

        Op::IncPri => binary(il, PRI, BinOp::Add, reg(PRI), Expr::Const(1)),
        Op::IncAlt => binary(il, ALT, BinOp::Add, reg(ALT), Expr::Const(1)),
        Op::DecPri => binary(il, PRI, BinOp::Sub, reg(PRI), Expr::Const(1)),
        Op::DecAlt => binary(il, ALT, BinOp::Sub, reg(ALT), Expr::Const(1)),
        Op::Inc => step_memory(il, ctx.data_ptr(0), BinOp::Add),
        Op::Dec => step_memory(il, ctx.data_ptr(0), BinOp::Sub),
        Op::IncS => step_memory(il, ctx.frame(0), BinOp::Add),
        Op::DecS => step_memory(il, ctx.frame(0), BinOp::Sub),
        Op::IncI => step_memory(il, reg(PRI), BinOp::Add),
        Op::DecI => step_memory(il, reg(PRI), BinOp::Sub),

        Op::Fill => fill(ctx, il),

        Op::Fabs => float_unary(il, UnOp::FAbs),
        Op::Float => float_unary(il, UnOp::IntToFloat),
        Op::RndToNearest => float_unary(il, UnOp::RoundToInt),
        Op::RndToFloor => float_unary(il, UnOp::Floor),
        Op::RndToCeil => float_unary(il, UnOp::Ceil),
        Op::FloatAdd => float_binary(il, BinOp::FAdd),
        Op::FloatSub => float_binary(il, BinOp::FSub),
        Op::FloatMul => float_binary(il, BinOp::FMul),
        Op::FloatDiv => float_binary(il, BinOp::FDiv),

        Op::Movs
        | Op::Genarray
        | Op::GenarrayZ
        | Op::Rebase
        | Op::InitarrayPri
        | Op::InitarrayAlt
        | Op::HeapSave
        | Op::HeapRestore
        | Op::RndToZero
        | Op::FloatCmp
        | Op::FloatGt
        | Op::FloatGe
        | Op::FloatLt
        | Op::FloatLe
        | Op::FloatNe
        | Op::FloatEq
        | Op::FloatNot => il.emit(Stmt::Unimplemented),

        op @ (Op::LrefPri
        | Op::LrefAlt
        | Op::SrefPri
        | Op::SrefAlt
        | Op::AlignPri
        | Op::AlignAlt
        | Op::Lctrl
        | Op::Sctrl
        | Op::PushR
        | Op::Ret
        | Op::CallPri
        | Op::Jrel
        | Op::Jless
        | Op::Jleq
        | Op::Jgrtr
        | Op::Jgeq
        | Op::Umul
        | Op::Udiv
        | Op::UdivAlt
        | Op::SignPri
        | Op::SignAlt
        | Op::Less
        | Op::Leq
        | Op::Grtr
        | Op::Geq
        | Op::Cmps
        | Op::SysreqPri
        | Op::File
        | Op::Line
        | Op::Symbol
        | Op::Srange
        | Op::JumpPri
        | Op::Symtag
        | Op::SysreqD
        | Op::SysreqNd
        | Op::Stackadjust
        | Op::LdgfnPri
        | Op::FirstFake
        | Op::Case) => {
            return Err(LiftError::NotLiftable {
                address: ctx.address(),
                opcode: op,
            });
        }
    }
    Ok(())
}

fn compare_pri_alt(cond: Cond) -> Expr {
    Expr::compare(cond, reg(PRI), reg(ALT))
}

/// `alt + pri * scale`.
fn scaled_index(scale: Expr) -> Expr {
    Expr::add(reg(ALT), Expr::mul(reg(PRI), scale))
}

/// `alt + (pri << shift)`.
fn shifted_index(shift: Expr) -> Expr {
    Expr::add(reg(ALT), Expr::binary(BinOp::Shl, reg(PRI), shift))
}

fn binary<E: IlEmitter + ?Sized>(il: &mut E, dest: Reg, op: BinOp, lhs: Expr, rhs: Expr) {
    il.emit(Stmt::set(dest, Expr::binary(op, lhs, rhs)));
}

fn push_each<E: IlEmitter + ?Sized>(
    ctx: &LiftContext<'_>,
    il: &mut E,
    operand: impl Fn(&LiftContext<'_>, usize) -> Expr,
) {
    for i in 0..ctx.insn.opcode.operands().len() {
        il.emit(Stmt::Push(operand(ctx, i)));
    }
}

fn swap<E: IlEmitter + ?Sized>(il: &mut E, r: Reg) {
    il.emit(Stmt::set(TEMP0, reg(r)));
    il.emit(Stmt::set(r, Expr::Pop));
    il.emit(Stmt::Push(reg(TEMP0)));
}

/// Quotient of `dividend / divisor` to `pri`, remainder to `alt`.
fn divide<E: IlEmitter + ?Sized>(il: &mut E, dividend: Reg, divisor: Reg) {
    il.emit(Stmt::set(
        TEMP0,
        Expr::binary(BinOp::DivS, reg(dividend), reg(divisor)),
    ));
    il.emit(Stmt::set(
        ALT,
        Expr::binary(BinOp::ModS, reg(dividend), reg(divisor)),
    ));
    il.emit(Stmt::set(PRI, reg(TEMP0)));
}

/// `pri = pri == 0 ? 1 : 0` as two assignments.
fn logical_not<E: IlEmitter + ?Sized>(il: &mut E) {
    let nonzero = il.new_label();
    let zero = il.new_label();
    let done = il.new_label();
    il.emit(Stmt::If {
        cond: Expr::compare(Cond::Ne, reg(PRI), Expr::Const(0)),
        t: nonzero,
        f: zero,
    });
    il.mark_label(nonzero);
    il.emit(Stmt::set(PRI, Expr::Const(0)));
    il.emit(Stmt::Goto(done));
    il.mark_label(zero);
    il.emit(Stmt::set(PRI, Expr::Const(1)));
    il.mark_label(done);
}

fn step_memory<E: IlEmitter + ?Sized>(il: &mut E, addr: Expr, op: BinOp) {
    let value = Expr::binary(op, Expr::load(addr.clone()), Expr::Const(1));
    il.emit(Stmt::store(addr, value));
}

fn float_unary<E: IlEmitter + ?Sized>(il: &mut E, op: UnOp) {
    il.emit(Stmt::set(PRI, Expr::Pop));
    il.emit(Stmt::set(PRI, Expr::unary(op, reg(PRI))));
}

/// First pop is the left operand.
fn float_binary<E: IlEmitter + ?Sized>(il: &mut E, op: BinOp) {
    il.emit(Stmt::set(TEMP0, Expr::Pop));
    il.emit(Stmt::set(TEMP1, Expr::Pop));
    il.emit(Stmt::set(PRI, Expr::binary(op, reg(TEMP0), reg(TEMP1))));
}

fn goto_or_jump<E: IlEmitter + ?Sized>(il: &mut E, target: u64) {
    match il.label_for_address(target) {
        Some(label) => il.emit(Stmt::Goto(label)),
        None => il.emit(Stmt::Jump(Expr::ConstPtr(target))),
    }
}

/// Two-way branch to the operand target or the next instruction.
///
/// Whichever side has no known label gets a fresh one followed by a
/// computed jump.
fn jump_cond<E: IlEmitter + ?Sized>(ctx: &LiftContext<'_>, il: &mut E, cond: Expr) {
    let target = ctx.code_target(0);
    let fallthrough = ctx.fallthrough();
    match (il.label_for_address(target), il.label_for_address(fallthrough)) {
        (Some(t), Some(f)) => il.emit(Stmt::If { cond, t, f }),
        (Some(t), None) => {
            let f = il.new_label();
            il.emit(Stmt::If { cond, t, f });
            il.mark_label(f);
            il.emit(Stmt::Jump(Expr::ConstPtr(fallthrough)));
        }
        (None, Some(f)) => {
            let t = il.new_label();
            il.emit(Stmt::If { cond, t, f });
            il.mark_label(t);
            il.emit(Stmt::Jump(Expr::ConstPtr(target)));
        }
        (None, None) => {
            let t = il.new_label();
            let f = il.new_label();
            il.emit(Stmt::If { cond, t, f });
            il.mark_label(t);
            il.emit(Stmt::Jump(Expr::ConstPtr(target)));
            il.mark_label(f);
            il.emit(Stmt::Jump(Expr::ConstPtr(fallthrough)));
        }
    }
}

/// Branch to `target` when `cond` holds, otherwise continue with the next
/// emitted statement.
fn branch_if<E: IlEmitter + ?Sized>(il: &mut E, cond: Expr, target: u64) {
    let next = il.new_label();
    match il.label_for_address(target) {
        Some(t) => il.emit(Stmt::If { cond, t, f: next }),
        None => {
            let t = il.new_label();
            il.emit(Stmt::If { cond, t, f: next });
            il.mark_label(t);
            il.emit(Stmt::Jump(Expr::ConstPtr(target)));
        }
    }
    il.mark_label(next);
}

/// `casetbl` as a compare chain on `pri`, falling back to the default.
fn case_chain<E: IlEmitter + ?Sized>(ctx: &LiftContext<'_>, il: &mut E) {
    let Some((default, cases)) = ctx.insn.case_table() else {
        return;
    };
    for case in &cases {
        branch_if(
            il,
            Expr::compare(Cond::Eq, reg(PRI), Expr::Const(case.value)),
            relocate(ctx.code_base, case.target),
        );
    }
    goto_or_jump(il, relocate(ctx.code_base, default));
}

/// Store `pri` into each cell of `[alt, alt + size)`, last cell first.
fn fill<E: IlEmitter + ?Sized>(ctx: &LiftContext<'_>, il: &mut E) {
    let size = ctx.param(0);
    if size <= 0 {
        il.emit(Stmt::Nop);
        return;
    }
    let body = il.new_label();
    let done = il.new_label();
    il.emit(Stmt::set(TEMP0, Expr::Const(size)));
    il.mark_label(body);
    il.emit(Stmt::set(TEMP0, Expr::sub(reg(TEMP0), Expr::Const(CELL))));
    il.emit(Stmt::store(Expr::add(reg(ALT), reg(TEMP0)), reg(PRI)));
    il.emit(Stmt::If {
        cond: Expr::compare(Cond::Sgt, reg(TEMP0), Expr::Const(0)),
        t: body,
        f: done,
    });
    il.mark_label(done);
}
