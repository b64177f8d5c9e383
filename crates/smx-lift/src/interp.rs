//! Reference interpreter for lifted IL.
//!
//! Runs one [`IlFunction`] against a sparse little-endian memory. Calls and
//! native calls are recorded, not followed. Unwritten memory reads as zero.

use std::collections::BTreeMap;

use crate::emitter::IlFunction;
use crate::il::{BinOp, Cond, Expr, Label, Reg, Stmt, UnOp};

/// Bounds on a single [`Machine::run`].
#[derive(Clone, Copy, Debug)]
pub struct EvalLimits {
    /// Maximum statements executed (default: 100,000).
    pub(crate) exec_fuel: u32,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self { exec_fuel: 100_000 }
    }
}

impl EvalLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the execution fuel limit.
    pub fn exec_fuel(mut self, fuel: u32) -> Self {
        self.exec_fuel = fuel;
        self
    }

    pub fn get_exec_fuel(&self) -> u32 {
        self.exec_fuel
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("statement {index} has no IL representation")]
    Unimplemented { index: usize },
    #[error("division by zero at statement {index}")]
    DivisionByZero { index: usize },
    #[error("{0} is never placed")]
    UnplacedLabel(Label),
    #[error("execution limit of {0} statements exceeded")]
    ExecFuelExhausted(u32),
}

/// How a run left the function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    Return(u32),
    /// Computed jump to an address outside the function.
    Jump(u64),
    Halt,
    /// Ran past the last statement.
    Fallthrough,
}

/// Effect recorded for `call` and `syscall`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Call { target: u64, sp: u32 },
    /// Native index taken from the top of the stack.
    SystemCall { native: u32, sp: u32 },
}

#[derive(Clone, Debug, Default)]
pub struct Machine {
    regs: BTreeMap<Reg, u32>,
    memory: BTreeMap<u32, u8>,
    effects: Vec<Effect>,
    limits: EvalLimits,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: EvalLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn reg(&self, reg: Reg) -> u32 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }

    pub fn set_reg(&mut self, reg: Reg, value: u32) {
        self.regs.insert(reg, value);
    }

    /// Little-endian read of `size` bytes, zero-extended.
    pub fn read(&self, addr: u32, size: u8) -> u32 {
        (0..u32::from(size)).fold(0, |acc, i| {
            let byte = self.memory.get(&addr.wrapping_add(i)).copied().unwrap_or(0);
            acc | u32::from(byte) << (8 * i)
        })
    }

    pub fn write(&mut self, addr: u32, size: u8, value: u32) {
        for i in 0..u32::from(size) {
            self.memory
                .insert(addr.wrapping_add(i), (value >> (8 * i)) as u8);
        }
    }

    pub fn push(&mut self, value: u32) {
        let sp = self.reg(Reg::Sp).wrapping_sub(4);
        self.set_reg(Reg::Sp, sp);
        self.write(sp, 4, value);
    }

    pub fn pop(&mut self) -> u32 {
        let sp = self.reg(Reg::Sp);
        let value = self.read(sp, 4);
        self.set_reg(Reg::Sp, sp.wrapping_add(4));
        value
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Execute `f` from its first statement.
    pub fn run(&mut self, f: &IlFunction) -> Result<Exit, EvalError> {
        let stmts = f.stmts();
        let mut fuel = self.limits.exec_fuel;
        let mut pc = 0;
        while let Some(stmt) = stmts.get(pc) {
            if fuel == 0 {
                return Err(EvalError::ExecFuelExhausted(self.limits.exec_fuel));
            }
            fuel -= 1;

            let mut next = pc + 1;
            match stmt {
                Stmt::SetReg { size, reg, value } => {
                    let v = self.eval(value, pc)?;
                    self.set_reg(*reg, truncate(v, *size));
                }
                Stmt::Store { size, addr, value } => {
                    let a = self.eval(addr, pc)?;
                    let v = self.eval(value, pc)?;
                    self.write(a, *size, v);
                }
                Stmt::Push(e) => {
                    let v = self.eval(e, pc)?;
                    self.push(v);
                }
                Stmt::Call(e) => {
                    let target = u64::from(self.eval(e, pc)?);
                    let sp = self.reg(Reg::Sp);
                    self.effects.push(Effect::Call { target, sp });
                }
                Stmt::SystemCall => {
                    let sp = self.reg(Reg::Sp);
                    let native = self.read(sp, 4);
                    self.effects.push(Effect::SystemCall { native, sp });
                }
                Stmt::Ret(e) => return Ok(Exit::Return(self.eval(e, pc)?)),
                Stmt::NoReturn => return Ok(Exit::Halt),
                Stmt::Jump(e) => {
                    let target = u64::from(self.eval(e, pc)?);
                    match f.address_label(target) {
                        Some(label) => next = place(f, label)?,
                        None => return Ok(Exit::Jump(target)),
                    }
                }
                Stmt::Goto(label) => next = place(f, *label)?,
                Stmt::If { cond, t, f: el } => {
                    let taken = self.eval(cond, pc)? != 0;
                    next = place(f, if taken { *t } else { *el })?;
                }
                Stmt::Nop => {}
                Stmt::Unimplemented => return Err(EvalError::Unimplemented { index: pc }),
            }
            pc = next;
        }
        Ok(Exit::Fallthrough)
    }

    fn eval(&mut self, expr: &Expr, index: usize) -> Result<u32, EvalError> {
        Ok(match expr {
            Expr::Const(c) => *c as u32,
            Expr::ConstPtr(p) => *p as u32,
            Expr::Reg(r) => self.reg(*r),
            Expr::Load { size, addr } => {
                let a = self.eval(addr, index)?;
                self.read(a, *size)
            }
            Expr::Pop => self.pop(),
            Expr::Binary { op, lhs, rhs } => {
                let l = self.eval(lhs, index)?;
                let r = self.eval(rhs, index)?;
                binary(*op, l, r).ok_or(EvalError::DivisionByZero { index })?
            }
            Expr::Unary { op, arg } => unary(*op, self.eval(arg, index)?),
            Expr::Compare { cond, lhs, rhs } => {
                let l = self.eval(lhs, index)? as i32;
                let r = self.eval(rhs, index)? as i32;
                let holds = match cond {
                    Cond::Eq => l == r,
                    Cond::Ne => l != r,
                    Cond::Slt => l < r,
                    Cond::Sle => l <= r,
                    Cond::Sgt => l > r,
                    Cond::Sge => l >= r,
                };
                u32::from(holds)
            }
        })
    }
}

fn place(f: &IlFunction, label: Label) -> Result<usize, EvalError> {
    f.position(label).ok_or(EvalError::UnplacedLabel(label))
}

fn truncate(value: u32, size: u8) -> u32 {
    match size {
        1 => value & 0xff,
        2 => value & 0xffff,
        _ => value,
    }
}

/// `None` on division by zero.
fn binary(op: BinOp, l: u32, r: u32) -> Option<u32> {
    let (sl, sr) = (l as i32, r as i32);
    let float = |f: fn(f32, f32) -> f32| f(f32::from_bits(l), f32::from_bits(r)).to_bits();
    Some(match op {
        BinOp::Add => l.wrapping_add(r),
        BinOp::Sub => l.wrapping_sub(r),
        BinOp::Mul => l.wrapping_mul(r),
        BinOp::DivS if sr == 0 => return None,
        BinOp::ModS if sr == 0 => return None,
        BinOp::DivS => sl.wrapping_div(sr) as u32,
        BinOp::ModS => sl.wrapping_rem(sr) as u32,
        BinOp::And => l & r,
        BinOp::Or => l | r,
        BinOp::Xor => l ^ r,
        BinOp::Shl => l.wrapping_shl(r),
        BinOp::Lsr => l.wrapping_shr(r),
        BinOp::Asr => sl.wrapping_shr(r) as u32,
        BinOp::FAdd => float(|a, b| a + b),
        BinOp::FSub => float(|a, b| a - b),
        BinOp::FMul => float(|a, b| a * b),
        BinOp::FDiv => float(|a, b| a / b),
    })
}

fn unary(op: UnOp, v: u32) -> u32 {
    let f = f32::from_bits(v);
    match op {
        UnOp::Neg => (v as i32).wrapping_neg() as u32,
        UnOp::Not => !v,
        UnOp::FAbs => f.abs().to_bits(),
        UnOp::IntToFloat => (v as i32 as f32).to_bits(),
        UnOp::RoundToInt => f.round() as i32 as u32,
        UnOp::Floor => f.floor() as i32 as u32,
        UnOp::Ceil => f.ceil() as i32 as u32,
    }
}
