//! Register-transfer IL.
//!
//! Every value is one 4-byte cell unless a statement says otherwise. `Pop`
//! is the only expression with a side effect; operands evaluate left to
//! right.

use std::fmt;

/// Machine registers. `frm` and `heap` are independent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reg {
    Pri,
    Alt,
    Sp,
    Frm,
    Heap,
    /// Scratch register hidden from argument analysis.
    Temp(u8),
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pri => f.write_str("pri"),
            Self::Alt => f.write_str("alt"),
            Self::Sp => f.write_str("sp"),
            Self::Frm => f.write_str("frm"),
            Self::Heap => f.write_str("heap"),
            Self::Temp(n) => write!(f, "temp{n}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    DivS,
    ModS,
    And,
    Or,
    Xor,
    Shl,
    /// Logical shift right.
    Lsr,
    /// Arithmetic shift right.
    Asr,
    FAdd,
    FSub,
    FMul,
    FDiv,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::DivS => "/s",
            Self::ModS => "%s",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::Lsr => ">>u",
            Self::Asr => ">>s",
            Self::FAdd => "f+",
            Self::FSub => "f-",
            Self::FMul => "f*",
            Self::FDiv => "f/",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    /// Bitwise complement.
    Not,
    FAbs,
    IntToFloat,
    RoundToInt,
    Floor,
    Ceil,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cond {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl Cond {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Slt => "<s",
            Self::Sle => "<=s",
            Self::Sgt => ">s",
            Self::Sge => ">=s",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Const(i32),
    /// Absolute address.
    ConstPtr(u64),
    Reg(Reg),
    Load { size: u8, addr: Box<Expr> },
    /// Read the cell at `sp`, then move `sp` up one cell.
    Pop,
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary { op: UnOp, arg: Box<Expr> },
    /// 1 when the comparison holds, else 0.
    Compare {
        cond: Cond,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn reg(reg: Reg) -> Self {
        Self::Reg(reg)
    }

    pub fn load(addr: Expr) -> Self {
        Self::load_sized(4, addr)
    }

    pub fn load_sized(size: u8, addr: Expr) -> Self {
        Self::Load {
            size,
            addr: Box::new(addr),
        }
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinOp::Add, lhs, rhs)
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinOp::Sub, lhs, rhs)
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinOp::Mul, lhs, rhs)
    }

    pub fn unary(op: UnOp, arg: Expr) -> Self {
        Self::Unary {
            op,
            arg: Box::new(arg),
        }
    }

    pub fn compare(cond: Cond, lhs: Expr, rhs: Expr) -> Self {
        Self::Compare {
            cond,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Self::Binary { .. } | Self::Compare { .. })
    }
}

/// Nested compound operands are parenthesized.
struct Operand<'a>(&'a Expr);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_compound() {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

fn size_suffix(size: u8) -> String {
    if size == 4 {
        String::new()
    } else {
        format!(":{size}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(c) => write!(f, "{c}"),
            Self::ConstPtr(p) => write!(f, "{p:#x}"),
            Self::Reg(r) => write!(f, "{r}"),
            Self::Load { size, addr } => write!(f, "[{addr}]{}", size_suffix(*size)),
            Self::Pop => f.write_str("pop"),
            Self::Binary { op, lhs, rhs } => {
                write!(f, "{} {} {}", Operand(lhs), op.symbol(), Operand(rhs))
            }
            Self::Unary { op, arg } => match op {
                UnOp::Neg => write!(f, "-{}", Operand(arg)),
                UnOp::Not => write!(f, "~{}", Operand(arg)),
                UnOp::FAbs => write!(f, "fabs({arg})"),
                UnOp::IntToFloat => write!(f, "float({arg})"),
                UnOp::RoundToInt => write!(f, "round({arg})"),
                UnOp::Floor => write!(f, "floor({arg})"),
                UnOp::Ceil => write!(f, "ceil({arg})"),
            },
            Self::Compare { cond, lhs, rhs } => {
                write!(f, "{} {} {}", Operand(lhs), cond.symbol(), Operand(rhs))
            }
        }
    }
}

/// Function-local label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    SetReg { size: u8, reg: Reg, value: Expr },
    Store { size: u8, addr: Expr, value: Expr },
    /// Move `sp` down one cell, then write the cell at `sp`.
    Push(Expr),
    Call(Expr),
    Ret(Expr),
    Jump(Expr),
    Goto(Label),
    If { cond: Expr, t: Label, f: Label },
    /// Native call; the native index is on top of the stack.
    SystemCall,
    NoReturn,
    Nop,
    /// Operation with no IL representation.
    Unimplemented,
}

impl Stmt {
    pub fn set(reg: Reg, value: Expr) -> Self {
        Self::SetReg {
            size: 4,
            reg,
            value,
        }
    }

    pub fn store(addr: Expr, value: Expr) -> Self {
        Self::Store {
            size: 4,
            addr,
            value,
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetReg { size, reg, value } => {
                write!(f, "{reg}{} = {value}", size_suffix(*size))
            }
            Self::Store { size, addr, value } => {
                write!(f, "[{addr}]{} = {value}", size_suffix(*size))
            }
            Self::Push(e) => write!(f, "push({e})"),
            Self::Call(e) => write!(f, "call({e})"),
            Self::Ret(e) => write!(f, "return({e})"),
            Self::Jump(e) => write!(f, "jump({e})"),
            Self::Goto(l) => write!(f, "goto {l}"),
            Self::If { cond, t, f: el } => write!(f, "if ({cond}) then {t} else {el}"),
            Self::SystemCall => f.write_str("syscall"),
            Self::NoReturn => f.write_str("noreturn"),
            Self::Nop => f.write_str("nop"),
            Self::Unimplemented => f.write_str("unimplemented"),
        }
    }
}
