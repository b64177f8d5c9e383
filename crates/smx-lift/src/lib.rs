#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Lifting SourcePawn instructions into a register-transfer IL.
//!
//! - [`il`]: registers, expressions and statements
//! - [`emitter`]: the sink the lifter writes into
//! - [`lifter`]: per-instruction lifting
//! - [`function`]: whole-function lifting with address labels
//! - [`interp`]: a reference interpreter for lifted functions

pub mod emitter;
pub mod function;
pub mod il;
pub mod interp;
pub mod lifter;

#[cfg(test)]
mod interp_tests;
#[cfg(test)]
mod lifter_tests;

pub use emitter::{IlEmitter, IlFunction, NoopEmitter};
pub use function::lift_function;
pub use il::{BinOp, Cond, Expr, Label, Reg, Stmt, UnOp};
pub use interp::{Effect, EvalError, EvalLimits, Exit, Machine};
pub use lifter::{LiftContext, LiftError, lift, lift_instruction};
