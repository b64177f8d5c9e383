#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared primitives for the SMX toolkit.
//!
//! - [`ByteReader`]: bounds-checked little-endian cursor over a byte slice
//! - [`Colors`]: ANSI palette used by the dump and CLI listings

mod colors;
mod reader;

#[cfg(test)]
mod reader_tests;

pub use colors::Colors;
pub use reader::{ByteReader, ReadError, read_cstr, read_u32_le};
