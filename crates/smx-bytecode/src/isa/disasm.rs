//! Instruction text rendering.

use std::fmt;

use super::decode::{DecodeError, Instruction};
use super::opcodes::OperandKind;

/// Kind of a display token, mirroring what a host listing distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Mnemonic,
    Text,
    Integer,
    PossibleAddress,
    OperandSeparator,
}

/// One display token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Numeric value behind integer and address tokens.
    pub value: Option<i64>,
}

impl Token {
    fn text(kind: TokenKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            value: None,
        }
    }

    fn number(kind: TokenKind, text: String, value: i64) -> Self {
        Self {
            kind,
            text,
            value: Some(value),
        }
    }
}

/// Concatenated token text.
pub struct TokenText<'a>(pub &'a [Token]);

impl fmt::Display for TokenText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in self.0 {
            f.write_str(&token.text)?;
        }
        Ok(())
    }
}

/// Hex text of a signed value: `0x1f`, `-0x4`.
pub fn hex(value: i64) -> String {
    if value < 0 {
        format!("-{:#x}", value.unsigned_abs())
    } else {
        format!("{value:#x}")
    }
}

/// Absolute address of a relative operand.
pub fn relocate(base: u64, raw: i32) -> u64 {
    base.wrapping_add_signed(i64::from(raw))
}

/// Render one operand cell.
pub fn render_operand(kind: OperandKind, raw: i32, code_base: u64, data_base: u64) -> Token {
    match kind {
        OperandKind::Constant => {
            Token::number(TokenKind::Integer, raw.to_string(), i64::from(raw))
        }
        OperandKind::StackOffset | OperandKind::NativeIndex => {
            Token::number(TokenKind::Integer, hex(i64::from(raw)), i64::from(raw))
        }
        OperandKind::JumpTarget | OperandKind::FunctionTarget => {
            let addr = relocate(code_base, raw);
            Token::number(TokenKind::PossibleAddress, format!("{addr:#x}"), addr as i64)
        }
        OperandKind::DataAddress => {
            let addr = relocate(data_base, raw);
            Token::number(TokenKind::PossibleAddress, format!("{addr:#x}"), addr as i64)
        }
    }
}

/// Tokens for an already decoded instruction.
pub fn tokens(insn: &Instruction<'_>, code_base: u64, data_base: u64) -> Vec<Token> {
    let mut out = vec![Token::text(TokenKind::Mnemonic, insn.opcode.mnemonic())];
    let kinds = insn.operand_kinds();
    if kinds.is_empty() {
        return out;
    }
    out.push(Token::text(TokenKind::Text, " "));
    for (i, (kind, raw)) in insn.operands().enumerate() {
        if i > 0 {
            out.push(Token::text(TokenKind::OperandSeparator, ","));
            out.push(Token::text(TokenKind::Text, " "));
        }
        out.push(render_operand(kind, raw, code_base, data_base));
    }
    out
}

/// Disassemble the instruction at the start of `bytes`.
///
/// Returns the display tokens and the instruction length in bytes.
pub fn disassemble(
    bytes: &[u8],
    address: u64,
    code_base: u64,
    data_base: u64,
) -> Result<(Vec<Token>, usize), DecodeError> {
    let insn = Instruction::decode(bytes, address)?;
    Ok((tokens(&insn, code_base, data_base), insn.len()))
}

/// Disassemble to a single line of text.
pub fn disassemble_text(
    bytes: &[u8],
    address: u64,
    code_base: u64,
    data_base: u64,
) -> Result<(String, usize), DecodeError> {
    let (tokens, len) = disassemble(bytes, address, code_base, data_base)?;
    Ok((TokenText(&tokens).to_string(), len))
}
