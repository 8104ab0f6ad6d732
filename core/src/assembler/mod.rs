//! Line-oriented assembler.
//!
//! Accepts the listing printed by `Program`'s `Display` impl, so a program
//! can be disassembled, edited by hand and assembled again.
//!
//! ```text
//! # count down from 3
//!         PUSH 3
//! loop:   PUSH 1
//!         SUB
//!         STORE 0
//!         LOAD 0
//!         JZ done
//!         LOAD 0
//!         JMP loop
//! done:   RET
//! ```
//!
//! - one instruction per line; `#` or `;` starts a comment
//! - mnemonics are case-insensitive, labels are not
//! - operands are separated by whitespace or commas and are decimal or `0x`
//!   hex bytes; `JMP`, `JZ` and `CALL` also accept a label
//! - `.byte b...` emits raw bytes

mod error;

#[cfg(test)]
mod assembler_test;

pub use error::{AssembleError, AssembleErrorKind, Span};

use hashbrown::HashMap;
use tracing::debug;

use crate::{
    ToString, Vec,
    vm::{Opcode, Program},
};

const BYTE_DIRECTIVE: &str = ".byte";

/// Assemble `source` into a program.
///
/// Stops at the first error.
pub fn assemble(source: &str) -> Result<Program, AssembleError> {
    let mut assembler = Assembler::default();
    for (offset, line) in lines(source) {
        assembler.line(line, offset)?;
    }
    let program = assembler.finish()?;
    debug!(len = program.len(), "assembled program");
    Ok(program)
}

#[derive(Debug, Clone)]
struct Token<'a> {
    text: &'a str,
    span: Span,
}

#[derive(Debug)]
enum Operand<'a> {
    Byte(u8),
    Label(Token<'a>),
}

#[derive(Debug)]
enum Item<'a> {
    Instruction {
        opcode: Opcode,
        operands: Vec<Operand<'a>>,
    },
    Bytes(Vec<u8>),
}

#[derive(Debug, Default)]
struct Assembler<'a> {
    items: Vec<Item<'a>>,
    labels: HashMap<&'a str, usize>,
    address: usize,
}

impl<'a> Assembler<'a> {
    fn line(&mut self, line: &'a str, offset: usize) -> Result<(), AssembleError> {
        let code = match line.find(['#', ';']) {
            Some(end) => &line[..end],
            None => line,
        };
        let tokens = tokenize(code, offset);

        let mut rest = &tokens[..];
        while let Some((first, tail)) = rest.split_first() {
            match first.text.strip_suffix(':') {
                Some(name) if is_identifier(name) => {
                    self.define_label(name, first.span.clone())?;
                    rest = tail;
                }
                _ => break,
            }
        }

        let Some((head, operands)) = rest.split_first() else {
            return Ok(());
        };

        if head.text.eq_ignore_ascii_case(BYTE_DIRECTIVE) {
            if operands.is_empty() {
                return Err(AssembleError::new(
                    AssembleErrorKind::OperandCount {
                        mnemonic: BYTE_DIRECTIVE.to_string(),
                        expected: 1,
                        found: 0,
                    },
                    head.span.clone(),
                ));
            }
            let bytes = operands
                .iter()
                .map(parse_byte)
                .collect::<Result<Vec<u8>, _>>()?;
            self.address += bytes.len();
            self.items.push(Item::Bytes(bytes));
            return Ok(());
        }

        let opcode = Opcode::from_mnemonic(head.text).ok_or_else(|| {
            AssembleError::new(
                AssembleErrorKind::UnknownMnemonic {
                    mnemonic: head.text.to_string(),
                },
                head.span.clone(),
            )
        })?;

        if operands.len() != opcode.operand_count() {
            let last = operands.last().unwrap_or(head);
            return Err(AssembleError::new(
                AssembleErrorKind::OperandCount {
                    mnemonic: opcode.mnemonic().to_string(),
                    expected: opcode.operand_count(),
                    found: operands.len(),
                },
                Span::combine(&head.span, &last.span),
            ));
        }

        let operands = operands
            .iter()
            .map(|token| operand(opcode, token))
            .collect::<Result<Vec<_>, _>>()?;
        self.address += opcode.instruction_len();
        self.items.push(Item::Instruction { opcode, operands });
        Ok(())
    }

    fn define_label(&mut self, name: &'a str, span: Span) -> Result<(), AssembleError> {
        if self.labels.insert(name, self.address).is_some() {
            return Err(AssembleError::new(
                AssembleErrorKind::DuplicateLabel {
                    label: name.to_string(),
                },
                span,
            ));
        }
        Ok(())
    }

    fn resolve(&self, operand: Operand<'a>) -> Result<u8, AssembleError> {
        let token = match operand {
            Operand::Byte(byte) => return Ok(byte),
            Operand::Label(token) => token,
        };
        let Some(&address) = self.labels.get(token.text) else {
            return Err(AssembleError::new(
                AssembleErrorKind::UnknownLabel {
                    label: token.text.to_string(),
                },
                token.span,
            ));
        };
        u8::try_from(address).map_err(|_| {
            AssembleError::new(
                AssembleErrorKind::AddressOutOfRange {
                    label: token.text.to_string(),
                    address,
                },
                token.span.clone(),
            )
        })
    }

    fn finish(mut self) -> Result<Program, AssembleError> {
        let mut bytes = Vec::with_capacity(self.address);
        for item in core::mem::take(&mut self.items) {
            match item {
                Item::Bytes(raw) => bytes.extend(raw),
                Item::Instruction { opcode, operands } => {
                    bytes.push(opcode.byte());
                    for operand in operands {
                        bytes.push(self.resolve(operand)?);
                    }
                }
            }
        }
        Ok(Program::new(bytes))
    }
}

/// Lines of `source` paired with their starting byte offset.
fn lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source.split_inclusive('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line))
    })
}

/// Split on whitespace and commas, keeping absolute spans.
fn tokenize(code: &str, offset: usize) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = None;
    let end = core::iter::once((code.len(), ' '));
    for (i, c) in code.char_indices().chain(end) {
        let separator = c.is_whitespace() || c == ',';
        match (start, separator) {
            (None, false) => start = Some(i),
            (Some(s), true) => {
                tokens.push(Token {
                    text: &code[s..i],
                    span: Span::new(offset + s, offset + i),
                });
                start = None;
            }
            _ => {}
        }
    }
    tokens
}

fn operand<'a>(opcode: Opcode, token: &Token<'a>) -> Result<Operand<'a>, AssembleError> {
    if token.text.starts_with(|c: char| c.is_ascii_digit()) {
        parse_byte(token).map(Operand::Byte)
    } else if opcode.takes_target() && is_identifier(token.text) {
        Ok(Operand::Label(token.clone()))
    } else {
        Err(invalid_operand(token))
    }
}

fn parse_byte(token: &Token<'_>) -> Result<u8, AssembleError> {
    let text = token.text;
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => text.parse::<u8>(),
    };
    parsed.map_err(|_| invalid_operand(token))
}

fn invalid_operand(token: &Token<'_>) -> AssembleError {
    AssembleError::new(
        AssembleErrorKind::InvalidOperand {
            text: token.text.to_string(),
        },
        token.span.clone(),
    )
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
