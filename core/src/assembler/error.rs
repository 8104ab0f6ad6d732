use core::{fmt, ops::Range};

use crate::{String, format};

/// Byte range into the assembly source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self(start..end)
    }

    pub fn combine(a: &Span, b: &Span) -> Span {
        Span::new(a.0.start, b.0.end)
    }
}

/// Assembly error with the source location it was found at.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembleError {
    pub kind: AssembleErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssembleErrorKind {
    /// Neither an opcode mnemonic nor a directive.
    UnknownMnemonic { mnemonic: String },
    /// Wrong number of operands for the mnemonic.
    OperandCount {
        mnemonic: String,
        expected: usize,
        found: usize,
    },
    /// Operand is not a byte literal (or a label, where one is allowed).
    InvalidOperand { text: String },
    /// Jump or call target names a label that is never defined.
    UnknownLabel { label: String },
    /// A label is defined twice.
    DuplicateLabel { label: String },
    /// A label resolves past the last offset a single byte can address.
    AddressOutOfRange { label: String, address: usize },
}

impl AssembleErrorKind {
    /// Stable error code, `A001` through `A006`.
    pub const fn code(&self) -> &'static str {
        match self {
            AssembleErrorKind::UnknownMnemonic { .. } => "A001",
            AssembleErrorKind::OperandCount { .. } => "A002",
            AssembleErrorKind::InvalidOperand { .. } => "A003",
            AssembleErrorKind::UnknownLabel { .. } => "A004",
            AssembleErrorKind::DuplicateLabel { .. } => "A005",
            AssembleErrorKind::AddressOutOfRange { .. } => "A006",
        }
    }
}

impl AssembleError {
    pub fn new(kind: AssembleErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            AssembleErrorKind::UnknownMnemonic { mnemonic } => {
                format!("Unknown mnemonic '{}'", mnemonic)
            }
            AssembleErrorKind::OperandCount {
                mnemonic,
                expected,
                found,
            } => format!(
                "{} expects {} operand(s), found {}",
                mnemonic, expected, found
            ),
            AssembleErrorKind::InvalidOperand { text } => {
                format!("Invalid operand '{}'", text)
            }
            AssembleErrorKind::UnknownLabel { label } => format!("Unknown label '{}'", label),
            AssembleErrorKind::DuplicateLabel { label } => {
                format!("Label '{}' is already defined", label)
            }
            AssembleErrorKind::AddressOutOfRange { label, address } => format!(
                "Label '{}' is at offset {}, which does not fit in one byte",
                label, address
            ),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn help(&self) -> Option<String> {
        match &self.kind {
            AssembleErrorKind::UnknownMnemonic { .. } => None,
            AssembleErrorKind::OperandCount { .. } => None,
            AssembleErrorKind::InvalidOperand { .. } => Some(String::from(
                "Operands are decimal (42) or hex (0x2A) bytes; JMP, JZ and CALL also take labels",
            )),
            AssembleErrorKind::UnknownLabel { label } => {
                Some(format!("Define it with '{}:' before an instruction", label))
            }
            AssembleErrorKind::DuplicateLabel { .. } => None,
            AssembleErrorKind::AddressOutOfRange { .. } => Some(String::from(
                "Targets are single bytes: keep labeled code within the first 256 bytes",
            )),
        }
    }
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} [{}]", self.message(), self.code())?;
        if let Some(help) = self.help() {
            write!(f, "\nhelp: {}", help)?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AssembleError {}
