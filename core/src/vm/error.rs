//! Runtime execution errors.
//!
//! Every error is fatal: the VM aborts `execute()` on the first failure and
//! does not attempt to recover partial state.

use core::fmt;

use super::Opcode;
use crate::String;

#[derive(Debug, Clone, PartialEq)]
pub enum VmError {
    /// A byte that is not in the opcode table was fetched as an opcode.
    UnknownOpcode { opcode: u8, pc: usize },

    /// The program ended before all operand bytes of an instruction.
    TruncatedInstruction { opcode: Opcode, pc: usize },

    /// An instruction popped from an empty operand stack.
    StackUnderflow { opcode: Opcode, pc: usize },

    /// An operand had the wrong kind of value.
    TypeMismatch {
        opcode: Opcode,
        pc: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// `DIV` with a zero divisor.
    DivisionByZero { pc: usize },

    /// `GENE_DEC` looked up a key that is not in the genome.
    UnknownGene { key: String },

    /// `LOAD` read a heap address that was never stored.
    UnknownAddress { address: String },

    /// `ExecutionOptions::max_steps` was reached before the program halted.
    StepLimitExceeded { limit: usize },
}

impl VmError {
    /// Short stable code for the error kind.
    pub const fn code(&self) -> &'static str {
        match self {
            VmError::UnknownOpcode { .. } => "unknown_opcode",
            VmError::TruncatedInstruction { .. } => "truncated_instruction",
            VmError::StackUnderflow { .. } => "stack_underflow",
            VmError::TypeMismatch { .. } => "type_mismatch",
            VmError::DivisionByZero { .. } => "division_by_zero",
            VmError::UnknownGene { .. } => "unknown_gene",
            VmError::UnknownAddress { .. } => "unknown_address",
            VmError::StepLimitExceeded { .. } => "step_limit_exceeded",
        }
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::UnknownOpcode { opcode, pc } => {
                write!(f, "Unknown opcode: 0x{:02X} at offset {}", opcode, pc)
            }
            VmError::TruncatedInstruction { opcode, pc } => write!(
                f,
                "Truncated instruction: {} at offset {} expects {} operand byte(s)",
                opcode,
                pc,
                opcode.operand_count()
            ),
            VmError::StackUnderflow { opcode, pc } => {
                write!(f, "Stack underflow: {} at offset {}", opcode, pc)
            }
            VmError::TypeMismatch {
                opcode,
                pc,
                expected,
                found,
            } => write!(
                f,
                "Type mismatch: {} at offset {} expected {}, found {}",
                opcode, pc, expected, found
            ),
            VmError::DivisionByZero { pc } => write!(f, "Division by zero at offset {}", pc),
            VmError::UnknownGene { key } => write!(f, "Unknown gene: {:?}", key),
            VmError::UnknownAddress { address } => {
                write!(f, "Unknown heap address: {}", address)
            }
            VmError::StepLimitExceeded { limit } => {
                write!(f, "Step limit exceeded: program ran more than {} steps", limit)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for VmError {}
