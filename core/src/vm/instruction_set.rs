//! QBISA Instructions - Variable-Length Format
//!
//! Each instruction is an opcode byte followed by zero, one or two immediate
//! operand bytes:
//!
//! ```text
//! ┌────────────┬────────────┬────────────┐
//! │   Opcode   │ Operand 0  │ Operand 1  │
//! │  (8 bits)  │ (optional) │ (optional) │
//! └────────────┴────────────┴────────────┘
//! ```
//!
//! Decoding goes through the static opcode table, so an unknown opcode byte
//! or a missing operand byte is detected before any handler runs.
//!
//! # Stack Discipline
//!
//! Stack effect notation: `[..., operand1, operand2] -> [..., result]`

use core::fmt;

use super::{Opcode, VmError};
use crate::Vec;

/// A single decoded VM instruction.
///
/// The `#[repr(C, u8)]` ensures the discriminant equals the opcode byte and
/// is followed by the operand bytes.
#[repr(C, u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // ========================================================================
    // Quantum (0x00 - 0x0F)
    // ========================================================================
    /// Append a quantum register with N qubits in state |0⟩.
    /// Operand: u8 qubit count | Stack: [...] -> [...]
    QInit(u8) = 0x00,

    /// Put a register into equal superposition.
    /// Operand: u8 register index | Stack: [...] -> [...]
    QSup(u8) = 0x01,

    /// Mark registers as entangled.
    /// Operands: u8, u8 register indices | Stack: [...] -> [...]
    QEnt(u8, u8) = 0x02,

    /// Measure: push a random classical bit.
    /// Operand: u8 register index | Stack: [...] -> [..., bit: Number]
    QMeas(u8) = 0x03,

    // ========================================================================
    // Biological (0x10 - 0x1F)
    // ========================================================================
    /// Encode a value as a gene sequence and store it in the genome.
    /// Stack: [..., value] -> [...]
    GeneEnc = 0x10,

    /// Look up a gene and push its (pass-through) decoded payload.
    /// Stack: [..., key] -> [..., sequence]
    GeneDec = 0x11,

    /// Mutate genome entries with probability `rate / 255`.
    /// Operand: u8 rate | Stack: [...] -> [...]
    Mutate(u8) = 0x12,

    /// Advance one generation and recompute fitness.
    Evolve = 0x13,

    // ========================================================================
    // Cellular (0x20 - 0x2F)
    // ========================================================================
    /// Add one cell.
    Spawn = 0x20,

    /// Double the cell count.
    Divide = 0x21,

    /// Remove one cell; the organism halts when none remain.
    Apoptose = 0x22,

    /// Emit a value on a signal channel (heap key `signal:<channel>`).
    /// Operand: u8 channel | Stack: [..., value] -> [...]
    Signal(u8) = 0x23,

    // ========================================================================
    // Consciousness (0x30 - 0x3F)
    // ========================================================================
    /// Recompute phi from genome size and coherence.
    /// Stack: [...] -> [..., phi: Number]
    PhiCalc = 0x30,

    /// Raise awareness by 0.01 (max 1.0).
    Aware = 0x31,

    /// Raise coherence by 0.01 (max 1.0).
    /// Stack: [...] -> [..., coherence: Number]
    Intro = 0x32,

    // ========================================================================
    // Standard (0x40 - 0x4F)
    // ========================================================================
    /// Push heap cell.
    /// Operand: u8 address | Stack: [...] -> [..., value]
    Load(u8) = 0x40,

    /// Pop into heap cell.
    /// Operand: u8 address | Stack: [..., value] -> [...]
    Store(u8) = 0x41,

    /// Call subroutine at absolute offset.
    /// Operand: u8 target | Stack: [...] -> [...]
    Call(u8) = 0x42,

    /// Return from subroutine, or halt at top level.
    Ret = 0x43,

    /// Unconditional jump to absolute offset.
    /// Operand: u8 target
    Jmp(u8) = 0x44,

    /// Pop and jump if falsy.
    /// Operand: u8 target | Stack: [..., cond] -> [...]
    Jz(u8) = 0x45,

    /// Push an unsigned byte as a number.
    /// Operand: u8 value | Stack: [...] -> [..., value: Number]
    Push(u8) = 0x46,

    // ========================================================================
    // Arithmetic (0x50 - 0x5F)
    // ========================================================================
    /// Stack: [..., a, b] -> [..., a + b]
    Add = 0x50,
    /// Stack: [..., a: Number, b: Number] -> [..., a - b]
    Sub = 0x51,
    /// Stack: [..., a: Number, b: Number] -> [..., a * b]
    Mul = 0x52,
    /// Stack: [..., a: Number, b: Number] -> [..., a / b(!)]
    Div = 0x53,

    // ========================================================================
    // Logic (0x60 - 0x6F)
    // ========================================================================
    /// Stack: [..., a, b] -> [..., a && b: Bool]
    And = 0x60,
    /// Stack: [..., a, b] -> [..., a || b: Bool]
    Or = 0x61,
    /// Stack: [..., a] -> [..., !a: Bool]
    Not = 0x62,
}
static_assertions::assert_eq_size!(Instruction, [u8; 3]);

impl Instruction {
    /// Build an instruction from its opcode and operand bytes.
    ///
    /// `operands` must hold at least `opcode.operand_count()` bytes; extra
    /// bytes are ignored.
    pub fn from_parts(opcode: Opcode, operands: &[u8]) -> Instruction {
        let a = operands.first().copied().unwrap_or(0);
        let b = operands.get(1).copied().unwrap_or(0);
        match opcode {
            Opcode::QInit => Instruction::QInit(a),
            Opcode::QSup => Instruction::QSup(a),
            Opcode::QEnt => Instruction::QEnt(a, b),
            Opcode::QMeas => Instruction::QMeas(a),
            Opcode::GeneEnc => Instruction::GeneEnc,
            Opcode::GeneDec => Instruction::GeneDec,
            Opcode::Mutate => Instruction::Mutate(a),
            Opcode::Evolve => Instruction::Evolve,
            Opcode::Spawn => Instruction::Spawn,
            Opcode::Divide => Instruction::Divide,
            Opcode::Apoptose => Instruction::Apoptose,
            Opcode::Signal => Instruction::Signal(a),
            Opcode::PhiCalc => Instruction::PhiCalc,
            Opcode::Aware => Instruction::Aware,
            Opcode::Intro => Instruction::Intro,
            Opcode::Load => Instruction::Load(a),
            Opcode::Store => Instruction::Store(a),
            Opcode::Call => Instruction::Call(a),
            Opcode::Ret => Instruction::Ret,
            Opcode::Jmp => Instruction::Jmp(a),
            Opcode::Jz => Instruction::Jz(a),
            Opcode::Push => Instruction::Push(a),
            Opcode::Add => Instruction::Add,
            Opcode::Sub => Instruction::Sub,
            Opcode::Mul => Instruction::Mul,
            Opcode::Div => Instruction::Div,
            Opcode::And => Instruction::And,
            Opcode::Or => Instruction::Or,
            Opcode::Not => Instruction::Not,
        }
    }

    /// Decode the instruction starting at `pc`.
    ///
    /// `pc` must be within `bytes`.
    pub fn decode(bytes: &[u8], pc: usize) -> Result<Instruction, VmError> {
        let byte = bytes[pc];
        let opcode = Opcode::from_byte(byte).ok_or(VmError::UnknownOpcode { opcode: byte, pc })?;
        let operands = bytes
            .get(pc + 1..pc + opcode.instruction_len())
            .ok_or(VmError::TruncatedInstruction { opcode, pc })?;
        Ok(Instruction::from_parts(opcode, operands))
    }

    pub const fn opcode(&self) -> Opcode {
        match self {
            Instruction::QInit(_) => Opcode::QInit,
            Instruction::QSup(_) => Opcode::QSup,
            Instruction::QEnt(_, _) => Opcode::QEnt,
            Instruction::QMeas(_) => Opcode::QMeas,
            Instruction::GeneEnc => Opcode::GeneEnc,
            Instruction::GeneDec => Opcode::GeneDec,
            Instruction::Mutate(_) => Opcode::Mutate,
            Instruction::Evolve => Opcode::Evolve,
            Instruction::Spawn => Opcode::Spawn,
            Instruction::Divide => Opcode::Divide,
            Instruction::Apoptose => Opcode::Apoptose,
            Instruction::Signal(_) => Opcode::Signal,
            Instruction::PhiCalc => Opcode::PhiCalc,
            Instruction::Aware => Opcode::Aware,
            Instruction::Intro => Opcode::Intro,
            Instruction::Load(_) => Opcode::Load,
            Instruction::Store(_) => Opcode::Store,
            Instruction::Call(_) => Opcode::Call,
            Instruction::Ret => Opcode::Ret,
            Instruction::Jmp(_) => Opcode::Jmp,
            Instruction::Jz(_) => Opcode::Jz,
            Instruction::Push(_) => Opcode::Push,
            Instruction::Add => Opcode::Add,
            Instruction::Sub => Opcode::Sub,
            Instruction::Mul => Opcode::Mul,
            Instruction::Div => Opcode::Div,
            Instruction::And => Opcode::And,
            Instruction::Or => Opcode::Or,
            Instruction::Not => Opcode::Not,
        }
    }

    /// Operand bytes in encoding order.
    pub fn operands(&self) -> Vec<u8> {
        match *self {
            Instruction::QEnt(a, b) => alloc::vec![a, b],
            Instruction::QInit(a)
            | Instruction::QSup(a)
            | Instruction::QMeas(a)
            | Instruction::Mutate(a)
            | Instruction::Signal(a)
            | Instruction::Load(a)
            | Instruction::Store(a)
            | Instruction::Call(a)
            | Instruction::Jmp(a)
            | Instruction::Jz(a)
            | Instruction::Push(a) => alloc::vec![a],
            _ => Vec::new(),
        }
    }

    /// Encoded length in bytes.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.opcode().instruction_len()
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode().byte());
        out.extend(self.operands());
    }

    /// Absolute jump/call target, if this instruction transfers control.
    pub const fn target(&self) -> Option<u8> {
        match self {
            Instruction::Call(t) | Instruction::Jmp(t) | Instruction::Jz(t) => Some(*t),
            _ => None,
        }
    }
}

/// Assembly form: `MNEMONIC op0, op1`.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode())?;
        for (i, operand) in self.operands().iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, operand)?;
        }
        Ok(())
    }
}
