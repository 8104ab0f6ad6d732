//! QBISA opcode table.
//!
//! Every instruction starts with a one-byte opcode. Instructions are not
//! self-describing: the number of immediate operand bytes that follow is a
//! fixed function of the opcode, looked up through [`Opcode::operand_count`].
//!
//! # Opcode Families
//!
//! ```text
//! 0x00-0x0F  quantum        QINIT QSUP QENT QMEAS
//! 0x10-0x1F  biological     GENE_ENC GENE_DEC MUTATE EVOLVE
//! 0x20-0x2F  cellular       SPAWN DIVIDE APOPTOSE SIGNAL
//! 0x30-0x3F  consciousness  PHI_CALC AWARE INTRO
//! 0x40-0x4F  standard       LOAD STORE CALL RET JMP JZ PUSH
//! 0x50-0x5F  arithmetic     ADD SUB MUL DIV
//! 0x60-0x6F  logic          AND OR NOT
//! ```

use core::fmt;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    // Quantum operations
    QInit = 0x00,
    QSup = 0x01,
    QEnt = 0x02,
    QMeas = 0x03,

    // Biological operations
    GeneEnc = 0x10,
    GeneDec = 0x11,
    Mutate = 0x12,
    Evolve = 0x13,

    // Cellular operations
    Spawn = 0x20,
    Divide = 0x21,
    Apoptose = 0x22,
    Signal = 0x23,

    // Consciousness operations
    PhiCalc = 0x30,
    Aware = 0x31,
    Intro = 0x32,

    // Standard operations
    Load = 0x40,
    Store = 0x41,
    Call = 0x42,
    Ret = 0x43,
    Jmp = 0x44,
    Jz = 0x45,
    Push = 0x46,

    // Arithmetic
    Add = 0x50,
    Sub = 0x51,
    Mul = 0x52,
    Div = 0x53,

    // Logic
    And = 0x60,
    Or = 0x61,
    Not = 0x62,
}
static_assertions::assert_eq_size!(Opcode, u8);

/// Dispatch table from byte value to opcode. `None` marks unassigned bytes.
static OPCODE_TABLE: [Option<Opcode>; 256] = build_table();

const fn build_table() -> [Option<Opcode>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < Opcode::ALL.len() {
        let opcode = Opcode::ALL[i];
        table[opcode as usize] = Some(opcode);
        i += 1;
    }
    table
}

impl Opcode {
    /// All opcodes in byte order.
    pub const ALL: [Opcode; 29] = [
        Opcode::QInit,
        Opcode::QSup,
        Opcode::QEnt,
        Opcode::QMeas,
        Opcode::GeneEnc,
        Opcode::GeneDec,
        Opcode::Mutate,
        Opcode::Evolve,
        Opcode::Spawn,
        Opcode::Divide,
        Opcode::Apoptose,
        Opcode::Signal,
        Opcode::PhiCalc,
        Opcode::Aware,
        Opcode::Intro,
        Opcode::Load,
        Opcode::Store,
        Opcode::Call,
        Opcode::Ret,
        Opcode::Jmp,
        Opcode::Jz,
        Opcode::Push,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::And,
        Opcode::Or,
        Opcode::Not,
    ];

    /// Look up the opcode assigned to `byte`.
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        OPCODE_TABLE[byte as usize]
    }

    /// Look up an opcode by its assembly mnemonic (case-insensitive).
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(mnemonic))
    }

    #[inline]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Number of immediate operand bytes following the opcode.
    pub const fn operand_count(self) -> usize {
        match self {
            Opcode::QEnt => 2,
            Opcode::QInit
            | Opcode::QSup
            | Opcode::QMeas
            | Opcode::Mutate
            | Opcode::Signal
            | Opcode::Load
            | Opcode::Store
            | Opcode::Call
            | Opcode::Jmp
            | Opcode::Jz
            | Opcode::Push => 1,
            _ => 0,
        }
    }

    /// Encoded instruction length in bytes, opcode included.
    #[inline]
    pub const fn instruction_len(self) -> usize {
        1 + self.operand_count()
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::QInit => "QINIT",
            Opcode::QSup => "QSUP",
            Opcode::QEnt => "QENT",
            Opcode::QMeas => "QMEAS",
            Opcode::GeneEnc => "GENE_ENC",
            Opcode::GeneDec => "GENE_DEC",
            Opcode::Mutate => "MUTATE",
            Opcode::Evolve => "EVOLVE",
            Opcode::Spawn => "SPAWN",
            Opcode::Divide => "DIVIDE",
            Opcode::Apoptose => "APOPTOSE",
            Opcode::Signal => "SIGNAL",
            Opcode::PhiCalc => "PHI_CALC",
            Opcode::Aware => "AWARE",
            Opcode::Intro => "INTRO",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Jmp => "JMP",
            Opcode::Jz => "JZ",
            Opcode::Push => "PUSH",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
        }
    }

    /// Whether the single operand is a program offset.
    pub const fn takes_target(self) -> bool {
        matches!(self, Opcode::Call | Opcode::Jmp | Opcode::Jz)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
