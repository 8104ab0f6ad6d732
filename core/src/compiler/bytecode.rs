//! Keyword compiler implementation.

use tracing::debug;

use crate::{
    Vec,
    vm::{Instruction, Program},
};

/// A recognized keyword and the instruction it emits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyword {
    pub text: &'static str,
    pub emits: Instruction,
}

/// Recognized keywords in priority order.
pub static KEYWORDS: &[Keyword] = &[
    Keyword {
        text: "QINIT",
        emits: Instruction::QInit(2),
    },
    Keyword {
        text: "QSUP",
        emits: Instruction::QSup(0),
    },
    Keyword {
        text: "PHI_CALC",
        emits: Instruction::PhiCalc,
    },
    Keyword {
        text: "EVOLVE",
        emits: Instruction::Evolve,
    },
];

/// Lenient compiler that emits instructions from keyword presence.
///
/// Holds the instructions emitted so far; [`Compiler::finalize`] encodes
/// them into a [`Program`].
#[derive(Debug, Default)]
pub struct Compiler {
    instructions: Vec<Instruction>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The keyword table, in the order keywords are checked.
    pub fn keywords() -> &'static [Keyword] {
        KEYWORDS
    }

    /// Convenience method to compile a source text in one call.
    pub fn compile(source: &str) -> Program {
        let mut compiler = Self::new();
        compiler.scan(source);
        compiler.emit(Instruction::Ret);
        compiler.finalize()
    }

    /// Emit one instruction per keyword found in `source`.
    pub fn scan(&mut self, source: &str) {
        for keyword in KEYWORDS {
            if source.contains(keyword.text) {
                self.emit(keyword.emits);
            }
        }
    }

    pub fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Instructions emitted so far.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn finalize(self) -> Program {
        let program = Program::from_instructions(self.instructions);
        debug!(len = program.len(), "compiled program");
        program
    }
}

/// Compile `source` into a program.
///
/// ```
/// use qbisa_core::compile;
///
/// let program = compile("QINIT QSUP PHI_CALC EVOLVE");
/// assert_eq!(program.as_bytes(), &[0x00, 2, 0x01, 0, 0x30, 0x13, 0x43]);
///
/// // Unrecognized text still compiles.
/// assert_eq!(compile("hello").as_bytes(), &[0x43]);
/// ```
pub fn compile(source: &str) -> Program {
    Compiler::compile(source)
}
