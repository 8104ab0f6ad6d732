use alloc::collections::{BTreeMap, BTreeSet};
use core::fmt;

use super::{Instruction, VmError};
use crate::{String, Vec, format};

/// An immutable bytecode program.
///
/// Produced by the compiler or the assembler and consumed read-only by the
/// VM. `Display` renders an assembly listing that [`crate::assemble`]
/// accepts; `Debug` renders the same listing with byte offsets.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Program {
    bytes: Vec<u8>,
}

impl Program {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Program {
            bytes: bytes.into(),
        }
    }

    pub fn from_instructions(instructions: impl IntoIterator<Item = Instruction>) -> Self {
        let mut bytes = Vec::new();
        for instruction in instructions {
            instruction.encode(&mut bytes);
        }
        Program { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the instruction at `pc`.
    pub fn decode_at(&self, pc: usize) -> Result<Instruction, VmError> {
        Instruction::decode(&self.bytes, pc)
    }

    /// Iterate over `(offset, instruction)` pairs in byte order.
    ///
    /// Yields one error and stops at the first byte that does not decode.
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions {
            bytes: &self.bytes,
            pc: 0,
            failed: false,
        }
    }

    /// Decode the whole program leniently: undecodable bytes become `Err(byte)`
    /// items of length one.
    fn items(&self) -> Vec<(usize, Result<Instruction, u8>)> {
        let mut items = Vec::new();
        let mut pc = 0;
        while pc < self.bytes.len() {
            match Instruction::decode(&self.bytes, pc) {
                Ok(instruction) => {
                    items.push((pc, Ok(instruction)));
                    pc += instruction.len();
                }
                Err(_) => {
                    items.push((pc, Err(self.bytes[pc])));
                    pc += 1;
                }
            }
        }
        items
    }

    /// Assign label numbers to jump/call targets that land on an instruction
    /// boundary (or the end of the program).
    fn labels(&self, items: &[(usize, Result<Instruction, u8>)]) -> BTreeMap<usize, usize> {
        let boundaries: BTreeSet<usize> = items
            .iter()
            .map(|(addr, _)| *addr)
            .chain(core::iter::once(self.bytes.len()))
            .collect();
        let targets: BTreeSet<usize> = items
            .iter()
            .filter_map(|(_, item)| item.ok()?.target())
            .map(|target| target as usize)
            .filter(|target| boundaries.contains(target))
            .collect();
        targets
            .into_iter()
            .enumerate()
            .map(|(label, addr)| (addr, label))
            .collect()
    }
}

impl From<Vec<u8>> for Program {
    fn from(bytes: Vec<u8>) -> Self {
        Program::new(bytes)
    }
}

impl From<&[u8]> for Program {
    fn from(bytes: &[u8]) -> Self {
        Program::new(bytes)
    }
}

impl AsRef<[u8]> for Program {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

pub struct Instructions<'a> {
    bytes: &'a [u8],
    pc: usize,
    failed: bool,
}

impl Iterator for Instructions<'_> {
    type Item = Result<(usize, Instruction), VmError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pc >= self.bytes.len() {
            return None;
        }
        let pc = self.pc;
        match Instruction::decode(self.bytes, pc) {
            Ok(instruction) => {
                self.pc += instruction.len();
                Some(Ok((pc, instruction)))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

fn format_item(item: &Result<Instruction, u8>, labels: &BTreeMap<usize, usize>) -> String {
    match item {
        Ok(instruction) => match instruction.target() {
            Some(target) => match labels.get(&(target as usize)) {
                Some(label) => format!("{} L{}", instruction.opcode(), label),
                None => format!("{}", instruction),
            },
            None => format!("{}", instruction),
        },
        Err(byte) => format!(".byte 0x{:02X}", byte),
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.items();
        let labels = self.labels(&items);

        for (addr, item) in &items {
            if let Some(label) = labels.get(addr) {
                writeln!(f, "L{}:", label)?;
            }
            writeln!(f, "    {:<16} ; {:04}", format_item(item, &labels), addr)?;
        }
        if let Some(label) = labels.get(&self.bytes.len()) {
            writeln!(f, "L{}:", label)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.items();
        let labels = self.labels(&items);

        writeln!(f, "Program {{")?;
        writeln!(f, "  len: {}", self.bytes.len())?;
        writeln!(f, "  instructions:")?;
        for (addr, item) in &items {
            let label_prefix = match labels.get(addr) {
                Some(label) => format!("L{}:", label),
                None => String::new(),
            };
            writeln!(
                f,
                "    {:4} {:>4}  {}",
                addr,
                label_prefix,
                format_item(item, &labels)
            )?;
        }
        if let Some(label) = labels.get(&self.bytes.len()) {
            writeln!(f, "    {:4} {:>4}", self.bytes.len(), format!("L{}:", label))?;
        }
        write!(f, "}}")
    }
}
