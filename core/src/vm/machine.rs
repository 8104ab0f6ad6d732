//! Explicit machine state and the single-step function.
//!
//! A [`Machine`] holds everything an instruction can touch: program counter,
//! operand stack, heap, quantum registers, call stack and organism state.
//! [`Machine::step`] applies one decoded instruction, so individual
//! instructions can be exercised without a program or a [`Vm`](super::Vm).

use hashbrown::HashMap;
use rand::Rng;
use tracing::{debug, trace};

use super::{Instruction, Opcode, QuantumRegister, Stack, VmError};
use crate::{
    String, ToString, Value, Vec,
    api::RegisterAddressing,
    organism::{self, OrganismState},
};

#[derive(Debug, Clone)]
pub struct Machine {
    pc: usize,
    running: bool,
    stack: Stack<Value>,
    heap: HashMap<String, Value>,
    registers: Vec<QuantumRegister>,
    call_stack: Vec<usize>,
    organism: OrganismState,
    addressing: RegisterAddressing,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    pub fn new() -> Self {
        Self::with_addressing(RegisterAddressing::default())
    }

    pub fn with_addressing(addressing: RegisterAddressing) -> Self {
        Machine {
            pc: 0,
            running: true,
            stack: Stack::new(),
            heap: HashMap::new(),
            registers: Vec::new(),
            call_stack: Vec::new(),
            organism: OrganismState::default(),
            addressing,
        }
    }

    /// Rewind to offset 0 and set the running flag.
    ///
    /// Stack, heap, registers and organism state are kept.
    pub fn start(&mut self) {
        self.pc = 0;
        self.running = true;
        self.call_stack.clear();
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stack(&self) -> &Stack<Value> {
        &self.stack
    }

    /// Push a value onto the operand stack (for host-seeded inputs).
    pub fn push(&mut self, value: impl Into<Value>) {
        self.stack.push(value.into());
    }

    pub fn heap(&self) -> &HashMap<String, Value> {
        &self.heap
    }

    pub fn registers(&self) -> &[QuantumRegister] {
        &self.registers
    }

    pub fn organism(&self) -> &OrganismState {
        &self.organism
    }

    pub fn organism_mut(&mut self) -> &mut OrganismState {
        &mut self.organism
    }

    pub fn into_organism(self) -> OrganismState {
        self.organism
    }

    /// Execute one instruction located at the current program counter.
    ///
    /// Advances the program counter past the instruction and its operands
    /// unless the instruction transfers control.
    pub fn step<R: Rng>(&mut self, instruction: Instruction, rng: &mut R) -> Result<(), VmError> {
        let pc = self.pc;
        let mut next = pc + instruction.len();
        trace!(pc, ?instruction, depth = self.stack.len(), "step");

        use Instruction::*;
        match instruction {
            QInit(qubits) => {
                self.registers.push(QuantumRegister::new(qubits));
            }
            QSup(index) => {
                if let Some(register) = self.register_mut(index) {
                    register.superpose();
                }
            }
            QEnt(first, second) => match self.addressing {
                RegisterAddressing::First => {
                    if let Some(register) = self.registers.first_mut() {
                        register.entangle();
                    }
                }
                RegisterAddressing::Addressed => {
                    for index in [first, second] {
                        if let Some(register) = self.registers.get_mut(index as usize) {
                            register.entangle();
                        }
                    }
                }
            },
            QMeas(_) => {
                // Amplitudes are not consulted: the outcome is a fair coin.
                let bit = if rng.gen_bool(0.5) { 1.0 } else { 0.0 };
                self.stack.push(Value::Number(bit));
            }
            GeneEnc => {
                let data = self.pop(Opcode::GeneEnc, pc)?;
                let sequence = organism::encode_gene(&data);
                let key = self.organism.next_gene_key();
                debug!(%key, %sequence, "gene encoded");
                self.organism.genome.insert(key, Value::Str(sequence));
            }
            GeneDec => {
                let key = self.pop(Opcode::GeneDec, pc)?;
                let key = gene_key(&key, pc)?;
                let sequence = self
                    .organism
                    .genome
                    .get(&key)
                    .ok_or_else(|| VmError::UnknownGene { key: key.clone() })?;
                self.stack.push(organism::decode_gene(sequence));
            }
            Mutate(rate) => {
                let rate = rate as f64 / 255.0;
                let mutated = self.organism.mutate_genome(rate, rng);
                debug!(rate, mutated, "genome mutated");
            }
            Evolve => {
                self.organism.generation += 1;
                self.organism.fitness = self.organism.calculate_fitness();
            }
            Spawn => {
                self.organism.cells = self.organism.cells.saturating_add(1);
            }
            Divide => {
                self.organism.cells = self.organism.cells.saturating_mul(2);
            }
            Apoptose => {
                self.organism.cells = self.organism.cells.saturating_sub(1);
                if self.organism.cells == 0 {
                    debug!(pc, "last cell removed, halting");
                    self.running = false;
                }
            }
            Signal(channel) => {
                let value = self.pop(Opcode::Signal, pc)?;
                self.heap.insert(crate::format!("signal:{}", channel), value);
            }
            PhiCalc => {
                let phi = self.organism.calculate_phi();
                self.organism.consciousness.phi = phi;
                self.stack.push(Value::Number(phi));
            }
            Aware => {
                let awareness = &mut self.organism.consciousness.awareness;
                *awareness = (*awareness + 0.01).min(1.0);
            }
            Intro => {
                let coherence = &mut self.organism.consciousness.coherence;
                *coherence = (*coherence + 0.01).min(1.0);
                self.stack.push(Value::Number(*coherence));
            }
            Load(address) => {
                let address = address.to_string();
                let value = self
                    .heap
                    .get(&address)
                    .cloned()
                    .ok_or(VmError::UnknownAddress { address })?;
                self.stack.push(value);
            }
            Store(address) => {
                let value = self.pop(Opcode::Store, pc)?;
                self.heap.insert(address.to_string(), value);
            }
            Call(target) => {
                self.call_stack.push(next);
                next = target as usize;
            }
            Ret => match self.call_stack.pop() {
                Some(return_to) => next = return_to,
                None => {
                    debug!(pc, "return at top level, halting");
                    self.running = false;
                }
            },
            Jmp(target) => {
                next = target as usize;
            }
            Jz(target) => {
                let condition = self.pop(Opcode::Jz, pc)?;
                if !condition.is_truthy() {
                    next = target as usize;
                }
            }
            Push(value) => {
                self.stack.push(Value::Number(value as f64));
            }
            Add => {
                let (a, b) = self.pop_pair(Opcode::Add, pc)?;
                let sum = match (&a, &b) {
                    (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
                    (Value::Str(_), _) | (_, Value::Str(_)) => {
                        let mut text = String::new();
                        a.write_text(&mut text);
                        b.write_text(&mut text);
                        Value::Str(text)
                    }
                    _ => return Err(mismatch(Opcode::Add, pc, "number or string", &a, &b)),
                };
                self.stack.push(sum);
            }
            Sub => self.arithmetic(Opcode::Sub, pc, |a, b| Ok(a - b))?,
            Mul => self.arithmetic(Opcode::Mul, pc, |a, b| Ok(a * b))?,
            Div => self.arithmetic(Opcode::Div, pc, |a, b| {
                if b == 0.0 {
                    Err(VmError::DivisionByZero { pc })
                } else {
                    Ok(a / b)
                }
            })?,
            And => {
                let (a, b) = self.pop_pair(Opcode::And, pc)?;
                self.stack.push(Value::Bool(a.is_truthy() && b.is_truthy()));
            }
            Or => {
                let (a, b) = self.pop_pair(Opcode::Or, pc)?;
                self.stack.push(Value::Bool(a.is_truthy() || b.is_truthy()));
            }
            Not => {
                let a = self.pop(Opcode::Not, pc)?;
                self.stack.push(Value::Bool(!a.is_truthy()));
            }
        }

        self.pc = next;
        Ok(())
    }

    // === Helpers ===

    /// Register targeted by `QSUP` under the current addressing mode.
    fn register_mut(&mut self, index: u8) -> Option<&mut QuantumRegister> {
        match self.addressing {
            RegisterAddressing::First => self.registers.first_mut(),
            RegisterAddressing::Addressed => self.registers.get_mut(index as usize),
        }
    }

    fn pop(&mut self, opcode: Opcode, pc: usize) -> Result<Value, VmError> {
        self.stack.pop().ok_or(VmError::StackUnderflow { opcode, pc })
    }

    fn pop_pair(&mut self, opcode: Opcode, pc: usize) -> Result<(Value, Value), VmError> {
        self.stack
            .pop_pair()
            .ok_or(VmError::StackUnderflow { opcode, pc })
    }

    fn arithmetic(
        &mut self,
        opcode: Opcode,
        pc: usize,
        op: impl FnOnce(f64, f64) -> Result<f64, VmError>,
    ) -> Result<(), VmError> {
        let (a, b) = self.pop_pair(opcode, pc)?;
        match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => {
                self.stack.push(Value::Number(op(x, y)?));
                Ok(())
            }
            _ => Err(mismatch(opcode, pc, "number", &a, &b)),
        }
    }
}

/// Resolve a `GENE_DEC` key operand.
///
/// Strings are used verbatim; a non-negative integral number `n` names
/// `gene_<n>`.
fn gene_key(key: &Value, pc: usize) -> Result<String, VmError> {
    match key {
        Value::Str(s) => Ok(s.clone()),
        Value::Number(n) if *n >= 0.0 && *n == (*n as u64) as f64 => {
            Ok(crate::format!("gene_{}", *n as u64))
        }
        other => Err(VmError::TypeMismatch {
            opcode: Opcode::GeneDec,
            pc,
            expected: "string or gene index",
            found: other.type_name(),
        }),
    }
}

fn mismatch(opcode: Opcode, pc: usize, expected: &'static str, a: &Value, b: &Value) -> VmError {
    let found = if expected.contains(a.type_name()) {
        b.type_name()
    } else {
        a.type_name()
    };
    VmError::TypeMismatch {
        opcode,
        pc,
        expected,
        found,
    }
}
