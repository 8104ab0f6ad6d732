mod error;
mod instruction_set;
mod machine;
mod opcode;
mod program;
mod quantum;
mod runtime;
mod stack;


pub use error::VmError;
pub use instruction_set::Instruction;
pub use machine::Machine;
pub use opcode::Opcode;
pub use program::{Instructions, Program};
pub use quantum::{Complex, QuantumRegister};
pub use runtime::Vm;

pub use stack::Stack;
