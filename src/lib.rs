//! QBISA - a toy "quantum-biological" bytecode virtual machine
//!
//! # Overview
//!
//! QBISA programs are byte sequences over a fixed instruction set with
//! quantum, biological, cellular, consciousness, control-flow and
//! arithmetic opcode families. Executing a program mutates an
//! [`OrganismState`] (genome, consciousness metrics, fitness, generation).
//!
//! Programs come from one of two front ends:
//!
//! 1. **Keyword compiler** ([`compile`]): lenient, never fails, emits a fixed
//!    instruction per keyword found in the source text
//! 2. **Assembler** ([`assemble`]): one mnemonic per line, with labels
//!
//! # Quick Start
//!
//! ```
//! use qbisa::{ExecutionOptions, run};
//!
//! let options = ExecutionOptions {
//!     seed: Some(7),
//!     ..ExecutionOptions::default()
//! };
//! let state = run("QINIT QSUP PHI_CALC EVOLVE", options).unwrap();
//! assert_eq!(state.generation, 1);
//! assert_eq!(state.fitness, 0.0);
//! ```
//!
//! Hand-written programs go through the assembler:
//!
//! ```
//! use qbisa::{ExecutionOptions, run_assembly};
//!
//! let source = "PUSH 1\nGENE_ENC\nEVOLVE\n";
//! let state = run_assembly(source, ExecutionOptions::default()).unwrap();
//! assert_eq!(state.genome.len(), 1);
//! ```

pub mod deploy;
mod error;
mod error_renderer;
pub mod registry;

// Re-export public API from qbisa_core
pub use qbisa_core::api::{ExecutionOptions, RegisterAddressing};
pub use qbisa_core::assembler::{AssembleError, AssembleErrorKind, Span};
pub use qbisa_core::compiler::{Compiler, Keyword};
pub use qbisa_core::organism::{Consciousness, OrganismState};
pub use qbisa_core::values::Value;
pub use qbisa_core::vm::{Instruction, Machine, Opcode, Program, QuantumRegister, Vm, VmError};
pub use qbisa_core::{assemble, compile};

pub use deploy::{
    DeploymentMetrics, DeploymentRequest, DeploymentResponse, ErrorResponse, Status, deploy,
    deploy_into,
};
pub use error::{Error, Result};
pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
pub use registry::{OrganismId, Registry, RegistryConfig, RegistryError, RegistryHealth};

/// Compile `source` with the keyword compiler and execute it.
pub fn run(source: &str, options: ExecutionOptions) -> Result<OrganismState> {
    let program = compile(source);
    Ok(Vm::with_options(program, options).execute()?)
}

/// Assemble `source` and execute it.
pub fn run_assembly(source: &str, options: ExecutionOptions) -> Result<OrganismState> {
    let program = assemble(source).map_err(|error| Error::assemble(error, source))?;
    Ok(Vm::with_options(program, options).execute()?)
}
