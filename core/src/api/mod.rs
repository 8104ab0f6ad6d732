//! Configuration surface for embedding the QBISA virtual machine.
//!
//! # Example
//!
//! ```
//! use qbisa_core::api::{ExecutionOptions, RegisterAddressing};
//! use qbisa_core::{Vm, compile};
//!
//! let options = ExecutionOptions {
//!     seed: Some(7),
//!     max_steps: Some(1_000),
//!     register_addressing: RegisterAddressing::First,
//! };
//! let mut vm = Vm::with_options(compile("QINIT EVOLVE"), options);
//! let state = vm.execute().unwrap();
//! assert_eq!(state.generation, 1);
//! ```

pub mod options;

pub use options::{ExecutionOptions, RegisterAddressing};
