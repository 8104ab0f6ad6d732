//! Shared harness for end-to-end program cases.
//!
//! ```ignore
//! test_case!(
//!     encode_and_evolve,
//!     asm: "PUSH 42\nGENE_ENC\nEVOLVE",
//!     genome: [("gene_0", "AG")],
//!     generation: 1,
//! );
//! ```
//!
//! The program source is either `keywords:` (keyword compiler) or `asm:`
//! (assembler). Every other field is a check on the bytecode, the outcome or
//! the final machine state.

#![allow(dead_code)]

use qbisa::{ExecutionOptions, OrganismState, Program, Vm, VmError, assemble, compile};

pub const SEED: u64 = 0x5EED;

pub fn build(kind: &str, source: &str) -> Program {
    match kind {
        "keywords" => compile(source),
        "asm" => assemble(source).unwrap_or_else(|e| panic!("{}\nsource:\n{}", e, source)),
        other => panic!("unknown source kind `{}`", other),
    }
}

pub fn execute(program: &Program) -> (Vm, Result<OrganismState, VmError>) {
    let options = ExecutionOptions {
        seed: Some(SEED),
        ..ExecutionOptions::default()
    };
    let mut vm = Vm::with_options(program.clone(), options);
    let outcome = vm.execute();
    (vm, outcome)
}

pub fn state(outcome: &Result<OrganismState, VmError>) -> &OrganismState {
    match outcome {
        Ok(state) => state,
        Err(e) => panic!("execution failed: {}", e),
    }
}

#[macro_export]
macro_rules! test_case {
    (
        $name:ident,
        $kind:ident: $source:expr,
        $($field:ident: $value:expr),* $(,)?
    ) => {
        #[test]
        fn $name() {
            let program = $crate::cases::build(stringify!($kind), $source);
            let (vm, outcome) = $crate::cases::execute(&program);
            $( $crate::test_case!(@check $field, $value, program, vm, outcome); )*
            let _ = (&program, &vm, &outcome);
        }
    };

    (@check bytes, $value:expr, $program:ident, $vm:ident, $outcome:ident) => {
        pretty_assertions::assert_eq!($program.as_bytes(), &$value[..], "bytecode");
    };
    (@check error, $value:expr, $program:ident, $vm:ident, $outcome:ident) => {
        pretty_assertions::assert_eq!($outcome.as_ref().err(), Some(&$value), "error");
    };
    (@check genome, $value:expr, $program:ident, $vm:ident, $outcome:ident) => {
        let actual: Vec<(&str, qbisa::Value)> = $crate::cases::state(&$outcome)
            .genome
            .iter()
            .map(|(key, gene)| (key.as_str(), gene.clone()))
            .collect();
        let expected: Vec<(&str, qbisa::Value)> = $value
            .into_iter()
            .map(|(key, gene)| (key, qbisa::Value::from(gene)))
            .collect();
        pretty_assertions::assert_eq!(actual, expected, "genome");
    };
    (@check stack, $value:expr, $program:ident, $vm:ident, $outcome:ident) => {
        pretty_assertions::assert_eq!($vm.machine().stack().as_slice(), &$value[..], "stack");
    };
    (@check stack_len, $value:expr, $program:ident, $vm:ident, $outcome:ident) => {
        pretty_assertions::assert_eq!($vm.machine().stack().len(), $value, "stack depth");
    };
    (@check heap, $value:expr, $program:ident, $vm:ident, $outcome:ident) => {
        for (address, expected) in $value {
            pretty_assertions::assert_eq!(
                $vm.machine().heap().get(address),
                Some(&expected),
                "heap[{}]",
                address
            );
        }
    };
    (@check registers, $value:expr, $program:ident, $vm:ident, $outcome:ident) => {
        pretty_assertions::assert_eq!($vm.machine().registers().len(), $value, "register count");
    };
    (@check superposed, $value:expr, $program:ident, $vm:ident, $outcome:ident) => {
        let flags: Vec<bool> = $vm.machine().registers().iter().map(|r| r.is_superposed()).collect();
        pretty_assertions::assert_eq!(flags, $value, "superposed registers");
    };
    (@check entangled, $value:expr, $program:ident, $vm:ident, $outcome:ident) => {
        let flags: Vec<bool> = $vm.machine().registers().iter().map(|r| r.entangled).collect();
        pretty_assertions::assert_eq!(flags, $value, "entangled registers");
    };
    (@check phi, $value:expr, $program:ident, $vm:ident, $outcome:ident) => {
        pretty_assertions::assert_eq!($crate::cases::state(&$outcome).consciousness.phi, $value, "phi");
    };
    (@check coherence, $value:expr, $program:ident, $vm:ident, $outcome:ident) => {
        pretty_assertions::assert_eq!(
            $crate::cases::state(&$outcome).consciousness.coherence,
            $value,
            "coherence"
        );
    };
    (@check awareness, $value:expr, $program:ident, $vm:ident, $outcome:ident) => {
        pretty_assertions::assert_eq!(
            $crate::cases::state(&$outcome).consciousness.awareness,
            $value,
            "awareness"
        );
    };
    (@check $field:ident, $value:expr, $program:ident, $vm:ident, $outcome:ident) => {
        pretty_assertions::assert_eq!(
            $crate::cases::state(&$outcome).$field,
            $value,
            stringify!($field)
        );
    };
}
