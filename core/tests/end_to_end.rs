use core::f64::consts::FRAC_1_SQRT_2;

use indoc::indoc;
use pretty_assertions::assert_eq;
use qbisa_core::{
    ExecutionOptions, OrganismState, Program, Value, Vm, VmError, assemble, compile,
    vm::Complex,
};

fn options(seed: u64) -> ExecutionOptions {
    ExecutionOptions {
        seed: Some(seed),
        ..ExecutionOptions::default()
    }
}

fn run(program: Program) -> Result<OrganismState, VmError> {
    Vm::with_options(program, options(42)).execute()
}

#[test]
fn test_keyword_program_end_to_end() {
    let program = compile("QINIT QSUP PHI_CALC EVOLVE");
    assert_eq!(program.as_bytes(), &[0x00, 2, 0x01, 0, 0x30, 0x13, 0x43]);

    let mut vm = Vm::with_options(program, options(1));
    let state = vm.execute().unwrap();

    assert_eq!(state.generation, 1);
    assert_eq!(state.consciousness.phi, 0.0);
    assert_eq!(state.fitness, 0.0);
    assert!(state.genome.is_empty());

    let registers = vm.machine().registers();
    assert_eq!(registers.len(), 1);
    assert_eq!(registers[0].qubits, 2);
    assert_eq!(
        registers[0].state,
        [
            Complex::new(FRAC_1_SQRT_2, 0.0),
            Complex::new(FRAC_1_SQRT_2, 0.0)
        ]
    );
    // PHI_CALC left its result on the stack.
    assert_eq!(vm.machine().stack().as_slice(), &[Value::Number(0.0)]);
}

#[test]
fn test_minimal_program_leaves_fresh_state() {
    let state = run(compile("no keywords at all")).unwrap();
    assert_eq!(state.generation, 0);
    assert_eq!(state.fitness, 0.0);
    assert!(state.genome.is_empty());
    assert_eq!(state.consciousness.phi, 0.0);
    assert_eq!(state.consciousness.coherence, 0.0);
    assert_eq!(state.consciousness.awareness, 0.0);
}

#[test]
fn test_unknown_opcode_is_fatal() {
    let err = run(Program::new([0x31, 0xFF, 0x43])).unwrap_err();
    assert_eq!(err, VmError::UnknownOpcode { opcode: 0xFF, pc: 1 });
    assert_eq!(err.to_string(), "Unknown opcode: 0xFF at offset 1");
}

#[test]
fn test_compile_is_idempotent() {
    let source = "EVOLVE then PHI_CALC, QSUP and finally QINIT";
    assert_eq!(compile(source).as_bytes(), compile(source).as_bytes());
}

#[test]
fn test_gene_encode_then_evolve() {
    let program = assemble(indoc! {"
        PUSH 42
        GENE_ENC
        EVOLVE
        RET
    "})
    .unwrap();
    let state = run(program).unwrap();
    assert_eq!(state.genome.len(), 1);
    // '4' = 52, '2' = 50
    assert_eq!(state.genome["gene_0"], Value::from("AG"));
    assert_eq!(state.generation, 1);
    assert_eq!(state.fitness, (1.0 / 100.0 + 0.0) / 2.0);
}

#[test]
fn test_phi_with_coherence() {
    let program = assemble(indoc! {"
        PUSH 1
        GENE_ENC
        PUSH 2
        GENE_ENC
        INTRO
        INTRO
        PHI_CALC
        EVOLVE
    "})
    .unwrap();
    let state = run(program).unwrap();
    let phi = 2.0 * 0.02 / 100.0;
    assert_eq!(state.consciousness.coherence, 0.02);
    assert_eq!(state.consciousness.phi, phi);
    assert_eq!(state.fitness, (2.0 / 100.0 + phi) / 2.0);
}

#[test]
fn test_countdown_loop() {
    let program = assemble(indoc! {"
                PUSH 3
                STORE 0
        loop:   LOAD 0
                JZ done
                AWARE
                LOAD 0
                PUSH 1
                SUB
                STORE 0
                JMP loop
        done:   EVOLVE
                RET
    "})
    .unwrap();
    let state = run(program).unwrap();
    assert_eq!(state.consciousness.awareness, 0.01 + 0.01 + 0.01);
    assert_eq!(state.generation, 1);
}

#[test]
fn test_call_returns_after_call_site() {
    let program = assemble(indoc! {"
                CALL grow
                EVOLVE
                RET
        grow:   SPAWN
                DIVIDE
                RET
    "})
    .unwrap();
    let mut vm = Vm::with_options(program, options(0));
    let state = vm.execute().unwrap();
    assert_eq!(state.cells, 4);
    assert_eq!(state.generation, 1);
}

#[test]
fn test_apoptosis_halts_execution() {
    let program = assemble("APOPTOSE\nEVOLVE\n").unwrap();
    let state = run(program).unwrap();
    assert_eq!(state.cells, 0);
    assert_eq!(state.generation, 0);
}

#[test]
fn test_infinite_loop_hits_step_limit() {
    let program = assemble("top: AWARE\nJMP top\n").unwrap();
    let options = ExecutionOptions {
        seed: Some(3),
        max_steps: Some(100),
        ..ExecutionOptions::default()
    };
    let err = Vm::with_options(program, options).execute().unwrap_err();
    assert_eq!(err, VmError::StepLimitExceeded { limit: 100 });
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let source = indoc! {"
        PUSH 10
        GENE_ENC
        PUSH 200
        GENE_ENC
        MUTATE 128
        MUTATE 128
        QMEAS 0
        QMEAS 0
        QMEAS 0
        ADD
        ADD
        GENE_ENC
        EVOLVE
    "};
    let first = run(assemble(source).unwrap()).unwrap();
    let second = run(assemble(source).unwrap()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.genome.len(), 3);
}

#[test]
fn test_mutation_rate_extremes() {
    let setup = "PUSH 11\nGENE_ENC\nPUSH 22\nGENE_ENC\n";
    let fresh = run(assemble(setup).unwrap()).unwrap();

    for seed in 0..20 {
        let program = assemble(&format!("{}MUTATE 0\nMUTATE 0\n", setup)).unwrap();
        let state = Vm::with_options(program, options(seed)).execute().unwrap();
        assert_eq!(state.genome, fresh.genome);
    }

    // Every gene is re-mutated: each keeps its length and alphabet.
    for seed in 0..20 {
        let program = assemble(&format!("{}MUTATE 255\n", setup)).unwrap();
        let state = Vm::with_options(program, options(seed)).execute().unwrap();
        for gene in state.genome.values() {
            let sequence = gene.as_str().unwrap();
            assert_eq!(sequence.len(), 2);
            assert!(sequence.chars().all(|c| "ATGC".contains(c)));
        }
    }
}

#[test]
fn test_runtime_error_aborts() {
    let program = assemble("EVOLVE\nGENE_DEC\nEVOLVE\n").unwrap();
    let err = run(program).unwrap_err();
    assert!(matches!(err, VmError::StackUnderflow { pc: 1, .. }));
}

#[test]
fn test_organism_state_serializes() {
    let state = run(compile("QINIT EVOLVE")).unwrap();
    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["generation"], 1);
    assert_eq!(json["cells"], 1);
    assert_eq!(json["consciousness"]["phi"], 0.0);
}
