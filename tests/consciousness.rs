mod cases;

test_case!(
    phi_of_empty_genome,
    asm: "INTRO\nINTRO\nINTRO\nPHI_CALC",
    phi: 0.0,
    coherence: 0.01 + 0.01 + 0.01,
);
// Coherence does not matter without genes

test_case!(
    phi_scales_with_genome,
    asm: "PUSH 1\nGENE_ENC\nPUSH 2\nGENE_ENC\nINTRO\nPHI_CALC\nEVOLVE",
    phi: 2.0 * 0.01 / 100.0,
    fitness: (2.0 / 100.0 + 2.0 * 0.01 / 100.0) / 2.0,
);

test_case!(
    awareness_accumulates,
    asm: "AWARE\nAWARE\nAWARE",
    awareness: 0.01 + 0.01 + 0.01,
    stack_len: 0,
);

test_case!(
    introspection_pushes_coherence,
    asm: "INTRO",
    coherence: 0.01,
    stack: [qbisa::Value::Number(0.01)],
);
