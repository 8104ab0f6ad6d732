use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::{
    ToString,
    assembler::{AssembleError, AssembleErrorKind, Span, assemble},
    compile,
    vm::{Instruction, Program},
};

fn spanned<'a>(span: &Span, source: &'a str) -> &'a str {
    &source[span.0.clone()]
}

fn assemble_err(source: &str) -> AssembleError {
    assemble(source).expect_err("expected an assembly error")
}

#[test]
fn test_empty_source() {
    assert!(assemble("").unwrap().is_empty());
    assert!(assemble("  # nothing here\n\n; or here\n").unwrap().is_empty());
}

#[test]
fn test_simple_program() {
    let program = assemble(indoc! {"
        QINIT 2
        QSUP 0
        PHI_CALC
        EVOLVE
        RET
    "})
    .unwrap();
    assert_eq!(program, compile("QINIT QSUP PHI_CALC EVOLVE"));
}

#[test]
fn test_case_insensitive_mnemonics_and_separators() {
    let program = assemble("qent 0, 1\nQent 0x02,0x03\nphi_calc").unwrap();
    assert_eq!(program.as_bytes(), &[0x02, 0, 1, 0x02, 2, 3, 0x30]);
}

#[test]
fn test_comments() {
    let program = assemble(indoc! {"
        PUSH 7   ; seven
        STORE 1  # keep it
    "})
    .unwrap();
    assert_eq!(program.as_bytes(), &[0x46, 7, 0x41, 1]);
}

#[test]
fn test_labels() {
    let program = assemble(indoc! {"
                PUSH 3
        loop:   PUSH 1
                SUB
                STORE 0
                LOAD 0
                JZ done
                LOAD 0
                JMP loop
        done:   RET
    "})
    .unwrap();
    let decoded: Vec<_> = program.instructions().map(Result::unwrap).collect();
    assert_eq!(
        decoded,
        [
            (0, Instruction::Push(3)),
            (2, Instruction::Push(1)),
            (4, Instruction::Sub),
            (5, Instruction::Store(0)),
            (7, Instruction::Load(0)),
            (9, Instruction::Jz(15)),
            (11, Instruction::Load(0)),
            (13, Instruction::Jmp(2)),
            (15, Instruction::Ret),
        ]
    );
}

#[test]
fn test_label_on_its_own_line() {
    let program = assemble("start:\n    CALL end\nend:\n").unwrap();
    assert_eq!(program.as_bytes(), &[0x42, 2]);
}

#[test]
fn test_byte_directive() {
    let program = assemble(".byte 0xFF 1, 2\nRET").unwrap();
    assert_eq!(program.as_bytes(), &[0xFF, 1, 2, 0x43]);
}

#[test]
fn test_unknown_mnemonic() {
    let source = "QINIT 1\nFROB 2\n";
    let err = assemble_err(source);
    assert_eq!(
        err.kind,
        AssembleErrorKind::UnknownMnemonic {
            mnemonic: "FROB".to_string()
        }
    );
    assert_eq!(err.span, Span::new(8, 12));
    assert_eq!(spanned(&err.span, source), "FROB");
    assert_eq!(err.code(), "A001");
}

#[test]
fn test_operand_count() {
    let source = "QENT 1";
    let err = assemble_err(source);
    assert_eq!(
        err.kind,
        AssembleErrorKind::OperandCount {
            mnemonic: "QENT".to_string(),
            expected: 2,
            found: 1
        }
    );
    assert_eq!(spanned(&err.span, source), "QENT 1");

    let err = assemble_err("RET 0");
    assert!(matches!(
        err.kind,
        AssembleErrorKind::OperandCount {
            expected: 0,
            found: 1,
            ..
        }
    ));

    let err = assemble_err(".byte");
    assert!(matches!(err.kind, AssembleErrorKind::OperandCount { .. }));
}

#[test]
fn test_invalid_operands() {
    for (source, text) in [
        ("PUSH 256", "256"),
        ("PUSH -1", "-1"),
        ("PUSH 0xZZ", "0xZZ"),
        ("LOAD slot", "slot"),
        ("JMP 9lives", "9lives"),
        (".byte x", "x"),
    ] {
        let err = assemble_err(source);
        assert_eq!(
            err.kind,
            AssembleErrorKind::InvalidOperand {
                text: text.to_string()
            },
            "source: {}",
            source
        );
        assert_eq!(spanned(&err.span, source), text);
        assert!(err.help().is_some());
    }
}

#[test]
fn test_unknown_label() {
    let source = "JMP nowhere";
    let err = assemble_err(source);
    assert_eq!(
        err.kind,
        AssembleErrorKind::UnknownLabel {
            label: "nowhere".to_string()
        }
    );
    assert_eq!(err.span, Span::new(4, 11));
}

#[test]
fn test_labels_are_case_sensitive() {
    let err = assemble_err("Top: JMP top");
    assert!(matches!(err.kind, AssembleErrorKind::UnknownLabel { .. }));
}

#[test]
fn test_duplicate_label() {
    let source = "a: RET\na: RET";
    let err = assemble_err(source);
    assert_eq!(
        err.kind,
        AssembleErrorKind::DuplicateLabel {
            label: "a".to_string()
        }
    );
    assert_eq!(err.span, Span::new(7, 9));
}

#[test]
fn test_label_out_of_range() {
    let mut source = String::new();
    for _ in 0..256 {
        source.push_str("RET\n");
    }
    source.push_str("far: RET\nJMP far\n");
    let err = assemble_err(&source);
    assert_eq!(
        err.kind,
        AssembleErrorKind::AddressOutOfRange {
            label: "far".to_string(),
            address: 256
        }
    );
}

#[test]
fn test_display() {
    let err = assemble_err("JMP nowhere");
    assert_eq!(
        err.to_string(),
        "error: Unknown label 'nowhere' [A004]\nhelp: Define it with 'nowhere:' before an instruction"
    );
}

#[test]
fn test_listing_round_trip() {
    let programs = [
        compile("QINIT QSUP PHI_CALC EVOLVE"),
        compile(""),
        Program::from_instructions([
            Instruction::Push(0),
            Instruction::Jz(6),
            Instruction::Call(7),
            Instruction::Ret,
            Instruction::QEnt(0, 1),
            Instruction::Jmp(200),
        ]),
        Program::new([0x13, 0xFF, 0x77, 0x46]),
    ];
    for program in programs {
        let listing = program.to_string();
        assert_eq!(assemble(&listing).unwrap(), program, "listing:\n{}", listing);
    }
}
