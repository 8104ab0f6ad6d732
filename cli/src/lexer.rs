use std::ops::Range;

use logos::Logos;
use qbisa_core::Opcode;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\f\r]+")]
pub enum Token {
    #[regex(r"[#;][^\n]*")]
    Comment,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*:")]
    Label,

    #[regex(r"\.[A-Za-z]+")]
    Directive,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,

    #[regex(r"0[xX][0-9A-Fa-f]+|[0-9]+")]
    Number,

    #[token(",")]
    Comma,

    #[token("\n")]
    Newline,
}

/// Highlighting class of a source fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Class {
    Mnemonic,
    Directive,
    Label,
    LabelRef,
    Number,
    Comment,
    Punctuation,
    Error,
}

/// Split one line of assembly into classified spans.
///
/// Words that name an opcode are mnemonics; any other word can only be a
/// label reference. Characters the lexer does not recognize are errors.
pub fn classify(source: &str) -> Vec<(Range<usize>, Class)> {
    let mut lexer = Token::lexer(source);
    let mut spans = Vec::new();
    while let Some(token) = lexer.next() {
        let span = lexer.span();
        let class = match token {
            Ok(Token::Comment) => Class::Comment,
            Ok(Token::Label) => Class::Label,
            Ok(Token::Directive) => Class::Directive,
            Ok(Token::Word) if Opcode::from_mnemonic(lexer.slice()).is_some() => Class::Mnemonic,
            Ok(Token::Word) => Class::LabelRef,
            Ok(Token::Number) => Class::Number,
            Ok(Token::Comma) | Ok(Token::Newline) => Class::Punctuation,
            Err(_) => Class::Error,
        };
        spans.push((span, class));
    }
    spans
}
