//! Keyword compiler.
//!
//! Turns free-form source text into a [`Program`](crate::vm::Program) by
//! checking for a fixed list of keywords. The source is never tokenized and
//! compilation never fails: text without any keyword compiles to a lone
//! `RET`.
//!
//! ## Design
//!
//! - Keywords are checked in table order, so emission order does not depend
//!   on where a keyword appears in the source
//! - Matching is plain substring containment
//! - Output is deterministic

mod bytecode;


pub use bytecode::{Compiler, KEYWORDS, Keyword, compile};
