use miette::{Diagnostic, SourceSpan};
use qbisa_core::{AssembleError, VmError};
use thiserror::Error;

use crate::registry::RegistryError;

/// Errors surfaced by the public API.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// Assembly source could not be assembled.
    #[error("{message}")]
    #[diagnostic(code(qbisa::assemble))]
    Assemble {
        kind: qbisa_core::AssembleErrorKind,
        message: String,
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    /// Program execution aborted.
    #[error("Execution failed")]
    #[diagnostic(code(qbisa::execution))]
    Execution(#[from] VmError),

    /// An organism registry operation was rejected.
    #[error("Registry error")]
    #[diagnostic(code(qbisa::registry))]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Attach the assembly source to an assembler error.
    pub fn assemble(error: AssembleError, source: &str) -> Self {
        Error::Assemble {
            message: error.message(),
            help: error.help(),
            span: error.span.0.clone().into(),
            kind: error.kind,
            src: source.to_string(),
        }
    }

    /// Short stable code for the error kind.
    ///
    /// Assembly errors keep their `A001`..`A006` code.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Assemble { kind, .. } => kind.code(),
            Error::Execution(e) => e.code(),
            Error::Registry(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assemble_error_keeps_location() {
        let source = "PUSH 1\nWIGGLE\n";
        let error = Error::assemble(assemble(source).unwrap_err(), source);
        let Error::Assemble {
            ref message,
            span,
            ref src,
            ..
        } = error
        else {
            panic!("expected an assembly error, got {:?}", error);
        };
        assert_eq!(message, "Unknown mnemonic 'WIGGLE'");
        assert_eq!(span.offset(), 7);
        assert_eq!(span.len(), 6);
        assert_eq!(src, source);
        assert_eq!(error.code(), "A001");
    }

    #[test]
    fn test_execution_error_code() {
        let error = Error::from(VmError::DivisionByZero { pc: 3 });
        assert_eq!(error.code(), "division_by_zero");
        assert_eq!(error.to_string(), "Execution failed");
        let source = std::error::Error::source(&error).map(|e| e.to_string());
        assert_eq!(source.as_deref(), Some("Division by zero at offset 3"));
    }
}
