//! Unified, `miette`-based diagnostics for the preprocessor.
//!
//! Every failure the expander can hit is a variant of [`PreprocessError`]. All of them are
//! fatal: the run stops at the first one. Variants that point at a source line carry the
//! whole source as a `NamedSource` plus the line's span, so the CLI prints a labelled
//! snippet through `miette::Report`.

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::source::SourceText;

pub type Result<T> = std::result::Result<T, PreprocessError>;

/// Type-safe error classification, mirroring the [`PreprocessError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    NotFound,
    UnbalancedDefinition,
    RecursiveExpansion,
    ParameterArityMismatch,
    Io,
    Config,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::NotFound => "NotFound",
            ErrorType::UnbalancedDefinition => "UnbalancedDefinition",
            ErrorType::RecursiveExpansion => "RecursiveExpansion",
            ErrorType::ParameterArityMismatch => "ParameterArityMismatch",
            ErrorType::Io => "Io",
            ErrorType::Config => "Config",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum PreprocessError {
    #[error("source file '{}' not found", .path.display())]
    #[diagnostic(
        code(macroasm::not_found),
        help("check that the path exists and names a regular file")
    )]
    NotFound { path: PathBuf },

    #[error("line {line}: end of macro definition without a matching start")]
    #[diagnostic(
        code(macroasm::unbalanced_definition),
        help("every end-of-definition line must close a `NAME MACRO ...` line above it")
    )]
    UnbalancedDefinition {
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("no macro definition is open here")]
        span: SourceSpan,
    },

    #[error("line {line}: infinite recursion expanding macro '{name}'")]
    #[diagnostic(
        code(macroasm::recursive_expansion),
        help("a macro may not call itself, directly or through another macro")
    )]
    RecursiveExpansion {
        name: String,
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("'{name}' is already being expanded")]
        span: SourceSpan,
    },

    #[error(
        "line {line}: wrong number of parameters for macro '{name}' \
         (expected {expected}, got {supplied}); expansion depth: {depth}"
    )]
    #[diagnostic(
        code(macroasm::parameter_arity),
        help("supply a value for '{parameter}' or give it a default with `{parameter}=value`")
    )]
    ParameterArityMismatch {
        name: String,
        parameter: String,
        line: usize,
        depth: usize,
        expected: usize,
        supplied: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("missing value for '{parameter}'")]
        span: SourceSpan,
    },

    #[error("failed to {operation} '{}'", .path.display())]
    #[diagnostic(code(macroasm::io))]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid syntax configuration '{}': {message}", .path.display())]
    #[diagnostic(code(macroasm::config))]
    Config { path: PathBuf, message: String },
}

impl PreprocessError {
    pub fn error_type(&self) -> ErrorType {
        match self {
            PreprocessError::NotFound { .. } => ErrorType::NotFound,
            PreprocessError::UnbalancedDefinition { .. } => ErrorType::UnbalancedDefinition,
            PreprocessError::RecursiveExpansion { .. } => ErrorType::RecursiveExpansion,
            PreprocessError::ParameterArityMismatch { .. } => ErrorType::ParameterArityMismatch,
            PreprocessError::Io { .. } => ErrorType::Io,
            PreprocessError::Config { .. } => ErrorType::Config,
        }
    }

    /// Source line the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            PreprocessError::UnbalancedDefinition { line, .. }
            | PreprocessError::RecursiveExpansion { line, .. }
            | PreprocessError::ParameterArityMismatch { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub(crate) fn unbalanced(source: &SourceText, line: usize) -> Self {
        PreprocessError::UnbalancedDefinition {
            line,
            src: source.to_named_source(),
            span: source.line_span(line),
        }
    }

    pub(crate) fn recursion(source: &SourceText, name: &str, line: usize) -> Self {
        PreprocessError::RecursiveExpansion {
            name: name.to_string(),
            line,
            src: source.to_named_source(),
            span: source.line_span(line),
        }
    }

    pub(crate) fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PreprocessError::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_errors_carry_line_and_type() {
        let source = SourceText::new("t.mac", "NOP\nMEND\n");
        let err = PreprocessError::unbalanced(&source, 2);
        assert_eq!(err.error_type(), ErrorType::UnbalancedDefinition);
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn recursion_message_names_macro() {
        let source = SourceText::new("t.mac", "LOOP\n");
        let err = PreprocessError::recursion(&source, "LOOP", 1);
        assert_eq!(err.error_type(), ErrorType::RecursiveExpansion);
        assert!(err.to_string().contains("'LOOP'"));
    }

    #[test]
    fn diagnostic_codes_are_stable() {
        let err = PreprocessError::NotFound {
            path: PathBuf::from("missing.mac"),
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("macroasm::not_found"));
        assert_eq!(err.line(), None);
    }
}
