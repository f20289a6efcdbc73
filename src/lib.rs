pub use crate::diagnostics::{ErrorType, PreprocessError, Result};
pub use crate::preprocessor::{expand_source, expand_str, Expansion, Preprocessor, RunSummary};

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod macros;
pub mod output;
pub mod preprocessor;
pub mod source;
pub mod tokenizer;
