//! The macroasm Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Command, MacroasmArgs, SourceArgs};
use crate::config::SyntaxConfig;
use crate::diagnostics::{PreprocessError, Result};
use crate::output::{OutputSink, StdoutSink};
use crate::preprocessor::Preprocessor;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = MacroasmArgs::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Command::Expand { source, output } => handle_expand(&source, output),
        Command::Print { source } => handle_print(&source),
        Command::Trace { source } => handle_trace(&source),
        Command::Macros { source, json } => handle_macros(&source, json),
    };

    if let Err(e) = result {
        eprintln!("{:?}", miette::Report::new(e));
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "macroasm=debug" } else { "macroasm=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load(source: &SourceArgs) -> Result<Preprocessor> {
    let preprocessor = Preprocessor::construct(&source.file)?;
    match &source.config {
        Some(path) => Ok(preprocessor.with_syntax(SyntaxConfig::load_from_path(path)?)),
        None => Ok(preprocessor),
    }
}

fn stdout_error(e: std::io::Error) -> PreprocessError {
    PreprocessError::Io {
        operation: "write".to_string(),
        path: "<stdout>".into(),
        source: e,
    }
}

fn handle_expand(source: &SourceArgs, output_path: Option<PathBuf>) -> Result<()> {
    let mut preprocessor = load(source)?;
    if let Some(path) = output_path {
        preprocessor = preprocessor.with_output(path);
    }
    let summary = preprocessor.run()?;
    output::print_summary(&summary).map_err(stdout_error)
}

fn handle_print(source: &SourceArgs) -> Result<()> {
    let expansion = load(source)?.expand()?;
    let mut sink = StdoutSink::new();
    for line in &expansion.lines {
        sink.emit(line)?;
    }
    Ok(())
}

fn handle_trace(source: &SourceArgs) -> Result<()> {
    let expansion = load(source)?.expand()?;
    output::print_trace(&expansion.steps).map_err(stdout_error)
}

fn handle_macros(source: &SourceArgs, json: bool) -> Result<()> {
    let expansion = load(source)?.expand()?;
    let definitions = expansion.macros.definitions();
    if json {
        output::print_json(&definitions).map_err(stdout_error)
    } else {
        output::print_macros(&definitions).map_err(stdout_error)
    }
}
