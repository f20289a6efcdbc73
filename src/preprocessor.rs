//! File-level driver: resolves paths, reads the source once, and runs the expander into the
//! output file.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::SyntaxConfig;
use crate::diagnostics::{PreprocessError, Result};
use crate::engine::Expander;
use crate::macros::{ExpansionStep, MacroTable};
use crate::output::{FileSink, OutputBuffer};
use crate::source::SourceText;

/// Output path for `source`: same directory, the file name up to its first period, plus
/// `extension`.
pub fn output_path_for(source: &Path, extension: &str) -> PathBuf {
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();
    source.with_file_name(format!("{stem}.{extension}"))
}

/// What a successful [`Preprocessor::run`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub lines_written: usize,
    pub macros_defined: usize,
    pub expansions: usize,
}

/// An in-memory expansion: the emitted lines plus what the run learned on the way.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub lines: Vec<String>,
    pub macros: MacroTable,
    pub steps: Vec<ExpansionStep>,
}

impl Expansion {
    /// The expansion as output file text.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

#[derive(Debug, Clone)]
pub struct Preprocessor {
    source_path: PathBuf,
    output_path: Option<PathBuf>,
    syntax: SyntaxConfig,
}

impl Preprocessor {
    /// Fails with `NotFound` unless `path` names an existing file.
    pub fn construct(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PreprocessError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            source_path: path.to_path_buf(),
            output_path: None,
            syntax: SyntaxConfig::default(),
        })
    }

    pub fn with_syntax(mut self, syntax: SyntaxConfig) -> Self {
        self.syntax = syntax;
        self
    }

    /// Writes to `path` instead of the derived `.asm` sibling.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn syntax(&self) -> &SyntaxConfig {
        &self.syntax
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| output_path_for(&self.source_path, &self.syntax.output_extension))
    }

    /// Expands the source into the output file.
    ///
    /// On error the output file may be left partially written.
    pub fn run(&self) -> Result<RunSummary> {
        let source = SourceText::from_file(&self.source_path)?;
        let output_path = self.output_path();
        let mut sink = FileSink::create(&output_path)?;
        let summary = Expander::new(&source, &self.syntax).run(&mut sink)?;
        let lines_written = sink.finish()?;

        info!(
            source = %self.source_path.display(),
            output = %output_path.display(),
            lines = lines_written,
            macros = summary.macros.len(),
            expansions = summary.expansions,
            "preprocessing complete"
        );
        Ok(RunSummary {
            output_path,
            lines_written,
            macros_defined: summary.macros.len(),
            expansions: summary.expansions,
        })
    }

    /// Expands the source in memory with a full trace; nothing is written.
    pub fn expand(&self) -> Result<Expansion> {
        let source = SourceText::from_file(&self.source_path)?;
        expand_source(&source, &self.syntax)
    }
}

/// Expands already-loaded source text in memory, recording a trace.
pub fn expand_source(source: &SourceText, syntax: &SyntaxConfig) -> Result<Expansion> {
    let mut buffer = OutputBuffer::new();
    let summary = Expander::new(source, syntax)
        .with_trace()
        .run(&mut buffer)?;
    Ok(Expansion {
        lines: buffer.into_lines(),
        macros: summary.macros,
        steps: summary.steps,
    })
}

/// Expands `text` with the default syntax and returns the output file text.
pub fn expand_str(text: &str) -> Result<String> {
    let source = SourceText::new("<input>", text);
    expand_source(&source, &SyntaxConfig::default()).map(|expansion| expansion.text())
}
