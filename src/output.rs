//! Output sinks: where finalized lines go.
//!
//! The expander hands every line that reaches the emit step to an [`OutputSink`]. Each line
//! is written followed by `\n`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::diagnostics::{PreprocessError, Result};

pub trait OutputSink {
    fn emit(&mut self, line: &str) -> Result<()>;
}

/// OutputBuffer: collects output in memory for testing or programmatic capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBuffer {
    lines: Vec<String>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// The buffer as file text: every line newline-terminated.
    pub fn as_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, line: &str) -> Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

/// Buffered writer over the output file. The handle is released when the sink drops, so
/// a failed run leaves whatever was written so far.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl FileSink {
    /// Creates (or truncates) `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| write_error(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes and closes the file, returning the number of lines written.
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush().map_err(|e| write_error(&self.path, e))?;
        Ok(self.written)
    }
}

impl OutputSink for FileSink {
    fn emit(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}").map_err(|e| write_error(&self.path, e))?;
        self.written += 1;
        Ok(())
    }
}

/// StdoutSink: writes output to stdout for the CLI.
pub struct StdoutSink {
    stdout: io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for StdoutSink {
    fn emit(&mut self, line: &str) -> Result<()> {
        writeln!(self.stdout.lock(), "{line}").map_err(|e| write_error(Path::new("<stdout>"), e))
    }
}

fn write_error(path: &Path, source: io::Error) -> PreprocessError {
    PreprocessError::Io {
        operation: "write".to_string(),
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn buffer_terminates_every_line() {
        let mut buffer = OutputBuffer::new();
        assert_eq!(buffer.as_text(), "");
        buffer.emit("MOV A,5").unwrap();
        buffer.emit("MOV A,7").unwrap();
        assert_eq!(buffer.as_text(), "MOV A,5\nMOV A,7\n");
        assert_eq!(buffer.lines().len(), 2);
    }

    #[test]
    fn file_sink_writes_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.asm");
        let mut sink = FileSink::create(&path).unwrap();
        sink.emit("NOP").unwrap();
        sink.emit("HLT").unwrap();
        assert_eq!(sink.path(), path.as_path());
        assert_eq!(sink.finish().unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "NOP\nHLT\n");
    }

    #[test]
    fn file_sink_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.asm");
        let err = FileSink::create(&path).unwrap_err();
        assert!(err.to_string().contains("failed to write"));
    }
}
