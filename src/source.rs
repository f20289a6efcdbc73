//! In-memory source text and the addressable line cursor used by the expander.
//!
//! The input file is read exactly once. Every line keeps its byte offset into the
//! original text so diagnostics can point miette at the offending line.

use std::fs;
use std::path::Path;

use miette::{NamedSource, SourceSpan};

use crate::diagnostics::{PreprocessError, Result};

/// The whole source, split into lines, with byte offsets for error reporting.
#[derive(Debug, Clone)]
pub struct SourceText {
    name: String,
    content: String,
    lines: Vec<String>,
    offsets: Vec<usize>,
}

impl SourceText {
    /// Builds a source from text already in memory.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let mut lines = Vec::new();
        let mut offsets = Vec::new();
        let mut offset = 0;
        for raw in content.split_inclusive('\n') {
            offsets.push(offset);
            offset += raw.len();
            let line = raw.strip_suffix('\n').unwrap_or(raw);
            let line = line.strip_suffix('\r').unwrap_or(line);
            lines.push(line.to_string());
        }
        Self {
            name: name.into(),
            content,
            lines,
            offsets,
        }
    }

    /// Reads a file from disk in one pass.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| PreprocessError::Io {
            operation: "read".to_string(),
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(path.display().to_string(), content))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns line `number` (1-based).
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .map(String::as_str)
    }

    /// A fresh cursor positioned before line 1.
    pub fn cursor(&self) -> LineSource<'_> {
        LineSource {
            source: self,
            next: 1,
        }
    }

    /// Span covering line `number` without its terminator; empty lines get a zero-width span.
    pub fn line_span(&self, number: usize) -> SourceSpan {
        let Some(index) = number.checked_sub(1) else {
            return SourceSpan::from((0, 0));
        };
        match (self.offsets.get(index), self.lines.get(index)) {
            (Some(&start), Some(line)) => SourceSpan::from((start, line.len())),
            _ => SourceSpan::from((self.content.len(), 0)),
        }
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.clone())
    }
}

/// Sequential, repositionable access to the lines of a [`SourceText`].
#[derive(Debug, Clone)]
pub struct LineSource<'a> {
    source: &'a SourceText,
    next: usize,
}

impl<'a> LineSource<'a> {
    /// Returns the next line's raw text and advances, or `None` at end of input.
    pub fn read_next(&mut self) -> Option<&'a str> {
        let line = self.source.line(self.next)?;
        self.next += 1;
        Some(line)
    }

    /// Repositions so the next `read_next` yields line `n`.
    pub fn jump_to(&mut self, n: usize) {
        self.next = n.max(1);
    }

    /// Number of the line most recently returned by `read_next` (0 before the first read).
    pub fn position(&self) -> usize {
        self.next - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceText {
        SourceText::new("sample.mac", "first\r\nsecond\n\nfourth")
    }

    #[test]
    fn splits_lines_and_strips_terminators() {
        let source = sample();
        assert_eq!(source.len(), 4);
        assert_eq!(source.line(1), Some("first"));
        assert_eq!(source.line(2), Some("second"));
        assert_eq!(source.line(3), Some(""));
        assert_eq!(source.line(4), Some("fourth"));
        assert_eq!(source.line(0), None);
        assert_eq!(source.line(5), None);
    }

    #[test]
    fn read_next_advances_and_reports_position() {
        let source = sample();
        let mut cursor = source.cursor();
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.read_next(), Some("first"));
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.read_next(), Some("second"));
        assert_eq!(cursor.read_next(), Some(""));
        assert_eq!(cursor.read_next(), Some("fourth"));
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.read_next(), None);
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn jump_to_is_repeatable() {
        let source = sample();
        let mut cursor = source.cursor();
        cursor.jump_to(4);
        assert_eq!(cursor.read_next(), Some("fourth"));
        cursor.jump_to(2);
        cursor.jump_to(2);
        assert_eq!(cursor.read_next(), Some("second"));
        assert_eq!(cursor.position(), 2);
        cursor.jump_to(0);
        assert_eq!(cursor.read_next(), Some("first"));
    }

    #[test]
    fn line_span_points_at_line_text() {
        let source = sample();
        assert_eq!(source.line_span(1), SourceSpan::from((0, 5)));
        assert_eq!(source.line_span(2), SourceSpan::from((7, 6)));
        assert_eq!(source.line_span(4), SourceSpan::from((15, 6)));
    }
}
