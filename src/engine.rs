//! The expansion control loop.
//!
//! The source is held in memory as an ordered line sequence. The top-level traversal walks
//! it once; each macro call opens a fresh cursor over the callee's body range and walks that
//! recursively with the new frame on top of the expansion stack. When the body cursor passes
//! the frame's end boundary the frame is popped and the caller's cursor simply continues with
//! the line after the call.
//!
//! Per fetched line, dispatch runs in a fixed order:
//!
//! 1. skip blank and comment lines;
//! 2. while a capture is open, record a leading `label:` into it (does not short-circuit);
//! 3. close the active frame once the line number passes its end boundary;
//! 4. expand a call to a known macro (only when no capture is open);
//! 5. close the open capture on the end keyword;
//! 6. open a capture on `NAME MACRO params...` for an unknown name;
//! 7. otherwise emit the line, unless a capture is absorbing it.

use tracing::{debug, trace, warn};

use crate::config::SyntaxConfig;
use crate::diagnostics::{PreprocessError, Result};
use crate::macros::{
    instantiate, CallSite, ExpansionFrame, ExpansionStep, FormalParam, LabelCounter,
    MacroDefinition, MacroTable,
};
use crate::output::OutputSink;
use crate::source::{LineSource, SourceText};
use crate::tokenizer::{normalize, split_formal, SourceLine};

/// What a traversal does after dispatching a line.
enum Flow {
    Continue,
    CloseFrame,
}

/// Result of a completed expansion run.
#[derive(Debug, Clone, Default)]
pub struct ExpansionSummary {
    /// The macro table as it stood at end of input.
    pub macros: MacroTable,
    /// One entry per expansion, empty unless tracing was requested.
    pub steps: Vec<ExpansionStep>,
    pub lines_emitted: usize,
    pub expansions: usize,
    pub labels_issued: u32,
}

/// Single-use driver state for one run over one source.
pub struct Expander<'a> {
    source: &'a SourceText,
    syntax: &'a SyntaxConfig,
    table: MacroTable,
    definitions: Vec<MacroDefinition>,
    frames: Vec<ExpansionFrame>,
    labels: LabelCounter,
    steps: Option<Vec<ExpansionStep>>,
    lines_emitted: usize,
    expansions: usize,
}

impl<'a> Expander<'a> {
    pub fn new(source: &'a SourceText, syntax: &'a SyntaxConfig) -> Self {
        Self {
            source,
            syntax,
            table: MacroTable::new(),
            definitions: Vec::new(),
            frames: Vec::new(),
            labels: LabelCounter::new(),
            steps: None,
            lines_emitted: 0,
            expansions: 0,
        }
    }

    /// Records an [`ExpansionStep`] for every expansion.
    pub fn with_trace(mut self) -> Self {
        self.steps = Some(Vec::new());
        self
    }

    pub fn run(mut self, sink: &mut dyn OutputSink) -> Result<ExpansionSummary> {
        let cursor = self.source.cursor();
        self.traverse(cursor, sink)?;

        for open in &self.definitions {
            warn!(
                macro_name = %open.name,
                start_line = open.start_line,
                "macro definition never closed; its body was dropped"
            );
        }

        Ok(ExpansionSummary {
            macros: self.table,
            steps: self.steps.unwrap_or_default(),
            lines_emitted: self.lines_emitted,
            expansions: self.expansions,
            labels_issued: self.labels.issued(),
        })
    }

    fn traverse(&mut self, mut cursor: LineSource<'a>, sink: &mut dyn OutputSink) -> Result<()> {
        while let Some(raw) = cursor.read_next() {
            let number = cursor.position();
            let Some(line) = self.fetch(raw) else {
                continue;
            };
            if let Flow::CloseFrame = self.dispatch(number, &line, sink)? {
                break;
            }
        }
        Ok(())
    }

    /// Normalizes a raw line and applies the innermost frame's substitutions.
    fn fetch(&self, raw: &str) -> Option<SourceLine> {
        let text = normalize(raw);
        let text = match self.frames.last() {
            Some(frame) => frame.substitute(&text),
            None => text,
        };
        SourceLine::classify(text, self.syntax)
    }

    fn dispatch(
        &mut self,
        number: usize,
        line: &SourceLine,
        sink: &mut dyn OutputSink,
    ) -> Result<Flow> {
        if let (Some(open), Some(label)) = (self.definitions.last_mut(), line.label()) {
            open.record_label(label);
        }

        if self.frames.last().is_some_and(|frame| number > frame.end_line) {
            return Ok(Flow::CloseFrame);
        }

        if self.definitions.is_empty() && self.table.contains(line.first()) {
            self.expand(number, line, sink)?;
        } else if line.contains(&self.syntax.end_keyword) {
            self.close_definition(number)?;
        } else if self.opens_definition(line) {
            self.open_definition(number, line);
        } else if self.definitions.is_empty() {
            trace!(line = number, text = %line.text, "emit");
            sink.emit(&line.text)?;
            self.lines_emitted += 1;
        }
        Ok(Flow::Continue)
    }

    fn expand(&mut self, number: usize, line: &SourceLine, sink: &mut dyn OutputSink) -> Result<()> {
        let Some(definition) = self.table.lookup(line.first()) else {
            return Ok(());
        };
        let call = CallSite {
            line,
            number,
            source: self.source,
        };
        let frame = instantiate(definition, &call, &self.frames, &mut self.labels, self.syntax)?;

        debug!(
            macro_name = %frame.name,
            call_line = number,
            depth = self.frames.len(),
            "expanding macro"
        );
        if let Some(steps) = self.steps.as_mut() {
            steps.push(ExpansionStep::from_frame(&frame, self.frames.len()));
        }
        self.expansions += 1;

        let mut body = self.source.cursor();
        body.jump_to(frame.start_line);
        self.frames.push(frame);
        let traversed = self.traverse(body, sink);
        let closed = self.frames.pop();
        traversed?;

        if let Some(frame) = closed {
            debug!(
                macro_name = %frame.name,
                resume_line = frame.call_line + 1,
                "expansion closed"
            );
        }
        Ok(())
    }

    fn opens_definition(&self, line: &SourceLine) -> bool {
        line.tokens.len() >= 2
            && line.tokens[1] == self.syntax.macro_keyword
            && !self.table.contains(line.first())
    }

    fn open_definition(&mut self, number: usize, line: &SourceLine) {
        let params = line.tokens[2..]
            .iter()
            .map(|token| {
                let (name, default) = split_formal(token);
                FormalParam::new(name, default)
            })
            .collect();
        debug!(macro_name = %line.first(), line = number, "definition opened");
        self.definitions
            .push(MacroDefinition::open(line.first(), number + 1, params));
    }

    fn close_definition(&mut self, number: usize) -> Result<()> {
        let Some(mut definition) = self.definitions.pop() else {
            return Err(PreprocessError::unbalanced(self.source, number));
        };
        definition.close(number - 1);
        let name = definition.name.clone();
        let body_len = definition.body_len();
        if self.table.insert_if_absent(definition) {
            debug!(macro_name = %name, body_lines = body_len, "definition captured");
        } else {
            debug!(macro_name = %name, line = number, "redefinition skipped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorType;
    use crate::output::OutputBuffer;

    fn run(text: &str) -> Result<(Vec<String>, ExpansionSummary)> {
        let source = SourceText::new("test.mac", text);
        let syntax = SyntaxConfig::default();
        let mut buffer = OutputBuffer::new();
        let summary = Expander::new(&source, &syntax)
            .with_trace()
            .run(&mut buffer)?;
        Ok((buffer.into_lines(), summary))
    }

    #[test]
    fn captures_definition_boundaries_and_labels() {
        let (_, summary) = run("PUT MACRO V, R=A\nagain: MVI R,V\nJNZ again\nMEND\n").unwrap();
        let def = summary.macros.lookup("PUT").unwrap();
        assert_eq!(def.start_line, 2);
        assert_eq!(def.end_line, 3);
        assert_eq!(
            def.params,
            vec![
                FormalParam::new("V", None),
                FormalParam::new("R", Some("A".to_string())),
            ]
        );
        assert_eq!(def.labels.names().collect::<Vec<_>>(), vec!["again"]);
    }

    #[test]
    fn defaults_fill_short_calls() {
        let (lines, _) = run("PUT MACRO V, R=A\nMVI R,V\nMEND\nPUT 1\nPUT 2, B\n").unwrap();
        assert_eq!(lines, vec!["MVI A,1", "MVI B,2"]);
    }

    #[test]
    fn nested_capture_of_same_name_keeps_first_closed() {
        let text = "A MACRO\nNOP\nA MACRO\nHLT\nMEND\nMEND\nA\n";
        let (lines, summary) = run(text).unwrap();
        assert_eq!(summary.macros.len(), 1);
        assert_eq!(summary.macros.lookup("A").unwrap().start_line, 4);
        assert_eq!(lines, vec!["HLT"]);
    }

    #[test]
    fn header_naming_known_macro_is_a_call() {
        // `M MACRO` after M exists expands M; the following MEND then closes nothing.
        let err = run("M MACRO\nNOP\nMEND\nM MACRO\nHLT\nMEND\n").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::UnbalancedDefinition);
        assert_eq!(err.line(), Some(6));
    }

    #[test]
    fn stray_end_keyword_is_unbalanced() {
        let err = run("NOP\nMEND\n").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::UnbalancedDefinition);
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn call_before_definition_passes_through() {
        let (lines, summary) = run("LATE 1\nLATE MACRO X\nDB X\nMEND\n").unwrap();
        assert_eq!(lines, vec!["LATE 1"]);
        assert_eq!(summary.expansions, 0);
    }

    #[test]
    fn empty_body_expands_to_nothing() {
        let (lines, summary) = run("E MACRO\nMEND\nE\nNOP\n").unwrap();
        assert_eq!(lines, vec!["NOP"]);
        assert_eq!(summary.expansions, 1);
    }

    #[test]
    fn trace_records_depth_and_renames() {
        let text = "\
IN MACRO P
l: DB P
MEND
OUT MACRO Q
IN Q
MEND
OUT 9
";
        let (lines, summary) = run(text).unwrap();
        assert_eq!(lines, vec!["??0000: DB 9"]);
        assert_eq!(summary.steps.len(), 2);
        assert_eq!(summary.steps[0].macro_name, "OUT");
        assert_eq!(summary.steps[0].depth, 0);
        assert_eq!(summary.steps[1].macro_name, "IN");
        assert_eq!(summary.steps[1].depth, 1);
        assert_eq!(summary.steps[1].call_line, 5);
        assert_eq!(
            summary.steps[1].renames,
            vec![("l".to_string(), "??0000".to_string())]
        );
        assert_eq!(summary.labels_issued, 1);
    }

    #[test]
    fn unclosed_definition_absorbs_rest_of_input() {
        let (lines, summary) = run("NOP\nOPEN MACRO\nHLT\n").unwrap();
        assert_eq!(lines, vec!["NOP"]);
        assert!(summary.macros.is_empty());
    }
}
