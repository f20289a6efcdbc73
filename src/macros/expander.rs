//! Expansion start: turns a call line into a fresh [`ExpansionFrame`].
//!
//! Handles the recursion guard, positional parameter binding with defaults, and label
//! ordinal assignment. The label counter is owned by the caller and passed in explicitly.

use crate::config::SyntaxConfig;
use crate::diagnostics::{PreprocessError, Result};
use crate::macros::types::{Binding, ExpansionFrame, LabelCounter, MacroDefinition};
use crate::source::SourceText;
use crate::tokenizer::SourceLine;

/// Everything a frame needs to know about the call that creates it.
pub struct CallSite<'a> {
    pub line: &'a SourceLine,
    pub number: usize,
    pub source: &'a SourceText,
}

/// Builds the frame for `call`, failing on recursion or a missing argument.
///
/// `active` is the whole expansion stack, innermost last; its length is the call depth.
pub fn instantiate(
    definition: &MacroDefinition,
    call: &CallSite<'_>,
    active: &[ExpansionFrame],
    counter: &mut LabelCounter,
    syntax: &SyntaxConfig,
) -> Result<ExpansionFrame> {
    let mut labels = definition.labels.clone();

    if active.iter().any(|frame| frame.name == definition.name) {
        return Err(PreprocessError::recursion(
            call.source,
            &definition.name,
            call.number,
        ));
    }

    let bindings = bind_params(definition, call, active.len())?;

    let mut renames = Vec::with_capacity(labels.len());
    for slot in labels.iter_mut() {
        slot.ordinal = counter.draw();
        renames.push(syntax.render_label(slot.ordinal));
    }

    Ok(ExpansionFrame {
        name: definition.name.clone(),
        bindings,
        labels,
        renames,
        call_line: call.number,
        start_line: definition.start_line,
        end_line: definition.end_line,
    })
}

/// Binds formals to the call's actuals by position; surplus actuals are ignored.
fn bind_params(
    definition: &MacroDefinition,
    call: &CallSite<'_>,
    depth: usize,
) -> Result<Vec<Binding>> {
    let actuals = call.line.operands();
    definition
        .params
        .iter()
        .enumerate()
        .map(|(index, formal)| {
            let value = actuals
                .get(index)
                .cloned()
                .or_else(|| formal.default.clone())
                .ok_or_else(|| PreprocessError::ParameterArityMismatch {
                    name: definition.name.clone(),
                    parameter: formal.name.clone(),
                    line: call.number,
                    depth,
                    expected: definition.params.len(),
                    supplied: actuals.len(),
                    src: call.source.to_named_source(),
                    span: call.source.line_span(call.number),
                })?;
            Ok(Binding {
                formal: formal.name.clone(),
                value,
            })
        })
        .collect()
}
