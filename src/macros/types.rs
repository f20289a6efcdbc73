//! Core macro data types.
//!
//! This module has no dependencies on other macro modules. A [`MacroDefinition`] is the
//! canonical record kept in the table; an [`ExpansionFrame`] is a private, independently
//! owned instantiation of one, living only while its body is being traversed.

use serde::{Deserialize, Serialize};

/// A formal parameter, optionally carrying a default used when a call omits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormalParam {
    pub name: String,
    pub default: Option<String>,
}

impl FormalParam {
    pub fn new(name: impl Into<String>, default: Option<String>) -> Self {
        Self {
            name: name.into(),
            default,
        }
    }
}

/// An internal label and the ordinal it is renamed to.
///
/// Inside a definition the ordinal is always the placeholder `0`; frames overwrite it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSlot {
    pub name: String,
    pub ordinal: u32,
}

/// Internal labels in the order they were first recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap {
    slots: Vec<LabelSlot>,
}

impl LabelMap {
    /// Records `name` with a zero placeholder; recording an existing label resets it to zero.
    pub fn record(&mut self, name: &str) {
        match self.slots.iter_mut().find(|slot| slot.name == name) {
            Some(slot) => slot.ordinal = 0,
            None => self.slots.push(LabelSlot {
                name: name.to_string(),
                ordinal: 0,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.slots
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.ordinal)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelSlot> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut LabelSlot> {
        self.slots.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.name.as_str())
    }
}

/// A captured `NAME MACRO p1, p2=default ... MEND` definition.
///
/// Body lines are not copied: `start_line..=end_line` indexes the source sequence, and the
/// range is empty when `end_line < start_line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroDefinition {
    pub name: String,
    pub params: Vec<FormalParam>,
    pub labels: LabelMap,
    pub start_line: usize,
    pub end_line: usize,
}

impl MacroDefinition {
    /// Opens a capture; the end boundary is fixed later by [`MacroDefinition::close`].
    pub fn open(name: impl Into<String>, start_line: usize, params: Vec<FormalParam>) -> Self {
        Self {
            name: name.into(),
            params,
            labels: LabelMap::default(),
            start_line,
            end_line: start_line.saturating_sub(1),
        }
    }

    pub fn record_label(&mut self, name: &str) {
        self.labels.record(name);
    }

    pub fn close(&mut self, end_line: usize) {
        self.end_line = end_line;
    }

    /// Number of body lines between the delimiters.
    pub fn body_len(&self) -> usize {
        (self.end_line + 1).saturating_sub(self.start_line)
    }

    /// Formals a call must supply because they carry no default.
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| p.default.is_none()).count()
    }
}

/// A formal parameter bound to the value it takes in one expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub formal: String,
    pub value: String,
}

/// Source of label ordinals for a whole run. Every draw is unique and strictly increasing.
#[derive(Debug, Clone, Default)]
pub struct LabelCounter {
    next: u32,
}

impl LabelCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self) -> u32 {
        let ordinal = self.next;
        self.next += 1;
        ordinal
    }

    /// How many ordinals have been handed out.
    pub fn issued(&self) -> u32 {
        self.next
    }
}

/// A live instantiation of a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionFrame {
    pub name: String,
    pub bindings: Vec<Binding>,
    pub labels: LabelMap,
    /// Rendered replacement for each label, parallel to `labels`.
    pub renames: Vec<String>,
    pub call_line: usize,
    pub start_line: usize,
    pub end_line: usize,
}

/// A single macro expansion step, for traceability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpansionStep {
    pub macro_name: String,
    pub call_line: usize,
    /// Frames that were active when the call was read.
    pub depth: usize,
    pub bindings: Vec<Binding>,
    /// `(label, renamed)` pairs.
    pub renames: Vec<(String, String)>,
}

impl ExpansionStep {
    pub fn from_frame(frame: &ExpansionFrame, depth: usize) -> Self {
        Self {
            macro_name: frame.name.clone(),
            call_line: frame.call_line,
            depth,
            bindings: frame.bindings.clone(),
            renames: frame
                .labels
                .names()
                .map(str::to_string)
                .zip(frame.renames.iter().cloned())
                .collect(),
        }
    }
}
