//! Line normalization and operand tokenization.
//!
//! A raw line is normalized (whitespace runs collapsed, ends trimmed, spacing around `=`
//! removed) before anything else looks at it. Comment and blank lines are dropped here and
//! never reach dispatch.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::SyntaxConfig;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref ASSIGNMENT: Regex = Regex::new(r" ?= ?").unwrap();
    // `name=default` stays one token; otherwise a word run with an optional label colon.
    static ref OPERAND: Regex = Regex::new(r"[\w\[\]]+=[\w\[\]]*|[\w\[\]]+:?").unwrap();
}

pub const LABEL_MARKER: char = ':';
pub const ASSIGNMENT_MARKER: char = '=';

/// Collapses whitespace, trims, and glues `a = b` into `a=b`.
pub fn normalize(raw: &str) -> String {
    let collapsed = WHITESPACE.replace_all(raw.trim(), " ");
    ASSIGNMENT.replace_all(&collapsed, "=").into_owned()
}

/// True for lines that are dropped before dispatch: empty, or starting with a comment marker.
pub fn is_incorrect(line: &str, syntax: &SyntaxConfig) -> bool {
    match line.chars().next() {
        None => true,
        Some(c) => syntax.is_comment_start(c),
    }
}

pub fn tokenize(line: &str) -> Vec<String> {
    OPERAND
        .find_iter(line)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A normalized line that survived classification, with its operand tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub text: String,
    pub tokens: Vec<String>,
}

impl SourceLine {
    /// Classifies an already-normalized line. `None` means the line is skipped.
    pub fn classify(text: String, syntax: &SyntaxConfig) -> Option<Self> {
        if is_incorrect(&text, syntax) {
            return None;
        }
        let tokens = tokenize(&text);
        if tokens.is_empty() {
            return None;
        }
        Some(Self { text, tokens })
    }

    pub fn first(&self) -> &str {
        &self.tokens[0]
    }

    /// The first token without its label marker, if it carries one.
    pub fn label(&self) -> Option<&str> {
        self.first().strip_suffix(LABEL_MARKER)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Tokens after the first (call-site actuals or definition header remainder).
    pub fn operands(&self) -> &[String] {
        &self.tokens[1..]
    }
}

/// Splits a formal parameter token on its assignment marker into name and default.
pub fn split_formal(token: &str) -> (String, Option<String>) {
    match token.split_once(ASSIGNMENT_MARKER) {
        Some((name, default)) => (name.to_string(), Some(default.to_string())),
        None => (token.to_string(), None),
    }
}
