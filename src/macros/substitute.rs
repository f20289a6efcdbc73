//! Whole-word text substitution for parameter binding and label renaming.

use std::borrow::Cow;

use crate::macros::types::ExpansionFrame;

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Replaces every occurrence of `word` that is not part of a longer identifier.
pub fn replace_whole_word<'t>(text: &'t str, word: &str, replacement: &str) -> Cow<'t, str> {
    if word.is_empty() {
        return Cow::Borrowed(text);
    }
    let mut out = String::new();
    let mut copied = 0;
    for (start, matched) in text.match_indices(word) {
        let end = start + matched.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        if before.is_some_and(is_ident_char) || after.is_some_and(is_ident_char) {
            continue;
        }
        out.push_str(&text[copied..start]);
        out.push_str(replacement);
        copied = end;
    }
    if copied == 0 {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[copied..]);
    Cow::Owned(out)
}

impl ExpansionFrame {
    /// Applies this frame's bindings, then its label renames, to one line.
    pub fn substitute(&self, line: &str) -> String {
        let mut text = line.to_string();
        for binding in &self.bindings {
            text = replace_whole_word(&text, &binding.formal, &binding.value).into_owned();
        }
        for (label, renamed) in self.labels.names().zip(&self.renames) {
            text = replace_whole_word(&text, label, renamed).into_owned();
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::types::{Binding, LabelMap};

    #[test]
    fn replaces_only_whole_words() {
        assert_eq!(replace_whole_word("MOV A,X", "X", "5"), "MOV A,5");
        assert_eq!(replace_whole_word("MOV AX,X", "X", "5"), "MOV AX,5");
        assert_eq!(replace_whole_word("X_1 X1 X", "X", "7"), "X_1 X1 7");
        assert_eq!(replace_whole_word("[X]+X", "X", "HL"), "[HL]+HL");
    }

    #[test]
    fn untouched_text_is_borrowed() {
        assert!(matches!(
            replace_whole_word("NOP", "X", "1"),
            Cow::Borrowed("NOP")
        ));
        assert!(matches!(replace_whole_word("NOP", "", "1"), Cow::Borrowed(_)));
    }

    #[test]
    fn replacement_at_start_is_applied() {
        assert_eq!(replace_whole_word("X", "X", "1"), "1");
        assert_eq!(replace_whole_word("X:", "X", ""), ":");
    }

    #[test]
    fn frame_applies_parameters_before_labels() {
        let mut labels = LabelMap::default();
        labels.record("loop");
        let frame = ExpansionFrame {
            name: "WAIT".to_string(),
            bindings: vec![Binding {
                formal: "N".to_string(),
                value: "loop".to_string(),
            }],
            labels,
            renames: vec!["??0003".to_string()],
            call_line: 9,
            start_line: 2,
            end_line: 4,
        };
        assert_eq!(frame.substitute("loop: DJNZ N"), "??0003: DJNZ ??0003");
    }
}
