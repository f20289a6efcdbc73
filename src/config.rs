//! Dialect settings for the preprocessor.
//!
//! The defaults describe the classic `MACRO`/`MEND` syntax. A YAML file can override any
//! subset of the keys; unknown keys are rejected so typos surface immediately.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{PreprocessError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntaxConfig {
    /// Second token of a start-of-definition line.
    pub macro_keyword: String,
    /// Token that closes a definition.
    pub end_keyword: String,
    /// A line whose first character is one of these is a comment.
    pub comment_chars: Vec<char>,
    /// Prefix of a renamed internal label.
    pub label_prefix: String,
    /// Zero-padded digit count of a renamed internal label.
    pub label_width: usize,
    /// Extension given to the output file.
    pub output_extension: String,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            macro_keyword: "MACRO".to_string(),
            end_keyword: "MEND".to_string(),
            comment_chars: vec![';', '#'],
            label_prefix: "??".to_string(),
            label_width: 4,
            output_extension: "asm".to_string(),
        }
    }
}

impl SyntaxConfig {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| PreprocessError::Io {
            operation: "read".to_string(),
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse_yaml(path, &text)
    }

    fn parse_yaml(path: &Path, text: &str) -> Result<Self> {
        let config: SyntaxConfig = if text.trim().is_empty() {
            SyntaxConfig::default()
        } else {
            serde_yaml::from_str(text).map_err(|e| PreprocessError::config(path, e.to_string()))?
        };
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        for (key, value) in [
            ("macro_keyword", &self.macro_keyword),
            ("end_keyword", &self.end_keyword),
            ("label_prefix", &self.label_prefix),
            ("output_extension", &self.output_extension),
        ] {
            if value.trim().is_empty() {
                return Err(PreprocessError::config(path, format!("'{key}' must not be empty")));
            }
        }
        if self.macro_keyword == self.end_keyword {
            return Err(PreprocessError::config(
                path,
                "'macro_keyword' and 'end_keyword' must differ",
            ));
        }
        if self.label_width == 0 {
            return Err(PreprocessError::config(path, "'label_width' must be at least 1"));
        }
        Ok(())
    }

    /// Renders a label ordinal, e.g. `??0007`.
    pub fn render_label(&self, ordinal: u32) -> String {
        format!(
            "{}{:0width$}",
            self.label_prefix,
            ordinal,
            width = self.label_width
        )
    }

    pub fn is_comment_start(&self, c: char) -> bool {
        self.comment_chars.contains(&c)
    }
}
