//! Error diagnostics with source snippets and caret underlines.

use crate::CompileError;

/// A rendered diagnostic with source context
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub col: usize,
    pub offset: usize,
    pub source_line: Option<String>,
    pub underline: Option<String>,
}

impl Diagnostic {
    /// Build a diagnostic from a compile error and the expression text.
    pub fn from_error(error: &CompileError, expression: &str) -> Diagnostic {
        let (line, col) = error.position();
        let source_line = expression.lines().nth(line.saturating_sub(1));
        let underline = source_line.map(|text| {
            let mut marker = String::new();
            for (i, ch) in text.chars().enumerate() {
                if i + 1 == col {
                    break;
                }
                // Keep tabs so the caret lines up in a terminal.
                marker.push(if ch == '\t' { '\t' } else { ' ' });
            }
            marker.push('^');
            marker
        });
        Diagnostic {
            message: error.to_string(),
            line,
            col,
            offset: error.offset(),
            source_line: source_line.map(|s| s.to_string()),
            underline,
        }
    }

    /// Render as plain text with the offending line and a caret.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.message);
        out.push('\n');
        if let (Some(line_text), Some(underline)) = (&self.source_line, &self.underline) {
            let line_str = format!("{}", self.line);
            out.push_str(&format!("  {} │ {}\n", line_str, line_text));
            let spaces = " ".repeat(line_str.len());
            out.push_str(&format!("  {} │ {}\n", spaces, underline));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    #[test]
    fn renders_caret_at_error_column() {
        let err = compile("foo.").unwrap_err();
        let diag = Diagnostic::from_error(&err, "foo.");
        let rendered = diag.render();
        assert!(rendered.contains("foo."));
        assert!(rendered.contains('^'));
        assert_eq!(diag.line, 1);
        assert_eq!(diag.col, 5);
    }

    #[test]
    fn keeps_offset_for_callers() {
        let err = compile("a.#b").unwrap_err();
        let diag = Diagnostic::from_error(&err, "a.#b");
        assert_eq!(diag.offset, 2);
    }
}
