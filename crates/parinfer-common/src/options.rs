use serde::{Deserialize, Serialize};

/// A single text edit the host applied to produce the current input.
///
/// `old_text` is what the range starting at (`line_no`, `x`) used to hold,
/// `new_text` is what it holds now. Both may span multiple lines. Smart Mode
/// and Paren Mode use these to shift children of an edited line by the same
/// amount the edit moved their parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub line_no: usize,
    pub x: usize,
    pub old_text: String,
    pub new_text: String,
}

/// Caller-supplied knobs for a transformation run. Everything is optional;
/// `Options::default()` is a plain cursorless run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Cursor position, in input coordinates.
    pub cursor_x: Option<usize>,
    pub cursor_line: Option<usize>,
    /// Cursor position before the edit; enables cursor-hold release in
    /// Smart Mode.
    pub prev_cursor_x: Option<usize>,
    pub prev_cursor_line: Option<usize>,
    /// Legacy Paren Mode hint: signed column shift of the cursor line.
    pub cursor_dx: Option<isize>,
    /// First line of an active selection. When set, Smart Mode runs without
    /// the Paren Mode fallback and tab stops are collected for this line
    /// instead of the cursor line.
    pub selection_start_line: Option<usize>,
    /// Edits applied since the last run, newest input positions.
    pub changes: Vec<Change>,
    /// On failure, include the partially rewritten text and shifted cursor
    /// in the result instead of the original input.
    pub partial_result: bool,
    /// Suppress `leading-close-paren` errors in Indent Mode.
    pub force_balance: bool,
    /// Attach a parse tree of openers with their closers to the result.
    pub return_parens: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_empty() {
        let options = Options::default();
        assert_eq!(options.cursor_x, None);
        assert_eq!(options.cursor_line, None);
        assert!(options.changes.is_empty());
        assert!(!options.partial_result);
        assert!(!options.force_balance);
        assert!(!options.return_parens);
    }

    #[test]
    fn change_deserializes_from_camel_case() {
        let json = r#"{"lineNo": 2, "x": 4, "oldText": "", "newText": "  "}"#;
        let change: Change = serde_json::from_str(json).unwrap();
        assert_eq!(
            change,
            Change {
                line_no: 2,
                x: 4,
                old_text: String::new(),
                new_text: "  ".to_string(),
            }
        );
    }
}
