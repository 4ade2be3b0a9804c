use serde::Serialize;

use crate::error::Error;

/// The range a paren trail occupies on one output line.
///
/// `[start_x, end_x)` consists solely of close-parens in the output text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailRange {
    pub line_no: usize,
    pub start_x: usize,
    pub end_x: usize,
}

/// An open paren the cursor line could be re-indented against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabStop {
    pub ch: char,
    pub x: usize,
    pub line_no: usize,
    /// Column of the opener's first argument, when one was seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg_x: Option<usize>,
}

/// The close-paren matched to a [`Paren`] in the parse-tree export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Closer {
    pub line_no: usize,
    pub x: usize,
    pub ch: char,
}

/// One opener in the parse-tree export (`Options::return_parens`).
///
/// Positions are output coordinates. `closer` is absent only when the run
/// failed before the opener was closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paren {
    pub ch: char,
    pub line_no: usize,
    pub x: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg_x: Option<usize>,
    pub children: Vec<Paren>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closer: Option<Closer>,
}

/// The result of one transformation run.
///
/// On success, `text` holds the rewritten source and `error` is `None`. On
/// failure, `text` echoes the original input (or the partial rewrite when
/// `Options::partial_result` was set) and `error` describes the offending
/// position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub success: bool,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_x: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
    pub tab_stops: Vec<TabStop>,
    pub paren_trails: Vec<TrailRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parens: Option<Vec<Paren>>,
}
