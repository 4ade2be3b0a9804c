//! Change-descriptor preprocessing.
//!
//! A host reports each edit as the text a range used to hold and the text it
//! holds now. The scanner only needs to know, at the input position where the
//! new text ends, how far the edit shifted everything after it on that line.
//! Preprocessing computes that end position and the shift once, so the hot
//! per-character path is a single map lookup.

use parinfer_common::Change;
use rustc_hash::FxHashMap;

use crate::lines::split_lines;

/// A change reduced to scan-time lookup form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TransformedChange {
    /// Where the replaced text used to end on its line.
    pub old_end_x: usize,
    /// Where the replacement ends on its line.
    pub new_end_x: usize,
    /// The input line the replacement ends on.
    pub new_end_line_no: usize,
}

/// Transformed changes keyed by the input position where each replacement
/// ends, which is where the scan applies the indent shift.
pub(crate) type ChangeMap = FxHashMap<(usize, usize), TransformedChange>;

fn transform_change(change: &Change) -> TransformedChange {
    let old_lines = split_lines(&change.old_text);
    let new_lines = split_lines(&change.new_text);

    let last_old_len = old_lines.last().map_or(0, |line| line.chars().count());
    let last_new_len = new_lines.last().map_or(0, |line| line.chars().count());

    // Ends that stay on the change's own line keep its x prefix; ends on a
    // later line start counting from column 0.
    let old_end_x = if old_lines.len() == 1 { change.x } else { 0 } + last_old_len;
    let new_end_x = if new_lines.len() == 1 { change.x } else { 0 } + last_new_len;
    let new_end_line_no = change.line_no + (new_lines.len() - 1);

    TransformedChange {
        old_end_x,
        new_end_x,
        new_end_line_no,
    }
}

/// Preprocess the caller's change list, or `None` when there is nothing to
/// track. Later changes win on key collision.
pub(crate) fn transform_changes(changes: &[Change]) -> Option<ChangeMap> {
    if changes.is_empty() {
        return None;
    }
    let mut map = ChangeMap::default();
    for change in changes {
        let transformed = transform_change(change);
        map.insert(
            (transformed.new_end_line_no, transformed.new_end_x),
            transformed,
        );
    }
    Some(map)
}
