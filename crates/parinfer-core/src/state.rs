//! The mutable scanner record threaded through a transformation run.
//!
//! One [`State`] is created per entry-point call, mutated character by
//! character, and finally packaged into the public [`Answer`]. Nothing here
//! is shared between runs.

use parinfer_common::{Answer, Closer, Error, ErrorKind, Options, Paren, TabStop, TrailRange};
use rustc_hash::FxHashMap;

use crate::changes::{transform_changes, ChangeMap};
use crate::lines::{line_ending, replace_within, split_lines};

/// Which structural element is the source of truth for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Indentation is truth; close-parens are inferred.
    Indent,
    /// Parens are truth; indentation is clamped to structure.
    Paren,
}

/// Early exit from a scan.
#[derive(Debug)]
pub(crate) enum Exit {
    /// Smart Indent Mode hit a structural ambiguity (a leading close-paren,
    /// or the cursor released a held paren trail): retry the whole text in
    /// Paren Mode.
    RetryParenMode,
    /// A user-visible error.
    Error(Error),
}

pub(crate) type Step<T> = Result<T, Exit>;

/// One currently-open paren on the stack.
#[derive(Debug, Clone)]
pub(crate) struct Opener {
    pub ch: char,
    /// Position in the output text.
    pub x: usize,
    pub line_no: usize,
    /// Position in the input text, for error reporting.
    pub input_x: usize,
    pub input_line_no: usize,
    /// Column shift applied to this opener's line relative to the input.
    pub indent_delta: isize,
    /// Max column a child indent may be clamped to (Paren Mode); set when
    /// this opener is popped by a paren-trail addition.
    pub max_child_indent: Option<usize>,
    /// Column of the first argument token after the opener.
    pub arg_x: Option<usize>,
    /// Arena slot when a parse tree was requested.
    pub node: Option<usize>,
}

/// The run of close-parens (and gaps) ending a form on the current line.
///
/// `line_no` is `None` until the first closable character positions the
/// trail, and again after a line ends inside a string.
#[derive(Debug, Default)]
pub(crate) struct ParenTrail {
    pub line_no: Option<usize>,
    pub start_x: usize,
    pub end_x: usize,
    /// Stack entries matched by the close-parens in the range, in match
    /// order (innermost first).
    pub openers: Vec<Opener>,
    /// What cursor clamping cut out of the trail (Indent Mode).
    pub clamped: Option<ClampedTrail>,
}

#[derive(Debug)]
pub(crate) struct ClampedTrail {
    pub start_x: usize,
    pub end_x: usize,
    pub openers: Vec<Opener>,
}

/// Arena node backing the `return_parens` parse tree.
#[derive(Debug)]
pub(crate) struct ParenNode {
    pub ch: char,
    pub line_no: usize,
    pub x: usize,
    pub arg_x: Option<usize>,
    pub closer: Option<Closer>,
    pub children: Vec<usize>,
}

/// Both coordinate spaces of a detected error condition, cached until the
/// deferred check that may surface it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ErrorPos {
    pub line_no: usize,
    pub x: usize,
    pub input_line_no: usize,
    pub input_x: usize,
}

/// Two-step search for the first argument column after an opener: skip the
/// opener itself, wait for whitespace, record the next token start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgTabStop {
    Space,
    Arg,
}

pub(crate) struct State {
    pub mode: Mode,
    pub smart: bool,

    pub orig_text: String,
    pub orig_cursor_x: Option<usize>,
    pub orig_cursor_line: Option<usize>,

    pub input_lines: Vec<String>,
    pub input_line_no: usize,
    pub input_x: usize,

    /// Output lines, mutated in place.
    pub lines: Vec<String>,
    pub line_no: usize,
    /// The character being processed; may be rewritten to the empty string
    /// (drop) or two spaces (tab expansion) before it is committed.
    pub ch: String,
    /// Output column on the current line.
    pub x: usize,
    /// Column at which indentation ended on this line, once known.
    pub indent_x: Option<usize>,
    /// Column at which a `;` comment started on this line, if any.
    pub comment_x: Option<usize>,

    pub paren_stack: Vec<Opener>,
    pub paren_trail: ParenTrail,
    /// Non-empty trails, one per touched line, for export.
    pub paren_trails: Vec<TrailRange>,

    pub return_parens: bool,
    pub paren_nodes: Vec<ParenNode>,
    pub paren_roots: Vec<usize>,

    pub cursor_x: Option<usize>,
    pub cursor_line: Option<usize>,
    pub prev_cursor_x: Option<usize>,
    pub prev_cursor_line: Option<usize>,
    pub cursor_dx: Option<isize>,
    pub selection_start_line: Option<usize>,

    pub changes: Option<ChangeMap>,

    pub is_in_code: bool,
    pub is_escaping: bool,
    pub is_escaped: bool,
    pub is_in_str: bool,
    pub is_in_comment: bool,

    pub quote_danger: bool,
    pub tracking_indent: bool,
    pub skip_char: bool,

    /// Global indentation cap in Paren Mode, used when the stack is empty.
    pub max_indent: Option<usize>,
    /// Signed shift applied to the current line so far.
    pub indent_delta: isize,

    pub tracking_arg_tab_stop: Option<ArgTabStop>,

    pub tab_stops: Vec<TabStop>,
    pub error_pos_cache: FxHashMap<ErrorKind, ErrorPos>,

    pub partial_result: bool,
    pub force_balance: bool,
}

impl State {
    pub(crate) fn new(text: &str, options: &Options, mode: Mode, smart: bool) -> Self {
        Self {
            mode,
            smart,

            orig_text: text.to_string(),
            orig_cursor_x: options.cursor_x,
            orig_cursor_line: options.cursor_line,

            input_lines: split_lines(text),
            input_line_no: 0,
            input_x: 0,

            lines: Vec::new(),
            line_no: 0,
            ch: String::new(),
            x: 0,
            indent_x: None,
            comment_x: None,

            paren_stack: Vec::new(),
            paren_trail: ParenTrail::default(),
            paren_trails: Vec::new(),

            return_parens: options.return_parens,
            paren_nodes: Vec::new(),
            paren_roots: Vec::new(),

            cursor_x: options.cursor_x,
            cursor_line: options.cursor_line,
            prev_cursor_x: options.prev_cursor_x,
            prev_cursor_line: options.prev_cursor_line,
            cursor_dx: options.cursor_dx,
            selection_start_line: options.selection_start_line,

            changes: transform_changes(&options.changes),

            is_in_code: true,
            is_escaping: false,
            is_escaped: false,
            is_in_str: false,
            is_in_comment: false,

            quote_danger: false,
            tracking_indent: false,
            skip_char: false,

            max_indent: None,
            indent_delta: 0,

            tracking_arg_tab_stop: None,

            tab_stops: Vec::new(),
            error_pos_cache: FxHashMap::default(),

            partial_result: options.partial_result,
            force_balance: options.force_balance,
        }
    }

    /// Reset per-line state. The next pushed output line becomes current.
    pub(crate) fn init_line(&mut self) {
        self.x = 0;
        self.line_no = self.lines.len();

        self.indent_x = None;
        self.comment_x = None;
        self.indent_delta = 0;

        self.error_pos_cache.remove(&ErrorKind::UnmatchedCloseParen);
        self.error_pos_cache.remove(&ErrorKind::UnmatchedOpenParen);
        self.error_pos_cache.remove(&ErrorKind::LeadingCloseParen);

        self.tracking_arg_tab_stop = None;
        self.tracking_indent =
            !self.is_in_str && (self.mode == Mode::Paren || !self.paren_stack.is_empty());
    }

    /// Write the (possibly rewritten) current character into the output line
    /// and advance the output column.
    pub(crate) fn commit_char(&mut self, orig_ch: char) {
        let ch_width = self.ch.chars().count();
        let unchanged = ch_width == 1 && self.ch.chars().next() == Some(orig_ch);
        if !unchanged {
            let replacement = self.ch.clone();
            self.replace_within_line(self.line_no, self.x, self.x + 1, &replacement);
            self.indent_delta -= 1 - ch_width as isize;
        }
        self.x += ch_width;
    }

    /// Replace `[start, end)` on an output line, keeping the cursor where
    /// the user put it whenever the edit is to its left.
    pub(crate) fn replace_within_line(
        &mut self,
        line_no: usize,
        start: usize,
        end: usize,
        replacement: &str,
    ) {
        self.lines[line_no] = replace_within(&self.lines[line_no], start, end, replacement);
        self.shift_cursor_on_edit(line_no, start, end, replacement);
    }

    pub(crate) fn insert_within_line(&mut self, line_no: usize, x: usize, insert: &str) {
        self.replace_within_line(line_no, x, x, insert);
    }

    fn shift_cursor_on_edit(&mut self, line_no: usize, start: usize, end: usize, replacement: &str) {
        let dx = replacement.chars().count() as isize - (end - start) as isize;
        if dx == 0 || self.cursor_line != Some(line_no) {
            return;
        }
        if let Some(cursor_x) = self.cursor_x {
            if is_cursor_affected(cursor_x, start, end) {
                self.cursor_x = Some((cursor_x as isize + dx) as usize);
            }
        }
    }

    /// Record both coordinate spaces of a condition detected now but
    /// possibly surfaced later.
    pub(crate) fn cache_error_pos(&mut self, kind: ErrorKind) {
        let pos = ErrorPos {
            line_no: self.line_no,
            x: self.x,
            input_line_no: self.input_line_no,
            input_x: self.input_x,
        };
        self.error_pos_cache.insert(kind, pos);
    }

    /// Build a user-visible error at the cached (or current) position.
    pub(crate) fn error(&self, kind: ErrorKind) -> Exit {
        let (line_no, x) = match self.error_pos_cache.get(&kind) {
            Some(pos) => self.pick_pos(pos.line_no, pos.x, pos.input_line_no, pos.input_x),
            None => self.pick_pos(self.line_no, self.x, self.input_line_no, self.input_x),
        };
        let mut error = Error::new(kind, line_no, x);

        match kind {
            ErrorKind::UnmatchedCloseParen => {
                // Point at the open-paren the close should have matched.
                if let Some(pos) = self.error_pos_cache.get(&ErrorKind::UnmatchedOpenParen) {
                    let (l, x) = self.pick_pos(pos.line_no, pos.x, pos.input_line_no, pos.input_x);
                    error.extra = Some(Box::new(Error::new(ErrorKind::UnmatchedOpenParen, l, x)));
                } else if let Some(opener) = self.paren_stack.last() {
                    let (l, x) = self.pick_pos(
                        opener.line_no,
                        opener.x,
                        opener.input_line_no,
                        opener.input_x,
                    );
                    error.extra = Some(Box::new(Error::new(ErrorKind::UnmatchedOpenParen, l, x)));
                }
            }
            ErrorKind::UnclosedParen => {
                if let Some(opener) = self.paren_stack.last() {
                    let (l, x) = self.pick_pos(
                        opener.line_no,
                        opener.x,
                        opener.input_line_no,
                        opener.input_x,
                    );
                    error.line_no = l;
                    error.x = x;
                }
            }
            _ => {}
        }
        Exit::Error(error)
    }

    /// Output coordinates for partial results, input coordinates otherwise.
    fn pick_pos(
        &self,
        line_no: usize,
        x: usize,
        input_line_no: usize,
        input_x: usize,
    ) -> (usize, usize) {
        if self.partial_result {
            (line_no, x)
        } else {
            (input_line_no, input_x)
        }
    }

    /// Apply a change descriptor's shift when the scan reaches the input
    /// position where the edit's new text ends.
    pub(crate) fn handle_change_delta(&mut self) {
        if !(self.smart || self.mode == Mode::Paren) {
            return;
        }
        if let Some(changes) = &self.changes {
            if let Some(change) = changes.get(&(self.input_line_no, self.input_x)) {
                self.indent_delta += change.new_end_x as isize - change.old_end_x as isize;
            }
        }
    }

    /// Legacy Paren Mode hint: shift the cursor line when the scan reaches
    /// the cursor exactly.
    pub(crate) fn handle_cursor_delta(&mut self) {
        if self.mode != Mode::Paren {
            return;
        }
        if let (Some(dx), Some(cl), Some(cx)) = (self.cursor_dx, self.cursor_line, self.cursor_x) {
            if cl == self.line_no && cx == self.x {
                self.indent_delta += dx;
            }
        }
    }

    pub(crate) fn is_cursor_in_comment(&self) -> bool {
        is_cursor_right_of(self.cursor_x, self.cursor_line, self.comment_x, self.line_no)
    }

    /// Package the run into the public result.
    pub(crate) fn into_answer(self, error: Option<Error>) -> Answer {
        let ending = line_ending(&self.orig_text);
        match error {
            None => Answer {
                success: true,
                text: self.lines.join(ending),
                cursor_x: self.cursor_x,
                cursor_line: self.cursor_line,
                error: None,
                tab_stops: self.tab_stops,
                paren_trails: self.paren_trails,
                parens: self
                    .return_parens
                    .then(|| materialize_parens(&self.paren_nodes, &self.paren_roots)),
            },
            Some(error) => {
                let partial = self.partial_result;
                Answer {
                    success: false,
                    text: if partial {
                        self.lines.join(ending)
                    } else {
                        self.orig_text
                    },
                    cursor_x: if partial { self.cursor_x } else { self.orig_cursor_x },
                    cursor_line: if partial {
                        self.cursor_line
                    } else {
                        self.orig_cursor_line
                    },
                    error: Some(error),
                    tab_stops: Vec::new(),
                    paren_trails: if partial { self.paren_trails } else { Vec::new() },
                    parens: (partial && self.return_parens)
                        .then(|| materialize_parens(&self.paren_nodes, &self.paren_roots)),
                }
            }
        }
    }
}

/// Whether an edit of `[start, end)` should drag the cursor along.
fn is_cursor_affected(cursor_x: usize, start: usize, end: usize) -> bool {
    if cursor_x == start && cursor_x == end {
        cursor_x == 0
    } else {
        cursor_x >= end
    }
}

/// The cursor sits at or left of column `x` on the given line.
pub(crate) fn is_cursor_left_of(
    cursor_x: Option<usize>,
    cursor_line: Option<usize>,
    x: Option<usize>,
    line_no: usize,
) -> bool {
    match (cursor_x, cursor_line, x) {
        // Inclusive: a cursor at x sits between x-1 and x.
        (Some(cx), Some(cl), Some(x)) => cl == line_no && cx <= x,
        _ => false,
    }
}

/// The cursor sits strictly right of column `x` on the given line.
pub(crate) fn is_cursor_right_of(
    cursor_x: Option<usize>,
    cursor_line: Option<usize>,
    x: Option<usize>,
    line_no: usize,
) -> bool {
    match (cursor_x, cursor_line, x) {
        (Some(cx), Some(cl), Some(x)) => cl == line_no && cx > x,
        _ => false,
    }
}

fn materialize_parens(nodes: &[ParenNode], roots: &[usize]) -> Vec<Paren> {
    roots.iter().map(|&idx| materialize_paren(nodes, idx)).collect()
}

fn materialize_paren(nodes: &[ParenNode], idx: usize) -> Paren {
    let node = &nodes[idx];
    Paren {
        ch: node.ch,
        line_no: node.line_no,
        x: node.x,
        arg_x: node.arg_x,
        children: node
            .children
            .iter()
            .map(|&child| materialize_paren(nodes, child))
            .collect(),
        closer: node.closer,
    }
}
