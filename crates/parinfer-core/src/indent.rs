//! The indent hook.
//!
//! Fires on the first non-whitespace character of a line that is in code.
//! Indent Mode rewrites the previous trail to match the indentation; Paren
//! Mode rewrites the indentation to match the parens. Parent-opener
//! selection is the piece that keeps edited blocks structurally intact in
//! Smart Mode.

use parinfer_common::ErrorKind;

use crate::chars;
use crate::state::{is_cursor_left_of, Exit, Mode, Opener, State, Step};

/// Whether `ch` closes the opener currently on top of the stack.
pub(crate) fn is_valid_close_paren(paren_stack: &[Opener], ch: char) -> bool {
    paren_stack
        .last()
        .is_some_and(|opener| Some(opener.ch) == chars::match_paren(ch))
}

impl State {
    /// Walk the stack from the innermost opener outward and pick the first
    /// one the current indentation still belongs to.
    ///
    /// Openers deeper than the returned index get closed. The comparison is
    /// made both at the current indentation and at the pre-edit positions
    /// (backing out `indent_delta`s), which disambiguates two risky cases:
    ///
    /// - fragmentation: the line dedented into an opener's span, which would
    ///   split the form;
    /// - adoption: the line indented under an opener that was not its
    ///   parent, which would absorb it.
    pub(crate) fn get_parent_opener_index(&mut self, indent_x: usize) -> usize {
        let stack_len = self.paren_stack.len();
        for i in 0..stack_len {
            let idx = stack_len - 1 - i;
            let opener = &self.paren_stack[idx];

            let curr_outside = opener.x < indent_x;
            let prev_indent_x = indent_x as isize - self.indent_delta;
            let prev_outside = (opener.x as isize - opener.indent_delta) < prev_indent_x;

            let mut is_parent = false;
            let mut adopted = false;

            if prev_outside == curr_outside {
                is_parent = curr_outside;
            } else if prev_outside {
                // Fragmentation risk. Splitting the form is only allowed
                // when an edit actually moved this line.
                is_parent = self.indent_delta == 0;
            } else {
                // Adoption risk. The next-outer opener's pending shift tells
                // us whether the indentation will stay inside this opener
                // once its own line catches up.
                let next_opener = (i + 1 < stack_len).then(|| &self.paren_stack[stack_len - 2 - i]);
                match next_opener {
                    Some(next) if next.indent_delta <= opener.indent_delta => {
                        is_parent = indent_x as isize + next.indent_delta > opener.x as isize;
                    }
                    Some(_) => is_parent = true,
                    None => is_parent = self.indent_delta > opener.indent_delta,
                }
                adopted = is_parent;
            }

            if adopted {
                // The delta was reserved for lines that were already
                // children; a newly adopted line must not inherit it.
                self.paren_stack[idx].indent_delta = 0;
            }
            if is_parent {
                return i;
            }
        }
        stack_len
    }

    /// The opener's shift carries over to a child line unless the user
    /// already moved the child by the same amount (lines indented together).
    pub(crate) fn should_add_opener_indent(&self, opener: &Opener) -> bool {
        opener.indent_delta != self.indent_delta
    }

    /// Rewrite the current line's indentation by `delta` columns.
    pub(crate) fn add_indent(&mut self, delta: isize) {
        let orig_indent = self.x;
        let new_indent = (orig_indent as isize + delta).max(0) as usize;
        let indent_str = " ".repeat(new_indent);
        self.replace_within_line(self.line_no, 0, orig_indent, &indent_str);
        self.x = new_indent;
        self.indent_x = Some(new_indent);
        self.indent_delta += delta;
    }

    /// Paren Mode: clamp the line's indentation into the parent's allowed
    /// band and shift the text accordingly.
    pub(crate) fn correct_indent(&mut self) {
        let orig_indent = self.x as isize;
        let mut new_indent = orig_indent;
        let mut min_indent = 0;
        let mut max_indent = self.max_indent;

        if let Some(opener) = self.paren_stack.last() {
            min_indent = opener.x as isize + 1;
            max_indent = opener.max_child_indent;
            if self.should_add_opener_indent(opener) {
                new_indent += opener.indent_delta;
            }
        }

        new_indent = new_indent.max(min_indent);
        if let Some(max) = max_indent {
            new_indent = new_indent.min(max as isize);
        }

        if new_indent != orig_indent {
            self.add_indent(new_indent - orig_indent);
        }
    }

    /// Proper indent: the mode-specific correction point.
    pub(crate) fn on_indent(&mut self) -> Step<()> {
        self.indent_x = Some(self.x);
        self.tracking_indent = false;

        if self.quote_danger {
            return Err(self.error(ErrorKind::QuoteDanger));
        }

        match self.mode {
            Mode::Indent => {
                self.correct_paren_trail(self.x);

                let delta = self.paren_stack.last().and_then(|opener| {
                    self.should_add_opener_indent(opener)
                        .then_some(opener.indent_delta)
                });
                if let Some(delta) = delta {
                    self.add_indent(delta);
                }
            }
            Mode::Paren => self.correct_indent(),
        }
        Ok(())
    }

    /// A close-paren before any indent point.
    pub(crate) fn on_leading_close_paren(&mut self) -> Step<()> {
        match self.mode {
            Mode::Indent => {
                if !self.force_balance {
                    if self.smart {
                        return Err(Exit::RetryParenMode);
                    }
                    self.cache_error_pos(ErrorKind::LeadingCloseParen);
                }
                self.skip_char = true;
            }
            Mode::Paren => {
                let ch = self.ch.chars().next().expect("leading close paren present");
                if !is_valid_close_paren(&self.paren_stack, ch) {
                    if self.smart {
                        self.skip_char = true;
                    } else {
                        return Err(self.error(ErrorKind::UnmatchedCloseParen));
                    }
                } else if is_cursor_left_of(
                    self.cursor_x,
                    self.cursor_line,
                    Some(self.x),
                    self.line_no,
                ) {
                    // Keep the close-paren after the cursor: treat this as
                    // the line's indent point.
                    self.reset_paren_trail(self.line_no, self.x);
                    self.on_indent()?;
                } else {
                    // Valid but not cursor-adjacent: absorb it into the
                    // previous line's trail.
                    self.append_paren_trail();
                    self.skip_char = true;
                }
            }
        }
        Ok(())
    }

    /// Shift a comment line along with its parent opener's delta.
    pub(crate) fn on_comment_line(&mut self) {
        let trail_len = self.paren_trail.openers.len();

        // Restore the openers matched by the previous trail; a comment line
        // may still belong inside the form they close. Moved, not copied, so
        // a delta cleared during parent selection stays cleared.
        if self.mode == Mode::Paren {
            let openers = std::mem::take(&mut self.paren_trail.openers);
            self.paren_stack.extend(openers.into_iter().rev());
        }

        let i = self.get_parent_opener_index(self.x);
        let stack_len = self.paren_stack.len();
        if i < stack_len {
            let opener = &self.paren_stack[stack_len - 1 - i];
            if self.should_add_opener_indent(opener) {
                let delta = opener.indent_delta;
                self.add_indent(delta);
            }
        }

        if self.mode == Mode::Paren {
            let restored = self.paren_stack.split_off(self.paren_stack.len() - trail_len);
            self.paren_trail.openers = restored.into_iter().rev().collect();
        }
    }

    /// Dispatch on the first characters of a line until indentation settles.
    pub(crate) fn check_indent(&mut self) -> Step<()> {
        let ch = self.ch.chars().next().expect("indent check sees a raw char");
        if chars::is_close_paren(ch) {
            self.on_leading_close_paren()?;
        } else if ch == ';' {
            // Comment lines don't count as indentation points.
            self.on_comment_line();
            self.tracking_indent = false;
        } else if ch != '\n' && ch != ' ' && ch != '\t' {
            self.on_indent()?;
        }
        Ok(())
    }
}
