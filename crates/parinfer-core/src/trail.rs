//! Paren-trail operations.
//!
//! The trail is the run of close-parens (plus interior whitespace) that ends
//! a form on a line. Indent Mode rewrites it to match the next line's
//! indentation; Paren Mode treats it as truth, squeezes out the whitespace,
//! and appends inferred closers to it.

use parinfer_common::{Closer, ErrorKind, TrailRange};

use crate::chars;
use crate::state::{is_cursor_right_of, ClampedTrail, Mode, ParenTrail, State, Step};

impl State {
    /// Restart the trail immediately after the last closable character.
    pub(crate) fn reset_paren_trail(&mut self, line_no: usize, x: usize) {
        self.paren_trail.line_no = Some(line_no);
        self.paren_trail.start_x = x;
        self.paren_trail.end_x = x;
        self.paren_trail.openers.clear();
        self.paren_trail.clamped = None;
    }

    /// Forget the trail entirely (the line ended inside a string).
    pub(crate) fn invalidate_paren_trail(&mut self) {
        self.paren_trail = ParenTrail::default();
    }

    fn is_cursor_clamping_paren_trail(&self) -> bool {
        is_cursor_right_of(
            self.cursor_x,
            self.cursor_line,
            Some(self.paren_trail.start_x),
            self.line_no,
        ) && !self.is_cursor_in_comment()
    }

    /// Indent Mode: keep the trail from being edited out from under the
    /// cursor by shifting its bounds right of it. Whatever falls behind the
    /// new start is preserved in the clamped shadow.
    pub(crate) fn clamp_paren_trail_to_cursor(&mut self) {
        if !self.is_cursor_clamping_paren_trail() {
            return;
        }
        let cursor_x = self.cursor_x.expect("clamping cursor is present");
        let start_x = self.paren_trail.start_x;
        let end_x = self.paren_trail.end_x;

        let new_start_x = start_x.max(cursor_x);
        let new_end_x = end_x.max(cursor_x);

        let line = &self.lines[self.line_no];
        let remove_count = line
            .chars()
            .skip(start_x)
            .take(new_start_x - start_x)
            .filter(|&ch| chars::is_close_paren(ch))
            .count();

        let kept = self.paren_trail.openers.split_off(remove_count);
        let clamped_openers = std::mem::replace(&mut self.paren_trail.openers, kept);
        self.paren_trail.start_x = new_start_x;
        self.paren_trail.end_x = new_end_x;
        self.paren_trail.clamped = Some(ClampedTrail {
            start_x,
            end_x,
            openers: clamped_openers,
        });
    }

    /// Indent Mode: move the trail's openers back onto the stack so indent
    /// correction can decide how many to re-emit.
    pub(crate) fn pop_paren_trail(&mut self) {
        if self.paren_trail.start_x == self.paren_trail.end_x {
            return;
        }
        while let Some(opener) = self.paren_trail.openers.pop() {
            self.paren_stack.push(opener);
        }
    }

    /// Indent Mode: close every opener deeper than the parent of a line
    /// indented at `indent_x`, rewriting the trail's text range.
    pub(crate) fn correct_paren_trail(&mut self, indent_x: usize) {
        let index = self.get_parent_opener_index(indent_x);
        let mut parens = String::new();

        for i in 0..index {
            let opener = self.paren_stack.pop().expect("parent index is within stack");
            let close_ch = chars::match_paren(opener.ch).expect("opener is a paren");
            parens.push(close_ch);

            if self.return_parens {
                if let (Some(node), Some(trail_line)) = (opener.node, self.paren_trail.line_no) {
                    self.paren_nodes[node].closer = Some(Closer {
                        line_no: trail_line,
                        x: self.paren_trail.start_x + i,
                        ch: close_ch,
                    });
                }
            }
            self.paren_trail.openers.push(opener);
        }

        if let Some(line_no) = self.paren_trail.line_no {
            let start_x = self.paren_trail.start_x;
            let end_x = self.paren_trail.end_x;
            self.replace_within_line(line_no, start_x, end_x, &parens);
            self.paren_trail.end_x = start_x + parens.chars().count();
            self.remember_paren_trail();
        }
    }

    /// Paren Mode: delete the whitespace between the trail's close-parens.
    pub(crate) fn clean_paren_trail(&mut self) {
        let start_x = self.paren_trail.start_x;
        let end_x = self.paren_trail.end_x;

        if start_x == end_x || self.paren_trail.line_no != Some(self.line_no) {
            return;
        }

        let line = &self.lines[self.line_no];
        let mut new_trail = String::new();
        let mut space_count = 0;
        for ch in line.chars().skip(start_x).take(end_x - start_x) {
            if chars::is_close_paren(ch) {
                new_trail.push(ch);
            } else {
                space_count += 1;
            }
        }

        if space_count > 0 {
            self.replace_within_line(self.line_no, start_x, end_x, &new_trail);
            self.paren_trail.end_x -= space_count;
        }
    }

    /// Paren Mode: pop the innermost opener and write its closer at the end
    /// of the trail.
    pub(crate) fn append_paren_trail(&mut self) {
        let opener = self.paren_stack.pop().expect("trail append has an opener");
        let close_ch = chars::match_paren(opener.ch).expect("opener is a paren");
        let trail_line = self.paren_trail.line_no.expect("paren trail is positioned");

        if self.return_parens {
            if let Some(node) = opener.node {
                self.paren_nodes[node].closer = Some(Closer {
                    line_no: trail_line,
                    x: self.paren_trail.end_x,
                    ch: close_ch,
                });
            }
        }

        self.set_max_indent(Some(opener.x));
        let end_x = self.paren_trail.end_x;
        self.insert_within_line(trail_line, end_x, &close_ch.to_string());

        self.paren_trail.end_x += 1;
        self.paren_trail.openers.push(opener);
        self.update_remembered_paren_trail();
    }

    /// A popped opener caps how far its siblings' children may be indented:
    /// at the paren that just closed.
    pub(crate) fn set_max_indent(&mut self, opener_x: Option<usize>) {
        let Some(x) = opener_x else { return };
        match self.paren_stack.last_mut() {
            Some(parent) => parent.max_child_indent = Some(x),
            None => self.max_indent = Some(x),
        }
    }

    /// Export the finished trail, merging back whatever cursor clamping cut
    /// out of it.
    pub(crate) fn remember_paren_trail(&mut self) {
        let trail = &self.paren_trail;
        let clamped_count = trail.clamped.as_ref().map_or(0, |c| c.openers.len());
        if trail.openers.len() + clamped_count == 0 {
            return;
        }

        let line_no = trail.line_no.expect("remembered trail is positioned");
        let range = match &trail.clamped {
            Some(clamped) => TrailRange {
                line_no,
                start_x: clamped.start_x,
                end_x: if trail.openers.is_empty() {
                    clamped.end_x
                } else {
                    trail.end_x
                },
            },
            None => TrailRange {
                line_no,
                start_x: trail.start_x,
                end_x: trail.end_x,
            },
        };
        self.paren_trails.push(range);
    }

    /// Extend the last exported trail if it is still the current one.
    pub(crate) fn update_remembered_paren_trail(&mut self) {
        let current = self
            .paren_trails
            .last()
            .is_some_and(|trail| Some(trail.line_no) == self.paren_trail.line_no);
        if current {
            if let Some(trail) = self.paren_trails.last_mut() {
                trail.end_x = self.paren_trail.end_x;
            }
        } else {
            self.remember_paren_trail();
        }
    }

    /// End-of-line bookkeeping for a trail that lives on the line just
    /// finished.
    pub(crate) fn finish_new_paren_trail(&mut self) {
        if self.is_in_str {
            self.invalidate_paren_trail();
        } else if self.mode == Mode::Indent {
            self.clamp_paren_trail_to_cursor();
            self.pop_paren_trail();
        } else {
            let opener_x = self.paren_trail.openers.last().map(|opener| opener.x);
            self.set_max_indent(opener_x);
            if self.cursor_line != Some(self.line_no) {
                self.clean_paren_trail();
            }
            self.remember_paren_trail();
        }
    }

    /// Indent Mode defers unmatched close-parens; they only surface when
    /// they ended up left of the final trail, i.e. not absorbed by it.
    pub(crate) fn check_unmatched_outside_paren_trail(&mut self) -> Step<()> {
        if let Some(cache) = self.error_pos_cache.get(&ErrorKind::UnmatchedCloseParen) {
            if cache.x < self.paren_trail.start_x {
                return Err(self.error(ErrorKind::UnmatchedCloseParen));
            }
        }
        Ok(())
    }

    /// A deferred leading close-paren surfaces once the line's trail is
    /// settled on the same line.
    pub(crate) fn check_leading_close_paren(&mut self) -> Step<()> {
        if self.error_pos_cache.contains_key(&ErrorKind::LeadingCloseParen)
            && self.paren_trail.line_no == Some(self.line_no)
        {
            return Err(self.error(ErrorKind::LeadingCloseParen));
        }
        Ok(())
    }
}
