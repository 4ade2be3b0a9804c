//! Character dispatch and the line/text drivers.
//!
//! Lines are fed in order; within each line, characters are fed in order,
//! plus one synthetic newline at end-of-line. Dispatch classifies each
//! character against the code/string/comment/escape state machine and feeds
//! the paren stack and trail.

use parinfer_common::{Closer, ErrorKind, TabStop};

use crate::chars;
use crate::indent::is_valid_close_paren;
use crate::state::{ArgTabStop, ClampedTrail, ErrorPos, Exit, Mode, Opener, ParenNode, State, Step};

fn make_tab_stop(opener: &Opener) -> TabStop {
    TabStop {
        ch: opener.ch,
        x: opener.x,
        line_no: opener.line_no,
        arg_x: opener.arg_x,
    }
}

impl State {
    fn on_open_paren(&mut self) {
        if !self.is_in_code {
            return;
        }
        let ch = self.ch.chars().next().expect("open paren present");

        let node = self.return_parens.then(|| {
            let node_idx = self.paren_nodes.len();
            self.paren_nodes.push(ParenNode {
                ch,
                line_no: self.line_no,
                x: self.x,
                arg_x: None,
                closer: None,
                children: Vec::new(),
            });
            match self.paren_stack.last().and_then(|opener| opener.node) {
                Some(parent) => self.paren_nodes[parent].children.push(node_idx),
                None => self.paren_roots.push(node_idx),
            }
            node_idx
        });

        self.paren_stack.push(Opener {
            ch,
            x: self.x,
            line_no: self.line_no,
            input_x: self.input_x,
            input_line_no: self.input_line_no,
            indent_delta: self.indent_delta,
            max_child_indent: None,
            arg_x: None,
            node,
        });
        self.tracking_arg_tab_stop = Some(ArgTabStop::Space);
    }

    /// In smart Indent Mode, a cursor sitting between the parent's opening
    /// and this opener "holds" the trail open: corrections are suspended on
    /// this line until the user moves off. Moving off raises the Paren Mode
    /// retry so the structure resynchronizes.
    fn check_cursor_holding(&self) -> Step<bool> {
        let opener = self.paren_stack.last().expect("holding check has an opener");
        let parent = self
            .paren_stack
            .len()
            .checked_sub(2)
            .map(|idx| &self.paren_stack[idx]);
        let hold_min_x = parent.map_or(0, |p| p.x + 1);
        let hold_max_x = opener.x;

        let in_hold_range = |x: Option<usize>, line: Option<usize>| {
            line == Some(opener.line_no)
                && x.is_some_and(|x| hold_min_x <= x && x <= hold_max_x)
        };

        let holding = in_hold_range(self.cursor_x, self.cursor_line);
        let should_check_prev = self.changes.is_none() && self.prev_cursor_line.is_some();
        if should_check_prev {
            let prev_holding = in_hold_range(self.prev_cursor_x, self.prev_cursor_line);
            if prev_holding && !holding {
                return Err(Exit::RetryParenMode);
            }
        }
        Ok(holding)
    }

    fn on_matched_close_paren(&mut self) -> Step<()> {
        let holding = if self.mode == Mode::Indent && self.smart {
            self.check_cursor_holding()?
        } else {
            false
        };

        let opener = self.paren_stack.pop().expect("matched close has an opener");
        if self.return_parens {
            if let Some(node) = opener.node {
                let ch = self.ch.chars().next().expect("close paren present");
                self.paren_nodes[node].closer = Some(Closer {
                    line_no: self.line_no,
                    x: self.x,
                    ch,
                });
            }
        }

        self.paren_trail.end_x = self.x + 1;
        self.paren_trail.openers.push(opener);

        if holding {
            let start_x = self.paren_trail.start_x;
            let end_x = self.paren_trail.end_x;
            let openers = std::mem::take(&mut self.paren_trail.openers);
            self.reset_paren_trail(self.line_no, self.x + 1);
            self.paren_trail.clamped = Some(ClampedTrail {
                start_x,
                end_x,
                openers,
            });
        }
        Ok(())
    }

    fn on_unmatched_close_paren(&mut self) -> Step<()> {
        match self.mode {
            Mode::Paren => {
                let in_leading_paren_trail = self.paren_trail.line_no == Some(self.line_no)
                    && Some(self.paren_trail.start_x) == self.indent_x;
                let can_remove = self.smart && in_leading_paren_trail;
                if !can_remove {
                    return Err(self.error(ErrorKind::UnmatchedCloseParen));
                }
            }
            Mode::Indent => {
                if !self
                    .error_pos_cache
                    .contains_key(&ErrorKind::UnmatchedCloseParen)
                {
                    self.cache_error_pos(ErrorKind::UnmatchedCloseParen);
                    if let Some(opener) = self.paren_stack.last() {
                        let pos = ErrorPos {
                            line_no: opener.line_no,
                            x: opener.x,
                            input_line_no: opener.input_line_no,
                            input_x: opener.input_x,
                        };
                        self.error_pos_cache
                            .insert(ErrorKind::UnmatchedOpenParen, pos);
                    }
                }
            }
        }
        self.ch.clear();
        Ok(())
    }

    fn on_close_paren(&mut self) -> Step<()> {
        if self.is_in_code {
            let ch = self.ch.chars().next().expect("close paren present");
            if is_valid_close_paren(&self.paren_stack, ch) {
                self.on_matched_close_paren()?;
            } else {
                self.on_unmatched_close_paren()?;
            }
        }
        Ok(())
    }

    fn on_quote(&mut self) {
        if self.is_in_str {
            self.is_in_str = false;
        } else if self.is_in_comment {
            self.quote_danger = !self.quote_danger;
            if self.quote_danger {
                self.cache_error_pos(ErrorKind::QuoteDanger);
            }
        } else {
            self.is_in_str = true;
            self.cache_error_pos(ErrorKind::UnclosedQuote);
        }
    }

    fn on_semicolon(&mut self) {
        if self.is_in_code {
            self.is_in_comment = true;
            self.comment_x = Some(self.x);
            self.tracking_arg_tab_stop = None;
        }
    }

    fn on_backslash(&mut self) {
        self.is_escaping = true;
    }

    fn on_tab(&mut self) {
        if self.is_in_code {
            self.ch.clear();
            self.ch.push_str(chars::DOUBLE_SPACE);
        }
    }

    fn on_newline(&mut self) {
        self.is_in_comment = false;
        self.ch.clear();
    }

    fn after_backslash(&mut self) -> Step<()> {
        self.is_escaping = false;
        self.is_escaped = true;

        if self.ch.chars().next() == Some('\n') {
            if self.is_in_code {
                return Err(self.error(ErrorKind::EolBackslash));
            }
            self.on_newline();
        }
        Ok(())
    }

    fn is_whitespace_ch(&self) -> bool {
        !self.is_escaped && (self.ch == " " || self.ch == chars::DOUBLE_SPACE)
    }

    /// A closable character ends any trail before it: anything in code that
    /// is not whitespace, not erased, and not an (unescaped) close-paren.
    fn is_closable(&self) -> bool {
        let closer = self
            .ch
            .chars()
            .next()
            .is_some_and(|ch| chars::is_close_paren(ch) && !self.is_escaped);
        self.is_in_code && !self.is_whitespace_ch() && !self.ch.is_empty() && !closer
    }

    fn track_arg_tab_stop(&mut self, stage: ArgTabStop) {
        match stage {
            ArgTabStop::Space => {
                if self.is_in_code && self.is_whitespace_ch() {
                    self.tracking_arg_tab_stop = Some(ArgTabStop::Arg);
                }
            }
            ArgTabStop::Arg => {
                if !self.is_whitespace_ch() {
                    let x = self.x;
                    let node = match self.paren_stack.last_mut() {
                        Some(opener) => {
                            opener.arg_x = Some(x);
                            opener.node
                        }
                        None => None,
                    };
                    if let Some(node) = node {
                        self.paren_nodes[node].arg_x = Some(x);
                    }
                    self.tracking_arg_tab_stop = None;
                }
            }
        }
    }

    fn on_char(&mut self) -> Step<()> {
        self.is_escaped = false;

        if self.is_escaping {
            self.after_backslash()?;
        } else if let Some(ch) = self.ch.chars().next() {
            if chars::is_open_paren(ch) {
                self.on_open_paren();
            } else if chars::is_close_paren(ch) {
                self.on_close_paren()?;
            } else {
                match ch {
                    '"' => self.on_quote(),
                    ';' => self.on_semicolon(),
                    '\\' => self.on_backslash(),
                    '\t' => self.on_tab(),
                    '\n' => self.on_newline(),
                    _ => {}
                }
            }
        }

        self.is_in_code = !self.is_in_comment && !self.is_in_str;

        if self.is_closable() {
            let width = self.ch.chars().count();
            self.reset_paren_trail(self.line_no, self.x + width);
        }

        if let Some(stage) = self.tracking_arg_tab_stop {
            self.track_arg_tab_stop(stage);
        }
        Ok(())
    }

    pub(crate) fn process_char(&mut self, ch: char) -> Step<()> {
        self.ch.clear();
        self.ch.push(ch);
        self.skip_char = false;

        self.handle_change_delta();
        self.handle_cursor_delta();

        if self.tracking_indent {
            self.check_indent()?;
        }

        if self.skip_char {
            self.ch.clear();
        } else {
            self.on_char()?;
        }

        self.commit_char(ch);
        Ok(())
    }

    /// Collect tab stops when the cursor (or selection start) sits on the
    /// line about to be scanned.
    fn set_tab_stops(&mut self) {
        let tab_stop_line = self.selection_start_line.or(self.cursor_line);
        if tab_stop_line != Some(self.line_no) {
            return;
        }

        for opener in &self.paren_stack {
            self.tab_stops.push(make_tab_stop(opener));
        }
        if self.mode == Mode::Paren {
            for opener in self.paren_trail.openers.iter().rev() {
                self.tab_stops.push(make_tab_stop(opener));
            }
        }
    }

    pub(crate) fn process_line(&mut self, line_no: usize) -> Step<()> {
        self.init_line();
        self.lines.push(self.input_lines[line_no].clone());

        self.set_tab_stops();

        let line: Vec<char> = self.input_lines[line_no].chars().collect();
        for (x, &ch) in line.iter().enumerate() {
            self.input_x = x;
            self.process_char(ch)?;
        }
        self.process_char('\n')?;

        self.check_unmatched_outside_paren_trail()?;
        if !self.force_balance {
            self.check_leading_close_paren()?;
        }

        if self.paren_trail.line_no == Some(self.line_no) {
            self.finish_new_paren_trail();
        }
        Ok(())
    }

    pub(crate) fn process(&mut self) -> Step<()> {
        for line_no in 0..self.input_lines.len() {
            self.input_line_no = line_no;
            self.process_line(line_no)?;
        }
        self.finalize()
    }

    fn finalize(&mut self) -> Step<()> {
        if self.quote_danger {
            return Err(self.error(ErrorKind::QuoteDanger));
        }
        if self.is_in_str {
            return Err(self.error(ErrorKind::UnclosedQuote));
        }

        if !self.paren_stack.is_empty() && self.mode == Mode::Paren {
            return Err(self.error(ErrorKind::UnclosedParen));
        }
        if self.mode == Mode::Indent {
            // One more indent at column 0 closes whatever is still open.
            self.init_line();
            self.on_indent()?;
        }
        Ok(())
    }
}
