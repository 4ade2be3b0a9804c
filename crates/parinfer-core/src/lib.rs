//! Parinfer engine: a structural editor aid for Lisp-family source text.
//!
//! The engine is a single-pass, character-by-character scanner over the
//! source. It maintains a lexical state machine (code / string / comment /
//! escape), a stack of open parens, and a rolling "paren trail" (the run of
//! close-parens ending a form on a line), and exposes three transformations:
//!
//! - [`indent_mode`]: indentation is the source of truth; the trail of
//!   close-parens on each line is rewritten to match it.
//! - [`paren_mode`]: parens are the source of truth; each line's
//!   indentation is clamped to the structure.
//! - [`smart_mode`]: Indent Mode that also honours edit descriptors so
//!   children keep their position relative to an edited parent, falling back
//!   to a single Paren Mode pass when the structure turns ambiguous.
//!
//! Each call returns an [`Answer`]: the rewritten text plus metadata on
//! success, or the original text and a structured [`Error`] on failure.
//!
//! ```
//! use parinfer_core::{indent_mode, Options};
//!
//! let answer = indent_mode("(foo\n  bar", &Options::default());
//! assert!(answer.success);
//! assert_eq!(answer.text, "(foo\n  bar)");
//! ```

mod changes;
mod chars;
mod indent;
mod lines;
mod scan;
mod state;
mod trail;

pub use parinfer_common::{
    Answer, Change, Closer, Error, ErrorKind, Options, Paren, TabStop, TrailRange,
};

use state::{Exit, Mode, State};

/// Indent Mode: infer close-parens from indentation.
pub fn indent_mode(text: &str, options: &Options) -> Answer {
    run(text, options, Mode::Indent, false)
}

/// Paren Mode: infer indentation from parens.
pub fn paren_mode(text: &str, options: &Options) -> Answer {
    run(text, options, Mode::Paren, false)
}

/// Smart Mode: Indent Mode plus edit-delta handling and a Paren Mode
/// fallback on structural ambiguity.
///
/// An active selection (`Options::selection_start_line`) disables the
/// fallback: the run behaves as plain Indent Mode.
pub fn smart_mode(text: &str, options: &Options) -> Answer {
    let smart = options.selection_start_line.is_none();
    run(text, options, Mode::Indent, smart)
}

fn run(text: &str, options: &Options, mode: Mode, smart: bool) -> Answer {
    let mut state = State::new(text, options, mode, smart);
    match state.process() {
        Ok(()) => state.into_answer(None),
        // At most one whole-document retry: Paren Mode never signals one.
        Err(Exit::RetryParenMode) => run(text, options, Mode::Paren, smart),
        Err(Exit::Error(error)) => state.into_answer(Some(error)),
    }
}
