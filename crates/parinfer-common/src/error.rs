use std::fmt;

use serde::Serialize;

/// A structural error with location information.
///
/// Positions are input coordinates unless the run was made with
/// `partial_result`, in which case they point into the partially rewritten
/// output. `extra` carries the companion position for paired errors: an
/// unmatched close-paren points at its would-be opener, an unclosed paren at
/// its opener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[serde(rename = "name")]
    pub kind: ErrorKind,
    pub message: String,
    pub line_no: usize,
    pub x: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Box<Error>>,
}

impl Error {
    /// Create a new error at the given position.
    pub fn new(kind: ErrorKind, line_no: usize, x: usize) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            line_no,
            x,
            extra: None,
        }
    }
}

/// The specific kind of structural error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// An unpaired `"` inside a `;` comment.
    QuoteDanger,
    /// A line in code ended with a single backslash.
    EolBackslash,
    /// A string literal was not closed before end of input.
    UnclosedQuote,
    /// An open-paren was not closed before end of input (Paren Mode).
    UnclosedParen,
    /// A close-paren with no matching opener.
    UnmatchedCloseParen,
    /// An open-paren with no matching closer, reported as the companion of
    /// an unmatched close-paren.
    UnmatchedOpenParen,
    /// A line began with a close-paren (Indent Mode).
    LeadingCloseParen,
    /// Reserved for conditions outside the seven structural classes.
    Unhandled,
}

impl ErrorKind {
    /// Stable machine-readable name, e.g. `unclosed-quote`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::QuoteDanger => "quote-danger",
            Self::EolBackslash => "eol-backslash",
            Self::UnclosedQuote => "unclosed-quote",
            Self::UnclosedParen => "unclosed-paren",
            Self::UnmatchedCloseParen => "unmatched-close-paren",
            Self::UnmatchedOpenParen => "unmatched-open-paren",
            Self::LeadingCloseParen => "leading-close-paren",
            Self::Unhandled => "unhandled",
        }
    }

    /// Human-readable description.
    pub fn message(&self) -> &'static str {
        match self {
            Self::QuoteDanger => "Quotes must balanced inside comment blocks",
            Self::EolBackslash => "Line cannot end in a hanging backslash",
            Self::UnclosedQuote => "String is missing a closing quote",
            Self::UnclosedParen => "Unclosed open-paren",
            Self::UnmatchedCloseParen => "Unmatched close-paren",
            Self::UnmatchedOpenParen => "Unmatched open-paren",
            Self::LeadingCloseParen => "Line cannot lead with a close-paren",
            Self::Unhandled => "Unhandled error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::new(ErrorKind::UnclosedQuote, 3, 7);
        assert_eq!(err.to_string(), "String is missing a closing quote");
        assert_eq!(err.message, "String is missing a closing quote");
    }

    #[test]
    fn error_kind_names_are_kebab_case() {
        assert_eq!(ErrorKind::QuoteDanger.name(), "quote-danger");
        assert_eq!(ErrorKind::EolBackslash.name(), "eol-backslash");
        assert_eq!(ErrorKind::UnclosedQuote.name(), "unclosed-quote");
        assert_eq!(ErrorKind::UnclosedParen.name(), "unclosed-paren");
        assert_eq!(
            ErrorKind::UnmatchedCloseParen.name(),
            "unmatched-close-paren"
        );
        assert_eq!(ErrorKind::UnmatchedOpenParen.name(), "unmatched-open-paren");
        assert_eq!(ErrorKind::LeadingCloseParen.name(), "leading-close-paren");
        assert_eq!(ErrorKind::Unhandled.name(), "unhandled");
    }

    #[test]
    fn extra_carries_companion_position() {
        let mut err = Error::new(ErrorKind::UnmatchedCloseParen, 2, 0);
        err.extra = Some(Box::new(Error::new(ErrorKind::UnmatchedOpenParen, 0, 4)));
        let extra = err.extra.as_ref().unwrap();
        assert_eq!(extra.kind, ErrorKind::UnmatchedOpenParen);
        assert_eq!((extra.line_no, extra.x), (0, 4));
    }
}
