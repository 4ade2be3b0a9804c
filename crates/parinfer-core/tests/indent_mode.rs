//! Indent Mode: indentation is the source of truth, close-parens follow.

use parinfer_common::{ErrorKind, Options, TrailRange};
use parinfer_core::indent_mode;

fn transform(text: &str) -> parinfer_common::Answer {
    indent_mode(text, &Options::default())
}

fn with_cursor(text: &str, line: usize, x: usize) -> parinfer_common::Answer {
    let options = Options {
        cursor_line: Some(line),
        cursor_x: Some(x),
        ..Options::default()
    };
    indent_mode(text, &options)
}

#[test]
fn closes_form_from_indentation() {
    let answer = transform("(foo\n  bar");
    assert!(answer.success);
    assert_eq!(answer.text, "(foo\n  bar)");
    assert_eq!(
        answer.paren_trails,
        vec![TrailRange {
            line_no: 1,
            start_x: 5,
            end_x: 6,
        }]
    );
}

#[test]
fn close_paren_migrates_up_when_child_dedents() {
    let answer = transform("(foo\nbar");
    assert!(answer.success);
    assert_eq!(answer.text, "(foo)\nbar");
}

#[test]
fn inner_form_closes_on_its_own_line() {
    // baz at column 2 belongs to foo, so bar's paren cannot wrap it.
    let answer = transform("(foo (bar\n  baz))");
    assert!(answer.success);
    assert_eq!(answer.text, "(foo (bar)\n  baz)");
}

#[test]
fn deep_indentation_keeps_inner_form_open() {
    let answer = transform("(foo (bar\n       baz))");
    assert!(answer.success);
    assert_eq!(answer.text, "(foo (bar\n       baz))");
}

#[test]
fn balanced_text_round_trips() {
    let source = include_str!("../../../tests/fixtures/config.clj");
    let answer = transform(source);
    assert!(answer.success);
    assert_eq!(answer.text, source);
}

#[test]
fn transformation_is_idempotent() {
    for text in [
        "(foo\n  bar",
        "(let [x 1\n      y 2\nx",
        "(a (b (c\nd",
        include_str!("../../../tests/fixtures/config.clj"),
    ] {
        let once = transform(text);
        assert!(once.success, "first pass failed for {:?}", text);
        let twice = transform(&once.text);
        assert!(twice.success);
        assert_eq!(twice.text, once.text, "not idempotent for {:?}", text);
    }
}

#[test]
fn paren_trails_contain_only_close_parens() {
    let answer = transform("(a (b\n    c)\nd");
    assert!(answer.success);
    let lines: Vec<&str> = answer.text.split('\n').collect();
    assert!(!answer.paren_trails.is_empty());
    for trail in &answer.paren_trails {
        let slice: String = lines[trail.line_no]
            .chars()
            .skip(trail.start_x)
            .take(trail.end_x - trail.start_x)
            .collect();
        assert!(
            slice.chars().all(|ch| matches!(ch, ')' | ']' | '}')),
            "trail {:?} holds {:?}",
            trail,
            slice
        );
    }
}

#[test]
fn unmatched_close_paren_of_other_family_is_dropped() {
    let answer = transform("(foo]");
    assert!(answer.success);
    assert_eq!(answer.text, "(foo)");
}

#[test]
fn unmatched_close_paren_before_code_errors() {
    let answer = transform("] (a");
    assert!(!answer.success);
    assert_eq!(answer.text, "] (a");
    let error = answer.error.unwrap();
    assert_eq!(error.kind, ErrorKind::UnmatchedCloseParen);
    assert_eq!((error.line_no, error.x), (0, 0));
}

#[test]
fn leading_close_paren_errors() {
    let answer = transform("(foo\n) bar");
    assert!(!answer.success);
    let error = answer.error.unwrap();
    assert_eq!(error.kind, ErrorKind::LeadingCloseParen);
    assert_eq!((error.line_no, error.x), (1, 0));
    // The original text comes back untouched.
    assert_eq!(answer.text, "(foo\n) bar");
}

#[test]
fn force_balance_absorbs_leading_close_paren() {
    let options = Options {
        force_balance: true,
        ..Options::default()
    };
    let answer = indent_mode("(foo\n) bar", &options);
    assert!(answer.success);
    assert_eq!(answer.text, "(foo\n bar)");
}

#[test]
fn tabs_in_code_expand_to_two_spaces() {
    let answer = transform("(foo\n\tbar");
    assert!(answer.success);
    assert_eq!(answer.text, "(foo\n  bar)");
}

#[test]
fn tabs_in_strings_are_preserved() {
    let answer = transform("(foo \"a\tb\")");
    assert!(answer.success);
    assert_eq!(answer.text, "(foo \"a\tb\")");
}

#[test]
fn multiline_strings_pass_through() {
    let answer = transform("(def s \"a\nb\")");
    assert!(answer.success);
    assert_eq!(answer.text, "(def s \"a\nb\")");
}

#[test]
fn unclosed_quote_errors_at_the_quote() {
    let answer = transform("(foo \"bar");
    assert!(!answer.success);
    let error = answer.error.unwrap();
    assert_eq!(error.kind, ErrorKind::UnclosedQuote);
    assert_eq!((error.line_no, error.x), (0, 5));
}

#[test]
fn eol_backslash_errors() {
    let answer = transform("foo \\");
    assert!(!answer.success);
    let error = answer.error.unwrap();
    assert_eq!(error.kind, ErrorKind::EolBackslash);
    assert_eq!((error.line_no, error.x), (0, 4));
}

#[test]
fn quote_in_comment_raises_quote_danger() {
    let answer = transform("; \"hello\n(foo)");
    assert!(!answer.success);
    let error = answer.error.unwrap();
    assert_eq!(error.kind, ErrorKind::QuoteDanger);
    assert_eq!((error.line_no, error.x), (0, 2));
}

#[test]
fn balanced_quotes_in_comments_are_fine() {
    let answer = transform("; \"hello\"\n(foo)");
    assert!(answer.success);
    assert_eq!(answer.text, "; \"hello\"\n(foo)");
}

#[test]
fn escaped_quote_stays_in_string() {
    let answer = transform("(foo \"a\\\"b\")");
    assert!(answer.success);
    assert_eq!(answer.text, "(foo \"a\\\"b\")");
}

#[test]
fn cursor_blocks_trail_deletion() {
    // Without a cursor the gap before the close-paren collapses.
    let answer = transform("(foo )");
    assert!(answer.success);
    assert_eq!(answer.text, "(foo)");

    // With the cursor inside the trail, the close-paren stays put.
    let answer = with_cursor("(foo )", 0, 5);
    assert!(answer.success);
    assert_eq!(answer.text, "(foo )");
    assert_eq!(answer.cursor_x, Some(5));
    assert_eq!(answer.cursor_line, Some(0));
}

#[test]
fn cursor_is_never_clobbered() {
    let answer = with_cursor("(foo\n  bar", 1, 2);
    assert!(answer.success);
    assert_eq!(answer.cursor_x, Some(2));
    assert_eq!(answer.cursor_line, Some(1));
}

#[test]
fn crlf_input_joins_with_crlf() {
    let answer = transform("(foo\r\n  bar");
    assert!(answer.success);
    assert_eq!(answer.text, "(foo\r\n  bar)");
}

#[test]
fn tab_stops_reported_for_cursor_line() {
    let answer = with_cursor("(foo bar\n  baz", 1, 2);
    assert!(answer.success);
    assert_eq!(answer.tab_stops.len(), 1);
    let stop = &answer.tab_stops[0];
    assert_eq!(stop.ch, '(');
    assert_eq!((stop.line_no, stop.x), (0, 0));
    assert_eq!(stop.arg_x, Some(5));
}

#[test]
fn return_parens_builds_the_opener_tree() {
    let options = Options {
        return_parens: true,
        ..Options::default()
    };
    let answer = indent_mode("(a (b))", &options);
    assert!(answer.success);

    let parens = answer.parens.unwrap();
    assert_eq!(parens.len(), 1);
    let root = &parens[0];
    assert_eq!((root.ch, root.line_no, root.x), ('(', 0, 0));
    assert_eq!(root.children.len(), 1);

    let child = &root.children[0];
    assert_eq!((child.ch, child.line_no, child.x), ('(', 0, 3));
    let closer = child.closer.unwrap();
    assert_eq!((closer.line_no, closer.x, closer.ch), (0, 5, ')'));
    let root_closer = root.closer.unwrap();
    assert_eq!((root_closer.line_no, root_closer.x, root_closer.ch), (0, 6, ')'));
}

#[test]
fn empty_input_is_a_no_op() {
    let answer = transform("");
    assert!(answer.success);
    assert_eq!(answer.text, "");
    assert!(answer.paren_trails.is_empty());
}
