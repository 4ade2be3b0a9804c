//! The Parinfer CLI.
//!
//! Reads Lisp source from a file or stdin, runs one of the three Parinfer
//! transformations, and writes the rewritten text to stdout:
//!
//! - `parinferc --mode indent file.clj` - infer close-parens from indentation
//! - `parinferc --mode paren file.clj` - infer indentation from parens
//! - `parinferc --mode smart --changes '[...]' file.clj` - indent mode with
//!   edit awareness
//!
//! On failure the offending position is reported on stderr and the exit code
//! is 1. With `--json` the full result record (success flag, text, cursor,
//! tab stops, paren trails, error) is emitted as JSON on stdout and the exit
//! code stays 0; the consumer reads the `success` field.

use std::io::Read;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use parinfer_common::{Change, Error, Options};
use parinfer_core::{indent_mode, paren_mode, smart_mode};

#[derive(Parser)]
#[command(
    name = "parinferc",
    version,
    about = "Infer Lisp close-parens from indentation, or indentation from parens"
)]
struct Cli {
    /// Source file to read; stdin when omitted
    file: Option<PathBuf>,

    /// Transformation to run
    #[arg(short, long, value_enum, default_value_t = Mode::Indent)]
    mode: Mode,

    /// Cursor column, in input coordinates
    #[arg(long)]
    cursor_x: Option<usize>,

    /// Cursor line, in input coordinates
    #[arg(long)]
    cursor_line: Option<usize>,

    /// Cursor column before the current edit
    #[arg(long)]
    prev_cursor_x: Option<usize>,

    /// Cursor line before the current edit
    #[arg(long)]
    prev_cursor_line: Option<usize>,

    /// First line of an active selection
    #[arg(long)]
    selection_start_line: Option<usize>,

    /// Edits since the last run, as a JSON array of
    /// {"lineNo", "x", "oldText", "newText"} objects
    #[arg(long)]
    changes: Option<String>,

    /// Suppress leading-close-paren errors in indent mode
    #[arg(long)]
    force_balance: bool,

    /// On failure, report the partially rewritten text instead of the input
    #[arg(long)]
    partial_result: bool,

    /// Attach the opener parse tree to the JSON result
    #[arg(long)]
    return_parens: bool,

    /// Emit the full result record as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Indent,
    Paren,
    Smart,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let source = read_source(cli.file.as_deref())?;

    let changes: Vec<Change> = match &cli.changes {
        Some(json) => serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse --changes: {}", e))?,
        None => Vec::new(),
    };

    let options = Options {
        cursor_x: cli.cursor_x,
        cursor_line: cli.cursor_line,
        prev_cursor_x: cli.prev_cursor_x,
        prev_cursor_line: cli.prev_cursor_line,
        cursor_dx: None,
        selection_start_line: cli.selection_start_line,
        changes,
        partial_result: cli.partial_result,
        force_balance: cli.force_balance,
        return_parens: cli.return_parens,
    };

    let answer = match cli.mode {
        Mode::Indent => indent_mode(&source, &options),
        Mode::Paren => paren_mode(&source, &options),
        Mode::Smart => smart_mode(&source, &options),
    };

    if cli.json {
        let json = serde_json::to_string(&answer)
            .map_err(|e| format!("Failed to serialize result: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    match &answer.error {
        None => {
            print!("{}", answer.text);
            Ok(())
        }
        Some(error) => {
            report_error(&source, error);
            Err("Could not balance the input.".to_string())
        }
    }
}

fn read_source(file: Option<&std::path::Path>) -> Result<String, String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e)),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            Ok(source)
        }
    }
}

/// Render the engine error with ariadne, labelling the companion position
/// (the would-be opener) when one is attached.
fn report_error(source: &str, error: &Error) {
    use ariadne::{Label, Report, ReportKind, Source};

    let start = byte_offset(source, error.line_no, error.x);
    let end = start + 1;
    let mut report = Report::<std::ops::Range<usize>>::build(ReportKind::Error, start..end)
        .with_message(&error.message)
        .with_label(Label::new(start..end).with_message(error.kind.name()));

    if let Some(extra) = &error.extra {
        let extra_start = byte_offset(source, extra.line_no, extra.x);
        report = report
            .with_label(Label::new(extra_start..extra_start + 1).with_message(&extra.message));
    }

    let _ = report.finish().eprint(Source::from(source));
}

/// Byte offset of a (line, char-column) position in `source`.
fn byte_offset(source: &str, line_no: usize, x: usize) -> usize {
    let mut offset = 0;
    for (i, line) in source.split_inclusive('\n').enumerate() {
        if i == line_no {
            let content = line.trim_end_matches(|c| c == '\n' || c == '\r');
            let col = content
                .char_indices()
                .nth(x)
                .map_or(content.len(), |(b, _)| b);
            return offset + col;
        }
        offset += line.len();
    }
    offset
}
