//! Line splitting and char-indexed string edits.
//!
//! All column positions in the engine are char indices, the coordinate space
//! editor hosts speak. The helpers here convert to byte offsets only at the
//! slicing site, so multibyte source text cannot be split mid code point.

/// Split input on `\r?\n` line endings.
///
/// A trailing newline yields a final empty line, so joining the parts with
/// the original ending reproduces the input.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Output line ending: CRLF if any `\r` appears in the input, else LF.
///
/// Intentionally lossy for mixed line endings.
pub(crate) fn line_ending(text: &str) -> &'static str {
    if text.contains('\r') {
        "\r\n"
    } else {
        "\n"
    }
}

/// Byte offset of char column `x`, clamped to the end of the string.
fn byte_index(s: &str, x: usize) -> usize {
    s.char_indices().nth(x).map_or(s.len(), |(i, _)| i)
}

/// Replace the chars in `[start, end)` (char columns) with `replacement`.
pub(crate) fn replace_within(s: &str, start: usize, end: usize, replacement: &str) -> String {
    let a = byte_index(s, start);
    let b = byte_index(s, end);
    let mut out = String::with_capacity(s.len() - (b - a) + replacement.len());
    out.push_str(&s[..a]);
    out.push_str(replacement);
    out.push_str(&s[b..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_plain_lines() {
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
    }

    #[test]
    fn line_ending_follows_any_cr() {
        assert_eq!(line_ending("a\nb"), "\n");
        assert_eq!(line_ending("a\r\nb"), "\r\n");
        assert_eq!(line_ending("a\r\nb\nc"), "\r\n");
        assert_eq!(line_ending(""), "\n");
    }

    #[test]
    fn replace_within_range() {
        assert_eq!(replace_within("hello", 1, 3, "a"), "halo");
        assert_eq!(replace_within("hello", 5, 5, "!"), "hello!");
        assert_eq!(replace_within("hello", 0, 5, ""), "");
    }

    #[test]
    fn replace_within_clamps_past_end() {
        assert_eq!(replace_within("ab", 1, 9, "x"), "ax");
    }

    #[test]
    fn replace_within_counts_chars_not_bytes() {
        // 'é' is two bytes; columns are chars.
        assert_eq!(replace_within("héllo", 2, 4, "xy"), "héxyo");
    }
}
