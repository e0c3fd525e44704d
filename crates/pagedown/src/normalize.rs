//! Final whitespace pass over the assembled Markdown.
//!
//! Raw regions (code blocks) are delimited in the assembled string by two
//! private-use marker characters. Everything between them is copied through
//! untouched; everywhere else trailing whitespace is stripped from lines and
//! blank-line runs are collapsed to a single blank line.

use std::borrow::Cow;

/// Opens a raw region.
pub const RAW_START: char = '\u{E000}';
/// Closes a raw region.
pub const RAW_END: char = '\u{E001}';

/// Wrap a fragment so the normalizer leaves it alone.
pub fn raw(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 6);
    out.push(RAW_START);
    out.push_str(fragment);
    out.push(RAW_END);
    out
}

/// Remove marker characters from untrusted text.
pub fn strip_markers(text: &str) -> Cow<'_, str> {
    if text.contains([RAW_START, RAW_END]) {
        Cow::Owned(text.replace([RAW_START, RAW_END], ""))
    } else {
        Cow::Borrowed(text)
    }
}

/// Normalize blank lines and trailing whitespace, outside raw regions.
pub fn normalize(assembled: &str) -> String {
    let mut out = String::with_capacity(assembled.len());
    let mut pending_ws = String::new();
    let mut newlines = 0usize;
    let mut raw = false;

    for c in assembled.chars() {
        match c {
            RAW_START => {
                out.push_str(&pending_ws);
                pending_ws.clear();
                newlines = 0;
                raw = true;
            }
            RAW_END => raw = false,
            _ if raw => out.push(c),
            '\n' => {
                pending_ws.clear();
                newlines += 1;
                if newlines <= 2 {
                    out.push('\n');
                }
            }
            ' ' | '\t' => pending_ws.push(c),
            _ => {
                out.push_str(&pending_ws);
                pending_ws.clear();
                newlines = 0;
                out.push(c);
            }
        }
    }

    trim_blank_lines(out)
}

/// Collapse runs of three or more newlines to two, outside raw regions.
/// Markers are kept so the final pass still sees them.
pub fn collapse_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0usize;
    let mut raw = false;

    for c in text.chars() {
        match c {
            RAW_START => raw = true,
            RAW_END => raw = false,
            '\n' if !raw => {
                newlines += 1;
                if newlines > 2 {
                    continue;
                }
            }
            _ => {}
        }
        if c != '\n' || raw {
            newlines = 0;
        }
        out.push(c);
    }
    out
}

/// Drop blank lines at both ends of the document.
fn trim_blank_lines(mut s: String) -> String {
    let end = s.trim_end_matches('\n').len();
    s.truncate(end);
    let start = s.len() - s.trim_start_matches('\n').len();
    s.drain(..start);
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_blank_line_runs() {
        assert_eq!(normalize("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\nb"), "a\nb");
    }

    #[test]
    fn test_trims_trailing_whitespace() {
        assert_eq!(normalize("a  \n b\t\n"), "a\n b");
        assert_eq!(normalize("a\n   \n\n  \nb"), "a\n\nb");
    }

    #[test]
    fn test_trims_document_ends() {
        assert_eq!(normalize("\n\n\nTitle\n\n\n"), "Title");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("\n \n"), "");
    }

    #[test]
    fn test_keeps_leading_indentation() {
        assert_eq!(normalize("- a\n  - b"), "- a\n  - b");
    }

    #[test]
    fn test_raw_region_untouched() {
        let input = format!("\n\n{}\n\nafter", raw("```\na  \n\n\n\nb\n```"));
        assert_eq!(normalize(&input), "```\na  \n\n\n\nb\n```\n\nafter");
    }

    #[test]
    fn test_prefix_before_raw_region_kept() {
        // a blockquote prefix followed by a raw line keeps its space
        let input = format!("> {}", raw("```"));
        assert_eq!(normalize(&input), "> ```");
    }

    #[test]
    fn test_collapse_newlines_keeps_raw_regions() {
        let input = format!("a\n\n\n\nb\n\n\n{}", raw("x\n\n\n\ny"));
        assert_eq!(
            collapse_newlines(&input),
            format!("a\n\nb\n\n{}", raw("x\n\n\n\ny"))
        );
    }

    #[test]
    fn test_strip_markers() {
        assert_eq!(strip_markers("plain"), "plain");
        assert_eq!(strip_markers("a\u{E000}b\u{E001}c"), "abc");
    }
}
