//! Small string helpers shared by the rules and the serializer.

use crate::node::is_html_whitespace;
use crate::normalize::strip_markers;

/// Clean an attribute value (trim and handle empty)
pub fn clean_attribute(value: Option<&str>) -> String {
    value
        .map(|v| strip_markers(v.trim()).into_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_default()
}

/// Collapse runs of HTML whitespace into a single space
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if is_html_whitespace(c) {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Length of the longest run of `c` in `s`
pub fn longest_run(s: &str, c: char) -> usize {
    s.chars()
        .fold((0, 0), |(max, current), ch| {
            if ch == c {
                (max.max(current + 1), current + 1)
            } else {
                (max, 0)
            }
        })
        .0
}

/// Prefix every line but the first with `indent`; blank lines stay empty.
pub fn indent_continuation(content: &str, indent: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(indent);
            }
        }
        out.push_str(line);
    }
    out
}

/// Split leading and trailing whitespace off `s`.
pub fn split_flanking_whitespace(s: &str) -> (&str, &str, &str) {
    let trimmed_start = s.trim_start_matches(is_html_whitespace);
    let leading = &s[..s.len() - trimmed_start.len()];
    let inner = trimmed_start.trim_end_matches(is_html_whitespace);
    let trailing = &trimmed_start[inner.len()..];
    (leading, inner, trailing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_attribute() {
        assert_eq!(clean_attribute(Some("  a.png ")), "a.png");
        assert_eq!(clean_attribute(Some("   ")), "");
        assert_eq!(clean_attribute(None), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t b"), "a b");
        assert_eq!(collapse_whitespace("\u{a0}\u{a0}"), "\u{a0}\u{a0}");
    }

    #[test]
    fn test_longest_run() {
        assert_eq!(longest_run("a ``` b ` c", '`'), 3);
        assert_eq!(longest_run("none", '`'), 0);
    }

    #[test]
    fn test_indent_continuation() {
        assert_eq!(indent_continuation("a\nb\n\nc", "  "), "a\n  b\n\n  c");
    }

    #[test]
    fn test_split_flanking_whitespace() {
        assert_eq!(split_flanking_whitespace(" x y  "), (" ", "x y", "  "));
        assert_eq!(split_flanking_whitespace("   "), ("   ", "", ""));
    }
}
