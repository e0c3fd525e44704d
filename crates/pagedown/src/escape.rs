//! Markdown escaping for text runs.
//!
//! Backslash-escapes characters that would otherwise be read as Markdown
//! syntax. Inline delimiters are escaped wherever they occur; block markers
//! only where they could start a block, i.e. at the beginning of a line.
//! Escaping once and parsing the result as CommonMark gives back the original
//! visible text. Escaping twice does not: backslashes are doubled.

use once_cell::sync::Lazy;
use regex::Regex;

/// `#`, `-`, `+`, `>`, `=` or `~` opening a line.
static LINE_START_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)([#\-+>=~])").expect("valid regex"));

/// `1.` or `1)` opening a line and followed by whitespace or the line end.
static ORDERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)([0-9]+)([.)])([ \t]|$)").expect("valid regex"));

/// `<` that could open raw HTML or an autolink.
static HTML_OPENER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Za-z/!?])").expect("valid regex"));

/// `&` that would be decoded as a character reference.
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#?[A-Za-z0-9]+;)").expect("valid regex"));

/// Escape markdown special characters
pub fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 8);

    for c in text.chars() {
        match c {
            '\\' | '*' | '_' | '`' | '[' | ']' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    if !result.contains(['#', '-', '+', '>', '=', '~', '.', ')', '<', '&']) {
        return result;
    }

    let result = LINE_START_MARKER.replace_all(&result, r"${1}\${2}");
    let result = ORDERED_MARKER.replace_all(&result, r"${1}${2}\${3}${4}");
    let result = HTML_OPENER.replace_all(&result, r"\<${1}");
    ENTITY.replace_all(&result, r"\&${1}").into_owned()
}

/// `&` plus the start of a reference name at the end of a string.
static ENTITY_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#?[A-Za-z0-9]*$").expect("valid regex"));

/// The rest of a reference name, up to its `;`.
static ENTITY_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?[A-Za-z0-9]*;").expect("valid regex"));

/// Escape syntax that forms only where two rendered fragments meet.
///
/// Text runs are escaped one at a time, so a run ending in `!`, `<`, `&name`
/// or a line of bare digits is harmless alone but not once `next` follows it.
/// Backslashes are inserted into `rendered` (or appended to it) so that
/// pushing `next` afterwards keeps the text literal.
pub fn escape_seam(rendered: &mut String, next: &str) {
    let Some(first) = next.chars().next() else {
        return;
    };

    if ENTITY_TAIL.is_match(next) {
        if let Some(head) = ENTITY_HEAD.find(rendered) {
            let at = head.start();
            if !is_escaped(rendered, at) {
                rendered.insert(at, '\\');
            }
        }
    }

    match first {
        '[' => escape_last(rendered, '!'),
        'A'..='Z' | 'a'..='z' | '/' | '!' | '?' => escape_last(rendered, '<'),
        '.' | ')' if ends_with_bare_number(rendered) => rendered.push('\\'),
        _ => {}
    }
}

/// Put a backslash before a trailing `c` that is not escaped yet.
fn escape_last(rendered: &mut String, c: char) {
    if rendered.ends_with(c) {
        let at = rendered.len() - c.len_utf8();
        if !is_escaped(rendered, at) {
            rendered.insert(at, '\\');
        }
    }
}

/// True when an odd run of backslashes precedes byte offset `at`.
fn is_escaped(s: &str, at: usize) -> bool {
    s[..at].bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

/// The last line is nothing but optional indentation and digits.
fn ends_with_bare_number(rendered: &str) -> bool {
    let line = rendered.rsplit('\n').next().unwrap_or_default();
    let digits = line.trim_start_matches([' ', '\t']);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Escape the characters that end a link or image label.
pub fn escape_label(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '[' | ']') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// Make a URL safe to place inside `( )`.
pub fn escape_destination(url: &str) -> String {
    let mut result = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '(' | ')' => {
                result.push('\\');
                result.push(c);
            }
            ' ' => result.push_str("%20"),
            '\n' | '\r' | '\t' => {}
            _ => result.push(c),
        }
    }
    result
}

/// Quote a link title.
pub fn quote_title(title: &str) -> String {
    format!(" \"{}\"", title.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape("Hello World"), "Hello World");
        assert_eq!(escape("a, b; c: d!"), "a, b; c: d!");
    }

    #[test]
    fn test_inline_delimiters() {
        assert_eq!(escape("*test*"), "\\*test\\*");
        assert_eq!(escape("snake_case"), "snake\\_case");
        assert_eq!(escape("[link]"), "\\[link\\]");
        assert_eq!(escape("a `tick`"), "a \\`tick\\`");
        assert_eq!(escape(r"C:\dir"), r"C:\\dir");
    }

    #[test]
    fn test_line_start_markers() {
        assert_eq!(escape("# not a heading"), "\\# not a heading");
        assert_eq!(escape("- not a list"), "\\- not a list");
        assert_eq!(escape("+ plus"), "\\+ plus");
        assert_eq!(escape("> quote"), "\\> quote");
        assert_eq!(escape("---"), "\\---");
        assert_eq!(escape("  # indented"), "  \\# indented");
        assert_eq!(escape("first\n# second"), "first\n\\# second");
    }

    #[test]
    fn test_mid_line_markers_untouched() {
        assert_eq!(escape("C# and F#"), "C# and F#");
        assert_eq!(escape("well-known"), "well-known");
        assert_eq!(escape("1 + 1 = 2"), "1 + 1 = 2");
    }

    #[test]
    fn test_ordered_marker() {
        assert_eq!(escape("1. first"), "1\\. first");
        assert_eq!(escape("2019."), "2019\\.");
        assert_eq!(escape("3) third"), "3\\) third");
        assert_eq!(escape("3.14 is pi"), "3.14 is pi");
    }

    #[test]
    fn test_html_and_entities() {
        assert_eq!(escape("use <div> tags"), "use \\<div> tags");
        assert_eq!(escape("a < b"), "a < b");
        assert_eq!(escape("&copy; 2024"), "\\&copy; 2024");
        assert_eq!(escape("Tom & Jerry"), "Tom & Jerry");
    }

    #[test]
    fn test_not_idempotent() {
        let once = escape("*x*");
        assert_eq!(escape(&once), "\\\\\\*x\\\\\\*");
    }

    fn seam(rendered: &str, next: &str) -> String {
        let mut rendered = rendered.to_string();
        escape_seam(&mut rendered, next);
        rendered.push_str(next);
        rendered
    }

    #[test]
    fn test_seam_list_marker() {
        assert_eq!(seam("1", ". not a list"), "1\\. not a list");
        assert_eq!(seam("intro\n  12", ")"), "intro\n  12\\)");
        assert_eq!(seam("page 1", ". next"), "page 1. next");
    }

    #[test]
    fn test_seam_image_and_html() {
        assert_eq!(seam("!", "[y](/x)"), "\\![y](/x)");
        assert_eq!(seam("\\\\!", "[y](/x)"), "\\\\\\![y](/x)");
        assert_eq!(seam("a <", "div>"), "a \\<div>");
        assert_eq!(seam("a \\<", "div>"), "a \\<div>");
    }

    #[test]
    fn test_seam_entity() {
        assert_eq!(seam("&", "copy;"), "\\&copy;");
        assert_eq!(seam("x &#1", "69;"), "x \\&#169;");
        assert_eq!(seam("Tom &", " Jerry"), "Tom & Jerry");
        assert_eq!(seam("\\&co", "py;"), "\\&copy;");
    }

    #[test]
    fn test_seam_leaves_plain_joins_alone() {
        assert_eq!(seam("Hello!", " world"), "Hello! world");
        assert_eq!(seam("a", "**b**"), "a**b**");
        assert_eq!(seam("", "[x](y)"), "[x](y)");
    }

    #[test]
    fn test_destination_and_title() {
        assert_eq!(escape_destination("a b(c).png"), "a%20b\\(c\\).png");
        assert_eq!(quote_title(r#"say "hi""#), r#" "say \"hi\"""#);
        assert_eq!(escape_label("a [b]"), "a \\[b\\]");
    }
}
