//! Page title extraction.

use once_cell::sync::Lazy;
use regex::Regex;

static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").expect("valid regex"));

static H1: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<h1[^>]*>([^<]+)</h1>").expect("valid regex"));

static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex"));

/// Title used when a page has neither `<title>` nor `<h1>`.
pub const UNTITLED: &str = "Untitled";

/// Title of an HTML page: the `<title>` text, else the first `<h1>` text.
///
/// Only elements whose content is plain text are considered. Whitespace-only
/// titles are skipped.
pub fn extract_title(html: &str) -> String {
    [&TITLE, &H1]
        .iter()
        .filter_map(|re| re.captures(html))
        .map(|caps| clean(&caps[1]))
        .find(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn clean(raw: &str) -> String {
    let decoded = decode_entities(raw);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the common named entities and numeric character references.
/// Unknown entities are left as written.
fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| name.strip_prefix('#').map(str::parse))
                    .and_then(|code| code.ok())
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
