//! Metadata header and length limiting for converted pages.

use chrono::{DateTime, SecondsFormat, Utc};

/// Source shown in the header when the HTML did not come from a URL.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Header prepended to a converted page.
pub fn metadata_header(title: &str, source: Option<&str>, saved_at: DateTime<Utc>) -> String {
    format!(
        "# {}\n\n**Source:** {}\n**Saved:** {}\n\n---\n\n",
        title,
        source.unwrap_or(UNKNOWN_SOURCE),
        saved_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Markdown after applying a length limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated {
    pub content: String,
    /// Length of the input in characters.
    pub total_chars: usize,
    pub truncated: bool,
}

/// Keep at most `max_chars` characters, followed by a notice when anything
/// was cut.
pub fn truncate(markdown: String, max_chars: usize) -> Truncated {
    let total_chars = markdown.chars().count();
    if total_chars <= max_chars {
        return Truncated {
            content: markdown,
            total_chars,
            truncated: false,
        };
    }

    let cut = markdown
        .char_indices()
        .nth(max_chars)
        .map_or(markdown.len(), |(i, _)| i);
    let content = format!(
        "{}\n\n[Content truncated. Showing {} of {} characters]",
        &markdown[..cut],
        max_chars,
        total_chars
    );

    Truncated {
        content,
        total_chars,
        truncated: true,
    }
}
