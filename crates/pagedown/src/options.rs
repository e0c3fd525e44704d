//! Configuration options for a conversion

use indexmap::IndexSet;

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
    /// Use setext-style headings (underlined with = or -)
    /// Only applies to h1 and h2, h3-h6 stay ATX
    Setext,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeBlockStyle {
    /// Use fenced code blocks (```)
    #[default]
    Fenced,
    /// Use indented code blocks (4 spaces)
    Indented,
}

/// Indentation added per level of list nesting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListIndent {
    #[default]
    TwoSpaces,
    FourSpaces,
}

impl ListIndent {
    pub fn as_str(self) -> &'static str {
        match self {
            ListIndent::TwoSpaces => "  ",
            ListIndent::FourSpaces => "    ",
        }
    }
}

/// Tags dropped from the output unless the caller overrides the set.
pub const DEFAULT_IGNORED_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "svg"];

/// Elements nested deeper than this are rendered as plain text.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for a conversion
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Heading style (atx or setext)
    pub heading_style: HeadingStyle,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Indentation unit for nested lists
    pub list_indent: ListIndent,

    /// Horizontal rule string
    pub hr: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Tags whose whole subtree is dropped
    pub ignored_tags: IndexSet<String>,

    /// Maximum element depth rendered structurally
    pub max_depth: usize,
}

impl ConversionOptions {
    /// Drop elements with these tags in addition to the current set.
    pub fn ignore<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored_tags
            .extend(tags.into_iter().map(|t| t.as_ref().to_lowercase()));
        self
    }

    pub fn is_ignored(&self, tag: &str) -> bool {
        self.ignored_tags.contains(tag)
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            bullet_list_marker: '-',
            list_indent: ListIndent::TwoSpaces,
            hr: "---".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
            ignored_tags: DEFAULT_IGNORED_TAGS.iter().map(|t| t.to_string()).collect(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
