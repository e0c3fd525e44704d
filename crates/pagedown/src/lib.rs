//! # pagedown
//!
//! Convert HTML documents to clean, readable Markdown.
//!
//! Conversion walks the document tree bottom-up. Every element is rendered by
//! exactly one [`Rule`]: custom rules first, then the built-in CommonMark rules,
//! then a fallback chosen by the element's [`DisplayCategory`]. The assembled
//! string goes through one final whitespace pass, which never touches the
//! inside of code blocks.
//!
//! ## Design
//!
//! The converter works on an owned [`Node`] tree, so any parser can feed it.
//! With the default `html` feature the crate bundles an html5ever-based
//! adapter that tolerates malformed markup the way browsers do.
//!
//! ## Example
//!
//! ```rust
//! use pagedown::Converter;
//!
//! let converter = Converter::new();
//! let markdown = converter.convert("<h1>Hello</h1><p>A <strong>bold</strong> move.</p>");
//! assert_eq!(markdown, "# Hello\n\nA **bold** move.");
//! ```
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use pagedown::{Converter, Node};
//!
//! let mut h2 = Node::element("h2");
//! h2.add_child(Node::text("Built by hand"));
//!
//! assert_eq!(Converter::new().convert_node(&h2), "## Built by hand");
//! ```

pub mod classify;
mod context;
pub mod escape;
#[cfg(feature = "html")]
pub mod html;
pub mod node;
pub mod normalize;
pub mod options;
mod rules;
mod service;
mod utilities;

pub use classify::DisplayCategory;
pub use context::{ConversionContext, ListFrame};
#[cfg(feature = "html")]
pub use html::{parse_html, parse_html_bytes};
pub use node::{Element, Node};
pub use options::{CodeBlockStyle, ConversionOptions, HeadingStyle, ListIndent};
pub use rules::{Filter, PredicateFn, ReplacementFn, Rule, Rules};
pub use service::Converter;

/// Error type for conversion
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("input is not valid UTF-8: {0}")]
    Parse(#[from] std::str::Utf8Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Convert an HTML string with the given options.
///
/// Never fails: malformed markup is repaired by the parser and unknown
/// elements are rendered through their category fallback.
#[cfg(feature = "html")]
pub fn convert(html: &str, options: &ConversionOptions) -> String {
    Converter::with_options(options.clone()).convert(html)
}
