//! HTML parsing support.
//!
//! This module parses HTML strings with html5ever (through scraper) and
//! converts the result to the owned [`Node`] tree the converter walks.
//! Malformed markup is repaired the way browsers do it: unclosed elements are
//! closed, missing `<html>`/`<head>`/`<body>` are inserted.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::classify::NON_CONTENT_ELEMENTS;
use crate::node::{Element, Node};
use crate::normalize::strip_markers;
use crate::options::DEFAULT_IGNORED_TAGS;
use crate::{ConvertError, Result};

/// Nesting depth beyond which subtrees are folded into a single text node.
pub const MAX_TREE_DEPTH: usize = 512;

/// Parse an HTML string into a Node tree.
///
/// The input is parsed as a full document, so the root is always the `<html>`
/// element and metadata such as `<title>` lands inside `<head>`.
///
/// # Example
///
/// ```rust
/// use pagedown::{parse_html, Converter};
///
/// // Parse HTML to a Node tree
/// let node = parse_html("<h1>Hello <em>World</em></h1>");
///
/// // Convert to Markdown
/// let converter = Converter::new();
/// let markdown = converter.convert_node(&node);
/// assert_eq!(markdown, "# Hello _World_");
/// ```
pub fn parse_html(html: &str) -> Node {
    let document = Html::parse_document(html);
    Node::Element(scraper_to_element(document.root_element(), 0))
}

/// Parse raw bytes as UTF-8 HTML. A leading byte order mark is skipped.
pub fn parse_html_bytes(bytes: &[u8]) -> Result<Node> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let html = std::str::from_utf8(bytes).map_err(ConvertError::Parse)?;
    Ok(parse_html(html))
}

/// Convert a scraper ElementRef to our Element structure
fn scraper_to_element(element: ElementRef, depth: usize) -> Element {
    let mut node = Element::new(element.value().name());

    for (name, value) in element.value().attrs() {
        node.set_attr(name, &strip_markers(value));
    }

    if depth >= MAX_TREE_DEPTH {
        tracing::debug!(depth, tag = %node.tag, "folding deeply nested subtree into text");
        let text = folded_text(element);
        node.children.push(Node::Text(strip_markers(&text).into_owned()));
        return node;
    }

    // Process children
    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                node.children.push(Node::Text(strip_markers(text).into_owned()));
            }
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.children.push(Node::Element(scraper_to_element(child_element, depth + 1)));
                }
            }
            _ => {}
        }
    }

    node
}

/// Text of a subtree being folded, `<br>` read as a newline. Options are not
/// known yet, so the default ignored tags and non-content elements are left
/// out.
fn folded_text(element: ElementRef) -> String {
    let mut out = String::new();
    let mut stack: Vec<_> = element.children().collect();
    stack.reverse();
    while let Some(node) = stack.pop() {
        match node.value() {
            ScraperNode::Text(text) => out.push_str(text),
            ScraperNode::Element(inner) => {
                let tag = inner.name();
                if DEFAULT_IGNORED_TAGS.contains(&tag) || NON_CONTENT_ELEMENTS.contains(&tag) {
                    continue;
                }
                if tag == "br" {
                    out.push('\n');
                    continue;
                }
                let start = stack.len();
                stack.extend(node.children());
                stack[start..].reverse();
            }
            _ => {}
        }
    }
    out
}
