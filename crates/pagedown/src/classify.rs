//! Element classification.
//!
//! Every element gets a [`DisplayCategory`] from static tag tables. The rule
//! engine falls back on the category when no tag rule matches, which keeps the
//! rule table total.

use crate::node::{Element, Node};
use crate::options::ConversionOptions;

/// How an element participates in layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayCategory {
    /// Rendered on its own lines, separated from siblings by a blank line.
    Block,
    /// Rendered within the surrounding text flow.
    Inline,
    /// No content; rendered as a fixed literal.
    Void,
    /// Dropped with its whole subtree.
    Ignored,
}

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "dialog", "div", "dl",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "html", "li", "main", "menu", "nav", "ol", "p", "pre", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Non-content elements dropped regardless of the configured ignore set
pub const NON_CONTENT_ELEMENTS: &[&str] = &["head", "template"];

/// Classify an element. Unknown tags are inline.
pub fn classify(element: &Element, options: &ConversionOptions) -> DisplayCategory {
    let tag = element.tag.as_str();
    if options.is_ignored(tag) || NON_CONTENT_ELEMENTS.contains(&tag) {
        DisplayCategory::Ignored
    } else if VOID_ELEMENTS.contains(&tag) {
        DisplayCategory::Void
    } else if BLOCK_ELEMENTS.contains(&tag) {
        DisplayCategory::Block
    } else {
        DisplayCategory::Inline
    }
}

/// An element whose only non-whitespace content is ignored elements renders
/// as nothing, whatever its own category.
pub fn renders_empty(element: &Element, options: &ConversionOptions) -> bool {
    let mut saw_ignored = false;
    for child in &element.children {
        match child {
            Node::Element(inner) if classify(inner, options) == DisplayCategory::Ignored => {
                saw_ignored = true;
            }
            Node::Text(_) if child.is_whitespace() => {}
            _ => return false,
        }
    }
    saw_ignored
}

/// Character data of `element` with ignored subtrees left out and `<br>` read
/// as a newline. Walks with an explicit stack, so any depth is fine.
pub fn visible_text(element: &Element, options: &ConversionOptions) -> String {
    let mut out = String::new();
    let mut stack: Vec<&Node> = element.children.iter().rev().collect();
    while let Some(node) = stack.pop() {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(inner) => match classify(inner, options) {
                DisplayCategory::Ignored => {}
                _ if inner.tag == "br" => out.push('\n'),
                _ => stack.extend(inner.children.iter().rev()),
            },
        }
    }
    out
}
