//! Converter - the main entry point for HTML to Markdown conversion.

use crate::classify::{classify, renders_empty, visible_text, DisplayCategory};
use crate::context::ConversionContext;
use crate::escape::{escape, escape_seam};
use crate::node::{Element, Node};
use crate::normalize::{normalize, strip_markers};
use crate::options::ConversionOptions;
use crate::rules::{Rule, Rules};
use crate::utilities::collapse_whitespace;

/// The main service for converting HTML to Markdown.
///
/// A `Converter` is immutable while converting, so one instance can be shared
/// across threads.
#[derive(Debug)]
pub struct Converter {
    options: ConversionOptions,
    rules: Rules,
}

impl Converter {
    /// Create a new Converter with default options
    pub fn new() -> Self {
        Self::with_options(ConversionOptions::default())
    }

    /// Create a Converter with custom options
    pub fn with_options(options: ConversionOptions) -> Self {
        Self {
            options,
            rules: Rules::new(),
        }
    }

    /// Convert HTML to Markdown
    #[cfg(feature = "html")]
    pub fn convert(&self, html: &str) -> String {
        if html.trim().is_empty() {
            return String::new();
        }
        self.convert_node(&crate::html::parse_html(html))
    }

    /// Convert UTF-8 encoded HTML bytes to Markdown
    #[cfg(feature = "html")]
    pub fn convert_bytes(&self, bytes: &[u8]) -> crate::Result<String> {
        let node = crate::html::parse_html_bytes(bytes)?;
        Ok(self.convert_node(&node))
    }

    /// Convert a Node tree to Markdown
    pub fn convert_node(&self, node: &Node) -> String {
        let assembled = self.process_node(node, ConversionContext::new());
        let markdown = normalize(&assembled);
        tracing::debug!(
            assembled_len = assembled.len(),
            markdown_len = markdown.len(),
            "converted document"
        );
        markdown
    }

    /// Add a custom rule, checked before the built-in ones
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Drop elements with these tags from the output
    pub fn remove(&mut self, tags: &[&str]) -> &mut Self {
        self.options.ignored_tags.extend(tags.iter().map(|t| t.to_lowercase()));
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Escape markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        escape(text)
    }

    /// Get the current options
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut ConversionOptions {
        &mut self.options
    }

    fn process_node(&self, node: &Node, ctx: ConversionContext) -> String {
        match node {
            Node::Text(text) => self.process_text(text, ctx),
            Node::Element(element) => self.process_element(element, ctx),
        }
    }

    fn process_text(&self, text: &str, ctx: ConversionContext) -> String {
        let text = strip_markers(text);
        if ctx.is_raw() {
            text.into_owned()
        } else {
            escape(&collapse_whitespace(&text))
        }
    }

    /// Process a single element
    fn process_element(&self, element: &Element, ctx: ConversionContext) -> String {
        let category = classify(element, &self.options);
        if category == DisplayCategory::Ignored {
            return self
                .rules
                .fallback(category)
                .replace(element, "", &self.options, &ctx);
        }
        if renders_empty(element, &self.options) {
            return String::new();
        }

        if ctx.depth() >= self.options.max_depth {
            tracing::debug!(
                depth = ctx.depth(),
                list_depth = ctx.list_depth(),
                blockquote_depth = ctx.blockquote_depth(),
                tag = %element.tag,
                "max depth reached, rendering text"
            );
            let text = visible_text(element, &self.options);
            return escape(&collapse_whitespace(&strip_markers(&text)));
        }

        // Process children first
        let content = self.process_children(element, ctx.enter(element));

        let rule = self.rules.for_element(element, category, &self.options);
        rule.replace(element, &content, &self.options, &ctx)
    }

    /// Process children of an element and join their fragments
    fn process_children(&self, element: &Element, ctx: ConversionContext) -> String {
        let list = match element.tag.as_str() {
            "ol" => Some((true, list_start(element))),
            "ul" => Some((false, 1)),
            _ => None,
        };

        let mut result = String::new();
        let mut item_number = list.map(|(_, start)| start).unwrap_or(1);

        for child in element.children() {
            let child_ctx = match (list, child) {
                (Some((ordered, _)), Node::Element(li)) if li.tag == "li" => {
                    let number = item_number;
                    item_number = (item_number + 1).min(MAX_LIST_NUMBER);
                    ctx.with_list_item(ordered, number)
                }
                _ => ctx,
            };

            let fragment = self.process_node(child, child_ctx);
            if ctx.is_raw() {
                result.push_str(&fragment);
            } else {
                join_fragment(&mut result, &fragment);
            }
        }

        result
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Largest number a list marker can carry (nine digits).
const MAX_LIST_NUMBER: u64 = 999_999_999;

/// `start` attribute of an `<ol>`, defaulting to 1.
fn list_start(element: &Element) -> u64 {
    element
        .attr("start")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(1)
        .min(MAX_LIST_NUMBER)
}

/// Append a child fragment. Spaces before a line break and spaces following a
/// line break or another space are dropped, and syntax formed across the seam
/// is escaped.
fn join_fragment(result: &mut String, fragment: &str) {
    let mut fragment = fragment;
    if fragment.starts_with('\n') {
        let kept = result.trim_end_matches([' ', '\t']).len();
        result.truncate(kept);
    }
    if result.ends_with(['\n', ' ']) {
        fragment = fragment.trim_start_matches([' ', '\t']);
    }
    escape_seam(result, fragment);
    result.push_str(fragment);
}
