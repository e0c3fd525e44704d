//! Owned document tree consumed by the converter.
//!
//! The tree is a strict forest: every node is owned by its parent and nothing
//! points back up. Any parser can produce this structure; the bundled
//! [`parse_html`](crate::parse_html) adapter builds it from html5ever output.

use indexmap::IndexMap;

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with a tag, attributes and children.
    Element(Element),
    /// A run of character data, stored as it appeared in the source.
    Text(String),
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Lowercased tag name, e.g. `"div"`.
    pub tag: String,

    /// Attributes in source order, names lowercased.
    pub attrs: IndexMap<String, String>,

    /// Child nodes, owned exclusively by this element.
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Node::Element(Element::new(tag_name))
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut element = Element::new(tag_name);
        for (name, value) in attrs {
            element.set_attr(name, value);
        }
        Node::Element(element)
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Node::Text(content.to_string())
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Borrow the element, if this is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// Tag name for elements, `None` for text.
    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|e| e.tag.as_str())
    }

    /// Add a child node. Text nodes cannot have children; the call is a no-op
    /// for them.
    pub fn add_child(&mut self, child: Node) {
        if let Node::Element(element) = self {
            element.children.push(child);
        }
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// True for text nodes holding only HTML whitespace.
    pub fn is_whitespace(&self) -> bool {
        match self {
            Node::Text(text) => text.chars().all(is_html_whitespace),
            Node::Element(_) => false,
        }
    }
}

impl Element {
    /// Create an element with no attributes and no children.
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag: tag_name.to_lowercase(),
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Check if an attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attrs.insert(name.to_lowercase(), value.to_string());
    }

    /// Get all child nodes
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Get all text content from this element and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// Returns the single `<code>` child when it is the only element child
    /// and every other child is whitespace.
    pub fn sole_code_child(&self) -> Option<&Element> {
        let mut code = None;
        for child in &self.children {
            match child {
                Node::Element(element) if element.tag == "code" && code.is_none() => {
                    code = Some(element);
                }
                Node::Element(_) => return None,
                Node::Text(_) if child.is_whitespace() => {}
                Node::Text(_) => return None,
            }
        }
        code
    }

    /// Class names from the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// HTML's definition of whitespace. NBSP is deliberately absent.
pub fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0C}')
}
