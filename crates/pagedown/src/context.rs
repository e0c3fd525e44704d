//! Per-call traversal state.
//!
//! A [`ConversionContext`] is a small `Copy` value handed down the recursion.
//! Each level derives its children's context from its own, so nothing has to
//! be restored on the way back up.

use crate::node::Element;

/// The list an `<li>` belongs to, and its number within that list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFrame {
    pub ordered: bool,
    /// 1-based (or `start`-based) number of the current item.
    pub number: u64,
}

/// Context for conversion (tracks enclosing elements)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionContext {
    list_depth: usize,
    blockquote_depth: usize,
    depth: usize,
    raw: bool,
    list: Option<ListFrame>,
}

impl ConversionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of enclosing `ul`/`ol` elements.
    pub fn list_depth(&self) -> usize {
        self.list_depth
    }

    /// Number of enclosing `blockquote` elements.
    pub fn blockquote_depth(&self) -> usize {
        self.blockquote_depth
    }

    /// Element nesting depth of the node being rendered.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// True inside `pre`/`code`: no escaping, no whitespace collapsing.
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// The list frame set for the current `<li>`, if any.
    pub fn list(&self) -> Option<ListFrame> {
        self.list
    }

    /// Context for the children of `element`.
    pub fn enter(self, element: &Element) -> Self {
        let mut ctx = self;
        ctx.depth += 1;
        match element.tag.as_str() {
            "ul" | "ol" => {
                ctx.list_depth += 1;
                ctx.list = None;
            }
            "blockquote" => ctx.blockquote_depth += 1,
            "pre" | "code" => ctx.raw = true,
            _ => {}
        }
        ctx
    }

    /// Context for one `<li>` of a list.
    pub fn with_list_item(self, ordered: bool, number: u64) -> Self {
        Self {
            list: Some(ListFrame { ordered, number }),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_is_scoped() {
        let root = ConversionContext::new();
        let ul = Element::new("ul");
        let inner = root.enter(&ul).enter(&ul);
        assert_eq!(inner.list_depth(), 2);
        assert_eq!(inner.depth(), 2);
        // the parent value is untouched
        assert_eq!(root.list_depth(), 0);
        assert_eq!(root.depth(), 0);
    }

    #[test]
    fn test_raw_mode() {
        let ctx = ConversionContext::new().enter(&Element::new("pre"));
        assert!(ctx.is_raw());
        assert!(ctx.enter(&Element::new("span")).is_raw());
        assert!(!ConversionContext::new().enter(&Element::new("p")).is_raw());
    }

    #[test]
    fn test_list_frame_cleared_by_nested_list() {
        let item = ConversionContext::new().with_list_item(true, 3);
        assert_eq!(item.list(), Some(ListFrame { ordered: true, number: 3 }));
        assert_eq!(item.enter(&Element::new("ol")).list(), None);
        assert_eq!(item.enter(&Element::new("blockquote")).blockquote_depth(), 1);
    }
}
