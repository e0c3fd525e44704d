//! Rule and Filter types for HTML conversion.

use crate::context::ConversionContext;
use crate::node::Element;
use crate::options::ConversionOptions;

/// Type alias for replacement functions
pub type ReplacementFn =
    Box<dyn Fn(&Element, &str, &ConversionOptions, &ConversionContext) -> String + Send + Sync>;

/// Type alias for filter predicates
pub type PredicateFn = Box<dyn Fn(&Element, &ConversionOptions) -> bool + Send + Sync>;

/// A filter determines which elements a rule applies to
pub enum Filter {
    /// Match a single tag name
    TagName(String),
    /// Match any of multiple tag names
    TagNames(Vec<String>),
    /// Match using a predicate function
    Predicate(PredicateFn),
}

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    /// Create a filter with a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Element, &ConversionOptions) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// Check if this filter matches an element
    pub fn matches(&self, element: &Element, options: &ConversionOptions) -> bool {
        match self {
            Filter::TagName(t) => element.tag == *t,
            Filter::TagNames(tags) => tags.iter().any(|t| element.tag == *t),
            Filter::Predicate(f) => f(element, options),
        }
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::TagName(t) => f.debug_tuple("TagName").field(t).finish(),
            Filter::TagNames(tags) => f.debug_tuple("TagNames").field(tags).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// A rule defines how to convert a matched HTML element to Markdown
pub struct Rule {
    /// Filter to determine which elements this rule applies to
    pub filter: Filter,
    /// Replacement function that generates Markdown
    pub replacement: ReplacementFn,
}

impl Rule {
    /// Create a new rule
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&Element, &str, &ConversionOptions, &ConversionContext) -> String
            + Send
            + Sync
            + 'static,
    {
        Self {
            filter,
            replacement: Box::new(replacement),
        }
    }

    /// Create a rule that matches a single tag
    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&Element, &str, &ConversionOptions, &ConversionContext) -> String
            + Send
            + Sync
            + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Create a rule that matches multiple tags
    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&Element, &str, &ConversionOptions, &ConversionContext) -> String
            + Send
            + Sync
            + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// Check whether this rule applies to an element
    pub fn matches(&self, element: &Element, options: &ConversionOptions) -> bool {
        self.filter.matches(element, options)
    }

    /// Apply this rule's replacement
    pub fn replace(
        &self,
        element: &Element,
        content: &str,
        options: &ConversionOptions,
        ctx: &ConversionContext,
    ) -> String {
        (self.replacement)(element, content, options, ctx)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("filter", &self.filter).finish_non_exhaustive()
    }
}
