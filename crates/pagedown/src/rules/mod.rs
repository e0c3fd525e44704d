//! Rule system for HTML to Markdown conversion.
//!
//! Lookup order is fixed: custom rules, then shape rules, then generic tag
//! rules, then the fallback for the element's [`DisplayCategory`]. The
//! fallbacks make the table total, so every element gets exactly one rule.

mod commonmark;
mod rule;

pub use rule::{Filter, PredicateFn, ReplacementFn, Rule};

use indexmap::IndexMap;

use crate::classify::DisplayCategory;
use crate::node::Element;
use crate::options::ConversionOptions;

/// Collection of rules for conversion
#[derive(Debug)]
pub struct Rules {
    /// Custom rules added by the user (checked first)
    custom_rules: IndexMap<String, Rule>,
    /// Rules matching on tag plus attributes or children
    shape_rules: Vec<Rule>,
    /// Rules matching on tag name alone
    generic_rules: Vec<Rule>,
    block_fallback: Rule,
    inline_fallback: Rule,
    void_fallback: Rule,
    ignored_fallback: Rule,
}

impl Rules {
    /// Create a new Rules instance with the built-in rules
    pub fn new() -> Self {
        Self {
            custom_rules: IndexMap::new(),
            shape_rules: commonmark::shape_rules(),
            generic_rules: commonmark::generic_rules(),
            block_fallback: commonmark::fallback_rule(DisplayCategory::Block),
            inline_fallback: commonmark::fallback_rule(DisplayCategory::Inline),
            void_fallback: commonmark::fallback_rule(DisplayCategory::Void),
            ignored_fallback: commonmark::fallback_rule(DisplayCategory::Ignored),
        }
    }

    /// Add a custom rule. Re-using a key replaces the earlier rule in place.
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom_rules.insert(key.to_string(), rule);
    }

    /// Remove a custom rule by key
    pub fn remove(&mut self, key: &str) -> Option<Rule> {
        self.custom_rules.shift_remove(key)
    }

    /// Find the rule for an element. Always succeeds.
    pub fn for_element(
        &self,
        element: &Element,
        category: DisplayCategory,
        options: &ConversionOptions,
    ) -> &Rule {
        self.custom_rules
            .values()
            .chain(&self.shape_rules)
            .chain(&self.generic_rules)
            .find(|rule| rule.matches(element, options))
            .unwrap_or_else(|| self.fallback(category))
    }

    /// The catch-all rule for a category
    pub fn fallback(&self, category: DisplayCategory) -> &Rule {
        match category {
            DisplayCategory::Block => &self.block_fallback,
            DisplayCategory::Inline => &self.inline_fallback,
            DisplayCategory::Void => &self.void_fallback,
            DisplayCategory::Ignored => &self.ignored_fallback,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ConversionContext;

    fn render(rules: &Rules, element: &Element, content: &str, category: DisplayCategory) -> String {
        let options = ConversionOptions::default();
        rules
            .for_element(element, category, &options)
            .replace(element, content, &options, &ConversionContext::new())
    }

    #[test]
    fn test_shape_rule_beats_generic() {
        let rules = Rules::new();
        let mut link = Element::new("a");
        link.set_attr("href", "https://example.com");
        assert_eq!(
            render(&rules, &link, "Example", DisplayCategory::Inline),
            "[Example](https://example.com)"
        );
    }

    #[test]
    fn test_link_without_href_falls_back() {
        let rules = Rules::new();
        let link = Element::new("a");
        assert_eq!(render(&rules, &link, "text", DisplayCategory::Inline), "text");

        let mut blank = Element::new("a");
        blank.set_attr("href", "  ");
        assert_eq!(render(&rules, &blank, "text", DisplayCategory::Inline), "text");
    }

    #[test]
    fn test_category_fallbacks() {
        let rules = Rules::new();
        assert_eq!(
            render(&rules, &Element::new("section"), " body ", DisplayCategory::Block),
            "\n\nbody\n\n"
        );
        assert_eq!(
            render(&rules, &Element::new("x-tag"), "as is ", DisplayCategory::Inline),
            "as is "
        );
        assert_eq!(render(&rules, &Element::new("br"), "", DisplayCategory::Void), "\n");
        assert_eq!(
            render(&rules, &Element::new("hr"), "", DisplayCategory::Void),
            "\n\n---\n\n"
        );
        assert_eq!(render(&rules, &Element::new("img"), "", DisplayCategory::Void), "");
        assert_eq!(
            render(&rules, &Element::new("script"), "x", DisplayCategory::Ignored),
            ""
        );
    }

    #[test]
    fn test_custom_rules_first_in_insertion_order() {
        let mut rules = Rules::new();
        rules.add("shout", Rule::for_tag("strong", |_, c, _, _| c.to_uppercase()));
        rules.add("never", Rule::for_tag("strong", |_, _, _, _| "unused".into()));
        assert_eq!(
            render(&rules, &Element::new("strong"), "loud", DisplayCategory::Inline),
            "LOUD"
        );

        assert!(rules.remove("shout").is_some());
        assert_eq!(
            render(&rules, &Element::new("strong"), "loud", DisplayCategory::Inline),
            "unused"
        );
    }
}
