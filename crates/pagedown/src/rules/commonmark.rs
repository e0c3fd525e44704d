//! Built-in rules for HTML to Markdown conversion.
//!
//! Rules come in two tiers. Shape rules look at attributes or children as well
//! as the tag (`<a href>`, `<img src>`, `<pre><code>`); generic rules match on
//! the tag alone. Anything left over is handled by the per-category fallbacks
//! at the bottom of this file.

use super::{Filter, Rule};
use crate::classify::{visible_text, DisplayCategory};
use crate::escape::{escape, escape_destination, escape_label, quote_title};
use crate::node::{is_html_whitespace, Element};
use crate::normalize::{collapse_newlines, raw, strip_markers};
use crate::options::{CodeBlockStyle, ConversionOptions, HeadingStyle};
use crate::utilities::{
    clean_attribute, collapse_whitespace, indent_continuation, longest_run,
    split_flanking_whitespace,
};

/// Rules matching on tag plus attribute or child shape. Checked first.
pub fn shape_rules() -> Vec<Rule> {
    vec![inline_link_rule(), image_rule(), code_block_rule()]
}

/// Rules matching on tag name alone.
pub fn generic_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        preformatted_rule(),
        code_rule(),
        strong_rule(),
        emphasis_rule(),
        strikethrough_rule(),
        table_rule(),
        caption_rule(),
        table_row_rule(),
        table_cell_rule(),
    ]
}

/// The rule used when nothing more specific matches.
pub fn fallback_rule(category: DisplayCategory) -> Rule {
    let filter = Filter::predicate(|_, _| true);
    match category {
        DisplayCategory::Block => Rule::new(filter, |_, content, _, _| block(trim(content))),
        DisplayCategory::Inline => Rule::new(filter, |_, content, _, _| content.to_string()),
        DisplayCategory::Void => Rule::new(filter, |element, _, options, _| {
            match element.tag.as_str() {
                "br" => "\n".to_string(),
                "hr" => block(&options.hr),
                _ => String::new(),
            }
        }),
        DisplayCategory::Ignored => Rule::new(filter, |_, _, _, _| String::new()),
    }
}

/// Surround a block with blank lines; blank blocks vanish.
fn block(content: &str) -> String {
    if content.is_empty() {
        String::new()
    } else {
        format!("\n\n{}\n\n", content)
    }
}

fn trim(content: &str) -> &str {
    content.trim_matches(is_html_whitespace)
}

/// Fold inline content onto one line.
fn flatten(content: &str) -> String {
    collapse_whitespace(&strip_markers(content)).trim().to_string()
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _, _| block(trim(content)))
}

fn heading_rule() -> Rule {
    Rule::for_tags(
        &["h1", "h2", "h3", "h4", "h5", "h6"],
        |element, content, options, _| {
            let level: usize = element.tag[1..].parse().unwrap_or(1);

            let content = flatten(content);
            if content.is_empty() {
                return String::new();
            }

            match options.heading_style {
                HeadingStyle::Setext if level <= 2 => {
                    let underline = if level == 1 { "=" } else { "-" };
                    let width = content.chars().count();
                    block(&format!("{}\n{}", content, underline.repeat(width)))
                }
                _ => {
                    let hashes = "#".repeat(level);
                    block(&format!("{} {}", hashes, keep_trailing_hashes(&content)))
                }
            }
        },
    )
}

/// A run of `#` ending an ATX heading after a space is a closing sequence.
/// Escaping its first `#` keeps it as text.
fn keep_trailing_hashes(content: &str) -> String {
    let stripped = content.trim_end_matches('#');
    let closes = stripped.is_empty() || stripped.ends_with([' ', '\t']);
    if stripped.len() < content.len() && closes {
        format!("{}\\{}", stripped, &content[stripped.len()..])
    } else {
        content.to_string()
    }
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _, _| {
        let content = collapse_newlines(trim(content));
        if content.is_empty() {
            return String::new();
        }
        let quoted: Vec<String> = content
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect();
        block(&quoted.join("\n"))
    })
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |_, content, _, ctx| {
        let content = trim(content);
        if content.is_empty() {
            return String::new();
        }

        if ctx.list_depth() > 0 {
            // Nested lists hug the text of their item
            format!("\n{}\n", content)
        } else {
            block(content)
        }
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |_, content, options, ctx| {
        let content = indent_continuation(trim(content), options.list_indent.as_str());
        match ctx.list() {
            Some(frame) if frame.ordered => format!("{}. {}\n", frame.number, content),
            _ => {
                let bullet = options.bullet_list_marker;
                format!("{} {}\n", bullet, redraw_leading_rule(content, bullet))
            }
        }
    })
}

/// `- ---` is one thematic break, not an item holding one. A rule opening the
/// item and drawn with the bullet character is redrawn with `_`.
fn redraw_leading_rule(content: String, bullet: char) -> String {
    let first = content.split('\n').next().unwrap_or_default();
    let is_rule = first.chars().filter(|&c| c == bullet).count() >= 2
        && first.chars().all(|c| c == bullet || c == ' ' || c == '\t');
    if !is_rule {
        return content;
    }
    format!("{}{}", first.replace(bullet, "_"), &content[first.len()..])
}

fn code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|element, _| {
            element.tag == "pre" && element.sole_code_child().is_some()
        }),
        |element, _, options, _| {
            let Some(code) = element.sole_code_child() else {
                return String::new();
            };
            let language = code_language(code).or_else(|| code_language(element));
            code_block(&visible_text(code, options), language, options)
        },
    )
}

fn preformatted_rule() -> Rule {
    Rule::for_tag("pre", |element, _, options, _| {
        code_block(&visible_text(element, options), code_language(element), options)
    })
}

/// Language from a `language-*` or `lang-*` class.
fn code_language(element: &Element) -> Option<&str> {
    element.classes().find_map(|class| {
        class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            .filter(|lang| !lang.is_empty())
    })
}

fn code_block(code: &str, language: Option<&str>, options: &ConversionOptions) -> String {
    let code = strip_markers(code);
    let code = code.strip_suffix('\n').unwrap_or(&code);

    match options.code_block_style {
        CodeBlockStyle::Fenced => {
            let fence = "`".repeat((longest_run(code, '`') + 1).max(3));
            let body = format!(
                "{}{}\n{}\n{}",
                fence,
                language.unwrap_or(""),
                code,
                fence
            );
            block(&raw(&body))
        }
        CodeBlockStyle::Indented => {
            if code.trim().is_empty() {
                return String::new();
            }
            let indented: Vec<String> = code
                .split('\n')
                .map(|line| {
                    if line.is_empty() {
                        String::new()
                    } else {
                        format!("    {}", line)
                    }
                })
                .collect();
            block(&raw(&indented.join("\n")))
        }
    }
}

fn code_rule() -> Rule {
    Rule::for_tag("code", |element, _, options, _| {
        let content = strip_markers(&visible_text(element, options)).replace(['\r', '\n'], " ");
        if content.is_empty() {
            return String::new();
        }

        let backticks = "`".repeat(longest_run(&content, '`') + 1);

        let needs_space = content.starts_with('`')
            || content.ends_with('`')
            || (content.starts_with(' ') && content.ends_with(' ') && !content.trim().is_empty());

        if needs_space {
            format!("{} {} {}", backticks, content, backticks)
        } else {
            format!("{}{}{}", backticks, content, backticks)
        }
    })
}

/// Wrap inline content in `delimiter`, keeping flanking whitespace outside.
fn delimit(content: &str, delimiter: &str) -> String {
    let (leading, inner, trailing) = split_flanking_whitespace(content);
    if inner.is_empty() {
        return if content.is_empty() {
            String::new()
        } else {
            " ".to_string()
        };
    }
    format!("{leading}{delimiter}{inner}{delimiter}{trailing}")
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |_, content, options, _| {
        delimit(content, &options.strong_delimiter)
    })
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |_, content, options, _| {
        delimit(content, &options.em_delimiter.to_string())
    })
}

fn strikethrough_rule() -> Rule {
    Rule::for_tags(&["del", "s", "strike"], |_, content, _, _| delimit(content, "~~"))
}

fn inline_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|element, _| {
            element.tag == "a" && !clean_attribute(element.attr("href")).is_empty()
        }),
        |element, content, _, _| {
            let href = escape_destination(&clean_attribute(element.attr("href")));
            let title = title_part(element);

            let content = content.replace('\n', " ");
            let (leading, inner, trailing) = split_flanking_whitespace(&content);
            format!("{leading}[{inner}]({href}{title}){trailing}")
        },
    )
}

fn image_rule() -> Rule {
    Rule::new(
        Filter::predicate(|element, _| {
            element.tag == "img" && !clean_attribute(element.attr("src")).is_empty()
        }),
        |element, _, _, _| {
            let alt = escape_label(&collapse_whitespace(&clean_attribute(element.attr("alt"))));
            let src = escape_destination(&clean_attribute(element.attr("src")));
            let title = title_part(element);

            format!("![{}]({}{})", alt, src, title)
        },
    )
}

fn title_part(element: &Element) -> String {
    let title = collapse_whitespace(&clean_attribute(element.attr("title")));
    if title.is_empty() {
        String::new()
    } else {
        quote_title(&title)
    }
}

fn table_rule() -> Rule {
    Rule::for_tag("table", |element, content, options, _| {
        let caption = element
            .element_children()
            .find(|child| child.tag == "caption")
            .map(|caption| escape(&flatten(&visible_text(caption, options))))
            .unwrap_or_default();

        let cell_counts = row_cell_counts(element);
        let columns = cell_counts.iter().copied().max().unwrap_or(0);
        if columns == 0 {
            return format!("{}{}", block(&caption), block(trim(content)));
        }

        // every rendered row starts with the cell rule's `|`
        let rows = content.split('\n').map(str::trim).filter(|l| l.starts_with('|'));

        let mut out = Vec::with_capacity(cell_counts.len() + 1);
        for (i, (row, cells)) in rows.zip(cell_counts.iter()).enumerate() {
            let padding = "  |".repeat(columns - cells);
            out.push(format!("{}{}", row, padding));
            if i == 0 {
                out.push(format!("|{}", " --- |".repeat(columns)));
            }
        }

        format!("{}{}", block(&caption), block(&out.join("\n")))
    })
}

/// Captions are rendered by the table rule, above the rows.
fn caption_rule() -> Rule {
    Rule::for_tag("caption", |_, _, _, _| String::new())
}

/// Number of cells of each non-empty row of a table, in document order.
/// Rows of nested tables are not counted.
fn row_cell_counts(table: &Element) -> Vec<usize> {
    let mut counts = Vec::new();
    for child in table.element_children() {
        match child.tag.as_str() {
            "tr" => counts.push(cell_count(child)),
            "thead" | "tbody" | "tfoot" => counts.extend(
                child
                    .element_children()
                    .filter(|row| row.tag == "tr")
                    .map(cell_count),
            ),
            _ => {}
        }
    }
    counts.retain(|&n| n > 0);
    counts
}

fn cell_count(row: &Element) -> usize {
    row.element_children()
        .filter(|cell| cell.tag == "td" || cell.tag == "th")
        .count()
}

fn table_row_rule() -> Rule {
    Rule::for_tag("tr", |_, content, _, _| {
        let content = trim(content);
        if content.is_empty() {
            String::new()
        } else {
            format!("\n{} |\n", content)
        }
    })
}

fn table_cell_rule() -> Rule {
    Rule::for_tags(&["th", "td"], |_, content, _, _| {
        format!("| {} ", flatten(content).replace('|', "\\|"))
    })
}
