//! The `html_to_markdown` and `save_markdown` tools.

use std::path::PathBuf;

use chrono::Utc;
use pagedown::{CodeBlockStyle, ConversionOptions, Converter, HeadingStyle};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::fetch::Fetcher;
use crate::postprocess::{metadata_header, truncate};
use crate::storage::save_markdown;
use crate::title::extract_title;
use crate::{Result, ToolError};

pub const HTML_TO_MARKDOWN: &str = "html_to_markdown";
pub const SAVE_MARKDOWN: &str = "save_markdown";

/// Per-request conversion options. Unset fields keep the service defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOptions {
    pub heading_style: Option<String>,
    pub code_block_style: Option<String>,
    pub bullet_list_marker: Option<String>,
}

impl ToolOptions {
    pub fn is_empty(&self) -> bool {
        self.heading_style.is_none()
            && self.code_block_style.is_none()
            && self.bullet_list_marker.is_none()
    }

    /// Layer these options over `base`.
    pub fn apply(self, mut base: ConversionOptions) -> ConversionOptions {
        if let Some(style) = self.heading_style {
            base.heading_style = match style.to_lowercase().as_str() {
                "setext" => HeadingStyle::Setext,
                _ => HeadingStyle::Atx,
            };
        }

        if let Some(style) = self.code_block_style {
            base.code_block_style = match style.to_lowercase().as_str() {
                "indented" => CodeBlockStyle::Indented,
                _ => CodeBlockStyle::Fenced,
            };
        }

        if let Some(marker) = self.bullet_list_marker {
            if let Some(c) = marker.chars().next().filter(|c| matches!(*c, '-' | '*' | '+')) {
                base.bullet_list_marker = c;
            }
        }

        base
    }
}

impl From<ToolOptions> for ConversionOptions {
    fn from(opts: ToolOptions) -> Self {
        opts.apply(ConversionOptions::default())
    }
}

fn default_true() -> bool {
    true
}

/// Arguments of `html_to_markdown`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub url: Option<String>,
    pub html: Option<String>,
    #[serde(default = "default_true")]
    pub include_metadata: bool,
    pub max_length: Option<usize>,
    pub save_to_file: Option<PathBuf>,
    #[serde(flatten)]
    pub options: ToolOptions,
}

impl Default for ConvertRequest {
    fn default() -> Self {
        Self {
            url: None,
            html: None,
            include_metadata: true,
            max_length: None,
            save_to_file: None,
            options: ToolOptions::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveRequest {
    content: Option<String>,
    file_path: Option<PathBuf>,
}

/// A block of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

/// Result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub content: Vec<TextContent>,
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: String) -> Self {
        Self {
            content: vec![TextContent { kind: "text", text }],
            is_error: false,
        }
    }

    pub fn error(text: String) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }

    /// All text blocks joined.
    pub fn joined_text(&self) -> String {
        self.content.iter().map(|c| c.text.as_str()).collect()
    }
}

/// Tool name, description and argument schema.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Runs the tools against a shared converter and fetcher.
pub struct ToolService {
    converter: Converter,
    fetcher: Fetcher,
}

impl ToolService {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            converter: Converter::new(),
            fetcher,
        }
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: HTML_TO_MARKDOWN,
                description: "Fetch HTML from a URL or convert provided HTML content to Markdown format. \
                    Automatically extracts and converts web pages to clean, readable Markdown. \
                    Use this whenever you need to fetch and extract information from a webpage.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "url": {
                            "type": "string",
                            "description": "URL to fetch HTML from. Either 'url' or 'html' must be provided."
                        },
                        "html": {
                            "type": "string",
                            "description": "Raw HTML content to convert. Either 'url' or 'html' must be provided."
                        },
                        "includeMetadata": {
                            "type": "boolean",
                            "description": "Include metadata header (source URL, title, and timestamp) in the output",
                            "default": true
                        },
                        "maxLength": {
                            "type": "integer",
                            "minimum": 0,
                            "description": "Truncate the converted Markdown to this many characters"
                        },
                        "saveToFile": {
                            "type": "string",
                            "description": "Save the result to this path instead of returning it"
                        },
                        "headingStyle": { "type": "string", "enum": ["atx", "setext"] },
                        "codeBlockStyle": { "type": "string", "enum": ["fenced", "indented"] },
                        "bulletListMarker": { "type": "string", "enum": ["-", "*", "+"] }
                    }
                }),
            },
            ToolDefinition {
                name: SAVE_MARKDOWN,
                description: "Save Markdown content to a file, creating parent directories as needed.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "content": { "type": "string", "description": "Markdown content to save" },
                        "filePath": { "type": "string", "description": "Destination file path" }
                    },
                    "required": ["content", "filePath"]
                }),
            },
        ]
    }

    /// Run a tool by name.
    ///
    /// Bad arguments and unknown tools are errors. Failures while fetching or
    /// saving are reported in the output with `is_error` set.
    pub fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolOutput> {
        match name {
            HTML_TO_MARKDOWN => self.html_to_markdown(parse_arguments(arguments)?),
            SAVE_MARKDOWN => self.save_markdown(parse_arguments(arguments)?),
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }

    pub fn html_to_markdown(&self, request: ConvertRequest) -> Result<ToolOutput> {
        match self.convert_page(request) {
            Ok(text) => Ok(ToolOutput::text(text)),
            Err(e) if e.is_request_error() => Err(e),
            Err(e) => {
                warn!("conversion failed: {}", e);
                Ok(ToolOutput::error(format!(
                    "Error converting HTML to Markdown: {e}"
                )))
            }
        }
    }

    /// Fetch or take the HTML, convert it and post-process the Markdown.
    ///
    /// Returns the Markdown, or a summary when it was saved to a file.
    pub fn convert_page(&self, request: ConvertRequest) -> Result<String> {
        let url = request.url.filter(|u| !u.is_empty());
        let html = request.html.filter(|h| !h.is_empty());

        let (html, source) = match (url, html) {
            (Some(url), _) => (self.fetcher.fetch(&url)?, Some(url)),
            (None, Some(html)) => (html, None),
            (None, None) => {
                return Err(ToolError::InvalidParams(
                    "Either 'url' or 'html' parameter is required".to_string(),
                ))
            }
        };
        let title = extract_title(&html);
        if source.is_some() {
            info!("Extracted title: {}", title);
        }

        let custom;
        let converter = if request.options.is_empty() {
            &self.converter
        } else {
            custom = Converter::with_options(request.options.apply(self.converter.options().clone()));
            &custom
        };

        let mut markdown = converter.convert(&html);
        if let Some(max) = request.max_length {
            markdown = truncate(markdown, max).content;
        }

        let content = if request.include_metadata {
            metadata_header(&title, source.as_deref(), Utc::now()) + &markdown
        } else {
            markdown
        };

        match request.save_to_file {
            Some(path) => {
                save_markdown(&path, &content)?;
                Ok(format!(
                    "Successfully converted and saved to {}\n\nTitle: {}\nCharacters: {}",
                    path.display(),
                    title,
                    content.chars().count()
                ))
            }
            None => Ok(content),
        }
    }

    fn save_markdown(&self, request: SaveRequest) -> Result<ToolOutput> {
        let content = request
            .content
            .ok_or_else(|| ToolError::InvalidParams("'content' parameter is required".to_string()))?;
        let path = request
            .file_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| ToolError::InvalidParams("'filePath' parameter is required".to_string()))?;

        match save_markdown(&path, &content) {
            Ok(_) => Ok(ToolOutput::text(format!(
                "Successfully saved markdown to {}",
                path.display()
            ))),
            Err(e) => {
                warn!("save failed: {}", e);
                Ok(ToolOutput::error(format!("Error saving markdown: {e}")))
            }
        }
    }
}

impl Default for ToolService {
    fn default() -> Self {
        Self::new(Fetcher::default())
    }
}

/// Deserialize tool arguments. Missing arguments count as an empty object.
fn parse_arguments<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::InvalidParams(format!("Invalid arguments: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn call(name: &str, arguments: Value) -> Result<ToolOutput> {
        ToolService::default().call_tool(name, arguments)
    }

    const PAGE: &str = "<html><head><title>Guide</title></head>\
                        <body><h1>Install</h1><p>Run <code>make</code>.</p></body></html>";

    #[test]
    fn test_lists_both_tools() {
        let tools = ToolService::default().list_tools();
        let names: Vec<_> = tools.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["html_to_markdown", "save_markdown"]);
        assert_eq!(tools[0].input_schema["properties"]["includeMetadata"]["default"], true);
    }

    #[test]
    fn test_convert_with_metadata() {
        let output = call(HTML_TO_MARKDOWN, json!({ "html": PAGE })).unwrap();
        let text = output.joined_text();
        assert!(!output.is_error);
        assert!(text.starts_with("# Guide\n\n**Source:** Unknown\n**Saved:** "), "{text}");
        assert!(text.ends_with("\n\n---\n\n# Install\n\nRun `make`."), "{text}");
    }

    #[test]
    fn test_convert_without_metadata() {
        let output = call(
            HTML_TO_MARKDOWN,
            json!({ "html": "<ul><li>A</li><li>B</li></ul>", "includeMetadata": false }),
        )
        .unwrap();
        assert_eq!(output.joined_text(), "- A\n- B");
    }

    #[test]
    fn test_options_override() {
        let output = call(
            HTML_TO_MARKDOWN,
            json!({
                "html": "<h1>T</h1><ul><li>x</li></ul>",
                "includeMetadata": false,
                "headingStyle": "setext",
                "bulletListMarker": "*"
            }),
        )
        .unwrap();
        assert_eq!(output.joined_text(), "T\n=\n\n* x");
    }

    #[test]
    fn test_max_length_applies_before_header() {
        let output = call(
            HTML_TO_MARKDOWN,
            json!({ "html": "<p>abcdefghij</p>", "maxLength": 3 }),
        )
        .unwrap();
        let text = output.joined_text();
        assert!(text.starts_with("# Untitled\n"));
        assert!(text.ends_with("---\n\nabc\n\n[Content truncated. Showing 3 of 10 characters]"));
    }

    #[test]
    fn test_missing_source_is_invalid_params() {
        let err = call(HTML_TO_MARKDOWN, json!({})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
        assert_eq!(err.to_string(), "Either 'url' or 'html' parameter is required");

        let err = call(HTML_TO_MARKDOWN, json!({ "html": "", "url": "" })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
        assert!(call(HTML_TO_MARKDOWN, Value::Null).is_err());
    }

    #[test]
    fn test_wrong_argument_types() {
        let err = call(HTML_TO_MARKDOWN, json!({ "html": 42 })).unwrap_err();
        assert!(err.to_string().starts_with("Invalid arguments"));
    }

    #[test]
    fn test_fetch_failure_is_tool_error_output() {
        let output = call(HTML_TO_MARKDOWN, json!({ "url": "ftp://example.com/x" })).unwrap();
        assert!(output.is_error);
        assert_eq!(
            output.joined_text(),
            "Error converting HTML to Markdown: Invalid URL: ftp://example.com/x"
        );
    }

    #[test]
    fn test_convert_fetched_page() {
        use std::io::{BufRead, BufReader, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/guide", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                PAGE.len(),
                PAGE
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        let output = call(HTML_TO_MARKDOWN, json!({ "url": url, "html": "<p>ignored</p>" })).unwrap();
        let text = output.joined_text();
        assert!(text.starts_with(&format!("# Guide\n\n**Source:** {url}\n")), "{text}");
        assert!(text.ends_with("# Install\n\nRun `make`."));
    }

    #[test]
    fn test_convert_and_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/guide.md");
        let output = call(
            HTML_TO_MARKDOWN,
            json!({ "html": PAGE, "includeMetadata": false, "saveToFile": path }),
        )
        .unwrap();

        let saved = fs::read_to_string(&path).unwrap();
        assert_eq!(saved, "# Install\n\nRun `make`.");
        assert_eq!(
            output.joined_text(),
            format!(
                "Successfully converted and saved to {}\n\nTitle: Guide\nCharacters: {}",
                path.display(),
                saved.chars().count()
            )
        );
    }

    #[test]
    fn test_save_markdown_tool() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        let output = call(SAVE_MARKDOWN, json!({ "content": "# Notes", "filePath": path })).unwrap();
        assert_eq!(
            output.joined_text(),
            format!("Successfully saved markdown to {}", path.display())
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Notes");
    }

    #[test]
    fn test_save_markdown_missing_params() {
        let err = call(SAVE_MARKDOWN, json!({ "filePath": "x.md" })).unwrap_err();
        assert_eq!(err.to_string(), "'content' parameter is required");
        let err = call(SAVE_MARKDOWN, json!({ "content": "x" })).unwrap_err();
        assert_eq!(err.to_string(), "'filePath' parameter is required");
    }

    #[test]
    fn test_unknown_tool() {
        let err = call("summarize", json!({})).unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
        assert_eq!(err.to_string(), "Unknown tool: summarize");
    }

    #[test]
    fn test_output_serialization() {
        let value = serde_json::to_value(ToolOutput::text("hi".into())).unwrap();
        assert_eq!(value, json!({ "content": [{ "type": "text", "text": "hi" }] }));
        let value = serde_json::to_value(ToolOutput::error("bad".into())).unwrap();
        assert_eq!(value["isError"], true);
    }

    #[test]
    fn test_tool_options_mapping() {
        let options: ConversionOptions = ToolOptions {
            heading_style: Some("SETEXT".into()),
            code_block_style: Some("indented".into()),
            bullet_list_marker: Some("?".into()),
        }
        .into();
        assert_eq!(options.heading_style, HeadingStyle::Setext);
        assert_eq!(options.code_block_style, CodeBlockStyle::Indented);
        assert_eq!(options.bullet_list_marker, '-');
    }
}
