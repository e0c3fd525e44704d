//! pagedown CLI - HTML to Markdown.
//!
//! Provides commands for:
//! - `serve`: Run the JSON-RPC tool server on stdio
//! - `convert`: Convert a URL, file or stdin and print or save the result

use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pagedown_tool::tools::{ConvertRequest, ToolOptions};
use pagedown_tool::{server, FetchConfig, Fetcher, ToolService};

/// Convert web pages to clean, readable Markdown.
#[derive(Parser)]
#[command(name = "pagedown", version, about)]
struct Cli {
    /// Log at INFO level (otherwise RUST_LOG, default WARN)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the html_to_markdown and save_markdown tools over stdio.
    Serve,
    /// Convert one page.
    Convert(ConvertArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Fetch the page from this URL
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,

    /// Read HTML from this file (default: stdin)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Leave out the title/source/timestamp header
    #[arg(long)]
    no_metadata: bool,

    /// Truncate the Markdown body to this many characters
    #[arg(long)]
    max_length: Option<usize>,

    /// Save to this path instead of printing
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_parser = ["atx", "setext"])]
    heading_style: Option<String>,

    #[arg(long, value_parser = ["fenced", "indented"])]
    code_block_style: Option<String>,

    /// Bullet list marker
    #[arg(long, value_parser = ["-", "*", "+"])]
    bullet: Option<String>,
}

impl ConvertArgs {
    fn into_request(self) -> anyhow::Result<ConvertRequest> {
        let html = match (&self.url, &self.file) {
            (Some(_), _) => None,
            (None, Some(path)) => Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
            ),
            (None, None) => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read HTML from stdin")?;
                Some(buf)
            }
        };

        Ok(ConvertRequest {
            url: self.url,
            html,
            include_metadata: !self.no_metadata,
            max_length: self.max_length,
            save_to_file: self.output,
            options: ToolOptions {
                heading_style: self.heading_style,
                code_block_style: self.code_block_style,
                bullet_list_marker: self.bullet,
            },
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // stdout carries protocol messages and Markdown
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let fetcher = Fetcher::new(FetchConfig {
        timeout: Duration::from_secs(cli.timeout),
        ..Default::default()
    });
    let tools = ToolService::new(fetcher);

    match cli.command {
        Commands::Serve => server::serve_stdio(tools).context("server I/O failed"),
        Commands::Convert(args) => {
            let request = args.into_request()?;
            let empty_input = request.url.is_none()
                && request.html.as_deref().map_or(true, |h| h.trim().is_empty());
            if empty_input {
                bail!("no HTML given: pass --url, --file, or pipe HTML on stdin");
            }

            let text = tools.convert_page(request)?;
            println!("{text}");
            Ok(())
        }
    }
}
