//! Command-line interface definitions for litoral_news.
//!
//! All arguments can be provided via command-line flags or environment
//! variables.

use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # One pass over a feed and a homepage
/// litoral_news --once -s https://site.com/feed -s https://outro.com.br/
///
/// # Every 10 minutes, rewriting the result with the configured model
/// litoral_news -s https://site.com/feed --interval-secs 600 --rewrite
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Source URL (feed, homepage or article); tried in the given order
    #[arg(short, long = "source", env = "NEWS_SOURCES", value_delimiter = ',', required = true)]
    pub sources: Vec<String>,

    /// Optional path to an extractor config YAML file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory for the latest_article.json snapshot
    #[arg(short, long, default_value = "./out")]
    pub output_dir: String,

    /// Seconds between extraction cycles
    #[arg(long, env = "INTERVAL_SECS", default_value_t = 900)]
    pub interval_secs: u64,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Rewrite each extracted article with the configured model
    #[arg(long)]
    pub rewrite: bool,

    /// Path to the model config.yaml (defaults to the awful_aj config dir)
    #[arg(long)]
    pub llm_config: Option<String>,

    /// Name of the chat template used for rewriting
    #[arg(long, default_value = "news_rewriter")]
    pub template: String,
}
