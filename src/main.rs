//! # litoral_news
//!
//! Polls a list of news sources, extracts the main text of the newest
//! usable article and keeps it as a single JSON snapshot for the site's
//! query endpoint.
//!
//! ## Usage
//!
//! ```sh
//! litoral_news -s https://site.com/feed -s https://outro.com.br/ -o ./out
//! ```
//!
//! ## Cycle
//!
//! 1. **Extraction**: sources are tried in order; the first one producing an
//!    article ends the search (see [`extractor`])
//! 2. **Rewriting** (optional): the article is rewritten by a model
//! 3. **Output**: the article replaces the latest snapshot
//!    (`latest_article.json`)
//!
//! Cycles repeat every `--interval-secs` until Ctrl-C, or once with `--once`.

use awful_aj::config::{load_config, AwfulJadeConfig};
use awful_aj::config_dir;
use awful_aj::template::{load_template, ChatTemplate};
use clap::Parser;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod cli;
mod config;
mod enrich;
mod error;
mod extractor;
mod fetch;
mod models;
mod outputs;
mod store;
mod utils;

use cli::Cli;
use config::ExtractorConfig;
use extractor::ArticleExtractor;
use outputs::json;
use store::LatestArticle;
use utils::ensure_writable_dir;

/// Model settings for the optional rewrite step.
struct Rewriter {
    config: AwfulJadeConfig,
    template: ChatTemplate,
}

async fn load_rewriter(args: &Cli) -> Result<Rewriter, Box<dyn Error>> {
    let template = load_template(&args.template).await?;
    info!(template = %args.template, "Loaded template");
    let config_path = match &args.llm_config {
        Some(path) => path.clone(),
        None => config_dir()?.join("config.yaml").to_string_lossy().into_owned(),
    };
    let config = load_config(&config_path)?;
    info!(%config_path, "Loaded model configuration");
    Ok(Rewriter { config, template })
}

/// One pass over the sources. Returns whether the snapshot changed.
#[instrument(level = "info", skip_all)]
async fn run_cycle(
    extractor: &ArticleExtractor,
    sources: &[String],
    rewriter: Option<&Rewriter>,
    latest: &mut LatestArticle,
    output_dir: &str,
) -> Result<bool, Box<dyn Error>> {
    let mut found = None;
    for source in sources {
        match extractor.extract(source).await {
            Some(record) => {
                found = Some(record);
                break;
            }
            None => info!(%source, "No article from source; trying next"),
        }
    }

    let Some(record) = found else {
        warn!(sources = sources.len(), "No source produced an article this cycle");
        return Ok(false);
    };

    if latest.is_same_source(&record) {
        info!(source_url = %record.source_url(), "Latest article unchanged");
        return Ok(false);
    }

    let record = match rewriter {
        Some(r) => {
            let max_tags = extractor.config().max_tags;
            api::rewrite_with_backoff(&r.config, &r.template, &record, max_tags)
                .await
                .unwrap_or(record)
        }
        None => record,
    };

    json::write_latest(&record, output_dir).await?;
    latest.replace(record);
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "litoral_news starting up");

    let args = Cli::parse();
    debug!(?args.sources, %args.output_dir, "Parsed CLI arguments");

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let extractor_config = match &args.config {
        Some(path) => ExtractorConfig::load(path).await?,
        None => ExtractorConfig::default(),
    };
    let extractor = ArticleExtractor::new(extractor_config)?;

    let rewriter = if args.rewrite {
        Some(load_rewriter(&args).await?)
    } else {
        None
    };

    let mut latest = LatestArticle::with(json::read_latest(&args.output_dir).await);
    if let Some(previous) = latest.latest() {
        info!(source_url = %previous.source_url(), "Restored latest article snapshot");
    }

    let interval = Duration::from_secs(args.interval_secs);
    loop {
        let start_time = Instant::now();
        match run_cycle(
            &extractor,
            &args.sources,
            rewriter.as_ref(),
            &mut latest,
            &args.output_dir,
        )
        .await
        {
            Ok(changed) => {
                let elapsed = start_time.elapsed();
                info!(changed, ?elapsed, secs = elapsed.as_secs(), "Cycle complete");
            }
            Err(e) => error!(error = %e, "Cycle failed"),
        }

        if args.once {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; shutting down");
                break;
            }
        }
    }

    Ok(())
}
