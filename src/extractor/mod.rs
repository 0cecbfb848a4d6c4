//! Best-effort article extraction from arbitrary news URLs.
//!
//! [`ArticleExtractor::extract`] accepts a feed, a homepage or an article
//! link and returns the first article whose plain text reaches the
//! acceptance gate, or `None`.
//!
//! # Strategies
//!
//! | Kind | Candidates | Source |
//! |------|------------|--------|
//! | RSS | one link per `<item>`/`<entry>` | [`rss`] |
//! | Homepage | same-site article links, capped | [`homepage`] |
//! | Article | the URL itself | |
//!
//! Every candidate goes through the same article primitive
//! ([`ArticleExtractor::extract_page`]) and the same short-circuiting loop
//! ([`first_acceptable`]). Candidates are tried strictly one after another;
//! a failed candidate is logged and skipped, never retried. There is no
//! fallback from one strategy to another.

pub mod article;
pub mod homepage;
pub mod readability;
pub mod rss;
pub mod sanitize;

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::fetch::Fetcher;
use crate::models::{ArticleRecord, ExtractedPage, SourceKind};
use futures::future;
use futures::stream::{self, StreamExt};
use sanitize::{plain_text, text_len};
use std::future::Future;
use std::pin::pin;
use tracing::{info, instrument, warn};
use url::Url;

/// Try `candidates` in order and return the first accepted result.
///
/// `attempt` is not called again once a candidate has been accepted.
pub async fn first_acceptable<C, T, F, Fut>(candidates: Vec<C>, attempt: F) -> Option<T>
where
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let accepted = stream::iter(candidates).then(attempt).filter_map(future::ready);
    let mut accepted = pin!(accepted);
    accepted.next().await
}

#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    config: ExtractorConfig,
    fetcher: Fetcher,
}

impl ArticleExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractError> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self { config, fetcher })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract an article from `url`.
    ///
    /// Returns `None` when the URL is invalid, when the feed or homepage
    /// cannot be fetched or parsed, or when no candidate yields at least
    /// `min_content_chars` characters of plain text.
    #[instrument(level = "info", skip(self))]
    pub async fn extract(&self, url: &str) -> Option<ArticleRecord> {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(source) => {
                let e = ExtractError::InvalidUrl {
                    url: url.to_string(),
                    source,
                };
                warn!(error = %e, kind = e.kind(), "Rejecting source URL");
                return None;
            }
        };

        let kind = SourceKind::classify(&url);
        info!(?kind, "Classified source URL");

        let candidates = match self.candidates(kind, &url).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Source fetch failed; no article");
                return None;
            }
        };
        info!(count = candidates.len(), "Trying candidates");

        let tried = candidates.len();
        let accepted = first_acceptable(candidates, |candidate| self.try_candidate(candidate)).await;
        match accepted {
            Some((page, plain)) => {
                let record = ArticleRecord::from_page(page, &plain, &self.config);
                info!(
                    source_url = %record.source_url(),
                    title = %record.title(),
                    chars = text_len(&plain),
                    category_id = record.category_id(),
                    tags = ?record.tags(),
                    image = ?record.lead_image_url(),
                    "Extracted article"
                );
                Some(record)
            }
            None => {
                info!(
                    tried,
                    min_chars = self.config.min_content_chars,
                    "Insufficient content from every candidate"
                );
                None
            }
        }
    }

    /// The candidate links of a source. Feeds and homepages are fetched
    /// here; a direct article link is its own single candidate.
    async fn candidates(&self, kind: SourceKind, url: &Url) -> Result<Vec<Url>, ExtractError> {
        match kind {
            SourceKind::Rss => {
                let (_, body) = self.fetcher.get_text(url).await?;
                rss::feed_links(&body)
            }
            SourceKind::Homepage => {
                let (final_url, body) = self.fetcher.get_text(url).await?;
                Ok(homepage::article_links(
                    &body,
                    &final_url,
                    self.config.max_homepage_candidates,
                ))
            }
            SourceKind::Article => Ok(vec![url.clone()]),
        }
    }

    /// Run the article primitive and apply the acceptance gate. Errors are
    /// logged and turn into `None` so the caller moves on.
    async fn try_candidate(&self, url: Url) -> Option<(ExtractedPage, String)> {
        match self.extract_page(&url).await {
            Ok(page) => {
                let plain = plain_text(&page.content_html);
                let chars = text_len(&plain);
                if chars >= self.config.min_content_chars {
                    Some((page, plain))
                } else {
                    info!(%url, chars, "Candidate below content threshold");
                    None
                }
            }
            Err(e) => {
                warn!(%url, error = %e, kind = e.kind(), "Candidate failed; skipping");
                None
            }
        }
    }
}
