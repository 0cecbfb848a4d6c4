//! Optional article rewriting through an OpenAI-compatible model.
//!
//! The extracted title and plain text are sent to the model, which answers
//! with a JSON object:
//!
//! ```json
//! { "title": "…", "content": "…" }
//! ```
//!
//! `content` may be HTML or plain paragraphs separated by blank lines. The
//! rewritten body goes through the same sanitizer as extracted content, and
//! a rewrite that cannot be obtained or parsed leaves the original record in
//! place.
//!
//! # Retry Strategy
//!
//! - Maximum 5 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd
//! - One extra request when the answer is cut off mid-JSON

use crate::extractor::sanitize::sanitize;
use crate::models::ArticleRecord;
use crate::utils::{looks_truncated, truncate_for_log};
use awful_aj::api::ask;
use awful_aj::{config::AwfulJadeConfig, template::ChatTemplate};
use rand::{rng, Rng};
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Trait for async model interaction.
///
/// Implementors send text to a model and return its answer. Decorators such
/// as [`RetryAsk`] wrap another implementor.
pub trait AskAsync {
    /// The type of response returned by the model.
    type Response;

    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Adds exponential backoff with jitter to any [`AskAsync`] implementation.
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(text).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self
                        .base_delay
                        .saturating_mul(1 << (attempt - 1).min(16))
                        .min(self.max_delay);
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Adapts `awful_aj::api::ask` to [`AskAsync`].
#[derive(Debug)]
pub struct AskFnWrapper<'a> {
    pub config: &'a AwfulJadeConfig,
    pub template: &'a ChatTemplate,
}

impl<'a> AskAsync for AskFnWrapper<'a> {
    type Response = String;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let res = ask(self.config, text.to_string(), self.template, None, None).await;
        if let Err(e) = &res {
            warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "API call failed");
        }
        res
    }
}

/// Shape of the model's answer.
#[derive(Debug, Deserialize, PartialEq)]
pub struct RewrittenArticle {
    pub title: String,
    pub content: String,
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

pub fn parse_rewrite(raw: &str) -> Result<RewrittenArticle, serde_json::Error> {
    serde_json::from_str(strip_code_fence(raw))
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// HTML for a rewritten body. Plain text becomes one `<p>` per paragraph.
pub fn content_to_html(content: &str) -> String {
    let content = content.trim();
    if content.starts_with('<') {
        return content.to_string();
    }
    content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape_text(p)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn prompt_for(record: &ArticleRecord) -> String {
    format!("Título: {}\n\n{}", record.title(), record.plain_text())
}

/// Ask `api` for a rewrite of `record`. Returns `None` when the model fails
/// or keeps answering with something that is not the expected JSON.
#[instrument(level = "info", skip_all, fields(source_url = %record.source_url()))]
pub async fn rewrite_with<A>(api: &A, record: &ArticleRecord, max_tags: usize) -> Option<ArticleRecord>
where
    A: AskAsync<Response = String>,
{
    let prompt = prompt_for(record);
    let response = match api.ask(&prompt).await {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Rewrite request failed; keeping extracted text");
            return None;
        }
    };

    let mut parsed = parse_rewrite(&response);
    if let Err(ref e) = parsed {
        if looks_truncated(e) {
            warn!(error = %e, "EOF while parsing; re-asking once");
            match api.ask(&prompt).await {
                Ok(r2) => parsed = parse_rewrite(&r2),
                Err(e2) => warn!(error = %e2, "Re-ask failed"),
            }
        }
    }

    match parsed {
        Ok(rewritten) if !rewritten.content.trim().is_empty() => {
            let html = sanitize(&content_to_html(&rewritten.content));
            info!(title = %rewritten.title, "Article rewritten");
            Some(record.rewritten(&rewritten.title, html, max_tags))
        }
        Ok(_) => {
            warn!("Model returned an empty rewrite; keeping extracted text");
            None
        }
        Err(e) => {
            warn!(
                error = %e,
                response_preview = %truncate_for_log(&response, 300),
                "Model returned non-conforming JSON; keeping extracted text"
            );
            None
        }
    }
}

/// Rewrite `record` with the configured model, retrying transient failures.
#[instrument(level = "info", skip_all)]
pub async fn rewrite_with_backoff(
    config: &AwfulJadeConfig,
    template: &ChatTemplate,
    record: &ArticleRecord,
    max_tags: usize,
) -> Option<ArticleRecord> {
    let t0 = Instant::now();
    let client = AskFnWrapper { config, template };
    let api = RetryAsk::new(client, 5, StdDuration::from_secs(1));
    let res = rewrite_with(&api, record, max_tags).await;
    info!(
        elapsed_ms_total = t0.elapsed().as_millis() as u64,
        rewritten = res.is_some(),
        "rewrite_with_backoff finished"
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::models::ExtractedPage;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Answers from a script, one per call; `Err` entries simulate failures.
    #[derive(Debug)]
    struct Scripted {
        answers: RefCell<VecDeque<Result<String, String>>>,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<&str, &str>>) -> Self {
            Self {
                answers: RefCell::new(
                    answers
                        .into_iter()
                        .map(|a| a.map(String::from).map_err(String::from))
                        .collect(),
                ),
                calls: Cell::new(0),
            }
        }
    }

    impl AskAsync for Scripted {
        type Response = String;

        async fn ask(&self, _text: &str) -> Result<String, Box<dyn Error>> {
            self.calls.set(self.calls.get() + 1);
            match self.answers.borrow_mut().pop_front() {
                Some(Ok(answer)) => Ok(answer),
                Some(Err(e)) => Err(e.into()),
                None => Err("script exhausted".into()),
            }
        }
    }

    fn record() -> ArticleRecord {
        let page = ExtractedPage {
            title: "Chuva em Ubatuba".into(),
            content_html: "<p>Texto original sobre a chuva em Ubatuba.</p>".into(),
            lead_image_url: Some("https://site.com/chuva.jpg".into()),
            source_url: "https://site.com/noticia/chuva.html".into(),
        };
        ArticleRecord::from_page(
            page,
            "Texto original sobre a chuva em Ubatuba.",
            &ExtractorConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_retry_recovers_after_failures() {
        let inner = Scripted::new(vec![Err("boom"), Err("boom"), Ok("fine")]);
        let api = RetryAsk::new(inner, 5, StdDuration::ZERO);
        assert_eq!(api.ask("x").await.unwrap(), "fine");
        assert_eq!(api.inner.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let inner = Scripted::new(vec![Err("a"), Err("b"), Err("c")]);
        let api = RetryAsk::new(inner, 2, StdDuration::ZERO);
        assert!(api.ask("x").await.is_err());
        assert_eq!(api.inner.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_rewrite_reasks_once_on_truncated_json() {
        let api = Scripted::new(vec![
            Ok(r#"{"title": "Temporal", "content": "Texto"#),
            Ok("```json\n{\"title\": \"Temporal atinge Ubatuba\", \"content\": \"Primeiro.\\n\\nSegundo & fim.\"}\n```"),
        ]);
        let original = record();
        let rewritten = rewrite_with(&api, &original, 10).await.unwrap();
        assert_eq!(api.calls.get(), 2);
        assert_eq!(rewritten.title(), "Temporal atinge Ubatuba");
        assert_eq!(
            rewritten.content_html(),
            "<p>Primeiro.</p>\n<p>Segundo &amp; fim.</p>"
        );
        assert_eq!(rewritten.category_id(), original.category_id());
        assert!(rewritten.is_rewritten());
    }

    #[tokio::test]
    async fn test_rewrite_non_json_keeps_original() {
        let api = Scripted::new(vec![Ok("Desculpe, não posso ajudar.")]);
        assert!(rewrite_with(&api, &record(), 10).await.is_none());
        assert_eq!(api.calls.get(), 1);
    }

    #[test]
    fn test_content_to_html_passthrough() {
        assert_eq!(content_to_html(" <p>já é html</p> "), "<p>já é html</p>");
        assert_eq!(content_to_html("a < b"), "<p>a &lt; b</p>");
    }
}
