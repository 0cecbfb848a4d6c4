//! Data models for extracted articles.
//!
//! - [`SourceKind`]: how an input URL is treated (feed, homepage or article)
//! - [`ExtractedPage`]: raw output of the article primitive
//! - [`ArticleRecord`]: the enriched, immutable result of an extraction

use crate::config::ExtractorConfig;
use crate::enrich::{extract_tags, guess_category, meta_description};
use crate::extractor::sanitize::plain_text;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Classification of a source URL, decided from the URL string alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Rss,
    Homepage,
    Article,
}

const FEED_EXTENSIONS: &[&str] = &[".xml", ".rss", ".atom", ".rdf"];
const FEED_SEGMENTS: &[&str] = &["feed", "rss", "atom", "rss2"];

impl SourceKind {
    pub fn classify(url: &Url) -> Self {
        let path = url.path().to_ascii_lowercase();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let feed_query = url.query_pairs().any(|(k, v)| {
            let k = k.to_ascii_lowercase();
            let v = v.to_ascii_lowercase();
            k == "feed" || ((k == "rss" || k == "format") && (v.contains("rss") || v.contains("atom")))
        });
        if FEED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
            || segments.iter().any(|s| FEED_SEGMENTS.contains(s))
            || feed_query
        {
            return SourceKind::Rss;
        }

        match segments.as_slice() {
            [] => SourceKind::Homepage,
            [only] if !only.contains('.') => SourceKind::Homepage,
            _ => SourceKind::Article,
        }
    }
}

/// What the article primitive found on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub title: String,
    /// Already sanitized.
    pub content_html: String,
    pub lead_image_url: Option<String>,
    /// Final URL after redirects.
    pub source_url: String,
}

/// A successfully extracted article.
///
/// Built once from an [`ExtractedPage`] and never modified; the rewriter
/// produces a new record instead of editing this one.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArticleRecord {
    title: String,
    content_html: String,
    lead_image_url: Option<String>,
    source_url: String,
    category_id: i64,
    tags: Vec<String>,
    meta_description: String,
    generated_at: DateTime<Utc>,
    #[serde(default)]
    rewritten: bool,
}

impl ArticleRecord {
    /// Enrich an extracted page. `plain` must be the plain text of
    /// `page.content_html`.
    pub fn from_page(page: ExtractedPage, plain: &str, config: &ExtractorConfig) -> Self {
        let title = page.title.trim().to_string();
        let category_id = guess_category(
            &format!("{title} {plain}"),
            &config.cities,
            config.default_category_id,
        );
        Self {
            tags: extract_tags(&title, plain, config.max_tags),
            meta_description: meta_description(plain),
            title,
            content_html: page.content_html,
            lead_image_url: page.lead_image_url,
            source_url: page.source_url,
            category_id,
            generated_at: Utc::now(),
            rewritten: false,
        }
    }

    /// A copy carrying a rewritten title and body. Category, image and
    /// source stay with the original; text-derived fields are recomputed.
    pub fn rewritten(&self, title: &str, content_html: String, max_tags: usize) -> Self {
        let plain = plain_text(&content_html);
        let title = title.trim().to_string();
        Self {
            tags: extract_tags(&title, &plain, max_tags),
            meta_description: meta_description(&plain),
            title,
            content_html,
            lead_image_url: self.lead_image_url.clone(),
            source_url: self.source_url.clone(),
            category_id: self.category_id,
            generated_at: Utc::now(),
            rewritten: true,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content_html(&self) -> &str {
        &self.content_html
    }

    /// Tag-stripped body, recomputed from `content_html` on every call.
    pub fn plain_text(&self) -> String {
        plain_text(&self.content_html)
    }

    pub fn lead_image_url(&self) -> Option<&str> {
        self.lead_image_url.as_deref()
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn category_id(&self) -> i64 {
        self.category_id
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn meta_description(&self) -> &str {
        &self.meta_description
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn is_rewritten(&self) -> bool {
        self.rewritten
    }
}
