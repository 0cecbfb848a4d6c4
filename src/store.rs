//! Single-slot holder for the most recent article.
//!
//! The scheduler owns a [`LatestArticle`] and replaces its content after each
//! successful extraction; readers only ever see the last write. No history
//! is kept.

use crate::models::ArticleRecord;
use tracing::debug;

#[derive(Debug, Default)]
pub struct LatestArticle {
    slot: Option<ArticleRecord>,
}

impl LatestArticle {
    /// Start from a previously persisted snapshot, if any.
    pub fn with(record: Option<ArticleRecord>) -> Self {
        Self { slot: record }
    }

    /// Store `record`, returning the one it replaced.
    pub fn replace(&mut self, record: ArticleRecord) -> Option<ArticleRecord> {
        debug!(source_url = %record.source_url(), "Replacing latest article");
        self.slot.replace(record)
    }

    pub fn latest(&self) -> Option<&ArticleRecord> {
        self.slot.as_ref()
    }

    /// True when `record` points at the same page as the stored one.
    pub fn is_same_source(&self, record: &ArticleRecord) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|current| current.source_url() == record.source_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::models::ExtractedPage;

    fn record(url: &str) -> ArticleRecord {
        let page = ExtractedPage {
            title: url.into(),
            content_html: "<p>texto</p>".into(),
            lead_image_url: None,
            source_url: url.into(),
        };
        ArticleRecord::from_page(page, "texto", &ExtractorConfig::default())
    }

    #[test]
    fn test_empty_by_default() {
        assert!(LatestArticle::default().latest().is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let mut store = LatestArticle::default();
        assert!(store.replace(record("https://a.com/1")).is_none());
        let previous = store.replace(record("https://a.com/2")).unwrap();
        assert_eq!(previous.source_url(), "https://a.com/1");
        assert_eq!(store.latest().unwrap().source_url(), "https://a.com/2");
    }

    #[test]
    fn test_is_same_source() {
        let store = LatestArticle::with(Some(record("https://a.com/1")));
        assert!(store.is_same_source(&record("https://a.com/1")));
        assert!(!store.is_same_source(&record("https://a.com/2")));
    }
}
