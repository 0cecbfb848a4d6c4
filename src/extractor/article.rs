//! The article primitive: one URL in, title + cleaned body + lead image out.
//!
//! Used directly for article links and for every candidate produced by the
//! feed and homepage strategies.

use super::ArticleExtractor;
use super::readability::{extract_fallback, extract_readable};
use super::sanitize::{plain_text, sanitize, text_len};
use crate::error::ExtractError;
use crate::models::ExtractedPage;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

/// Meta tags holding the lead image, in priority order.
static IMAGE_META: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"meta[property="og:image"]"#,
        r#"meta[property="og:image:url"]"#,
        r#"meta[name="og:image"]"#,
        r#"meta[name="twitter:image"]"#,
        r#"meta[property="twitter:image"]"#,
        r#"meta[name="twitter:image:src"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

/// Open Graph image first, then Twitter Card. Relative URLs are resolved
/// against the page.
pub fn lead_image(doc: &Html, page_url: &Url) -> Option<String> {
    IMAGE_META
        .iter()
        .flat_map(|sel| doc.select(sel))
        .filter_map(|m| m.value().attr("content"))
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(|c| {
            page_url
                .join(c)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| c.to_string())
        })
}

/// Extract an article from an already fetched page.
///
/// The readability block is used unless its cleaned text is shorter than
/// `escalation_chars`, in which case the best generic block of the whole
/// document replaces it.
pub fn parse_page(html: &str, page_url: &Url, escalation_chars: usize) -> ExtractedPage {
    let doc = Html::parse_document(html);
    let readable = extract_readable(&doc);
    let mut content_html = sanitize(&readable.content_html);

    let readable_len = text_len(&plain_text(&content_html));
    if readable_len < escalation_chars {
        if let Some(block) = extract_fallback(&doc) {
            let escalated = sanitize(&block);
            debug!(
                readable_len,
                escalated_len = text_len(&plain_text(&escalated)),
                "Readability result too short; using generic block scan"
            );
            content_html = escalated;
        }
    }

    ExtractedPage {
        title: readable.title.trim().to_string(),
        content_html,
        lead_image_url: lead_image(&doc, page_url),
        source_url: page_url.to_string(),
    }
}

impl ArticleExtractor {
    fn is_redirector(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|host| {
            self.config
                .redirector_hosts
                .iter()
                .any(|r| host.eq_ignore_ascii_case(r))
        })
    }

    /// Fetch and extract one page. The returned page may be arbitrarily
    /// short; the acceptance gate belongs to the caller.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn extract_page(&self, url: &Url) -> Result<ExtractedPage, ExtractError> {
        let target = if self.is_redirector(url) {
            let resolved = self.fetcher.resolve_redirects(url).await?;
            info!(%resolved, "Resolved redirector link");
            resolved
        } else {
            url.clone()
        };

        let (final_url, body) = self.fetcher.get_text(&target).await?;
        Ok(parse_page(&body, &final_url, self.config.escalation_chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://site.com/noticia/1.html").unwrap()
    }

    #[test]
    fn test_og_image_has_priority() {
        let html = r#"<html><head>
            <meta name="twitter:image" content="https://cdn.site.com/tw.jpg">
            <meta property="og:image" content="https://cdn.site.com/og.jpg">
        </head></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(
            lead_image(&doc, &page_url()).as_deref(),
            Some("https://cdn.site.com/og.jpg")
        );
    }

    #[test]
    fn test_twitter_image_and_relative_url() {
        let html = r#"<html><head><meta name="twitter:image" content="/img/tw.jpg"></head></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(
            lead_image(&doc, &page_url()).as_deref(),
            Some("https://site.com/img/tw.jpg")
        );
        let none = Html::parse_document("<html><head></head></html>");
        assert_eq!(lead_image(&none, &page_url()), None);
    }

    #[test]
    fn test_parse_page_readability() {
        let para = "Moradores relatam alagamentos em vários bairros, segundo a Defesa Civil. ";
        let html = format!(
            r#"<html><head><title>Alagamentos</title></head><body>
            <nav>menu</nav>
            <article><h1>Alagamentos</h1><p>{}</p><script>track()</script>
            <p>Leia também: outra coisa</p></article>
            </body></html>"#,
            para.repeat(6)
        );
        let page = parse_page(&html, &page_url(), 300);
        assert_eq!(page.title, "Alagamentos");
        assert!(page.content_html.starts_with("<article>"));
        assert!(!page.content_html.contains("track()"));
        assert!(!page.content_html.contains("outra coisa"));
        assert_eq!(page.source_url, "https://site.com/noticia/1.html");
    }

    #[test]
    fn test_parse_page_escalates_when_short() {
        let para = "Texto longo de uma matéria sem marcação semântica alguma. ";
        let html = format!(
            r#"<html><head><title>T</title></head><body>
            <article><p>Curto.</p></article>
            <div class="x"><p>{}</p><p>{}</p></div>
            </body></html>"#,
            para.repeat(4),
            para.repeat(4)
        );
        let page = parse_page(&html, &page_url(), 300);
        assert!(page.content_html.starts_with(r#"<div class="x">"#));
        assert!(text_len(&plain_text(&page.content_html)) > 300);
    }
}
