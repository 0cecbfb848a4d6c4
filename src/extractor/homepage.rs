//! Article link discovery on a news homepage.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

static YEAR_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(19|20)\d{2}/").unwrap());

/// Path fragments of pages that are never articles.
const DENY: &[&str] = &[
    "/login",
    "/wp-login",
    "/wp-admin",
    "/entrar",
    "/cadastro",
    "/assine",
    "/tag/",
    "/tags/",
    "/author/",
    "/autor/",
    "/video",
    "/play/",
    "/player",
    "/tv/",
    "/ao-vivo",
    "/category/",
    "/categoria/",
    "/editoria/",
    "/page/",
    "/pagina/",
    "/search",
    "/busca",
    "/feed",
    "/rss",
    "/contato",
    "/sobre",
    "/expediente",
    "/anuncie",
    "/politica-de-privacidade",
];

/// Path fragments typical of article URLs.
const ALLOW: &[&str] = &[
    "/noticia",
    "/news/",
    "/materia",
    "/artigo",
    "/post/",
    "/blog/",
];

fn same_site(a: &Url, b: &Url) -> bool {
    let strip = |u: &Url| {
        u.host_str()
            .map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
    };
    strip(a).is_some() && strip(a) == strip(b)
}

fn looks_like_article(path: &str) -> bool {
    let path = path.to_ascii_lowercase();
    if DENY.iter().any(|d| path.contains(d)) {
        return false;
    }
    ALLOW.iter().any(|a| path.contains(a))
        || YEAR_SEGMENT.is_match(&path)
        || path.ends_with(".html")
        || path.ends_with(".htm")
}

/// Same-site article links of a homepage, in discovery order, deduplicated
/// and capped at `max`.
pub fn article_links(html: &str, page_url: &Url, max: usize) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let links: Vec<Url> = doc
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| {
            !href.is_empty()
                && !href.starts_with('#')
                && !href.starts_with("javascript:")
                && !href.starts_with("mailto:")
        })
        .filter_map(|href| page_url.join(href).ok())
        .map(|mut u| {
            u.set_fragment(None);
            u
        })
        .filter(|u| same_site(u, page_url))
        .filter(|u| u.path() != page_url.path() || u.query() != page_url.query())
        .filter(|u| looks_like_article(u.path()))
        .unique()
        .take(max)
        .collect();
    debug!(count = links.len(), "Discovered homepage article links");
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> Url {
        Url::parse("https://www.site.com/").unwrap()
    }

    #[test]
    fn test_allow_and_deny() {
        assert!(looks_like_article("/noticia/123.html"));
        assert!(looks_like_article("/2024/05/03/enchente"));
        assert!(looks_like_article("/cidade/enchente.html"));
        assert!(!looks_like_article("/tag/enchente.html"));
        assert!(!looks_like_article("/author/joao/2024/"));
        assert!(!looks_like_article("/videos/noticia-1"));
        assert!(!looks_like_article("/sobre"));
        assert!(!looks_like_article("/cidade/enchente"));
    }

    #[test]
    fn test_filters_keep_discovery_order() {
        let html = r##"<html><body>
            <a href="#topo">Topo</a>
            <a href="/login">Entrar</a>
            <a href="https://other.com/noticia/1.html">Fora</a>
            <a href="/noticia/primeira.html">Primeira</a>
            <a href="https://site.com/2024/05/segunda#comentarios">Segunda</a>
            <a href="/noticia/primeira.html">Duplicada</a>
            <a href="javascript:void(0)">JS</a>
            <a href="/">Home</a>
        </body></html>"##;
        let links = article_links(html, &home(), 30);
        let links: Vec<_> = links.iter().map(Url::as_str).collect();
        assert_eq!(
            links,
            vec![
                "https://www.site.com/noticia/primeira.html",
                "https://site.com/2024/05/segunda",
            ]
        );
    }

    #[test]
    fn test_cap() {
        let html: String = (0..50)
            .map(|i| format!(r#"<a href="/noticia/{i}.html">n</a>"#))
            .collect();
        let links = article_links(&html, &home(), 30);
        assert_eq!(links.len(), 30);
        assert_eq!(links[0].path(), "/noticia/0.html");
        assert_eq!(links[29].path(), "/noticia/29.html");
    }
}
