//! Main-content detection.
//!
//! Both passes are expressed the same way: a pure score per block and a
//! max reduction in which the first block seen wins a tie.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static READABILITY_CANDIDATES: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div, section, main, article, td").unwrap());
static FALLBACK_CANDIDATES: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div, main, section").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1, h2").unwrap());

static POSITIVE_HINTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)article|body|content|entry|main|materia|noticia|post|story|text").unwrap()
});
static NEGATIVE_HINTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)ad-|advert|banner|comment|footer|header|menu|related|share|sidebar|social|sponsor|widget").unwrap()
});

/// Paragraphs shorter than this do not count towards a readability score.
const MIN_PARAGRAPH_CHARS: usize = 25;

/// Result of the readability pass, before sanitization.
#[derive(Debug, Clone, PartialEq)]
pub struct Readable {
    pub title: String,
    pub content_html: String,
}

/// Pick the highest scoring item; on equal scores the earliest item wins.
pub fn best_scoring<T, F>(items: impl IntoIterator<Item = T>, score: F) -> Option<T>
where
    F: Fn(&T) -> i64,
{
    items
        .into_iter()
        .map(|item| {
            let s = score(&item);
            (item, s)
        })
        .reduce(|best, next| if next.1 > best.1 { next } else { best })
        .map(|(item, _)| item)
}

fn text_chars(el: &ElementRef) -> usize {
    el.text().map(|t| t.trim().chars().count()).sum()
}

fn class_weight(el: &ElementRef) -> i64 {
    let attrs = format!(
        "{} {}",
        el.value().attr("class").unwrap_or(""),
        el.value().attr("id").unwrap_or("")
    );
    let mut weight = 0;
    if POSITIVE_HINTS.is_match(&attrs) {
        weight += 25;
    }
    if NEGATIVE_HINTS.is_match(&attrs) {
        weight -= 25;
    }
    weight
}

/// Readability score: direct child paragraphs with real text, weighted by
/// their length and comma count, plus a class/id hint bonus.
pub fn readability_score(block: &ElementRef) -> i64 {
    let paragraphs: i64 = block
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "p")
        .map(|p| {
            let text = p.text().collect::<String>();
            let len = text.trim().chars().count();
            if len < MIN_PARAGRAPH_CHARS {
                return 0;
            }
            let commas = text.matches(',').count() as i64;
            1 + commas + (len / 100).min(3) as i64
        })
        .sum();
    paragraphs + class_weight(block)
}

/// Generic fallback score: `10 × paragraph_count + total_text_length`.
pub fn fallback_score(block: &ElementRef) -> i64 {
    let paragraphs = block.select(&PARAGRAPH).count() as i64;
    10 * paragraphs + text_chars(block) as i64
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|t| !t.is_empty())
}

fn heading_of(el: ElementRef) -> Option<String> {
    el.select(&HEADING)
        .map(|h| h.text().collect::<String>().trim().to_string())
        .find(|t| !t.is_empty())
}

/// Readability pass: an `<article>` element is taken as is, otherwise the
/// best scoring container, otherwise `<body>`.
pub fn extract_readable(doc: &Html) -> Readable {
    let article = doc.select(&ARTICLE).next();

    let block = article
        .or_else(|| best_scoring(doc.select(&READABILITY_CANDIDATES), readability_score))
        .or_else(|| doc.select(&BODY).next());

    let mut title = first_text(doc, &TITLE)
        .or_else(|| {
            doc.select(&OG_TITLE)
                .filter_map(|m| m.value().attr("content"))
                .map(|c| c.trim().to_string())
                .find(|t| !t.is_empty())
        })
        .unwrap_or_default();
    if title.is_empty() {
        title = match article {
            Some(article) => heading_of(article),
            None => first_text(doc, &HEADING),
        }
        .unwrap_or_default();
    }

    Readable {
        title,
        content_html: block.map(|b| b.html()).unwrap_or_default(),
    }
}

/// Generic block scan over the whole document.
pub fn extract_fallback(doc: &Html) -> Option<String> {
    best_scoring(doc.select(&FALLBACK_CANDIDATES), fallback_score).map(|b| b.html())
}
