//! HTML cleanup applied to every extracted content block.
//!
//! [`sanitize`] removes non-content elements and the "leia também" style
//! link boxes news sites sprinkle through their articles. It is a fixed
//! point: running it on its own output returns the same string.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static STRIP_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script, style, nav, aside, footer, form").unwrap());

// Small blocks that usually hold a "read also" teaser. Containers are left
// alone so a wrapper that happens to start with a teaser is not dropped whole.
static TEASER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p, li, h2, h3, h4, h5, h6, strong, b, em, span, a").unwrap()
});

static TEASER_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(leia|veja|saiba)\s+(tamb[eé]m|mais)\b").unwrap()
});

static BOILERPLATE_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(leia|veja|saiba)\s+(tamb[eé]m|mais)\b\s*:?").unwrap()
});

static EXCESS_BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t\r]*\n(?:[ \t\r]*\n)+").unwrap());

/// Strip non-content tags and boilerplate phrases from an HTML fragment.
pub fn sanitize(html: &str) -> String {
    let mut fragment = Html::parse_fragment(html);

    let mut doomed: Vec<_> = fragment.select(&STRIP_SELECTOR).map(|el| el.id()).collect();
    doomed.extend(
        fragment
            .select(&TEASER_SELECTOR)
            .filter(|el| TEASER_START.is_match(&el.text().collect::<String>()))
            .map(|el| el.id()),
    );
    for id in doomed {
        if let Some(mut node) = fragment.tree.get_mut(id) {
            node.detach();
        }
    }

    let mut out = fragment.root_element().inner_html();
    while BOILERPLATE_PHRASE.is_match(&out) {
        out = BOILERPLATE_PHRASE.replace_all(&out, "").into_owned();
    }
    EXCESS_BLANK_LINES
        .replace_all(&out, "\n\n")
        .trim()
        .to_string()
}

/// Tag-stripped text of an HTML fragment with whitespace collapsed.
pub fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let joined = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Length of the plain text in characters, the unit every threshold uses.
pub fn text_len(plain: &str) -> usize {
    plain.chars().count()
}
