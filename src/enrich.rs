//! Derived fields of an [`ArticleRecord`](crate::models::ArticleRecord):
//! category by city mention, keyword tags and the meta description.

use crate::config::CityCategory;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Maximum length of a meta description, ellipsis included.
pub const META_DESCRIPTION_CHARS: usize = 160;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9a-zà-öø-ÿ]+").unwrap());

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // pt
        "aos", "aquela", "aquele", "aqui", "as", "até", "com", "como", "contra", "da", "das",
        "de", "dela", "dele", "deles", "depois", "do", "dos", "ela", "elas", "ele", "eles",
        "em", "entre", "era", "essa", "esse", "esta", "está", "estão", "este", "foi", "foram",
        "há", "isso", "isto", "já", "lhe", "mais", "mas", "mesmo", "muito", "na", "nas", "não",
        "nem", "no", "nos", "nós", "num", "numa", "onde", "ou", "para", "pela", "pelas", "pelo",
        "pelos", "por", "porque", "quando", "que", "quem", "são", "se", "sem", "ser", "será",
        "seu", "seus", "sua", "suas", "sobre", "também", "tem", "têm", "ter", "uma", "umas",
        "uns", "vai", "você",
        // en
        "and", "are", "but", "for", "from", "has", "have", "her", "his", "its", "not", "that",
        "the", "their", "they", "this", "was", "were", "will", "with", "you",
    ]
    .into_iter()
    .collect()
});

/// Category of the first table city mentioned in `text`, case-insensitively.
pub fn guess_category(text: &str, cities: &[CityCategory], default_id: i64) -> i64 {
    let haystack = text.to_lowercase();
    cities
        .iter()
        .find(|c| haystack.contains(&c.name.to_lowercase()))
        .map(|c| c.category_id)
        .unwrap_or(default_id)
}

/// Up to `max` lowercase keywords of title and body, most frequent first.
/// Equal counts keep the order in which the words first appear.
pub fn extract_tags(title: &str, body: &str, max: usize) -> Vec<String> {
    let text = format!("{title} {body}").to_lowercase();

    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in WORD.find_iter(&text).map(|m| m.as_str()) {
        if word.chars().count() < 3
            || word.chars().all(|c| c.is_ascii_digit())
            || STOP_WORDS.contains(word)
        {
            continue;
        }
        let count = counts.entry(word).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    order
        .into_iter()
        .sorted_by(|a, b| counts[b].cmp(&counts[a]))
        .take(max)
        .map(str::to_string)
        .collect()
}

/// Plain text cut to [`META_DESCRIPTION_CHARS`], ending in `...` when cut.
pub fn meta_description(plain: &str) -> String {
    if plain.chars().count() <= META_DESCRIPTION_CHARS {
        return plain.to_string();
    }
    let head: String = plain.chars().take(META_DESCRIPTION_CHARS - 3).collect();
    format!("{head}...")
}
