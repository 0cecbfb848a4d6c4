//! Candidate links from RSS 2.0, RDF and Atom feeds.
//!
//! The feed is walked with a streaming reader so both vocabularies can be
//! handled in one pass: `<item>`/`<entry>` delimit entries, `<link>` carries
//! the URL either as text (RSS) or as an `href` attribute (Atom), and
//! `<guid>`/`<id>` stand in when an entry has no usable link.

use crate::error::ExtractError;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::debug;
use url::Url;

#[derive(Debug, Default)]
struct Entry {
    link: Option<String>,
    guid: Option<String>,
}

impl Entry {
    fn candidate(self) -> Option<Url> {
        let link = self.link.and_then(|l| parse_http(&l));
        link.or_else(|| self.guid.and_then(|g| parse_http(&g)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Link,
    Guid,
}

fn parse_http(raw: &str) -> Option<Url> {
    Url::parse(raw.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

fn local_name(e: &BytesStart) -> String {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    name.rsplit(':').next().unwrap_or(&name).to_string()
}

fn get_attribute(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref());
        if key == name {
            return Some(String::from_utf8_lossy(&attr.value).replace("&amp;", "&"));
        }
    }
    None
}

/// Atom links carry the URL in `href`; only alternate links point at the
/// article itself.
fn atom_href(e: &BytesStart) -> Option<String> {
    let rel = get_attribute(e, "rel");
    match rel.as_deref() {
        None | Some("alternate") => get_attribute(e, "href"),
        _ => None,
    }
}

fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        return value.and_then(char::from_u32).map(String::from);
    }
    resolve_predefined_entity(name).map(String::from)
}

/// Extract one candidate link per feed entry, in document order.
pub fn feed_links(xml: &str) -> Result<Vec<Url>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut links = Vec::new();
    let mut entry: Option<Entry> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e).as_str() {
                "item" | "entry" => entry = Some(Entry::default()),
                "link" if entry.is_some() => {
                    if let (Some(current), Some(href)) = (entry.as_mut(), atom_href(e)) {
                        current.link.get_or_insert(href);
                    }
                    field = Some(Field::Link);
                    text.clear();
                }
                "guid" | "id" if entry.is_some() => {
                    field = Some(Field::Guid);
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if local_name(e) == "link" {
                    if let (Some(current), Some(href)) = (entry.as_mut(), atom_href(e)) {
                        current.link.get_or_insert(href);
                    }
                }
            }
            Ok(Event::Text(ref e)) if field.is_some() => {
                text.push_str(&e.decode().unwrap_or_default());
            }
            Ok(Event::CData(ref e)) if field.is_some() => {
                text.push_str(&e.decode().unwrap_or_default());
            }
            Ok(Event::GeneralRef(ref e)) if field.is_some() => {
                let name = e.decode().map(|s| s.into_owned()).unwrap_or_default();
                match resolve_reference(&name) {
                    Some(resolved) => text.push_str(&resolved),
                    None => {
                        text.push('&');
                        text.push_str(&name);
                        text.push(';');
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.rsplit(':').next().unwrap_or(&name);
                match (local, field, entry.as_mut()) {
                    ("link", Some(Field::Link), Some(current)) => {
                        if !text.trim().is_empty() {
                            current.link.get_or_insert(text.trim().to_string());
                        }
                        field = None;
                    }
                    ("guid" | "id", Some(Field::Guid), Some(current)) => {
                        if !text.trim().is_empty() {
                            current.guid.get_or_insert(text.trim().to_string());
                        }
                        field = None;
                    }
                    ("item" | "entry", _, _) => {
                        if let Some(url) = entry.take().and_then(Entry::candidate) {
                            links.push(url);
                        }
                        field = None;
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(source) => {
                return Err(ExtractError::Feed {
                    position: reader.error_position() as u64,
                    source,
                });
            }
            _ => {}
        }
    }

    debug!(count = links.len(), "Parsed feed entries");
    Ok(links)
}
