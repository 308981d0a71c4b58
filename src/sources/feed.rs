//! RSS 2.0, RSS 1.0 (RDF) and Atom parsing
//!
//! Only the `title` and `link` of each `<item>`/`<entry>` are read. Feed lists
//! use the same format: each item names one feed (title) and its URL (link).

use crate::index::Article;
use crate::{SourceError, SourceResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use url::Url;

/// One `<item>` or `<entry>` of a feed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
}

#[derive(Debug, Default)]
struct PendingItem {
    title: String,
    link: String,
}

impl PendingItem {
    fn append(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
        };
        target.push_str(text);
    }

    fn finish(self) -> Option<FeedItem> {
        let link = self.link.trim().to_string();
        if link.is_empty() {
            return None;
        }
        let title = self.title.trim();
        // Untitled items would otherwise all share the empty title
        let title = if title.is_empty() {
            link.clone()
        } else {
            title.to_string()
        };
        Some(FeedItem { title, link })
    }
}

/// Parses an RSS or Atom document into the items it lists
///
/// Items without a link are skipped. An item without a title is titled by its
/// link. Relative links are resolved against `base` when `base` is a URL.
///
/// A document fetched over HTTP may only link to HTTP(S) locations; any other
/// link (`file:`, a bare path) is dropped. Only a document that was itself
/// read from disk may point back at the local filesystem.
///
/// # Returns
///
/// * `Ok(items)` - Items in document order
/// * `Err(String)` - The XML is malformed or the root is not `rss`, `RDF` or `feed`
pub fn parse_items(xml: &str, base: &str) -> Result<Vec<FeedItem>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let remote = is_web_url(base);

    let mut items = Vec::new();
    let mut saw_root = false;
    let mut current: Option<PendingItem> = None;
    let mut field: Option<Field> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("malformed XML at byte {}: {}", reader.buffer_position(), e))?;

        match event {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"rss" | b"RDF" | b"feed" => saw_root = true,
                b"item" | b"entry" => current = Some(PendingItem::default()),
                b"title" if current.is_some() => field = Some(Field::Title),
                b"link" => {
                    if let Some(item) = current.as_mut() {
                        match link_href(e) {
                            Some(href) if item.link.is_empty() => item.link = href,
                            Some(_) => {}
                            None => field = Some(Field::Link),
                        }
                    }
                }
                _ => {}
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"rss" | b"RDF" | b"feed" => saw_root = true,
                b"link" => {
                    if let (Some(item), Some(href)) = (current.as_mut(), link_href(e)) {
                        if item.link.is_empty() {
                            item.link = href;
                        }
                    }
                }
                _ => {}
            },
            Event::Text(ref e) => {
                if let (Some(item), Some(field)) = (current.as_mut(), field) {
                    let text = e
                        .unescape()
                        .map(|text| text.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(e).into_owned());
                    item.append(field, &text);
                }
            }
            Event::CData(ref e) => {
                if let (Some(item), Some(field)) = (current.as_mut(), field) {
                    item.append(field, &String::from_utf8_lossy(e));
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"item" | b"entry" => {
                    field = None;
                    if let Some(item) = current.take().and_then(PendingItem::finish) {
                        let link = resolve_link(base, &item.link);
                        if remote && !is_web_url(&link) {
                            tracing::warn!("{} links to non-web location {}; skipping", base, link);
                        } else {
                            items.push(FeedItem {
                                link,
                                title: item.title,
                            });
                        }
                    }
                }
                b"title" | b"link" => field = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err("not an RSS or Atom document".to_string());
    }
    Ok(items)
}

/// Returns the `href` of an Atom `<link>` that points at the entry itself
fn link_href(element: &BytesStart) -> Option<String> {
    let mut href = None;
    let mut alternate = true;
    for attr in element.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"href" => href = attr.unescape_value().ok().map(|value| value.into_owned()),
            b"rel" => {
                alternate = attr
                    .unescape_value()
                    .map(|value| value == "alternate")
                    .unwrap_or(false)
            }
            _ => {}
        }
    }
    if alternate {
        href
    } else {
        None
    }
}

/// True for absolute `http://` and `https://` URLs
fn is_web_url(location: &str) -> bool {
    Url::parse(location)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn resolve_link(base: &str, link: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(link))
        .map(String::from)
        .unwrap_or_else(|_| link.to_string())
}

/// Parses a feed document into its articles, in document order
///
/// # Arguments
///
/// * `xml` - The feed document
/// * `url` - Where the feed came from; used for errors and relative links
pub fn parse_feed(xml: &str, url: &str) -> SourceResult<Vec<Article>> {
    let items = parse_items(xml, url).map_err(|reason| SourceError::FeedUnparseable {
        url: url.to_string(),
        reason,
    })?;
    Ok(items
        .into_iter()
        .map(|item| Article::new(item.title, item.link))
        .collect())
}

/// Parses a feed list document into `(feed name, feed URL)` pairs
///
/// Every item is kept, in document order, even when two feeds share a display
/// name. Repeated URLs are left for the crawler to skip.
pub fn parse_feed_list(xml: &str, uri: &str) -> SourceResult<Vec<(String, String)>> {
    let items = parse_items(xml, uri).map_err(|reason| SourceError::FeedListUnparseable {
        uri: uri.to_string(),
        reason,
    })?;
    Ok(items.into_iter().map(|item| (item.title, item.link)).collect())
}
