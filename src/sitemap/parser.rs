//! Sitemap XML parsing
//!
//! Both document kinds are read with a streaming `quick_xml` reader. The
//! root element decides the kind; anything else is rejected.

use crate::sitemap::SitemapUrl;
use quick_xml::events::Event;
use quick_xml::Reader;

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: locations of child sitemaps, in document order
    Index(Vec<String>),
    /// `<urlset>`: page entries, in document order
    UrlSet(Vec<SitemapUrl>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    UrlSet,
    Index,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Loc,
    LastModified,
    ChangeFrequency,
    Priority,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"loc" => Some(Self::Loc),
            b"lastmod" => Some(Self::LastModified),
            b"changefreq" => Some(Self::ChangeFrequency),
            b"priority" => Some(Self::Priority),
            _ => None,
        }
    }

    fn assign(self, entry: &mut SitemapUrl, value: &str) {
        let value = value.trim().to_string();
        match self {
            Self::Loc => entry.loc = value,
            Self::LastModified => entry.last_modified = value,
            Self::ChangeFrequency => entry.change_frequency = value,
            Self::Priority => entry.priority = value,
        }
    }
}

/// Parses a sitemap document
///
/// Returns a human-readable message when the bytes are not well-formed XML
/// or the root element is neither `<urlset>` nor `<sitemapindex>`.
pub fn parse_document(bytes: &[u8]) -> Result<SitemapDocument, String> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut root: Option<Root> = None;
    let mut depth = 0usize;
    let mut current: Option<SitemapUrl> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();
    let mut entries = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = e.local_name();
                match depth {
                    1 => root = Some(root_kind(name.as_ref())?),
                    2 => {
                        let expected: &[u8] = match root {
                            Some(Root::UrlSet) => b"url",
                            _ => b"sitemap",
                        };
                        if name.as_ref() == expected {
                            current = Some(SitemapUrl::default());
                        }
                    }
                    3 if current.is_some() => {
                        field = Field::from_tag(name.as_ref());
                        text.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if depth == 0 {
                    root = Some(root_kind(e.local_name().as_ref())?);
                }
            }
            Ok(Event::Text(e)) => {
                if field.is_some() {
                    let unescaped = e.unescape().map_err(|e| e.to_string())?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(e)) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                match depth {
                    3 => {
                        if let (Some(entry), Some(f)) = (current.as_mut(), field.take()) {
                            f.assign(entry, &text);
                        }
                    }
                    2 => {
                        if let Some(entry) = current.take() {
                            entries.push(entry);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "malformed XML at byte {}: {}",
                    reader.error_position(),
                    e
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err("unexpected end of document".to_string());
    }

    match root {
        Some(Root::UrlSet) => Ok(SitemapDocument::UrlSet(entries)),
        Some(Root::Index) => Ok(SitemapDocument::Index(
            entries
                .into_iter()
                .map(|e| e.loc)
                .filter(|loc| !loc.is_empty())
                .collect(),
        )),
        None => Err("document has no root element".to_string()),
    }
}

fn root_kind(name: &[u8]) -> Result<Root, String> {
    match name {
        b"urlset" => Ok(Root::UrlSet),
        b"sitemapindex" => Ok(Root::Index),
        other => Err(format!(
            "expected <urlset> or <sitemapindex>, found <{}>",
            String::from_utf8_lossy(other)
        )),
    }
}
