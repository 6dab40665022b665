//! Streaming reader for MediaWiki XML dumps.
//!
//! [`DumpReader`] cuts `<siteinfo>` and `<page>` elements out of the stream and
//! reports them to a [`DumpVisitor`]. Filters are visitors wrapping visitors.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::io::{self, BufRead, Read};

lazy_static! {
    static ref TITLE_PATTERN: Regex = Regex::new(r"<title>([^<]*)</title>").unwrap();
    static ref NS_PATTERN: Regex = Regex::new(r"<ns>(-?\d+)</ns>").unwrap();
    static ref ID_PATTERN: Regex = Regex::new(r"<id>(\d+)</id>").unwrap();
    static ref REDIRECT_PATTERN: Regex = Regex::new(r#"<redirect\s+title="([^"]*)""#).unwrap();
    static ref REVISION_PATTERN: Regex = Regex::new(r"(?s)<revision>(.*?)</revision>").unwrap();
    static ref TIMESTAMP_PATTERN: Regex = Regex::new(r"<timestamp>([^<]*)</timestamp>").unwrap();
    static ref TEXT_PATTERN: Regex = Regex::new(r"(?s)<text[^>]*?(?:/>|>(.*?)</text>)").unwrap();
    static ref SITENAME_PATTERN: Regex = Regex::new(r"<sitename>([^<]*)</sitename>").unwrap();
    static ref BASE_PATTERN: Regex = Regex::new(r"<base>([^<]*)</base>").unwrap();
    static ref NAMESPACE_PATTERN: Regex =
        Regex::new(r#"<namespace\s+key="(-?\d+)"[^>]*?(?:/>|>([^<]*)</namespace>)"#).unwrap();
}

const CHUNK_SIZE: usize = 1024 * 1024;
const MAIN_NAMESPACE: i32 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteInfo {
    pub sitename: String,
    pub base: String,
    /// Namespace key to local name; the main namespace has an empty name.
    pub namespaces: BTreeMap<i32, String>,
}

impl SiteInfo {
    /// Namespace of a title from its prefix, for dumps without `<ns>`.
    pub fn namespace_of(&self, title: &str) -> i32 {
        title
            .split_once(':')
            .and_then(|(prefix, _)| {
                self.namespaces
                    .iter()
                    .find(|(_, name)| !name.is_empty() && name.as_str() == prefix)
                    .map(|(key, _)| *key)
            })
            .unwrap_or(MAIN_NAMESPACE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub namespace: i32,
    pub id: Option<u64>,
    pub redirect: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub id: Option<u64>,
    pub timestamp: Option<String>,
    pub text: String,
}

/// Receives the contents of a dump in document order:
/// `start_wiki`, `site_info`, then `start_page`, `revision`*, `end_page` for
/// every page, then `end_wiki` and `close`.
pub trait DumpVisitor {
    fn start_wiki(&mut self) {}
    fn site_info(&mut self, _info: &SiteInfo) {}
    fn start_page(&mut self, _page: &Page) {}
    fn revision(&mut self, _revision: &Revision) {}
    fn end_page(&mut self) {}
    fn end_wiki(&mut self) {}
    fn close(&mut self) {}
}

impl<V: DumpVisitor + ?Sized> DumpVisitor for &mut V {
    fn start_wiki(&mut self) {
        (**self).start_wiki()
    }
    fn site_info(&mut self, info: &SiteInfo) {
        (**self).site_info(info)
    }
    fn start_page(&mut self, page: &Page) {
        (**self).start_page(page)
    }
    fn revision(&mut self, revision: &Revision) {
        (**self).revision(revision)
    }
    fn end_page(&mut self) {
        (**self).end_page()
    }
    fn end_wiki(&mut self) {
        (**self).end_wiki()
    }
    fn close(&mut self) {
        (**self).close()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Filters
// ─────────────────────────────────────────────────────────────────────────────

/// Passes on only pages from the given namespaces.
pub struct NamespaceFilter<V> {
    inner: V,
    namespaces: HashSet<i32>,
    in_page: bool,
}

impl<V: DumpVisitor> NamespaceFilter<V> {
    pub fn new(inner: V, namespaces: impl IntoIterator<Item = i32>) -> Self {
        NamespaceFilter {
            inner,
            namespaces: namespaces.into_iter().collect(),
            in_page: false,
        }
    }

    /// Articles only.
    pub fn main(inner: V) -> Self {
        Self::new(inner, [MAIN_NAMESPACE])
    }

    pub fn into_inner(self) -> V {
        self.inner
    }
}

impl<V: DumpVisitor> DumpVisitor for NamespaceFilter<V> {
    fn start_wiki(&mut self) {
        self.inner.start_wiki()
    }
    fn site_info(&mut self, info: &SiteInfo) {
        self.inner.site_info(info)
    }
    fn start_page(&mut self, page: &Page) {
        self.in_page = self.namespaces.contains(&page.namespace);
        if self.in_page {
            self.inner.start_page(page)
        }
    }
    fn revision(&mut self, revision: &Revision) {
        if self.in_page {
            self.inner.revision(revision)
        }
    }
    fn end_page(&mut self) {
        if self.in_page {
            self.inner.end_page()
        }
        self.in_page = false;
    }
    fn end_wiki(&mut self) {
        self.inner.end_wiki()
    }
    fn close(&mut self) {
        self.inner.close()
    }
}

/// Passes on only the last revision of every page, which is the latest one in
/// dump order.
pub struct LatestFilter<V> {
    inner: V,
    latest: Option<Revision>,
}

impl<V: DumpVisitor> LatestFilter<V> {
    pub fn new(inner: V) -> Self {
        LatestFilter {
            inner,
            latest: None,
        }
    }

    pub fn into_inner(self) -> V {
        self.inner
    }
}

impl<V: DumpVisitor> DumpVisitor for LatestFilter<V> {
    fn start_wiki(&mut self) {
        self.inner.start_wiki()
    }
    fn site_info(&mut self, info: &SiteInfo) {
        self.inner.site_info(info)
    }
    fn start_page(&mut self, page: &Page) {
        self.latest = None;
        self.inner.start_page(page)
    }
    fn revision(&mut self, revision: &Revision) {
        self.latest = Some(revision.clone());
    }
    fn end_page(&mut self) {
        if let Some(revision) = self.latest.take() {
            self.inner.revision(&revision);
        }
        self.inner.end_page()
    }
    fn end_wiki(&mut self) {
        self.inner.end_wiki()
    }
    fn close(&mut self) {
        self.inner.close()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reader
// ─────────────────────────────────────────────────────────────────────────────

pub struct DumpReader<R> {
    reader: R,
}

impl<R: BufRead> DumpReader<R> {
    pub fn new(reader: R) -> Self {
        DumpReader { reader }
    }

    /// Read the whole dump. Only I/O errors fail the run; elements that cannot
    /// be made sense of are skipped.
    pub fn read_dump<V: DumpVisitor>(self, visitor: &mut V) -> io::Result<()> {
        let mut site_info = SiteInfo::default();
        visitor.start_wiki();

        scan_elements(self.reader, |element, xml| match element {
            Element::SiteInfo => {
                site_info = parse_site_info(xml);
                visitor.site_info(&site_info);
            }
            Element::Page => visit_page(xml, &site_info, visitor),
        })?;

        visitor.end_wiki();
        visitor.close();
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    SiteInfo,
    Page,
}

impl Element {
    fn tags(self) -> (&'static str, &'static str) {
        match self {
            Element::SiteInfo => ("<siteinfo>", "</siteinfo>"),
            Element::Page => ("<page>", "</page>"),
        }
    }
}

/// Feed every complete `<siteinfo>` and `<page>` element to `callback`.
fn scan_elements(mut reader: impl BufRead, mut callback: impl FnMut(Element, &str)) -> io::Result<()> {
    let mut buffer = String::new();
    let mut pending = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = reader.read(&mut chunk)?;
        if bytes_read == 0 {
            break;
        }

        // A multi-byte character may be cut at the chunk end; keep its
        // leading bytes for the next round.
        pending.extend_from_slice(&chunk[..bytes_read]);
        let valid = match std::str::from_utf8(&pending) {
            Ok(text) => text.len(),
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(_) => pending.len(),
        };
        buffer.push_str(&String::from_utf8_lossy(&pending[..valid]));
        pending.drain(..valid);

        let mut consumed = 0;
        while let Some((element, offset)) = next_element(&buffer[consumed..]) {
            let start = consumed + offset;
            let (_, close) = element.tags();
            let Some(end_offset) = buffer[start..].find(close) else {
                consumed = start;
                break;
            };
            let end = start + end_offset + close.len();
            callback(element, &buffer[start..end]);
            consumed = end;
        }
        buffer.drain(..consumed);

        if next_element(&buffer).is_none() && buffer.len() > 16 {
            let mut keep_from = buffer.len() - 16;
            while !buffer.is_char_boundary(keep_from) {
                keep_from -= 1;
            }
            buffer.drain(..keep_from);
        }
    }

    Ok(())
}

/// The first element opening in `buffer`. `<siteinfo>` precedes all pages, so
/// it is only looked for in front of the first `<page>`.
fn next_element(buffer: &str) -> Option<(Element, usize)> {
    let page = buffer.find(Element::Page.tags().0);
    let head = &buffer[..page.unwrap_or(buffer.len())];
    match head.find(Element::SiteInfo.tags().0) {
        Some(start) => Some((Element::SiteInfo, start)),
        None => page.map(|start| (Element::Page, start)),
    }
}

fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

fn parse_site_info(xml: &str) -> SiteInfo {
    let capture = |pattern: &Regex| {
        pattern
            .captures(xml)
            .map(|cap| decode(&cap[1]))
            .unwrap_or_default()
    };

    SiteInfo {
        sitename: capture(&*SITENAME_PATTERN),
        base: capture(&*BASE_PATTERN),
        namespaces: NAMESPACE_PATTERN
            .captures_iter(xml)
            .filter_map(|cap| {
                let key = cap[1].parse().ok()?;
                let name = cap.get(2).map(|m| decode(m.as_str())).unwrap_or_default();
                Some((key, name))
            })
            .collect(),
    }
}

fn visit_page(xml: &str, site_info: &SiteInfo, visitor: &mut impl DumpVisitor) {
    let Some(title) = TITLE_PATTERN.captures(xml).map(|cap| decode(&cap[1])) else {
        debug!("skipping page without title");
        return;
    };

    // Page-level elements come before the first revision.
    let header = &xml[..xml.find("<revision>").unwrap_or(xml.len())];
    let namespace = NS_PATTERN
        .captures(header)
        .and_then(|cap| cap[1].parse().ok())
        .unwrap_or_else(|| site_info.namespace_of(&title));

    let page = Page {
        id: ID_PATTERN.captures(header).and_then(|cap| cap[1].parse().ok()),
        redirect: REDIRECT_PATTERN.captures(header).map(|cap| decode(&cap[1])),
        title,
        namespace,
    };

    visitor.start_page(&page);
    for cap in REVISION_PATTERN.captures_iter(xml) {
        visitor.revision(&parse_revision(&cap[1]));
    }
    visitor.end_page();
}

fn parse_revision(xml: &str) -> Revision {
    Revision {
        id: ID_PATTERN.captures(xml).and_then(|cap| cap[1].parse().ok()),
        timestamp: TIMESTAMP_PATTERN.captures(xml).map(|cap| cap[1].to_string()),
        text: TEXT_PATTERN
            .captures(xml)
            .and_then(|cap| cap.get(1))
            .map(|m| decode(m.as_str()))
            .unwrap_or_default(),
    }
}
