//! Reading a whole dump into a [`NounIndex`].

use bzip2::read::BzDecoder;
use log::info;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::classify::Strategy;
use crate::collector::{Extraction, NounCollector};
use crate::dump::{DumpReader, DumpVisitor, LatestFilter, NamespaceFilter, Page, Revision, SiteInfo};
use crate::error::{Error, Result};
use crate::index::NounIndex;
use crate::vocabulary::Vocabulary;

const READ_BUFFER: usize = 256 * 1024;

/// Loads a German Wiktionary pages-articles dump (e.g. an unpacked
/// `dewiktionary-latest-pages-articles.xml.bz2`) and keeps every article marked
/// as a noun, together with its declension forms.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    vocabulary: Vocabulary,
    strategy: Strategy,
    extraction: Extraction,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn extraction(mut self, extraction: Extraction) -> Self {
        self.extraction = extraction;
        self
    }

    /// Fails with [`Error::NotFound`] before reading anything if `path` does
    /// not exist.
    pub fn load(&self, path: &Path) -> Result<NounIndex> {
        self.load_with_progress(path, |_| {})
    }

    /// Like [`Loader::load`], calling `on_page` for every page in the dump
    /// before any filtering.
    pub fn load_with_progress(&self, path: &Path, on_page: impl FnMut(&Page)) -> Result<NounIndex> {
        let reader = open_dump(path)?;
        self.load_from_reader(reader, on_page)
    }

    pub fn load_from_reader(&self, reader: impl BufRead, on_page: impl FnMut(&Page)) -> Result<NounIndex> {
        let mut collector =
            NounCollector::new(self.vocabulary.clone(), self.strategy, self.extraction)?;

        let mut visitor = NamespaceFilter::main(LatestFilter::new(&mut collector));
        let mut observed = PageObserver {
            inner: &mut visitor,
            on_page,
        };
        DumpReader::new(reader).read_dump(&mut observed)?;

        let stats = collector.stats();
        info!(
            "{} pages, {} revisions, {} unparseable, {} noun revisions",
            stats.pages, stats.revisions, stats.unparseable, stats.noun_revisions
        );
        info!(
            "{} revisions mention {} without a part of speech, {} have several declension tables",
            stats.unmarked_nouns, self.vocabulary.noun_marker, stats.extra_tables
        );

        let index = collector.into_index();
        info!("Loaded {} noun forms", index.len());
        Ok(index)
    }
}

/// Open an `.xml` or `.xml.bz2` dump for buffered reading.
pub fn open_dump(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::Io(err),
    })?;

    let compressed = path.extension().is_some_and(|ext| ext == "bz2");
    Ok(if compressed {
        Box::new(BufReader::with_capacity(READ_BUFFER, BzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(READ_BUFFER, file))
    })
}

/// Reports every page to a callback before handing it on.
struct PageObserver<V, F> {
    inner: V,
    on_page: F,
}

impl<V: DumpVisitor, F: FnMut(&Page)> DumpVisitor for PageObserver<V, F> {
    fn start_wiki(&mut self) {
        self.inner.start_wiki()
    }
    fn site_info(&mut self, info: &SiteInfo) {
        self.inner.site_info(info)
    }
    fn start_page(&mut self, page: &Page) {
        (self.on_page)(page);
        self.inner.start_page(page)
    }
    fn revision(&mut self, revision: &Revision) {
        self.inner.revision(revision)
    }
    fn end_page(&mut self) {
        self.inner.end_page()
    }
    fn end_wiki(&mut self) {
        self.inner.end_wiki()
    }
    fn close(&mut self) {
        self.inner.close()
    }
}
