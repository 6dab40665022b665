//! Collects noun forms page by page while a dump is read.

use clap::ValueEnum;
use log::{info, warn};
use std::collections::HashSet;

use crate::classify::{classify, Classification, Strategy};
use crate::declension::{Declension, DeclensionTable};
use crate::dump::{DumpVisitor, Page, Revision};
use crate::error::Result;
use crate::index::NounIndex;
use crate::vocabulary::Vocabulary;
use crate::wikitext;

/// What a noun page contributes to the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Extraction {
    /// The headword and every form from its declension table
    #[default]
    Forms,
    /// The headword only
    Titles,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorStats {
    pub pages: usize,
    pub revisions: usize,
    pub unparseable: usize,
    pub noun_revisions: usize,
    /// Revisions without a part-of-speech template that still mention the
    /// noun marker.
    pub unmarked_nouns: usize,
    /// Revisions with more than one declension table.
    pub extra_tables: usize,
}

/// The visitor that turns revisions into noun forms.
///
/// At most one page is open at a time: `start_page` sets the title that
/// following revisions are attributed to, `end_page` clears it.
pub struct NounCollector {
    vocabulary: Vocabulary,
    declension: DeclensionTable,
    strategy: Strategy,
    extraction: Extraction,
    title: Option<String>,
    forms: HashSet<String>,
    stats: CollectorStats,
}

impl NounCollector {
    pub fn new(vocabulary: Vocabulary, strategy: Strategy, extraction: Extraction) -> Result<Self> {
        let vocabulary = vocabulary.with_canonical_names();
        Ok(NounCollector {
            declension: DeclensionTable::new(&vocabulary)?,
            vocabulary,
            strategy,
            extraction,
            title: None,
            forms: HashSet::new(),
            stats: CollectorStats::default(),
        })
    }

    pub fn stats(&self) -> CollectorStats {
        self.stats
    }

    pub fn into_index(self) -> NounIndex {
        NounIndex::from(self.forms)
    }
}

impl DumpVisitor for NounCollector {
    fn start_page(&mut self, page: &Page) {
        self.title = Some(page.title.clone());
        self.stats.pages += 1;
    }

    fn revision(&mut self, revision: &Revision) {
        let Some(title) = self.title.as_deref() else {
            warn!("revision {:?} arrived outside of a page, ignoring it", revision.id);
            return;
        };
        self.stats.revisions += 1;

        let page = match wikitext::parse(&revision.text) {
            Ok(page) => page,
            Err(err) => {
                warn!("could not parse page {title}: {err}");
                self.stats.unparseable += 1;
                return;
            }
        };

        let declension = match self.extraction {
            Extraction::Forms => self.declension.extract(page.templates(), title),
            Extraction::Titles => Declension::default(),
        };
        if declension.tables > 1 {
            self.stats.extra_tables += 1;
        }

        match classify(&page, &self.vocabulary, self.strategy) {
            Classification::Noun => {
                self.stats.noun_revisions += 1;
                self.forms.insert(title.to_string());
                self.forms.extend(declension.forms);
            }
            Classification::NotNoun => {}
            Classification::Unknown => {
                if revision.text.contains(&self.vocabulary.noun_marker) {
                    self.stats.unmarked_nouns += 1;
                    info!(
                        "no part of speech found for {title} (which does contain '{}')",
                        self.vocabulary.noun_marker
                    );
                }
            }
        }
    }

    fn end_page(&mut self) {
        self.title = None;
    }
}
