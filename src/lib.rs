//! German nouns from a German Wiktionary XML dump.
//!
//! Every main-namespace article whose part-of-speech template says
//! `Substantiv` is recorded with its title and the word forms listed in its
//! `Deutsch Substantiv Übersicht` declension table. The result is a
//! [`NounIndex`] answering "is this word a noun form?".
//!
//! ```no_run
//! use dewiktionary_nouns::Loader;
//! use std::path::Path;
//!
//! let index = Loader::new().load(Path::new("dewiktionary-latest-pages-articles.xml.bz2"))?;
//! assert!(index.is_noun("Januars"));
//! # Ok::<(), dewiktionary_nouns::Error>(())
//! ```

pub mod classify;
pub mod collector;
pub mod declension;
pub mod dump;
pub mod error;
pub mod index;
pub mod loader;
pub mod templates;
pub mod vocabulary;
pub mod wikitext;

pub use classify::Strategy;
pub use collector::{CollectorStats, Extraction, NounCollector};
pub use error::{Error, Result};
pub use index::NounIndex;
pub use loader::Loader;
pub use vocabulary::Vocabulary;
