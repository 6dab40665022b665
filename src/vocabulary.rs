//! Grammar vocabulary the classifier and the declension extractor look for.
//!
//! The default is the German Wiktionary vocabulary, the same values as the
//! bundled `schema/vocabulary.yaml`. A different file can be supplied with
//! [`Vocabulary::from_yaml_file`]; keys it leaves out keep their defaults.

use regex::Regex;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::wikitext::canonical_name;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Template declaring the part of speech of an entry (`Wortart`).
    pub part_of_speech_template: String,
    /// First parameter of the part-of-speech template for nouns (`Substantiv`).
    pub noun_marker: String,
    /// Declension table template (`Deutsch_Substantiv_Übersicht`).
    pub declension_template: String,
    /// Grammatical number labels (`Singular`, `Plural`).
    pub numbers: Vec<String>,
    /// Case-inflected articles (`der`, `die`, `das`, `des`, `dem`, `den`).
    pub articles: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            part_of_speech_template: "Wortart".to_string(),
            noun_marker: "Substantiv".to_string(),
            declension_template: "Deutsch_Substantiv_Übersicht".to_string(),
            numbers: words(&["Singular", "Plural"]),
            articles: words(&["der", "die", "das", "des", "dem", "den"]),
        }
    }
}

fn words(words: &[&str]) -> Vec<String> {
    words.iter().map(|word| word.to_string()).collect()
}

impl Vocabulary {
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let vocabulary: Vocabulary =
            serde_yaml::from_str(&contents).map_err(|source| Error::Schema {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(vocabulary.with_canonical_names())
    }

    /// Template names as the parser stores them: spaces and underscores
    /// collapsed to single `_`.
    pub fn with_canonical_names(mut self) -> Self {
        self.part_of_speech_template = canonical_name(&self.part_of_speech_template);
        self.declension_template = canonical_name(&self.declension_template);
        self
    }

    /// Separator between the label/article prefix and the word form of a
    /// declension parameter, e.g. ` (Singular|Plural)=(der|die|das|des|dem|den) `.
    pub fn declension_separator(&self) -> Result<Regex> {
        let alternation = |words: &[String]| {
            words
                .iter()
                .map(|word| regex::escape(word))
                .collect::<Vec<_>>()
                .join("|")
        };

        let pattern = format!(
            " ({})=({}) ",
            alternation(&self.numbers),
            alternation(&self.articles)
        );
        Ok(Regex::new(&pattern)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_schema_matches_default() {
        let vocabulary = Vocabulary::from_yaml_file(Path::new("schema/vocabulary.yaml")).unwrap();
        assert_eq!(vocabulary, Vocabulary::default());
    }

    #[test]
    fn default_vocabulary_is_german() {
        let vocabulary = Vocabulary::default();
        assert_eq!(vocabulary.part_of_speech_template, "Wortart");
        assert_eq!(vocabulary.noun_marker, "Substantiv");
        assert_eq!(vocabulary.declension_template, "Deutsch_Substantiv_Übersicht");
        assert_eq!(vocabulary.numbers, vec!["Singular", "Plural"]);
        assert_eq!(vocabulary.articles.len(), 6);
    }

    #[test]
    fn default_separator_matches_declension_parameters() {
        let separator = Vocabulary::default().declension_separator().unwrap();
        assert_eq!(
            separator.as_str(),
            " (Singular|Plural)=(der|die|das|des|dem|den) "
        );
        assert!(separator.is_match("Nominativ Singular=der Tisch"));
        assert!(!separator.is_match("Genitiv=Tisches"));
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let vocabulary: Vocabulary = serde_yaml::from_str("noun_marker: Nomen\n").unwrap();
        assert_eq!(vocabulary.noun_marker, "Nomen");
        assert_eq!(vocabulary.part_of_speech_template, "Wortart");
    }

    #[test]
    fn template_names_are_canonicalised() {
        let vocabulary =
            Vocabulary::from_yaml_file(Path::new("testdata/spaced-vocabulary.yaml")).unwrap();
        assert_eq!(vocabulary.part_of_speech_template, "Wortart");
        assert_eq!(vocabulary.declension_template, "Deutsch_Substantiv_Übersicht");
        assert_eq!(vocabulary, Vocabulary::default());
    }

    #[test]
    fn missing_schema_file_is_an_io_error() {
        let result = Vocabulary::from_yaml_file(Path::new("testdata/no-such-schema.yaml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
