//! The finished, read-only set of noun forms.

use std::collections::hash_set::Iter;
use std::collections::HashSet;

/// The nouns found in a dump, with their declension forms. Read-only once
/// built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NounIndex {
    forms: HashSet<String>,
}

impl NounIndex {
    pub fn is_noun(&self, word: &str) -> bool {
        self.forms.contains(word)
    }

    pub fn all_forms(&self) -> &HashSet<String> {
        &self.forms
    }

    pub fn iter(&self) -> Iter<'_, String> {
        self.forms.iter()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// All forms in byte order, for stable output.
    pub fn sorted(&self) -> Vec<String> {
        let mut forms: Vec<String> = self.forms.iter().cloned().collect();
        forms.sort();
        forms
    }
}

impl From<HashSet<String>> for NounIndex {
    fn from(forms: HashSet<String>) -> Self {
        NounIndex { forms }
    }
}

impl<'a> IntoIterator for &'a NounIndex {
    type Item = &'a String;
    type IntoIter = Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.forms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(forms: &[&str]) -> NounIndex {
        NounIndex::from(forms.iter().map(|f| f.to_string()).collect::<HashSet<_>>())
    }

    #[test]
    fn membership() {
        let index = index(&["Januar", "Januars", "Nomen proprium"]);
        assert!(index.is_noun("Januars"));
        assert!(index.is_noun("Nomen proprium"));
        assert!(!index.is_noun("Nomen"));
        assert!(!index.is_noun("januar"));
    }

    #[test]
    fn enumeration() {
        let index = index(&["Tische", "Tisch"]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.sorted(), vec!["Tisch", "Tische"]);
        assert_eq!(index.iter().count(), 2);
        assert!(index.all_forms().contains("Tische"));
    }

    #[test]
    fn empty_index() {
        let index = NounIndex::default();
        assert!(index.is_empty());
        assert!(!index.is_noun(""));
    }
}
