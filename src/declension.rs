//! Word forms from the declension table template.
//!
//! A table parameter looks like `Genitiv Singular=des Januars`: everything after
//! the ` Label=Article ` separator is one inflected form of the headword.

use log::{debug, info};
use regex::Regex;
use std::collections::HashSet;

use crate::error::Result;
use crate::templates::find_templates;
use crate::vocabulary::Vocabulary;
use crate::wikitext::{canonical_name, Template};

/// What one page's declension templates yielded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declension {
    pub forms: HashSet<String>,
    /// Declension templates on the page; only the first one is read.
    pub tables: usize,
}

#[derive(Debug, Clone)]
pub struct DeclensionTable {
    template_name: String,
    separator: Regex,
}

impl DeclensionTable {
    pub fn new(vocabulary: &Vocabulary) -> Result<Self> {
        Ok(DeclensionTable {
            template_name: canonical_name(&vocabulary.declension_template),
            separator: vocabulary.declension_separator()?,
        })
    }

    /// Forms listed in the page's declension table; empty without a table.
    pub fn extract_forms<'t, I>(&self, templates: I, title: &str) -> HashSet<String>
    where
        I: IntoIterator<Item = &'t Template>,
    {
        self.extract(templates, title).forms
    }

    /// Only the first table is read when a page has several. Parameters that
    /// do not have the `Label=Article Form` shape are skipped.
    pub fn extract<'t, I>(&self, templates: I, title: &str) -> Declension
    where
        I: IntoIterator<Item = &'t Template>,
    {
        let tables = find_templates(templates, &self.template_name);
        let Some(table) = tables.first() else {
            return Declension::default();
        };
        if tables.len() > 1 {
            info!(
                "{title}: {} {} templates, reading only the first",
                tables.len(),
                self.template_name
            );
        }

        let mut forms = HashSet::new();
        for parameter in &table.parameters {
            match self.form(parameter) {
                Some(form) => {
                    forms.insert(form.to_string());
                }
                None => debug!(
                    "{title}: skipping declension parameter {parameter:?}, expected pattern {:?}",
                    self.separator.as_str()
                ),
            }
        }
        Declension {
            forms,
            tables: tables.len(),
        }
    }

    /// The separator must split the parameter into exactly two parts, ignoring
    /// empty trailing parts; the second one, trimmed, is the form. A form that
    /// trims to nothing is skipped like a malformed parameter.
    fn form<'p>(&self, parameter: &'p str) -> Option<&'p str> {
        let mut parts: Vec<&str> = self.separator.split(parameter).collect();
        while parts.last().is_some_and(|part| part.is_empty()) {
            parts.pop();
        }

        match parts.as_slice() {
            &[_, form] => Some(form.trim()).filter(|form| !form.is_empty()),
            _ => None,
        }
    }
}
