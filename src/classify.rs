//! Deciding from a page's part-of-speech templates whether it is a noun.

use clap::ValueEnum;

use crate::templates::find_templates;
use crate::vocabulary::Vocabulary;
use crate::wikitext::{ParsedPage, Section, Template};

/// Where to look for the part-of-speech template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Scan sections in order; the first one with a part-of-speech template decides
    #[default]
    Sectioned,
    /// Only the nested section at content position 1 of the first section
    FixedPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Noun,
    /// A part-of-speech template was found, none of them says noun.
    NotNoun,
    /// No part-of-speech template anywhere the strategy looks.
    Unknown,
}

impl Classification {
    pub fn is_noun(self) -> bool {
        self == Classification::Noun
    }
}

pub fn classify(page: &ParsedPage, vocabulary: &Vocabulary, strategy: Strategy) -> Classification {
    if page.sections.is_empty() {
        return Classification::NotNoun;
    }

    let templates = match strategy {
        Strategy::Sectioned => sectioned_scan(page, &vocabulary.part_of_speech_template),
        Strategy::FixedPosition => fixed_position_scan(page, &vocabulary.part_of_speech_template),
    };

    if templates.is_empty() {
        Classification::Unknown
    } else if templates
        .iter()
        .any(|template| template.parameter(0) == Some(vocabulary.noun_marker.as_str()))
    {
        Classification::Noun
    } else {
        Classification::NotNoun
    }
}

/// Part-of-speech templates of the first section that has any. Later sections
/// are not looked at, even when the templates found do not say noun.
fn sectioned_scan<'p>(page: &'p ParsedPage, name: &str) -> Vec<&'p Template> {
    page.sections
        .iter()
        .map(|section| part_of_speech_templates(section, name))
        .find(|templates| !templates.is_empty())
        .unwrap_or_default()
}

fn fixed_position_scan<'p>(page: &'p ParsedPage, name: &str) -> Vec<&'p Template> {
    page.sections
        .first()
        .and_then(|section| section.content.get(1))
        .and_then(|content| content.as_section())
        .map(|section| part_of_speech_templates(section, name))
        .unwrap_or_default()
}

/// The section's title templates named `name` if there are any, otherwise
/// those of the first content item that has some.
pub fn part_of_speech_templates<'p>(section: &'p Section, name: &str) -> Vec<&'p Template> {
    let in_title = find_templates(section.title_templates(), name);
    if !in_title.is_empty() {
        return in_title;
    }

    section
        .content
        .iter()
        .map(|content| find_templates(content.templates(), name))
        .find(|templates| !templates.is_empty())
        .unwrap_or_default()
}
