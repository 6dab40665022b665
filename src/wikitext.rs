//! Wikitext to page structure.
//!
//! Only as much of MediaWiki markup is understood as the noun extraction needs:
//! headings open (nested) sections, blank lines separate paragraphs, and
//! `{{templates}}` are collected with their raw parameters. Links, tables and
//! formatting stay plain text.

use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;

lazy_static! {
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref HEADING: Regex = Regex::new(r"^(={1,6})(.+?)(={1,6})\s*$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("revision text is empty")]
    Empty,
}

/// Template name with runs of spaces and underscores collapsed to one `_` and
/// trimmed at both ends.
pub(crate) fn canonical_name(name: &str) -> String {
    name.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// `{{name|param|param}}`. Parameters are kept exactly as written, including
/// surrounding whitespace and any `key=value` encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub parameters: Vec<String>,
}

impl Template {
    /// Spaces and underscores in template names are interchangeable; the name is
    /// stored with single underscores (`Deutsch Substantiv Übersicht` becomes
    /// `Deutsch_Substantiv_Übersicht`).
    pub fn new(name: &str, parameters: Vec<String>) -> Self {
        Template {
            name: canonical_name(name),
            parameters,
        }
    }

    pub fn parameter(&self, index: usize) -> Option<&str> {
        self.parameters.get(index).map(String::as_str)
    }
}

/// Heading line of a section, without the `=` markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTitle {
    pub text: String,
    pub templates: Vec<Template>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub templates: Vec<Template>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Paragraph(Paragraph),
    Section(Section),
}

impl Content {
    /// Templates of this content item in source order; for a nested section
    /// this includes its title and everything below it.
    pub fn templates(&self) -> Vec<&Template> {
        match self {
            Content::Paragraph(paragraph) => paragraph.templates.iter().collect(),
            Content::Section(section) => section.templates(),
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Content::Section(section) => Some(section),
            Content::Paragraph(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Number of `=` of the heading; 0 for the untitled text before the first
    /// heading.
    pub level: usize,
    pub title: Option<SectionTitle>,
    pub content: Vec<Content>,
}

impl Section {
    fn untitled() -> Self {
        Section {
            level: 0,
            title: None,
            content: Vec::new(),
        }
    }

    pub fn title_templates(&self) -> &[Template] {
        self.title
            .as_ref()
            .map(|title| title.templates.as_slice())
            .unwrap_or_default()
    }

    pub fn templates(&self) -> Vec<&Template> {
        let mut templates: Vec<&Template> = self.title_templates().iter().collect();
        for content in &self.content {
            templates.extend(content.templates());
        }
        templates
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub sections: Vec<Section>,
}

impl ParsedPage {
    /// Every template on the page, in source order.
    pub fn templates(&self) -> Vec<&Template> {
        self.sections.iter().flat_map(Section::templates).collect()
    }
}

/// Parse one revision's wikitext.
///
/// Text before the first heading becomes an untitled root section that also
/// contains the sections following it, so such a page has a single top-level
/// section. Only blank input fails; a `{{` that is never closed is plain text.
pub fn parse(text: &str) -> Result<ParsedPage, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let text = COMMENT.replace_all(text, "");
    let mut builder = PageBuilder::default();

    for line in logical_lines(&text) {
        if let Some(heading) = HEADING.captures(line) {
            let level = heading[1].len().min(heading[3].len());
            let title = heading[2].trim();
            builder.open_section(
                level,
                SectionTitle {
                    text: title.to_string(),
                    templates: scan_templates(title),
                },
            );
        } else if line.trim().is_empty() {
            builder.end_paragraph();
        } else {
            builder.push_line(line);
        }
    }

    Ok(builder.finish())
}

/// Collect the top-level templates in `text`.
pub fn scan_templates(text: &str) -> Vec<Template> {
    TemplateScanner::new(text)
        .scan()
        .into_iter()
        .map(|(_, template)| template)
        .collect()
}

/// Split into lines, joining physical lines that a template spans so a
/// multi-line template ends up in one paragraph.
fn logical_lines(text: &str) -> Vec<&str> {
    let mut spans = TemplateScanner::new(text)
        .scan()
        .into_iter()
        .map(|(span, _)| span)
        .peekable();

    let mut lines = Vec::new();
    let mut open: Option<usize> = None;
    let mut reach = 0;
    let mut offset = 0;

    for line in text.split('\n') {
        let line_end = offset + line.len();
        let start = *open.get_or_insert(offset);
        while let Some(span) = spans.next_if(|span| span.start < line_end) {
            reach = reach.max(span.end);
        }
        if reach <= line_end {
            lines.push(&text[start..line_end]);
            open = None;
        }
        offset = line_end + 1;
    }
    lines
}

#[derive(Default)]
struct PageBuilder {
    sections: Vec<Section>,
    open: Vec<Section>,
    paragraph: String,
}

impl PageBuilder {
    fn current_section(&mut self) -> &mut Section {
        if self.open.is_empty() {
            self.open.push(Section::untitled());
        }
        let last = self.open.len() - 1;
        &mut self.open[last]
    }

    fn push_line(&mut self, line: &str) {
        if !self.paragraph.is_empty() {
            self.paragraph.push('\n');
        }
        self.paragraph.push_str(line);
    }

    fn end_paragraph(&mut self) {
        if self.paragraph.trim().is_empty() {
            self.paragraph.clear();
            return;
        }

        let text = std::mem::take(&mut self.paragraph);
        let templates = scan_templates(&text);
        self.current_section()
            .content
            .push(Content::Paragraph(Paragraph { text, templates }));
    }

    fn open_section(&mut self, level: usize, title: SectionTitle) {
        self.end_paragraph();
        while self.open.last().is_some_and(|top| top.level >= level) {
            if let Some(closed) = self.open.pop() {
                self.attach(closed);
            }
        }
        self.open.push(Section {
            level,
            title: Some(title),
            content: Vec::new(),
        });
    }

    fn attach(&mut self, section: Section) {
        match self.open.last_mut() {
            Some(parent) => parent.content.push(Content::Section(section)),
            None => self.sections.push(section),
        }
    }

    fn finish(mut self) -> ParsedPage {
        self.end_paragraph();
        while let Some(closed) = self.open.pop() {
            self.attach(closed);
        }
        ParsedPage {
            sections: self.sections,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Template scanner
// ─────────────────────────────────────────────────────────────────────────────

/// Recursive descent over `{{…}}`. Pipes only split parameters at the
/// template's own nesting level, not inside nested templates or `[[links]]`.
/// A `{{` without its `}}` is read as text.
struct TemplateScanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> TemplateScanner<'a> {
    fn new(text: &'a str) -> Self {
        TemplateScanner { text, pos: 0 }
    }

    fn at(&self, token: &str) -> bool {
        self.text.as_bytes()[self.pos..].starts_with(token.as_bytes())
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Top-level templates with the byte range each one covers.
    fn scan(mut self) -> Vec<(Range<usize>, Template)> {
        let mut templates = Vec::new();
        while !self.at_end() {
            if self.skip_parameter_reference() {
                continue;
            }
            if self.at("{{") {
                let start = self.pos;
                match self.parse_template() {
                    Some(template) => templates.push((start..self.pos, template)),
                    None => self.pos = start + 2,
                }
            } else {
                self.pos += 1;
            }
        }
        templates
    }

    // `{{{1}}}` only means something inside template definitions; treat as
    // text. An unpaired `{{{` is left to the template rules.
    fn skip_parameter_reference(&mut self) -> bool {
        if !self.at("{{{") {
            return false;
        }
        match self.text[self.pos + 3..].find("}}}") {
            Some(end) => {
                self.pos += 3 + end + 3;
                true
            }
            None => false,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // template ::= "{{" part ("|" part)* "}}"
    // ─────────────────────────────────────────────────────────────
    fn parse_template(&mut self) -> Option<Template> {
        self.pos += 2;

        let mut parts = Vec::new();
        let mut part_start = self.pos;
        let mut braces = 0usize;
        let mut brackets = 0usize;

        while !self.at_end() {
            if self.skip_parameter_reference() {
                continue;
            }
            if self.at("{{") {
                braces += 1;
                self.pos += 2;
            } else if self.at("}}") {
                if braces == 0 {
                    parts.push(&self.text[part_start..self.pos]);
                    self.pos += 2;
                    let name = parts[0];
                    let parameters = parts[1..].iter().map(|part| part.to_string()).collect();
                    return Some(Template::new(name, parameters));
                }
                braces -= 1;
                self.pos += 2;
            } else if self.at("[[") {
                brackets += 1;
                self.pos += 2;
            } else if self.at("]]") && brackets > 0 {
                brackets -= 1;
                self.pos += 2;
            } else if self.at("|") && braces == 0 && brackets == 0 {
                parts.push(&self.text[part_start..self.pos]);
                self.pos += 1;
                part_start = self.pos;
            } else {
                self.pos += 1;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(templates: &[&Template]) -> Vec<String> {
        templates.iter().map(|t| t.name.clone()).collect()
    }

    // ─────────────────────────────────────────────────────────────
    // Template scanning
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn simple_template() {
        let templates = scan_templates("{{Wortart|Substantiv|Deutsch}}");
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Wortart");
        assert_eq!(templates[0].parameters, vec!["Substantiv", "Deutsch"]);
    }

    #[test]
    fn parameters_are_not_trimmed() {
        let templates = scan_templates("{{T| Singular=der Tisch |x}}");
        assert_eq!(templates[0].parameter(0), Some(" Singular=der Tisch "));
        assert_eq!(templates[0].parameter(1), Some("x"));
        assert_eq!(templates[0].parameter(2), None);
    }

    #[test]
    fn name_spaces_and_underscores_are_canonical() {
        let templates = scan_templates("{{ Deutsch Substantiv_Übersicht\n|Genus=m}}");
        assert_eq!(templates[0].name, "Deutsch_Substantiv_Übersicht");
    }

    #[test]
    fn pipes_in_links_and_nested_templates_do_not_split() {
        let templates = scan_templates("{{Ü|[[a|b]]|{{x|y}}|c}}");
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].parameters, vec!["[[a|b]]", "{{x|y}}", "c"]);
    }

    #[test]
    fn several_templates_in_order() {
        let templates = scan_templates("{{a}} text {{b|1}} {{c}}");
        let names: Vec<_> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn parameter_references_are_text() {
        let templates = scan_templates("{{{1}}} {{a|{{{2}}}}}");
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].parameters, vec!["{{{2}}}"]);
    }

    #[test]
    fn unclosed_template_is_text() {
        assert!(scan_templates("ok {{a|b").is_empty());
        let templates = scan_templates("Die Klammer {{ steht hier allein. {{Beispiele}}");
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Beispiele");
    }

    #[test]
    fn nested_template_closing_with_four_braces() {
        let templates = scan_templates(":[1] {{Wikipedia|{{PAGENAME}}}}");
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Wikipedia");
        assert_eq!(templates[0].parameters, vec!["{{PAGENAME}}"]);
    }

    #[test]
    fn unpaired_triple_braces_do_not_hide_later_templates() {
        let templates = scan_templates("{{{a}} {{b}}");
        assert_eq!(templates.last().map(|t| t.name.as_str()), Some("b"));
    }

    // ─────────────────────────────────────────────────────────────
    // Page structure
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn blank_text_is_an_error() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("  \n\n "), Err(ParseError::Empty));
    }

    #[test]
    fn unclosed_template_does_not_swallow_the_page() {
        let text = "== Tisch ==\n\
                    === {{Wortart|Substantiv|Deutsch}} ===\n\
                    {{Beispiele}}\n\
                    :[1] Die Klammer {{ steht hier allein.\n\
                    \n\
                    {{Referenzen}}\n";
        let page = parse(text).unwrap();
        assert_eq!(
            names(&page.templates()),
            vec!["Wortart", "Beispiele", "Referenzen"]
        );
    }

    #[test]
    fn four_closing_braces_end_the_line() {
        let text = "=== {{Wortart|Substantiv|Deutsch}} ===\n\
                    {{a|{{b}}}}\n\
                    \n\
                    {{c}}\n";
        let page = parse(text).unwrap();
        let section = &page.sections[0];
        assert_eq!(section.content.len(), 2);
        assert_eq!(names(&section.templates()), vec!["Wortart", "a", "c"]);
    }

    #[test]
    fn headings_nest_by_level() {
        let text = "== Januar ({{Sprache|Deutsch}}) ==\n\
                    === {{Wortart|Substantiv|Deutsch}}, {{m}} ===\n\
                    {{Bedeutungen}}\n\
                    == Januar ({{Sprache|Englisch}}) ==\n";
        let page = parse(text).unwrap();
        assert_eq!(page.sections.len(), 2);

        let german = &page.sections[0];
        assert_eq!(german.level, 2);
        assert_eq!(names(&german.title_templates().iter().collect::<Vec<_>>()), vec!["Sprache"]);
        assert_eq!(german.content.len(), 1);

        let pos = german.content[0].as_section().unwrap();
        assert_eq!(pos.level, 3);
        assert_eq!(pos.title.as_ref().unwrap().text, "{{Wortart|Substantiv|Deutsch}}, {{m}}");
        assert_eq!(names(&pos.templates()), vec!["Wortart", "m", "Bedeutungen"]);
    }

    #[test]
    fn text_before_first_heading_is_an_untitled_root() {
        let text = "{{Siehe auch|[[januar]]}}\n== Januar ({{Sprache|Deutsch}}) ==\ntext\n";
        let page = parse(text).unwrap();
        assert_eq!(page.sections.len(), 1);

        let root = &page.sections[0];
        assert_eq!(root.level, 0);
        assert!(root.title.is_none());
        assert_eq!(root.content.len(), 2);
        assert!(matches!(root.content[0], Content::Paragraph(_)));
        assert!(root.content[1].as_section().is_some());
    }

    #[test]
    fn blank_lines_separate_paragraphs() {
        let page = parse("one\n\ntwo\nstill two\n").unwrap();
        let root = &page.sections[0];
        assert_eq!(root.content.len(), 2);
        match &root.content[1] {
            Content::Paragraph(paragraph) => assert_eq!(paragraph.text, "two\nstill two"),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn multi_line_template_stays_in_one_paragraph() {
        let text = "{{Deutsch Substantiv Übersicht\n|Nominativ Singular=der Tisch\n\n|Nominativ Plural=die Tische\n}}\n";
        let page = parse(text).unwrap();
        let templates = page.templates();
        assert_eq!(templates.len(), 1);
        assert_eq!(
            templates[0].parameters,
            vec!["Nominativ Singular=der Tisch\n\n", "Nominativ Plural=die Tische\n"]
        );
    }

    #[test]
    fn comments_are_ignored() {
        let page = parse("<!-- {{Wortart|Verb}} -->\n{{Wortart|Substantiv}}\n").unwrap();
        let templates = page.templates();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].parameter(0), Some("Substantiv"));
    }

    #[test]
    fn comment_only_page_has_no_sections() {
        let page = parse("<!-- nothing here -->").unwrap();
        assert!(page.sections.is_empty());
    }
}
