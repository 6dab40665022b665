//! Looking up templates by name.

use crate::wikitext::Template;

/// All templates named exactly `name`, in source order.
pub fn find_templates<'t, I>(templates: I, name: &str) -> Vec<&'t Template>
where
    I: IntoIterator<Item = &'t Template>,
{
    templates
        .into_iter()
        .filter(|template| template.name == name)
        .collect()
}

pub fn find_first_template<'t, I>(templates: I, name: &str) -> Option<&'t Template>
where
    I: IntoIterator<Item = &'t Template>,
{
    templates.into_iter().find(|template| template.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str, first: &str) -> Template {
        Template::new(name, vec![first.to_string()])
    }

    #[test]
    fn finds_all_matches_in_order() {
        let templates = vec![
            template("Wortart", "Substantiv"),
            template("m", ""),
            template("Wortart", "Verb"),
        ];
        let found = find_templates(&templates, "Wortart");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].parameter(0), Some("Substantiv"));
        assert_eq!(found[1].parameter(0), Some("Verb"));
    }

    #[test]
    fn no_match_or_no_input_is_empty() {
        let templates = vec![template("m", "")];
        assert!(find_templates(&templates, "Wortart").is_empty());
        assert!(find_templates(&Vec::<Template>::new(), "Wortart").is_empty());
    }

    #[test]
    fn name_must_match_exactly() {
        let templates = vec![template("Wortarten", "x"), template("wortart", "y")];
        assert!(find_templates(&templates, "Wortart").is_empty());
    }

    #[test]
    fn first_template() {
        let templates = vec![template("a", "1"), template("b", "2"), template("b", "3")];
        assert_eq!(
            find_first_template(&templates, "b").and_then(|t| t.parameter(0)),
            Some("2")
        );
        assert!(find_first_template(&templates, "c").is_none());
    }
}
