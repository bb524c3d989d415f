// Finds the raw link for one row of the link column.
//
// A link can hide in several places of a cell: the cell-level hyperlink, a
// link on part of the text, a HYPERLINK() formula, or just the visible text.
// Each place is a strategy; we try them in a fixed order and take the first
// non-blank answer. The plain value from the values API is the last resort.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::sheets::CellLinkMetadata;

type LinkStrategy = fn(&CellLinkMetadata) -> Option<String>;

/// Priority order matters: an explicit hyperlink beats whatever the cell displays.
const STRATEGIES: &[(&str, LinkStrategy)] = &[
    ("cell hyperlink", cell_hyperlink),
    ("text run link", first_text_run_link),
    ("HYPERLINK formula", hyperlink_formula),
    ("formatted value", formatted_value),
];

static RE_HYPERLINK_FORMULA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^\s*=\s*HYPERLINK\s*\(\s*"([^"]+)""#).unwrap());

/// Returns the first non-blank link found for a row.
pub fn discover_link(metadata: Option<&CellLinkMetadata>, value: Option<&str>) -> Option<String> {
    if let Some(metadata) = metadata {
        for (name, strategy) in STRATEGIES {
            if let Some(link) = strategy(metadata).and_then(non_blank) {
                tracing::trace!("Link found via {}", name);
                return Some(link);
            }
        }
    }

    value.map(str::to_string).and_then(non_blank)
}

fn non_blank(link: String) -> Option<String> {
    if link.trim().is_empty() {
        None
    } else {
        Some(link)
    }
}

fn cell_hyperlink(cell: &CellLinkMetadata) -> Option<String> {
    cell.hyperlink.clone()
}

fn first_text_run_link(cell: &CellLinkMetadata) -> Option<String> {
    cell.text_run_links
        .iter()
        .find(|link| !link.trim().is_empty())
        .cloned()
}

fn hyperlink_formula(cell: &CellLinkMetadata) -> Option<String> {
    let formula = cell.formula.as_deref()?;
    RE_HYPERLINK_FORMULA
        .captures(formula)
        .map(|caps| caps[1].to_string())
}

fn formatted_value(cell: &CellLinkMetadata) -> Option<String> {
    cell.formatted_value.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_hyperlink_has_top_priority() {
        let cell = CellLinkMetadata {
            hyperlink: Some("https://a".into()),
            text_run_links: vec!["https://b".into()],
            formula: Some(r#"=HYPERLINK("https://c","c")"#.into()),
            formatted_value: Some("d".into()),
        };
        assert_eq!(discover_link(Some(&cell), Some("e")).as_deref(), Some("https://a"));
    }

    #[test]
    fn text_run_links_skip_blank_entries() {
        let cell = CellLinkMetadata {
            text_run_links: vec!["  ".into(), "https://b".into()],
            formatted_value: Some("label".into()),
            ..Default::default()
        };
        assert_eq!(discover_link(Some(&cell), None).as_deref(), Some("https://b"));
    }

    #[test]
    fn hyperlink_formula_url_is_extracted() {
        let cell = CellLinkMetadata {
            formula: Some(r#"= hyperlink( "https://docs.google.com/document/d/x/edit" ; "Doc")"#.into()),
            formatted_value: Some("Doc".into()),
            ..Default::default()
        };
        assert_eq!(
            discover_link(Some(&cell), None).as_deref(),
            Some("https://docs.google.com/document/d/x/edit")
        );
    }

    #[test]
    fn other_formulas_fall_through_to_displayed_text() {
        let cell = CellLinkMetadata {
            formula: Some("=A1".into()),
            formatted_value: Some("shown".into()),
            ..Default::default()
        };
        assert_eq!(discover_link(Some(&cell), None).as_deref(), Some("shown"));
    }

    #[test]
    fn plain_value_is_the_last_resort() {
        assert_eq!(discover_link(None, Some("raw")).as_deref(), Some("raw"));
        let blank = CellLinkMetadata {
            hyperlink: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(discover_link(Some(&blank), Some("raw")).as_deref(), Some("raw"));
    }

    #[test]
    fn nothing_anywhere_is_none() {
        assert_eq!(discover_link(None, None), None);
        assert_eq!(discover_link(Some(&CellLinkMetadata::default()), Some("  ")), None);
    }
}
