// Pulls a document ID out of whatever a person pasted into the link column.
//
// Accepted shapes, tried in this order:
// 1. Document URLs:   https://docs.google.com/document/d/<id>/edit
// 2. Drive file URLs: https://drive.google.com/file/d/<id>/view
// 3. A bare ID (25-60 characters of letters, digits, '-' and '_')
//
// No network access happens here.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::documents::DocumentId;

static RE_DOCUMENT_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/document/d/([A-Za-z0-9_-]+)").unwrap());
static RE_FILE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"/file/d/([A-Za-z0-9_-]+)").unwrap());
static RE_BARE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{25,60}$").unwrap());

/// Returns the document ID embedded in `raw`, or `None` when nothing usable is there.
///
/// Callers that need to tell "blank" apart from "garbage" must check for
/// blankness themselves; both come back as `None`.
pub fn resolve(raw: &str) -> Option<DocumentId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for pattern in [&*RE_DOCUMENT_URL, &*RE_FILE_URL] {
        if let Some(caps) = pattern.captures(raw) {
            return Some(DocumentId::new(&caps[1]));
        }
    }

    if RE_BARE_ID.is_match(raw) {
        return Some(DocumentId::new(raw));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "1aBcD-eFgH_iJkLmNoPqRsTuVwXyZ0123456789";

    fn resolved(raw: &str) -> Option<String> {
        resolve(raw).map(|id| id.as_str().to_string())
    }

    #[test]
    fn document_urls_resolve_to_their_id() {
        for url in [
            format!("https://docs.google.com/document/d/{ID}/edit"),
            format!("https://docs.google.com/document/d/{ID}/view?usp=sharing"),
            format!("https://docs.google.com/document/d/{ID}"),
            format!("https://docs.google.com/a/example.com/document/d/{ID}/edit#heading=h.1"),
        ] {
            assert_eq!(resolved(&url).as_deref(), Some(ID), "url: {url}");
        }
    }

    #[test]
    fn file_urls_resolve_to_their_id() {
        let url = format!("https://drive.google.com/file/d/{ID}/view");
        assert_eq!(resolved(&url).as_deref(), Some(ID));
    }

    #[test]
    fn short_ids_inside_urls_are_accepted() {
        // The length window only applies to bare IDs.
        assert_eq!(
            resolved("https://docs.google.com/document/d/abc/edit").as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn document_pattern_wins_over_file_pattern() {
        let url = "https://example.com/file/d/fileid/document/d/docid/edit";
        assert_eq!(resolved(url).as_deref(), Some("docid"));
    }

    #[test]
    fn ids_are_case_sensitive() {
        let url = "https://docs.google.com/document/d/AbCdEf/edit";
        assert_eq!(resolved(url).as_deref(), Some("AbCdEf"));
    }

    #[test]
    fn bare_id_length_window() {
        let at_min = "a".repeat(25);
        let at_max = "B".repeat(60);
        assert_eq!(resolved(&at_min), Some(at_min.clone()));
        assert_eq!(resolved(&at_max), Some(at_max.clone()));
        assert_eq!(resolved(&"a".repeat(24)), None);
        assert_eq!(resolved(&"a".repeat(61)), None);
    }

    #[test]
    fn bare_id_with_surrounding_whitespace_is_trimmed() {
        let padded = format!("  {ID}\n");
        assert_eq!(resolved(&padded).as_deref(), Some(ID));
    }

    #[test]
    fn bare_id_rejects_unsafe_characters() {
        assert_eq!(resolved(&format!("{}!", "a".repeat(30))), None);
        assert_eq!(resolved(&format!("{} {}", "a".repeat(15), "b".repeat(15))), None);
    }

    #[test]
    fn blank_and_garbage_do_not_resolve() {
        assert_eq!(resolved(""), None);
        assert_eq!(resolved("   \t"), None);
        assert_eq!(resolved("not a link"), None);
        assert_eq!(resolved("https://example.com/page"), None);
    }
}
