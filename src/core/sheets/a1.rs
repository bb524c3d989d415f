// A1 notation helpers.

/// Converts column letters back to a 0-based index. Case-insensitive.
/// Returns `None` for anything that is not a run of ASCII letters.
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }

    let mut index: usize = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// Upper-cases and validates a column given in configuration.
pub fn normalize_column(letters: &str) -> Option<String> {
    let letters = letters.trim();
    column_index(letters).map(|_| letters.to_ascii_uppercase())
}

/// Sheet titles are always quoted; embedded quotes are doubled.
pub fn quote_sheet_name(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_for_known_letters() {
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("R"), Some(17));
        assert_eq!(column_index("S"), Some(18));
        assert_eq!(column_index("Z"), Some(25));
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index("ZZ"), Some(701));
        assert_eq!(column_index("AAA"), Some(702));
        assert_eq!(column_index("xfd"), Some(16383));
    }

    #[test]
    fn index_rejects_non_letters() {
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("R1"), None);
        assert_eq!(column_index("-"), None);
    }

    #[test]
    fn normalize_column_uppercases() {
        assert_eq!(normalize_column(" r "), Some("R".to_string()));
        assert_eq!(normalize_column("aa"), Some("AA".to_string()));
        assert_eq!(normalize_column("7"), None);
    }

    #[test]
    fn sheet_names_are_quoted() {
        assert_eq!(quote_sheet_name("Sheet1"), "'Sheet1'");
        assert_eq!(quote_sheet_name("It's"), "'It''s'");
    }
}
