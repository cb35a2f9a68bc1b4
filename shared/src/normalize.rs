/// Canonical form used for every reference-table key: trimmed and lowercased.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Key for province lookups. SVG element ids use hyphens where names use
/// spaces, so both sides are folded the same way (`nueva-ecija` == `Nueva Ecija`).
pub fn province_key(raw: &str) -> String {
    normalize_key(&raw.replace('-', " "))
}

/// Split a comma-separated table cell (`"Tagalog, English"`) into trimmed,
/// non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_trims_and_lowercases() {
        assert_eq!(normalize_key("  Region-III "), "region-iii");
        assert_eq!(normalize_key("NCR"), "ncr");
    }

    #[test]
    fn province_key_folds_hyphens_and_spaces() {
        assert_eq!(province_key("nueva-ecija"), "nueva ecija");
        assert_eq!(province_key("Nueva Ecija"), "nueva ecija");
        assert_eq!(province_key("Tawi-Tawi"), province_key("tawi-tawi"));
    }

    #[test]
    fn split_list_drops_blank_entries() {
        assert_eq!(
            split_list("Tagalog, Kapampangan,, Ilocano "),
            vec!["Tagalog", "Kapampangan", "Ilocano"]
        );
        assert!(split_list("").is_empty());
    }
}
