use crate::reference::ReferenceData;

/// One heading in the "Language Resources" / "Popular Phrases" panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSection {
    pub language: String,
    pub entries: Vec<String>,
}

/// One section per spoken language, in the order given. Languages without any
/// resource still get an empty section.
pub fn resource_sections(languages: &[String], data: &ReferenceData) -> Vec<LanguageSection> {
    languages
        .iter()
        .map(|language| {
            let matches = data.resources_for(language);
            LanguageSection {
                language: matches
                    .first()
                    .map_or_else(|| language.clone(), |entry| entry.language.clone()),
                entries: matches.iter().map(|entry| entry.resource.clone()).collect(),
            }
        })
        .collect()
}

pub fn phrase_sections(languages: &[String], data: &ReferenceData) -> Vec<LanguageSection> {
    languages
        .iter()
        .map(|language| {
            let matches = data.phrases_for(language);
            LanguageSection {
                language: matches
                    .first()
                    .map_or_else(|| language.clone(), |entry| entry.language.clone()),
                entries: matches
                    .iter()
                    .map(|entry| {
                        format!(
                            "{} ({}) - {} (English)",
                            entry.phrase, entry.language, entry.translation
                        )
                    })
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sections_follow_spoken_language_order() {
        let data = ReferenceData::embedded();
        let sections = resource_sections(&langs(&["kapampangan", "Tagalog"]), data);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].language, "Kapampangan");
        assert_eq!(sections[1].language, "Tagalog");
        assert_eq!(sections[1].entries.len(), 2);
    }

    #[test]
    fn languages_without_entries_keep_an_empty_section() {
        let data = ReferenceData::embedded();
        let sections = phrase_sections(&langs(&["Sambal"]), data);
        assert_eq!(
            sections,
            vec![LanguageSection {
                language: "Sambal".to_string(),
                entries: Vec::new(),
            }]
        );
    }

    #[test]
    fn phrase_lines_name_both_languages() {
        let data = ReferenceData::embedded();
        let sections = phrase_sections(&langs(&["Tagalog"]), data);
        assert_eq!(sections[0].entries.len(), 3);
        assert!(
            sections[0]
                .entries
                .iter()
                .all(|line| line.contains("(Tagalog) - ") && line.ends_with("(English)"))
        );
    }
}
