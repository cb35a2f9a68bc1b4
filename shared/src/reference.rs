use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::{normalize_key, province_key};
use crate::region_map::{CountryMap, RegionMap};

const REGIONS_JSON: &str = include_str!("../data/regions.json");
const PROVINCES_JSON: &str = include_str!("../data/provinces.json");
const REGION_MAPS_JSON: &str = include_str!("../data/region_maps.json");
const COUNTRY_MAP_JSON: &str = include_str!("../data/country_map.json");
const LANGUAGES_JSON: &str = include_str!("../data/languages.json");
const PHRASES_JSON: &str = include_str!("../data/phrases.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegionRecord {
    /// Short code, unique across the table (`NCR`, `Region-III`).
    pub region: String,
    pub name: String,
    pub short_info: String,
    /// Millions of inhabitants.
    pub population: f64,
    pub land_area: String,
    pub languages_spoken: String,
    /// `"Tagalog:62%, Kapampangan:22%"`.
    pub population_distribution: String,
    pub major_dialects: String,
    pub language_resources: String,
}

/// Province row. Everything but the name is optional so the detail panel can
/// fall back to the region value field by field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProvinceRecord {
    pub province: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_distribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popular_literature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lit_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageResource {
    pub language: String,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phrase {
    pub language: String,
    pub phrase: String,
    pub translation: String,
}

/// The raw tables, in the shape served by `/api/reference`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub regions: Vec<RegionRecord>,
    pub provinces: Vec<ProvinceRecord>,
    pub region_maps: BTreeMap<String, RegionMap>,
    pub country_map: CountryMap,
    pub languages: Vec<LanguageResource>,
    pub phrases: Vec<Phrase>,
}

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("failed to parse {table} table: {source}")]
    Parse {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate key {key:?} in {table} table")]
    DuplicateKey { table: &'static str, key: String },
}

/// Reference tables plus key indexes built once at load time.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    tables: ReferenceTables,
    regions_by_key: HashMap<String, usize>,
    provinces_by_key: HashMap<String, usize>,
    maps_by_key: HashMap<String, String>,
    resources_by_language: HashMap<String, Vec<usize>>,
    phrases_by_language: HashMap<String, Vec<usize>>,
}

static EMBEDDED: LazyLock<ReferenceData> =
    LazyLock::new(|| ReferenceData::load_embedded().unwrap_or_default());

impl ReferenceData {
    /// Tables compiled into the binary. A table that fails to parse leaves the
    /// catalog empty: every lookup misses and the UI renders without data.
    pub fn embedded() -> &'static ReferenceData {
        &EMBEDDED
    }

    pub fn load_embedded() -> Result<Self, ReferenceError> {
        Self::from_json(
            REGIONS_JSON,
            PROVINCES_JSON,
            REGION_MAPS_JSON,
            COUNTRY_MAP_JSON,
            LANGUAGES_JSON,
            PHRASES_JSON,
        )
    }

    pub fn from_json(
        regions: &str,
        provinces: &str,
        region_maps: &str,
        country_map: &str,
        languages: &str,
        phrases: &str,
    ) -> Result<Self, ReferenceError> {
        let tables = ReferenceTables {
            regions: parse_table("regions", regions)?,
            provinces: parse_table("provinces", provinces)?,
            region_maps: parse_table("region_maps", region_maps)?,
            country_map: parse_table("country_map", country_map)?,
            languages: parse_table("languages", languages)?,
            phrases: parse_table("phrases", phrases)?,
        };
        Self::from_tables(tables)
    }

    pub fn from_tables(tables: ReferenceTables) -> Result<Self, ReferenceError> {
        let mut regions_by_key = HashMap::with_capacity(tables.regions.len());
        for (idx, record) in tables.regions.iter().enumerate() {
            let key = normalize_key(&record.region);
            if regions_by_key.insert(key.clone(), idx).is_some() {
                return Err(ReferenceError::DuplicateKey {
                    table: "regions",
                    key,
                });
            }
        }

        let mut provinces_by_key = HashMap::with_capacity(tables.provinces.len());
        for (idx, record) in tables.provinces.iter().enumerate() {
            let key = province_key(&record.province);
            if provinces_by_key.insert(key.clone(), idx).is_some() {
                return Err(ReferenceError::DuplicateKey {
                    table: "provinces",
                    key,
                });
            }
        }

        let mut maps_by_key = HashMap::with_capacity(tables.region_maps.len());
        for code in tables.region_maps.keys() {
            let key = normalize_key(code);
            if maps_by_key.insert(key.clone(), code.clone()).is_some() {
                return Err(ReferenceError::DuplicateKey {
                    table: "region_maps",
                    key,
                });
            }
        }

        let mut resources_by_language: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, entry) in tables.languages.iter().enumerate() {
            resources_by_language
                .entry(normalize_key(&entry.language))
                .or_default()
                .push(idx);
        }

        let mut phrases_by_language: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, entry) in tables.phrases.iter().enumerate() {
            phrases_by_language
                .entry(normalize_key(&entry.language))
                .or_default()
                .push(idx);
        }

        Ok(Self {
            tables,
            regions_by_key,
            provinces_by_key,
            maps_by_key,
            resources_by_language,
            phrases_by_language,
        })
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    pub fn regions(&self) -> &[RegionRecord] {
        &self.tables.regions
    }

    pub fn country_map(&self) -> &CountryMap {
        &self.tables.country_map
    }

    /// Look up a region by code or by its map group id (`Region-III`, `region-iii`).
    pub fn region(&self, code: &str) -> Option<&RegionRecord> {
        let idx = self.regions_by_key.get(&normalize_key(code))?;
        self.tables.regions.get(*idx)
    }

    /// Look up a province by name. Hyphens count as spaces, so `Tawi-Tawi`
    /// and `tawi tawi` are the same key.
    pub fn province(&self, name: &str) -> Option<&ProvinceRecord> {
        let idx = self.provinces_by_key.get(&province_key(name))?;
        self.tables.provinces.get(*idx)
    }

    /// Resolve a clicked path's element id (`nueva-ecija`). Empty ids never match.
    pub fn province_for_element(&self, element_id: &str) -> Option<&ProvinceRecord> {
        if element_id.trim().is_empty() {
            return None;
        }
        self.province(element_id)
    }

    pub fn region_map(&self, code: &str) -> Option<&RegionMap> {
        let original = self.maps_by_key.get(&normalize_key(code))?;
        self.tables.region_maps.get(original)
    }

    pub fn resources_for(&self, language: &str) -> Vec<&LanguageResource> {
        self.resources_by_language
            .get(&normalize_key(language))
            .map(|indexes| {
                indexes
                    .iter()
                    .filter_map(|idx| self.tables.languages.get(*idx))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn phrases_for(&self, language: &str) -> Vec<&Phrase> {
        self.phrases_by_language
            .get(&normalize_key(language))
            .map(|indexes| {
                indexes
                    .iter()
                    .filter_map(|idx| self.tables.phrases.get(*idx))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_table<T: serde::de::DeserializeOwned>(
    table: &'static str,
    json: &str,
) -> Result<T, ReferenceError> {
    serde_json::from_str(json).map_err(|source| ReferenceError::Parse { table, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(code: &str) -> RegionRecord {
        RegionRecord {
            region: code.to_string(),
            name: format!("{code} name"),
            short_info: String::new(),
            population: 1.0,
            land_area: "1".to_string(),
            languages_spoken: "Tagalog".to_string(),
            population_distribution: "Tagalog:100%".to_string(),
            major_dialects: String::new(),
            language_resources: String::new(),
        }
    }

    #[test]
    fn embedded_tables_parse() {
        let data = ReferenceData::load_embedded().expect("embedded reference data should parse");
        assert_eq!(data.regions().len(), 17);
        assert_eq!(data.country_map().regions.len(), 17);
        assert!(!data.tables().provinces.is_empty());
    }

    #[test]
    fn every_country_region_resolves_to_at_most_one_row() {
        let data = ReferenceData::load_embedded().expect("embedded reference data should parse");
        for shape in &data.country_map().regions {
            let matches = data
                .regions()
                .iter()
                .filter(|r| normalize_key(&r.region) == normalize_key(&shape.id))
                .count();
            assert!(matches <= 1, "{} matched {matches} rows", shape.id);
            assert!(data.region(&shape.id).is_some(), "{} has no row", shape.id);
        }
    }

    #[test]
    fn every_region_map_has_a_region_row() {
        let data = ReferenceData::load_embedded().expect("embedded reference data should parse");
        for code in data.tables().region_maps.keys() {
            assert!(data.region(code).is_some(), "{code} has no region row");
        }
    }

    #[test]
    fn every_province_row_names_a_known_region_and_map_path() {
        let data = ReferenceData::load_embedded().expect("embedded reference data should parse");
        for province in &data.tables().provinces {
            let code = province.region.as_deref().expect("province rows carry a region");
            let map = data.region_map(code).expect("province region has a map");
            assert!(
                map.provinces
                    .iter()
                    .any(|shape| province_key(&shape.id) == province_key(&province.province)),
                "{} is not drawn on the {code} map",
                province.province
            );
        }
    }

    #[test]
    fn every_drawn_province_has_a_row() {
        let data = ReferenceData::load_embedded().expect("embedded reference data should parse");
        let missing: Vec<&str> = data
            .tables()
            .region_maps
            .values()
            .flat_map(|map| &map.provinces)
            .filter(|shape| data.province_for_element(&shape.id).is_none())
            .map(|shape| shape.id.as_str())
            .collect();
        assert!(missing.is_empty(), "paths without a province row: {missing:?}");
    }

    #[test]
    fn lookups_are_case_and_whitespace_insensitive() {
        let data = ReferenceData::embedded();
        let by_code = data.region(" Region-III ").expect("region by code");
        let by_id = data.region("region-iii").expect("region by map id");
        assert_eq!(by_code, by_id);
        assert_eq!(by_code.name, "Central Luzon");

        let province = data
            .province_for_element("nueva-ecija")
            .expect("province by element id");
        assert_eq!(province.province, "Nueva Ecija");
        assert_eq!(data.province("TAWI-TAWI").map(|p| p.province.as_str()), Some("Tawi-Tawi"));
        assert!(data.region_map("region-iii").is_some());
    }

    #[test]
    fn unknown_keys_miss_without_panicking() {
        let data = ReferenceData::embedded();
        assert!(data.region("region-xx").is_none());
        assert!(data.province("atlantis").is_none());
        assert!(data.province_for_element("  ").is_none());
        assert!(data.region_map("").is_none());
        assert!(data.resources_for("Klingon").is_empty());
    }

    #[test]
    fn language_lookups_group_all_matching_rows() {
        let data = ReferenceData::embedded();
        let tagalog = data.resources_for("tagalog");
        assert_eq!(tagalog.len(), 2);
        assert!(tagalog.iter().all(|r| r.language == "Tagalog"));
        assert_eq!(data.phrases_for("TAGALOG").len(), 3);
    }

    #[test]
    fn duplicate_region_codes_are_rejected() {
        let tables = ReferenceTables {
            regions: vec![region("NCR"), region(" ncr")],
            ..ReferenceTables::default()
        };
        let err = ReferenceData::from_tables(tables).expect_err("duplicate should fail");
        assert!(matches!(
            err,
            ReferenceError::DuplicateKey { table: "regions", ref key } if key == "ncr"
        ));
    }

    #[test]
    fn malformed_json_names_the_table() {
        let err = ReferenceData::from_json("[]", "{", "{}", "{}", "[]", "[]")
            .expect_err("bad provinces json should fail");
        assert!(err.to_string().contains("provinces"));
    }
}
