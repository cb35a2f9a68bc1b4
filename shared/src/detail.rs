use crate::distribution::{DistributionBar, parse_distribution};
use crate::normalize::split_list;
use crate::reference::{ProvinceRecord, ReferenceData, RegionRecord};

pub const LITERATURE_LABEL: &str = "Popular Literature";
pub const DIALECTS_LABEL: &str = "Major Dialects";

/// Everything the modal's detail panel shows, resolved once per render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailView {
    /// Region code shown as the heading.
    pub title: String,
    /// Capital of the selected province, without the word "City".
    pub subtitle: Option<String>,
    pub province_name: Option<String>,
    pub short_info: String,
    pub languages: Vec<String>,
    pub population: String,
    pub land_area: String,
    pub fourth_label: &'static str,
    pub fourth_value: String,
    pub lit_address: Option<String>,
    pub distribution: Vec<DistributionBar>,
}

impl DetailView {
    pub fn is_province(&self) -> bool {
        self.province_name.is_some()
    }
}

/// Merge a region row with an optional selected province. Each field takes the
/// province value when the province has one and falls back to the region
/// value otherwise.
pub fn resolve_detail(region: &RegionRecord, province: Option<&ProvinceRecord>) -> DetailView {
    let pick = |field: Option<&String>, fallback: &str| -> String {
        field
            .filter(|value| !value.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    };

    let short_info = pick(province.and_then(|p| p.short_info.as_ref()), &region.short_info);
    let languages = pick(
        province.and_then(|p| p.languages.as_ref()),
        &region.languages_spoken,
    );
    let land_area = pick(province.and_then(|p| p.land_area.as_ref()), &region.land_area);
    let distribution = pick(
        province.and_then(|p| p.population_distribution.as_ref()),
        &region.population_distribution,
    );
    let fourth_value = pick(
        province.and_then(|p| p.popular_literature.as_ref()),
        &region.major_dialects,
    );
    let population = province
        .and_then(|p| p.population)
        .unwrap_or(region.population);

    DetailView {
        title: region.region.clone(),
        subtitle: province
            .and_then(|p| p.capital.as_deref())
            .map(strip_city)
            .filter(|capital| !capital.is_empty()),
        province_name: province.map(|p| p.province.clone()),
        short_info,
        languages: split_list(&languages),
        population: format_population(population),
        land_area,
        fourth_label: if province.is_some() {
            LITERATURE_LABEL
        } else {
            DIALECTS_LABEL
        },
        fourth_value,
        lit_address: province
            .and_then(|p| p.lit_address.clone())
            .filter(|address| !address.trim().is_empty()),
        distribution: parse_distribution(&distribution, province.is_some()),
    }
}

fn strip_city(capital: &str) -> String {
    capital.replace("City", "").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Population in millions, e.g. `13.48 million`. Trailing zeros are dropped.
pub fn format_population(millions: f64) -> String {
    if !millions.is_finite() || millions <= 0.0 {
        return "Unknown".to_string();
    }
    let rounded = format!("{millions:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} million")
}

/// Data fields of the hover tooltip. Fields stay empty when the hovered id has
/// no region row; the panel itself is still rendered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TooltipView {
    pub region_name: String,
    pub title: Option<String>,
    pub land_area: Option<String>,
    pub languages: Vec<String>,
}

pub fn tooltip_view(region_id: &str, data: &ReferenceData) -> TooltipView {
    let Some(region) = data.region(region_id) else {
        return TooltipView {
            region_name: region_id.to_string(),
            ..TooltipView::default()
        };
    };
    TooltipView {
        region_name: region_id.to_string(),
        title: Some(region.name.clone()),
        land_area: Some(region.land_area.clone()),
        languages: split_list(&region.languages_spoken),
    }
}
