use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Outline of the whole country: one hoverable group per region.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CountryMap {
    pub view_box: String,
    pub regions: Vec<RegionShape>,
}

/// A region group on the country map. `id` is the lowercase-kebab form of the
/// region code (`ncr`, `region-iii`, `armm`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionShape {
    pub id: String,
    #[serde(default = "default_fill")]
    pub fill: String,
    pub paths: Vec<String>,
}

/// Province-level map of a single region.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionMap {
    pub view_box: String,
    pub provinces: Vec<ProvinceShape>,
}

/// One province outline. `id` is the province name with spaces replaced by
/// hyphens (`nueva-ecija`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceShape {
    pub id: String,
    pub d: String,
}

fn default_fill() -> String {
    "#979797".to_string()
}

impl RegionMap {
    /// Render the map as a standalone SVG document.
    pub fn to_markup(&self) -> String {
        let mut svg = String::with_capacity(128 + self.provinces.len() * 160);
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.2" viewBox="{}">"#,
            escape_attr(&self.view_box)
        );
        for shape in &self.provinces {
            let _ = write!(
                svg,
                r##"<path id="{}" class="province" fill="#b8c4b0" stroke="#ffffff" d="{}"/>"##,
                escape_attr(&shape.id),
                escape_attr(&shape.d)
            );
        }
        svg.push_str("</svg>");
        svg
    }

    pub fn contains(&self, element_id: &str) -> bool {
        self.provinces.iter().any(|shape| shape.id == element_id)
    }
}

fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RegionMap {
        RegionMap {
            view_box: "0 0 400 400".to_string(),
            provinces: vec![
                ProvinceShape {
                    id: "bulacan".to_string(),
                    d: "M0,0 L10,0 L10,10 Z".to_string(),
                },
                ProvinceShape {
                    id: "nueva-ecija".to_string(),
                    d: "M20,20 L30,20 L30,30 Z".to_string(),
                },
            ],
        }
    }

    #[test]
    fn markup_contains_one_path_per_province() {
        let svg = sample().to_markup();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains(r#"id="nueva-ecija""#));
        assert!(svg.contains(r#"viewBox="0 0 400 400""#));
    }

    #[test]
    fn markup_escapes_attribute_values() {
        let map = RegionMap {
            view_box: "0 0 1 1".to_string(),
            provinces: vec![ProvinceShape {
                id: "a\"b".to_string(),
                d: "M0,0 Z".to_string(),
            }],
        };
        assert!(map.to_markup().contains(r#"id="a&quot;b""#));
    }

    #[test]
    fn contains_matches_exact_element_ids() {
        let map = sample();
        assert!(map.contains("bulacan"));
        assert!(!map.contains("Bulacan"));
    }
}
