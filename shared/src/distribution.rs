/// Bar colours, assigned in entry order and reused once exhausted.
pub const BAR_PALETTE: [&str; 15] = [
    "#3498db", "#e74c3c", "#2ecc71", "#9b59b6", "#f39c12", "#1abc9c", "#e67e22", "#6a1b9a",
    "#d35400", "#27ae60", "#8e44ad", "#c0392b", "#16a085", "#f1c40f", "#34495e",
];

/// Bars narrower than this only show their percentage.
pub const LABEL_THRESHOLD: f64 = 15.0;
const MAX_LABEL_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionBar {
    pub language: String,
    /// Text drawn inside the bar, possibly truncated.
    pub label: String,
    pub percentage: f64,
    pub width_percent: f64,
    pub show_label: bool,
    pub color: &'static str,
}

impl DistributionBar {
    pub fn percent_text(&self) -> String {
        format!("{}%", self.percentage)
    }
}

/// Parse `"Tagalog:70%, Kapampangan:20%"` into one bar per well-formed entry.
/// Entries without a language or a numeric percentage are skipped. Labels are
/// shortened in the region view, where the list is longer.
pub fn parse_distribution(raw: &str, province_view: bool) -> Vec<DistributionBar> {
    raw.split(',')
        .filter_map(parse_entry)
        .enumerate()
        .map(|(idx, (language, percentage))| {
            let label = if province_view {
                language.clone()
            } else {
                truncate_label(&language)
            };
            DistributionBar {
                label,
                width_percent: percentage.clamp(0.0, 100.0),
                show_label: percentage >= LABEL_THRESHOLD,
                color: BAR_PALETTE[idx % BAR_PALETTE.len()],
                language,
                percentage,
            }
        })
        .collect()
}

fn parse_entry(entry: &str) -> Option<(String, f64)> {
    let (language, percentage) = entry.split_once(':')?;
    let language = language.trim();
    if language.is_empty() {
        return None;
    }
    let percentage: f64 = percentage.trim().trim_end_matches('%').trim().parse().ok()?;
    if !percentage.is_finite() {
        return None;
    }
    Some((language.to_string(), percentage))
}

fn truncate_label(language: &str) -> String {
    if language.chars().count() <= MAX_LABEL_CHARS {
        return language.to_string();
    }
    let head: String = language.chars().take(MAX_LABEL_CHARS).collect();
    format!("{head}...")
}
