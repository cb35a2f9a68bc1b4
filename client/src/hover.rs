use lakbay_shared::{ReferenceData, tooltip_view};
use leptos::prelude::*;

/// Tooltip state owned by the home page. Leaving a region only closes the
/// panel; the last region and position stay so the fade-out has content.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct HoverState {
    pub region_name: String,
    pub x: f64,
    pub y: f64,
    pub is_open: bool,
}

impl HoverState {
    pub(crate) fn enter(&mut self, region: &str, x: f64, y: f64) {
        self.region_name = region.to_string();
        self.x = x;
        self.y = y;
        self.is_open = true;
    }

    pub(crate) fn leave(&mut self) {
        self.is_open = false;
    }

    /// CSS `left`/`top` for the tooltip panel, anchored at the cursor.
    pub(crate) fn position_css(&self) -> (String, String) {
        (format!("{}px", self.x), format!("{}px", self.y))
    }
}

/// Floating region summary. Always mounted; visibility follows `is_open`.
#[component]
pub(crate) fn Tooltip(hover: RwSignal<HoverState>) -> impl IntoView {
    let view_data = Memo::new(move |_| {
        let region = hover.with(|h| h.region_name.clone());
        tooltip_view(&region, ReferenceData::embedded())
    });

    view! {
        <div
            class="region-tooltip"
            style:left=move || hover.with(|h| h.position_css().0)
            style:top=move || hover.with(|h| h.position_css().1)
            style:opacity=move || if hover.with(|h| h.is_open) { "1" } else { "0" }
            style:visibility=move || if hover.with(|h| h.is_open) { "visible" } else { "hidden" }
            style="position: absolute; pointer-events: none; z-index: 20; min-width: 180px; max-width: 260px; background: #ffffff; border: 1px solid #d9dfd3; border-radius: 8px; box-shadow: 0 6px 18px rgba(0,0,0,0.18); padding: 10px 12px; transition: opacity 0.15s ease, visibility 0.15s ease;"
        >
            {move || {
                let tip = view_data.get();
                view! {
                    <div style="font-size: 0.72rem; letter-spacing: 0.04em; text-transform: uppercase; color: #6b7a63;">
                        {tip.region_name.clone()}
                    </div>
                    <div style="font-size: 0.95rem; font-weight: 700; color: #1f2a1b; margin-top: 2px;">
                        {tip.title.clone().unwrap_or_default()}
                    </div>
                    {tip.land_area.clone().map(|area| view! {
                        <div style="font-size: 0.75rem; color: #4a5444; margin-top: 4px;">
                            "Land area: " {area} " km\u{00B2}"
                        </div>
                    })}
                    <div style="display: flex; flex-wrap: wrap; gap: 4px; margin-top: 6px;">
                        {tip
                            .languages
                            .into_iter()
                            .map(|language| view! {
                                <span class="language-chip" style="font-size: 0.68rem; padding: 2px 8px; border-radius: 999px; background: #eef3e8; color: #2f4a24;">
                                    {language}
                                </span>
                            })
                            .collect_view()}
                    </div>
                }
            }}
        </div>
    }
}
