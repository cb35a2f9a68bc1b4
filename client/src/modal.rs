use lakbay_shared::{
    DetailView, DistributionBar, LanguageSection, ReferenceData, phrase_sections, province_key,
    resolve_detail, resource_sections, split_list,
};
use leptos::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectedProvince {
    pub element_id: String,
    pub province_key: String,
}

/// Region modal state, owned by the map component.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) enum ModalState {
    #[default]
    Closed,
    Open {
        region_code: String,
        selected_province: Option<SelectedProvince>,
        /// Click position relative to the modal map container.
        pin: Option<(f64, f64)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModalPhase {
    Closed,
    RegionOpen,
    ProvinceSelected,
}

impl ModalState {
    /// Opens the modal for a clicked region group. A region needs both a
    /// province map and a data row; otherwise the click changes nothing.
    pub(crate) fn open_region(&mut self, region_id: &str, data: &ReferenceData) -> bool {
        let (Some(region), Some(_)) = (data.region(region_id), data.region_map(region_id)) else {
            return false;
        };
        *self = ModalState::Open {
            region_code: region.region.clone(),
            selected_province: None,
            pin: None,
        };
        true
    }

    /// Selects a province path of the open region's map. Targets that are not
    /// part of the map or have no province row are ignored.
    pub(crate) fn select_province(
        &mut self,
        element_id: &str,
        at: (f64, f64),
        data: &ReferenceData,
    ) -> bool {
        let ModalState::Open {
            region_code,
            selected_province,
            pin,
        } = self
        else {
            return false;
        };
        let in_map = data
            .region_map(region_code)
            .is_some_and(|map| map.contains(element_id));
        if !in_map || data.province_for_element(element_id).is_none() {
            return false;
        }
        *selected_province = Some(SelectedProvince {
            element_id: element_id.to_string(),
            province_key: province_key(element_id),
        });
        *pin = Some(at);
        true
    }

    pub(crate) fn close(&mut self) {
        *self = ModalState::Closed;
    }

    pub(crate) fn phase(&self) -> ModalPhase {
        match self {
            ModalState::Closed => ModalPhase::Closed,
            ModalState::Open {
                selected_province: None,
                ..
            } => ModalPhase::RegionOpen,
            ModalState::Open {
                selected_province: Some(_),
                ..
            } => ModalPhase::ProvinceSelected,
        }
    }

    pub(crate) fn region_code(&self) -> Option<&str> {
        match self {
            ModalState::Open { region_code, .. } => Some(region_code),
            ModalState::Closed => None,
        }
    }

    pub(crate) fn selected_element_id(&self) -> Option<&str> {
        match self {
            ModalState::Open {
                selected_province: Some(selected),
                ..
            } => Some(&selected.element_id),
            _ => None,
        }
    }

    pub(crate) fn pin(&self) -> Option<(f64, f64)> {
        match self {
            ModalState::Open { pin, .. } => *pin,
            ModalState::Closed => None,
        }
    }

    /// Resolved detail panel for the current selection.
    pub(crate) fn detail(&self, data: &ReferenceData) -> Option<DetailView> {
        let ModalState::Open {
            region_code,
            selected_province,
            ..
        } = self
        else {
            return None;
        };
        let region = data.region(region_code)?;
        let province = selected_province
            .as_ref()
            .and_then(|selected| data.province(&selected.province_key));
        Some(resolve_detail(region, province))
    }
}

/// Applies a region click to the signal, notifying only when it opened.
pub(crate) fn open_region_in(
    modal: RwSignal<ModalState>,
    region_id: &str,
    data: &ReferenceData,
) -> bool {
    let mut opened = false;
    modal.maybe_update(|m| {
        opened = m.open_region(region_id, data);
        opened
    });
    opened
}

/// Applies a province click to the signal. Ignored targets leave subscribers
/// untouched so the open panels keep their state.
pub(crate) fn select_province_in(
    modal: RwSignal<ModalState>,
    element_id: &str,
    at: (f64, f64),
    data: &ReferenceData,
) -> bool {
    let mut selected = false;
    modal.maybe_update(|m| {
        selected = m.select_province(element_id, at, data);
        selected
    });
    selected
}

/// CSS for one distribution bar. Each bar sits on its own full-width track,
/// so widths are relative to the track and never compete with siblings.
pub(crate) fn bar_fill_style(bar: &DistributionBar) -> String {
    format!("width: {}%; background: {};", bar.width_percent, bar.color)
}

#[component]
pub(crate) fn RegionModal(modal: RwSignal<ModalState>) -> impl IntoView {
    let data = ReferenceData::embedded();
    let region_code = Memo::new(move |_| modal.with(|m| m.region_code().map(str::to_owned)));

    move || {
        let Some(code) = region_code.get() else {
            return ().into_any();
        };
        let Some(map) = data.region_map(&code) else {
            return ().into_any();
        };
        let map_ref = NodeRef::<leptos::html::Div>::new();
        let detail = Memo::new(move |_| modal.with(|m| m.detail(data)));
        let selected = Memo::new(move |_| modal.with(|m| m.selected_element_id().map(str::to_owned)));
        let pin = Memo::new(move |_| modal.with(ModalState::pin));
        let region_open = Memo::new(move |_| modal.with(|m| m.phase() == ModalPhase::RegionOpen));

        let provinces = map
            .provinces
            .iter()
            .map(|shape| {
                let id = shape.id.clone();
                let click_id = shape.id.clone();
                let is_selected = move || selected.with(|s| s.as_deref() == Some(id.as_str()));
                view! {
                    <path
                        id=shape.id.clone()
                        class="province"
                        class:selected=is_selected
                        d=shape.d.clone()
                        on:click=move |ev: web_sys::MouseEvent| {
                            let Some(container) = map_ref.get_untracked() else {
                                return;
                            };
                            let rect = container.get_bounding_client_rect();
                            let at = (
                                f64::from(ev.client_x()) - rect.left(),
                                f64::from(ev.client_y()) - rect.top(),
                            );
                            select_province_in(modal, &click_id, at, data);
                        }
                    />
                }
            })
            .collect_view();

        view! {
            <div
                class="modal-backdrop"
                style="position: fixed; inset: 0; z-index: 50; background: rgba(16,24,12,0.55); display: flex; align-items: center; justify-content: center; padding: 24px;"
                on:click=move |_| modal.update(ModalState::close)
            >
                <div
                    class="region-modal"
                    style="position: relative; display: flex; flex-wrap: wrap; gap: 20px; max-width: 980px; width: 100%; max-height: 90vh; overflow-y: auto; background: #fbfcf8; border-radius: 12px; padding: 20px; box-shadow: 0 12px 40px rgba(0,0,0,0.3);"
                    on:click=|ev| ev.stop_propagation()
                >
                    <button
                        class="modal-close"
                        title="Close"
                        style="position: absolute; top: 10px; right: 12px; border: none; background: none; font-size: 1.4rem; cursor: pointer; color: #4a5444;"
                        on:click=move |_| modal.update(ModalState::close)
                    >
                        "\u{00D7}"
                    </button>
                    <div
                        node_ref=map_ref
                        class="modal-map"
                        style="position: relative; flex: 1 1 320px; min-width: 280px;"
                    >
                        <svg
                            xmlns="http://www.w3.org/2000/svg"
                            viewBox=map.view_box.clone()
                            style="width: 100%; height: auto; display: block;"
                        >
                            {provinces}
                        </svg>
                        {move || pin.get().map(|(x, y)| view! {
                            <div
                                class="province-pin"
                                style:left=format!("{x}px")
                                style:top=format!("{y}px")
                                style="position: absolute; width: 14px; height: 14px; margin: -14px 0 0 -7px; border-radius: 50% 50% 50% 0; transform: rotate(-45deg); background: #c0392b; border: 2px solid #ffffff; pointer-events: none;"
                            />
                        })}
                    </div>
                    <div style="flex: 1 1 320px; min-width: 280px;">
                        {move || detail.get().map(|detail| view! { <DetailPanel detail=detail /> })}
                        {move || {
                            if !region_open.get() {
                                return ().into_any();
                            }
                            let languages = data
                                .region(&code)
                                .map(|region| split_list(&region.languages_spoken))
                                .unwrap_or_default();
                            view! { <LanguagePanels languages=languages /> }.into_any()
                        }}
                    </div>
                </div>
            </div>
        }
        .into_any()
    }
}

#[component]
fn DetailPanel(detail: DetailView) -> impl IntoView {
    let DetailView {
        title,
        subtitle,
        province_name,
        short_info,
        languages,
        population,
        land_area,
        fourth_label,
        fourth_value,
        lit_address,
        distribution,
    } = detail;

    view! {
        <div class="detail-panel">
            <h2 style="margin: 0; font-size: 1.4rem; color: #1f2a1b;">{title}</h2>
            {subtitle.map(|capital| view! {
                <div style="font-size: 0.85rem; color: #6b7a63; margin-top: 2px;">{capital}</div>
            })}
            {province_name.map(|name| view! {
                <div style="font-size: 1rem; font-weight: 600; color: #2f4a24; margin-top: 6px;">{name}</div>
            })}
            <p style="font-size: 0.88rem; line-height: 1.5; color: #333d2e;">{short_info}</p>
            <DetailRow label="Languages Spoken" value=languages.join(", ") />
            <DetailRow label="Population" value=population />
            <DetailRow label="Land Area" value=format!("{land_area} km\u{00B2}") />
            <DetailRow label=fourth_label value=fourth_value />
            {lit_address.map(|address| view! {
                <div style="font-size: 0.78rem; margin: 4px 0 8px;">
                    <a href=address.clone() target="_blank" rel="noopener noreferrer" style="color: #2f6b8a;">
                        {address.clone()}
                    </a>
                </div>
            })}
            <DistributionBars bars=distribution />
        </div>
    }
}

#[component]
fn DetailRow(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div style="display: flex; gap: 10px; padding: 5px 0; border-top: 1px solid #e3e8dd; font-size: 0.82rem;">
            <span style="min-width: 140px; color: #6b7a63;">{label}</span>
            <span style="color: #1f2a1b;">{value}</span>
        </div>
    }
}

#[component]
fn DistributionBars(bars: Vec<DistributionBar>) -> impl IntoView {
    if bars.is_empty() {
        return ().into_any();
    }
    view! {
        <div class="distribution" style="margin-top: 12px;">
            <div style="font-size: 0.78rem; color: #6b7a63; margin-bottom: 4px;">"Population Distribution"</div>
            {bars
                .into_iter()
                .map(|bar| {
                    let title = format!("{}: {}", bar.language, bar.percent_text());
                    let label = if bar.show_label {
                        format!("{} {}", bar.label, bar.percent_text())
                    } else {
                        bar.percent_text()
                    };
                    let fill = bar_fill_style(&bar);
                    view! {
                        <div
                            class="distribution-row"
                            title=title
                            style="display: flex; align-items: center; gap: 8px; margin-bottom: 3px;"
                        >
                            <div style="flex: 1 1 auto; height: 16px; border-radius: 4px; overflow: hidden; background: #eef0ea;">
                                <div
                                    class="distribution-bar"
                                    style=format!("height: 100%; flex-shrink: 0; {fill}")
                                />
                            </div>
                            <span style="flex: 0 0 auto; min-width: 90px; white-space: nowrap; font-size: 0.68rem; color: #333d2e;">
                                {label}
                            </span>
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
    .into_any()
}

/// "Language Resources" and "Popular Phrases". Each opens independently and
/// only computes its sections while open.
#[component]
fn LanguagePanels(languages: Vec<String>) -> impl IntoView {
    let data = ReferenceData::embedded();
    let resources_open = RwSignal::new(false);
    let phrases_open = RwSignal::new(false);
    let resource_languages = languages.clone();
    let phrase_languages = languages;

    view! {
        <Collapsible title="Language Resources" open=resources_open>
            {move || {
                resources_open.get().then(|| {
                    view! { <SectionList sections=resource_sections(&resource_languages, data) links=true /> }
                })
            }}
        </Collapsible>
        <Collapsible title="Popular Phrases" open=phrases_open>
            {move || {
                phrases_open.get().then(|| {
                    view! { <SectionList sections=phrase_sections(&phrase_languages, data) links=false /> }
                })
            }}
        </Collapsible>
    }
}

#[component]
fn Collapsible(title: &'static str, open: RwSignal<bool>, children: Children) -> impl IntoView {
    view! {
        <div class="collapsible" style="margin-top: 12px; border: 1px solid #e3e8dd; border-radius: 6px;">
            <button
                style="width: 100%; display: flex; justify-content: space-between; padding: 8px 10px; background: #f1f5ec; border: none; cursor: pointer; font-size: 0.85rem; color: #1f2a1b;"
                on:click=move |_| open.update(|v| *v = !*v)
            >
                <span>{title}</span>
                <span>{move || if open.get() { "\u{25B4}" } else { "\u{25BE}" }}</span>
            </button>
            <div style="padding: 0 10px;">{children()}</div>
        </div>
    }
}

#[component]
fn SectionList(sections: Vec<LanguageSection>, links: bool) -> impl IntoView {
    sections
        .into_iter()
        .map(|section| {
            view! {
                <div class="language-section" style="padding: 6px 0;">
                    <div style="font-size: 0.8rem; font-weight: 600; color: #2f4a24;">{section.language}</div>
                    <ul style="margin: 4px 0 0; padding-left: 18px; font-size: 0.78rem; color: #333d2e;">
                        {section
                            .entries
                            .into_iter()
                            .map(|entry| {
                                if links {
                                    view! {
                                        <li>
                                            <a href=entry.clone() target="_blank" rel="noopener noreferrer" style="color: #2f6b8a;">{entry.clone()}</a>
                                        </li>
                                    }
                                    .into_any()
                                } else {
                                    view! { <li>{entry}</li> }.into_any()
                                }
                            })
                            .collect_view()}
                    </ul>
                </div>
            }
        })
        .collect_view()
}
