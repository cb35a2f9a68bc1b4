use lakbay_shared::ReferenceData;
use leptos::prelude::*;

use crate::modal::{ModalState, RegionModal, open_region_in};

/// Cursor position relative to the map container's bounding box.
fn relative_position(container: NodeRef<leptos::html::Div>, ev: &web_sys::MouseEvent) -> (f64, f64) {
    let (left, top) = container
        .get_untracked()
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            (rect.left(), rect.top())
        })
        .unwrap_or((0.0, 0.0));
    (f64::from(ev.client_x()) - left, f64::from(ev.client_y()) - top)
}

/// Full-country map, one `<g>` per region. Hover callbacks receive the group
/// id and container-relative coordinates; a click opens the region modal.
#[component]
pub(crate) fn PhilippinesMap(
    on_hover: Callback<(String, f64, f64)>,
    on_leave: Callback<()>,
) -> impl IntoView {
    let data = ReferenceData::embedded();
    let modal = RwSignal::new(ModalState::default());
    let container = NodeRef::<leptos::html::Div>::new();
    let country = data.country_map();

    let regions = country
        .regions
        .iter()
        .map(|shape| {
            let enter_id = shape.id.clone();
            let move_id = shape.id.clone();
            let click_id = shape.id.clone();
            view! {
                <g
                    id=shape.id.clone()
                    class="region"
                    fill=shape.fill.clone()
                    on:mouseenter=move |ev| {
                        let (x, y) = relative_position(container, &ev);
                        on_hover.run((enter_id.clone(), x, y));
                    }
                    on:mousemove=move |ev| {
                        let (x, y) = relative_position(container, &ev);
                        on_hover.run((move_id.clone(), x, y));
                    }
                    on:mouseleave=move |_| on_leave.run(())
                    on:click=move |_| {
                        if !open_region_in(modal, &click_id, data) {
                            web_sys::console::info_1(&format!("no detail for region {click_id}").into());
                        }
                    }
                >
                    {shape
                        .paths
                        .iter()
                        .map(|d| view! { <path d=d.clone() /> })
                        .collect_view()}
                </g>
            }
        })
        .collect_view();

    view! {
        <div node_ref=container class="country-map" style="position: relative; width: 100%;">
            <svg
                xmlns="http://www.w3.org/2000/svg"
                viewBox=country.view_box.clone()
                stroke="#ffffff"
                stroke-width="1"
                style="width: 100%; height: auto; display: block;"
            >
                {regions}
            </svg>
        </div>
        <RegionModal modal=modal />
    }
}
