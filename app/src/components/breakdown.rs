//! Category Breakdown Grid
//!
//! One ECharts pie per shelter from the summary dataset. Built once when the
//! summary arrives; independent of the scrolling timeline.

use dioxus::prelude::*;
use grievance_core::ShelterBreakdown;
use grievance_core::palette::TABLEAU10;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::interop::{init_chart, resize_chart, set, set_chart_option};

fn chart_id(index: usize) -> String {
    format!("pie-{index}")
}

fn build_pie_option(breakdown: &ShelterBreakdown) -> JsValue {
    let obj = js_sys::Object::new();

    // Title
    let title = js_sys::Object::new();
    set(&title, "text", &JsValue::from_str(&breakdown.shelter));
    set(&title, "left", &JsValue::from_str("center"));
    set(&title, "top", &JsValue::from_str("5"));
    let title_style = js_sys::Object::new();
    set(&title_style, "fontSize", &JsValue::from_f64(12.0));
    set(&title_style, "fontWeight", &JsValue::from_str("600"));
    set(&title, "textStyle", &title_style);
    set(&obj, "title", &title);

    // Tooltip: "Category: value"
    let tooltip = js_sys::Object::new();
    set(&tooltip, "trigger", &JsValue::from_str("item"));
    set(&tooltip, "formatter", &JsValue::from_str("{b}: {c}"));
    set(&obj, "tooltip", &tooltip);

    // Series (full pie)
    let series = js_sys::Object::new();
    set(&series, "type", &JsValue::from_str("pie"));
    set(&series, "radius", &JsValue::from_str("60%"));
    set(&series, "center", &{
        let arr = js_sys::Array::new();
        arr.push(&JsValue::from_str("50%"));
        arr.push(&JsValue::from_str("58%"));
        arr.into()
    });
    let label = js_sys::Object::new();
    set(&label, "show", &JsValue::FALSE);
    set(&series, "label", &label);
    let item_style = js_sys::Object::new();
    set(&item_style, "borderColor", &JsValue::from_str("#fff"));
    set(&item_style, "borderWidth", &JsValue::from_f64(1.0));
    set(&series, "itemStyle", &item_style);

    // Colors follow category order
    let colors = js_sys::Array::new();
    for color in TABLEAU10 {
        colors.push(&JsValue::from_str(color));
    }
    set(&obj, "color", &colors);

    let data = js_sys::Array::new();
    for slice in &breakdown.slices {
        let item = js_sys::Object::new();
        set(&item, "name", &JsValue::from_str(&slice.category));
        set(&item, "value", &JsValue::from_f64(slice.value));
        data.push(&item);
    }
    set(&series, "data", &data);

    let series_arr = js_sys::Array::new();
    series_arr.push(&series);
    set(&obj, "series", &series_arr);

    obj.into()
}

fn resize_all_pies(count: usize) {
    for i in 0..count {
        if let Some(chart) = init_chart(&chart_id(i)) {
            resize_chart(&chart);
        }
    }
}

#[component]
pub fn BreakdownGrid(breakdowns: Signal<Vec<ShelterBreakdown>>) -> Element {
    // Draw pies once the grid cells exist
    use_effect(move || {
        let data = breakdowns.read().clone();
        if data.is_empty() {
            return;
        }
        spawn(async move {
            // Small delay to ensure DOM is ready
            gloo_timers::future::TimeoutFuture::new(50).await;
            for (i, breakdown) in data.iter().enumerate() {
                if let Some(chart) = init_chart(&chart_id(i)) {
                    set_chart_option(&chart, &build_pie_option(breakdown));
                }
            }
            tracing::debug!(pies = data.len(), "Drew category breakdowns");
        });
    });

    // Window resize listener for the pies
    use_effect(move || {
        let closure = Closure::wrap(Box::new(move || {
            resize_all_pies(breakdowns.peek().len());
        }) as Box<dyn Fn()>);

        if let Some(window) = web_sys::window() {
            let _ =
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        }

        closure.forget();
    });

    let data = breakdowns.read().clone();

    rsx! {
        section { id: "category-breakdown", class: "breakdown",
            if data.is_empty() {
                p { class: "breakdown-empty", "No category breakdown available." }
            } else {
                div { class: "pie-grid",
                    for (i, breakdown) in data.iter().enumerate() {
                        div {
                            key: "{breakdown.shelter}",
                            id: chart_id(i),
                            class: "pie-cell",
                        }
                    }
                }
            }
        }
    }
}
