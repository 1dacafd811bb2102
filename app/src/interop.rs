//! Browser interop
//!
//! wasm-bindgen bindings for the two JS libraries the page loads (scrollama
//! and ECharts) plus small fetch and page helpers.

use grievance_core::{VizConfig, parse_step_index};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

// ─────────────────────────────────────────────────────────────────────────────
// Scrollama
// ─────────────────────────────────────────────────────────────────────────────

#[wasm_bindgen]
extern "C" {
    /// A scrollama instance; every builder method returns the instance.
    pub type Scroller;

    #[wasm_bindgen(catch, js_name = scrollama)]
    fn scrollama() -> Result<Scroller, JsValue>;

    #[wasm_bindgen(method)]
    fn setup(this: &Scroller, options: &JsValue) -> Scroller;

    #[wasm_bindgen(method, js_name = onStepEnter)]
    fn on_step_enter(this: &Scroller, handler: &Closure<dyn FnMut(JsValue)>) -> Scroller;

    #[wasm_bindgen(method)]
    pub fn resize(this: &Scroller);
}

/// Attribute on each step element naming the frame it shows.
const STEP_INDEX_ATTR: &str = "data-index";

/// Frame index carried by the step element of a scrollama response.
///
/// Steps without a valid non-negative integer index are ignored.
fn step_index(response: &JsValue) -> Option<usize> {
    js_sys::Reflect::get(response, &JsValue::from_str("element"))
        .ok()?
        .dyn_into::<web_sys::Element>()
        .ok()?
        .get_attribute(STEP_INDEX_ATTR)
        .as_deref()
        .and_then(parse_step_index)
}

/// Observe `step_selector` elements and call `handler` with the index of the
/// step that crosses `offset` (fraction of the viewport height).
///
/// Returns `None` when scrollama is not on the page.
pub fn observe_steps(
    step_selector: &str,
    offset: f64,
    mut handler: impl FnMut(usize) + 'static,
) -> Option<Scroller> {
    let scroller = match scrollama() {
        Ok(scroller) => scroller,
        Err(e) => {
            tracing::error!(error = ?e, "scrollama is not available");
            return None;
        }
    };

    let options = js_sys::Object::new();
    set(&options, "step", &JsValue::from_str(step_selector));
    set(&options, "offset", &JsValue::from_f64(offset));

    let callback = Closure::wrap(Box::new(move |response: JsValue| match step_index(&response) {
        Some(index) => handler(index),
        None => tracing::warn!("Step entered without a usable index"),
    }) as Box<dyn FnMut(JsValue)>);

    scroller.setup(&options).on_step_enter(&callback);
    // Lives as long as the page
    callback.forget();
    Some(scroller)
}

// ─────────────────────────────────────────────────────────────────────────────
// ECharts
// ─────────────────────────────────────────────────────────────────────────────

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = echarts, js_name = init)]
    fn echarts_init(dom: &web_sys::Element) -> JsValue;

    #[wasm_bindgen(js_namespace = echarts, js_name = getInstanceByDom)]
    fn echarts_get_instance(dom: &web_sys::Element) -> JsValue;
}

pub fn init_chart(element_id: &str) -> Option<JsValue> {
    let window = web_sys::window()?;
    let document = window.document()?;
    let element = document.get_element_by_id(element_id)?;

    // Check if instance already exists
    let existing = echarts_get_instance(&element);
    if !existing.is_null() && !existing.is_undefined() {
        return Some(existing);
    }

    Some(echarts_init(&element))
}

fn call_method(target: &JsValue, name: &str, arg: Option<&JsValue>) {
    let method = js_sys::Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok());

    if let Some(func) = method {
        let _ = match arg {
            Some(arg) => func.call1(target, arg),
            None => func.call0(target),
        };
    }
}

pub fn set_chart_option(chart: &JsValue, option: &JsValue) {
    call_method(chart, "setOption", Some(option));
}

pub fn resize_chart(chart: &JsValue) {
    call_method(chart, "resize", None);
}

/// Set `key` on a JS object, ignoring failures on frozen objects.
pub fn set(target: &JsValue, key: &str, value: &JsValue) {
    let _ = js_sys::Reflect::set(target, &JsValue::from_str(key), value);
}

// ─────────────────────────────────────────────────────────────────────────────
// Page
// ─────────────────────────────────────────────────────────────────────────────

/// Fetch a same-origin text resource.
pub async fn fetch_text(url: &str) -> Result<String, String> {
    let window = web_sys::window().ok_or("no window")?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| format!("request for {url} failed: {e:?}"))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| format!("unexpected response for {url}"))?;
    if !response.ok() {
        return Err(format!("{url}: HTTP {}", response.status()));
    }
    let text = response
        .text()
        .map_err(|e| format!("{url}: {e:?}"))?;
    JsFuture::from(text)
        .await
        .map_err(|e| format!("{url}: {e:?}"))?
        .as_string()
        .ok_or_else(|| format!("{url}: body is not text"))
}

/// Config embedded by the host page as `window.GRIEVANCE_CONFIG`, if any.
pub fn page_config() -> VizConfig {
    let Some(window) = web_sys::window() else {
        return VizConfig::default();
    };
    let value = js_sys::Reflect::get(&window, &JsValue::from_str("GRIEVANCE_CONFIG"))
        .unwrap_or(JsValue::UNDEFINED);
    if value.is_undefined() || value.is_null() {
        return VizConfig::default();
    }
    match serde_wasm_bindgen::from_value::<VizConfig>(value) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid GRIEVANCE_CONFIG, using defaults");
            VizConfig::default()
        }
    }
}

pub fn window_size() -> (f64, f64) {
    web_sys::window()
        .map(|w| {
            let width = w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let height = w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            (width, height)
        })
        .unwrap_or((0.0, 0.0))
}
