use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use grievance_core::{
    LayoutConfig, Position, Renderer, ScrollCoordinator, ShelterBreakdown, StepText, Timeline,
    Viewport, VizConfig, aggregate, parse_breakdowns, parse_grievances, step_texts,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, MouseEvent};

use crate::components::{BreakdownGrid, Legend};
use crate::interop::{self, Scroller};
use crate::scene::{WebBackend, bubble_key};

static CSS: Asset = asset!("/assets/styles.css");

const STEP_SELECTOR: &str = "#steps .step";
/// Shown in place of the chart when the primary dataset cannot be used.
const EMPTY_STATE: &str = "Unable to load grievance data";

type Session = ScrollCoordinator<Renderer<WebBackend>>;
/// Shared by the scroll, resize and pointer callbacks.
type SharedSession = Rc<RefCell<Option<Session>>>;

#[derive(Debug, Clone, PartialEq)]
enum TimelineState {
    Loading,
    Failed,
    Ready {
        steps: Vec<StepText>,
        timeline: Timeline,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Timeline Mounting
// ─────────────────────────────────────────────────────────────────────────────

fn current_viewport(container: &Element, layout: &LayoutConfig) -> Viewport {
    let width = container.get_bounding_client_rect().width();
    let (_, window_height) = interop::window_size();
    Viewport::from_container(width, window_height, layout)
}

fn step_elements(document: &Document) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(STEP_SELECTOR) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Show the tooltip for the bubble under the pointer, hide it elsewhere.
fn bind_pointer(svg: &Element, shared: &SharedSession) {
    let on_pointer = {
        let shared = shared.clone();
        Closure::wrap(Box::new(move |event: MouseEvent| {
            let mut guard = shared.borrow_mut();
            let Some(session) = guard.as_mut() else {
                return;
            };
            match bubble_key(event.target()) {
                Some(shelter) => {
                    let pointer = Position::new(event.client_x() as f64, event.client_y() as f64);
                    session.hover(&shelter, pointer);
                }
                None => session.leave(),
            }
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    let on_leave = {
        let shared = shared.clone();
        Closure::wrap(Box::new(move |_: MouseEvent| {
            if let Some(session) = shared.borrow_mut().as_mut() {
                session.leave();
            }
        }) as Box<dyn FnMut(MouseEvent)>)
    };

    // pointerdown covers taps on touch screens
    for name in ["pointermove", "pointerdown"] {
        let _ = svg.add_event_listener_with_callback(name, on_pointer.as_ref().unchecked_ref());
    }
    let _ = svg.add_event_listener_with_callback("pointerleave", on_leave.as_ref().unchecked_ref());
    on_pointer.forget();
    on_leave.forget();
}

/// Recompute slots and redraw the current frame when the window resizes.
fn bind_resize(
    window: &web_sys::Window,
    container: Element,
    layout: LayoutConfig,
    shared: &SharedSession,
    scroller: Option<Scroller>,
) {
    let shared = shared.clone();
    let closure = Closure::wrap(Box::new(move || {
        let viewport = current_viewport(&container, &layout);
        if let Some(session) = shared.borrow_mut().as_mut() {
            session.scene_mut().backend_mut().set_size(&viewport);
            session.on_resize(viewport);
        }
        if let Some(scroller) = &scroller {
            scroller.resize();
        }
    }) as Box<dyn FnMut()>);

    let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Build the scene for a loaded timeline and hook up scroll, resize and
/// pointer handling. Runs once, after the steps are in the DOM.
fn mount_timeline(
    timeline: Timeline,
    config: &VizConfig,
    shared: &SharedSession,
) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let find = |id: &str| {
        document
            .get_element_by_id(id)
            .ok_or_else(|| format!("missing #{id}"))
    };
    let container = find("graphic")?;
    let overlay = find("overlay-period")?;
    let tooltip: HtmlElement = find("tooltip")?
        .dyn_into()
        .map_err(|_| "#tooltip is not an HTML element".to_string())?;
    let steps = step_elements(&document);

    let viewport = current_viewport(&container, &config.layout);
    let backend = WebBackend::mount(
        document.clone(),
        &container,
        overlay,
        tooltip,
        steps,
        &viewport,
    )?;
    let svg = backend.svg().clone();
    let renderer = Renderer::for_timeline(backend, &timeline, &config.scene);

    let mut coordinator = ScrollCoordinator::new(timeline, viewport, config, renderer);
    coordinator.init();
    let (window_width, _) = interop::window_size();
    let offset = coordinator.step_offset(window_width);
    tracing::info!(
        frames = coordinator.timeline().len(),
        shelters = coordinator.positions().len(),
        offset,
        "Timeline mounted"
    );
    *shared.borrow_mut() = Some(coordinator);

    bind_pointer(&svg, shared);
    let scroller = {
        let shared = shared.clone();
        interop::observe_steps(STEP_SELECTOR, offset, move |index| {
            if let Some(session) = shared.borrow_mut().as_mut() {
                session.on_step_enter(index);
            }
        })
    };
    bind_resize(&window, container, config.layout.clone(), shared, scroller);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Main App Component
// ─────────────────────────────────────────────────────────────────────────────

#[component]
pub fn App() -> dioxus::prelude::Element {
    let config = use_hook(interop::page_config);
    let mut state = use_signal(|| TimelineState::Loading);
    let mut breakdowns = use_signal(Vec::<ShelterBreakdown>::new);
    let session: SharedSession = use_hook(|| Rc::new(RefCell::new(None)));

    // Primary dataset: the timeline and its steps
    let primary_url = config.data.grievances.clone();
    let sentinel = config.sentinel.clone();
    use_future(move || {
        let url = primary_url.clone();
        let sentinel = sentinel.clone();
        async move {
            let loaded = interop::fetch_text(&url)
                .await
                .and_then(|text| parse_grievances(&text).map_err(|e| e.to_string()));
            match loaded {
                Ok((records, report)) => {
                    let timeline = aggregate(&records, &sentinel);
                    tracing::info!(
                        rows = report.rows_read,
                        dropped = report.dropped(),
                        frames = timeline.len(),
                        "Loaded grievance timeline"
                    );
                    if timeline.is_empty() {
                        state.set(TimelineState::Failed);
                    } else {
                        state.set(TimelineState::Ready {
                            steps: step_texts(&timeline),
                            timeline,
                        });
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load grievances");
                    state.set(TimelineState::Failed);
                }
            }
        }
    });

    // Summary dataset: independent of the timeline
    let summary_url = config.data.summary.clone();
    use_future(move || {
        let url = summary_url.clone();
        async move {
            let loaded = interop::fetch_text(&url)
                .await
                .and_then(|text| parse_breakdowns(&text).map_err(|e| e.to_string()));
            match loaded {
                Ok(data) => breakdowns.set(data),
                Err(e) => tracing::error!(error = %e, "Failed to load category summary"),
            }
        }
    });

    // Mount the scene once the steps have rendered
    {
        let session = session.clone();
        let config = config.clone();
        use_effect(move || {
            let timeline = match &*state.read() {
                TimelineState::Ready { timeline, .. } => timeline.clone(),
                _ => return,
            };
            if session.borrow().is_some() {
                return;
            }
            let session = session.clone();
            let config = config.clone();
            spawn(async move {
                // Small delay to ensure DOM is ready
                gloo_timers::future::TimeoutFuture::new(50).await;
                if session.borrow().is_some() {
                    return;
                }
                if let Err(e) = mount_timeline(timeline, &config, &session) {
                    tracing::error!(error = %e, "Failed to mount timeline");
                }
            });
        });
    }

    let current = state.read().clone();
    let body = match &current {
        TimelineState::Loading => rsx! {
            p { class: "loading", "Loading grievance data…" }
        },
        TimelineState::Failed => rsx! {
            div { class: "empty-state", "{EMPTY_STATE}" }
        },
        TimelineState::Ready { steps, .. } => rsx! {
            section { id: "scrolly-periods", class: "scrolly",
                div { id: "graphic", class: "graphic",
                    div { id: "overlay-period", class: "overlay-period" }
                    Legend { sentinel: config.sentinel.clone() }
                }
                div { id: "steps", class: "steps",
                    for (i, step) in steps.iter().enumerate() {
                        div { key: "{i}", class: "step", "data-index": "{i}",
                            h3 { "{step.heading}" }
                            p { "{step.body}" }
                        }
                    }
                }
            }
            div { id: "tooltip", class: "tooltip" }
        },
    };

    rsx! {
        link { rel: "stylesheet", href: CSS }
        main { class: "page",
            header { class: "intro",
                h1 { "Grievances Across Emergency Shelters" }
                p { "Scroll through each reporting period to watch cumulative grievances grow shelter by shelter." }
            }
            {body}
            h2 { "What the grievances were about" }
            BreakdownGrid { breakdowns }
        }
    }
}
