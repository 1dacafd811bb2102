//! SVG DOM backend for the scene renderer
//!
//! Circles and labels are real SVG elements; the element handle itself is the
//! continuity token the renderer keeps per shelter. Geometry is written as CSS
//! properties so the browser interpolates `r`, `cx` and `cy` between steps.

use gloo_timers::callback::Timeout;
use grievance_core::scene::{Backend, BubbleMark, LabelMark, TooltipContent, Transition};
use grievance_core::{Margin, Viewport};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const BUBBLE_OPACITY: f64 = 0.85;
pub const ACTIVE_STEP_CLASS: &str = "is-active";
pub const KEY_ATTR: &str = "data-key";

/// DOM anchors the backend draws into.
pub struct WebBackend {
    document: Document,
    svg: Element,
    plot: Element,
    nodes: Element,
    labels: Element,
    overlay: Element,
    tooltip: HtmlElement,
    tooltip_title: Element,
    tooltip_detail: Element,
    steps: Vec<Element>,
}

fn create(document: &Document, tag: &str) -> Result<Element, String> {
    document
        .create_element_ns(Some(SVG_NS), tag)
        .map_err(|e| format!("create <{tag}>: {e:?}"))
}

impl WebBackend {
    /// Build the chart skeleton inside `container`.
    ///
    /// `overlay` and `tooltip` are regular HTML elements owned by the page;
    /// `steps` are the narrative step elements, in index order.
    pub fn mount(
        document: Document,
        container: &Element,
        overlay: Element,
        tooltip: HtmlElement,
        steps: Vec<Element>,
        viewport: &Viewport,
    ) -> Result<Self, String> {
        let svg = create(&document, "svg")?;
        let _ = svg.set_attribute("id", "viz");
        let _ = svg.set_attribute("preserveAspectRatio", "xMidYMid meet");
        let plot = create(&document, "g")?;
        let nodes = create(&document, "g")?;
        let _ = nodes.set_attribute("class", "nodes");
        let labels = create(&document, "g")?;
        let _ = labels.set_attribute("class", "labels");

        let _ = plot.append_child(&nodes);
        let _ = plot.append_child(&labels);
        let _ = svg.append_child(&plot);
        container
            .append_child(&svg)
            .map_err(|e| format!("mount svg: {e:?}"))?;

        tooltip.set_inner_html("");
        let tooltip_title = document
            .create_element("strong")
            .map_err(|e| format!("{e:?}"))?;
        let line_break = document.create_element("br").map_err(|e| format!("{e:?}"))?;
        let tooltip_detail = document
            .create_element("span")
            .map_err(|e| format!("{e:?}"))?;
        let _ = tooltip.append_child(&tooltip_title);
        let _ = tooltip.append_child(&line_break);
        let _ = tooltip.append_child(&tooltip_detail);

        let mut backend = Self {
            document,
            svg,
            plot,
            nodes,
            labels,
            overlay,
            tooltip,
            tooltip_title,
            tooltip_detail,
            steps,
        };
        backend.set_size(viewport);
        backend.hide_tooltip();
        Ok(backend)
    }

    /// Match the drawing surface to a new viewport.
    pub fn set_size(&mut self, viewport: &Viewport) {
        let Margin { top, left, .. } = viewport.margin;
        let _ = self.svg.set_attribute(
            "viewBox",
            &format!("0 0 {} {}", viewport.width, viewport.height),
        );
        let _ = self
            .plot
            .set_attribute("transform", &format!("translate({left},{top})"));
    }

    pub fn svg(&self) -> &Element {
        &self.svg
    }

    fn style_bubble(circle: &Element, mark: &BubbleMark, duration_ms: u32) {
        let stroke = match &mark.stroke {
            Some(color) => format!("stroke:{color};stroke-width:1px;"),
            None => "stroke:none;".to_string(),
        };
        let _ = circle.set_attribute(
            "style",
            &format!(
                "cx:{:.2}px;cy:{:.2}px;r:{:.2}px;fill:{};{stroke}opacity:{BUBBLE_OPACITY};\
                 transition:cx {d}ms,cy {d}ms,r {d}ms,fill {d}ms",
                mark.center.x,
                mark.center.y,
                mark.radius,
                mark.fill,
                d = duration_ms
            ),
        );
    }
}

impl Backend for WebBackend {
    // None when the element could not be created; the join still tracks it
    type Bubble = Option<Element>;
    type Label = Option<Element>;

    fn enter_bubble(&mut self, mark: &BubbleMark) -> Option<Element> {
        let circle = create(&self.document, "circle")
            .inspect_err(|e| tracing::error!(error = %e, "Failed to create bubble"))
            .ok()?;
        let _ = circle.set_attribute(KEY_ATTR, &mark.key);
        let _ = circle.set_attribute("class", "node");
        let _ = circle.set_attribute(
            "style",
            &format!(
                "cx:{:.2}px;cy:{:.2}px;r:0px;fill:{}",
                mark.center.x, mark.center.y, mark.fill
            ),
        );
        let _ = self.nodes.append_child(&circle);
        // Flush style so the first update grows from r = 0
        let _ = circle.get_bounding_client_rect();
        Some(circle)
    }

    fn update_bubble(
        &mut self,
        bubble: &mut Option<Element>,
        mark: &BubbleMark,
        transition: Transition,
    ) {
        if let Some(circle) = bubble {
            Self::style_bubble(circle, mark, transition.duration_ms());
        }
    }

    fn exit_bubble(&mut self, bubble: Option<Element>, duration_ms: u32) {
        let Some(circle) = bubble else {
            return;
        };
        // No longer hoverable while it shrinks
        let _ = circle.remove_attribute(KEY_ATTR);
        let style = circle.get_attribute("style").unwrap_or_default();
        let _ = circle.set_attribute(
            "style",
            &format!("{style};r:0px;transition:r {duration_ms}ms"),
        );
        Timeout::new(duration_ms, move || circle.remove()).forget();
    }

    fn enter_label(&mut self, _mark: &LabelMark) -> Option<Element> {
        let label = create(&self.document, "text")
            .inspect_err(|e| tracing::error!(error = %e, "Failed to create label"))
            .ok()?;
        let _ = label.set_attribute("class", "label");
        let _ = label.set_attribute("text-anchor", "middle");
        let _ = label.set_attribute("font-size", "11");
        let _ = self.labels.append_child(&label);
        Some(label)
    }

    fn update_label(&mut self, label: &mut Option<Element>, mark: &LabelMark) {
        if let Some(label) = label {
            let _ = label.set_attribute("x", &format!("{:.2}", mark.anchor.x));
            let _ = label.set_attribute("y", &format!("{:.2}", mark.anchor.y));
            label.set_text_content(Some(&mark.text));
        }
    }

    fn exit_label(&mut self, label: Option<Element>) {
        if let Some(label) = label {
            label.remove();
        }
    }

    fn set_overlay(&mut self, text: &str) {
        self.overlay.set_text_content(Some(text));
    }

    fn set_active_step(&mut self, index: usize) {
        for (i, step) in self.steps.iter().enumerate() {
            let _ = step
                .class_list()
                .toggle_with_force(ACTIVE_STEP_CLASS, i == index);
        }
    }

    fn show_tooltip(&mut self, tooltip: &TooltipContent) {
        self.tooltip_title.set_text_content(Some(&tooltip.title));
        self.tooltip_detail.set_text_content(Some(&tooltip.detail));
        let style = self.tooltip.style();
        let _ = style.set_property("left", &format!("{}px", tooltip.at.x));
        let _ = style.set_property("top", &format!("{}px", tooltip.at.y));
        let _ = style.set_property("opacity", "1");
    }

    fn hide_tooltip(&mut self) {
        let _ = self.tooltip.style().set_property("opacity", "0");
    }
}

/// Shelter key of the bubble under a pointer event, if any.
pub fn bubble_key(target: Option<web_sys::EventTarget>) -> Option<String> {
    target?
        .dyn_into::<Element>()
        .ok()?
        .get_attribute(KEY_ATTR)
}
