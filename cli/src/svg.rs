//! SVG snapshot backend
//!
//! Keeps a retained set of circles and labels, mirroring what the browser
//! holds in its DOM, and serializes the current state as an SVG document.
//! Animated transitions become SMIL `<animate>` elements so a snapshot taken
//! right after a step replays the transition when opened in a browser.

use std::collections::BTreeMap;
use std::fmt::Write;

use grievance_core::breakdown::{SliceArc, pie_layout, slice_label};
use grievance_core::layout::Viewport;
use grievance_core::palette::TABLEAU10;
use grievance_core::scene::{Backend, BubbleMark, LabelMark, TooltipContent, Transition};
use grievance_core::timeline::narration::legend_lines;
use grievance_core::{Position, ShelterBreakdown};

const FONT: &str = "Inter, Segoe UI, sans-serif";
const BUBBLE_OPACITY: f64 = 0.85;

#[derive(Debug, Clone, PartialEq)]
struct Circle {
    center: Position,
    radius: f64,
    fill: String,
    stroke: Option<String>,
    /// Radius before the last transition, when it was animated
    animate_from: Option<(f64, u32)>,
    exiting: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
struct Label {
    anchor: Position,
    text: String,
}

/// Element handle: the stable id written as `data-id` into the snapshot.
pub type ElementId = u64;

pub struct SvgBackend {
    viewport: Viewport,
    next_id: ElementId,
    circles: BTreeMap<ElementId, Circle>,
    labels: BTreeMap<ElementId, Label>,
    keys: BTreeMap<ElementId, String>,
    overlay: String,
    active_step: Option<usize>,
    tooltip: Option<TooltipContent>,
    legend: Vec<String>,
}

impl SvgBackend {
    pub fn new(viewport: Viewport, sentinel: &str) -> Self {
        Self {
            viewport,
            next_id: 0,
            circles: BTreeMap::new(),
            labels: BTreeMap::new(),
            keys: BTreeMap::new(),
            overlay: String::new(),
            active_step: None,
            tooltip: None,
            legend: legend_lines(sentinel),
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn overlay(&self) -> &str {
        &self.overlay
    }

    pub fn active_step(&self) -> Option<usize> {
        self.active_step
    }

    pub fn tooltip(&self) -> Option<&TooltipContent> {
        self.tooltip.as_ref()
    }

    /// Live (non-exiting) bubbles as `(id, shelter)`.
    pub fn live_bubbles(&self) -> Vec<(ElementId, &str)> {
        self.circles
            .iter()
            .filter(|(_, c)| c.exiting.is_none())
            .filter_map(|(id, _)| self.keys.get(id).map(|k| (*id, k.as_str())))
            .collect()
    }

    fn allocate(&mut self, key: &str) -> ElementId {
        self.next_id += 1;
        self.keys.insert(self.next_id, key.to_string());
        self.next_id
    }

    /// Serialize the scene as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let w = self.viewport.width;
        let h = self.viewport.height;
        let m = self.viewport.margin;
        let mut svg = String::new();

        let _ = writeln!(
            svg,
            "<svg xmlns='http://www.w3.org/2000/svg' width='{w:.0}' height='{h:.0}' viewBox='0 0 {w:.0} {h:.0}' preserveAspectRatio='xMidYMid meet'>"
        );
        let _ = writeln!(svg, "  <rect width='{w:.0}' height='{h:.0}' fill='#ffffff'/>");
        let _ = writeln!(svg, "  <g transform='translate({:.0},{:.0})'>", m.left, m.top);

        let _ = writeln!(svg, "    <g class='nodes'>");
        for (id, circle) in &self.circles {
            let key = self.keys.get(id).map(String::as_str).unwrap_or_default();
            let stroke = circle
                .stroke
                .as_deref()
                .map(|s| format!(" stroke='{}'", escape_text(s)))
                .unwrap_or_default();
            let (radius, animation) = match (circle.exiting, circle.animate_from) {
                (Some(ms), _) => (0.0, Some((circle.radius, 0.0, ms))),
                (None, Some((from, ms))) => (circle.radius, Some((from, circle.radius, ms))),
                (None, None) => (circle.radius, None),
            };
            match animation {
                Some((from, to, ms)) => {
                    let _ = writeln!(
                        svg,
                        "      <circle data-id='{id}' data-shelter='{}' cx='{:.2}' cy='{:.2}' r='{radius:.2}' fill='{}'{stroke} opacity='{BUBBLE_OPACITY}'>",
                        escape_text(key),
                        circle.center.x,
                        circle.center.y,
                        escape_text(&circle.fill),
                    );
                    let _ = writeln!(
                        svg,
                        "        <animate attributeName='r' from='{from:.2}' to='{to:.2}' dur='{ms}ms' fill='freeze'/>"
                    );
                    let _ = writeln!(svg, "      </circle>");
                }
                None => {
                    let _ = writeln!(
                        svg,
                        "      <circle data-id='{id}' data-shelter='{}' cx='{:.2}' cy='{:.2}' r='{radius:.2}' fill='{}'{stroke} opacity='{BUBBLE_OPACITY}'/>",
                        escape_text(key),
                        circle.center.x,
                        circle.center.y,
                        escape_text(&circle.fill),
                    );
                }
            }
        }
        let _ = writeln!(svg, "    </g>");

        let _ = writeln!(svg, "    <g class='labels'>");
        for label in self.labels.values() {
            let _ = writeln!(
                svg,
                "      <text x='{:.2}' y='{:.2}' text-anchor='middle' font-family='{FONT}' font-size='11' opacity='0.8'>{}</text>",
                label.anchor.x,
                label.anchor.y,
                escape_text(&label.text)
            );
        }
        let _ = writeln!(svg, "    </g>");
        let _ = writeln!(svg, "  </g>");

        let _ = writeln!(
            svg,
            "  <text class='overlay' x='{:.0}' y='{:.0}' font-family='{FONT}' font-size='14' font-weight='600'>{}</text>",
            m.left,
            m.top - 10.0,
            escape_text(&self.overlay)
        );

        for (i, line) in self.legend.iter().enumerate() {
            let _ = writeln!(
                svg,
                "  <text class='legend' x='{:.0}' y='{:.0}' font-family='{FONT}' font-size='10' fill='#555'>{}</text>",
                m.left,
                h - m.bottom + 12.0 + 10.0 * i as f64,
                escape_text(line)
            );
        }

        if let Some(tip) = &self.tooltip {
            let _ = writeln!(
                svg,
                "  <g class='tooltip' transform='translate({:.0},{:.0})'>",
                tip.at.x, tip.at.y
            );
            let _ = writeln!(
                svg,
                "    <rect width='150' height='38' rx='4' fill='#222' opacity='0.9'/>"
            );
            let _ = writeln!(
                svg,
                "    <text x='8' y='16' fill='#fff' font-family='{FONT}' font-size='12' font-weight='700'>{}</text>",
                escape_text(&tip.title)
            );
            let _ = writeln!(
                svg,
                "    <text x='8' y='31' fill='#fff' font-family='{FONT}' font-size='11'>{}</text>",
                escape_text(&tip.detail)
            );
            let _ = writeln!(svg, "  </g>");
        }

        let _ = writeln!(svg, "</svg>");
        svg
    }

    /// Drop elements whose exit transition was already written out.
    fn sweep_exited(&mut self) {
        let exited: Vec<ElementId> = self
            .circles
            .iter()
            .filter(|(_, c)| c.exiting.is_some())
            .map(|(id, _)| *id)
            .collect();
        for id in exited {
            self.circles.remove(&id);
            self.keys.remove(&id);
        }
    }
}

impl Backend for SvgBackend {
    type Bubble = ElementId;
    type Label = ElementId;

    fn enter_bubble(&mut self, mark: &BubbleMark) -> ElementId {
        let id = self.allocate(&mark.key);
        self.circles.insert(
            id,
            Circle {
                center: mark.center,
                radius: 0.0,
                fill: mark.fill.clone(),
                stroke: None,
                animate_from: None,
                exiting: None,
            },
        );
        id
    }

    fn update_bubble(&mut self, bubble: &mut ElementId, mark: &BubbleMark, transition: Transition) {
        let Some(circle) = self.circles.get_mut(bubble) else {
            return;
        };
        circle.animate_from = match transition {
            Transition::Instant => None,
            Transition::Animated { duration_ms } => Some((circle.radius, duration_ms)),
        };
        circle.center = mark.center;
        circle.radius = mark.radius;
        circle.fill = mark.fill.clone();
        circle.stroke = mark.stroke.clone();
    }

    fn exit_bubble(&mut self, bubble: ElementId, duration_ms: u32) {
        if let Some(circle) = self.circles.get_mut(&bubble) {
            circle.exiting = Some(duration_ms);
        }
    }

    fn enter_label(&mut self, mark: &LabelMark) -> ElementId {
        let id = self.allocate(&mark.key);
        self.labels.insert(
            id,
            Label {
                anchor: mark.anchor,
                text: mark.text.clone(),
            },
        );
        id
    }

    fn update_label(&mut self, label: &mut ElementId, mark: &LabelMark) {
        if let Some(l) = self.labels.get_mut(label) {
            l.anchor = mark.anchor;
            l.text = mark.text.clone();
        }
    }

    fn exit_label(&mut self, label: ElementId) {
        self.labels.remove(&label);
        self.keys.remove(&label);
    }

    fn set_overlay(&mut self, text: &str) {
        // A new render starts; previous exits have finished by now
        self.sweep_exited();
        self.overlay = text.to_string();
    }

    fn set_active_step(&mut self, index: usize) {
        self.active_step = Some(index);
    }

    fn show_tooltip(&mut self, tooltip: &TooltipContent) {
        self.tooltip = Some(tooltip.clone());
    }

    fn hide_tooltip(&mut self) {
        self.tooltip = None;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Category Breakdown Grid
// ─────────────────────────────────────────────────────────────────────────────

const PIE_CELL: f64 = 170.0;
const PIE_RADIUS: f64 = 55.0;

fn arc_path(center: Position, radius: f64, arc: &SliceArc) -> String {
    // Angles run clockwise from 12 o'clock
    let point = |angle: f64| {
        Position::new(
            center.x + radius * angle.sin(),
            center.y - radius * angle.cos(),
        )
    };
    if arc.end - arc.start >= std::f64::consts::TAU - 1e-9 {
        // Full circle: two half arcs
        let top = point(0.0);
        let bottom = point(std::f64::consts::PI);
        return format!(
            "M{:.2},{:.2} A{radius:.2},{radius:.2} 0 1 1 {:.2},{:.2} A{radius:.2},{radius:.2} 0 1 1 {:.2},{:.2} Z",
            top.x, top.y, bottom.x, bottom.y, top.x, top.y
        );
    }
    let start = point(arc.start);
    let end = point(arc.end);
    let large = if arc.end - arc.start > std::f64::consts::PI { 1 } else { 0 };
    format!(
        "M{:.2},{:.2} L{:.2},{:.2} A{radius:.2},{radius:.2} 0 {large} 1 {:.2},{:.2} Z",
        center.x, center.y, start.x, start.y, end.x, end.y
    )
}

/// Render one small pie per shelter in a grid `columns` wide.
pub fn breakdown_svg(breakdowns: &[ShelterBreakdown], columns: u32) -> String {
    let columns = columns.max(1) as usize;
    let rows = breakdowns.len().div_ceil(columns).max(1);
    let w = PIE_CELL * columns as f64;
    let h = PIE_CELL * rows as f64;
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w:.0}' height='{h:.0}' viewBox='0 0 {w:.0} {h:.0}'>"
    );
    for (i, breakdown) in breakdowns.iter().enumerate() {
        let col = (i % columns) as f64;
        let row = (i / columns) as f64;
        let center = Position::new(
            col * PIE_CELL + PIE_CELL / 2.0,
            row * PIE_CELL + PIE_CELL / 2.0 + 8.0,
        );
        let _ = writeln!(svg, "  <g class='pie' data-shelter='{}'>", escape_text(&breakdown.shelter));
        let _ = writeln!(
            svg,
            "    <text x='{:.2}' y='{:.2}' text-anchor='middle' font-family='{FONT}' font-size='11' font-weight='600'>{}</text>",
            center.x,
            center.y - PIE_RADIUS - 8.0,
            escape_text(&breakdown.shelter)
        );
        for (j, (slice, arc)) in breakdown.slices.iter().zip(pie_layout(breakdown)).enumerate() {
            let _ = writeln!(
                svg,
                "    <path d='{}' fill='{}' stroke='#fff' stroke-width='1'><title>{}</title></path>",
                arc_path(center, PIE_RADIUS, &arc),
                TABLEAU10[j % TABLEAU10.len()],
                escape_text(&slice_label(slice))
            );
        }
        let _ = writeln!(svg, "  </g>");
    }
    let _ = writeln!(svg, "</svg>");
    svg
}

fn escape_text(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use grievance_core::scene::{Renderer, Scene};
    use grievance_core::{Frame, Margin, ShelterNode, VizConfig, aggregate, compute_positions};
    use grievance_core::{CategorySlice, RawRecord};

    fn viewport() -> Viewport {
        Viewport {
            width: 800.0,
            height: 600.0,
            margin: Margin::default(),
        }
    }

    fn frames() -> (grievance_core::Timeline, grievance_core::PositionMap) {
        let d = |m| NaiveDate::from_ymd_opt(2021, m, 1).unwrap();
        let timeline = aggregate(
            &[
                RawRecord::new("Shelter A", d(1), 5.0),
                RawRecord::new("Shelter B", d(1), 3.0),
                RawRecord::new("Shelter A", d(2), 2.0),
                RawRecord::new("Shelter <C>", d(3), 4.0),
            ],
            "Daley College",
        );
        let positions =
            compute_positions(&timeline.registry, &viewport(), &VizConfig::default().layout);
        (timeline, positions)
    }

    fn renderer(timeline: &grievance_core::Timeline) -> Renderer<SvgBackend> {
        Renderer::for_timeline(
            SvgBackend::new(viewport(), "Daley College"),
            timeline,
            &VizConfig::default().scene,
        )
    }

    #[test]
    fn test_snapshot_contains_bubbles_labels_and_overlay() {
        let (timeline, positions) = frames();
        let mut r = renderer(&timeline);
        r.render(0, &timeline.frames[0], &positions, Transition::Instant);

        let svg = r.backend().to_svg();
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("data-shelter='Shelter A'"));
        assert!(svg.contains(">Shelter B</text>"));
        assert!(svg.contains("Period: Jan 01, 2021"));
        assert!(!svg.contains("<animate"));
    }

    #[test]
    fn test_element_ids_survive_consecutive_renders() {
        let (timeline, positions) = frames();
        let mut r = renderer(&timeline);
        r.render(0, &timeline.frames[0], &positions, Transition::Instant);
        let before = r.backend().live_bubbles();
        let a_id = before.iter().find(|(_, k)| *k == "Shelter A").unwrap().0;

        r.render(1, &timeline.frames[1], &positions, Transition::Animated { duration_ms: 600 });
        let after = r.backend().live_bubbles();
        assert!(after.contains(&(a_id, "Shelter A")));

        let svg = r.backend().to_svg();
        assert!(svg.contains("dur='600ms'"));
        assert_eq!(r.backend().active_step(), Some(1));
    }

    #[test]
    fn test_exiting_bubbles_shrink_then_disappear() {
        let (timeline, positions) = frames();
        let mut r = renderer(&timeline);
        r.render(2, &timeline.frames[2], &positions, Transition::Instant);
        r.render(0, &timeline.frames[0], &positions, Transition::Animated { duration_ms: 600 });

        let svg = r.backend().to_svg();
        assert!(svg.contains("to='0.00' dur='200ms'"));
        assert_eq!(r.backend().live_bubbles().len(), 2);

        r.render(0, &timeline.frames[0], &positions, Transition::Instant);
        assert_eq!(r.backend().to_svg().matches("<circle").count(), 2);
    }

    #[test]
    fn test_text_is_escaped() {
        let (timeline, positions) = frames();
        let mut r = renderer(&timeline);
        r.render(2, &timeline.frames[2], &positions, Transition::Instant);
        let svg = r.backend().to_svg();
        assert!(svg.contains("Shelter &lt;C&gt;"));
        assert!(!svg.contains("Shelter <C>"));
    }

    #[test]
    fn test_tooltip_rendered_when_shown() {
        let mut backend = SvgBackend::new(viewport(), "Daley College");
        backend.set_overlay("Period: x");
        let frame = Frame {
            period: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            period_sum: 1.0,
            cumulative_sum: 1.0,
            nodes: vec![ShelterNode::new("A", 1.0)],
        };
        let mut r = Renderer::new(
            backend,
            grievance_core::MagnitudeScale::new(1.0, 4.0, 55.0),
            grievance_core::Palette::default(),
            VizConfig::default().scene,
            grievance_core::scene::shelter_key,
        );
        let positions: grievance_core::PositionMap =
            [("A".to_string(), Position::new(10.0, 10.0))].into_iter().collect();
        r.render(0, &frame, &positions, Transition::Instant);
        r.show_tooltip("A", Position::new(5.0, 5.0));
        let svg = r.backend().to_svg();
        assert!(svg.contains("class='tooltip' transform='translate(17,17)'"));
        assert!(svg.contains(">Cumulative: 1</text>"));

        r.hide_tooltip();
        assert!(!r.backend().to_svg().contains("class='tooltip'"));
    }

    #[test]
    fn test_breakdown_grid() {
        let breakdowns = vec![
            ShelterBreakdown {
                shelter: "A".into(),
                slices: vec![
                    CategorySlice { category: "Food".into(), value: 3.0 },
                    CategorySlice { category: "Safety".into(), value: 1.0 },
                ],
                total: 4.0,
            },
            ShelterBreakdown {
                shelter: "B".into(),
                slices: vec![CategorySlice { category: "Food".into(), value: 2.0 }],
                total: 2.0,
            },
        ];
        let svg = breakdown_svg(&breakdowns, 4);
        assert_eq!(svg.matches("class='pie'").count(), 2);
        assert_eq!(svg.matches("<path").count(), 3);
        assert!(svg.contains("<title>Food: 3</title>"));
        assert!(svg.contains("width='680'"));
    }
}
