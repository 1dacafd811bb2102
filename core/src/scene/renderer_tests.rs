//! Tests for the keyed scene renderer
//!
//! A recording backend hands out numbered element tokens so continuity across
//! renders can be checked directly.

use chrono::NaiveDate;

use grievance_types::{Frame, Margin, Position, SceneConfig, ShelterNode, VizConfig};

use super::{Backend, BubbleMark, LabelMark, Renderer, Scene, TooltipContent, Transition};
use crate::coordinator::ScrollCoordinator;
use crate::layout::{PositionMap, Viewport};
use crate::palette::{Palette, TABLEAU10};
use crate::records::RawRecord;
use crate::scale::MagnitudeScale;
use crate::timeline::aggregate;

#[derive(Debug, Clone, PartialEq)]
enum Op {
    EnterBubble { key: String, token: u64 },
    UpdateBubble {
        token: u64,
        radius: f64,
        fill: String,
        stroke: Option<String>,
        duration_ms: u32,
    },
    ExitBubble { token: u64, duration_ms: u32 },
    EnterLabel { key: String, anchor: Position },
    UpdateLabel { token: u64, anchor: Position },
    ExitLabel { token: u64 },
}

#[derive(Default)]
struct RecordingBackend {
    next_token: u64,
    ops: Vec<Op>,
    overlay: String,
    active_step: Option<usize>,
    tooltip: Option<TooltipContent>,
}

impl RecordingBackend {
    fn take_ops(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.ops)
    }
}

impl Backend for RecordingBackend {
    type Bubble = u64;
    type Label = u64;

    fn enter_bubble(&mut self, mark: &BubbleMark) -> u64 {
        self.next_token += 1;
        self.ops.push(Op::EnterBubble {
            key: mark.key.clone(),
            token: self.next_token,
        });
        self.next_token
    }

    fn update_bubble(&mut self, bubble: &mut u64, mark: &BubbleMark, transition: Transition) {
        self.ops.push(Op::UpdateBubble {
            token: *bubble,
            radius: mark.radius,
            fill: mark.fill.clone(),
            stroke: mark.stroke.clone(),
            duration_ms: transition.duration_ms(),
        });
    }

    fn exit_bubble(&mut self, bubble: u64, duration_ms: u32) {
        self.ops.push(Op::ExitBubble {
            token: bubble,
            duration_ms,
        });
    }

    fn enter_label(&mut self, mark: &LabelMark) -> u64 {
        self.next_token += 1;
        self.ops.push(Op::EnterLabel {
            key: mark.key.clone(),
            anchor: mark.anchor,
        });
        self.next_token
    }

    fn update_label(&mut self, label: &mut u64, mark: &LabelMark) {
        self.ops.push(Op::UpdateLabel {
            token: *label,
            anchor: mark.anchor,
        });
    }

    fn exit_label(&mut self, label: u64) {
        self.ops.push(Op::ExitLabel { token: label });
    }

    fn set_overlay(&mut self, text: &str) {
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

fn frame(day: u32, nodes: &[(&str, f64)]) -> Frame {
    Frame {
        period: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
        period_sum: 0.0,
        cumulative_sum: 0.0,
        nodes: nodes.iter().map(|(s, t)| ShelterNode::new(*s, *t)).collect(),
    }
}

fn positions(names: &[&str]) -> PositionMap {
    names
        .iter()
        .enumerate()
        .map(|(i, s)| (s.to_string(), Position::new(100.0 * (i + 1) as f64, 50.0)))
        .collect()
}

fn renderer(max_total: f64) -> Renderer<RecordingBackend> {
    let registry: Vec<String> = ["A", "B", "Daley College"].iter().map(|s| s.to_string()).collect();
    Renderer::new(
        RecordingBackend::default(),
        MagnitudeScale::new(max_total, 4.0, 55.0),
        Palette::for_registry(&registry),
        SceneConfig::default(),
        super::shelter_key,
    )
}

const ANIMATED: Transition = Transition::Animated { duration_ms: 600 };

#[test]
fn test_first_render_enters_at_zero_then_grows() {
    let mut r = renderer(10.0);
    let pos = positions(&["A", "B"]);
    r.render(0, &frame(1, &[("A", 10.0), ("B", 2.5)]), &pos, Transition::Instant);

    let ops = r.backend_mut().take_ops();
    assert_eq!(
        ops[0],
        Op::EnterBubble {
            key: "A".into(),
            token: 1
        }
    );
    assert!(matches!(
        &ops[2],
        Op::UpdateBubble { token: 1, radius, duration_ms: 0, .. } if *radius == 55.0
    ));
    assert_eq!(r.bubble_count(), 2);
    assert_eq!(r.backend().overlay, "Period: Jan 01, 2021");
    assert_eq!(r.backend().active_step, Some(0));
}

#[test]
fn test_shelter_keeps_its_element_across_frames() {
    let mut r = renderer(20.0);
    let pos = positions(&["A", "B"]);

    r.render(0, &frame(1, &[("A", 5.0)]), &pos, Transition::Instant);
    let a_token = *r.bubble("A").unwrap();

    r.render(1, &frame(8, &[("A", 7.0), ("B", 3.0)]), &pos, ANIMATED);
    assert_eq!(*r.bubble("A").unwrap(), a_token, "A was recreated");

    let ops = r.backend_mut().take_ops();
    let a_enters = ops
        .iter()
        .filter(|op| matches!(op, Op::EnterBubble { key, .. } if key == "A"))
        .count();
    assert_eq!(a_enters, 1);
    assert!(ops.contains(&Op::UpdateBubble {
        token: a_token,
        radius: 4.0 + (7.0f64 / 20.0).sqrt() * 51.0,
        fill: TABLEAU10[0].to_string(),
        stroke: None,
        duration_ms: 600,
    }));
}

#[test]
fn test_scrolling_back_exits_with_shrink() {
    let mut r = renderer(20.0);
    let pos = positions(&["A", "B"]);

    r.render(1, &frame(8, &[("A", 7.0), ("B", 3.0)]), &pos, Transition::Instant);
    let b_token = *r.bubble("B").unwrap();
    r.backend_mut().take_ops();

    r.render(0, &frame(1, &[("A", 5.0)]), &pos, ANIMATED);
    let ops = r.backend_mut().take_ops();
    assert!(ops.contains(&Op::ExitBubble {
        token: b_token,
        duration_ms: 200
    }));
    assert!(ops.iter().any(|op| matches!(op, Op::ExitLabel { .. })));
    assert!(r.bubble("B").is_none());
    assert_eq!(r.bubble_count(), 1);
    assert_eq!(r.backend().active_step, Some(0));
}

#[test]
fn test_zero_total_is_gray_with_outline() {
    let mut r = renderer(10.0);
    let pos = positions(&["A", "Daley College"]);
    r.render(0, &frame(1, &[("A", 1.0), ("Daley College", 0.0)]), &pos, Transition::Instant);

    let ops = r.backend_mut().take_ops();
    let sentinel_token = *r.bubble("Daley College").unwrap();
    assert!(ops.contains(&Op::UpdateBubble {
        token: sentinel_token,
        radius: 6.0,
        fill: "#bbb".into(),
        stroke: Some("#888".into()),
        duration_ms: 0,
    }));
}

#[test]
fn test_small_totals_get_visible_radius_floor() {
    let r = renderer(10_000.0);
    let mark = r.encode(&ShelterNode::new("A", 1.0), Position::new(0.0, 0.0));
    assert_eq!(mark.radius, 6.0);
    let mark = r.encode(&ShelterNode::new("A", 10_000.0), Position::new(0.0, 0.0));
    assert_eq!(mark.radius, 55.0);
}

#[test]
fn test_node_without_slot_is_skipped() {
    let mut r = renderer(10.0);
    let pos = positions(&["A"]);
    r.render(0, &frame(1, &[("A", 1.0), ("Ghost", 4.0)]), &pos, Transition::Instant);
    assert_eq!(r.bubble_count(), 1);
    assert!(r.bubble("Ghost").is_none());
}

#[test]
fn test_labels_sit_below_center() {
    let mut r = renderer(10.0);
    let pos = positions(&["A"]);
    r.render(0, &frame(1, &[("A", 1.0)]), &pos, Transition::Instant);
    let below = Position::new(pos["A"].x, pos["A"].y + 4.0);

    let ops = r.backend_mut().take_ops();
    assert!(ops.contains(&Op::EnterLabel {
        key: "A".into(),
        anchor: below
    }));
    let token = ops
        .iter()
        .find_map(|op| match op {
            Op::UpdateLabel { token, .. } => Some(*token),
            _ => None,
        })
        .unwrap();
    assert!(ops.contains(&Op::UpdateLabel { token, anchor: below }));

    // Labels follow their slot after a relayout
    let moved: PositionMap = [("A".to_string(), Position::new(300.0, 120.0))].into_iter().collect();
    r.render(0, &frame(1, &[("A", 1.0)]), &moved, Transition::Instant);
    let ops = r.backend_mut().take_ops();
    assert!(ops.contains(&Op::UpdateLabel {
        token,
        anchor: Position::new(300.0, 124.0)
    }));
}

#[test]
fn test_replaced_timeline_rescales_and_recolors() {
    let day = |y| NaiveDate::from_ymd_opt(y, 1, 1).unwrap();
    let config = VizConfig::default();
    let viewport = Viewport {
        width: 960.0,
        height: 600.0,
        margin: Margin::default(),
    };
    let before = aggregate(&[RawRecord::new("B", day(2021), 4.0)], &config.sentinel);
    let renderer = Renderer::for_timeline(RecordingBackend::default(), &before, &config.scene);
    let mut c = ScrollCoordinator::new(before, viewport, &config, renderer);
    c.init();
    c.scene_mut().backend_mut().take_ops();

    let after = aggregate(
        &[
            RawRecord::new("A", day(2022), 1.0),
            RawRecord::new("Z", day(2022), 400.0),
        ],
        &config.sentinel,
    );
    c.replace_timeline(after);

    let ops = c.scene_mut().backend_mut().take_ops();
    let z_token = *c.scene().bubble("Z").unwrap();
    let (radius, fill) = ops
        .iter()
        .rev()
        .find_map(|op| match op {
            Op::UpdateBubble {
                token, radius, fill, ..
            } if *token == z_token => Some((*radius, fill.clone())),
            _ => None,
        })
        .unwrap();
    assert!(radius <= config.scene.max_radius, "radius {radius} exceeds max");
    assert_eq!(radius, config.scene.max_radius);
    assert_eq!(fill, TABLEAU10[1]);
    assert!(c.scene().bubble("B").is_none());
}

#[test]
fn test_tooltip_shows_running_total_near_pointer() {
    let mut r = renderer(10.0);
    let pos = positions(&["A"]);
    r.render(0, &frame(1, &[("A", 7.0)]), &pos, Transition::Instant);

    r.show_tooltip("A", Position::new(40.0, 60.0));
    let tip = r.backend().tooltip.clone().unwrap();
    assert_eq!(tip.title, "A");
    assert_eq!(tip.detail, "Cumulative: 7");
    assert_eq!(tip.at, Position::new(52.0, 72.0));

    r.hide_tooltip();
    assert!(r.backend().tooltip.is_none());
}

#[test]
fn test_tooltip_for_unknown_shelter_is_ignored() {
    let mut r = renderer(10.0);
    r.render(0, &frame(1, &[("A", 7.0)]), &positions(&["A"]), Transition::Instant);
    r.show_tooltip("Nowhere", Position::new(1.0, 1.0));
    assert!(r.backend().tooltip.is_none());
}
