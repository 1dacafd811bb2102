//! Scroll coordination
//!
//! Binds narrative step indices to frames. The scroll observer (scrollama in
//! the browser, REPL commands in the CLI) reports which step became active;
//! the coordinator looks the frame up and asks the scene to animate to it.
//! Resizes recompute the grid and redraw the current frame instantly.

use grievance_types::{LayoutConfig, Position, ScrollConfig, VizConfig};

use crate::layout::{PositionMap, Viewport, compute_positions};
use crate::scene::{Scene, Transition};
use crate::timeline::Timeline;

/// Observer trigger offset for a window width.
pub fn step_offset(window_width: f64, config: &ScrollConfig) -> f64 {
    if window_width < config.narrow_below {
        config.narrow_offset
    } else {
        config.wide_offset
    }
}

/// Frame index written on a narrative step element. Anything other than a
/// non-negative integer is rejected.
pub fn parse_step_index(raw: &str) -> Option<usize> {
    raw.trim().parse().ok()
}

/// Session state for the scrolling timeline.
///
/// Owns the aggregated timeline, the current slot layout, and the scene. The
/// only navigational state is `current_index`, kept so a resize can redraw
/// the right frame.
pub struct ScrollCoordinator<S: Scene> {
    timeline: Timeline,
    layout: LayoutConfig,
    scroll: ScrollConfig,
    transition_ms: u32,
    viewport: Viewport,
    positions: PositionMap,
    current_index: usize,
    scene: S,
}

impl<S: Scene> ScrollCoordinator<S> {
    pub fn new(timeline: Timeline, viewport: Viewport, config: &VizConfig, scene: S) -> Self {
        let positions = compute_positions(&timeline.registry, &viewport, &config.layout);
        Self {
            timeline,
            layout: config.layout.clone(),
            scroll: config.scroll,
            transition_ms: config.scene.transition_ms,
            viewport,
            positions,
            current_index: 0,
            scene,
        }
    }

    /// Draw the first frame without animation. Returns false when there is
    /// nothing to draw.
    pub fn init(&mut self) -> bool {
        self.render_at(0, Transition::Instant)
    }

    /// A narrative step became active.
    ///
    /// Indices without a frame are ignored and leave `current_index` as is.
    pub fn on_step_enter(&mut self, index: usize) -> bool {
        let transition = Transition::Animated {
            duration_ms: self.transition_ms,
        };
        self.render_at(index, transition)
    }

    /// The viewport changed size: recompute slots, redraw the current frame.
    pub fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.relayout();
        self.render_at(self.current_index, Transition::Instant);
    }

    /// Swap in a new timeline (e.g. a reloaded dataset).
    ///
    /// The registry and the global maximum may differ, so slots, scale and
    /// palette are rebuilt. The current index is kept when it still exists,
    /// otherwise it falls back to the first frame.
    pub fn replace_timeline(&mut self, timeline: Timeline) {
        self.timeline = timeline;
        self.scene.reset(&self.timeline);
        if self.timeline.frame(self.current_index).is_none() {
            self.current_index = 0;
        }
        self.relayout();
        self.render_at(self.current_index, Transition::Instant);
    }

    pub fn hover(&mut self, shelter: &str, pointer: Position) {
        self.scene.show_tooltip(shelter, pointer);
    }

    pub fn leave(&mut self) {
        self.scene.hide_tooltip();
    }

    pub fn step_offset(&self, window_width: f64) -> f64 {
        step_offset(window_width, &self.scroll)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    fn relayout(&mut self) {
        self.positions = compute_positions(&self.timeline.registry, &self.viewport, &self.layout);
        tracing::debug!(
            width = self.viewport.width,
            height = self.viewport.height,
            slots = self.positions.len(),
            "Recomputed shelter layout"
        );
    }

    fn render_at(&mut self, index: usize, transition: Transition) -> bool {
        let Some(frame) = self.timeline.frame(index) else {
            tracing::debug!(index, frames = self.timeline.len(), "No frame for step");
            return false;
        };
        self.current_index = index;
        self.scene.render(index, frame, &self.positions, transition);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RawRecord;
    use crate::timeline::aggregate;
    use chrono::NaiveDate;
    use grievance_types::{Frame, Margin};

    #[derive(Default)]
    struct CountingScene {
        renders: Vec<(usize, Transition, usize)>,
        tooltips: Vec<String>,
        resets: usize,
    }

    impl Scene for CountingScene {
        fn reset(&mut self, _timeline: &Timeline) {
            self.resets += 1;
        }

        fn render(
            &mut self,
            index: usize,
            frame: &Frame,
            positions: &PositionMap,
            transition: Transition,
        ) {
            assert!(frame.nodes.iter().all(|n| positions.contains_key(&n.shelter)));
            self.renders.push((index, transition, positions.len()));
        }

        fn show_tooltip(&mut self, shelter: &str, _pointer: Position) {
            self.tooltips.push(shelter.to_string());
        }

        fn hide_tooltip(&mut self) {
            self.tooltips.clear();
        }
    }

    fn timeline() -> Timeline {
        let d = |m| NaiveDate::from_ymd_opt(2021, m, 1).unwrap();
        aggregate(
            &[
                RawRecord::new("A", d(1), 5.0),
                RawRecord::new("B", d(1), 3.0),
                RawRecord::new("A", d(2), 2.0),
                RawRecord::new("C", d(3), 1.0),
            ],
            "Daley College",
        )
    }

    fn viewport(width: f64) -> Viewport {
        Viewport {
            width,
            height: 600.0,
            margin: Margin::default(),
        }
    }

    fn coordinator(timeline: Timeline) -> ScrollCoordinator<CountingScene> {
        ScrollCoordinator::new(
            timeline,
            viewport(1200.0),
            &VizConfig::default(),
            CountingScene::default(),
        )
    }

    #[test]
    fn test_init_draws_first_frame_instantly() {
        let mut c = coordinator(timeline());
        assert!(c.init());
        assert_eq!(c.scene().renders, vec![(0, Transition::Instant, 3)]);
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn test_step_enter_animates() {
        let mut c = coordinator(timeline());
        c.init();
        assert!(c.on_step_enter(2));
        assert_eq!(c.current_index(), 2);
        assert_eq!(
            c.scene().renders.last(),
            Some(&(2, Transition::Animated { duration_ms: 600 }, 3))
        );
    }

    #[test]
    fn test_out_of_range_step_is_a_no_op() {
        let mut c = coordinator(timeline());
        c.init();
        c.on_step_enter(1);
        assert!(!c.on_step_enter(3));
        assert!(!c.on_step_enter(usize::MAX));
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.scene().renders.len(), 2);
    }

    #[test]
    fn test_resize_redraws_current_frame_instantly() {
        let mut c = coordinator(timeline());
        c.init();
        c.on_step_enter(1);
        let before = c.positions().clone();

        c.on_resize(viewport(400.0));
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.scene().renders.last(), Some(&(1, Transition::Instant, 3)));
        assert_ne!(&before, c.positions());
    }

    #[test]
    fn test_empty_timeline_never_renders() {
        let mut c = coordinator(Timeline::default());
        assert!(!c.init());
        assert!(!c.on_step_enter(0));
        c.on_resize(viewport(500.0));
        assert!(c.scene().renders.is_empty());
        assert!(c.positions().is_empty());
    }

    #[test]
    fn test_replace_timeline_recomputes_slots() {
        let mut c = coordinator(timeline());
        c.init();
        c.on_step_enter(2);

        let d = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        c.replace_timeline(aggregate(&[RawRecord::new("Z", d, 1.0)], "Daley College"));
        assert_eq!(c.current_index(), 0);
        assert_eq!(c.scene().resets, 1);
        assert_eq!(c.positions().len(), 1);
        assert!(c.positions().contains_key("Z"));
    }

    #[test]
    fn test_hover_and_leave_reach_scene() {
        let mut c = coordinator(timeline());
        c.hover("A", Position::new(1.0, 2.0));
        assert_eq!(c.scene().tooltips, vec!["A"]);
        c.leave();
        assert!(c.scene().tooltips.is_empty());
    }

    #[test]
    fn test_step_index_comes_from_the_attribute_value() {
        assert_eq!(parse_step_index("0"), Some(0));
        assert_eq!(parse_step_index(" 7 "), Some(7));
        assert_eq!(parse_step_index("-1"), None);
        assert_eq!(parse_step_index("2.5"), None);
        assert_eq!(parse_step_index(""), None);

        // Steps are keyed by their own index, not their DOM position
        let mut c = coordinator(timeline());
        c.init();
        let index = parse_step_index("2").unwrap();
        assert!(c.on_step_enter(index));
        assert_eq!(c.current_index(), 2);
    }

    #[test]
    fn test_step_offset() {
        let cfg = ScrollConfig::default();
        assert_eq!(step_offset(600.0, &cfg), 0.8);
        assert_eq!(step_offset(899.0, &cfg), 0.8);
        assert_eq!(step_offset(900.0, &cfg), 0.6);
    }
}
