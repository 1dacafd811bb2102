//! Scene rendering
//!
//! The scene is split in two:
//! - [`Backend`]: the drawing surface (SVG DOM in the browser, SVG text in the
//!   CLI). It only knows how to create, update and remove marks.
//! - [`Renderer`]: owns the keyed join state and the visual encoding, and
//!   implements [`Scene`] on top of any backend.
//!
//! Marks are matched across frames by a caller-supplied key, so a shelter
//! present in consecutive frames keeps its element and animates instead of
//! being recreated.

mod join;
mod renderer;

#[cfg(test)]
mod renderer_tests;

pub use join::{JoinPlan, KeyedJoin};
pub use renderer::{Renderer, shelter_key};

use grievance_types::{Frame, Position};

use crate::layout::PositionMap;
use crate::timeline::Timeline;

/// Offset of the tooltip from the pointer, in pixels.
pub const TOOLTIP_OFFSET: f64 = 12.0;
/// Labels sit slightly below the bubble center to look vertically centered.
pub const LABEL_BASELINE_OFFSET: f64 = 4.0;

/// How a render call moves marks to their new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Jump straight to the target (initial draw, resize)
    Instant,
    /// Animate over the given duration (scroll-driven step changes)
    Animated { duration_ms: u32 },
}

impl Transition {
    pub fn duration_ms(&self) -> u32 {
        match self {
            Transition::Instant => 0,
            Transition::Animated { duration_ms } => *duration_ms,
        }
    }
}

/// Target visual state of one bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleMark {
    pub key: String,
    pub center: Position,
    pub radius: f64,
    pub fill: String,
    /// Outline drawn for tracked shelters with nothing reported yet
    pub stroke: Option<String>,
    pub total: f64,
}

/// Target state of one shelter label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMark {
    pub key: String,
    pub anchor: Position,
    pub text: String,
}

/// Tooltip contents and where to place it.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    pub title: String,
    pub detail: String,
    pub at: Position,
}

/// Drawing surface contract.
///
/// `Bubble` and `Label` are the backend's element handles. A handle lives for
/// as long as its shelter stays in consecutive frames, so it doubles as the
/// continuity token for that shelter's visual element.
pub trait Backend {
    type Bubble;
    type Label;

    /// Create a bubble at `mark.center` with radius 0. The renderer follows up
    /// with [`Backend::update_bubble`] to grow it.
    fn enter_bubble(&mut self, mark: &BubbleMark) -> Self::Bubble;
    fn update_bubble(
        &mut self,
        bubble: &mut Self::Bubble,
        mark: &BubbleMark,
        transition: Transition,
    );
    /// Shrink to radius 0 over `duration_ms`, then remove.
    fn exit_bubble(&mut self, bubble: Self::Bubble, duration_ms: u32);

    fn enter_label(&mut self, mark: &LabelMark) -> Self::Label;
    fn update_label(&mut self, label: &mut Self::Label, mark: &LabelMark);
    fn exit_label(&mut self, label: Self::Label);

    fn set_overlay(&mut self, text: &str);
    /// Mark the narrative step at `index` as active and every other step inactive.
    fn set_active_step(&mut self, index: usize);

    fn show_tooltip(&mut self, tooltip: &TooltipContent);
    fn hide_tooltip(&mut self);
}

/// What the scroll coordinator drives.
pub trait Scene {
    /// Rebuild the encoding (scale domain, palette) for a different timeline.
    /// Element bindings are kept so continuing shelters still animate.
    fn reset(&mut self, timeline: &Timeline);
    fn render(
        &mut self,
        index: usize,
        frame: &Frame,
        positions: &PositionMap,
        transition: Transition,
    );
    /// Show details for a shelter near the pointer. Unknown shelters are ignored.
    fn show_tooltip(&mut self, shelter: &str, pointer: Position);
    fn hide_tooltip(&mut self);
}
