use grievance_types::{Frame, Position, SceneConfig, ShelterNode};

use super::{
    Backend, BubbleMark, KeyedJoin, LABEL_BASELINE_OFFSET, LabelMark, Scene, TOOLTIP_OFFSET,
    TooltipContent, Transition,
};
use crate::layout::PositionMap;
use crate::palette::Palette;
use crate::scale::MagnitudeScale;
use crate::timeline::Timeline;
use crate::timeline::narration::{overlay_text, tooltip_lines};

/// Identity used to match shelters across frames.
pub fn shelter_key(node: &ShelterNode) -> &str {
    &node.shelter
}

fn timeline_scale(timeline: &Timeline, config: &SceneConfig) -> MagnitudeScale {
    MagnitudeScale::new(
        timeline.max_running_total(),
        config.min_radius,
        config.max_radius,
    )
}

/// Scene implementation over a drawing [`Backend`].
///
/// Holds everything that must stay fixed for a session: the magnitude scale
/// (domain taken once from the whole timeline), the palette, and the element
/// bindings of the previous render.
pub struct Renderer<B: Backend> {
    backend: B,
    scale: MagnitudeScale,
    palette: Palette,
    config: SceneConfig,
    key: fn(&ShelterNode) -> &str,
    bubbles: KeyedJoin<String, B::Bubble>,
    labels: KeyedJoin<String, B::Label>,
    /// Nodes of the last rendered frame, for tooltip lookups
    shown: Vec<ShelterNode>,
}

impl<B: Backend> Renderer<B> {
    /// Build a renderer whose scale and palette are fixed from `timeline`.
    pub fn for_timeline(backend: B, timeline: &Timeline, config: &SceneConfig) -> Self {
        Self::new(
            backend,
            timeline_scale(timeline, config),
            Palette::for_registry(&timeline.registry),
            config.clone(),
            shelter_key,
        )
    }

    pub fn new(
        backend: B,
        scale: MagnitudeScale,
        palette: Palette,
        config: SceneConfig,
        key: fn(&ShelterNode) -> &str,
    ) -> Self {
        Self {
            backend,
            scale,
            palette,
            config,
            key,
            bubbles: KeyedJoin::new(),
            labels: KeyedJoin::new(),
            shown: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn scale(&self) -> &MagnitudeScale {
        &self.scale
    }

    /// Element handle currently bound to a shelter.
    pub fn bubble(&self, shelter: &str) -> Option<&B::Bubble> {
        self.bubbles.get(&shelter.to_string())
    }

    pub fn bubble_count(&self) -> usize {
        self.bubbles.len()
    }

    /// Visual encoding of one node at its slot.
    pub fn encode(&self, node: &ShelterNode, at: Position) -> BubbleMark {
        let zero = node.is_zero();
        BubbleMark {
            key: (self.key)(node).to_string(),
            center: at,
            radius: self.scale.radius(node.total).max(self.config.min_visible_radius),
            fill: if zero {
                self.config.zero_fill.clone()
            } else {
                self.palette.color(&node.shelter).to_string()
            },
            stroke: zero.then(|| self.config.zero_stroke.clone()),
            total: node.total,
        }
    }

    fn label(&self, node: &ShelterNode, at: Position) -> LabelMark {
        LabelMark {
            key: (self.key)(node).to_string(),
            anchor: at.offset(0.0, LABEL_BASELINE_OFFSET),
            text: node.shelter.clone(),
        }
    }
}

impl<B: Backend> Scene for Renderer<B> {
    fn reset(&mut self, timeline: &Timeline) {
        self.scale = timeline_scale(timeline, &self.config);
        self.palette = Palette::for_registry(&timeline.registry);
        tracing::debug!(
            max_total = timeline.max_running_total(),
            shelters = timeline.registry.len(),
            "Rebuilt scene encoding"
        );
    }

    fn render(
        &mut self,
        index: usize,
        frame: &Frame,
        positions: &PositionMap,
        transition: Transition,
    ) {
        self.backend.set_overlay(&overlay_text(frame));
        self.backend.set_active_step(index);

        // Shelters without a slot cannot be drawn; treat them as absent
        let placed: Vec<(&ShelterNode, Position)> = frame
            .nodes
            .iter()
            .filter_map(|n| positions.get(&n.shelter).map(|p| (n, *p)))
            .collect();
        let key = self.key;

        // Bubbles: exits shrink out while enters and updates animate in together
        let plan = self.bubbles.plan(&placed, |&(n, _)| key(n).to_string());
        for k in &plan.exit {
            if let Some(bubble) = self.bubbles.unbind(k) {
                self.backend.exit_bubble(bubble, self.config.exit_ms);
            }
        }
        for &i in &plan.enter {
            let (node, at) = placed[i];
            let mark = self.encode(node, at);
            let bubble = self.backend.enter_bubble(&mark);
            self.bubbles.bind(mark.key, bubble);
        }
        for &i in plan.enter.iter().chain(&plan.update) {
            let (node, at) = placed[i];
            let mark = self.encode(node, at);
            if let Some(bubble) = self.bubbles.get_mut(&mark.key) {
                self.backend.update_bubble(bubble, &mark, transition);
            }
        }

        // Labels follow without transitions
        let plan = self.labels.plan(&placed, |&(n, _)| key(n).to_string());
        for k in &plan.exit {
            if let Some(label) = self.labels.unbind(k) {
                self.backend.exit_label(label);
            }
        }
        for &i in &plan.enter {
            let (node, at) = placed[i];
            let mark = self.label(node, at);
            let label = self.backend.enter_label(&mark);
            self.labels.bind(mark.key, label);
        }
        for &i in plan.enter.iter().chain(&plan.update) {
            let (node, at) = placed[i];
            let mark = self.label(node, at);
            if let Some(label) = self.labels.get_mut(&mark.key) {
                self.backend.update_label(label, &mark);
            }
        }

        self.shown = placed.into_iter().map(|(n, _)| n.clone()).collect();
    }

    fn show_tooltip(&mut self, shelter: &str, pointer: Position) {
        let Some(node) = self.shown.iter().find(|n| n.shelter == shelter) else {
            return;
        };
        let (title, detail) = tooltip_lines(&node.shelter, node.total);
        self.backend.show_tooltip(&TooltipContent {
            title,
            detail,
            at: pointer.offset(TOOLTIP_OFFSET, TOOLTIP_OFFSET),
        });
    }

    fn hide_tooltip(&mut self) {
        self.backend.hide_tooltip();
    }
}
