pub mod breakdown;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod coordinator;
pub mod layout;
pub mod palette;
pub mod records;
pub mod scale;
pub mod scene;
pub mod timeline;

// Re-exports for convenience
pub use breakdown::{SliceArc, load_breakdowns, parse_breakdowns, pie_layout, slice_label};
#[cfg(not(target_arch = "wasm32"))]
pub use config::{ConfigError, VizConfigExt};
pub use coordinator::{ScrollCoordinator, parse_step_index, step_offset};
pub use grievance_types::{
    CategorySlice, Frame, LayoutConfig, Margin, Position, SceneConfig, ScrollConfig,
    ShelterBreakdown, ShelterNode, VizConfig,
};
pub use layout::{PositionMap, Viewport, columns_for_width, compute_positions};
pub use palette::Palette;
pub use records::{LoadError, LoadReport, RawRecord, load_grievances, parse_grievances};
pub use scale::MagnitudeScale;
pub use scene::{Backend, BubbleMark, LabelMark, Renderer, Scene, TooltipContent, Transition};
pub use timeline::{StepText, Timeline, aggregate, step_texts};
