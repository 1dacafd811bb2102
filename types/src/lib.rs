//! Shared types for the shelter grievance visualization
//!
//! This crate contains serializable types that are shared between the native
//! pipeline (grievance-core, grievance-cli) and the WASM frontend (grievance-app).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Timeline Types
// ─────────────────────────────────────────────────────────────────────────────

/// A shelter paired with its running total up to some period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterNode {
    pub shelter: String,
    /// Sum of all grievances for this shelter in periods up to and including
    /// the frame's period.
    pub total: f64,
}

impl ShelterNode {
    pub fn new(shelter: impl Into<String>, total: f64) -> Self {
        Self {
            shelter: shelter.into(),
            total,
        }
    }

    /// A tracked shelter that has not reported anything yet.
    pub fn is_zero(&self) -> bool {
        self.total == 0.0
    }
}

/// One period's aggregated snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub period: NaiveDate,
    /// Grievances reported within this period only
    pub period_sum: f64,
    /// Grievances reported in this period and every earlier one
    pub cumulative_sum: f64,
    /// Shelters with a non-zero running total, plus the sentinel shelter
    pub nodes: Vec<ShelterNode>,
}

impl Frame {
    pub fn node(&self, shelter: &str) -> Option<&ShelterNode> {
        self.nodes.iter().find(|n| n.shelter == shelter)
    }

    /// Largest running total in this frame (0 when there are no nodes).
    pub fn max_total(&self) -> f64 {
        self.nodes.iter().map(|n| n.total).fold(0.0, f64::max)
    }
}

/// Pixel coordinates of a layout slot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Category Breakdown Types
// ─────────────────────────────────────────────────────────────────────────────

/// A single category value inside a shelter's breakdown pie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub category: String,
    pub value: f64,
}

/// Category totals for one shelter from the summary dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterBreakdown {
    pub shelter: String,
    /// Non-zero categories in column order
    pub slices: Vec<CategorySlice>,
    pub total: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Shelter that is always drawn, even before it has any reports.
pub const DEFAULT_SENTINEL: &str = "Daley College";

/// Inner margins of the drawing area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 30.0,
            right: 20.0,
            bottom: 30.0,
            left: 20.0,
        }
    }
}

/// Column breakpoint: viewports narrower than `max_width` get `columns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub max_width: u32,
    pub columns: u32,
}

/// Grid layout policy for the bubble chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_breakpoints")]
    pub breakpoints: Vec<Breakpoint>,
    /// Columns used when the viewport is wider than every breakpoint
    #[serde(default = "default_max_columns")]
    pub max_columns: u32,
    #[serde(default)]
    pub margin: Margin,
    #[serde(default = "default_min_width")]
    pub min_width: f64,
    #[serde(default = "default_min_height")]
    pub min_height: f64,
    /// Fraction of the window height given to the graphic
    #[serde(default = "default_height_fraction")]
    pub height_fraction: f64,
}

fn default_breakpoints() -> Vec<Breakpoint> {
    vec![
        Breakpoint { max_width: 420, columns: 2 },
        Breakpoint { max_width: 700, columns: 3 },
        Breakpoint { max_width: 1000, columns: 4 },
    ]
}
fn default_max_columns() -> u32 {
    6
}
fn default_min_width() -> f64 {
    320.0
}
fn default_min_height() -> f64 {
    420.0
}
fn default_height_fraction() -> f64 {
    0.9
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            breakpoints: default_breakpoints(),
            max_columns: default_max_columns(),
            margin: Margin::default(),
            min_width: default_min_width(),
            min_height: default_min_height(),
            height_fraction: default_height_fraction(),
        }
    }
}

/// Bubble encoding and transition timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_min_radius")]
    pub min_radius: f64,
    #[serde(default = "default_max_radius")]
    pub max_radius: f64,
    /// Floor applied after scaling so tiny totals stay clickable
    #[serde(default = "default_min_visible_radius")]
    pub min_visible_radius: f64,
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u32,
    #[serde(default = "default_exit_ms")]
    pub exit_ms: u32,
    #[serde(default = "default_zero_fill")]
    pub zero_fill: String,
    #[serde(default = "default_zero_stroke")]
    pub zero_stroke: String,
}

fn default_min_radius() -> f64 {
    4.0
}
fn default_max_radius() -> f64 {
    55.0
}
fn default_min_visible_radius() -> f64 {
    6.0
}
fn default_transition_ms() -> u32 {
    600
}
fn default_exit_ms() -> u32 {
    200
}
fn default_zero_fill() -> String {
    "#bbb".to_string()
}
fn default_zero_stroke() -> String {
    "#888".to_string()
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            min_radius: default_min_radius(),
            max_radius: default_max_radius(),
            min_visible_radius: default_min_visible_radius(),
            transition_ms: default_transition_ms(),
            exit_ms: default_exit_ms(),
            zero_fill: default_zero_fill(),
            zero_stroke: default_zero_stroke(),
        }
    }
}

/// Scroll observer trigger offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Viewports narrower than this use `narrow_offset`
    #[serde(default = "default_narrow_below")]
    pub narrow_below: f64,
    #[serde(default = "default_narrow_offset")]
    pub narrow_offset: f64,
    #[serde(default = "default_wide_offset")]
    pub wide_offset: f64,
}

fn default_narrow_below() -> f64 {
    900.0
}
fn default_narrow_offset() -> f64 {
    0.8
}
fn default_wide_offset() -> f64 {
    0.6
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            narrow_below: default_narrow_below(),
            narrow_offset: default_narrow_offset(),
            wide_offset: default_wide_offset(),
        }
    }
}

/// Dataset locations, relative to the page (web) or working directory (cli).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSources {
    #[serde(default = "default_grievances_path")]
    pub grievances: String,
    #[serde(default = "default_summary_path")]
    pub summary: String,
}

fn default_grievances_path() -> String {
    "data/grievances.csv".to_string()
}
fn default_summary_path() -> String {
    "data/summary.csv".to_string()
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            grievances: default_grievances_path(),
            summary: default_summary_path(),
        }
    }
}

/// Top-level visualization configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizConfig {
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub data: DataSources,
}

fn default_sentinel() -> String {
    DEFAULT_SENTINEL.to_string()
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
            layout: LayoutConfig::default(),
            scene: SceneConfig::default(),
            scroll: ScrollConfig::default(),
            data: DataSources::default(),
        }
    }
}
