//! Responsive grid layout for the bubble chart
//!
//! Every shelter in the registry gets a fixed grid slot by registry index.
//! Slots are spread evenly with a half-cell margin on each edge: `n` columns
//! divide the inner width into `n + 1` gaps, and rows do the same vertically.

use hashbrown::HashMap;

use grievance_types::{LayoutConfig, Margin, Position};

/// Drawable area derived from the graphic container and the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Viewport {
    /// Size the graphic from its container width and the window height.
    pub fn from_container(container_width: f64, window_height: f64, config: &LayoutConfig) -> Self {
        Self {
            width: container_width.max(config.min_width),
            height: (window_height * config.height_fraction).max(config.min_height),
            margin: config.margin,
        }
    }

    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }
}

/// Shelter name to slot position, relative to the inner (margin-translated) area.
pub type PositionMap = HashMap<String, Position>;

/// Column count for a viewport width.
///
/// Breakpoints are checked narrowest first so a wider viewport never gets
/// fewer columns than a narrower one, whatever order the config lists them in.
pub fn columns_for_width(width: f64, config: &LayoutConfig) -> u32 {
    let mut breakpoints = config.breakpoints.clone();
    breakpoints.sort_by_key(|b| b.max_width);

    let mut floor = 1;
    for bp in &breakpoints {
        if width < f64::from(bp.max_width) {
            return bp.columns.max(floor);
        }
        floor = floor.max(bp.columns);
    }
    config.max_columns.max(floor)
}

/// Grid cell (column, row) for a registry index.
pub fn grid_cell(index: usize, columns: u32) -> (usize, usize) {
    let columns = columns.max(1) as usize;
    (index % columns, index / columns)
}

/// Compute the slot of every registry member.
///
/// Pure in `(registry, viewport)`; recomputed wholesale on every resize.
pub fn compute_positions(
    registry: &[String],
    viewport: &Viewport,
    config: &LayoutConfig,
) -> PositionMap {
    let mut positions = PositionMap::with_capacity(registry.len());
    if registry.is_empty() {
        return positions;
    }

    let columns = columns_for_width(viewport.width, config);
    let rows = registry.len().div_ceil(columns as usize);
    let spacing_x = viewport.inner_width() / f64::from(columns + 1);
    let spacing_y = viewport.inner_height() / (rows + 1) as f64;

    for (i, shelter) in registry.iter().enumerate() {
        let (col, row) = grid_cell(i, columns);
        positions.insert(
            shelter.clone(),
            Position::new(spacing_x * (col + 1) as f64, spacing_y * (row + 1) as f64),
        );
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use grievance_types::Breakpoint;

    fn registry(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Shelter {i:02}")).collect()
    }

    fn viewport(width: f64, height: f64) -> Viewport {
        Viewport {
            width,
            height,
            margin: Margin::default(),
        }
    }

    #[test]
    fn test_default_breakpoints() {
        let cfg = LayoutConfig::default();
        assert_eq!(columns_for_width(320.0, &cfg), 2);
        assert_eq!(columns_for_width(419.0, &cfg), 2);
        assert_eq!(columns_for_width(420.0, &cfg), 3);
        assert_eq!(columns_for_width(699.0, &cfg), 3);
        assert_eq!(columns_for_width(700.0, &cfg), 4);
        assert_eq!(columns_for_width(1000.0, &cfg), 6);
        assert_eq!(columns_for_width(2400.0, &cfg), 6);
    }

    #[test]
    fn test_columns_monotonic_in_width() {
        let cfg = LayoutConfig::default();
        let mut last = 0;
        for w in (200..2000).step_by(7) {
            let cols = columns_for_width(f64::from(w), &cfg);
            assert!(cols >= last, "width {w} gave {cols} < {last}");
            last = cols;
        }
    }

    #[test]
    fn test_unsorted_or_decreasing_breakpoints_stay_monotonic() {
        let cfg = LayoutConfig {
            breakpoints: vec![
                Breakpoint { max_width: 800, columns: 2 },
                Breakpoint { max_width: 400, columns: 5 },
            ],
            max_columns: 3,
            ..LayoutConfig::default()
        };
        assert_eq!(columns_for_width(300.0, &cfg), 5);
        assert_eq!(columns_for_width(500.0, &cfg), 5);
        assert_eq!(columns_for_width(900.0, &cfg), 5);
    }

    #[test]
    fn test_zero_columns_never_produced() {
        let cfg = LayoutConfig {
            breakpoints: vec![Breakpoint { max_width: 500, columns: 0 }],
            max_columns: 0,
            ..LayoutConfig::default()
        };
        assert_eq!(columns_for_width(100.0, &cfg), 1);
        assert_eq!(columns_for_width(900.0, &cfg), 1);
    }

    #[test]
    fn test_positions_even_spacing() {
        let cfg = LayoutConfig::default();
        // 1040 wide -> 6 columns; inner 1000 x 440
        let vp = viewport(1040.0, 500.0);
        let reg = registry(7);
        let positions = compute_positions(&reg, &vp, &cfg);

        let spacing_x = 1000.0 / 7.0;
        let spacing_y = 440.0 / 3.0;
        assert_eq!(positions["Shelter 00"], Position::new(spacing_x, spacing_y));
        assert_eq!(positions["Shelter 05"], Position::new(spacing_x * 6.0, spacing_y));
        assert_eq!(positions["Shelter 06"], Position::new(spacing_x, spacing_y * 2.0));
    }

    #[test]
    fn test_column_index_within_bounds() {
        let cfg = LayoutConfig::default();
        for width in [350.0, 600.0, 900.0, 1400.0] {
            let vp = viewport(width, 800.0);
            let columns = columns_for_width(width, &cfg);
            let spacing_x = vp.inner_width() / f64::from(columns + 1);
            let positions = compute_positions(&registry(13), &vp, &cfg);
            for pos in positions.values() {
                let col = (pos.x / spacing_x).round() as u32 - 1;
                assert!(col < columns);
                assert!(pos.x > 0.0 && pos.x < vp.inner_width());
                assert!(pos.y > 0.0 && pos.y < vp.inner_height());
            }
        }
    }

    #[test]
    fn test_positions_deterministic() {
        let cfg = LayoutConfig::default();
        let vp = viewport(777.0, 612.0);
        let reg = registry(11);
        assert_eq!(compute_positions(&reg, &vp, &cfg), compute_positions(&reg, &vp, &cfg));
    }

    #[test]
    fn test_empty_registry() {
        let cfg = LayoutConfig::default();
        assert!(compute_positions(&[], &viewport(800.0, 600.0), &cfg).is_empty());
    }

    #[test]
    fn test_viewport_minimums() {
        let cfg = LayoutConfig::default();
        let vp = Viewport::from_container(200.0, 300.0, &cfg);
        assert_eq!(vp.width, 320.0);
        assert_eq!(vp.height, 420.0);
        let vp = Viewport::from_container(1200.0, 1000.0, &cfg);
        assert_eq!(vp.width, 1200.0);
        assert_eq!(vp.height, 900.0);
        assert_eq!(vp.inner_width(), 1160.0);
        assert_eq!(vp.inner_height(), 840.0);
    }
}
