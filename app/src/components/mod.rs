//! UI Components

pub mod breakdown;
pub mod legend;

pub use breakdown::BreakdownGrid;
pub use legend::Legend;
