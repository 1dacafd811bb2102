//! Category breakdown small multiples
//!
//! The summary dataset has one row per shelter and one column per grievance
//! category. Each shelter with a non-zero total gets its own small pie. This
//! view shares no state with the scrolling timeline and is built once.

use std::f64::consts::TAU;
use std::io::Read;
use std::path::Path;

use grievance_types::{CategorySlice, ShelterBreakdown};

use crate::records::{LoadError, parse_amount};

/// Angular extent of one pie slice, in radians, clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceArc {
    pub start: f64,
    pub end: f64,
}

impl SliceArc {
    pub fn mid(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Read the summary dataset. Shelters whose categories sum to zero are skipped.
pub fn read_breakdowns<R: Read>(source: R) -> Result<Vec<ShelterBreakdown>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = reader.headers().map_err(LoadError::Header)?.clone();
    if headers.is_empty() {
        return Err(LoadError::MissingHeader);
    }
    let categories: Vec<String> = headers.iter().skip(1).map(String::from).collect();

    let mut breakdowns = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let Ok(row) = result else {
            skipped += 1;
            continue;
        };
        let shelter = row.get(0).map(str::trim).unwrap_or_default();
        if shelter.is_empty() {
            skipped += 1;
            continue;
        }

        let slices: Vec<CategorySlice> = categories
            .iter()
            .enumerate()
            .map(|(i, category)| CategorySlice {
                category: category.clone(),
                value: row.get(i + 1).map(parse_amount).unwrap_or(0.0),
            })
            .filter(|slice| slice.value > 0.0)
            .collect();
        let total: f64 = slices.iter().map(|s| s.value).sum();
        if total == 0.0 {
            skipped += 1;
            continue;
        }

        breakdowns.push(ShelterBreakdown {
            shelter: shelter.to_string(),
            slices,
            total,
        });
    }

    tracing::debug!(
        shelters = breakdowns.len(),
        categories = categories.len(),
        skipped,
        "Loaded category breakdowns"
    );
    Ok(breakdowns)
}

pub fn parse_breakdowns(text: &str) -> Result<Vec<ShelterBreakdown>, LoadError> {
    read_breakdowns(text.as_bytes())
}

pub fn load_breakdowns(path: &Path) -> Result<Vec<ShelterBreakdown>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    read_breakdowns(file)
}

/// Slice angles in category order, covering the full circle.
pub fn pie_layout(breakdown: &ShelterBreakdown) -> Vec<SliceArc> {
    if breakdown.total <= 0.0 {
        return Vec::new();
    }
    let mut start = 0.0;
    breakdown
        .slices
        .iter()
        .map(|slice| {
            let end = start + TAU * slice.value / breakdown.total;
            let arc = SliceArc { start, end };
            start = end;
            arc
        })
        .collect()
}

/// Tooltip text for one slice.
pub fn slice_label(slice: &CategorySlice) -> String {
    format!(
        "{}: {}",
        slice.category,
        crate::timeline::narration::format_amount(slice.value)
    )
}
