//! Period aggregation
//!
//! Turns raw grievance rows into the ordered frame sequence that drives the
//! scrolling timeline. Each frame carries the period's own sum, the grand
//! running total, and every shelter's running total up to that period.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use hashbrown::HashMap;

use grievance_types::{Frame, ShelterNode};

use crate::records::RawRecord;

/// The aggregated session timeline.
///
/// `frames.len() == periods.len()` always holds; both are empty when the
/// input had no usable rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    pub periods: Vec<NaiveDate>,
    /// Sorted distinct shelter names; defines layout slot order
    pub registry: Vec<String>,
    pub frames: Vec<Frame>,
}

impl Timeline {
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Largest running total of any shelter across the whole sequence.
    pub fn max_running_total(&self) -> f64 {
        self.frames.iter().map(Frame::max_total).fold(0.0, f64::max)
    }
}

/// Build the frame sequence from raw rows. Row order is irrelevant.
///
/// `sentinel` names the shelter that stays in every frame's node list even
/// while its running total is zero.
pub fn aggregate(records: &[RawRecord], sentinel: &str) -> Timeline {
    let periods: Vec<NaiveDate> = records
        .iter()
        .map(|r| r.period_start)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let registry: Vec<String> = records
        .iter()
        .map(|r| r.shelter.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect();

    // Group row indices by period once instead of rescanning per period
    let mut by_period: HashMap<NaiveDate, Vec<&RawRecord>> = HashMap::new();
    for record in records {
        by_period.entry(record.period_start).or_default().push(record);
    }

    let mut running: HashMap<&str, f64> = HashMap::new();
    let mut grand_running = 0.0;

    let frames = periods
        .iter()
        .map(|period| {
            let mut period_sum = 0.0;
            for record in by_period.get(period).into_iter().flatten() {
                *running.entry(record.shelter.as_str()).or_insert(0.0) += record.amount;
                period_sum += record.amount;
            }
            grand_running += period_sum;

            let nodes = registry
                .iter()
                .map(|s| {
                    let total = running.get(s.as_str()).copied().unwrap_or(0.0);
                    ShelterNode::new(s.clone(), total)
                })
                .filter(|n| n.total != 0.0 || n.shelter == sentinel)
                .collect();

            Frame {
                period: *period,
                period_sum,
                cumulative_sum: grand_running,
                nodes,
            }
        })
        .collect();

    tracing::debug!(
        periods = periods.len(),
        shelters = registry.len(),
        "Aggregated grievance timeline"
    );

    Timeline {
        periods,
        registry,
        frames,
    }
}
