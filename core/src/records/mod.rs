//! Raw grievance rows from the primary dataset
//!
//! Rows are read with the `csv` crate and normalized into [`RawRecord`]s.
//! A row without a shelter name or with an unparseable period is dropped;
//! a missing or invalid total becomes 0.

mod error;

pub use error::LoadError;

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const SHELTER_COLUMN: &str = "Emergency Temporary Shelter";
pub const PERIOD_COLUMN: &str = "Period Start";
pub const TOTAL_COLUMN: &str = "Total";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// One normalized grievance row.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub shelter: String,
    pub period_start: NaiveDate,
    pub amount: f64,
}

impl RawRecord {
    pub fn new(shelter: impl Into<String>, period_start: NaiveDate, amount: f64) -> Self {
        Self {
            shelter: shelter.into(),
            period_start,
            amount,
        }
    }
}

/// Counts gathered while loading a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub missing_shelter: usize,
    pub bad_period: usize,
    /// Rows the csv reader itself rejected (bad quoting, invalid UTF-8)
    pub unreadable: usize,
}

impl LoadReport {
    pub fn dropped(&self) -> usize {
        self.rows_read - self.rows_kept
    }
}

/// Parse a period start in any of the accepted date layouts.
///
/// Date-times keep only their calendar date.
pub fn parse_period(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Coerce an amount cell to a non-negative number.
pub fn parse_amount(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

fn column_index(headers: &csv::StringRecord, column: &'static str) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or(LoadError::MissingColumn { column })
}

/// Read grievance rows from any CSV source.
pub fn read_grievances<R: Read>(source: R) -> Result<(Vec<RawRecord>, LoadReport), LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = reader.headers().map_err(LoadError::Header)?.clone();
    if headers.is_empty() {
        return Err(LoadError::MissingHeader);
    }
    let shelter_idx = column_index(&headers, SHELTER_COLUMN)?;
    let period_idx = column_index(&headers, PERIOD_COLUMN)?;
    let total_idx = column_index(&headers, TOTAL_COLUMN)?;

    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for result in reader.records() {
        report.rows_read += 1;
        let Ok(row) = result else {
            report.unreadable += 1;
            continue;
        };

        let shelter = row.get(shelter_idx).map(str::trim).unwrap_or_default();
        if shelter.is_empty() {
            report.missing_shelter += 1;
            continue;
        }
        let Some(period_start) = row.get(period_idx).and_then(parse_period) else {
            report.bad_period += 1;
            continue;
        };
        let amount = row.get(total_idx).map(parse_amount).unwrap_or(0.0);

        records.push(RawRecord::new(shelter, period_start, amount));
        report.rows_kept += 1;
    }

    if report.dropped() > 0 {
        tracing::debug!(
            dropped = report.dropped(),
            missing_shelter = report.missing_shelter,
            bad_period = report.bad_period,
            unreadable = report.unreadable,
            "Dropped malformed grievance rows"
        );
    }

    Ok((records, report))
}

/// Parse grievance rows from CSV text (e.g. a fetched response body).
pub fn parse_grievances(text: &str) -> Result<(Vec<RawRecord>, LoadReport), LoadError> {
    read_grievances(text.as_bytes())
}

/// Read grievance rows from a file on disk.
pub fn load_grievances(path: &Path) -> Result<(Vec<RawRecord>, LoadReport), LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    read_grievances(file)
}
