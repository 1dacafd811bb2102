//! Human-readable text for steps, overlay, legend, and tooltips.

use chrono::NaiveDate;

use grievance_types::Frame;

use super::Timeline;

/// Heading and body inserted into one narrative step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepText {
    pub heading: String,
    pub body: String,
}

/// `Jan 01, 2021`
pub fn format_period(period: NaiveDate) -> String {
    period.format("%b %d, %Y").to_string()
}

/// Integral amounts print without a fractional part.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

pub fn step_text(frame: &Frame) -> StepText {
    StepText {
        heading: format!(
            "{} — {} grievances",
            format_period(frame.period),
            format_amount(frame.period_sum)
        ),
        body: format!("Total so far: {}", format_amount(frame.cumulative_sum)),
    }
}

/// One entry per frame, in frame order.
pub fn step_texts(timeline: &Timeline) -> Vec<StepText> {
    timeline.frames.iter().map(step_text).collect()
}

pub fn overlay_text(frame: &Frame) -> String {
    format!("Period: {}", format_period(frame.period))
}

/// Plain text tooltip lines: shelter name, then its running total.
pub fn tooltip_lines(shelter: &str, total: f64) -> (String, String) {
    (
        shelter.to_string(),
        format!("Cumulative: {}", format_amount(total)),
    )
}

pub fn legend_lines(sentinel: &str) -> Vec<String> {
    vec![
        "Bubble: Shelter".to_string(),
        "Size: Cumulative grievances".to_string(),
        "Tap or hover for details".to_string(),
        format!("{sentinel} appears gray when operating with zero reports."),
    ]
}
