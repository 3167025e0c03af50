use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::{ParameterKind, Trend, WaterParameterReading};
use crate::units::round2;

/// Count, latest reading, average and trend over a set of readings
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSummary {
    pub count: usize,
    pub latest: Option<WaterParameterReading>,
    pub average: Option<f64>,
    pub trend: Option<Trend>,
}

impl ParameterSummary {
    pub fn empty() -> Self {
        Self {
            count: 0,
            latest: None,
            average: None,
            trend: None,
        }
    }
}

/// History window offered by the parameter history view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Week,
    Month,
    ThreeMonths,
    All,
}

impl TimeWindow {
    pub fn duration(&self) -> Option<Duration> {
        match self {
            TimeWindow::Week => Some(Duration::days(7)),
            TimeWindow::Month => Some(Duration::days(30)),
            TimeWindow::ThreeMonths => Some(Duration::days(90)),
            TimeWindow::All => None,
        }
    }

    /// Earliest tested time still inside the window
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.duration().map(|d| now - d)
    }
}

/// Chronological order with identity as tie-break. The maximum under this
/// order is the latest reading, the minimum is the first.
fn chronological(a: &WaterParameterReading, b: &WaterParameterReading) -> Ordering {
    a.record
        .tested_at
        .cmp(&b.record.tested_at)
        .then_with(|| a.record.id.cmp(&b.record.id))
}

/// Latest reading by tested time; among equal times the greatest id wins
pub fn latest(readings: &[WaterParameterReading]) -> Option<&WaterParameterReading> {
    readings.iter().max_by(|a, b| chronological(a, b))
}

/// Earliest reading by tested time; among equal times the smallest id wins
pub fn earliest(readings: &[WaterParameterReading]) -> Option<&WaterParameterReading> {
    readings.iter().min_by(|a, b| chronological(a, b))
}

/// Summarize readings of a single parameter.
///
/// Callers filter to one tank, parameter and window beforehand.
pub fn summarize(readings: &[WaterParameterReading]) -> ParameterSummary {
    let (Some(latest), Some(first)) = (latest(readings), earliest(readings)) else {
        return ParameterSummary::empty();
    };

    let sum: f64 = readings.iter().map(|r| r.record.value).sum();
    let average = round2(sum / readings.len() as f64);

    let trend = match latest.record.value.partial_cmp(&first.record.value) {
        Some(Ordering::Greater) => Trend::Up,
        Some(Ordering::Less) => Trend::Down,
        _ => Trend::Stable,
    };

    ParameterSummary {
        count: readings.len(),
        latest: Some(latest.clone()),
        average: Some(average),
        trend: Some(trend),
    }
}

/// Group readings by parameter kind and summarize each group
pub fn summarize_by_kind(
    readings: &[WaterParameterReading],
) -> BTreeMap<ParameterKind, ParameterSummary> {
    let mut groups: BTreeMap<ParameterKind, Vec<WaterParameterReading>> = BTreeMap::new();
    for reading in readings {
        groups
            .entry(reading.record.kind)
            .or_default()
            .push(reading.clone());
    }

    groups
        .into_iter()
        .map(|(kind, group)| (kind, summarize(&group)))
        .collect()
}

/// Readings tested at or after the window's cutoff
pub fn filter_window(
    readings: &[WaterParameterReading],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Vec<WaterParameterReading> {
    match window.cutoff(now) {
        Some(cutoff) => readings
            .iter()
            .filter(|r| r.record.tested_at >= cutoff)
            .cloned()
            .collect(),
        None => readings.to_vec(),
    }
}

/// Newest first, with the same tie-break as [`latest`]
pub fn sort_newest_first(readings: &mut [WaterParameterReading]) {
    readings.sort_by(|a, b| chronological(b, a));
}
