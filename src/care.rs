//! Maintenance checks derived from recorded readings: critical alerts that
//! need immediate attention and parameters that are due for testing.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::aggregation::latest;
use crate::domain::{EnvironmentType, ParameterKind, WaterParameterReading};
use crate::ranges::{critical_limits, parameters_for, testing_frequency, TestingFrequency};

/// Which side of a critical limit a reading crossed
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Low,
    High,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CriticalAlert {
    pub kind: ParameterKind,
    pub reading_id: String,
    pub value: f64,
    pub threshold: f64,
    pub direction: AlertDirection,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverdueParameter {
    pub kind: ParameterKind,
    pub frequency: TestingFrequency,
    pub last_tested: Option<DateTime<Utc>>,
    /// `None` when the parameter has never been tested
    pub due_at: Option<DateTime<Utc>>,
}

/// Check a single reading against the critical limits for its parameter
pub fn critical_alert_for(reading: &WaterParameterReading) -> Option<CriticalAlert> {
    let limits = critical_limits(reading.record.kind)?;
    let value = reading.record.value;

    let (threshold, direction) = match (limits.low, limits.high) {
        (Some(low), _) if value < low => (low, AlertDirection::Low),
        (_, Some(high)) if value > high => (high, AlertDirection::High),
        _ => return None,
    };

    let side = match direction {
        AlertDirection::Low => "below",
        AlertDirection::High => "above",
    };
    Some(CriticalAlert {
        kind: reading.record.kind,
        reading_id: reading.record.id.clone(),
        value,
        threshold,
        direction,
        message: format!(
            "{} {} is {} the critical limit of {}",
            reading.record.kind.label(),
            reading.display_value,
            side,
            threshold
        ),
    })
}

/// Alerts for the latest reading of each parameter. Older readings that
/// have since been corrected do not alert.
pub fn critical_alerts(readings: &[WaterParameterReading]) -> Vec<CriticalAlert> {
    ParameterKind::ALL
        .iter()
        .filter_map(|kind| {
            let of_kind: Vec<WaterParameterReading> = readings
                .iter()
                .filter(|r| r.record.kind == *kind)
                .cloned()
                .collect();
            latest(&of_kind).and_then(critical_alert_for)
        })
        .collect()
}

/// When the parameter should next be tested, given its last test
pub fn next_test_due(kind: ParameterKind, last_tested: DateTime<Utc>) -> Option<DateTime<Utc>> {
    testing_frequency(kind).map(|freq| last_tested + Duration::days(freq.interval_days()))
}

/// Parameters of the environment's range table that were never tested or
/// whose latest test is older than the recommended interval.
pub fn overdue_parameters(
    environment: EnvironmentType,
    readings: &[WaterParameterReading],
    now: DateTime<Utc>,
) -> Vec<OverdueParameter> {
    parameters_for(environment)
        .into_iter()
        .filter_map(|kind| {
            let frequency = testing_frequency(kind)?;
            let last_tested = readings
                .iter()
                .filter(|r| r.record.kind == kind)
                .map(|r| r.record.tested_at)
                .max();

            match last_tested {
                None => Some(OverdueParameter {
                    kind,
                    frequency,
                    last_tested: None,
                    due_at: None,
                }),
                Some(last) => {
                    let due_at = next_test_due(kind, last)?;
                    (due_at < now).then_some(OverdueParameter {
                        kind,
                        frequency,
                        last_tested: Some(last),
                        due_at: Some(due_at),
                    })
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;

    fn reading(id: &str, kind: ParameterKind, value: f64, day: i64) -> WaterParameterReading {
        WaterParameterReading::from_record(
            fixtures::reading_record(id, kind, value, day),
            Some(EnvironmentType::Freshwater),
        )
    }

    #[test]
    fn test_critical_alert_high_ammonia() {
        let alert = critical_alert_for(&reading("a-1", ParameterKind::Ammonia, 0.8, 1)).unwrap();
        assert_eq!(alert.direction, AlertDirection::High);
        assert_eq!(alert.threshold, 0.5);
        assert!(alert.message.contains("Ammonia"));
        assert!(alert.message.contains("above"));
    }

    #[test]
    fn test_critical_alert_low_ph() {
        let alert = critical_alert_for(&reading("p-1", ParameterKind::Ph, 5.6, 1)).unwrap();
        assert_eq!(alert.direction, AlertDirection::Low);
        assert_eq!(alert.threshold, 6.0);
    }

    #[test]
    fn test_critical_limits_are_strict() {
        assert!(critical_alert_for(&reading("a", ParameterKind::Ammonia, 0.5, 1)).is_none());
        assert!(critical_alert_for(&reading("p", ParameterKind::Ph, 6.0, 1)).is_none());
        assert!(critical_alert_for(&reading("h", ParameterKind::Hardness, 29.0, 1)).is_none());
    }

    #[test]
    fn test_critical_alerts_use_latest_reading_only() {
        let readings = vec![
            reading("n-1", ParameterKind::Nitrite, 0.9, 1),
            reading("n-2", ParameterKind::Nitrite, 0.1, 2),
            reading("t-1", ParameterKind::Temperature, 36.0, 2),
        ];
        let alerts = critical_alerts(&readings);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, ParameterKind::Temperature);
        assert_eq!(alerts[0].reading_id, "t-1");
    }

    #[test]
    fn test_next_test_due() {
        assert_eq!(
            next_test_due(ParameterKind::Ph, fixtures::day(1)),
            Some(fixtures::day(8))
        );
        assert_eq!(next_test_due(ParameterKind::DissolvedOxygen, fixtures::day(1)), None);
    }

    #[test]
    fn test_overdue_parameters() {
        let readings = vec![
            reading("t", ParameterKind::Temperature, 25.0, 9),
            reading("p", ParameterKind::Ph, 7.0, 1),
            reading("n", ParameterKind::Nitrate, 10.0, 5),
        ];
        let overdue = overdue_parameters(EnvironmentType::Freshwater, &readings, fixtures::day(10));
        let kinds: Vec<ParameterKind> = overdue.iter().map(|o| o.kind).collect();

        // Temperature tested yesterday (due exactly now) and nitrate within two weeks
        assert!(!kinds.contains(&ParameterKind::Temperature));
        assert!(!kinds.contains(&ParameterKind::Nitrate));
        // pH last tested 9 days ago on a weekly schedule
        assert!(kinds.contains(&ParameterKind::Ph));
        // Never tested
        assert!(kinds.contains(&ParameterKind::Ammonia));
        assert!(kinds.contains(&ParameterKind::Alkalinity));
        assert_eq!(kinds.len(), 5);

        let ph = overdue.iter().find(|o| o.kind == ParameterKind::Ph).unwrap();
        assert_eq!(ph.due_at, Some(fixtures::day(8)));
        let ammonia = overdue.iter().find(|o| o.kind == ParameterKind::Ammonia).unwrap();
        assert_eq!(ammonia.last_tested, None);
    }

    #[test]
    fn test_overdue_parameters_pond_has_none() {
        assert!(overdue_parameters(EnvironmentType::Pond, &[], fixtures::day(1)).is_empty());
    }
}
