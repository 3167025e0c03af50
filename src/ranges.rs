use serde::Serialize;

use crate::domain::{EnvironmentType, ParameterKind};

/// Bounds for one parameter in one environment.
///
/// `min..=max` is the accepted domain; `optimal_min..=optimal_max` is the
/// target band inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
    pub optimal_min: f64,
    pub optimal_max: f64,
    pub unit: &'static str,
    pub description: &'static str,
}

impl ParameterRange {
    const fn new(
        min: f64,
        max: f64,
        optimal_min: f64,
        optimal_max: f64,
        unit: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            min,
            max,
            optimal_min,
            optimal_max,
            unit,
            description,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_optimal(&self, value: f64) -> bool {
        value >= self.optimal_min && value <= self.optimal_max
    }
}

// ============================================================================
// Range Table
// ============================================================================

const FRESHWATER: &[(ParameterKind, ParameterRange)] = &[
    (
        ParameterKind::Temperature,
        ParameterRange::new(18.0, 32.0, 22.0, 28.0, "°C", "Water temperature in Celsius"),
    ),
    (
        ParameterKind::Ph,
        ParameterRange::new(5.5, 9.0, 6.8, 7.8, "pH", "pH level (acidity/alkalinity)"),
    ),
    (
        ParameterKind::Ammonia,
        ParameterRange::new(0.0, 0.5, 0.0, 0.02, "ppm", "Ammonia concentration"),
    ),
    (
        ParameterKind::Nitrite,
        ParameterRange::new(0.0, 0.5, 0.0, 0.02, "ppm", "Nitrite concentration"),
    ),
    (
        ParameterKind::Nitrate,
        ParameterRange::new(0.0, 100.0, 0.0, 20.0, "ppm", "Nitrate concentration"),
    ),
    (
        ParameterKind::Hardness,
        ParameterRange::new(1.0, 30.0, 5.0, 15.0, "°dGH", "General hardness"),
    ),
    (
        ParameterKind::Alkalinity,
        ParameterRange::new(1.0, 20.0, 4.0, 8.0, "°dKH", "Carbonate hardness (alkalinity)"),
    ),
];

const SALTWATER: &[(ParameterKind, ParameterRange)] = &[
    (
        ParameterKind::Temperature,
        ParameterRange::new(22.0, 30.0, 24.0, 27.0, "°C", "Water temperature in Celsius"),
    ),
    (
        ParameterKind::Ph,
        ParameterRange::new(7.8, 8.5, 8.0, 8.3, "pH", "pH level (should be alkaline)"),
    ),
    (
        ParameterKind::Salinity,
        ParameterRange::new(30.0, 40.0, 34.0, 36.0, "ppt", "Salinity in parts per thousand"),
    ),
    (
        ParameterKind::Ammonia,
        ParameterRange::new(0.0, 0.25, 0.0, 0.01, "ppm", "Ammonia concentration"),
    ),
    (
        ParameterKind::Nitrite,
        ParameterRange::new(0.0, 0.25, 0.0, 0.01, "ppm", "Nitrite concentration"),
    ),
    (
        ParameterKind::Nitrate,
        ParameterRange::new(0.0, 50.0, 0.0, 10.0, "ppm", "Nitrate concentration"),
    ),
];

const BRACKISH: &[(ParameterKind, ParameterRange)] = &[
    (
        ParameterKind::Temperature,
        ParameterRange::new(20.0, 30.0, 22.0, 28.0, "°C", "Water temperature in Celsius"),
    ),
    (
        ParameterKind::Ph,
        ParameterRange::new(7.0, 8.5, 7.5, 8.2, "pH", "pH level (slightly alkaline)"),
    ),
    (
        ParameterKind::Salinity,
        ParameterRange::new(5.0, 25.0, 10.0, 20.0, "ppt", "Salinity in parts per thousand"),
    ),
    (
        ParameterKind::Ammonia,
        ParameterRange::new(0.0, 0.3, 0.0, 0.02, "ppm", "Ammonia concentration"),
    ),
    (
        ParameterKind::Nitrite,
        ParameterRange::new(0.0, 0.3, 0.0, 0.02, "ppm", "Nitrite concentration"),
    ),
    (
        ParameterKind::Nitrate,
        ParameterRange::new(0.0, 40.0, 0.0, 15.0, "ppm", "Nitrate concentration"),
    ),
];

/// Ponds have no published ranges yet; every pond reading classifies as unknown.
const POND: &[(ParameterKind, ParameterRange)] = &[];

fn table(environment: EnvironmentType) -> &'static [(ParameterKind, ParameterRange)] {
    match environment {
        EnvironmentType::Freshwater => FRESHWATER,
        EnvironmentType::Saltwater => SALTWATER,
        EnvironmentType::Brackish => BRACKISH,
        EnvironmentType::Pond => POND,
    }
}

/// Look up the range for a parameter in an environment
pub fn range_for(
    environment: EnvironmentType,
    kind: ParameterKind,
) -> Option<&'static ParameterRange> {
    table(environment)
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, range)| range)
}

/// Parameters that have a range entry for the environment, in table order
pub fn parameters_for(environment: EnvironmentType) -> Vec<ParameterKind> {
    table(environment).iter().map(|(kind, _)| *kind).collect()
}

// ============================================================================
// Testing Frequency
// ============================================================================

/// Recommended interval between tests of a parameter
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestingFrequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl TestingFrequency {
    pub fn interval_days(&self) -> i64 {
        match self {
            TestingFrequency::Daily => 1,
            TestingFrequency::Weekly => 7,
            TestingFrequency::Biweekly => 14,
            TestingFrequency::Monthly => 30,
        }
    }
}

/// Returns `None` for parameters with no testing recommendation (dissolved oxygen).
pub fn testing_frequency(kind: ParameterKind) -> Option<TestingFrequency> {
    match kind {
        ParameterKind::Temperature => Some(TestingFrequency::Daily),
        ParameterKind::Ph | ParameterKind::Ammonia | ParameterKind::Nitrite => {
            Some(TestingFrequency::Weekly)
        }
        ParameterKind::Nitrate | ParameterKind::Hardness | ParameterKind::Alkalinity => {
            Some(TestingFrequency::Biweekly)
        }
        ParameterKind::Phosphate | ParameterKind::Salinity => Some(TestingFrequency::Monthly),
        ParameterKind::DissolvedOxygen => None,
    }
}

// ============================================================================
// Critical Thresholds
// ============================================================================

/// Limits that need immediate attention regardless of tank type.
/// A reading is critical when strictly below `low` or strictly above `high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriticalLimits {
    pub low: Option<f64>,
    pub high: Option<f64>,
}

pub fn critical_limits(kind: ParameterKind) -> Option<CriticalLimits> {
    match kind {
        ParameterKind::Ammonia | ParameterKind::Nitrite => Some(CriticalLimits {
            low: None,
            high: Some(0.5),
        }),
        ParameterKind::Nitrate => Some(CriticalLimits {
            low: None,
            high: Some(100.0),
        }),
        ParameterKind::Ph => Some(CriticalLimits {
            low: Some(6.0),
            high: Some(9.0),
        }),
        ParameterKind::Temperature => Some(CriticalLimits {
            low: Some(15.0),
            high: Some(35.0),
        }),
        ParameterKind::DissolvedOxygen
        | ParameterKind::Hardness
        | ParameterKind::Alkalinity
        | ParameterKind::Salinity
        | ParameterKind::Phosphate => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_entries_are_ordered() {
        for env in EnvironmentType::ALL {
            for (kind, range) in table(env) {
                assert!(
                    range.min <= range.optimal_min
                        && range.optimal_min <= range.optimal_max
                        && range.optimal_max <= range.max,
                    "{}/{} violates min <= optimal_min <= optimal_max <= max",
                    env,
                    kind
                );
            }
        }
    }

    #[test]
    fn test_no_duplicate_entries() {
        for env in EnvironmentType::ALL {
            let kinds = parameters_for(env);
            for (i, kind) in kinds.iter().enumerate() {
                assert!(!kinds[i + 1..].contains(kind), "{} listed twice for {}", kind, env);
            }
        }
    }

    #[test]
    fn test_freshwater_ph_range() {
        let range = range_for(EnvironmentType::Freshwater, ParameterKind::Ph).unwrap();
        assert_eq!(range.min, 5.5);
        assert_eq!(range.max, 9.0);
        assert_eq!(range.optimal_min, 6.8);
        assert_eq!(range.optimal_max, 7.8);
        assert_eq!(range.unit, "pH");
    }

    #[test]
    fn test_environment_specific_parameters() {
        assert!(range_for(EnvironmentType::Freshwater, ParameterKind::Salinity).is_none());
        assert!(range_for(EnvironmentType::Saltwater, ParameterKind::Salinity).is_some());
        assert!(range_for(EnvironmentType::Saltwater, ParameterKind::Hardness).is_none());
        assert!(parameters_for(EnvironmentType::Pond).is_empty());
        assert_eq!(parameters_for(EnvironmentType::Freshwater).len(), 7);
        assert_eq!(parameters_for(EnvironmentType::Brackish).len(), 6);
    }

    #[test]
    fn test_testing_frequency() {
        assert_eq!(
            testing_frequency(ParameterKind::Temperature),
            Some(TestingFrequency::Daily)
        );
        assert_eq!(testing_frequency(ParameterKind::Ph), Some(TestingFrequency::Weekly));
        assert_eq!(
            testing_frequency(ParameterKind::Salinity),
            Some(TestingFrequency::Monthly)
        );
        assert_eq!(testing_frequency(ParameterKind::DissolvedOxygen), None);
        assert_eq!(TestingFrequency::Biweekly.interval_days(), 14);
    }

    #[test]
    fn test_critical_limits() {
        let ph = critical_limits(ParameterKind::Ph).unwrap();
        assert_eq!(ph.low, Some(6.0));
        assert_eq!(ph.high, Some(9.0));
        assert!(critical_limits(ParameterKind::Hardness).is_none());
    }
}
