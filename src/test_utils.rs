//! Test utilities for unit and property-based tests
//!
//! `generators` holds proptest strategies for the domain enums and reading
//! values, `fixtures` builds ready-made inputs and stored records, and
//! `helpers` carries stores that misbehave on purpose.

pub mod generators {
    use proptest::prelude::*;

    use crate::domain::{EnvironmentType, ParameterKind};
    use crate::ranges::{range_for, ParameterRange};

    pub fn environment() -> impl Strategy<Value = EnvironmentType> {
        prop::sample::select(EnvironmentType::ALL.to_vec())
    }

    pub fn parameter_kind() -> impl Strategy<Value = ParameterKind> {
        prop::sample::select(ParameterKind::ALL.to_vec())
    }

    /// Environment and kind pairs that have a range table entry
    pub fn ranged_pair() -> impl Strategy<Value = (EnvironmentType, ParameterKind, ParameterRange)>
    {
        let pairs: Vec<(EnvironmentType, ParameterKind, ParameterRange)> = EnvironmentType::ALL
            .iter()
            .flat_map(|env| {
                ParameterKind::ALL
                    .iter()
                    .filter_map(move |kind| range_for(*env, *kind).map(|r| (*env, *kind, *r)))
            })
            .collect();
        prop::sample::select(pairs)
    }

    /// Any f64 including NaN and the infinities
    pub fn any_value() -> impl Strategy<Value = f64> {
        prop_oneof![
            8 => -1.0e6f64..1.0e6f64,
            1 => Just(f64::NAN),
            1 => Just(f64::INFINITY),
            1 => Just(f64::NEG_INFINITY),
        ]
    }

    /// Plain decimal text such as "7.25" or "-0.5"
    pub fn decimal_text() -> impl Strategy<Value = String> {
        "[+-]?[0-9]{1,4}(\\.[0-9]{1,3})?"
    }

    /// Text that never parses as a reading value
    pub fn non_numeric_text() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("".to_string()),
            Just("NaN".to_string()),
            Just("inf".to_string()),
            Just("7,2".to_string()),
            Just("1e3".to_string()),
            "[a-z]{1,8}",
        ]
    }
}

pub mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::domain::{EnvironmentType, ParameterKind, ReadingRecord};
    use crate::readings::NewReading;
    use crate::repo::tanks::NewTank;
    use crate::validators::RawValue;

    /// Midnight UTC `n` days after 2024-01-01
    pub fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    pub fn new_tank(
        name: &str,
        environment: EnvironmentType,
        volume_liters: f64,
        owner_id: &str,
    ) -> NewTank {
        NewTank {
            name: name.to_string(),
            environment,
            volume_liters,
            description: None,
            photo_url: None,
            setup_date: None,
            owner_id: owner_id.to_string(),
        }
    }

    /// Reading input owned by "user-1" with unit, time and notes left to defaults
    pub fn new_reading(tank_id: &str, kind: ParameterKind, value: f64) -> NewReading {
        NewReading {
            tank_id: tank_id.to_string(),
            kind,
            value: RawValue::Number(value),
            unit: None,
            tested_at: None,
            notes: None,
            owner_id: "user-1".to_string(),
        }
    }

    /// Stored record for "tank-1" tested on `day(tested_day)`
    pub fn reading_record(id: &str, kind: ParameterKind, value: f64, tested_day: i64) -> ReadingRecord {
        let tested_at = day(tested_day);
        ReadingRecord {
            id: id.to_string(),
            tank_id: "tank-1".to_string(),
            kind,
            value,
            unit: kind.default_unit().to_string(),
            tested_at,
            notes: None,
            owner_id: "user-1".to_string(),
            created_at: tested_at,
            updated_at: tested_at,
        }
    }
}

pub mod helpers {
    use crate::error::StorageError;
    use crate::repo::store::KeyValueStore;

    /// Store whose every operation fails as if the backend were offline
    #[derive(Debug, Clone, Default)]
    pub struct UnavailableStore;

    impl KeyValueStore for UnavailableStore {
        async fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("store offline".to_string()))
        }

        async fn save(&self, _key: &str, _payload: String) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("store offline".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("store offline".to_string()))
        }
    }
}
