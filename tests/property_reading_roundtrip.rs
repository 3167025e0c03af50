//! Property Test: Reading Persistence Round-Trip
//!
//! This property test verifies that:
//! - A built reading survives serialization to the stored JSON layout
//! - Re-deriving the loaded record reproduces value, unit, kind and tier
//! - Derived fields are recomputed on load rather than trusted from storage

use aquarium_core::ranges::range_for;
use aquarium_core::{
    build_reading, EnvironmentType, FixedClock, NewReading, ParameterKind, RawValue, ReadingRecord,
    SequentialIdGenerator, StatusTier, WaterParameterReading,
};
use proptest::prelude::*;

fn environment() -> impl Strategy<Value = EnvironmentType> {
    prop::sample::select(EnvironmentType::ALL.to_vec())
}

fn parameter_kind() -> impl Strategy<Value = ParameterKind> {
    prop::sample::select(ParameterKind::ALL.to_vec())
}

/// A value that passes validation for the pair: inside the domain when the
/// range table has an entry, otherwise inside a bound every kind accepts.
fn valid_input() -> impl Strategy<Value = (EnvironmentType, ParameterKind, f64)> {
    (environment(), parameter_kind(), 0.0f64..=1.0).prop_map(|(env, kind, t)| {
        let (min, max) = match range_for(env, kind) {
            Some(range) => (range.min, range.max),
            None => (0.0, 14.0),
        };
        let value = ((min + (max - min) * t) * 100.0).round() / 100.0;
        (env, kind, value.clamp(min, max))
    })
}

fn new_reading(kind: ParameterKind, value: f64) -> NewReading {
    NewReading {
        tank_id: "tank-1".to_string(),
        kind,
        value: RawValue::Number(value),
        unit: None,
        tested_at: None,
        notes: Some("weekly check".to_string()),
        owner_id: "user-1".to_string(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: build -> serialize -> deserialize -> re-derive is lossless
    #[test]
    fn prop_reading_roundtrip((env, kind, value) in valid_input()) {
        let clock = FixedClock::from_rfc3339("2024-05-01T12:30:00Z").unwrap();
        let ids = SequentialIdGenerator::new("reading");
        let built = build_reading(new_reading(kind, value), env, &clock, &ids).unwrap();

        let json = serde_json::to_string(&built.record).unwrap();
        let stored: ReadingRecord = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&stored, &built.record);

        let loaded = WaterParameterReading::from_record(stored, Some(env));
        prop_assert_eq!(loaded.value(), value);
        prop_assert_eq!(&loaded.record.unit, &built.record.unit);
        prop_assert_eq!(loaded.kind(), kind);
        prop_assert_eq!(loaded.status, built.status);
        prop_assert_eq!(&loaded, &built);
    }

    /// Property: the derived view deserializes from its own JSON too, and the
    /// stored tier is ignored in favour of the one recomputed on load
    #[test]
    fn prop_derived_fields_not_trusted((env, kind, value) in valid_input()) {
        let clock = FixedClock::from_rfc3339("2024-05-01T12:30:00Z").unwrap();
        let ids = SequentialIdGenerator::new("reading");
        let built = build_reading(new_reading(kind, value), env, &clock, &ids).unwrap();

        let mut tampered = built.clone();
        tampered.status = StatusTier::Danger;
        tampered.status_color = "#000000".to_string();
        let json = serde_json::to_string(&tampered).unwrap();

        let decoded: WaterParameterReading = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded.status, StatusTier::Danger);

        let reloaded = WaterParameterReading::from_record(decoded.into_record(), Some(env));
        prop_assert_eq!(reloaded, built);
    }
}
