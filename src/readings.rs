use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::{classify, is_within_range};
use crate::domain::{EnvironmentType, ParameterKind, ReadingRecord, WaterParameterReading};
use crate::id_generator::IdGenerator;
use crate::ranges::range_for;
use crate::time::Clock;
use crate::units::format_display_value;
use crate::validators::{require, validate, RawValue, ValidationErrors, ValidationIssue};

/// Raw input for a new reading, as submitted by the entry form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewReading {
    pub tank_id: String,
    pub kind: ParameterKind,
    pub value: RawValue,
    /// Falls back to the range table unit when absent or blank
    #[serde(default)]
    pub unit: Option<String>,
    /// Defaults to the current time
    #[serde(default)]
    pub tested_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    pub owner_id: String,
}

/// Partial change to an existing reading. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReadingUpdate {
    pub kind: Option<ParameterKind>,
    pub value: Option<RawValue>,
    pub unit: Option<String>,
    pub tested_at: Option<DateTime<Utc>>,
    /// `Some(None)` clears the notes
    pub notes: Option<Option<String>>,
}

impl WaterParameterReading {
    /// Derive display and status fields from a stored record.
    ///
    /// `environment` is the owning tank's type; `None` means the tank is gone
    /// and the reading classifies as unknown.
    pub fn from_record(record: ReadingRecord, environment: Option<EnvironmentType>) -> Self {
        let range = environment.and_then(|env| range_for(env, record.kind));
        let status = classify(record.value, range);

        Self {
            display_value: format_display_value(record.value, &record.unit),
            parameter_display_name: record.kind.label(),
            is_within_range: is_within_range(record.value, range),
            status,
            status_color: status.color().to_string(),
            record,
        }
    }
}

fn resolve_unit(unit: Option<String>, environment: EnvironmentType, kind: ParameterKind) -> String {
    match unit {
        Some(unit) if !unit.trim().is_empty() => unit.trim().to_string(),
        _ => range_for(environment, kind)
            .map(|range| range.unit)
            .unwrap_or_else(|| kind.default_unit())
            .to_string(),
    }
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

/// Validate input and construct a fully derived reading.
///
/// Nothing is persisted here; on failure no record is produced and the
/// validator's issues are returned as-is.
pub fn build_reading(
    input: NewReading,
    environment: EnvironmentType,
    clock: &dyn Clock,
    id_generator: &dyn IdGenerator,
) -> Result<WaterParameterReading, ValidationErrors> {
    let mut issues: Vec<ValidationIssue> = [
        require("tank_id", &input.tank_id),
        require("owner_id", &input.owner_id),
    ]
    .into_iter()
    .flatten()
    .collect();

    let result = validate(environment, input.kind, &input.value);
    issues.extend(result.errors);

    let value = match input.value.to_finite() {
        Some(value) if issues.is_empty() => value,
        _ => return Err(ValidationErrors(issues)),
    };

    let now = clock.now();
    let record = ReadingRecord {
        id: id_generator.new_id(),
        tank_id: input.tank_id,
        kind: input.kind,
        value,
        unit: resolve_unit(input.unit, environment, input.kind),
        tested_at: input.tested_at.unwrap_or(now),
        notes: normalize_notes(input.notes),
        owner_id: input.owner_id,
        created_at: now,
        updated_at: now,
    };

    Ok(WaterParameterReading::from_record(record, Some(environment)))
}

/// Merge an update into a stored record, re-validating the value whenever
/// the value or parameter kind changes, and re-deriving the classification.
pub fn apply_update(
    record: ReadingRecord,
    update: ReadingUpdate,
    environment: Option<EnvironmentType>,
    clock: &dyn Clock,
) -> Result<WaterParameterReading, ValidationErrors> {
    let mut record = record;
    let kind_changed = update.kind.is_some_and(|kind| kind != record.kind);
    if let Some(kind) = update.kind {
        record.kind = kind;
    }

    let value_changed = update.value.is_some();
    let raw = update.value.unwrap_or(RawValue::Number(record.value));
    if value_changed || kind_changed {
        // Orphaned readings have no environment; fall back to the
        // plausibility bounds used for unlisted parameters.
        let env = environment.unwrap_or(EnvironmentType::Pond);
        validate(env, record.kind, &raw).into_errors()?;
    }
    if let Some(value) = raw.to_finite() {
        record.value = value;
    }

    // A new kind without an explicit unit takes the new kind's unit
    let unit = match update.unit {
        Some(unit) => Some(unit),
        None if kind_changed => Some(String::new()),
        None => None,
    };
    if let Some(unit) = unit {
        record.unit = match environment {
            Some(env) => resolve_unit(Some(unit), env, record.kind),
            None if unit.trim().is_empty() => record.kind.default_unit().to_string(),
            None => unit.trim().to_string(),
        };
    }
    if let Some(tested_at) = update.tested_at {
        record.tested_at = tested_at;
    }
    if let Some(notes) = update.notes {
        record.notes = normalize_notes(notes);
    }
    record.updated_at = clock.now();

    Ok(WaterParameterReading::from_record(record, environment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StatusTier;
    use crate::id_generator::FixedIdGenerator;
    use crate::test_utils::fixtures;
    use crate::time::FixedClock;
    use crate::validators::IssueCode;

    fn clock() -> FixedClock {
        FixedClock::from_rfc3339("2024-03-01T09:00:00Z").unwrap()
    }

    fn ids() -> FixedIdGenerator {
        FixedIdGenerator::from_strings(&["reading-1", "reading-2"])
    }

    #[test]
    fn test_build_reading_populates_derived_fields() {
        let input = fixtures::new_reading("tank-1", ParameterKind::Ph, 7.2);
        let reading =
            build_reading(input, EnvironmentType::Freshwater, &clock(), &ids()).unwrap();

        assert_eq!(reading.id(), "reading-1");
        assert_eq!(reading.record.unit, "pH");
        assert_eq!(reading.display_value, "7.2pH");
        assert_eq!(reading.parameter_display_name, "pH");
        assert!(reading.is_within_range);
        assert_eq!(reading.status, StatusTier::Optimal);
        assert_eq!(reading.status_color, "#4CAF50");
        assert_eq!(reading.record.created_at, clock().now());
        assert_eq!(reading.record.updated_at, clock().now());
        // tested_at defaults to now
        assert_eq!(reading.tested_at(), clock().now());
    }

    #[test]
    fn test_build_reading_acceptable_tier() {
        let mut input = fixtures::new_reading("tank-1", ParameterKind::Nitrate, 40.0);
        input.unit = Some(" ppm ".to_string());
        input.notes = Some("   ".to_string());
        let reading =
            build_reading(input, EnvironmentType::Freshwater, &clock(), &ids()).unwrap();

        assert_eq!(reading.status, StatusTier::Acceptable);
        assert_eq!(reading.status_color, "#8BC34A");
        assert_eq!(reading.record.unit, "ppm");
        assert_eq!(reading.record.notes, None);
    }

    #[test]
    fn test_build_reading_rejects_out_of_domain_value() {
        let input = fixtures::new_reading("tank-1", ParameterKind::Ph, 15.0);
        let generator = ids();
        let errors =
            build_reading(input, EnvironmentType::Freshwater, &clock(), &generator).unwrap_err();

        assert!(errors.has_code(IssueCode::OutOfDomain));
        // No identity is consumed for a rejected reading
        assert_eq!(generator.current_index(), 0);
    }

    #[test]
    fn test_build_reading_surfaces_validator_errors_unchanged() {
        let input = fixtures::new_reading("tank-1", ParameterKind::Ph, 15.0);
        let expected = validate(EnvironmentType::Freshwater, ParameterKind::Ph, &input.value).errors;
        let errors =
            build_reading(input, EnvironmentType::Freshwater, &clock(), &ids()).unwrap_err();
        assert_eq!(errors.0, expected);
    }

    #[test]
    fn test_build_reading_requires_references() {
        let mut input = fixtures::new_reading("", ParameterKind::Ph, 7.0);
        input.owner_id = String::new();
        let errors =
            build_reading(input, EnvironmentType::Freshwater, &clock(), &ids()).unwrap_err();
        assert_eq!(errors.0.len(), 2);
        assert!(errors.has_code(IssueCode::Required));
    }

    #[test]
    fn test_build_reading_without_range_entry_is_unknown() {
        let input = fixtures::new_reading("pond-1", ParameterKind::Temperature, 12.0);
        let reading = build_reading(input, EnvironmentType::Pond, &clock(), &ids()).unwrap();

        assert_eq!(reading.status, StatusTier::Unknown);
        assert_eq!(reading.status_color, "#9E9E9E");
        assert_eq!(reading.record.unit, "°C");
        assert!(reading.is_within_range);
    }

    #[test]
    fn test_from_record_orphaned_reading_is_unknown() {
        let record = fixtures::reading_record("r-1", ParameterKind::Ph, 15.0, 1);
        let reading = WaterParameterReading::from_record(record, None);
        assert_eq!(reading.status, StatusTier::Unknown);
    }

    #[test]
    fn test_from_record_reclassifies_on_load() {
        let record = fixtures::reading_record("r-1", ParameterKind::Ph, 9.3, 1);
        let reading = WaterParameterReading::from_record(record, Some(EnvironmentType::Freshwater));
        assert_eq!(reading.status, StatusTier::Caution);
        assert!(!reading.is_within_range);

        // The same value in a saltwater tank is far outside 7.8..8.5
        let record = fixtures::reading_record("r-1", ParameterKind::Ph, 9.3, 1);
        let reading = WaterParameterReading::from_record(record, Some(EnvironmentType::Saltwater));
        assert_eq!(reading.status, StatusTier::Danger);
    }

    #[test]
    fn test_apply_update_reclassifies() {
        let record = fixtures::reading_record("r-1", ParameterKind::Ph, 7.0, 1);
        let later = clock();
        later.advance_days(1);

        let update = ReadingUpdate {
            value: Some(RawValue::from("8.5")),
            notes: Some(Some("after water change".to_string())),
            ..Default::default()
        };
        let reading =
            apply_update(record, update, Some(EnvironmentType::Freshwater), &later).unwrap();

        assert_eq!(reading.value(), 8.5);
        assert_eq!(reading.status, StatusTier::Acceptable);
        assert_eq!(reading.record.notes.as_deref(), Some("after water change"));
        assert_eq!(reading.record.updated_at, later.now());
    }

    #[test]
    fn test_apply_update_rejects_invalid_value() {
        let record = fixtures::reading_record("r-1", ParameterKind::Ph, 7.0, 1);
        let update = ReadingUpdate {
            value: Some(RawValue::from("abc")),
            ..Default::default()
        };
        let errors =
            apply_update(record, update, Some(EnvironmentType::Freshwater), &clock()).unwrap_err();
        assert!(errors.has_code(IssueCode::InvalidNumber));
    }

    #[test]
    fn test_apply_update_kind_change_revalidates_existing_value() {
        // 7.0 is a fine pH but far outside the freshwater ammonia domain
        let record = fixtures::reading_record("r-1", ParameterKind::Ph, 7.0, 1);
        let update = ReadingUpdate {
            kind: Some(ParameterKind::Ammonia),
            ..Default::default()
        };
        let errors =
            apply_update(record, update, Some(EnvironmentType::Freshwater), &clock()).unwrap_err();
        assert!(errors.has_code(IssueCode::OutOfDomain));
    }

    #[test]
    fn test_apply_update_kind_change_takes_new_unit() {
        let record = fixtures::reading_record("r-1", ParameterKind::Ph, 7.0, 1);
        let update = ReadingUpdate {
            kind: Some(ParameterKind::Nitrate),
            ..Default::default()
        };
        let reading =
            apply_update(record, update, Some(EnvironmentType::Freshwater), &clock()).unwrap();

        assert_eq!(reading.kind(), ParameterKind::Nitrate);
        assert_eq!(reading.record.unit, "ppm");
        assert_eq!(reading.display_value, "7ppm");
        assert_eq!(reading.parameter_display_name, "Nitrate");
    }

    #[test]
    fn test_apply_update_kind_change_keeps_explicit_unit() {
        let record = fixtures::reading_record("r-1", ParameterKind::Ph, 7.0, 1);
        let update = ReadingUpdate {
            kind: Some(ParameterKind::Nitrate),
            unit: Some("mg/L".to_string()),
            ..Default::default()
        };
        let reading =
            apply_update(record, update, Some(EnvironmentType::Freshwater), &clock()).unwrap();
        assert_eq!(reading.record.unit, "mg/L");
    }

    #[test]
    fn test_apply_update_kind_change_on_orphan_uses_default_unit() {
        let record = fixtures::reading_record("r-1", ParameterKind::Ph, 7.0, 1);
        let update = ReadingUpdate {
            kind: Some(ParameterKind::Salinity),
            ..Default::default()
        };
        let reading = apply_update(record, update, None, &clock()).unwrap();
        assert_eq!(reading.record.unit, "ppt");
        assert_eq!(reading.status, StatusTier::Unknown);
    }

    #[test]
    fn test_apply_update_same_kind_keeps_unit() {
        let mut record = fixtures::reading_record("r-1", ParameterKind::Nitrate, 10.0, 1);
        record.unit = "mg/L".to_string();
        let update = ReadingUpdate {
            kind: Some(ParameterKind::Nitrate),
            value: Some(RawValue::Number(12.0)),
            ..Default::default()
        };
        let reading =
            apply_update(record, update, Some(EnvironmentType::Freshwater), &clock()).unwrap();
        assert_eq!(reading.record.unit, "mg/L");
    }
}

