use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::domain::{EnvironmentType, ParameterKind};
use crate::error::error_codes;
use crate::ranges::range_for;
use crate::units::format_bound;

pub const TANK_NAME_MAX_CHARS: usize = 50;
pub const TANK_VOLUME_MAX_LITERS: f64 = 10_000.0;

/// Machine-readable reason a value was rejected
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Not a finite number, or text that does not parse as one
    InvalidNumber,
    /// Outside the range table's `[min, max]` for the tank's environment
    OutOfDomain,
    /// Outside physical plausibility bounds (used when no range entry exists)
    Implausible,
    Required,
    TooLong,
    InvalidChoice,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::InvalidNumber => error_codes::INVALID_NUMBER,
            IssueCode::OutOfDomain => error_codes::OUT_OF_DOMAIN,
            IssueCode::Implausible => error_codes::IMPLAUSIBLE_VALUE,
            IssueCode::Required => error_codes::MISSING_FIELD,
            IssueCode::TooLong => error_codes::FIELD_TOO_LONG,
            IssueCode::InvalidChoice => error_codes::INVALID_CHOICE,
        }
    }
}

/// Single validation failure for one field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationIssue {
    pub field: String,
    pub code: IssueCode,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Non-empty list of validation failures, surfaced to the caller unchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrors(pub Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn single(issue: ValidationIssue) -> Self {
        Self(vec![issue])
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|issue| issue.message.clone()).collect()
    }

    pub fn has_code(&self, code: IssueCode) -> bool {
        self.0.iter().any(|issue| issue.code == code)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|issue| issue.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

/// Outcome of a validation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn into_errors(self) -> Result<(), ValidationErrors> {
        if self.is_valid {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// Value as entered: either already numeric or free text from a form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Finite numeric value, or `None` when empty, unparseable, NaN or infinite
    pub fn to_finite(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) if v.is_finite() => Some(*v),
            RawValue::Number(_) => None,
            RawValue::Text(text) => parse_decimal(text),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// Parse a plain decimal literal. `str::parse::<f64>` alone would also accept
/// "NaN", "inf" and exponent forms, none of which come from a test kit.
pub fn parse_decimal(text: &str) -> Option<f64> {
    static DECIMAL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = DECIMAL_REGEX
        .get_or_init(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("valid decimal regex"));

    let trimmed = text.trim();
    if !regex.is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Physical plausibility bounds, applied when the range table has no entry
/// for the parameter in the tank's environment.
fn plausibility_bounds(kind: ParameterKind) -> (f64, f64, &'static str) {
    match kind {
        ParameterKind::Ph => (0.0, 14.0, "pH must be between 0 and 14"),
        ParameterKind::Temperature => (-5.0, 50.0, "Temperature must be between -5°C and 50°C"),
        ParameterKind::Ammonia
        | ParameterKind::Nitrite
        | ParameterKind::Nitrate
        | ParameterKind::Phosphate => (
            0.0,
            1000.0,
            "Concentration must be between 0 and 1000 ppm",
        ),
        ParameterKind::Salinity => (0.0, 50.0, "Salinity must be between 0 and 50 ppt"),
        ParameterKind::Hardness | ParameterKind::Alkalinity => {
            (0.0, 50.0, "Hardness must be between 0 and 50 degrees")
        }
        ParameterKind::DissolvedOxygen => {
            (0.0, 20.0, "Dissolved oxygen must be between 0 and 20 ppm")
        }
    }
}

/// Validate a raw reading value for a parameter in an environment.
///
/// Values inside `[min, max]` pass regardless of the optimal sub-range.
pub fn validate(environment: EnvironmentType, kind: ParameterKind, raw: &RawValue) -> ValidationResult {
    let Some(value) = raw.to_finite() else {
        return ValidationResult::from_issues(vec![ValidationIssue::new(
            "value",
            IssueCode::InvalidNumber,
            "Please enter a valid number",
        )]);
    };

    match range_for(environment, kind) {
        Some(range) => {
            if range.contains(value) {
                ValidationResult::ok()
            } else {
                ValidationResult::from_issues(vec![ValidationIssue::new(
                    "value",
                    IssueCode::OutOfDomain,
                    format!(
                        "{} must be between {} and {} {}",
                        kind.label(),
                        format_bound(range.min),
                        format_bound(range.max),
                        range.unit
                    ),
                )])
            }
        }
        None => {
            let (min, max, message) = plausibility_bounds(kind);
            if value < min || value > max {
                ValidationResult::from_issues(vec![ValidationIssue::new(
                    "value",
                    IssueCode::Implausible,
                    message,
                )])
            } else {
                ValidationResult::ok()
            }
        }
    }
}

/// Validate and return the parsed value
pub fn validate_value(
    environment: EnvironmentType,
    kind: ParameterKind,
    raw: &RawValue,
) -> Result<f64, ValidationErrors> {
    validate(environment, kind, raw).into_errors()?;
    // validate() only passes finite values
    raw.to_finite().ok_or_else(|| {
        ValidationErrors::single(ValidationIssue::new(
            "value",
            IssueCode::InvalidNumber,
            "Please enter a valid number",
        ))
    })
}

/// Require a non-blank identifier or text field
pub fn require(field: &str, value: &str) -> Option<ValidationIssue> {
    if value.trim().is_empty() {
        Some(ValidationIssue::new(
            field,
            IssueCode::Required,
            format!("{} is required", field),
        ))
    } else {
        None
    }
}

/// Validate tank name and volume
pub fn validate_tank_fields(name: &str, volume_liters: f64) -> ValidationResult {
    let mut errors = Vec::new();

    let trimmed = name.trim();
    if trimmed.is_empty() {
        errors.push(ValidationIssue::new(
            "name",
            IssueCode::Required,
            "Tank name is required",
        ));
    } else if trimmed.chars().count() > TANK_NAME_MAX_CHARS {
        errors.push(ValidationIssue::new(
            "name",
            IssueCode::TooLong,
            format!("Tank name must be at most {} characters", TANK_NAME_MAX_CHARS),
        ));
    }

    if !volume_liters.is_finite() {
        errors.push(ValidationIssue::new(
            "volume_liters",
            IssueCode::InvalidNumber,
            "Volume must be a valid number",
        ));
    } else if volume_liters <= 0.0 {
        errors.push(ValidationIssue::new(
            "volume_liters",
            IssueCode::OutOfDomain,
            "Volume must be greater than 0",
        ));
    } else if volume_liters > TANK_VOLUME_MAX_LITERS {
        errors.push(ValidationIssue::new(
            "volume_liters",
            IssueCode::OutOfDomain,
            "Volume seems unusually large (max 10,000L)",
        ));
    }

    ValidationResult::from_issues(errors)
}
