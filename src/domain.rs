use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::units::{format_display_value, title_case};
use crate::validators::{IssueCode, ValidationErrors, ValidationIssue};

// ============================================================================
// Enumerations
// ============================================================================

/// Kind of water body a tank holds. Selects the range table used for
/// validation and classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentType {
    Freshwater,
    Saltwater,
    Brackish,
    Pond,
}

impl EnvironmentType {
    pub const ALL: [EnvironmentType; 4] = [
        EnvironmentType::Freshwater,
        EnvironmentType::Saltwater,
        EnvironmentType::Brackish,
        EnvironmentType::Pond,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentType::Freshwater => "freshwater",
            EnvironmentType::Saltwater => "saltwater",
            EnvironmentType::Brackish => "brackish",
            EnvironmentType::Pond => "pond",
        }
    }

    /// Title-cased name shown next to a tank ("Saltwater").
    pub fn display_name(&self) -> String {
        title_case(self.as_str())
    }
}

impl fmt::Display for EnvironmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentType {
    type Err = ValidationErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnvironmentType::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ValidationErrors::single(ValidationIssue::new(
                    "tank_type",
                    IssueCode::InvalidChoice,
                    "Please select a valid tank type",
                ))
            })
    }
}

/// Water-quality parameter measured by a test kit or probe.
///
/// Older payloads stored unit-suffixed keys ("ammonia_ppm", "temperature_c");
/// those are still accepted on read and normalized on the next write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Ph,
    #[serde(alias = "temperature_c")]
    Temperature,
    #[serde(alias = "ammonia_ppm")]
    Ammonia,
    #[serde(alias = "nitrite_ppm")]
    Nitrite,
    #[serde(alias = "nitrate_ppm")]
    Nitrate,
    #[serde(alias = "oxygen", alias = "dissolved_oxygen_ppm", alias = "dissolved-oxygen")]
    DissolvedOxygen,
    #[serde(alias = "hardness_dgh")]
    Hardness,
    #[serde(alias = "alkalinity_dkh")]
    Alkalinity,
    #[serde(alias = "salinity_ppt")]
    Salinity,
    #[serde(alias = "phosphate_ppm")]
    Phosphate,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 10] = [
        ParameterKind::Ph,
        ParameterKind::Temperature,
        ParameterKind::Ammonia,
        ParameterKind::Nitrite,
        ParameterKind::Nitrate,
        ParameterKind::DissolvedOxygen,
        ParameterKind::Hardness,
        ParameterKind::Alkalinity,
        ParameterKind::Salinity,
        ParameterKind::Phosphate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::Ph => "ph",
            ParameterKind::Temperature => "temperature",
            ParameterKind::Ammonia => "ammonia",
            ParameterKind::Nitrite => "nitrite",
            ParameterKind::Nitrate => "nitrate",
            ParameterKind::DissolvedOxygen => "dissolved_oxygen",
            ParameterKind::Hardness => "hardness",
            ParameterKind::Alkalinity => "alkalinity",
            ParameterKind::Salinity => "salinity",
            ParameterKind::Phosphate => "phosphate",
        }
    }

    /// Human label. Title-cased from the key, except pH which keeps its
    /// conventional spelling.
    pub fn label(&self) -> String {
        match self {
            ParameterKind::Ph => "pH".to_string(),
            other => title_case(other.as_str()),
        }
    }

    /// Unit used when a reading arrives without one and the range table has
    /// no entry for the tank's environment.
    pub fn default_unit(&self) -> &'static str {
        match self {
            ParameterKind::Ph => "pH",
            ParameterKind::Temperature => "°C",
            ParameterKind::Ammonia
            | ParameterKind::Nitrite
            | ParameterKind::Nitrate
            | ParameterKind::Phosphate
            | ParameterKind::DissolvedOxygen => "ppm",
            ParameterKind::Hardness => "°dGH",
            ParameterKind::Alkalinity => "°dKH",
            ParameterKind::Salinity => "ppt",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterKind {
    type Err = ValidationErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Route through serde so the legacy aliases are honoured in one place
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        serde_json::from_value(serde_json::Value::String(key)).map_err(
            |_| {
                ValidationErrors::single(ValidationIssue::new(
                    "parameter_type",
                    IssueCode::InvalidChoice,
                    format!("Unknown water parameter '{}'", s),
                ))
            },
        )
    }
}

/// How a reading compares to the range for its parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StatusTier {
    Optimal,
    Acceptable,
    Caution,
    Danger,
    /// No range entry exists for the parameter in this environment.
    Unknown,
}

impl StatusTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTier::Optimal => "optimal",
            StatusTier::Acceptable => "acceptable",
            StatusTier::Caution => "caution",
            StatusTier::Danger => "danger",
            StatusTier::Unknown => "unknown",
        }
    }

    /// Fixed status palette
    pub fn color(&self) -> &'static str {
        match self {
            StatusTier::Optimal => "#4CAF50",
            StatusTier::Acceptable => "#8BC34A",
            StatusTier::Caution => "#FF9800",
            StatusTier::Danger => "#F44336",
            StatusTier::Unknown => "#9E9E9E",
        }
    }

    /// Ordering used when picking the worst tier of a tank. Unknown sits
    /// between acceptable and caution: it is not alarming, but not known-good.
    pub fn severity(&self) -> u8 {
        match self {
            StatusTier::Optimal => 0,
            StatusTier::Acceptable => 1,
            StatusTier::Unknown => 2,
            StatusTier::Caution => 3,
            StatusTier::Danger => 4,
        }
    }
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the first-vs-latest comparison over a set of readings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

// ============================================================================
// Tank Models
// ============================================================================

/// Tank as persisted in the tanks collection.
///
/// Field names follow the stored JSON layout; every timestamp is written as an
/// RFC3339 string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TankRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "sizeliters")]
    pub volume_liters: f64,
    #[serde(rename = "tankType")]
    pub environment: EnvironmentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub setup_date: DateTime<Utc>,
    pub is_active: bool,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tank with its display fields derived
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tank {
    #[serde(flatten)]
    pub record: TankRecord,
    pub display_size: String,
    pub type_display_name: String,
    pub is_new: bool,
}

impl Tank {
    /// Derive display fields. `new_window` is how long after creation a tank
    /// is flagged as new.
    pub fn from_record(record: TankRecord, now: DateTime<Utc>, new_window: Duration) -> Self {
        let display_size = format_display_value(record.volume_liters, "L");
        let type_display_name = record.environment.display_name();
        let is_new = now - record.created_at < new_window;
        Self {
            record,
            display_size,
            type_display_name,
            is_new,
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn environment(&self) -> EnvironmentType {
        self.record.environment
    }
}

// ============================================================================
// Reading Models
// ============================================================================

/// Water-parameter reading as persisted. Classification is never stored; it
/// is derived again every time the record is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingRecord {
    pub id: String,
    pub tank_id: String,
    #[serde(rename = "parameterType")]
    pub kind: ParameterKind,
    pub value: f64,
    pub unit: String,
    #[serde(rename = "testedDate")]
    pub tested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reading with display and status fields derived from the range table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaterParameterReading {
    #[serde(flatten)]
    pub record: ReadingRecord,
    pub display_value: String,
    pub parameter_display_name: String,
    pub is_within_range: bool,
    pub status: StatusTier,
    pub status_color: String,
}

impl WaterParameterReading {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn kind(&self) -> ParameterKind {
        self.record.kind
    }

    pub fn value(&self) -> f64 {
        self.record.value
    }

    pub fn tested_at(&self) -> DateTime<Utc> {
        self.record.tested_at
    }

    pub fn into_record(self) -> ReadingRecord {
        self.record
    }
}
