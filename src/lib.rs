// Declare modules at the root level
pub mod aggregation;
pub mod care;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod error;
pub mod id_generator;
pub mod logging;
pub mod ranges;
pub mod readings;
pub mod repo;
pub mod time;
pub mod units;
pub mod validators;

// Test utilities module (available in test and integration test builds)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export the core modules under a shared namespace
pub mod shared {
    pub use super::aggregation;
    pub use super::care;
    pub use super::classifier;
    pub use super::domain;
    pub use super::error;
    pub use super::ranges;
    pub use super::readings;
    pub use super::units;
    pub use super::validators;
}

// Also re-export at root for convenience
pub use aggregation::{
    filter_window, sort_newest_first, summarize, summarize_by_kind, ParameterSummary, TimeWindow,
};
pub use care::{critical_alerts, next_test_due, overdue_parameters, CriticalAlert, OverdueParameter};
pub use classifier::classify;
pub use config::{Config, ConfigError};
pub use domain::*;
pub use error::*;
pub use id_generator::*;
pub use ranges::{range_for, ParameterRange, TestingFrequency};
pub use readings::{build_reading, NewReading, ReadingUpdate};
pub use repo::{
    FileStore, InMemoryStore, KeyValueStore, NewTank, ReadingService, StoreBackend, TankDashboard,
    TankService, TankUpdate,
};
pub use time::*;
pub use validators::{validate, RawValue, ValidationErrors, ValidationIssue, ValidationResult};
