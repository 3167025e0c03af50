use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::domain::{EnvironmentType, Tank, TankRecord};
use crate::error::{AquariumError, AquariumResult, Entity};
use crate::id_generator::IdGenerator;
use crate::repo::store::{Collection, KeyValueStore};
use crate::time::Clock;
use crate::validators::{require, validate_tank_fields, ValidationErrors};

/// Input for creating a tank
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTank {
    pub name: String,
    pub environment: EnvironmentType,
    pub volume_liters: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Defaults to the creation time
    #[serde(default)]
    pub setup_date: Option<DateTime<Utc>>,
    pub owner_id: String,
}

/// Partial change to a tank. `None` leaves a field untouched; the nested
/// options clear the field when set to `Some(None)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TankUpdate {
    pub name: Option<String>,
    pub environment: Option<EnvironmentType>,
    pub volume_liters: Option<f64>,
    pub description: Option<Option<String>>,
    pub photo_url: Option<Option<String>>,
    pub setup_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Tank lifecycle over the tanks collection
#[derive(Clone)]
pub struct TankService<S> {
    store: S,
    tanks_key: String,
    new_tank_window: Duration,
    clock: Arc<dyn Clock>,
    id_generator: Arc<dyn IdGenerator>,
}

impl<S: KeyValueStore> TankService<S> {
    pub fn new(
        store: S,
        config: &Config,
        clock: Arc<dyn Clock>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            store,
            tanks_key: config.tanks_key.clone(),
            new_tank_window: config.new_tank_window(),
            clock,
            id_generator,
        }
    }

    fn collection(&self) -> Collection<'_, S, TankRecord> {
        Collection::new(&self.store, &self.tanks_key)
    }

    fn to_tank(&self, record: TankRecord) -> Tank {
        Tank::from_record(record, self.clock.now(), self.new_tank_window)
    }

    pub async fn load_records(&self) -> AquariumResult<Vec<TankRecord>> {
        self.collection().load_all().await.map_err(|e| {
            error!(key = %self.tanks_key, error = %e, "Failed to load tanks");
            AquariumError::from(e)
        })
    }

    async fn save_records(&self, records: &[TankRecord]) -> AquariumResult<()> {
        self.collection().save_all(records).await.map_err(|e| {
            error!(key = %self.tanks_key, error = %e, "Failed to save tanks");
            AquariumError::from(e)
        })
    }

    /// Validate and append a new tank
    pub async fn create_tank(&self, input: NewTank) -> AquariumResult<Tank> {
        let mut issues = validate_tank_fields(&input.name, input.volume_liters).errors;
        issues.extend(require("owner_id", &input.owner_id));
        if !issues.is_empty() {
            warn!(
                owner_id = %input.owner_id,
                error_count = issues.len(),
                "Tank rejected by validation"
            );
            return Err(ValidationErrors(issues).into());
        }

        let now = self.clock.now();
        let record = TankRecord {
            id: self.id_generator.new_id(),
            name: input.name.trim().to_string(),
            volume_liters: input.volume_liters,
            environment: input.environment,
            photo_url: non_blank(input.photo_url),
            description: non_blank(input.description),
            setup_date: input.setup_date.unwrap_or(now),
            is_active: true,
            owner_id: input.owner_id,
            created_at: now,
            updated_at: now,
        };

        let mut records = self.load_records().await?;
        records.push(record.clone());
        self.save_records(&records).await?;

        info!(
            tank_id = %record.id,
            owner_id = %record.owner_id,
            environment = %record.environment,
            "Tank created"
        );
        Ok(self.to_tank(record))
    }

    /// Tanks belonging to the owner, in creation order
    pub async fn get_all_tanks(&self, owner_id: &str) -> AquariumResult<Vec<Tank>> {
        let records = self.load_records().await?;
        Ok(records
            .into_iter()
            .filter(|r| r.owner_id == owner_id)
            .map(|r| self.to_tank(r))
            .collect())
    }

    pub async fn get_tank(&self, tank_id: &str) -> AquariumResult<Option<Tank>> {
        let records = self.load_records().await?;
        Ok(records
            .into_iter()
            .find(|r| r.id == tank_id)
            .map(|r| self.to_tank(r)))
    }

    /// Merge changes into an existing tank and rewrite it in place.
    /// An unknown id is reported as `NotFound`; nothing is written.
    pub async fn update_tank(&self, tank_id: &str, update: TankUpdate) -> AquariumResult<Tank> {
        let mut records = self.load_records().await?;
        let Some(index) = records.iter().position(|r| r.id == tank_id) else {
            warn!(tank_id = %tank_id, "Update for unknown tank");
            return Err(AquariumError::not_found(Entity::Tank, tank_id));
        };

        let mut record = records[index].clone();
        if let Some(name) = update.name {
            record.name = name.trim().to_string();
        }
        if let Some(environment) = update.environment {
            record.environment = environment;
        }
        if let Some(volume) = update.volume_liters {
            record.volume_liters = volume;
        }
        if let Some(description) = update.description {
            record.description = non_blank(description);
        }
        if let Some(photo_url) = update.photo_url {
            record.photo_url = non_blank(photo_url);
        }
        if let Some(setup_date) = update.setup_date {
            record.setup_date = setup_date;
        }
        if let Some(is_active) = update.is_active {
            record.is_active = is_active;
        }

        if let Err(errors) = validate_tank_fields(&record.name, record.volume_liters).into_errors() {
            warn!(tank_id = %tank_id, error = %errors, "Tank update rejected by validation");
            return Err(errors.into());
        }

        record.updated_at = self.clock.now();
        records[index] = record.clone();
        self.save_records(&records).await?;

        info!(tank_id = %tank_id, "Tank updated");
        Ok(self.to_tank(record))
    }

    /// Remove a tank. Readings recorded for it are left in place.
    pub async fn delete_tank(&self, tank_id: &str) -> AquariumResult<()> {
        let mut records = self.load_records().await?;
        let before = records.len();
        records.retain(|r| r.id != tank_id);
        if records.len() == before {
            warn!(tank_id = %tank_id, "Delete for unknown tank");
            return Err(AquariumError::not_found(Entity::Tank, tank_id));
        }

        self.save_records(&records).await?;
        info!(tank_id = %tank_id, "Tank deleted");
        Ok(())
    }

    /// Drop the whole tanks collection
    pub async fn clear_all(&self) -> AquariumResult<()> {
        self.collection().clear().await?;
        info!(key = %self.tanks_key, "All tanks cleared");
        Ok(())
    }
}
