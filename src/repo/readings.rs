use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::aggregation::{filter_window, latest, sort_newest_first, summarize, summarize_by_kind};
use crate::aggregation::{ParameterSummary, TimeWindow};
use crate::care::{critical_alerts, overdue_parameters, CriticalAlert, OverdueParameter};
use crate::config::Config;
use crate::domain::{
    EnvironmentType, ParameterKind, ReadingRecord, Tank, TankRecord, WaterParameterReading,
};
use crate::error::{AquariumError, AquariumResult, Entity};
use crate::id_generator::IdGenerator;
use crate::readings::{apply_update, build_reading, NewReading, ReadingUpdate};
use crate::repo::store::{Collection, KeyValueStore};
use crate::time::Clock;

/// Everything the tank detail screen shows in one load
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TankDashboard {
    pub tank: Tank,
    pub summaries: BTreeMap<ParameterKind, ParameterSummary>,
    pub alerts: Vec<CriticalAlert>,
    pub overdue: Vec<OverdueParameter>,
}

/// Water-parameter readings over the readings collection.
///
/// Classification is never trusted from storage: every load looks up the
/// owning tank's environment and re-derives the display and status fields.
#[derive(Clone)]
pub struct ReadingService<S> {
    store: S,
    tanks_key: String,
    readings_key: String,
    config: Config,
    clock: Arc<dyn Clock>,
    id_generator: Arc<dyn IdGenerator>,
}

impl<S: KeyValueStore> ReadingService<S> {
    pub fn new(
        store: S,
        config: &Config,
        clock: Arc<dyn Clock>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            store,
            tanks_key: config.tanks_key.clone(),
            readings_key: config.readings_key.clone(),
            config: config.clone(),
            clock,
            id_generator,
        }
    }

    fn collection(&self) -> Collection<'_, S, ReadingRecord> {
        Collection::new(&self.store, &self.readings_key)
    }

    async fn load_tanks(&self) -> AquariumResult<Vec<TankRecord>> {
        let tanks: Collection<'_, S, TankRecord> = Collection::new(&self.store, &self.tanks_key);
        tanks.load_all().await.map_err(|e| {
            error!(key = %self.tanks_key, error = %e, "Failed to load tanks");
            AquariumError::from(e)
        })
    }

    async fn environments(&self) -> AquariumResult<HashMap<String, EnvironmentType>> {
        Ok(self
            .load_tanks()
            .await?
            .into_iter()
            .map(|t| (t.id, t.environment))
            .collect())
    }

    async fn load_records(&self) -> AquariumResult<Vec<ReadingRecord>> {
        self.collection().load_all().await.map_err(|e| {
            error!(key = %self.readings_key, error = %e, "Failed to load readings");
            AquariumError::from(e)
        })
    }

    async fn save_records(&self, records: &[ReadingRecord]) -> AquariumResult<()> {
        self.collection().save_all(records).await.map_err(|e| {
            error!(key = %self.readings_key, error = %e, "Failed to save readings");
            AquariumError::from(e)
        })
    }

    /// Load every reading matching `keep`, re-derived against its tank
    async fn load_derived<F>(&self, keep: F) -> AquariumResult<Vec<WaterParameterReading>>
    where
        F: Fn(&ReadingRecord) -> bool,
    {
        let environments = self.environments().await?;
        let readings: Vec<WaterParameterReading> = self
            .load_records()
            .await?
            .into_iter()
            .filter(|r| keep(r))
            .map(|r| {
                let env = environments.get(&r.tank_id).copied();
                if env.is_none() {
                    debug!(reading_id = %r.id, tank_id = %r.tank_id, "Reading has no tank");
                }
                WaterParameterReading::from_record(r, env)
            })
            .collect();
        Ok(readings)
    }

    /// Validate, classify and append a reading for an existing tank
    pub async fn record_reading(&self, input: NewReading) -> AquariumResult<WaterParameterReading> {
        let Some(environment) = self.environments().await?.get(&input.tank_id).copied() else {
            warn!(tank_id = %input.tank_id, "Reading submitted for unknown tank");
            return Err(AquariumError::not_found(Entity::Tank, &input.tank_id));
        };

        let reading = build_reading(
            input,
            environment,
            self.clock.as_ref(),
            self.id_generator.as_ref(),
        )
        .map_err(|errors| {
            warn!(error = %errors, "Reading rejected by validation");
            AquariumError::from(errors)
        })?;

        let mut records = self.load_records().await?;
        records.push(reading.record.clone());
        self.save_records(&records).await?;

        info!(
            reading_id = %reading.record.id,
            tank_id = %reading.record.tank_id,
            kind = %reading.record.kind,
            status = %reading.status,
            "Reading recorded"
        );
        Ok(reading)
    }

    /// All readings of a tank, newest first
    pub async fn readings_for_tank(&self, tank_id: &str) -> AquariumResult<Vec<WaterParameterReading>> {
        let mut readings = self.load_derived(|r| r.tank_id == tank_id).await?;
        sort_newest_first(&mut readings);
        Ok(readings)
    }

    /// All readings recorded by the owner across tanks, newest first
    pub async fn readings_for_owner(&self, owner_id: &str) -> AquariumResult<Vec<WaterParameterReading>> {
        let mut readings = self.load_derived(|r| r.owner_id == owner_id).await?;
        sort_newest_first(&mut readings);
        Ok(readings)
    }

    pub async fn latest_for_kind(
        &self,
        tank_id: &str,
        kind: ParameterKind,
    ) -> AquariumResult<Option<WaterParameterReading>> {
        let readings = self
            .load_derived(|r| r.tank_id == tank_id && r.kind == kind)
            .await?;
        Ok(latest(&readings).cloned())
    }

    /// Merge changes into a stored reading and re-classify it
    pub async fn update_reading(
        &self,
        reading_id: &str,
        update: ReadingUpdate,
    ) -> AquariumResult<WaterParameterReading> {
        let mut records = self.load_records().await?;
        let Some(index) = records.iter().position(|r| r.id == reading_id) else {
            warn!(reading_id = %reading_id, "Update for unknown reading");
            return Err(AquariumError::not_found(Entity::Reading, reading_id));
        };

        let environment = self.environments().await?.get(&records[index].tank_id).copied();
        let reading = apply_update(
            records[index].clone(),
            update,
            environment,
            self.clock.as_ref(),
        )
        .map_err(|errors| {
            warn!(reading_id = %reading_id, error = %errors, "Reading update rejected by validation");
            AquariumError::from(errors)
        })?;

        records[index] = reading.record.clone();
        self.save_records(&records).await?;

        info!(reading_id = %reading_id, status = %reading.status, "Reading updated");
        Ok(reading)
    }

    pub async fn delete_reading(&self, reading_id: &str) -> AquariumResult<()> {
        let mut records = self.load_records().await?;
        let before = records.len();
        records.retain(|r| r.id != reading_id);
        if records.len() == before {
            warn!(reading_id = %reading_id, "Delete for unknown reading");
            return Err(AquariumError::not_found(Entity::Reading, reading_id));
        }

        self.save_records(&records).await?;
        info!(reading_id = %reading_id, "Reading deleted");
        Ok(())
    }

    /// Summary of one parameter of one tank inside a history window
    pub async fn summary_for(
        &self,
        tank_id: &str,
        kind: ParameterKind,
        window: TimeWindow,
    ) -> AquariumResult<ParameterSummary> {
        let readings = self
            .load_derived(|r| r.tank_id == tank_id && r.kind == kind)
            .await?;
        let in_window = filter_window(&readings, window, self.clock.now());
        Ok(summarize(&in_window))
    }

    /// Per-parameter summaries, critical alerts and overdue tests for a tank
    pub async fn tank_dashboard(&self, tank_id: &str) -> AquariumResult<TankDashboard> {
        let Some(record) = self.load_tanks().await?.into_iter().find(|t| t.id == tank_id) else {
            warn!(tank_id = %tank_id, "Dashboard requested for unknown tank");
            return Err(AquariumError::not_found(Entity::Tank, tank_id));
        };

        let now = self.clock.now();
        let environment = record.environment;
        let readings: Vec<WaterParameterReading> = self
            .load_records()
            .await?
            .into_iter()
            .filter(|r| r.tank_id == tank_id)
            .map(|r| WaterParameterReading::from_record(r, Some(environment)))
            .collect();

        Ok(TankDashboard {
            tank: Tank::from_record(record, now, self.config.new_tank_window()),
            summaries: summarize_by_kind(&readings),
            alerts: critical_alerts(&readings),
            overdue: overdue_parameters(environment, &readings, now),
        })
    }

    /// Drop the whole readings collection
    pub async fn clear_all(&self) -> AquariumResult<()> {
        self.collection().clear().await?;
        info!(key = %self.readings_key, "All readings cleared");
        Ok(())
    }
}
