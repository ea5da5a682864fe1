//! Engine configuration
//!
//! Values are layered: built-in defaults, then an optional `config/recommender`
//! file (any format the `config` crate understands), then environment variables
//! prefixed with `RECOMMENDER_`. Nested keys use `__`, e.g.
//! `RECOMMENDER_SCHEMA__USER_COLUMN=customer_id` or
//! `RECOMMENDER_EVENT_WEIGHTS__TRANSACTION=20`.

use crate::events::WeightTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use storefront_core::{ConfigLoader, CoreError};

/// Neighbor rows pulled per query, the querying user included
pub const DEFAULT_NEIGHBOR_POOL_SIZE: usize = 5;
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_EVENT_WEIGHT: f32 = 1.0;

/// Column names of the tabular event log
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventSchema {
    pub user_column: String,
    pub item_column: String,
    pub event_column: String,
}

impl Default for EventSchema {
    fn default() -> Self {
        Self {
            user_column: "visitorid".to_string(),
            item_column: "itemid".to_string(),
            event_column: "event".to_string(),
        }
    }
}

/// Recommendation engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Nearest rows retrieved per query before dropping the user's own row
    pub neighbor_pool_size: usize,
    /// Result length used when the caller does not pass one
    pub default_top_n: usize,
    /// Weight for missing or unrecognized event types
    pub default_event_weight: f32,
    /// Event type -> weight
    pub event_weights: HashMap<String, f32>,
    pub schema: EventSchema,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            neighbor_pool_size: DEFAULT_NEIGHBOR_POOL_SIZE,
            default_top_n: DEFAULT_TOP_N,
            default_event_weight: DEFAULT_EVENT_WEIGHT,
            event_weights: WeightTable::default().into_weights(),
            schema: EventSchema::default(),
        }
    }
}

impl EngineConfig {
    /// Load layered configuration from `config/recommender` and the environment
    pub fn load() -> Result<Self, CoreError> {
        let defaults = EngineConfig::default();

        let mut builder = config::Config::builder()
            .set_default("neighbor_pool_size", defaults.neighbor_pool_size as u64)
            .and_then(|b| b.set_default("default_top_n", defaults.default_top_n as u64))
            .and_then(|b| {
                b.set_default("default_event_weight", defaults.default_event_weight as f64)
            })
            .and_then(|b| b.set_default("schema.user_column", defaults.schema.user_column))
            .and_then(|b| b.set_default("schema.item_column", defaults.schema.item_column))
            .and_then(|b| b.set_default("schema.event_column", defaults.schema.event_column))
            .map_err(config_error)?;

        for (event, weight) in &defaults.event_weights {
            builder = builder
                .set_default(format!("event_weights.{}", event), *weight as f64)
                .map_err(config_error)?;
        }

        let settings = builder
            .add_source(config::File::with_name("config/recommender").required(false))
            .add_source(
                config::Environment::with_prefix("RECOMMENDER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_error)?;

        settings.try_deserialize().map_err(config_error)
    }

    /// Weight lookup table derived from this configuration
    pub fn weight_table(&self) -> Result<WeightTable, CoreError> {
        WeightTable::new(self.event_weights.clone(), self.default_event_weight)
    }
}

impl ConfigLoader for EngineConfig {
    fn from_env() -> Result<Self, CoreError> {
        Self::load()
    }

    fn validate(&self) -> Result<(), CoreError> {
        // Self is always the nearest row, so one slot alone yields no neighbors.
        if self.neighbor_pool_size < 2 {
            return Err(CoreError::config(
                format!(
                    "neighbor_pool_size must be at least 2, got {}",
                    self.neighbor_pool_size
                ),
                "RECOMMENDER_NEIGHBOR_POOL_SIZE",
            ));
        }

        if self.default_top_n == 0 {
            return Err(CoreError::config(
                "default_top_n must be greater than 0",
                "RECOMMENDER_DEFAULT_TOP_N",
            ));
        }

        self.weight_table()?;

        let columns = [
            ("RECOMMENDER_SCHEMA__USER_COLUMN", &self.schema.user_column),
            ("RECOMMENDER_SCHEMA__ITEM_COLUMN", &self.schema.item_column),
            ("RECOMMENDER_SCHEMA__EVENT_COLUMN", &self.schema.event_column),
        ];
        for (i, (key, column)) in columns.iter().enumerate() {
            if column.trim().is_empty() {
                return Err(CoreError::config("column name must not be empty", *key));
            }
            if columns[..i].iter().any(|(_, other)| other == column) {
                return Err(CoreError::config(
                    format!("column '{}' is mapped to more than one field", column),
                    *key,
                ));
            }
        }

        Ok(())
    }
}

fn config_error(err: config::ConfigError) -> CoreError {
    CoreError::ConfigurationError {
        message: err.to_string(),
        key: None,
    }
}
