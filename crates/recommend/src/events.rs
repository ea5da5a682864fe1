//! Interaction events and their weights

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use storefront_core::CoreError;

/// Event type names recognized by the default weight table
pub const VIEW: &str = "view";
pub const ADD_TO_CART: &str = "addtocart";
pub const TRANSACTION: &str = "transaction";

/// A single user-item interaction
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EventRecord {
    pub user_id: String,
    pub item_id: String,
    /// `None` when the log carried no event type for this row
    pub event_type: Option<String>,
}

impl EventRecord {
    pub fn new(
        user_id: impl Into<String>,
        item_id: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            event_type: Some(event_type.into()),
        }
    }

    /// Record without an event type; weighs as the default weight
    pub fn untyped(user_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            event_type: None,
        }
    }
}

/// Maps event types to the weight they add to an interaction cell
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    weights: HashMap<String, f32>,
    default_weight: f32,
}

impl Default for WeightTable {
    fn default() -> Self {
        let weights = [(VIEW, 1.0), (ADD_TO_CART, 4.0), (TRANSACTION, 15.0)]
            .into_iter()
            .map(|(event, weight)| (event.to_string(), weight))
            .collect();

        Self {
            weights,
            default_weight: 1.0,
        }
    }
}

impl WeightTable {
    /// # Errors
    ///
    /// `ConfigurationError` if any weight is zero, negative or not finite.
    pub fn new(weights: HashMap<String, f32>, default_weight: f32) -> Result<Self, CoreError> {
        if !is_valid_weight(default_weight) {
            return Err(CoreError::config(
                format!(
                    "default_event_weight must be positive and finite, got {}",
                    default_weight
                ),
                "RECOMMENDER_DEFAULT_EVENT_WEIGHT",
            ));
        }

        if let Some((event, weight)) = weights.iter().find(|(_, w)| !is_valid_weight(**w)) {
            return Err(CoreError::config(
                format!(
                    "weight for event '{}' must be positive and finite, got {}",
                    event, weight
                ),
                format!("RECOMMENDER_EVENT_WEIGHTS__{}", event.to_uppercase()),
            ));
        }

        Ok(Self {
            weights,
            default_weight,
        })
    }

    /// Weight of an event; missing and unrecognized types fall back to the default
    pub fn weight(&self, event_type: Option<&str>) -> f32 {
        event_type
            .and_then(|event| self.weights.get(event))
            .copied()
            .unwrap_or(self.default_weight)
    }

    pub fn default_weight(&self) -> f32 {
        self.default_weight
    }

    pub fn into_weights(self) -> HashMap<String, f32> {
        self.weights
    }
}

fn is_valid_weight(weight: f32) -> bool {
    weight.is_finite() && weight > 0.0
}
