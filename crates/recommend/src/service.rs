//! Serving handle that swaps trained models atomically
//!
//! Training happens outside the lock; publishing a new model is a single
//! pointer swap, so concurrent readers see either the previous model or the
//! new one in full. A failed training run leaves the live model untouched.

use crate::collaborative::{NeighborRecommender, ScoredItem, SimilarUser, TrainedModel};
use crate::config::EngineConfig;
use crate::error::{RecommendError, Result};
use crate::events::EventRecord;
use crate::ingest::EventTable;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

pub struct RecommendationService {
    recommender: NeighborRecommender,
    current: RwLock<Option<Arc<TrainedModel>>>,
}

impl RecommendationService {
    /// # Errors
    ///
    /// `RecommendError::Config` if `config` fails validation.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self::with_recommender(NeighborRecommender::new(config)?))
    }

    pub fn with_default_config() -> Self {
        Self::with_recommender(NeighborRecommender::default())
    }

    fn with_recommender(recommender: NeighborRecommender) -> Self {
        Self {
            recommender,
            current: RwLock::new(None),
        }
    }

    /// Train on typed events and publish the result
    pub fn train(&self, events: &[EventRecord]) -> Result<Arc<TrainedModel>> {
        let model = self.recommender.build_and_fit(events)?;
        Ok(self.publish(model))
    }

    /// Train on a tabular event log and publish the result
    pub fn train_from_table(&self, table: &EventTable) -> Result<Arc<TrainedModel>> {
        let model = self.recommender.build_and_fit_table(table)?;
        Ok(self.publish(model))
    }

    fn publish(&self, model: TrainedModel) -> Arc<TrainedModel> {
        let model = Arc::new(model);
        let previous = self.current.write().replace(Arc::clone(&model));

        info!(
            num_users = model.users().len(),
            num_items = model.items().len(),
            replaced = previous.is_some(),
            "Published recommendation model"
        );

        model
    }

    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }

    /// Snapshot of the live model
    ///
    /// Holding the snapshot keeps it alive across later retrains, so a caller
    /// can run several queries against one consistent state.
    pub fn current(&self) -> Result<Arc<TrainedModel>> {
        self.current.read().clone().ok_or_else(|| {
            warn!("Recommendation requested before any model was trained");
            RecommendError::NotReady
        })
    }

    /// Recommended item ids for `user_id`; empty for unknown users
    ///
    /// # Errors
    ///
    /// `RecommendError::NotReady` before the first successful training.
    pub fn recommend(&self, user_id: &str, top_n: usize) -> Result<Vec<String>> {
        Ok(self.current()?.recommend(user_id, top_n))
    }

    /// Scored variant of [`recommend`](Self::recommend)
    ///
    /// # Errors
    ///
    /// `RecommendError::NotReady` before the first training,
    /// `RecommendError::UnknownUser` for a user absent from the live model.
    pub fn recommend_scored(&self, user_id: &str, top_n: usize) -> Result<Vec<ScoredItem>> {
        self.current()?.try_recommend(user_id, top_n)
    }

    pub fn similar_users(&self, user_id: &str) -> Result<Vec<SimilarUser>> {
        self.current()?.similar_users(user_id)
    }
}
