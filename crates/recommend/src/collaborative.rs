//! Neighbor-based collaborative filtering
//!
//! A user's recommendations are the items their nearest neighbors interacted
//! with most. Neighbors are found by exact cosine search over the users'
//! interaction rows; their raw (un-normalized) rows are summed per item and
//! the highest totals win.

use crate::builder::{IdMapping, InteractionModel, InteractionModelBuilder};
use crate::config::EngineConfig;
use crate::error::{RecommendError, Result};
use crate::events::{EventRecord, WeightTable};
use crate::ingest::EventTable;
use crate::neighbors::{CosineNeighborIndex, Neighbor};
use crate::sparse::SparseMatrix;
use serde::Serialize;
use storefront_core::ConfigLoader;
use tracing::{debug, info, instrument};

/// Item with its aggregate neighbor score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    pub item_id: String,
    pub score: f32,
}

/// Neighbor user with its cosine distance to the queried user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarUser {
    pub user_id: String,
    pub distance: f32,
}

/// Trains [`TrainedModel`]s
#[derive(Debug, Clone)]
pub struct NeighborRecommender {
    builder: InteractionModelBuilder,
    neighbor_pool_size: usize,
    default_top_n: usize,
}

impl Default for NeighborRecommender {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            builder: InteractionModelBuilder::new(WeightTable::default())
                .with_schema(config.schema),
            neighbor_pool_size: config.neighbor_pool_size,
            default_top_n: config.default_top_n,
        }
    }
}

impl NeighborRecommender {
    /// # Errors
    ///
    /// `RecommendError::Config` if `config` fails validation.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            builder: InteractionModelBuilder::new(config.weight_table()?)
                .with_schema(config.schema.clone()),
            neighbor_pool_size: config.neighbor_pool_size,
            default_top_n: config.default_top_n,
        })
    }

    /// Normalize rows and index them for neighbor search
    ///
    /// # Errors
    ///
    /// `RecommendError::EmptyData` if the model has no users or no items.
    #[instrument(skip_all, fields(num_users = model.matrix.num_users(), num_items = model.matrix.num_items()))]
    pub fn fit(&self, model: InteractionModel) -> Result<TrainedModel> {
        if model.matrix.is_empty() {
            return Err(RecommendError::EmptyData);
        }

        let index = CosineNeighborIndex::fit(&model.matrix);

        info!(
            users = index.len(),
            neighbor_pool_size = self.neighbor_pool_size,
            "Nearest neighbors model trained"
        );

        Ok(TrainedModel {
            model,
            index,
            neighbor_pool_size: self.neighbor_pool_size,
            default_top_n: self.default_top_n,
        })
    }

    pub fn build_and_fit(&self, events: &[EventRecord]) -> Result<TrainedModel> {
        self.fit(self.builder.build(events))
    }

    /// # Errors
    ///
    /// `RecommendError::Schema` for missing columns, `RecommendError::EmptyData`
    /// for a table without rows.
    pub fn build_and_fit_table(&self, table: &EventTable) -> Result<TrainedModel> {
        self.fit(self.builder.build_from_table(table)?)
    }
}

/// Immutable result of one training pass
#[derive(Debug, Clone)]
pub struct TrainedModel {
    model: InteractionModel,
    index: CosineNeighborIndex,
    neighbor_pool_size: usize,
    default_top_n: usize,
}

impl TrainedModel {
    pub fn users(&self) -> &IdMapping {
        &self.model.users
    }

    pub fn items(&self) -> &IdMapping {
        &self.model.items
    }

    pub fn matrix(&self) -> &SparseMatrix {
        &self.model.matrix
    }

    pub fn neighbor_pool_size(&self) -> usize {
        self.neighbor_pool_size
    }

    pub fn default_top_n(&self) -> usize {
        self.default_top_n
    }

    /// Neighbor rows for a known user, the user's own row removed
    fn neighbors_of(&self, user_idx: usize) -> Vec<Neighbor> {
        self.index
            .kneighbors(user_idx, self.neighbor_pool_size)
            .into_iter()
            .filter(|neighbor| neighbor.user_idx != user_idx)
            .collect()
    }

    fn resolve_user(&self, user_id: &str) -> Result<usize> {
        self.model
            .users
            .index_of(user_id)
            .ok_or_else(|| RecommendError::UnknownUser(user_id.to_string()))
    }

    /// The users whose rows feed `user_id`'s recommendations, nearest first
    pub fn similar_users(&self, user_id: &str) -> Result<Vec<SimilarUser>> {
        let user_idx = self.resolve_user(user_id)?;

        Ok(self
            .neighbors_of(user_idx)
            .into_iter()
            .filter_map(|neighbor| {
                self.model
                    .users
                    .id_of(neighbor.user_idx)
                    .map(|id| SimilarUser {
                        user_id: id.to_string(),
                        distance: neighbor.distance,
                    })
            })
            .collect())
    }

    /// Top `top_n` items by aggregate neighbor score, with scores
    ///
    /// Items are ordered by descending score, ties by the order in which the
    /// items first appeared in the training log. Every indexed item is a
    /// candidate, so fewer than `top_n` results only happen when the model
    /// holds fewer items.
    ///
    /// # Errors
    ///
    /// `RecommendError::UnknownUser` if `user_id` was not in the training log.
    #[instrument(skip(self))]
    pub fn try_recommend(&self, user_id: &str, top_n: usize) -> Result<Vec<ScoredItem>> {
        let user_idx = self.resolve_user(user_id)?;
        if top_n == 0 {
            return Ok(Vec::new());
        }

        let similar = self
            .neighbors_of(user_idx)
            .iter()
            .map(|neighbor| neighbor.user_idx)
            .collect::<Vec<_>>();
        let scores = self.model.matrix.sum_rows(&similar);

        let by_score = |a: &usize, b: &usize| scores[*b].total_cmp(&scores[*a]).then(a.cmp(b));

        let mut ranked = (0..scores.len()).collect::<Vec<_>>();
        if top_n < ranked.len() {
            ranked.select_nth_unstable_by(top_n - 1, by_score);
            ranked.truncate(top_n);
        }
        ranked.sort_by(by_score);

        debug!(
            similar_users = similar.len(),
            returned = ranked.len(),
            "Ranked neighbor items"
        );

        Ok(ranked
            .into_iter()
            .filter_map(|item_idx| {
                self.model.items.id_of(item_idx).map(|id| ScoredItem {
                    item_id: id.to_string(),
                    score: scores[item_idx],
                })
            })
            .collect())
    }

    /// Recommended item ids for `user_id`, best first
    ///
    /// Unknown users get an empty list rather than an error.
    pub fn recommend(&self, user_id: &str, top_n: usize) -> Vec<String> {
        match self.try_recommend(user_id, top_n) {
            Ok(items) => items.into_iter().map(|item| item.item_id).collect(),
            Err(err) => {
                debug!(user_id, error = %err, "No recommendations");
                Vec::new()
            }
        }
    }

    /// [`recommend`](Self::recommend) with the configured default length
    pub fn recommend_default(&self, user_id: &str) -> Vec<String> {
        self.recommend(user_id, self.default_top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(rows: &[(&str, &str, &str)]) -> Vec<EventRecord> {
        rows.iter()
            .map(|(user, item, event)| EventRecord::new(*user, *item, *event))
            .collect()
    }

    #[test]
    fn test_fit_rejects_empty_model() {
        let result = NeighborRecommender::default().build_and_fit(&[]);
        assert!(matches!(result, Err(RecommendError::EmptyData)));
    }

    #[test]
    fn test_recommend_from_single_neighbor() {
        let model = NeighborRecommender::default()
            .build_and_fit(&events(&[
                ("alice", "book", "view"),
                ("bob", "book", "view"),
                ("bob", "lamp", "transaction"),
                ("bob", "mug", "addtocart"),
            ]))
            .unwrap();

        let scored = model.try_recommend("alice", 10).unwrap();
        let ids = scored.iter().map(|s| s.item_id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["lamp", "mug", "book"]);
        assert_eq!(scored[0].score, 15.0);
        assert_eq!(scored[1].score, 4.0);
        assert_eq!(scored[2].score, 1.0);
    }

    #[test]
    fn test_own_row_excluded() {
        // Carol's only item must not come back through her own row.
        let model = NeighborRecommender::default()
            .build_and_fit(&events(&[
                ("carol", "rare", "transaction"),
                ("dave", "common", "view"),
            ]))
            .unwrap();

        let scored = model.try_recommend("carol", 10).unwrap();
        assert_eq!(scored[0].item_id, "common");
        assert_eq!(scored[0].score, 1.0);
        assert_eq!(scored[1].item_id, "rare");
        assert_eq!(scored[1].score, 0.0);
    }

    #[test]
    fn test_zero_scores_tie_break_by_first_seen() {
        let model = NeighborRecommender::default()
            .build_and_fit(&events(&[
                ("u1", "a", "view"),
                ("u1", "b", "view"),
                ("u1", "c", "view"),
                ("u2", "z", "view"),
            ]))
            .unwrap();

        assert_eq!(model.recommend("u2", 2), vec!["a", "b"]);
        assert_eq!(model.recommend("u2", 4), vec!["a", "b", "c", "z"]);
    }

    #[test]
    fn test_unknown_user_and_zero_top_n() {
        let model = NeighborRecommender::default()
            .build_and_fit(&events(&[("u1", "a", "view"), ("u2", "a", "view")]))
            .unwrap();

        assert!(model.recommend("ghost", 10).is_empty());
        assert!(matches!(
            model.try_recommend("ghost", 10),
            Err(RecommendError::UnknownUser(_))
        ));
        assert!(model.recommend("u1", 0).is_empty());
    }

    #[test]
    fn test_similar_users_limited_by_pool() {
        let rows = (0..8)
            .map(|u| (format!("u{}", u), "shared".to_string()))
            .collect::<Vec<_>>();
        let records = rows
            .iter()
            .map(|(user, item)| EventRecord::new(user.as_str(), item.as_str(), "view"))
            .collect::<Vec<_>>();
        let model = NeighborRecommender::default().build_and_fit(&records).unwrap();

        let similar = model.similar_users("u0").unwrap();
        assert_eq!(similar.len(), 4);
        assert!(similar.iter().all(|s| s.user_id != "u0"));
        assert_eq!(
            similar.iter().map(|s| s.user_id.as_str()).collect::<Vec<_>>(),
            vec!["u1", "u2", "u3", "u4"]
        );
    }

    #[test]
    fn test_recommend_default_uses_configured_length() {
        let config = EngineConfig {
            default_top_n: 1,
            ..EngineConfig::default()
        };
        let model = NeighborRecommender::new(&config)
            .unwrap()
            .build_and_fit(&events(&[
                ("u1", "a", "view"),
                ("u2", "a", "view"),
                ("u2", "b", "view"),
            ]))
            .unwrap();

        assert_eq!(model.default_top_n(), 1);
        assert_eq!(model.recommend_default("u1").len(), 1);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let pool_too_small = EngineConfig {
            neighbor_pool_size: 1,
            ..EngineConfig::default()
        };
        assert!(matches!(
            NeighborRecommender::new(&pool_too_small),
            Err(RecommendError::Config(_))
        ));

        let mut zero_weight = EngineConfig::default();
        zero_weight.event_weights.insert("view".to_string(), 0.0);
        let err = NeighborRecommender::new(&zero_weight).unwrap_err();
        match err {
            RecommendError::Config(core) => {
                assert_eq!(core.key(), Some("RECOMMENDER_EVENT_WEIGHTS__VIEW"))
            }
            other => panic!("expected a configuration error, got {:?}", other),
        }
    }
}
