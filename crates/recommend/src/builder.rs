//! Interaction model construction
//!
//! Turns an event log into dense id mappings and a weighted user-item
//! [`SparseMatrix`]. Ids are indexed in first-seen order; repeated events on
//! the same user-item pair add up.

use crate::config::EventSchema;
use crate::error::Result;
use crate::events::{EventRecord, WeightTable};
use crate::ingest::EventTable;
use crate::sparse::SparseMatrix;
use std::collections::HashMap;
use tracing::{info, instrument};

/// Bijection between external ids and dense indices `[0, len)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdMapping {
    index_of: HashMap<String, usize>,
    ids: Vec<String>,
}

impl IdMapping {
    /// Index for `id`, assigning the next free one on first sight
    fn intern(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.index_of.get(id) {
            return idx;
        }
        let idx = self.ids.len();
        self.index_of.insert(id.to_string(), idx);
        self.ids.push(id.to_string());
        idx
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_of.get(id).copied()
    }

    pub fn id_of(&self, idx: usize) -> Option<&str> {
        self.ids.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// External ids in index order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

/// Output of one build pass: id mappings plus the weighted interaction matrix
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionModel {
    pub users: IdMapping,
    pub items: IdMapping,
    pub matrix: SparseMatrix,
}

impl InteractionModel {
    /// Accumulated weight for an external user/item pair
    pub fn interaction(&self, user_id: &str, item_id: &str) -> Option<f32> {
        let user_idx = self.users.index_of(user_id)?;
        let item_idx = self.items.index_of(item_id)?;
        Some(self.matrix.get(user_idx, item_idx))
    }
}

/// Builds [`InteractionModel`]s from event logs
#[derive(Debug, Clone, Default)]
pub struct InteractionModelBuilder {
    weights: WeightTable,
    schema: EventSchema,
}

impl InteractionModelBuilder {
    pub fn new(weights: WeightTable) -> Self {
        Self {
            weights,
            schema: EventSchema::default(),
        }
    }

    pub fn with_schema(mut self, schema: EventSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Build the mappings and matrix from typed event records
    ///
    /// Never fails; an empty slice yields a 0x0 matrix.
    #[instrument(skip_all, fields(events = events.len()))]
    pub fn build(&self, events: &[EventRecord]) -> InteractionModel {
        let mut users = IdMapping::default();
        let mut items = IdMapping::default();

        let triplets = events
            .iter()
            .map(|event| {
                let user_idx = users.intern(&event.user_id);
                let item_idx = items.intern(&event.item_id);
                let weight = self.weights.weight(event.event_type.as_deref());
                (user_idx, item_idx, weight)
            })
            .collect::<Vec<_>>();

        let matrix = SparseMatrix::from_triplets(users.len(), items.len(), triplets);

        info!(
            num_users = matrix.num_users(),
            num_items = matrix.num_items(),
            nnz = matrix.nnz(),
            "Built interaction matrix"
        );

        InteractionModel {
            users,
            items,
            matrix,
        }
    }

    /// Resolve the schema columns of a tabular log, then build
    ///
    /// # Errors
    ///
    /// `RecommendError::Schema` if a required column or value is missing.
    pub fn build_from_table(&self, table: &EventTable) -> Result<InteractionModel> {
        let events = table.records(&self.schema)?;
        Ok(self.build(&events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecommendError;

    #[test]
    fn test_single_view_event() {
        let model = InteractionModelBuilder::default().build(&[EventRecord::new("u1", "i1", "view")]);

        assert_eq!(model.matrix.shape(), (1, 1));
        assert_eq!(model.matrix.get(0, 0), 1.0);
        assert_eq!(model.interaction("u1", "i1"), Some(1.0));
    }

    #[test]
    fn test_view_and_transaction_accumulate() {
        let model = InteractionModelBuilder::default().build(&[
            EventRecord::new("u1", "i1", "view"),
            EventRecord::new("u1", "i1", "transaction"),
        ]);

        assert_eq!(model.matrix.shape(), (1, 1));
        assert_eq!(model.interaction("u1", "i1"), Some(16.0));
    }

    #[test]
    fn test_unknown_and_missing_event_types_weigh_one() {
        let model = InteractionModelBuilder::default().build(&[
            EventRecord::new("u1", "i1", "wishlist"),
            EventRecord::untyped("u1", "i2"),
            EventRecord::new("u1", "i3", "addtocart"),
        ]);

        assert_eq!(model.interaction("u1", "i1"), Some(1.0));
        assert_eq!(model.interaction("u1", "i2"), Some(1.0));
        assert_eq!(model.interaction("u1", "i3"), Some(4.0));
    }

    #[test]
    fn test_ids_indexed_in_first_seen_order() {
        let model = InteractionModelBuilder::default().build(&[
            EventRecord::new("u9", "i5", "view"),
            EventRecord::new("u3", "i7", "view"),
            EventRecord::new("u9", "i1", "view"),
        ]);

        assert_eq!(model.users.ids(), &["u9".to_string(), "u3".to_string()]);
        assert_eq!(model.items.index_of("i5"), Some(0));
        assert_eq!(model.items.index_of("i7"), Some(1));
        assert_eq!(model.items.index_of("i1"), Some(2));
        assert_eq!(model.items.id_of(2), Some("i1"));
        assert_eq!(model.items.id_of(3), None);
        assert_eq!(model.interaction("u3", "i5"), Some(0.0));
        assert_eq!(model.interaction("u4", "i5"), None);
    }

    #[test]
    fn test_empty_input_builds_zero_sized_matrix() {
        let model = InteractionModelBuilder::default().build(&[]);

        assert_eq!(model.matrix.shape(), (0, 0));
        assert!(model.users.is_empty());
        assert!(model.items.is_empty());
    }

    #[test]
    fn test_build_from_table_requires_columns() {
        let table = EventTable::new(
            vec!["visitorid".to_string(), "itemid".to_string()],
            vec![vec!["1".to_string(), "2".to_string()]],
        );

        let result = InteractionModelBuilder::default().build_from_table(&table);
        assert!(matches!(result, Err(RecommendError::Schema(_))));
    }

    #[test]
    fn test_custom_weights() {
        let weights = WeightTable::new(
            [("view".to_string(), 2.0)].into_iter().collect(),
            0.5,
        )
        .unwrap();
        let model = InteractionModelBuilder::new(weights).build(&[
            EventRecord::new("u1", "i1", "view"),
            EventRecord::new("u1", "i1", "transaction"),
        ]);

        assert_eq!(model.interaction("u1", "i1"), Some(2.5));
    }
}
