//! Storefront Recommendation Engine
//!
//! Collaborative filtering over storefront event logs (views, add-to-cart,
//! purchases). Events are weighted by type and summed into a sparse
//! user x item matrix; a user's recommendations are the items their nearest
//! neighbors (cosine similarity over interaction rows) engaged with most.
//!
//! ```
//! use storefront_recommend::{EventRecord, NeighborRecommender};
//!
//! let model = NeighborRecommender::default()
//!     .build_and_fit(&[
//!         EventRecord::new("alice", "kettle", "view"),
//!         EventRecord::new("bob", "kettle", "view"),
//!         EventRecord::new("bob", "teapot", "transaction"),
//!     ])
//!     .expect("non-empty log");
//!
//! assert_eq!(model.recommend("alice", 1), vec!["teapot"]);
//! assert!(model.recommend("mallory", 10).is_empty());
//! ```

pub mod builder;
pub mod collaborative;
pub mod config;
pub mod error;
pub mod events;
pub mod ingest;
pub mod neighbors;
pub mod service;
pub mod sparse;

pub use builder::{IdMapping, InteractionModel, InteractionModelBuilder};
pub use collaborative::{NeighborRecommender, ScoredItem, SimilarUser, TrainedModel};
pub use config::{EngineConfig, EventSchema, DEFAULT_NEIGHBOR_POOL_SIZE, DEFAULT_TOP_N};
pub use error::{RecommendError, Result};
pub use events::{EventRecord, WeightTable, ADD_TO_CART, TRANSACTION, VIEW};
pub use ingest::EventTable;
pub use neighbors::{CosineNeighborIndex, Neighbor};
pub use service::RecommendationService;
pub use sparse::SparseMatrix;
