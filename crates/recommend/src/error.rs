use storefront_core::CoreError;

pub type Result<T> = std::result::Result<T, RecommendError>;

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    /// Required columns are absent, or a row lacks a required value
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("No interaction data to train on")]
    EmptyData,

    #[error("Recommendation model is not trained yet")]
    NotReady,

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] CoreError),
}

impl RecommendError {
    pub(crate) fn missing_columns(columns: &[&str]) -> Self {
        Self::Schema(format!("missing required columns: {}", columns.join(", ")))
    }
}
