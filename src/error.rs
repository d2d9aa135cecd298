use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database: {0}")]
    Database(#[from] libsql::Error),
    #[error("Corrupt comments for book {id}: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("InvalidId: {0}")]
    InvalidId(String),
    #[error("Missing: {0} returned no row")]
    Missing(&'static str),
}

impl From<crate::model::InvalidBookId> for StoreError {
    fn from(error: crate::model::InvalidBookId) -> Self {
        StoreError::InvalidId(error.0)
    }
}
