pub mod manager;
pub mod models;
pub mod pg_table;
pub mod rest_table;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{ProfileRow, TableRow, UserRow};
pub use pg_table::PgTable;
pub use rest_table::RestTable;

/// Errors from a table write
#[derive(Debug, Error)]
pub enum StoreError {
    /// The table endpoint answered and refused; `message` is its own wording
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid table endpoint: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Outcome of a write whose failure must not abort the caller
#[derive(Debug)]
pub enum BestEffort {
    /// The write went through; `rows` when the backend reports a count
    Applied { rows: Option<u64> },
    /// The write failed and the failure was deliberately not propagated
    Ignored(StoreError),
}

impl BestEffort {
    /// Rows removed, when the write went through and the backend counts them
    pub fn rows(&self) -> Option<u64> {
        match self {
            BestEffort::Applied { rows } => *rows,
            BestEffort::Ignored(_) => None,
        }
    }

    pub fn ignored_error(&self) -> Option<&StoreError> {
        match self {
            BestEffort::Ignored(e) => Some(e),
            BestEffort::Applied { .. } => None,
        }
    }
}

impl From<Result<Option<u64>, StoreError>> for BestEffort {
    fn from(result: Result<Option<u64>, StoreError>) -> Self {
        match result {
            Ok(rows) => BestEffort::Applied { rows },
            Err(e) => BestEffort::Ignored(e),
        }
    }
}

/// A table holding one mirror of the user record
#[async_trait]
pub trait RecordStore<R: TableRow>: Send + Sync {
    fn table(&self) -> &str;

    async fn insert(&self, row: &R) -> Result<(), StoreError>;

    /// Remove the row with this id; absence is not an error
    async fn delete_by_id(&self, id: Uuid) -> BestEffort;
}
