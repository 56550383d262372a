mod schema;
mod models;
mod store;

pub use schema::{Database, Checkpoint};
pub use models::{PaperRecord, PaperAbstract, AbstractSource};
pub use store::PaperStore;

/// Failures of the paper store or its persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database connection lock poisoned")]
    Poisoned,
}
