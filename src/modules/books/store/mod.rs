//! Book record store: the document collection behind the catalog service.

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use bookstore_db::Database;
use thiserror::Error;

use super::models::{Book, BookFields, BookId, BookInput};
use super::validation::ValidationError;

pub use memory::MemoryBookStore;
pub use sqlite::{SqliteBookStore, MIGRATION_001_INIT};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value '{value}' for unique field '{field}'")]
    Duplicate { field: &'static str, value: String },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt book document: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Single-document operations over the book collection.
///
/// The store assigns ids and maintains timestamps; `isbn` is unique when
/// present and a violation surfaces as [`StoreError::Duplicate`].
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books, newest first.
    async fn list(&self) -> Result<Vec<Book>, StoreError>;

    async fn get(&self, id: &BookId) -> Result<Option<Book>, StoreError>;

    async fn insert(&self, fields: BookFields) -> Result<Book, StoreError>;

    /// Merge `changes` into a stored book, check the result against the
    /// constraint table and write it, as one atomic step. `None` if absent.
    async fn update(&self, id: &BookId, changes: BookInput) -> Result<Option<Book>, StoreError>;

    /// Remove a book, returning its last state; `None` if absent.
    async fn delete(&self, id: &BookId) -> Result<Option<Book>, StoreError>;
}

/// Pick the store implementation matching the connected backend.
pub fn for_database(db: &Database) -> Arc<dyn BookStore> {
    match db {
        Database::Sqlite(pool) => Arc::new(SqliteBookStore::new(pool.clone())),
        Database::Memory => Arc::new(MemoryBookStore::new()),
    }
}
