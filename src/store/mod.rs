//! Document store adapter.
//!
//! Handlers talk to the book collection only through the [`BookStore`]
//! trait. Two implementations ship with the crate:
//!
//! - [`MemoryBookStore`]: a `RwLock`-guarded vector, used by tests and local runs
//! - `MongoBookStore`: the production backend over a MongoDB collection
//!   (requires the `mongo` feature, enabled by default)
//!
//! Every query is expressed as a [`BookFilter`], which is either match-all or
//! an equality match on `isbn`.

mod memory;
#[cfg(feature = "mongo")]
mod mongo;

pub use memory::MemoryBookStore;
#[cfg(feature = "mongo")]
pub use mongo::MongoBookStore;

use crate::model::{Book, BookDocument};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),

    #[cfg(feature = "mongo")]
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Only raised when the store enforces a unique `isbn`.
    #[error("duplicate isbn {0:?}")]
    Duplicate(String),

    #[error("document codec error: {0}")]
    Codec(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        StoreError::Backend(msg.into())
    }
}

/// Query predicate used to select documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    /// Matches every document in the collection.
    All,
    /// Matches documents whose `isbn` equals the value.
    Isbn(String),
}

impl BookFilter {
    pub fn isbn(isbn: impl Into<String>) -> Self {
        BookFilter::Isbn(isbn.into())
    }

    /// Evaluate the filter against a stored document.
    pub fn matches(&self, doc: &BookDocument) -> bool {
        match self {
            BookFilter::All => true,
            BookFilter::Isbn(isbn) => doc.isbn == *isbn,
        }
    }
}

/// Result of an `update_one` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Result of a `delete_one` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: u64,
}

/// Capability interface over the book collection.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Every book matching `filter`, in store order.
    async fn find(&self, filter: &BookFilter) -> StoreResult<Vec<Book>>;

    /// Insert a new document. No existence check unless the store enforces a
    /// unique `isbn`.
    async fn insert_one(&self, book: Book) -> StoreResult<()>;

    /// First document matching `filter`, if any.
    async fn find_one(&self, filter: &BookFilter) -> StoreResult<Option<Book>>;

    /// Set the non-empty fields of `book` on the first document matching
    /// `filter`. A miss is reported through [`UpdateOutcome::matched`], not
    /// as an error.
    async fn update_one(&self, filter: &BookFilter, book: Book) -> StoreResult<UpdateOutcome>;

    /// Remove at most one document matching `filter`.
    async fn delete_one(&self, filter: &BookFilter) -> StoreResult<DeleteOutcome>;

    /// Round-trip to the backend, used by the readiness probe.
    async fn ping(&self) -> StoreResult<()>;

    /// Release backend resources at shutdown.
    async fn shutdown(&self) {}

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Which backend to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongo,
    Memory,
}

/// Store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Connection string for the MongoDB backend
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Reject a second document with an `isbn` that is already stored
    #[serde(default)]
    pub unique_isbn: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            uri: default_uri(),
            database: default_database(),
            collection: default_collection(),
            unique_isbn: false,
        }
    }
}

impl StoreConfig {
    /// In-memory configuration, handy for tests.
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            ..Self::default()
        }
    }

    /// Build the configured backend.
    ///
    /// For MongoDB this connects the client and, when `unique_isbn` is set,
    /// creates the unique index before returning.
    pub async fn build(&self) -> StoreResult<Arc<dyn BookStore>> {
        match self.backend {
            StoreBackend::Memory => Ok(Arc::new(if self.unique_isbn {
                MemoryBookStore::with_unique_isbn()
            } else {
                MemoryBookStore::new()
            })),
            StoreBackend::Mongo => {
                #[cfg(feature = "mongo")]
                {
                    let store = MongoBookStore::connect(
                        &self.uri,
                        &self.database,
                        &self.collection,
                        self.unique_isbn,
                    )
                    .await?;
                    Ok(Arc::new(store))
                }
                #[cfg(not(feature = "mongo"))]
                {
                    Err(StoreError::backend(
                        "mongo backend disabled at compile time",
                    ))
                }
            }
        }
    }
}

fn default_uri() -> String {
    "mongodb://172.19.0.2".to_string()
}

fn default_database() -> String {
    "store".to_string()
}

fn default_collection() -> String {
    "books".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isbn_filter_matches_exactly() {
        let doc = BookDocument::from(Book::new("123"));
        assert!(BookFilter::All.matches(&doc));
        assert!(BookFilter::isbn("123").matches(&doc));
        assert!(!BookFilter::isbn("1234").matches(&doc));
    }

    #[test]
    fn default_store_config_points_at_books_collection() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.backend, StoreBackend::Mongo);
        assert_eq!(cfg.database, "store");
        assert_eq!(cfg.collection, "books");
        assert!(!cfg.unique_isbn);
    }

    #[tokio::test]
    async fn in_memory_config_builds_memory_store() {
        let store = StoreConfig::in_memory().build().await.unwrap();
        assert_eq!(store.name(), "memory");
        assert!(store.ping().await.is_ok());
    }
}
