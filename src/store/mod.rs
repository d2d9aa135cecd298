//! Store Adapter
//!
//! The persistence seam for book records. Handlers only ever see a
//! `dyn BookStore`, so the libsql-backed store used in production and the
//! in-memory store used by tests are interchangeable.

mod libsql;
mod memory;

pub use self::libsql::LibsqlStore;
pub use self::memory::MemoryStore;

use crate::error::StoreError;
use crate::model::{BookId, BookRecord, BookSummary};

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a bulk delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteAll {
    pub acknowledged: bool,
    pub deleted: u64,
}

#[async_trait::async_trait]
pub trait BookStore: Send + Sync + 'static {
    /// Persists a new record with a fresh id, no comments and a zero count.
    async fn insert(&self, title: &str) -> StoreResult<BookRecord>;

    /// All records projected to id, title and comment count, in creation order.
    async fn find_all(&self) -> StoreResult<Vec<BookSummary>>;

    async fn find_by_id(&self, id: &BookId) -> StoreResult<Option<BookRecord>>;

    /// Overwrites an existing record. Returns `None` if it no longer exists.
    async fn save(&self, book: &BookRecord) -> StoreResult<Option<BookRecord>>;

    /// Finds and removes a record in one step.
    async fn delete_by_id(&self, id: &BookId) -> StoreResult<Option<BookRecord>>;

    async fn delete_all(&self) -> StoreResult<DeleteAll>;
}
