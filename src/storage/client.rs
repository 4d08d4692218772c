//! Store Client Contract
//!
//! The narrow interface the ingestion and query layers consume. Every call is a
//! suspension point; implementations must be safe to share across concurrently
//! running ingestion tasks.

use super::pipeline::{AggregationSpec, QueryResult};
use super::types::{CatalogItem, SearchField, StoreError};
use async_trait::async_trait;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fast document count.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Inserts the whole batch or nothing. Returns the number of documents written.
    async fn bulk_insert(&self, items: Vec<CatalogItem>) -> Result<usize, StoreError>;

    /// Case-insensitive regex match on `field`, ordered by `reviews_count` descending.
    async fn search(&self, field: SearchField, pattern: &str)
    -> Result<Vec<CatalogItem>, StoreError>;

    /// Same predicate as [`CatalogStore::search`], count only.
    async fn count_matching(&self, field: SearchField, pattern: &str) -> Result<u64, StoreError>;

    /// Runs an aggregation pipeline; at most `limit` results for group stages.
    async fn run_aggregation(&self, spec: &AggregationSpec)
    -> Result<Vec<QueryResult>, StoreError>;

    /// Removes every document. Returns the qualified name of the cleared collection.
    async fn drop_all(&self) -> Result<String, StoreError>;

    /// Persists the current contents, if the store is backed by durable storage.
    async fn flush(&self) -> Result<(), StoreError>;

    /// Ingestion precondition: nothing has been loaded yet.
    async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.count().await? == 0)
    }
}
