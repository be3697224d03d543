//! The backend seam the collection controller's driver talks to.

use super::query::QueryDescriptor;
use crate::error::CollectionError;
use crate::record::Record;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One page of records plus the size of the whole filtered collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionPage<R> {
    pub records: Vec<R>,
    pub total_count: u64,
}

impl<R> CollectionPage<R> {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            total_count: 0,
        }
    }
}

/// Paged access to one record collection.
#[async_trait]
pub trait CollectionApi<R: Record>: Send + Sync {
    /// Fetch the records `query` describes.
    async fn fetch_page(&self, query: &QueryDescriptor) -> Result<CollectionPage<R>, CollectionError>;

    /// Delete a single record by id.
    async fn delete_record(&self, id: &R::Id) -> Result<(), CollectionError>;
}
