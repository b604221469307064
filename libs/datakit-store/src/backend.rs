//! The narrow interface a concrete storage engine must provide.
//!
//! Everything the table adapter needs from a driver fits in three calls;
//! connection management, wire protocol and cursors stay on the other side
//! of this trait.

use async_trait::async_trait;
use bson::{Bson, Document};

pub use crate::error::BackendError;

/// Options for a multi-record query.
///
/// `sort` is a native multi-key sort document whose entry order carries
/// precedence; `1` is ascending, `-1` descending.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub projection: Option<Document>,
    pub limit: Option<i64>,
    pub skip: Option<u64>,
    pub sort: Option<Document>,
}

/// A storage engine able to hold and query BSON documents.
///
/// Implementations report uniqueness violations as
/// [`BackendError::Duplicate`]; any other failure propagates unchanged
/// through the store, which adds no retry policy.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Insert a single document, returning the stored key (assigned by the
    /// backend when the document carried none).
    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<Bson, BackendError>;

    /// Fetch at most one document matching the filter.
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Option<Document>, BackendError>;

    /// Fetch all documents matching the filter, honoring
    /// sort/skip/limit/projection.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, BackendError>;
}
