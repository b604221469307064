//! Table-level orchestration of codec, translator and projection builder.

use std::sync::Arc;

use bson::Document;
use serde_json::Value;

use crate::backend::{BackendError, DocumentBackend, FindOptions};
use crate::codec::RecordCodec;
use crate::condition::Condition;
use crate::error::StoreError;
use crate::ident::{IdentifierMap, NATIVE_KEY};
use crate::{filter, projection};

/// Default page size for [`Table::find`].
pub const DEFAULT_LIMIT: i64 = 100;

/// Sort direction of one order pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Decode a wire token; anything but `"desc"` sorts ascending.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        if token == "desc" { Self::Desc } else { Self::Asc }
    }

    /// The backend's native sort token.
    #[must_use]
    pub fn native(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// Ordered `(field, direction)` pairs; sequence order is sort precedence.
pub type OrderSpec = Vec<(String, Direction)>;

/// Decode an order literal: `[["field", "asc"|"desc"], ...]`.
pub fn order_from_wire(literal: &Value) -> Result<OrderSpec, StoreError> {
    let Value::Array(pairs) = literal else {
        return Err(StoreError::unsupported_condition(
            "order must be an array of [field, direction] pairs",
        ));
    };
    pairs
        .iter()
        .map(|pair| match pair.as_array().map(Vec::as_slice) {
            Some([Value::String(field), Value::String(direction)]) => {
                Ok((field.clone(), Direction::from_token(direction)))
            }
            _ => Err(StoreError::unsupported_condition(
                "order entries must be [field, direction] string pairs",
            )),
        })
        .collect()
}

/// Pagination and ordering for [`Table::find`].
#[derive(Debug, Clone)]
pub struct FindQuery {
    /// Maximum number of records returned. Always applied.
    pub limit: i64,
    /// Number of records to skip; only applied when supplied.
    pub offset: Option<u64>,
    /// Multi-key sort; only applied when supplied.
    pub order: Option<OrderSpec>,
}

impl Default for FindQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: None,
            order: None,
        }
    }
}

/// A logical table bound to one backend collection and one identifier
/// convention.
///
/// Stateless and request-scoped: each operation makes exactly one backend
/// call and holds no caches or locks of its own. Concurrent writers are
/// serialized only by the backend's own concurrency control.
pub struct Table<B> {
    backend: Arc<B>,
    collection: String,
    ident: IdentifierMap,
    codec: RecordCodec,
}

impl<B: DocumentBackend> Table<B> {
    pub fn new(backend: Arc<B>, collection: impl Into<String>, ident: IdentifierMap) -> Self {
        let codec = RecordCodec::new(ident.clone());
        Self {
            backend,
            collection: collection.into(),
            ident,
            codec,
        }
    }

    /// Insert a record and return it as stored, with any backend-assigned
    /// key visible under the logical identifier.
    pub async fn insert(&self, record: Document) -> Result<Document, StoreError> {
        let mut encoded = self.codec.encode(record);
        tracing::debug!(collection = %self.collection, "inserting record");
        let key = self
            .backend
            .insert_one(&self.collection, encoded.clone())
            .await
            .map_err(|err| match err {
                BackendError::Duplicate => {
                    tracing::debug!(collection = %self.collection, "duplicate record rejected");
                    StoreError::Duplicate
                }
                other => StoreError::Backend(other),
            })?;
        encoded.insert(NATIVE_KEY, key);
        Ok(self.codec.decode(encoded))
    }

    /// Fetch at most one record. An absent result is not an error.
    pub async fn find_one(
        &self,
        conditions: Option<&[Condition]>,
        fields: Option<&[String]>,
    ) -> Result<Option<Document>, StoreError> {
        let filter = filter::translate(conditions, &self.ident);
        let projection = projection::build_projection(fields, &self.ident);
        let record = self
            .backend
            .find_one(&self.collection, filter, projection)
            .await?;
        Ok(record.map(|record| self.codec.decode(record)))
    }

    /// Fetch all matching records, honoring limit (default
    /// [`DEFAULT_LIMIT`]), optional offset and optional multi-key order.
    pub async fn find(
        &self,
        conditions: Option<&[Condition]>,
        fields: Option<&[String]>,
        query: FindQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let filter = filter::translate(conditions, &self.ident);
        let projection = projection::build_projection(fields, &self.ident);
        let sort = query.order.as_ref().map(|pairs| {
            let mut sort = Document::new();
            for (field, direction) in pairs {
                sort.insert(field, direction.native());
            }
            sort
        });
        tracing::debug!(
            collection = %self.collection,
            limit = query.limit,
            offset = ?query.offset,
            "querying records"
        );
        let records = self
            .backend
            .find(
                &self.collection,
                filter,
                FindOptions {
                    projection,
                    limit: Some(query.limit),
                    skip: query.offset,
                    sort,
                },
            )
            .await?;
        Ok(records
            .into_iter()
            .map(|record| self.codec.decode(record))
            .collect())
    }
}
