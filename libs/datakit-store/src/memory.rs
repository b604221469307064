//! Thread-safe in-memory document backend.
//!
//! Evaluates exactly the filter subset the condition translator emits
//! (`$and`, `$or` and the five comparison operators), enforces key
//! uniqueness per collection and assigns opaque keys to documents inserted
//! without one. Suited to tests and small deployments.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use tokio::sync::RwLock;

use crate::backend::{BackendError, DocumentBackend, FindOptions};
use crate::ident::NATIVE_KEY;

/// In-memory [`DocumentBackend`] keyed by collection name.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<Bson, BackendError> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_owned()).or_default();
        let key = match document.get(NATIVE_KEY) {
            Some(key) => key.clone(),
            None => {
                let key = Bson::ObjectId(ObjectId::new());
                document.insert(NATIVE_KEY, key.clone());
                key
            }
        };
        if records
            .iter()
            .any(|record| record.get(NATIVE_KEY) == Some(&key))
        {
            return Err(BackendError::Duplicate);
        }
        records.push(document);
        Ok(key)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Option<Document>, BackendError> {
        let collections = self.collections.read().await;
        let Some(records) = collections.get(collection) else {
            return Ok(None);
        };
        Ok(records
            .iter()
            .find(|record| matches(&filter, record))
            .map(|record| apply_projection(record, projection.as_ref())))
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, BackendError> {
        let collections = self.collections.read().await;
        let Some(records) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut selected: Vec<Document> = records
            .iter()
            .filter(|record| matches(&filter, record))
            .cloned()
            .collect();
        if let Some(sort) = &options.sort {
            sort_documents(&mut selected, sort);
        }
        if let Some(skip) = options.skip {
            let skip = usize::try_from(skip).unwrap_or(usize::MAX);
            selected = selected.into_iter().skip(skip).collect();
        }
        if let Some(limit) = options.limit {
            let limit = usize::try_from(limit).unwrap_or(0);
            selected.truncate(limit);
        }
        Ok(selected
            .iter()
            .map(|record| apply_projection(record, options.projection.as_ref()))
            .collect())
    }
}

/// Evaluate a native filter against a document. An empty filter matches.
fn matches(filter: &Document, document: &Document) -> bool {
    filter.iter().all(|(key, operand)| match key.as_str() {
        "$and" => group_operands(operand)
            .is_some_and(|docs| docs.iter().all(|f| matches(f, document))),
        "$or" => group_operands(operand)
            .is_some_and(|docs| docs.iter().any(|f| matches(f, document))),
        field => match operand {
            Bson::Document(ops) if ops.keys().any(|k| k.starts_with('$')) => ops
                .iter()
                .all(|(op, value)| compare(document.get(field), op, value)),
            literal => document.get(field).is_some_and(|value| bson_eq(value, literal)),
        },
    })
}

fn group_operands(operand: &Bson) -> Option<Vec<&Document>> {
    operand
        .as_array()?
        .iter()
        .map(Bson::as_document)
        .collect()
}

fn compare(actual: Option<&Bson>, op: &str, operand: &Bson) -> bool {
    let Some(actual) = actual else { return false };
    match op {
        "$eq" => bson_eq(actual, operand),
        "$gt" => order_values(actual, operand) == Some(Ordering::Greater),
        "$gte" => matches!(
            order_values(actual, operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        "$lt" => order_values(actual, operand) == Some(Ordering::Less),
        "$lte" => matches!(
            order_values(actual, operand),
            Some(Ordering::Less | Ordering::Equal)
        ),
        _ => false,
    }
}

/// Equality that bridges representation differences: numeric types compare
/// by value, and an opaque key equals its stringified form so callers can
/// query by the identifiers the codec hands back.
fn bson_eq(a: &Bson, b: &Bson) -> bool {
    if a == b {
        return true;
    }
    if let (Some(x), Some(y)) = (numeric(a), numeric(b)) {
        return x == y;
    }
    match (a, b) {
        (Bson::ObjectId(oid), Bson::String(s)) | (Bson::String(s), Bson::ObjectId(oid)) => {
            oid.to_hex() == *s
        }
        _ => false,
    }
}

fn order_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (numeric(a), numeric(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        #[allow(clippy::cast_precision_loss)]
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn sort_documents(records: &mut [Document], sort: &Document) {
    records.sort_by(|a, b| {
        for (field, direction) in sort {
            let ord = order_values(
                a.get(field).unwrap_or(&Bson::Null),
                b.get(field).unwrap_or(&Bson::Null),
            )
            .unwrap_or(Ordering::Equal);
            let ord = if descending(direction) {
                ord.reverse()
            } else {
                ord
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

fn descending(direction: &Bson) -> bool {
    numeric(direction) == Some(-1.0)
}

/// Apply an inclusion projection; the native key rides along unless the
/// projection suppresses it.
fn apply_projection(document: &Document, projection: Option<&Document>) -> Document {
    let Some(projection) = projection else {
        return document.clone();
    };
    let key_suppressed = projection.get(NATIVE_KEY).and_then(numeric) == Some(0.0);
    let mut out = Document::new();
    if !key_suppressed {
        if let Some(key) = document.get(NATIVE_KEY) {
            out.insert(NATIVE_KEY, key.clone());
        }
    }
    for (field, flag) in projection {
        if field == NATIVE_KEY {
            continue;
        }
        if numeric(flag).is_some_and(|f| f != 0.0) {
            if let Some(value) = document.get(field) {
                out.insert(field, value.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use bson::doc;

    #[tokio::test]
    async fn insert_assigns_key_when_absent() {
        let backend = MemoryBackend::new();
        let key = backend
            .insert_one("things", doc! { "name": "a" })
            .await
            .unwrap();
        assert!(matches!(key, Bson::ObjectId(_)));
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_key() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("things", doc! { "_id": "k1" })
            .await
            .unwrap();
        let err = backend
            .insert_one("things", doc! { "_id": "k1" })
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Duplicate));
    }

    #[tokio::test]
    async fn find_applies_filter_sort_skip_and_limit() {
        let backend = MemoryBackend::new();
        for (name, score) in [("a", 3), ("b", 1), ("c", 5), ("d", 2)] {
            backend
                .insert_one("scores", doc! { "name": name, "score": score })
                .await
                .unwrap();
        }
        let results = backend
            .find(
                "scores",
                doc! { "$and": [{ "score": { "$gt": 1 } }] },
                FindOptions {
                    sort: Some(doc! { "score": -1 }),
                    skip: Some(1),
                    limit: Some(2),
                    projection: None,
                },
            )
            .await
            .unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.get_str("name").unwrap()).collect();
        assert_eq!(names, ["a", "d"]);
    }

    #[tokio::test]
    async fn or_groups_and_literal_equality_match() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("users", doc! { "name": "bob", "role": "guest" })
            .await
            .unwrap();
        let filter = doc! { "$or": [
            { "name": { "$eq": "alice" } },
            { "role": "guest" },
        ]};
        let found = backend.find_one("users", filter, None).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn projection_limits_fields_and_respects_key_suppression() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("users", doc! { "name": "bob", "score": 7 })
            .await
            .unwrap();
        let found = backend
            .find_one(
                "users",
                Document::new(),
                Some(doc! { "name": 1, "_id": 0 }),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, doc! { "name": "bob" });
    }

    #[tokio::test]
    async fn stringified_key_matches_stored_object_id() {
        let backend = MemoryBackend::new();
        let key = backend
            .insert_one("users", doc! { "name": "bob" })
            .await
            .unwrap();
        let Bson::ObjectId(oid) = key else {
            panic!("expected an ObjectId key");
        };
        let filter = doc! { "_id": { "$eq": oid.to_hex() } };
        let found = backend.find_one("users", filter, None).await.unwrap();
        assert!(found.is_some());
    }
}
