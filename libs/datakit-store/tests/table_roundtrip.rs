//! End-to-end table behavior against the in-memory backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use bson::doc;
use datakit_store::{
    Condition, Direction, FindQuery, IdentifierMap, MemoryBackend, StoreError, Table,
};
use serde_json::json;

fn accounts(backend: &Arc<MemoryBackend>) -> Table<MemoryBackend> {
    Table::new(Arc::clone(backend), "accounts", IdentifierMap::new("id"))
}

#[tokio::test]
async fn insert_with_nil_key_gets_backend_assigned_identifier() {
    let backend = Arc::new(MemoryBackend::new());
    let table = accounts(&backend);

    let stored = table
        .insert(doc! { "id": bson::Bson::Null, "username": "bob" })
        .await
        .unwrap();

    assert_eq!(stored.get_str("username").unwrap(), "bob");
    let id = stored.get_str("id").unwrap();
    assert!(!id.is_empty());
    assert!(!stored.contains_key("_id"));
}

#[tokio::test]
async fn stored_record_is_findable_by_its_logical_identifier() {
    let backend = Arc::new(MemoryBackend::new());
    let table = accounts(&backend);

    let stored = table.insert(doc! { "username": "bob" }).await.unwrap();
    let id = stored.get_str("id").unwrap().to_owned();

    let conds = [Condition::eq("id", id)];
    let found = table.find_one(Some(&conds), None).await.unwrap().unwrap();
    assert_eq!(found.get_str("username").unwrap(), "bob");
}

#[tokio::test]
async fn duplicate_insert_surfaces_domain_error() {
    let backend = Arc::new(MemoryBackend::new());
    let table = accounts(&backend);

    table
        .insert(doc! { "id": "bob-1", "username": "bob" })
        .await
        .unwrap();
    let err = table
        .insert(doc! { "id": "bob-1", "username": "bob" })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate));
}

#[tokio::test]
async fn find_one_absent_is_not_an_error() {
    let backend = Arc::new(MemoryBackend::new());
    let table = accounts(&backend);

    let conds = [Condition::eq("username", "nobody")];
    let found = table.find_one(Some(&conds), None).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn find_applies_default_limit_of_100() {
    let backend = Arc::new(MemoryBackend::new());
    let table = accounts(&backend);

    for n in 0..120 {
        table
            .insert(doc! { "username": format!("user-{n:03}") })
            .await
            .unwrap();
    }

    let results = table.find(None, None, FindQuery::default()).await.unwrap();
    assert_eq!(results.len(), 100);
}

#[tokio::test]
async fn find_preserves_multi_key_order_precedence() {
    let backend = Arc::new(MemoryBackend::new());
    let table = accounts(&backend);

    for (name, score) in [("carol", 10), ("alice", 20), ("bob", 10)] {
        table
            .insert(doc! { "username": name, "score": score })
            .await
            .unwrap();
    }

    let query = FindQuery {
        order: Some(vec![
            ("score".to_owned(), Direction::Desc),
            ("username".to_owned(), Direction::Asc),
        ]),
        ..FindQuery::default()
    };
    let results = table.find(None, None, query).await.unwrap();
    let names: Vec<&str> = results
        .iter()
        .map(|r| r.get_str("username").unwrap())
        .collect();
    assert_eq!(names, ["alice", "bob", "carol"]);
}

#[tokio::test]
async fn find_applies_offset_only_when_supplied() {
    let backend = Arc::new(MemoryBackend::new());
    let table = accounts(&backend);

    for n in 0..5 {
        table.insert(doc! { "n": n }).await.unwrap();
    }

    let query = FindQuery {
        offset: Some(3),
        order: Some(vec![("n".to_owned(), Direction::Asc)]),
        ..FindQuery::default()
    };
    let results = table.find(None, None, query).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].get_i32("n").unwrap(), 3);
}

#[tokio::test]
async fn projection_keeps_logical_identifier_when_requested() {
    let backend = Arc::new(MemoryBackend::new());
    let table = accounts(&backend);
    table
        .insert(doc! { "username": "bob", "score": 7 })
        .await
        .unwrap();

    let fields = vec!["id".to_owned(), "username".to_owned()];
    let found = table
        .find_one(None, Some(&fields))
        .await
        .unwrap()
        .unwrap();
    assert!(found.contains_key("id"));
    assert!(found.contains_key("username"));
    assert!(!found.contains_key("score"));

    let fields = vec!["username".to_owned()];
    let found = table
        .find_one(None, Some(&fields))
        .await
        .unwrap()
        .unwrap();
    assert!(!found.contains_key("id"));
    assert!(!found.contains_key("_id"));
}

#[tokio::test]
async fn wire_literals_drive_a_full_query() {
    let backend = Arc::new(MemoryBackend::new());
    let table = accounts(&backend);

    for (name, score) in [("alice", 150), ("bob", 80), ("carol", 120)] {
        table
            .insert(doc! { "username": name, "score": score })
            .await
            .unwrap();
    }

    let conds = Condition::list_from_wire(&json!([
        { "or": [["score", ">", 100], ["username", "bob"]] }
    ]))
    .unwrap();
    let order = datakit_store::table::order_from_wire(&json!([["score", "desc"]])).unwrap();

    let query = FindQuery {
        order: Some(order),
        ..FindQuery::default()
    };
    let results = table.find(Some(&conds), None, query).await.unwrap();
    let names: Vec<&str> = results
        .iter()
        .map(|r| r.get_str("username").unwrap())
        .collect();
    assert_eq!(names, ["alice", "carol", "bob"]);
}
