//! Backend-agnostic document access layer.
//!
//! A [`Table`] accepts a structured, backend-neutral query description —
//! conditions, projections, ordering, pagination — plus an identifier
//! convention, and translates it into the native query language of a
//! concrete storage engine behind the [`DocumentBackend`] trait. Documents
//! are type-erased BSON, so alternate engines plug in without touching the
//! translation logic.
//!
//! ```
//! use std::sync::Arc;
//! use bson::doc;
//! use datakit_store::{Condition, FindQuery, IdentifierMap, MemoryBackend, Table};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), datakit_store::StoreError> {
//! let table = Table::new(Arc::new(MemoryBackend::new()), "accounts", IdentifierMap::new("id"));
//! let stored = table.insert(doc! { "username": "bob" }).await?;
//! assert!(stored.get_str("id").is_ok());
//!
//! let conds = [Condition::eq("username", "bob")];
//! let found = table.find_one(Some(&conds), None).await?;
//! assert!(found.is_some());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod codec;
pub mod condition;
pub mod error;
pub mod filter;
pub mod ident;
pub mod memory;
pub mod projection;
pub mod table;

pub use backend::{DocumentBackend, FindOptions};
pub use codec::RecordCodec;
pub use condition::{CompareOp, Combinator, Condition};
pub use error::{BackendError, StoreError};
pub use ident::{IdentifierMap, NATIVE_KEY};
pub use memory::MemoryBackend;
pub use table::{DEFAULT_LIMIT, Direction, FindQuery, OrderSpec, Table, order_from_wire};
