use thiserror::Error;

/// Failures reported by a [`DocumentBackend`](crate::backend::DocumentBackend).
///
/// Connectivity problems are carried verbatim in [`BackendError::Io`]; this
/// layer adds no retry policy and no classification beyond the uniqueness
/// violation every backend must distinguish.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend rejected a write because of a uniqueness constraint.
    #[error("duplicate key")]
    Duplicate,

    /// Any other backend failure (connectivity, protocol, storage).
    #[error("backend error: {0}")]
    Io(String),
}

impl BackendError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }
}

/// Domain-level errors surfaced by the store.
///
/// Raw backend exception types never cross this boundary: uniqueness
/// violations on insert become [`StoreError::Duplicate`], everything else is
/// wrapped in [`StoreError::Backend`] and propagated to the caller unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Insert collided with an existing record (recoverable by the caller).
    #[error("duplicate record")]
    Duplicate,

    /// A caller-supplied condition literal could not be decoded.
    #[error("unsupported condition: {0}")]
    UnsupportedCondition(String),

    /// A comparison operator token outside the supported set.
    #[error("unsupported operator `{0}`")]
    UnsupportedOperator(String),

    /// Backend failure, propagated as-is.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StoreError {
    pub fn unsupported_condition(message: impl Into<String>) -> Self {
        Self::UnsupportedCondition(message.into())
    }

    pub fn unsupported_operator(token: impl Into<String>) -> Self {
        Self::UnsupportedOperator(token.into())
    }
}
