use datakit_store::StoreError;
use thiserror::Error;

/// Authorization and account errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The role has no entry in the static policy table (policy
    /// misconfiguration, fatal).
    #[error("unknown role `{0}`")]
    UnknownRole(String),

    /// Bad signature, malformed claims or expired validity window. The
    /// internal reason is deliberately not carried beyond "invalid".
    #[error("invalid token")]
    InvalidToken,

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Non-recoverable internal failure (claim encoding, model mapping).
    #[error("internal error: {0}")]
    Internal(String),

    /// Store-level failure while reading or writing accounts.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    pub fn unknown_role(role: impl Into<String>) -> Self {
        Self::UnknownRole(role.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
