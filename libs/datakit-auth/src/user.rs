//! User accounts and credential verification.
//!
//! Accounts live in a [`Table`] like any other record, addressed by the
//! logical identifier `id`. Password hashing is a black-box capability
//! behind [`PasswordHasher`]; the default implementation is Argon2.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use datakit_store::{Condition, DocumentBackend, IdentifierMap, Table};

use crate::error::AuthError;

/// Collection holding user records.
pub const USERS_COLLECTION: &str = "users";

/// Logical identifier field of user records.
pub const USER_IDENTIFIER: &str = "id";

/// A caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend-assigned identifier; absent until the record is stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

/// Black-box hash/verify capability.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into its opaque stored form.
    fn hash(&self, plaintext: &str) -> Result<String, AuthError>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Argon2id-backed [`PasswordHasher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        use argon2::password_hash::rand_core::OsRng;
        use argon2::password_hash::{PasswordHasher as _, SaltString};

        let salt = SaltString::generate(&mut OsRng);
        argon2::Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AuthError::Hash(err.to_string()))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        use argon2::password_hash::{PasswordHash, PasswordVerifier as _};

        PasswordHash::new(hash).is_ok_and(|parsed| {
            argon2::Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

/// Account creation and lookup over a document backend.
pub struct UserService<B, H = Argon2Hasher> {
    users: Table<B>,
    hasher: H,
}

impl<B: DocumentBackend, H: PasswordHasher> UserService<B, H> {
    pub fn new(backend: Arc<B>, hasher: H) -> Self {
        Self {
            users: Table::new(
                backend,
                USERS_COLLECTION,
                IdentifierMap::new(USER_IDENTIFIER),
            ),
            hasher,
        }
    }

    /// Hash the password and store a new user, returning it with the
    /// assigned identifier.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<User, AuthError> {
        let password_hash = self.hasher.hash(password)?;
        let user = User {
            id: None,
            username: username.to_owned(),
            password_hash,
            role: role.to_owned(),
        };
        let document =
            bson::to_document(&user).map_err(|err| AuthError::internal(err.to_string()))?;
        tracing::debug!(username, role, "creating user");
        let stored = self.users.insert(document).await?;
        bson::from_document(stored).map_err(|err| AuthError::internal(err.to_string()))
    }

    pub async fn find_one_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        let conds = [Condition::eq(USER_IDENTIFIER, id)];
        self.find_one(Some(&conds)).await
    }

    pub async fn find_one_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let conds = [Condition::eq("username", username)];
        self.find_one(Some(&conds)).await
    }

    /// Fetch at most one user matching the conditions.
    pub async fn find_one(
        &self,
        conditions: Option<&[Condition]>,
    ) -> Result<Option<User>, AuthError> {
        match self.users.find_one(conditions, None).await? {
            Some(document) => bson::from_document(document)
                .map(Some)
                .map_err(|err| AuthError::internal(err.to_string())),
            None => Ok(None),
        }
    }

    /// Verify a plaintext password against the user's stored hash.
    #[must_use]
    pub fn validate_password(&self, user: &User, password: &str) -> bool {
        self.hasher.verify(password, &user.password_hash)
    }
}
