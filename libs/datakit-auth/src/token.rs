//! Token issuance and validation.
//!
//! The issuer is constructed once per process with its configuration bound
//! immutably: the signing secret and the validity window are injected, not
//! read from global state. Signing and decoding (including signature and
//! expiry checks) are delegated to the `jsonwebtoken` codec; this layer
//! never re-implements them.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::policy::{Grant, PermissionPolicy};
use crate::user::User;

/// Issuer claim stamped on every token.
pub const TOKEN_ISSUER: &str = "datakit-api";

const DEFAULT_VALIDITY_SECS: u64 = 600;

/// Issuer configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// HMAC signing secret.
    pub secret: SecretString,
    /// Validity window in seconds, measured from issuance.
    #[serde(default = "default_validity_secs")]
    pub validity_secs: u64,
}

impl TokenConfig {
    /// Configuration with the default ten-minute validity window.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
            validity_secs: DEFAULT_VALIDITY_SECS,
        }
    }
}

fn default_validity_secs() -> u64 {
    DEFAULT_VALIDITY_SECS
}

/// The signed claim set asserting an identity's permissions and validity
/// window. Constructed at issuance, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    /// Positional subject encoding: `{username}-{role}_{id}`. Only the
    /// trailing `_`-delimited segment is recoverable.
    pub sub: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Valid-from, seconds since epoch.
    pub nbf: i64,
    /// Valid-to, seconds since epoch.
    pub exp: i64,
    /// The permission grant embedded at issuance.
    pub aut: Grant,
}

impl Claims {
    /// Structural comparison of the non-timing fields.
    ///
    /// Two claim sets issued at different instants never share timestamps,
    /// so equivalence is judged on issuer, subject and the embedded grant.
    #[must_use]
    pub fn matches(&self, other: &Claims) -> bool {
        self.iss == other.iss && self.sub == other.sub && self.aut == other.aut
    }
}

/// Builds, signs and validates claim sets for caller identities.
pub struct TokenIssuer {
    secret: SecretString,
    validity_secs: u64,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: TokenConfig) -> Self {
        Self {
            secret: config.secret,
            validity_secs: config.validity_secs,
        }
    }

    /// Build a claim set for the user, valid from now for the configured
    /// window, with a freshly generated permission grant.
    ///
    /// # Errors
    ///
    /// [`AuthError::UnknownRole`] when the user's role is not in the
    /// policy table.
    pub fn make(&self, user: &User) -> Result<Claims, AuthError> {
        let grant = PermissionPolicy::generate(&user.role)?;
        let now = Utc::now().timestamp();
        let validity = i64::try_from(self.validity_secs).unwrap_or(i64::MAX);
        Ok(Claims {
            iss: TOKEN_ISSUER.to_owned(),
            sub: subject(user),
            iat: now,
            nbf: now,
            exp: now.saturating_add(validity),
            aut: grant,
        })
    }

    /// Sign a claim set into an opaque token string.
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|err| AuthError::internal(format!("token encoding failed: {err}")))
    }

    /// Verify and decode a presented token.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidToken`] on signature mismatch, malformed
    /// payload or expiry violation. The reason is logged, not returned.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_nbf = true;
        jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|err| {
            tracing::debug!(error = %err, "token rejected");
            AuthError::InvalidToken
        })
    }

    /// Whether presented claims still match what would be issued for the
    /// user right now.
    ///
    /// The grant is recomputed, not read back from the token, so a role
    /// change since issuance makes validation fail.
    ///
    /// # Errors
    ///
    /// [`AuthError::UnknownRole`] when the user's current role is not in
    /// the policy table.
    pub fn validate(&self, user: &User, claims: &Claims) -> Result<bool, AuthError> {
        Ok(self.make(user)?.matches(claims))
    }
}

/// Deterministic subject encoding for an identity.
#[must_use]
pub fn subject(user: &User) -> String {
    format!(
        "{}-{}_{}",
        user.username,
        user.role,
        user.id.as_deref().unwrap_or_default()
    )
}

/// Extract the trailing `_`-delimited segment of a subject: the user id.
#[must_use]
pub fn user_id_from_subject(subject: &str) -> &str {
    subject.rsplit('_').next().unwrap_or(subject)
}
