//! Role-based permission grants.
//!
//! The role table is intentionally a closed, hard-coded policy: no
//! persistence, no per-user overrides. A grant is computed fresh for every
//! issuance and embedded in the token claims, so a role change invalidates
//! previously issued tokens on comparison.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Well-known role names of the static policy table.
pub mod roles {
    pub const SERVICE: &str = "service";
    pub const GUEST: &str = "guest";
}

/// Resource scopes capabilities are granted on.
pub mod scopes {
    pub const ACCOUNTS: &str = "accounts";
    pub const HIGHSCORES: &str = "highscores";
    pub const USERS: &str = "users";
}

/// One capability token within a scope's grant.
///
/// Serialized in its compact wire form (`r`/`c`/`u`/`d`/`*`) inside token
/// claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "r")]
    Read,
    #[serde(rename = "c")]
    Create,
    #[serde(rename = "u")]
    Update,
    #[serde(rename = "d")]
    Delete,
    #[serde(rename = "*")]
    Wildcard,
}

/// Mapping from resource-scope name to the capabilities granted on it.
///
/// Ordered maps keep the serialized grant deterministic, which structural
/// claim comparison relies on.
pub type Grant = BTreeMap<String, BTreeSet<Capability>>;

/// The static role-to-grant policy.
pub struct PermissionPolicy;

impl PermissionPolicy {
    /// Build the grant for a caller's role.
    ///
    /// # Errors
    ///
    /// [`AuthError::UnknownRole`] when the role has no table entry.
    pub fn generate(role: &str) -> Result<Grant, AuthError> {
        match role {
            roles::SERVICE => Ok(Grant::from([
                (scopes::ACCOUNTS.to_owned(), all_capabilities()),
                (scopes::HIGHSCORES.to_owned(), all_capabilities()),
                (scopes::USERS.to_owned(), all_capabilities()),
            ])),
            roles::GUEST => Ok(Grant::from([
                (
                    scopes::ACCOUNTS.to_owned(),
                    BTreeSet::from([Capability::Read, Capability::Create]),
                ),
                (
                    scopes::HIGHSCORES.to_owned(),
                    BTreeSet::from([Capability::Read]),
                ),
            ])),
            other => Err(AuthError::unknown_role(other)),
        }
    }

    /// Whether a grant allows `required` on `scope`.
    ///
    /// Absent scopes deny; the wildcard capability allows everything
    /// within its scope.
    #[must_use]
    pub fn check(scope: &str, grant: &Grant, required: Capability) -> bool {
        let Some(capabilities) = grant.get(scope) else {
            return false;
        };
        capabilities.contains(&Capability::Wildcard) || capabilities.contains(&required)
    }
}

fn all_capabilities() -> BTreeSet<Capability> {
    BTreeSet::from([
        Capability::Read,
        Capability::Create,
        Capability::Update,
        Capability::Delete,
    ])
}
