//! Role permissions, token issuance and user accounts for datakit.
//!
//! Three pieces compose the authorization flow:
//!
//! - [`UserService`] stores identities and verifies credentials through a
//!   black-box [`PasswordHasher`].
//! - [`PermissionPolicy`] maps a role to its capability [`Grant`], fresh
//!   on every issuance.
//! - [`TokenIssuer`] builds, signs and validates the claim sets carrying
//!   those grants.

pub mod error;
pub mod policy;
pub mod token;
pub mod user;

pub use error::AuthError;
pub use policy::{Capability, Grant, PermissionPolicy, roles, scopes};
pub use token::{Claims, TOKEN_ISSUER, TokenConfig, TokenIssuer, user_id_from_subject};
pub use user::{Argon2Hasher, PasswordHasher, User, UserService};
