//! Authentication and authorization.
//!
//! Flow Overview:
//! 1) `POST /v1/login` checks the password against the stored Argon2id digest
//!    and returns an HS256 bearer token with the user's id, display name,
//!    role names and active flag.
//! 2) Protected routes run [`middleware::require_bearer`], which verifies the
//!    token and binds an [`Identity`] to the request.
//! 3) Handlers gate mutations with [`Identity::has_role`] /
//!    [`Identity::require_role`]; a missing role is `403`, never `401`.

pub(crate) mod identity;
pub(crate) mod login;
pub(crate) mod middleware;
pub(crate) mod password;
pub(crate) mod service;
mod state;
pub(crate) mod storage;
pub(crate) mod token;
pub(crate) mod types;

pub use identity::{Identity, IdentityClaims, ROLE_ADMIN, ROLE_OWNER, current_identity, has_role};
pub use state::{AuthConfig, AuthState};
pub use token::{TokenCodec, TokenError};
