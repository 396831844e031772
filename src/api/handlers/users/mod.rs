//! User signup and lookups.
//!
//! Signup is public and creates an active user with no roles; roles are granted
//! out of band through `role_user`. Lookups require a bearer token.

pub(crate) mod profile;
pub(crate) mod signup;
mod storage;
pub(crate) mod types;
pub(crate) mod validate;
