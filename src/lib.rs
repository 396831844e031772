//! # Roster (Identity & Access Control)
//!
//! `roster` is the identity layer of a multi-tenant record backend. It owns
//! credential verification, bearer token issuance and verification, role
//! checks, and the shareable session ("room") model.
//!
//! ## Authentication
//!
//! Users log in with a username and password. Passwords are stored as Argon2id
//! PHC strings and checked with the algorithm's own verifier. A successful login
//! returns an HS256 JWT carrying the user id, display name, role names, active
//! flag and expiration.
//!
//! Every login failure returns the same `401` so callers cannot tell a missing
//! user from a wrong password.
//!
//! ## Authorization
//!
//! Protected routes run behind a bearer-token middleware that validates the
//! token, decodes typed claims and stores an [`api::Identity`] in the request
//! extensions. Handlers gate mutations with role checks: a missing role is
//! `403 Forbidden`, a missing or bad token is `401 Unauthorized`.
//!
//! ## Sessions & Rooms
//!
//! Sessions are shareable resources addressed by a short random hex slug. Slugs
//! are unique at the storage layer; collisions are retried with a bounded
//! number of attempts and growing length. The session row and its owner room
//! membership are written in a single transaction. Deleting a session only sets
//! `deleted_at`.

pub mod api;
pub mod cli;

#[cfg(test)]
pub(crate) mod test_support;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
