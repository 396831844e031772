//! Login: credential check, claim construction, token issuance.
//!
//! Every credential failure collapses into the same `Unauthorized` so a caller
//! cannot tell an unknown username from a wrong password.

use tracing::{debug, error};

use super::{
    identity::IdentityClaims,
    password::{DUMMY_DIGEST, verify_password},
    state::AuthState,
    storage::CredentialStore,
};
use crate::api::error::ApiError;

/// Verify `username`/`password` and return a signed bearer token valid from `now`.
///
/// # Errors
/// `BadRequest` for empty input, `Unauthorized` for any credential mismatch,
/// `Internal` for store or signing failures.
pub async fn login<S: CredentialStore>(
    store: &S,
    auth_state: &AuthState,
    username: &str,
    password: &str,
    now: u64,
) -> Result<String, ApiError> {
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("Username and password are required."));
    }

    let record = store
        .find_active_user(username)
        .await
        .map_err(ApiError::internal)?;

    let Some(record) = record else {
        // Same Argon2 cost as a wrong password, so timing does not reveal the username.
        let _ = verify_password(password, &DUMMY_DIGEST);
        debug!("Login rejected: no active user");
        return Err(ApiError::Unauthorized);
    };

    if !verify_password(password, &record.password_hash) {
        debug!(user_id = %record.user_id, "Login rejected: password mismatch");
        return Err(ApiError::Unauthorized);
    }

    let roles = store
        .role_names(record.user_id)
        .await
        .map_err(ApiError::internal)?;

    let claims = IdentityClaims {
        id: record.user_id,
        username: record.display_name(),
        roles,
        status: record.is_active,
    };

    auth_state.codec().issue(&claims, now).map_err(|err| {
        error!("Failed to sign token: {err}");
        ApiError::internal(err)
    })
}
