//! Bearer-token gate for protected routes.
//!
//! Attached with `route_layer` to the protected sub-router only. Every
//! rejection is the same bare `401`; the log line records which check failed.

use axum::{
    Extension,
    extract::Request,
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::{
    identity::{Identity, IdentityClaims},
    state::AuthState,
    token::{Claims, TokenError, unix_now},
};
use crate::api::error::ApiError;

/// Why a request was turned away. Only ever logged.
#[derive(Debug)]
pub(crate) enum Rejection {
    MissingHeader,
    MalformedHeader,
    Token(TokenError),
    Claims(serde_json::Error),
}

pub async fn require_bearer(
    Extension(auth_state): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &auth_state, unix_now()) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(rejection) => {
            debug!("Rejected bearer token: {rejection:?}");
            ApiError::Unauthorized.into_response()
        }
    }
}

/// Resolve the `Authorization` header into an identity as of `now`.
pub(crate) fn authenticate(
    headers: &HeaderMap,
    auth_state: &AuthState,
    now: u64,
) -> Result<Identity, Rejection> {
    let token = extract_bearer_token(headers)?;
    let claims = auth_state
        .codec()
        .verify(token, now)
        .map_err(Rejection::Token)?;
    identity_from_claims(claims)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, Rejection> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(Rejection::MissingHeader)?
        .to_str()
        .map_err(|_| Rejection::MalformedHeader)?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or(Rejection::MalformedHeader)?;
    if token.is_empty() {
        return Err(Rejection::MalformedHeader);
    }
    Ok(token)
}

fn identity_from_claims(claims: Claims) -> Result<Identity, Rejection> {
    serde_json::from_value::<IdentityClaims>(serde_json::Value::Object(claims))
        .map(Identity::from)
        .map_err(Rejection::Claims)
}
