use axum::{
    Extension, Json, extract::rejection::JsonRejection, http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::{
    service,
    state::AuthState,
    storage::PgCredentialStore,
    token::unix_now,
    types::{LoginRequest, LoginResponse},
};

#[utoipa::path(
    post,
    path = "/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted; bearer token issued.", body = LoginResponse),
        (status = 400, description = "Body unreadable, or username or password missing.", body = String),
        (status = 401, description = "Invalid credentials."),
    ),
    tag = "auth"
)]
/// Exchange a username and password for a bearer token.
pub async fn login(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> impl IntoResponse {
    let result = async {
        let Json(request) = body?;
        let store = PgCredentialStore::new(pool.0);
        service::login(
            &store,
            &auth_state,
            request.username.trim(),
            &request.password,
            unix_now(),
        )
        .await
    }
    .await;

    match result {
        Ok(token) => (StatusCode::OK, Json(LoginResponse { token })).into_response(),
        Err(err) => err.into_response(),
    }
}
