use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use tracing::{debug, error, info};

use super::{
    storage::{USERNAME_CONSTRAINT, fetch_user, insert_user, username_exists},
    types::{SignupRequest, UserResponse},
    validate::validate_signup,
};
use crate::api::{error::ApiError, handlers::auth::password::hash_password};

#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created and active, with no roles.", body = UserResponse),
        (status = 400, description = "Invalid input.", body = String),
        (status = 409, description = "Username is taken.", body = String),
    ),
    tag = "users"
)]
/// Registers a new active user without roles.
///
/// The username pre-check answers the common case; a concurrent signup that
/// slips past it is caught by the `users_username_key` constraint and reported
/// the same way.
pub async fn signup(
    pool: Extension<PgPool>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> impl IntoResponse {
    let result = match body {
        Ok(Json(request)) => register(&pool, &request).await,
        Err(rejection) => Err(rejection.into()),
    };
    match result {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn register(pool: &PgPool, request: &SignupRequest) -> Result<UserResponse, ApiError> {
    let user = validate_signup(request)?;

    if username_exists(pool, &user.username).await? {
        debug!("Signup rejected: username taken");
        return Err(ApiError::Conflict("Username is taken."));
    }

    let password_hash = hash_password(&user.password).map_err(|err| {
        error!("Failed to hash password: {err:#}");
        ApiError::internal(err)
    })?;

    let id = match insert_user(pool, &user, &password_hash).await {
        Ok(id) => id,
        Err(err) if err.is_constraint(USERNAME_CONSTRAINT) => {
            debug!("Signup rejected: username taken on insert");
            return Err(ApiError::Conflict("Username is taken."));
        }
        Err(err) => return Err(err.into()),
    };

    info!(user_id = %id, "User registered");
    fetch_user(pool, id).await?.ok_or(ApiError::NotFound)
}
