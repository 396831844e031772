//! Authenticated user lookups.

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    storage::{count_users, fetch_user, list_users},
    types::{UserFilter, UserResponse},
};
use crate::api::{
    error::ApiError,
    handlers::{
        auth::Identity,
        paging::{Page, PageQuery},
    },
};

#[utoipa::path(
    get,
    path = "/v1/users/me",
    responses(
        (status = 200, description = "The caller's user record.", body = UserResponse),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 404, description = "The token's user no longer exists."),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn me(identity: Identity, pool: Extension<PgPool>) -> impl IntoResponse {
    user_response(fetch_user(&pool, identity.id()).await)
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User record.", body = UserResponse),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 404, description = "User not found."),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn get_user(
    _identity: Identity,
    Path(id): Path<Uuid>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    user_response(fetch_user(&pool, id).await)
}

#[utoipa::path(
    get,
    path = "/v1/users",
    params(PageQuery, UserFilter),
    responses(
        (status = 200, description = "Page of users ordered by username.", body = Page<UserResponse>),
        (status = 401, description = "Missing or invalid bearer token."),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
/// Lists users, optionally narrowed to a name search and a room role.
pub async fn list(
    _identity: Identity,
    pool: Extension<PgPool>,
    Query(paging): Query<PageQuery>,
    Query(filter): Query<UserFilter>,
) -> impl IntoResponse {
    let result = async {
        let total = count_users(&pool, &filter).await?;
        let items = list_users(&pool, &filter, paging.offset(), paging.limit()).await?;
        Ok::<_, ApiError>(Page::new(&paging, total, items))
    }
    .await;

    match result {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => err.into_response(),
    }
}

fn user_response(
    result: Result<Option<UserResponse>, crate::api::store::StoreError>,
) -> axum::response::Response {
    match result {
        Ok(Some(user)) => (StatusCode::OK, Json(user)).into_response(),
        Ok(None) => ApiError::NotFound.into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}
