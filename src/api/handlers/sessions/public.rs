//! Read-only session endpoints. No bearer token required.

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    storage::{count_sessions, fetch_session, fetch_session_by_slug, list_sessions},
    types::{SessionFilter, SessionResponse},
};
use crate::api::{
    error::ApiError,
    handlers::paging::{Page, PageQuery},
};

#[utoipa::path(
    get,
    path = "/v1/sessions",
    params(PageQuery, SessionFilter),
    responses(
        (status = 200, description = "Page of sessions, newest first.", body = Page<SessionResponse>),
    ),
    tag = "sessions"
)]
/// Lists sessions that are not soft-deleted.
pub async fn list(
    pool: Extension<PgPool>,
    Query(paging): Query<PageQuery>,
    Query(filter): Query<SessionFilter>,
) -> impl IntoResponse {
    let result = async {
        let total = count_sessions(&pool, &filter).await?;
        let records = list_sessions(&pool, &filter, paging.offset(), paging.limit()).await?;
        let items = records.iter().map(|record| record.to_response()).collect();
        Ok::<_, ApiError>(Page::new(&paging, total, items))
    }
    .await;

    match result {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session detail.", body = SessionResponse),
        (status = 404, description = "Session not found or deleted."),
    ),
    tag = "sessions"
)]
pub async fn get(Path(id): Path<Uuid>, pool: Extension<PgPool>) -> impl IntoResponse {
    match fetch_session(&pool, id).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record.to_response())).into_response(),
        Ok(None) => ApiError::NotFound.into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/sessions/slug/{slug}",
    params(("slug" = String, Path, description = "Public session slug")),
    responses(
        (status = 200, description = "Session detail.", body = SessionResponse),
        (status = 404, description = "Session not found or deleted."),
    ),
    tag = "sessions"
)]
/// Resolves the public slug handed out to participants.
pub async fn get_by_slug(Path(slug): Path<String>, pool: Extension<PgPool>) -> impl IntoResponse {
    match fetch_session_by_slug(&pool, slug.trim()).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record.to_response())).into_response(),
        Ok(None) => ApiError::NotFound.into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}
