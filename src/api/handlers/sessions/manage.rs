//! Session mutations. Every route here sits behind the bearer middleware.
//!
//! Creation needs the `owner` or `admin` role. Update, delete and room listing
//! need the caller to own the session or hold `admin`; a missing session is
//! `404` before any ownership check.

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use super::{
    slug::{OsRngSlugs, SlugPolicy, allocate_unique_slug},
    storage::{
        NewSession, PgSessionStore, SessionRecord, SessionUpdate, fetch_rooms, fetch_session,
        soft_delete_session, update_session,
    },
    types::{CreateSessionRequest, RoomResponse, SessionResponse, UpdateSessionRequest},
};
use crate::api::{
    error::ApiError,
    handlers::auth::{AuthState, Identity, ROLE_ADMIN, ROLE_OWNER, password::hash_password},
};

#[utoipa::path(
    post,
    path = "/v1/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created; caller enrolled as owner.", body = SessionResponse),
        (status = 400, description = "Body unreadable, or title or description missing.", body = String),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 403, description = "Caller lacks the owner or admin role."),
        (status = 409, description = "No unique slug could be allocated.", body = String),
    ),
    security(("bearer" = [])),
    tag = "sessions"
)]
/// Creates a session with a freshly allocated slug and enrolls the caller in
/// its owner room, both in one transaction.
pub async fn create(
    identity: Identity,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> impl IntoResponse {
    match create_session(&identity, pool.0, &auth_state, body).await {
        Ok(record) => (StatusCode::CREATED, Json(record.to_response())).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn create_session(
    identity: &Identity,
    pool: PgPool,
    auth_state: &AuthState,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<SessionRecord, ApiError> {
    identity.require_role(&[ROLE_OWNER, ROLE_ADMIN])?;
    let Json(payload) = body?;

    let (title, description) = required_text(&payload.title, &payload.description)?;
    let session = NewSession {
        owner: identity.id(),
        title,
        description,
        password_hash: hash_optional_password(payload.password.as_deref())?,
    };

    let store = PgSessionStore::new(pool);
    let policy = SlugPolicy::from_config(auth_state.config());
    let record = allocate_unique_slug(&store, &OsRngSlugs, policy, &session).await?;

    info!(session_id = %record.id, owner = %record.owner, "Session created");
    Ok(record)
}

#[utoipa::path(
    put,
    path = "/v1/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = UpdateSessionRequest,
    responses(
        (status = 200, description = "Session updated.", body = SessionResponse),
        (status = 400, description = "Body unreadable, or title or description missing.", body = String),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 403, description = "Caller neither owns the session nor holds admin."),
        (status = 404, description = "Session not found or deleted."),
    ),
    security(("bearer" = [])),
    tag = "sessions"
)]
pub async fn update(
    identity: Identity,
    Path(id): Path<Uuid>,
    pool: Extension<PgPool>,
    body: Result<Json<UpdateSessionRequest>, JsonRejection>,
) -> impl IntoResponse {
    let result = async {
        authorize_owner(&identity, &pool, id).await?;
        let Json(payload) = body?;
        let (title, description) = required_text(&payload.title, &payload.description)?;
        let update = SessionUpdate {
            title,
            description,
            password_hash: hash_optional_password(payload.password.as_deref())?,
            is_active: payload.is_active != Some(false),
        };
        update_session(&pool, id, &update)
            .await?
            .ok_or(ApiError::NotFound)
    }
    .await;

    match result {
        Ok(record) => (StatusCode::OK, Json(record.to_response())).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session soft-deleted.", body = SessionResponse),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 403, description = "Caller neither owns the session nor holds admin."),
        (status = 404, description = "Session not found or already deleted."),
    ),
    security(("bearer" = [])),
    tag = "sessions"
)]
/// Soft-deletes a session. The row and its slug stay reserved.
pub async fn delete(
    identity: Identity,
    Path(id): Path<Uuid>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    let result = async {
        authorize_owner(&identity, &pool, id).await?;
        soft_delete_session(&pool, id)
            .await?
            .ok_or(ApiError::NotFound)
    }
    .await;

    match result {
        Ok(record) => {
            info!(session_id = %record.id, "Session deleted");
            (StatusCode::OK, Json(record.to_response())).into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/sessions/{id}/rooms",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Room memberships of the session.", body = [RoomResponse]),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 403, description = "Caller neither owns the session nor holds admin."),
        (status = 404, description = "Session not found or deleted."),
    ),
    security(("bearer" = [])),
    tag = "sessions"
)]
pub async fn rooms(
    identity: Identity,
    Path(id): Path<Uuid>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    let result = async {
        authorize_owner(&identity, &pool, id).await?;
        Ok::<_, ApiError>(fetch_rooms(&pool, id).await?)
    }
    .await;

    match result {
        Ok(rooms) => (StatusCode::OK, Json(rooms)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// `404` for a missing session, then `403` unless the caller owns it or is admin.
async fn authorize_owner(identity: &Identity, pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
    let record = fetch_session(pool, id).await?.ok_or(ApiError::NotFound)?;
    if may_manage(identity, &record) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

pub(super) fn may_manage(identity: &Identity, record: &SessionRecord) -> bool {
    record.owner == identity.id() || identity.has_role(&[ROLE_ADMIN])
}

fn required_text(title: &str, description: &str) -> Result<(String, String), ApiError> {
    let (title, description) = (title.trim(), description.trim());
    if title.is_empty() || description.is_empty() {
        return Err(ApiError::BadRequest("Title and description are required."));
    }
    Ok((title.to_string(), description.to_string()))
}

fn hash_optional_password(password: Option<&str>) -> Result<Option<String>, ApiError> {
    match password.map(str::trim).filter(|password| !password.is_empty()) {
        Some(password) => hash_password(password).map(Some).map_err(|err| {
            error!("Failed to hash session password: {err:#}");
            ApiError::internal(err)
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: Uuid, roles: &[&str]) -> Identity {
        Identity::new(id, "Alice Liddell", roles.iter().map(ToString::to_string).collect(), true)
    }

    fn record(owner: Uuid) -> SessionRecord {
        SessionRecord {
            id: Uuid::new_v4(),
            owner,
            title: "Ward 3".to_string(),
            description: "Night shift".to_string(),
            slug: "a1b2c3d4e5".to_string(),
            password_hash: None,
            is_active: true,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn owner_and_admin_may_manage() {
        let owner = Uuid::new_v4();
        let session = record(owner);
        assert!(may_manage(&identity(owner, &[]), &session));
        assert!(may_manage(&identity(Uuid::new_v4(), &[ROLE_ADMIN]), &session));
        assert!(!may_manage(&identity(Uuid::new_v4(), &[ROLE_OWNER]), &session));
        assert!(!may_manage(&identity(Uuid::new_v4(), &["nurse"]), &session));
    }

    #[test]
    fn title_and_description_are_required() {
        assert!(matches!(
            required_text("  ", "desc"),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            required_text("title", ""),
            Err(ApiError::BadRequest(_))
        ));
        assert_eq!(
            required_text(" Ward 3 ", " Night ").ok(),
            Some(("Ward 3".to_string(), "Night".to_string()))
        );
    }

    #[test]
    fn blank_password_is_not_hashed() {
        assert!(matches!(hash_optional_password(None), Ok(None)));
        assert!(matches!(hash_optional_password(Some("   ")), Ok(None)));
        let hashed = hash_optional_password(Some("join-me")).ok().flatten();
        assert!(hashed.is_some_and(|digest| digest.starts_with("$argon2id$")));
    }

    #[test]
    fn session_response_hides_password() {
        let mut session = record(Uuid::new_v4());
        session.password_hash = Some("$argon2id$...".to_string());
        let body = serde_json::to_value(session.to_response()).unwrap_or_default();
        assert_eq!(body["has_password"], serde_json::json!(true));
        assert!(body.get("password").is_none());
    }
}
