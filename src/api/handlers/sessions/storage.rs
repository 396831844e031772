//! SQL storage for sessions and their room memberships.
//!
//! All reads exclude soft-deleted rows (`deleted_at IS NOT NULL`). Session
//! creation runs the owner-role lookup, the session insert and the owner room
//! insert in one transaction.

use sqlx::{PgPool, Row, postgres::PgRow};
use std::future::Future;
use tracing::Instrument;
use uuid::Uuid;

use super::types::{RoomResponse, SessionFilter, SessionResponse};
use crate::api::{handlers::auth::ROLE_OWNER, store::StoreError};

pub(super) const SLUG_CONSTRAINT: &str = "sessions_slug_key";

const SESSION_COLUMNS: &str = r#"
    id, owner, title, description, slug, password, is_active,
    to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
    to_char(updated_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at
"#;

/// Session row as stored. Holds the password digest, so it never leaves the
/// crate; use [`SessionRecord::to_response`] for API output.
#[derive(Clone, Debug)]
pub(crate) struct SessionRecord {
    pub(crate) id: Uuid,
    pub(crate) owner: Uuid,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
    pub(crate) password_hash: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl SessionRecord {
    pub(crate) fn to_response(&self) -> SessionResponse {
        SessionResponse {
            id: self.id,
            owner: self.owner,
            title: self.title.clone(),
            description: self.description.clone(),
            slug: self.slug.clone(),
            has_password: self.password_hash.is_some(),
            is_active: self.is_active,
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            owner: row.get("owner"),
            title: row.get("title"),
            description: row.get("description"),
            slug: row.get("slug"),
            password_hash: row.get("password"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

/// Fields for a session insert; the slug is supplied per attempt.
#[derive(Clone, Debug)]
pub(crate) struct NewSession {
    pub(crate) owner: Uuid,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) password_hash: Option<String>,
}

#[derive(Debug)]
pub(crate) struct SessionUpdate {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) password_hash: Option<String>,
    pub(crate) is_active: bool,
}

#[derive(Debug)]
pub(crate) enum CreateSessionError {
    /// Another session already holds the slug.
    SlugTaken,
    /// The `owner` role is not seeded.
    MissingOwnerRole,
    Store(StoreError),
}

impl From<sqlx::Error> for CreateSessionError {
    fn from(err: sqlx::Error) -> Self {
        match StoreError::from(err) {
            err if err.is_constraint(SLUG_CONSTRAINT) => Self::SlugTaken,
            err => Self::Store(err),
        }
    }
}

/// What the slug allocator needs from storage.
pub(crate) trait SessionStore: Send + Sync {
    fn slug_exists(&self, slug: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Insert the session and its owner room atomically.
    fn insert_with_owner(
        &self,
        session: &NewSession,
        slug: &str,
    ) -> impl Future<Output = Result<SessionRecord, CreateSessionError>> + Send;
}

#[derive(Clone, Debug)]
pub(crate) struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionStore for PgSessionStore {
    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        // Soft-deleted sessions still hold their slug.
        let query = "SELECT EXISTS (SELECT 1 FROM sessions WHERE slug = $1)";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let exists: bool = sqlx::query_scalar(query)
            .bind(slug)
            .fetch_one(&self.pool)
            .instrument(span)
            .await?;
        Ok(exists)
    }

    async fn insert_with_owner(
        &self,
        session: &NewSession,
        slug: &str,
    ) -> Result<SessionRecord, CreateSessionError> {
        let mut tx = self.pool.begin().await?;

        let owner_role: Option<Uuid> = sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
            .bind(ROLE_OWNER)
            .fetch_optional(&mut *tx)
            .await?;
        // Returning early drops `tx`, which rolls it back.
        let Some(owner_role) = owner_role else {
            return Err(CreateSessionError::MissingOwnerRole);
        };

        let insert = format!(
            r"
            INSERT INTO sessions (owner, title, description, slug, password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SESSION_COLUMNS}
            "
        );
        let row = sqlx::query(&insert)
            .bind(session.owner)
            .bind(&session.title)
            .bind(&session.description)
            .bind(slug)
            .bind(session.password_hash.as_deref())
            .fetch_one(&mut *tx)
            .await?;
        let record = SessionRecord::from_row(&row);

        sqlx::query(
            r"
            INSERT INTO rooms (session_id, user_id, role_id)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(record.id)
        .bind(record.owner)
        .bind(owner_role)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }
}

pub(super) async fn fetch_session(pool: &PgPool, id: Uuid) -> Result<Option<SessionRecord>, StoreError> {
    let query = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1 AND deleted_at IS NULL");
    let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;
    Ok(row.as_ref().map(SessionRecord::from_row))
}

pub(super) async fn fetch_session_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<SessionRecord>, StoreError> {
    let query =
        format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE slug = $1 AND deleted_at IS NULL");
    let row = sqlx::query(&query).bind(slug).fetch_optional(pool).await?;
    Ok(row.as_ref().map(SessionRecord::from_row))
}

pub(super) async fn count_sessions(pool: &PgPool, filter: &SessionFilter) -> Result<u64, StoreError> {
    let count: i64 = sqlx::query_scalar(
        r"
        SELECT COUNT(*)
        FROM sessions
        WHERE deleted_at IS NULL
          AND ($1::uuid IS NULL OR owner = $1)
          AND ($2::boolean IS NULL OR is_active = $2)
        ",
    )
    .bind(filter.owner)
    .bind(filter.active)
    .fetch_one(pool)
    .await?;
    Ok(u64::try_from(count).unwrap_or_default())
}

pub(super) async fn list_sessions(
    pool: &PgPool,
    filter: &SessionFilter,
    offset: i64,
    limit: i64,
) -> Result<Vec<SessionRecord>, StoreError> {
    let query = format!(
        r"
        SELECT {SESSION_COLUMNS}
        FROM sessions
        WHERE deleted_at IS NULL
          AND ($1::uuid IS NULL OR owner = $1)
          AND ($2::boolean IS NULL OR is_active = $2)
        ORDER BY created_at DESC, id
        OFFSET $3 LIMIT $4
        "
    );
    let rows = sqlx::query(&query)
        .bind(filter.owner)
        .bind(filter.active)
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(SessionRecord::from_row).collect())
}

/// Apply an update; the password is only replaced when a new digest is given.
/// The slug is never touched.
pub(super) async fn update_session(
    pool: &PgPool,
    id: Uuid,
    update: &SessionUpdate,
) -> Result<Option<SessionRecord>, StoreError> {
    let query = format!(
        r"
        UPDATE sessions
        SET title = $2,
            description = $3,
            password = COALESCE($4, password),
            is_active = $5,
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {SESSION_COLUMNS}
        "
    );
    let row = sqlx::query(&query)
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.password_hash.as_deref())
        .bind(update.is_active)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(SessionRecord::from_row))
}

pub(super) async fn soft_delete_session(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<SessionRecord>, StoreError> {
    let query = format!(
        r"
        UPDATE sessions
        SET deleted_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {SESSION_COLUMNS}
        "
    );
    let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;
    Ok(row.as_ref().map(SessionRecord::from_row))
}

pub(super) async fn fetch_rooms(pool: &PgPool, session_id: Uuid) -> Result<Vec<RoomResponse>, StoreError> {
    let rows = sqlx::query(
        r#"
        SELECT
            rm.session_id,
            rm.user_id,
            r.name AS role,
            to_char(rm.created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
        FROM rooms rm
        JOIN roles r ON r.id = rm.role_id
        WHERE rm.session_id = $1
        ORDER BY rm.created_at, rm.user_id
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| RoomResponse {
            session_id: row.get("session_id"),
            user_id: row.get("user_id"),
            role: row.get("role"),
            created_at: row.get("created_at"),
        })
        .collect())
}
