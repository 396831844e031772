use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::Instrument;
use uuid::Uuid;

use super::{
    types::{UserFilter, UserResponse},
    validate::NewUser,
};
use crate::api::store::StoreError;

pub(super) const USERNAME_CONSTRAINT: &str = "users_username_key";

const USER_SELECT: &str = r#"
    SELECT
        u.id,
        u.username,
        u.first_name,
        u.last_name,
        u.email,
        u.is_active,
        COALESCE(
            array_agg(r.name ORDER BY r.name) FILTER (WHERE r.name IS NOT NULL),
            '{}'
        ) AS roles,
        to_char(u.created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
        to_char(u.updated_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at
    FROM users u
    LEFT JOIN role_user ru ON ru.user_id = u.id
    LEFT JOIN roles r ON r.id = ru.role_id
"#;

// $1: ILIKE pattern over the full name, $2: room role name. NULL disables either.
const USER_FILTER: &str = r"
    ($1::text IS NULL OR (u.first_name || ' ' || u.last_name) ILIKE $1)
    AND ($2::text IS NULL OR EXISTS (
        SELECT 1
        FROM rooms rm
        JOIN roles rr ON rr.id = rm.role_id
        WHERE rm.user_id = u.id AND rr.name = $2
    ))
";

fn user_from_row(row: &PgRow) -> UserResponse {
    UserResponse {
        id: row.get("id"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        is_active: row.get("is_active"),
        roles: row.get("roles"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub(super) async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, StoreError> {
    let query = "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let exists: bool = sqlx::query_scalar(query)
        .bind(username)
        .fetch_one(pool)
        .instrument(span)
        .await?;
    Ok(exists)
}

/// Insert an active user with no roles. A duplicate username surfaces as
/// `StoreError::UniqueViolation` on `users_username_key`.
pub(super) async fn insert_user(
    pool: &PgPool,
    user: &NewUser,
    password_hash: &str,
) -> Result<Uuid, StoreError> {
    let query = r"
        INSERT INTO users (username, password, first_name, last_name, email, is_active)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let id: Uuid = sqlx::query_scalar(query)
        .bind(&user.username)
        .bind(password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .fetch_one(pool)
        .instrument(span)
        .await?;
    Ok(id)
}

pub(super) async fn fetch_user(pool: &PgPool, id: Uuid) -> Result<Option<UserResponse>, StoreError> {
    let query = format!("{USER_SELECT} WHERE u.id = $1 GROUP BY u.id");
    let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;
    Ok(row.as_ref().map(user_from_row))
}

pub(super) async fn count_users(pool: &PgPool, filter: &UserFilter) -> Result<u64, StoreError> {
    let query = format!("SELECT COUNT(*) FROM users u WHERE {USER_FILTER}");
    let count: i64 = sqlx::query_scalar(&query)
        .bind(filter.search_pattern())
        .bind(filter.role())
        .fetch_one(pool)
        .await?;
    Ok(u64::try_from(count).unwrap_or_default())
}

pub(super) async fn list_users(
    pool: &PgPool,
    filter: &UserFilter,
    offset: i64,
    limit: i64,
) -> Result<Vec<UserResponse>, StoreError> {
    let query = format!(
        "{USER_SELECT} WHERE {USER_FILTER} GROUP BY u.id ORDER BY u.username OFFSET $3 LIMIT $4"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = "list_users"
    );
    let rows = sqlx::query(&query)
        .bind(filter.search_pattern())
        .bind(filter.role())
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .instrument(span)
        .await?;
    Ok(rows.iter().map(user_from_row).collect())
}
