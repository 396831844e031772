//! Shared fixtures for handler tests: a throwaway Postgres with the schema
//! applied, user seeding, and helpers for driving the router.

pub(crate) mod postgres;
pub(crate) mod runtime;

use anyhow::{Context, Result};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use secrecy::SecretString;
use serde_json::Value;
use sqlx::{Connection, PgConnection, PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use crate::api::handlers::auth::{
    AuthConfig, AuthState, IdentityClaims, password::hash_password, token::unix_now,
};
use postgres::PostgresContainer;

pub(crate) const TEST_SIGNING_KEY: &str = "roster-test-signing-key";

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

pub(crate) struct TestDb {
    _postgres: PostgresContainer,
    pub(crate) pool: PgPool,
}

impl TestDb {
    /// Start Postgres and apply the schema. Without a container runtime this
    /// returns an error so the caller can skip.
    pub(crate) async fn new() -> Result<Self> {
        if let Err(err) = runtime::ensure_container_runtime() {
            eprintln!("Skipping integration test: {err}");
            return Err(err);
        }

        let postgres = PostgresContainer::start().await?;
        postgres.wait_until_ready().await?;
        apply_schema(&postgres.dsn()).await?;

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&postgres.dsn())
            .await
            .context("failed to connect test pool")?;

        Ok(Self {
            _postgres: postgres,
            pool,
        })
    }
}

async fn apply_schema(dsn: &str) -> Result<()> {
    let mut connection = PgConnection::connect(dsn)
        .await
        .context("failed to connect for schema setup")?;

    for (index, statement) in split_sql_statements(SCHEMA_SQL).iter().enumerate() {
        sqlx::query(statement)
            .execute(&mut connection)
            .await
            .with_context(|| format!("failed to execute schema statement {}", index + 1))?;
    }

    Ok(())
}

/// Split on lines ending in `;`, dropping `--` comment lines.
pub(crate) fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

/// Insert a user named `Test {username}` with the given password and roles.
pub(crate) async fn insert_user(
    pool: &PgPool,
    username: &str,
    password: &str,
    roles: &[&str],
    active: bool,
) -> Result<Uuid> {
    let digest = hash_password(password)?;
    let user_id: Uuid = sqlx::query_scalar(
        r"
        INSERT INTO users (username, password, first_name, last_name, email, is_active)
        VALUES ($1, $2, 'Test', $1, $1 || '@roster.dev', $3)
        RETURNING id
        ",
    )
    .bind(username)
    .bind(digest)
    .bind(active)
    .fetch_one(pool)
    .await
    .context("insert user")?;

    for role in roles {
        sqlx::query(
            r"
            INSERT INTO role_user (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = $2
            ",
        )
        .bind(user_id)
        .bind(*role)
        .execute(pool)
        .await
        .context("grant role")?;
    }

    Ok(user_id)
}

pub(crate) fn auth_state() -> Arc<AuthState> {
    Arc::new(AuthState::new(AuthConfig::new(SecretString::from(
        TEST_SIGNING_KEY,
    ))))
}

/// Bearer token for an active identity with `roles`, valid from `now`.
pub(crate) fn bearer_for(auth_state: &AuthState, id: Uuid, roles: &[&str], now: u64) -> String {
    let claims = IdentityClaims {
        id,
        username: "Test User".to_string(),
        roles: roles.iter().map(ToString::to_string).collect(),
        status: true,
    };
    auth_state.codec().issue(&claims, now).unwrap_or_default()
}

pub(crate) fn bearer(auth_state: &AuthState, id: Uuid, roles: &[&str]) -> String {
    bearer_for(auth_state, id, roles, unix_now())
}

pub(crate) fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .unwrap_or_default()
}

pub(crate) fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap_or_default()
}

/// Send `request` and return the status with the body parsed as JSON
/// (`Value::Null` for empty or non-JSON bodies).
pub(crate) async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes).unwrap_or(Value::Null)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_splits_into_statements() {
        let statements = split_sql_statements(SCHEMA_SQL);
        assert!(statements.iter().all(|s| s.ends_with(';')));
        assert!(statements.iter().any(|s| s.contains("CREATE TABLE IF NOT EXISTS sessions")));
        assert!(statements.iter().any(|s| s.contains("sessions_slug_key")));
        assert!(statements.iter().any(|s| s.starts_with("INSERT INTO roles")));
    }

    #[test]
    fn split_keeps_trailing_statement() {
        let statements = split_sql_statements("SELECT 1;\n-- note\nSELECT 2");
        assert_eq!(statements, ["SELECT 1;", "SELECT 2"]);
    }
}
