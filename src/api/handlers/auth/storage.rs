//! Credential lookups backing login.

use sqlx::{PgPool, Row};
use std::future::Future;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::store::StoreError;

/// Minimal user fields needed to check a password and build claims.
#[derive(Clone, Debug)]
pub struct CredentialRecord {
    pub user_id: Uuid,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
}

impl CredentialRecord {
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

pub trait CredentialStore: Send + Sync {
    /// Active user by exact username, or `None`.
    fn find_active_user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<CredentialRecord>, StoreError>> + Send;

    /// Role names granted to `user_id`, unordered.
    fn role_names(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;
}

#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CredentialStore for PgCredentialStore {
    async fn find_active_user(&self, username: &str) -> Result<Option<CredentialRecord>, StoreError> {
        let query = r"
            SELECT id, password, first_name, last_name, is_active
            FROM users
            WHERE username = $1 AND is_active = TRUE
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.map(|row| CredentialRecord {
            user_id: row.get("id"),
            password_hash: row.get("password"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            is_active: row.get("is_active"),
        }))
    }

    async fn role_names(&self, user_id: Uuid) -> Result<Vec<String>, StoreError> {
        let query = r"
            SELECT r.name
            FROM roles r
            JOIN role_user ru ON ru.role_id = r.id
            WHERE ru.user_id = $1
            ORDER BY r.name
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;

        Ok(rows.into_iter().map(|row| row.get("name")).collect())
    }
}
