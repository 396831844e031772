//! Storage error classification shared by the SQL layers.

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLSTATE `23505`, with the violated constraint name when Postgres reports one.
    #[error("unique violation on {0:?}")]
    UniqueViolation(Option<String>),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    #[must_use]
    pub fn is_constraint(&self, name: &str) -> bool {
        matches!(self, Self::UniqueViolation(Some(constraint)) if constraint == name)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            let constraint = match &err {
                sqlx::Error::Database(db_err) => db_err.constraint().map(ToString::to_string),
                _ => None,
            };
            Self::UniqueViolation(constraint)
        } else {
            Self::Database(err)
        }
    }
}

/// Returns `true` when `err` is a database unique-violation (SQLSTATE `23505`).
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}
