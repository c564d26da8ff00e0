use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Password hash error: {0}")]
    PasswordHash(String),
}

impl DbError {
    /// Map a unique-constraint violation to a conflict, anything else stays
    /// a plain sqlx error. The constraint is the conflict signal; there is no
    /// check-then-insert anywhere.
    pub fn or_conflict(err: sqlx::Error, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(message.to_string())
            }
            _ => Self::Sqlx(err),
        }
    }
}
