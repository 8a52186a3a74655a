use thiserror::Error;

/// What the persistence layer tells the layers above it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("edit conflict")]
    EditConflict,
    #[error("duplicate key violates unique constraint `{constraint}`")]
    DuplicateKey { constraint: String },
    #[error("storage call timed out")]
    Timeout,
    #[error("db error")]
    Db(#[source] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Classifies driver errors by their structured kind, never by message text.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e {
            if dbe.is_unique_violation() {
                return StoreError::DuplicateKey {
                    constraint: dbe.constraint().unwrap_or_default().to_string(),
                };
            }
        }
        StoreError::Db(e)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::from_sqlx(e)
    }
}
