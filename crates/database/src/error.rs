// In crates/database/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to connect to the database")]
    ConnectionError(#[from] sqlx::Error),
    #[error("Database migration failed: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("Database operation failed: {0}")]
    OperationFailed(sqlx::Error),
    #[error("Stored record is invalid: {0}")]
    InvalidRecord(String),
}

pub type Result<T> = std::result::Result<T, Error>;
