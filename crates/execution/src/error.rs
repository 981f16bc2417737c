// In crates/execution/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Execution failed: {reason}")]
    ExecutionFailed { reason: String },

    #[error("Invalid simulation settings: {0}")]
    InvalidSettings(String),
}

pub type Result<T> = std::result::Result<T, Error>;
