// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown strategy '{0}' (use ma_trend, rsi_trend, macd_trend, emac_trend, smac_trend)")]
    UnknownStrategy(String),

    #[error("Unknown alert action '{0}'")]
    UnknownAlertAction(String),
}

pub type Result<T> = std::result::Result<T, Error>;
