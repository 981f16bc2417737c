// In crates/strategies/src/error.rs

use core_types::StrategyKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid {name} period: {value}")]
    InvalidPeriod { name: &'static str, value: u32 },

    #[error("Invalid window pair {short}/{long}: need 0 < short < long")]
    InvalidWindows { short: u32, long: u32 },

    #[error("Strategy '{0}' requires a (short, long) window pair")]
    MissingWindows(StrategyKind),
}

pub type Result<T> = std::result::Result<T, Error>;
