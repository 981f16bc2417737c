// In crates/risk/src/lib.rs

use chrono::NaiveDate;
use core_types::{AlertAction, OrderRequest, Position, StockId};
use rust_decimal::Decimal;

pub mod error;
pub mod sizing;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use sizing::CashSizer;
pub use types::SizingSettings;

/// Turns a state transition into a sized order.
pub trait RiskManager {
    fn name(&self) -> &'static str;

    /// Returns `Ok(None)` when the transition cannot be acted upon, e.g. a buy
    /// when the cash does not cover a single share.
    fn evaluate(
        &self,
        action: AlertAction,
        stock_id: &StockId,
        cash: Decimal,
        close: Decimal,
        open_position: Option<&Position>,
        date: NaiveDate,
    ) -> Result<Option<OrderRequest>>;
}
