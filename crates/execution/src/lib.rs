// In crates/execution/src/lib.rs

use chrono::NaiveDate;
use core_types::{Execution, OrderRequest, Position};
use rust_decimal::Decimal;

pub mod error;
pub mod simulated;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use types::{Portfolio, SimulationSettings};

/// The interface for an order filler.
///
/// Returns the execution and, when the order closed a position, the position
/// as it was before closing.
pub trait Executor {
    fn name(&self) -> &'static str;

    fn execute(
        &mut self,
        order_request: &OrderRequest,
        price: Decimal,
        date: NaiveDate,
        portfolio: &mut Portfolio,
    ) -> Result<(Execution, Option<Position>)>;
}
