// In crates/execution/src/types.rs

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Commission charged on every fill as a fraction of the traded value.
    pub commission: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self { commission: 0.004 }
    }
}

use core_types::Position;
use rust_decimal::Decimal;

/// Cash and the (single, long-only) position of a simulated account.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub initial_cash: Decimal,
    pub cash: Decimal,
    pub position: Option<Position>,
}

impl Portfolio {
    /// Creates a new portfolio with an initial cash balance.
    pub fn new(initial_cash: Decimal) -> Self {
        Self {
            initial_cash,
            cash: initial_cash,
            position: None,
        }
    }

    /// Cash plus the position marked at `price`.
    pub fn value(&self, price: Decimal) -> Decimal {
        let holdings = self
            .position
            .as_ref()
            .map(|p| p.quantity * price)
            .unwrap_or(Decimal::ZERO);
        self.cash + holdings
    }
}
