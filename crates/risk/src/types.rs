// In crates/risk/src/types.rs

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SizingSettings {
    /// Commission charged per transaction as a fraction of traded value (0.004 = 0.4%).
    pub commission: f64,
    /// Extra allowance on top of the commission so a fill at a slightly higher
    /// price does not exceed the available cash.
    pub size_buffer: f64,
    /// Fraction of the affordable size to buy on each buy signal.
    pub buy_prop: f64,
}

impl Default for SizingSettings {
    fn default() -> Self {
        Self {
            commission: 0.004,
            size_buffer: 0.001,
            buy_prop: 1.0,
        }
    }
}
