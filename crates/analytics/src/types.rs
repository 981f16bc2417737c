// In crates/analytics/src/types.rs

use chrono::NaiveDate;
use core_types::StockId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A closed round trip, from entry fill to exit fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub stock_id: StockId,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub quantity: Decimal,
    /// Price difference times quantity.
    pub pnl: Decimal,
    /// `pnl` less the commission of both legs.
    pub pnl_net: Decimal,
    pub commission: Decimal,
}

/// Portfolio value at the close of one bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Performance of one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PerformanceReport {
    pub initial_value: Decimal,
    pub final_value: Decimal,
    /// `final_value / initial_value - 1`.
    pub total_return: f64,
    /// Largest peak-to-trough decline, in percent of the peak.
    pub max_drawdown: f64,
    pub max_drawdown_money: Decimal,
    /// Longest run of bars spent below a previous peak.
    pub max_drawdown_period: u32,
    pub bars: u32,

    pub total_trades: u32,
    pub winning_trades: u32,
    pub win_rate: f64,
    pub gross_pnl: Decimal,
    pub net_pnl: Decimal,
    pub total_commission: Decimal,
}

impl PerformanceReport {
    pub fn new() -> Self {
        Self::default()
    }
}
