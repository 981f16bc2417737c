// In crates/core-types/src/types.rs

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Identifier of a listed stock (e.g., "ACI", "GP").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockId(pub String);

impl fmt::Display for StockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StockId {
    fn from(value: &str) -> Self {
        StockId(value.to_string())
    }
}

/// One daily bar of the price feed. Only the fields the strategies read are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: Decimal,
    pub volume: u64,
}

/// The side of an order. There is no short selling, so a sell always reduces a long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Position state of a single stock as seen by the signal state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

/// The action recorded in a daily alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertAction {
    Buy,
    Sell,
}

impl AlertAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertAction::Buy => "buy",
            AlertAction::Sell => "sell",
        }
    }
}

impl fmt::Display for AlertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(AlertAction::Buy),
            "sell" => Ok(AlertAction::Sell),
            other => Err(Error::UnknownAlertAction(other.to_string())),
        }
    }
}

/// A buy/sell intent emitted for a stock on a given day. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAlert {
    pub date: NaiveDate,
    pub stock_id: StockId,
    pub action: AlertAction,
}

/// A (short, long) moving-average window pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowPair {
    pub short: u32,
    pub long: u32,
}

impl WindowPair {
    pub fn new(short: u32, long: u32) -> Self {
        Self { short, long }
    }

    /// A pair can only produce a crossover when both windows are positive,
    /// strictly ordered and fit inside the series.
    pub fn is_valid_for(&self, series_len: usize) -> bool {
        self.short > 0 && self.short < self.long && (self.long as usize) <= series_len
    }
}

/// The best parameters found for one stock by a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub strategy_name: String,
    pub stock_id: StockId,
    pub ma_period_short: u32,
    pub ma_period_long: u32,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_period: u32,
}

impl TrainingParams {
    pub fn windows(&self) -> WindowPair {
        WindowPair::new(self.ma_period_short, self.ma_period_long)
    }
}

/// The strategy variants known to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    MaTrend,
    Rsi,
    Macd,
    Emac,
    Smac,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::MaTrend,
        StrategyKind::Rsi,
        StrategyKind::Macd,
        StrategyKind::Emac,
        StrategyKind::Smac,
    ];

    /// The name under which the strategy's parameters are stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::MaTrend => "ma_trend",
            StrategyKind::Rsi => "rsi_trend",
            StrategyKind::Macd => "macd_trend",
            StrategyKind::Emac => "emac_trend",
            StrategyKind::Smac => "smac_trend",
        }
    }

    /// Whether the strategy is driven by a (short, long) window pair and can
    /// therefore be trained by the window search.
    pub fn uses_window_pair(&self) -> bool {
        matches!(self, StrategyKind::MaTrend | StrategyKind::Emac | StrategyKind::Smac)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownStrategy(s.to_string()))
    }
}

/// A sized order produced by the position sizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub stock_id: StockId,
    pub side: Side,
    /// Whole shares.
    pub quantity: Decimal,
    /// Date of the bar whose signal created the order.
    pub created_on: NaiveDate,
}

/// The result of a filled order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Execution {
    pub stock_id: StockId,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub commission: Decimal,
    pub date: NaiveDate,
}

/// An open long position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub stock_id: StockId,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub entry_date: NaiveDate,
    pub entry_commission: Decimal,
}
