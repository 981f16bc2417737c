// In crates/backtester/src/logger.rs

use analytics::types::{EquityPoint, Trade};
use chrono::NaiveDate;
use core_types::{AlertAction, Execution, Position};
use rust_decimal::Decimal;

/// A state transition taken on a given bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalEvent {
    pub date: NaiveDate,
    pub action: AlertAction,
}

/// Records trades, equity and transitions during a backtest.
#[derive(Debug, Default)]
pub struct TradeLogger {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub signals: Vec<SignalEvent>,
}

impl TradeLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_equity(&mut self, date: NaiveDate, value: Decimal) {
        self.equity_curve.push(EquityPoint { date, value });
    }

    pub fn record_signal(&mut self, date: NaiveDate, action: AlertAction) {
        self.signals.push(SignalEvent { date, action });
    }

    /// Records a completed trade from the entry position and the closing execution.
    pub fn record_trade(&mut self, open_pos: &Position, close_exec: &Execution) {
        let pnl = (close_exec.price - open_pos.entry_price) * open_pos.quantity;
        let commission = open_pos.entry_commission + close_exec.commission;

        self.trades.push(Trade {
            stock_id: open_pos.stock_id.clone(),
            entry_date: open_pos.entry_date,
            exit_date: close_exec.date,
            entry_price: open_pos.entry_price,
            exit_price: close_exec.price,
            quantity: open_pos.quantity,
            pnl,
            pnl_net: pnl - commission,
            commission,
        });
    }
}
