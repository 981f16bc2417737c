use crate::types::{EquityPoint, PerformanceReport, Trade};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Calculates performance metrics from a trade log and an equity curve.
#[derive(Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calculate(
        &self,
        initial_value: Decimal,
        trades: &[Trade],
        equity_curve: &[EquityPoint],
    ) -> PerformanceReport {
        let mut report = PerformanceReport::new();
        report.initial_value = initial_value;
        report.final_value = equity_curve.last().map(|p| p.value).unwrap_or(initial_value);
        report.bars = equity_curve.len() as u32;

        // 1. Total return over the whole run
        if initial_value > Decimal::ZERO {
            report.total_return = (report.final_value / initial_value - Decimal::ONE)
                .to_f64()
                .unwrap_or(0.0);
        }

        // 2. Max drawdown and the longest stretch below a peak
        let mut peak = initial_value;
        let mut drawdown_len = 0u32;
        for point in equity_curve {
            peak = peak.max(point.value);
            let drawdown = peak - point.value;
            if drawdown > Decimal::ZERO {
                drawdown_len += 1;
            } else {
                drawdown_len = 0;
            }
            report.max_drawdown_period = report.max_drawdown_period.max(drawdown_len);

            if drawdown > report.max_drawdown_money {
                report.max_drawdown_money = drawdown;
            }
            if peak > Decimal::ZERO {
                let pct = (drawdown / peak).to_f64().unwrap_or(0.0) * 100.0;
                report.max_drawdown = report.max_drawdown.max(pct);
            }
        }

        // 3. Closed trade statistics
        report.total_trades = trades.len() as u32;
        report.winning_trades = trades.iter().filter(|t| t.pnl_net > Decimal::ZERO).count() as u32;
        if report.total_trades > 0 {
            report.win_rate = report.winning_trades as f64 / report.total_trades as f64 * 100.0;
        }
        report.gross_pnl = trades.iter().map(|t| t.pnl).sum();
        report.net_pnl = trades.iter().map(|t| t.pnl_net).sum();
        report.total_commission = trades.iter().map(|t| t.commission).sum();

        report
    }
}
