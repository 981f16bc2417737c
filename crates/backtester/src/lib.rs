pub mod alerts;
pub mod logger;

use analytics::engine::AnalyticsEngine;
use analytics::types::{EquityPoint, PerformanceReport, Trade};
use anyhow::{Context, bail};
use core_types::{DailyAlert, OrderRequest, PositionState, PriceBar, Side, StockId};
use execution::{Executor, Portfolio};
use risk::RiskManager;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use strategies::Strategy;
use strategies::position::advance;

pub use alerts::AlertWindow;
pub use logger::{SignalEvent, TradeLogger};

/// Everything a finished backtest produced.
#[derive(Debug)]
pub struct BacktestOutcome {
    pub report: PerformanceReport,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub signals: Vec<SignalEvent>,
    pub alerts: Vec<DailyAlert>,
    pub final_state: PositionState,
}

/// Runs one strategy over the price history of one stock.
pub struct Backtester {
    /// The stock under test.
    pub stock_id: StockId,
    pub strategy: Strategy,
    pub risk_manager: Box<dyn RiskManager + Send + Sync>,
    /// The fill simulator.
    pub executor: Box<dyn Executor + Send>,
    alert_window: Option<AlertWindow>,
    logger: TradeLogger,
    portfolio: Portfolio,
}

impl Backtester {
    pub fn new(
        stock_id: StockId,
        strategy: Strategy,
        risk_manager: Box<dyn RiskManager + Send + Sync>,
        executor: Box<dyn Executor + Send>,
        initial_cash: Decimal,
    ) -> Self {
        Self {
            stock_id,
            strategy,
            risk_manager,
            executor,
            alert_window: None,
            logger: TradeLogger::new(),
            portfolio: Portfolio::new(initial_cash),
        }
    }

    /// Emits daily alerts for transitions that fall inside `window`.
    pub fn with_alert_window(mut self, window: AlertWindow) -> Self {
        self.alert_window = Some(window);
        self
    }

    /// Feeds every bar through the strategy. Orders created on a bar fill at
    /// the close of the following bar.
    pub fn run(mut self, bars: &[PriceBar]) -> anyhow::Result<BacktestOutcome> {
        if bars.is_empty() {
            bail!("No price bars to backtest for {}", self.stock_id);
        }
        if let Some(pair) = bars.windows(2).find(|w| w[0].date >= w[1].date) {
            bail!(
                "Price bars for {} are not in ascending date order ({} then {})",
                self.stock_id,
                pair[0].date,
                pair[1].date
            );
        }

        let last_index = bars.len() - 1;
        let mut state = PositionState::Flat;
        let mut pending: Option<OrderRequest> = None;
        let mut alerts = Vec::new();

        for (i, bar) in bars.iter().enumerate() {
            // --- 1. Fill the order created on the previous bar ---
            if let Some(order) = pending.take() {
                match self.executor.execute(&order, bar.close, bar.date, &mut self.portfolio) {
                    Ok((execution, Some(closed_pos))) => {
                        self.logger.record_trade(&closed_pos, &execution);
                        tracing::debug!(
                            stock = %self.stock_id,
                            date = %bar.date,
                            price = %execution.price,
                            "Sell executed."
                        );
                    }
                    Ok((execution, None)) => {
                        tracing::debug!(
                            stock = %self.stock_id,
                            date = %bar.date,
                            price = %execution.price,
                            quantity = %execution.quantity,
                            "Buy executed."
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            stock = %self.stock_id,
                            date = %bar.date,
                            error = %e,
                            "Order rejected."
                        );
                        if order.side == Side::Buy {
                            state = PositionState::Flat;
                        }
                    }
                }
            }

            // --- 2. Update indicators and mark the portfolio ---
            let close = bar.close.to_f64().with_context(|| {
                format!("Close price {} on {} is not representable", bar.close, bar.date)
            })?;
            let signals = self.strategy.next(close);
            self.logger.record_equity(bar.date, self.portfolio.value(bar.close));

            // The last bar has no next close to fill at.
            if i == last_index {
                continue;
            }

            // --- 3. Advance the state machine ---
            let transition = advance(state, signals);
            let Some(action) = transition.action else {
                continue;
            };

            // --- 4. Size the order ---
            let order = self.risk_manager.evaluate(
                action,
                &self.stock_id,
                self.portfolio.cash,
                bar.close,
                self.portfolio.position.as_ref(),
                bar.date,
            )?;
            let Some(order) = order else {
                continue;
            };

            state = transition.state;
            pending = Some(order);
            self.logger.record_signal(bar.date, action);

            if let Some(alert) = self
                .alert_window
                .and_then(|window| window.alert_for(&self.stock_id, bar.date, action))
            {
                tracing::info!(
                    stock = %self.stock_id,
                    date = %alert.date,
                    action = %alert.action,
                    "Market signal."
                );
                alerts.push(alert);
            }
        }

        let report = AnalyticsEngine::new().calculate(
            self.portfolio.initial_cash,
            &self.logger.trades,
            &self.logger.equity_curve,
        );
        tracing::debug!(
            stock = %self.stock_id,
            strategy = self.strategy.name(),
            total_return = report.total_return,
            trades = report.total_trades,
            "Backtest finished."
        );

        Ok(BacktestOutcome {
            report,
            trades: self.logger.trades,
            equity_curve: self.logger.equity_curve,
            signals: self.logger.signals,
            alerts,
            final_state: state,
        })
    }
}

/// Prints the performance report in a readable format.
pub fn print_report(stock_id: &StockId, strategy_name: &str, report: &PerformanceReport) {
    println!("\n--- Backtest Performance Report: {} ({}) ---", stock_id, strategy_name);
    println!("-----------------------------------");
    println!("Bars:                  {}", report.bars);
    println!("Start Value:           {:.2}", report.initial_value);
    println!("Final Value:           {:.2}", report.final_value);
    println!("Total Return:          {:.2}%", report.total_return * 100.0);
    println!(
        "Max Drawdown:          {:.2} ({:.2}%)",
        report.max_drawdown_money, report.max_drawdown
    );
    println!("Max Drawdown Period:   {} bars", report.max_drawdown_period);
    println!("-----------------------------------");
    println!("Total Trades:          {}", report.total_trades);
    println!("Win Rate:              {:.2}%", report.win_rate);
    println!("Gross P&L:             {:.2}", report.gross_pnl);
    println!("Net P&L:               {:.2}", report.net_pnl);
    println!("Commission:            {:.2}", report.total_commission);
    println!("-----------------------------------");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{AlertAction, WindowPair};
    use execution::SimulationSettings;
    use execution::simulated::SimulatedExecutor;
    use risk::{CashSizer, SizingSettings};
    use rust_decimal_macros::dec;
    use strategies::{StrategyParams, create_strategy};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn bars(closes: &[Decimal]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar {
                date: start() + chrono::Duration::days(i as i64),
                close: *close,
                volume: 1_000,
            })
            .collect()
    }

    fn backtester(windows: WindowPair, commission: f64, buffer: f64) -> Backtester {
        let strategy = create_strategy(&StrategyParams::MaTrend(windows)).unwrap();
        let sizer = CashSizer::new(&SizingSettings {
            commission,
            size_buffer: buffer,
            buy_prop: 1.0,
        })
        .unwrap();
        let executor = SimulatedExecutor::new(&SimulationSettings { commission }).unwrap();
        Backtester::new(
            StockId::from("GP"),
            strategy,
            Box::new(sizer),
            Box::new(executor),
            dec!(1000),
        )
    }

    fn rise_then_fall() -> Vec<PriceBar> {
        let mut closes: Vec<Decimal> = (0..15).map(|i| Decimal::from(100 + i)).collect();
        closes.extend((0..15).map(|i| Decimal::from(114 - i)));
        bars(&closes)
    }

    #[test]
    fn rise_then_fall_is_one_round_trip() {
        let outcome = backtester(WindowPair::new(2, 4), 0.004, 0.05)
            .run(&rise_then_fall())
            .unwrap();

        let actions: Vec<AlertAction> = outcome.signals.iter().map(|s| s.action).collect();
        assert_eq!(actions, vec![AlertAction::Buy, AlertAction::Sell]);
        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.final_state, PositionState::Flat);
        assert_eq!(outcome.equity_curve.len(), 30);
        assert!(outcome.report.total_return > 0.0);
        assert!(outcome.alerts.is_empty());

        // Entry signalled on the 4th bar (close 103) fills on the 5th (close 104).
        let trade = &outcome.trades[0];
        assert_eq!(trade.entry_date, start() + chrono::Duration::days(4));
        assert_eq!(trade.entry_price, dec!(104));
        assert_eq!(trade.exit_price, dec!(112));
    }

    #[test]
    fn final_bar_never_creates_an_order() {
        // The only buy condition appears on the last bar.
        let series = bars(&[dec!(10), dec!(9), dec!(8), dec!(7), dec!(12)]);
        let outcome = backtester(WindowPair::new(1, 2), 0.0, 0.0).run(&series).unwrap();
        assert!(outcome.signals.is_empty());
        assert!(outcome.trades.is_empty());
        assert_eq!(outcome.report.total_return, 0.0);
    }

    #[test]
    fn rejected_buy_reverts_to_flat_and_retries() {
        let series = bars(&[dec!(10), dec!(11), dec!(12), dec!(12), dec!(12)]);
        let outcome = backtester(WindowPair::new(1, 2), 0.0, 0.0).run(&series).unwrap();

        let actions: Vec<AlertAction> = outcome.signals.iter().map(|s| s.action).collect();
        // 90 shares at 12 exceed the cash, so the first buy is rejected.
        assert_eq!(actions, vec![AlertAction::Buy, AlertAction::Buy, AlertAction::Sell]);
        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.trades[0].quantity, dec!(83));
        assert_eq!(outcome.report.final_value, dec!(1000));
    }

    #[test]
    fn transition_on_yesterdays_bar_is_alerted() {
        let series = rise_then_fall();
        let sell_date = backtester(WindowPair::new(2, 4), 0.004, 0.05)
            .run(&series)
            .unwrap()
            .signals[1]
            .date;
        let today = sell_date.succ_opt().unwrap();

        let outcome = backtester(WindowPair::new(2, 4), 0.004, 0.05)
            .with_alert_window(AlertWindow::new(today))
            .run(&series)
            .unwrap();

        assert_eq!(
            outcome.alerts,
            vec![DailyAlert {
                date: today,
                stock_id: StockId::from("GP"),
                action: AlertAction::Sell,
            }]
        );
    }

    #[test]
    fn rejects_empty_and_unsorted_series() {
        assert!(backtester(WindowPair::new(1, 2), 0.0, 0.0).run(&[]).is_err());

        let mut series = bars(&[dec!(1), dec!(2), dec!(3)]);
        series.swap(0, 2);
        assert!(backtester(WindowPair::new(1, 2), 0.0, 0.0).run(&series).is_err());
    }
}
