// In crates/execution/src/simulated.rs

use crate::types::{Portfolio, SimulationSettings};
use crate::{Error, Executor, Result};
use chrono::NaiveDate;
use core_types::{Execution, OrderRequest, Position, Side};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;

/// Fills market orders at the given price and charges a flat commission rate.
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    commission_rate: Decimal,
}

impl SimulatedExecutor {
    pub fn new(settings: &SimulationSettings) -> Result<Self> {
        let commission_rate = Decimal::from_f64(settings.commission)
            .filter(|rate| !rate.is_sign_negative())
            .ok_or_else(|| {
                Error::InvalidSettings(format!(
                    "commission {} is not a valid rate",
                    settings.commission
                ))
            })?;
        Ok(Self { commission_rate })
    }

    /// Opens a long position. Rejected when cash does not cover value plus commission.
    fn process_buy(
        &self,
        order: &OrderRequest,
        price: Decimal,
        date: NaiveDate,
        portfolio: &mut Portfolio,
    ) -> Result<(Execution, Option<Position>)> {
        if portfolio.position.is_some() {
            return Err(Error::ExecutionFailed {
                reason: format!("A position in {} is already open", order.stock_id),
            });
        }

        let value = order.quantity * price;
        let commission = value * self.commission_rate;
        if value + commission > portfolio.cash {
            tracing::debug!(
                stock = %order.stock_id,
                %price,
                quantity = %order.quantity,
                cash = %portfolio.cash,
                "Buy fill exceeds cash."
            );
            return Err(Error::ExecutionFailed {
                reason: format!(
                    "Insufficient cash: need {} but have {}",
                    (value + commission).round_dp(2),
                    portfolio.cash.round_dp(2)
                ),
            });
        }
        portfolio.cash -= value + commission;

        portfolio.position = Some(Position {
            stock_id: order.stock_id.clone(),
            quantity: order.quantity,
            entry_price: price,
            entry_date: date,
            entry_commission: commission,
        });

        let execution = Execution {
            stock_id: order.stock_id.clone(),
            side: Side::Buy,
            price,
            quantity: order.quantity,
            commission,
            date,
        };
        Ok((execution, None))
    }

    /// Closes the open position in full.
    fn process_sell(
        &self,
        order: &OrderRequest,
        price: Decimal,
        date: NaiveDate,
        portfolio: &mut Portfolio,
    ) -> Result<(Execution, Option<Position>)> {
        let open_position = portfolio.position.take().ok_or_else(|| Error::ExecutionFailed {
            reason: format!("No open position found for {}", order.stock_id),
        })?;

        let value = open_position.quantity * price;
        let commission = value * self.commission_rate;
        portfolio.cash += value - commission;

        let execution = Execution {
            stock_id: order.stock_id.clone(),
            side: Side::Sell,
            price,
            quantity: open_position.quantity,
            commission,
            date,
        };
        Ok((execution, Some(open_position)))
    }
}

impl Executor for SimulatedExecutor {
    fn name(&self) -> &'static str {
        "SimulatedExecutor"
    }

    fn execute(
        &mut self,
        order_request: &OrderRequest,
        price: Decimal,
        date: NaiveDate,
        portfolio: &mut Portfolio,
    ) -> Result<(Execution, Option<Position>)> {
        match order_request.side {
            Side::Buy => self.process_buy(order_request, price, date, portfolio),
            Side::Sell => self.process_sell(order_request, price, date, portfolio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::StockId;
    use rust_decimal_macros::dec;

    fn order(side: Side, quantity: Decimal) -> OrderRequest {
        OrderRequest {
            stock_id: StockId::from("BATBC"),
            side,
            quantity,
            created_on: day(1),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn round_trip_charges_commission_on_both_legs() {
        let mut executor =
            SimulatedExecutor::new(&SimulationSettings { commission: 0.01 }).unwrap();
        let mut portfolio = Portfolio::new(dec!(1000));

        let (buy, closed) = executor
            .execute(&order(Side::Buy, dec!(10)), dec!(50), day(2), &mut portfolio)
            .unwrap();
        assert!(closed.is_none());
        assert_eq!(buy.commission, dec!(5));
        assert_eq!(portfolio.cash, dec!(495));
        assert_eq!(portfolio.value(dec!(50)), dec!(995));

        let (sell, closed) = executor
            .execute(&order(Side::Sell, dec!(10)), dec!(60), day(3), &mut portfolio)
            .unwrap();
        assert_eq!(sell.commission, dec!(6));
        assert_eq!(closed.unwrap().entry_price, dec!(50));
        assert_eq!(portfolio.cash, dec!(1089));
        assert!(portfolio.position.is_none());
    }

    #[test]
    fn buy_beyond_cash_is_rejected_and_leaves_portfolio_untouched() {
        let mut executor = SimulatedExecutor::new(&SimulationSettings::default()).unwrap();
        let mut portfolio = Portfolio::new(dec!(100));
        let result =
            executor.execute(&order(Side::Buy, dec!(1)), dec!(100), day(2), &mut portfolio);
        assert!(matches!(result, Err(Error::ExecutionFailed { .. })));
        assert_eq!(portfolio.cash, dec!(100));
        assert!(portfolio.position.is_none());
    }

    #[test]
    fn sell_without_position_fails() {
        let mut executor = SimulatedExecutor::new(&SimulationSettings::default()).unwrap();
        let mut portfolio = Portfolio::new(dec!(100));
        let result =
            executor.execute(&order(Side::Sell, dec!(1)), dec!(10), day(2), &mut portfolio);
        assert!(result.is_err());
    }
}
