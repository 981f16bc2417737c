// In crates/risk/src/sizing.rs

use crate::types::SizingSettings;
use crate::{Error, Result, RiskManager};
use chrono::NaiveDate;
use core_types::{AlertAction, OrderRequest, Position, Side, StockId};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Sizes long entries by the cash available and flattens the whole position on exit.
#[derive(Debug, Clone)]
pub struct CashSizer {
    commission: Decimal,
    size_buffer: Decimal,
    buy_prop: Decimal,
}

impl CashSizer {
    pub fn new(settings: &SizingSettings) -> Result<Self> {
        let to_decimal = |name: &str, value: f64| {
            Decimal::from_f64(value)
                .filter(|d| !d.is_sign_negative())
                .ok_or_else(|| {
                    Error::InvalidParameters(format!(
                        "{name} must be a non-negative number, got {value}"
                    ))
                })
        };
        let commission = to_decimal("commission", settings.commission)?;
        let size_buffer = to_decimal("size_buffer", settings.size_buffer)?;
        let buy_prop = to_decimal("buy_prop", settings.buy_prop)?;
        if buy_prop.is_zero() || buy_prop > dec!(1) {
            return Err(Error::InvalidParameters(format!(
                "buy_prop must be in (0, 1], got {}",
                settings.buy_prop
            )));
        }

        Ok(Self {
            commission,
            size_buffer,
            buy_prop,
        })
    }

    /// Whole shares `cash` can buy at `price` once commission and buffer are paid.
    pub fn afforded_size(&self, cash: Decimal, price: Decimal) -> Decimal {
        if price <= Decimal::ZERO || cash <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (cash / (price * (dec!(1) + self.commission + self.size_buffer))).floor()
    }
}

impl RiskManager for CashSizer {
    fn name(&self) -> &'static str {
        "CashSizer"
    }

    fn evaluate(
        &self,
        action: AlertAction,
        stock_id: &StockId,
        cash: Decimal,
        close: Decimal,
        open_position: Option<&Position>,
        date: NaiveDate,
    ) -> Result<Option<OrderRequest>> {
        match action {
            AlertAction::Buy => {
                // Only buy if there is enough cash for at least one share.
                if cash < close {
                    return Ok(None);
                }
                let afforded = self.afforded_size(cash, close);
                let quantity = (afforded * self.buy_prop).floor().min(afforded);
                if quantity.is_zero() {
                    tracing::debug!(
                        stock = %stock_id,
                        %cash,
                        %close,
                        "Cash does not cover one share."
                    );
                    return Ok(None);
                }
                Ok(Some(OrderRequest {
                    stock_id: stock_id.clone(),
                    side: Side::Buy,
                    quantity,
                    created_on: date,
                }))
            }
            AlertAction::Sell => Ok(open_position
                .filter(|position| position.quantity > Decimal::ZERO)
                .map(|position| OrderRequest {
                    stock_id: stock_id.clone(),
                    side: Side::Sell,
                    quantity: position.quantity,
                    created_on: date,
                })),
        }
    }
}
