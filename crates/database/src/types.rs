// In crates/database/src/types.rs

use std::str::FromStr;

use chrono::NaiveDate;
use core_types::{AlertAction, DailyAlert, PriceBar, StockId, TrainingParams};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::Error;

#[derive(Debug, FromRow)]
pub(crate) struct PriceBarRow {
    pub date: NaiveDate,
    pub close: String,
    pub volume: i64,
}

impl TryFrom<PriceBarRow> for PriceBar {
    type Error = Error;

    fn try_from(row: PriceBarRow) -> Result<Self, Self::Error> {
        let close = Decimal::from_str(&row.close).map_err(|e| {
            Error::InvalidRecord(format!("close '{}' on {}: {}", row.close, row.date, e))
        })?;
        let volume = u64::try_from(row.volume).map_err(|_| {
            Error::InvalidRecord(format!("negative volume {} on {}", row.volume, row.date))
        })?;
        Ok(PriceBar {
            date: row.date,
            close,
            volume,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct TrainingParamsRow {
    pub strategy_name: String,
    pub stock_id: String,
    pub ma_period_short: i64,
    pub ma_period_long: i64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_period: i64,
}

impl TryFrom<TrainingParamsRow> for TrainingParams {
    type Error = Error;

    fn try_from(row: TrainingParamsRow) -> Result<Self, Self::Error> {
        let to_u32 = |name: &str, value: i64| {
            u32::try_from(value).map_err(|_| {
                Error::InvalidRecord(format!(
                    "{} = {} for {}/{}",
                    name, value, row.strategy_name, row.stock_id
                ))
            })
        };
        Ok(TrainingParams {
            ma_period_short: to_u32("ma_period_short", row.ma_period_short)?,
            ma_period_long: to_u32("ma_period_long", row.ma_period_long)?,
            max_drawdown_period: to_u32("max_drawdown_period", row.max_drawdown_period)?,
            total_return: row.total_return,
            max_drawdown: row.max_drawdown,
            strategy_name: row.strategy_name,
            stock_id: StockId(row.stock_id),
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct DailyAlertRow {
    pub date: NaiveDate,
    pub stock_id: String,
    pub action: String,
}

impl TryFrom<DailyAlertRow> for DailyAlert {
    type Error = Error;

    fn try_from(row: DailyAlertRow) -> Result<Self, Self::Error> {
        let action = AlertAction::from_str(&row.action)
            .map_err(|e| Error::InvalidRecord(e.to_string()))?;
        Ok(DailyAlert {
            date: row.date,
            stock_id: StockId(row.stock_id),
            action,
        })
    }
}
