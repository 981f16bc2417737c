// In crates/database/src/lib.rs

use std::str::FromStr;

use app_config::types::DatabaseSettings;
use chrono::{NaiveDate, Utc};
use core_types::{DailyAlert, PriceBar, StockId, TrainingParams};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub mod error;
mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
use types::{DailyAlertRow, PriceBarRow, TrainingParamsRow};

/// A wrapper around the `sqlx` connection pool.
#[derive(Debug, Clone)]
pub struct Db(SqlitePool);

/// Opens (creating if needed) the SQLite database and runs migrations.
pub async fn connect(settings: &DatabaseSettings) -> Result<Db> {
    let options = SqliteConnectOptions::from_str(&settings.url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections.max(1))
        .connect_with(options)
        .await?;

    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::debug!(url = %settings.url, "Database ready.");

    Ok(Db(pool))
}

/// A private in-memory database. Each SQLite memory connection is its own
/// database, so the pool holds exactly one connection and never recycles it.
pub async fn connect_in_memory() -> Result<Db> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("../../migrations").run(&pool).await?;

    Ok(Db(pool))
}

impl Db {
    // --- Training parameters ---

    /// Stores the best parameters for `(strategy_name, stock_id)`, replacing
    /// any earlier record for the same key.
    pub async fn save_training_params(&self, params: &TrainingParams) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO training_params (
                strategy_name, stock_id, ma_period_short, ma_period_long,
                total_return, max_drawdown, max_drawdown_period, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (strategy_name, stock_id) DO UPDATE SET
                ma_period_short = excluded.ma_period_short,
                ma_period_long = excluded.ma_period_long,
                total_return = excluded.total_return,
                max_drawdown = excluded.max_drawdown,
                max_drawdown_period = excluded.max_drawdown_period,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&params.strategy_name)
        .bind(&params.stock_id.0)
        .bind(i64::from(params.ma_period_short))
        .bind(i64::from(params.ma_period_long))
        .bind(params.total_return)
        .bind(params.max_drawdown)
        .bind(i64::from(params.max_drawdown_period))
        .bind(Utc::now())
        .execute(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        Ok(())
    }

    /// Returns `None` when the pair was never trained.
    pub async fn get_training_params(
        &self,
        strategy_name: &str,
        stock_id: &StockId,
    ) -> Result<Option<TrainingParams>> {
        let row = sqlx::query_as::<_, TrainingParamsRow>(
            r#"
            SELECT strategy_name, stock_id, ma_period_short, ma_period_long,
                   total_return, max_drawdown, max_drawdown_period
            FROM training_params
            WHERE strategy_name = ? AND stock_id = ?
            "#,
        )
        .bind(strategy_name)
        .bind(&stock_id.0)
        .fetch_optional(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        row.map(TrainingParams::try_from).transpose()
    }

    pub async fn list_training_params(&self, strategy_name: &str) -> Result<Vec<TrainingParams>> {
        let rows = sqlx::query_as::<_, TrainingParamsRow>(
            r#"
            SELECT strategy_name, stock_id, ma_period_short, ma_period_long,
                   total_return, max_drawdown, max_drawdown_period
            FROM training_params
            WHERE strategy_name = ?
            ORDER BY stock_id
            "#,
        )
        .bind(strategy_name)
        .fetch_all(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        rows.into_iter().map(TrainingParams::try_from).collect()
    }

    // --- Price history ---

    /// Inserts bars for `stock_id`, skipping dates already stored.
    /// Returns the number of new rows.
    pub async fn insert_price_bars(&self, stock_id: &StockId, bars: &[PriceBar]) -> Result<u64> {
        let mut tx = self.0.begin().await.map_err(Error::OperationFailed)?;
        let mut inserted = 0;

        for bar in bars {
            let volume = i64::try_from(bar.volume).map_err(|_| {
                Error::InvalidRecord(format!("volume {} on {} is too large", bar.volume, bar.date))
            })?;
            let result = sqlx::query(
                r#"
                INSERT INTO price_bars (stock_id, date, close, volume)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (stock_id, date) DO NOTHING
                "#,
            )
            .bind(&stock_id.0)
            .bind(bar.date)
            .bind(bar.close.to_string())
            .bind(volume)
            .execute(&mut *tx)
            .await
            .map_err(Error::OperationFailed)?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(Error::OperationFailed)?;

        Ok(inserted)
    }

    /// The full history of `stock_id`, oldest first.
    pub async fn get_price_bars(&self, stock_id: &StockId) -> Result<Vec<PriceBar>> {
        let rows = sqlx::query_as::<_, PriceBarRow>(
            r#"
            SELECT date, close, volume
            FROM price_bars
            WHERE stock_id = ?
            ORDER BY date ASC
            "#,
        )
        .bind(&stock_id.0)
        .fetch_all(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        rows.into_iter().map(PriceBar::try_from).collect()
    }

    pub async fn list_stock_ids(&self) -> Result<Vec<StockId>> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT stock_id FROM price_bars ORDER BY stock_id")
                .fetch_all(&self.0)
                .await
                .map_err(Error::OperationFailed)?;

        Ok(ids.into_iter().map(StockId).collect())
    }

    // --- Daily alerts ---

    pub async fn insert_daily_alert(&self, alert: &DailyAlert) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_alerts (date, stock_id, action, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(alert.date)
        .bind(&alert.stock_id.0)
        .bind(alert.action.as_str())
        .bind(Utc::now())
        .execute(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        Ok(())
    }

    /// Alerts emitted on `date`, in insertion order.
    pub async fn get_daily_alerts(&self, date: NaiveDate) -> Result<Vec<DailyAlert>> {
        let rows = sqlx::query_as::<_, DailyAlertRow>(
            r#"
            SELECT date, stock_id, action
            FROM daily_alerts
            WHERE date = ?
            ORDER BY id
            "#,
        )
        .bind(date)
        .fetch_all(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        rows.into_iter().map(DailyAlert::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::AlertAction;
    use rust_decimal_macros::dec;

    fn params(short: u32, long: u32, total_return: f64) -> TrainingParams {
        TrainingParams {
            strategy_name: "ma_trend".to_string(),
            stock_id: StockId::from("GP"),
            ma_period_short: short,
            ma_period_long: long,
            total_return,
            max_drawdown: 12.5,
            max_drawdown_period: 17,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[tokio::test]
    async fn saved_params_read_back_unchanged() {
        let db = connect_in_memory().await.unwrap();
        let saved = params(7, 32, 0.1834);
        db.save_training_params(&saved).await.unwrap();

        let loaded = db
            .get_training_params("ma_trend", &StockId::from("GP"))
            .await
            .unwrap();
        assert_eq!(loaded, Some(saved));
    }

    #[tokio::test]
    async fn untrained_pair_is_none() {
        let db = connect_in_memory().await.unwrap();
        db.save_training_params(&params(2, 10, 0.05)).await.unwrap();

        let other_stock = db
            .get_training_params("ma_trend", &StockId::from("ACI"))
            .await
            .unwrap();
        let other_strategy = db
            .get_training_params("smac_trend", &StockId::from("GP"))
            .await
            .unwrap();
        assert!(other_stock.is_none());
        assert!(other_strategy.is_none());
    }

    #[tokio::test]
    async fn retraining_replaces_the_record() {
        let db = connect_in_memory().await.unwrap();
        db.save_training_params(&params(2, 10, 0.05)).await.unwrap();
        db.save_training_params(&params(4, 19, 0.21)).await.unwrap();

        let all = db.list_training_params("ma_trend").await.unwrap();
        assert_eq!(all, vec![params(4, 19, 0.21)]);
    }

    #[tokio::test]
    async fn price_bars_are_deduplicated_and_ordered() {
        let db = connect_in_memory().await.unwrap();
        let gp = StockId::from("GP");
        let bar = |d: u32, close| PriceBar {
            date: day(d),
            close,
            volume: 100 * u64::from(d),
        };

        let first = db
            .insert_price_bars(&gp, &[bar(3, dec!(301.4)), bar(1, dec!(299.9))])
            .await
            .unwrap();
        let second = db
            .insert_price_bars(&gp, &[bar(1, dec!(1)), bar(2, dec!(300.25))])
            .await
            .unwrap();
        assert_eq!((first, second), (2, 1));

        let stored = db.get_price_bars(&gp).await.unwrap();
        assert_eq!(stored, vec![bar(1, dec!(299.9)), bar(2, dec!(300.25)), bar(3, dec!(301.4))]);
        assert_eq!(db.list_stock_ids().await.unwrap(), vec![gp]);
    }

    #[tokio::test]
    async fn alerts_are_filtered_by_date() {
        let db = connect_in_memory().await.unwrap();
        let alert = |d: u32, stock: &str, action| DailyAlert {
            date: day(d),
            stock_id: StockId::from(stock),
            action,
        };
        db.insert_daily_alert(&alert(6, "GP", AlertAction::Buy)).await.unwrap();
        db.insert_daily_alert(&alert(7, "ACI", AlertAction::Sell)).await.unwrap();
        db.insert_daily_alert(&alert(6, "BATBC", AlertAction::Sell)).await.unwrap();

        let alerts = db.get_daily_alerts(day(6)).await.unwrap();
        assert_eq!(
            alerts,
            vec![alert(6, "GP", AlertAction::Buy), alert(6, "BATBC", AlertAction::Sell)]
        );
        assert!(db.get_daily_alerts(day(8)).await.unwrap().is_empty());
    }
}
