// In app/src/optimizer.rs

use std::sync::Arc;

use analytics::types::PerformanceReport;
use app_config::Settings;
use app_config::types::TrainingSettings;
use core_types::{PriceBar, StockId, StrategyKind, TrainingParams, WindowPair};
use database::Db;
use rayon::ThreadPool;
use rayon::prelude::*;
use strategies::StrategyParams;
use thiserror::Error;

use crate::analyzer;
use crate::runner::build_backtester;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Strategy {0} has no window parameters to train")]
    NotTrainable(StrategyKind),
    #[error("No price data stored for {0}")]
    NoPriceData(StockId),
    #[error("{bars} bars of {stock_id} are too few to yield a window pair")]
    NoCandidates { stock_id: StockId, bars: usize },
    #[error("Backtest of windows ({short}, {long}) failed: {reason}")]
    Backtest { short: u32, long: u32, reason: String },
    #[error("Storage error: {0}")]
    Storage(#[from] database::Error),
    #[error("Search worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// One evaluated window pair.
#[derive(Debug, Clone)]
pub struct CandidateResult {
    pub windows: WindowPair,
    pub report: PerformanceReport,
}

/// What a completed training run stored, plus the leading candidates.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub params: TrainingParams,
    pub candidates: usize,
    pub leaders: Vec<CandidateResult>,
}

/// Enumerates window pairs for a history of `bars` bars.
///
/// `short` runs over `[1, floor(short_ratio * bars))` and `long` over
/// `[short + 1, floor(long_ratio * bars))` in steps of `long_window_step`.
pub fn generate_candidates(bars: usize, settings: &TrainingSettings) -> Vec<WindowPair> {
    let short_end = (bars as f64 * settings.short_window_ratio).floor() as u32;
    let long_end = (bars as f64 * settings.long_window_ratio).floor() as u32;
    let step = settings.long_window_step.max(1) as usize;

    (1..short_end)
        .flat_map(|short| {
            (short + 1..long_end)
                .step_by(step)
                .map(move |long| WindowPair::new(short, long))
        })
        .collect()
}

/// Backtests every candidate on `pool`. Results keep generation order.
pub fn run_search(
    stock_id: &StockId,
    kind: StrategyKind,
    bars: &[PriceBar],
    settings: &Settings,
    pool: &ThreadPool,
) -> Result<Vec<CandidateResult>, TrainingError> {
    if !kind.uses_window_pair() {
        return Err(TrainingError::NotTrainable(kind));
    }
    if bars.is_empty() {
        return Err(TrainingError::NoPriceData(stock_id.clone()));
    }
    let candidates = generate_candidates(bars.len(), &settings.training);
    if candidates.is_empty() {
        return Err(TrainingError::NoCandidates {
            stock_id: stock_id.clone(),
            bars: bars.len(),
        });
    }

    tracing::debug!(
        stock = %stock_id,
        strategy = %kind,
        candidates = candidates.len(),
        "Searching window pairs."
    );
    pool.install(|| {
        candidates
            .par_iter()
            .map(|windows| run_candidate(stock_id, kind, *windows, bars, settings))
            .collect()
    })
}

fn run_candidate(
    stock_id: &StockId,
    kind: StrategyKind,
    windows: WindowPair,
    bars: &[PriceBar],
    settings: &Settings,
) -> Result<CandidateResult, TrainingError> {
    let failed = |reason: String| TrainingError::Backtest {
        short: windows.short,
        long: windows.long,
        reason,
    };
    let params = StrategyParams::for_kind(kind, Some(windows), &settings.strategies)
        .map_err(|e| failed(e.to_string()))?;
    let outcome = build_backtester(stock_id, &params, &settings.broker)
        .and_then(|backtester| backtester.run(bars))
        .map_err(|e| failed(format!("{e:#}")))?;

    Ok(CandidateResult {
        windows,
        report: outcome.report,
    })
}

/// Trains `kind` on the stored history of `stock_id` and saves the best
/// window pair. Nothing is written unless the search succeeds.
pub async fn train_stock(
    db: &Db,
    settings: &Settings,
    pool: &Arc<ThreadPool>,
    kind: StrategyKind,
    stock_id: &StockId,
) -> Result<TrainingOutcome, TrainingError> {
    if !kind.uses_window_pair() {
        return Err(TrainingError::NotTrainable(kind));
    }
    let bars = db.get_price_bars(stock_id).await?;

    let results = {
        let stock_id = stock_id.clone();
        let settings = settings.clone();
        let pool = Arc::clone(pool);
        tokio::task::spawn_blocking(move || run_search(&stock_id, kind, &bars, &settings, &pool))
            .await??
    };

    let candidates = results.len();
    let ranked = analyzer::rank_candidates(results);
    let Some(best) = ranked.first() else {
        return Err(TrainingError::NoCandidates {
            stock_id: stock_id.clone(),
            bars: 0,
        });
    };

    let params = TrainingParams {
        strategy_name: kind.as_str().to_string(),
        stock_id: stock_id.clone(),
        ma_period_short: best.windows.short,
        ma_period_long: best.windows.long,
        total_return: best.report.total_return,
        max_drawdown: best.report.max_drawdown,
        max_drawdown_period: best.report.max_drawdown_period,
    };
    db.save_training_params(&params).await?;
    tracing::info!(
        stock = %stock_id,
        strategy = %kind,
        short = params.ma_period_short,
        long = params.ma_period_long,
        total_return = params.total_return,
        "Training parameters saved."
    );

    Ok(TrainingOutcome {
        params,
        candidates,
        leaders: ranked.into_iter().take(settings.training.report_top).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::tests::{day, rise_then_fall, test_settings};
    use rust_decimal::Decimal;

    fn pool() -> Arc<ThreadPool> {
        Arc::new(rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap())
    }

    #[test]
    fn hundred_bars_yield_twenty_nine_candidates() {
        let candidates = generate_candidates(100, &TrainingSettings::default());
        assert_eq!(candidates.len(), 29);

        let mut shorts: Vec<u32> = candidates.iter().map(|w| w.short).collect();
        shorts.dedup();
        assert_eq!(shorts, (1..=9).collect::<Vec<_>>());
        assert_eq!(
            candidates.iter().filter(|w| w.short == 1).map(|w| w.long).collect::<Vec<_>>(),
            vec![2, 7, 12, 17]
        );
        assert_eq!(candidates.last(), Some(&WindowPair::new(9, 15)));
    }

    #[test]
    fn every_history_of_twenty_bars_or_more_has_valid_candidates() {
        let settings = TrainingSettings::default();
        for n in 20..=500 {
            let candidates = generate_candidates(n, &settings);
            assert!(!candidates.is_empty(), "no candidates for {n} bars");
            assert!(candidates.iter().all(|w| w.short < w.long && w.is_valid_for(n)));
        }
        assert!(generate_candidates(19, &settings).is_empty());
        assert!(generate_candidates(0, &settings).is_empty());
    }

    #[tokio::test]
    async fn missing_history_is_a_data_error_and_writes_nothing() {
        let db = database::connect_in_memory().await.unwrap();
        let gp = StockId::from("GP");

        let result = train_stock(&db, &test_settings(), &pool(), StrategyKind::MaTrend, &gp).await;
        assert!(matches!(result, Err(TrainingError::NoPriceData(_))));
        assert!(db.get_training_params("ma_trend", &gp).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn short_history_exhausts_the_search() {
        let db = database::connect_in_memory().await.unwrap();
        let gp = StockId::from("GP");
        db.insert_price_bars(&gp, &rise_then_fall(5)).await.unwrap();

        let result = train_stock(&db, &test_settings(), &pool(), StrategyKind::Smac, &gp).await;
        assert!(matches!(result, Err(TrainingError::NoCandidates { bars: 10, .. })));
        assert!(db.get_training_params("smac_trend", &gp).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn indicator_strategies_are_not_trainable() {
        let db = database::connect_in_memory().await.unwrap();
        let gp = StockId::from("GP");
        let result = train_stock(&db, &test_settings(), &pool(), StrategyKind::Rsi, &gp).await;
        assert!(matches!(result, Err(TrainingError::NotTrainable(StrategyKind::Rsi))));
    }

    #[tokio::test]
    async fn flat_history_keeps_the_first_candidate() {
        let db = database::connect_in_memory().await.unwrap();
        let gp = StockId::from("GP");
        let flat: Vec<PriceBar> = (0..40)
            .map(|i| PriceBar {
                date: day(i),
                close: Decimal::from(50),
                volume: 1_000,
            })
            .collect();
        db.insert_price_bars(&gp, &flat).await.unwrap();

        let outcome = train_stock(&db, &test_settings(), &pool(), StrategyKind::MaTrend, &gp)
            .await
            .unwrap();
        assert_eq!(outcome.params.windows(), WindowPair::new(1, 2));
        assert_eq!(outcome.params.total_return, 0.0);
        // (1, 2), (1, 7), (2, 3) and (3, 4).
        assert_eq!(outcome.candidates, 4);
        assert_eq!(outcome.leaders.len(), 4);

        let stored = db.get_training_params("ma_trend", &gp).await.unwrap();
        assert_eq!(stored, Some(outcome.params));
    }

    #[tokio::test]
    async fn trending_history_trains_a_profitable_pair() {
        let db = database::connect_in_memory().await.unwrap();
        let gp = StockId::from("GP");
        db.insert_price_bars(&gp, &rise_then_fall(50)).await.unwrap();
        let mut settings = test_settings();
        settings.broker.size_buffer = 0.05;

        let outcome = train_stock(&db, &settings, &pool(), StrategyKind::MaTrend, &gp)
            .await
            .unwrap();
        assert_eq!(outcome.candidates, generate_candidates(100, &settings.training).len());
        assert!(outcome.params.total_return > 0.0);
        assert!(outcome.params.ma_period_short < outcome.params.ma_period_long);
        assert!(
            outcome
                .leaders
                .windows(2)
                .all(|w| w[0].report.total_return >= w[1].report.total_return)
        );
    }
}
