// In app/src/runner.rs

use anyhow::{Context, Result, bail};
use app_config::Settings;
use app_config::types::BrokerSettings;
use backtester::{AlertWindow, BacktestOutcome, Backtester};
use core_types::{DailyAlert, StockId, StrategyKind};
use database::Db;
use execution::simulated::SimulatedExecutor;
use num_traits::FromPrimitive;
use risk::CashSizer;
use rust_decimal::Decimal;
use strategies::{StrategyParams, create_strategy};

/// Wires a strategy to the configured sizer and fill simulator.
pub fn build_backtester(
    stock_id: &StockId,
    params: &StrategyParams,
    broker: &BrokerSettings,
) -> Result<Backtester> {
    let strategy = create_strategy(params)?;
    let risk_manager = CashSizer::new(&broker.sizing())?;
    let executor = SimulatedExecutor::new(&broker.simulation())?;
    let initial_cash = Decimal::from_f64(broker.initial_cash)
        .with_context(|| format!("initial cash {} is not representable", broker.initial_cash))?;

    Ok(Backtester::new(
        stock_id.clone(),
        strategy,
        Box::new(risk_manager),
        Box::new(executor),
        initial_cash,
    ))
}

/// Window-pair strategies read their trained windows from the store; the
/// others take their settings from configuration.
pub async fn resolve_params(
    db: &Db,
    settings: &Settings,
    kind: StrategyKind,
    stock_id: &StockId,
) -> Result<StrategyParams> {
    let windows = if kind.uses_window_pair() {
        let trained = db
            .get_training_params(kind.as_str(), stock_id)
            .await?
            .with_context(|| {
                format!("{stock_id} has no trained {kind} parameters; run `train` first")
            })?;
        Some(trained.windows())
    } else {
        None
    };
    Ok(StrategyParams::for_kind(kind, windows, &settings.strategies)?)
}

/// Runs `kind` over the stored history of `stock_id` and persists every
/// alert that falls inside `window`.
pub async fn run_stock(
    db: &Db,
    settings: &Settings,
    kind: StrategyKind,
    stock_id: &StockId,
    window: AlertWindow,
) -> Result<BacktestOutcome> {
    let params = resolve_params(db, settings, kind, stock_id).await?;
    let bars = db.get_price_bars(stock_id).await?;
    if bars.is_empty() {
        bail!("No price data stored for {stock_id}");
    }
    if let StrategyParams::MaTrend(w) | StrategyParams::Emac(w) | StrategyParams::Smac(w) = &params
        && !w.is_valid_for(bars.len())
    {
        tracing::warn!(
            stock = %stock_id,
            short = w.short,
            long = w.long,
            bars = bars.len(),
            "Trained windows exceed the stored history."
        );
    }

    let outcome = build_backtester(stock_id, &params, &settings.broker)?
        .with_alert_window(window)
        .run(&bars)
        .with_context(|| format!("Backtest of {kind} on {stock_id} failed"))?;

    save_alerts(db, &outcome.alerts).await?;
    Ok(outcome)
}

async fn save_alerts(db: &Db, alerts: &[DailyAlert]) -> Result<()> {
    for alert in alerts {
        db.insert_daily_alert(alert).await?;
    }
    Ok(())
}
