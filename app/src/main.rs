// In app/src/main.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use app_config::Settings;
use backtester::AlertWindow;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use core_types::{StockId, StrategyKind};
use database::Db;
use tracing_subscriber::prelude::*;

mod analyzer;
mod feed;
mod optimizer;
mod runner;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "Trains moving-average strategies on daily stock prices and emits buy/sell alerts."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Searches the best window pair for each stock and stores it.
    Train {
        /// One of ma_trend, emac_trend, smac_trend.
        #[arg(short = 'S', long, default_value = "ma_trend")]
        strategy: StrategyKind,

        /// Stocks to train. Defaults to the configured list, then every stored stock.
        stocks: Vec<String>,
    },

    /// Backtests one stock with its stored parameters and prints the report.
    Backtest {
        #[arg(short, long)]
        stock: String,

        #[arg(short = 'S', long, default_value = "ma_trend")]
        strategy: StrategyKind,
    },

    /// Emits buy/sell alerts for transitions on yesterday's bar.
    Alert {
        #[arg(short = 'S', long, default_value = "ma_trend")]
        strategy: StrategyKind,

        stocks: Vec<String>,
    },

    /// Imports a `date,close,volume` CSV file for one stock.
    Import {
        #[arg(short, long)]
        stock: String,

        #[arg(short, long)]
        file: PathBuf,
    },

    /// Shows stored training parameters.
    Params {
        #[arg(short = 'S', long, default_value = "ma_trend")]
        strategy: StrategyKind,

        #[arg(short, long)]
        stock: Option<String>,
    },

    /// Lists the alerts emitted on a date (default: today).
    Alerts {
        /// Date in YYYY-MM-DD format.
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = app_config::load_settings().context("Failed to load settings")?;

    let default_level = settings.app.log_level.parse().unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("sqlx", tracing::Level::WARN)
            .with_default(default_level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::info!(
        environment = %settings.app.environment,
        "Application settings loaded successfully."
    );

    let db = database::connect(&settings.database).await?;
    tracing::info!("Database connection established and migrations are up-to-date.");

    match cli.command {
        Commands::Train { strategy, stocks } => {
            handle_train(&db, &settings, strategy, stocks).await?
        }
        Commands::Backtest { stock, strategy } => {
            handle_backtest(&db, &settings, strategy, StockId(stock)).await?
        }
        Commands::Alert { strategy, stocks } => {
            handle_alert(&db, &settings, strategy, stocks).await?
        }
        Commands::Import { stock, file } => handle_import(&db, StockId(stock), &file).await?,
        Commands::Params { strategy, stock } => {
            handle_params(&db, strategy, stock.map(StockId)).await?
        }
        Commands::Alerts { date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            handle_alerts(&db, date).await?
        }
    }

    Ok(())
}

/// Explicit arguments win, then the configured list, then every stored stock.
async fn resolve_stocks(db: &Db, settings: &Settings, args: Vec<String>) -> Result<Vec<StockId>> {
    if !args.is_empty() {
        return Ok(args.into_iter().map(StockId).collect());
    }
    if !settings.stocks.is_empty() {
        return Ok(settings.stocks.iter().map(|s| StockId(s.clone())).collect());
    }
    Ok(db.list_stock_ids().await?)
}

/// Handles the logic for the `train` subcommand.
async fn handle_train(
    db: &Db,
    settings: &Settings,
    kind: StrategyKind,
    args: Vec<String>,
) -> Result<()> {
    if !kind.uses_window_pair() {
        anyhow::bail!("{kind} has no window parameters to train");
    }
    let start_time = Instant::now();
    let stocks = resolve_stocks(db, settings, args).await?;

    tracing::info!(cores = settings.app.optimizer_cores, "Configuring Rayon thread pool.");
    let pool = Arc::new(
        rayon::ThreadPoolBuilder::new()
            .num_threads(settings.app.optimizer_cores as usize)
            .build()
            .context("Failed to build Rayon thread pool")?,
    );

    let mut failures = 0;
    for stock_id in &stocks {
        match optimizer::train_stock(db, settings, &pool, kind, stock_id).await {
            Ok(outcome) => analyzer::print_optimization_report(&outcome),
            Err(e) => {
                failures += 1;
                tracing::error!(
                    stock = %stock_id,
                    strategy = %kind,
                    error = %e,
                    "Training failed."
                );
            }
        }
    }

    tracing::info!(
        stocks = stocks.len(),
        failures,
        duration = ?start_time.elapsed(),
        "Training run finished."
    );
    Ok(())
}

/// Handles the logic for the `backtest` subcommand.
async fn handle_backtest(
    db: &Db,
    settings: &Settings,
    kind: StrategyKind,
    stock_id: StockId,
) -> Result<()> {
    let window = AlertWindow::from_wall_clock();
    let outcome = runner::run_stock(db, settings, kind, &stock_id, window).await?;

    backtester::print_report(&stock_id, kind.as_str(), &outcome.report);
    for signal in &outcome.signals {
        println!("{}  {}", signal.date, signal.action);
    }
    println!("Final state: {:?}", outcome.final_state);
    Ok(())
}

/// Handles the logic for the `alert` subcommand.
async fn handle_alert(
    db: &Db,
    settings: &Settings,
    kind: StrategyKind,
    args: Vec<String>,
) -> Result<()> {
    let window = AlertWindow::from_wall_clock();
    let stocks = resolve_stocks(db, settings, args).await?;
    tracing::info!(
        today = %window.today(),
        strategy = %kind,
        stocks = stocks.len(),
        "Checking for alerts."
    );

    let mut emitted = 0;
    for stock_id in &stocks {
        match runner::run_stock(db, settings, kind, stock_id, window).await {
            Ok(outcome) => {
                for alert in &outcome.alerts {
                    println!("{}  {:<10} {}", alert.date, alert.stock_id, alert.action);
                }
                emitted += outcome.alerts.len();
            }
            Err(e) => tracing::error!(
                stock = %stock_id,
                strategy = %kind,
                error = format!("{e:#}").as_str(),
                "Alert run failed."
            ),
        }
    }

    tracing::info!(emitted, "Alert run finished.");
    Ok(())
}

/// Handles the logic for the `import` subcommand.
async fn handle_import(db: &Db, stock_id: StockId, file: &std::path::Path) -> Result<()> {
    let bars = feed::read_dcv(file)?;
    let inserted = db.insert_price_bars(&stock_id, &bars).await?;
    tracing::info!(stock = %stock_id, rows = bars.len(), inserted, "Price bars imported.");
    Ok(())
}

/// Handles the logic for the `params` subcommand.
async fn handle_params(db: &Db, kind: StrategyKind, stock: Option<StockId>) -> Result<()> {
    let records = match stock {
        Some(stock_id) => match db.get_training_params(kind.as_str(), &stock_id).await? {
            Some(params) => vec![params],
            None => {
                println!("{stock_id} has not been trained for {kind}.");
                return Ok(());
            }
        },
        None => db.list_training_params(kind.as_str()).await?,
    };

    println!(
        "{:<10} {:>6} {:>6} {:>10} {:>10} {:>8}",
        "stock", "short", "long", "return %", "max dd %", "dd bars"
    );
    for p in &records {
        println!(
            "{:<10} {:>6} {:>6} {:>10.2} {:>10.2} {:>8}",
            p.stock_id,
            p.ma_period_short,
            p.ma_period_long,
            p.total_return * 100.0,
            p.max_drawdown,
            p.max_drawdown_period
        );
    }
    Ok(())
}

/// Handles the logic for the `alerts` subcommand.
async fn handle_alerts(db: &Db, date: NaiveDate) -> Result<()> {
    let alerts = db.get_daily_alerts(date).await?;
    if alerts.is_empty() {
        println!("No alerts on {date}.");
    }
    for alert in &alerts {
        println!("{}  {:<10} {}", alert.date, alert.stock_id, alert.action);
    }
    Ok(())
}
