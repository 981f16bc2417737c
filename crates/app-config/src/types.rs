// In crates/app-config/src/types.rs

use execution::types::SimulationSettings;
use risk::types::SizingSettings;
use serde::Deserialize;
use strategies::types::StrategySettings;

use crate::{Error, Result};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Settings for the database connection.
    pub database: DatabaseSettings,
    #[serde(default)]
    pub broker: BrokerSettings,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub strategies: StrategySettings,
    /// Stocks processed when a batch command is given no explicit list.
    #[serde(default)]
    pub stocks: Vec<String>,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.broker.initial_cash <= 0.0 {
            return Err(Error::Invalid(format!(
                "broker.initial_cash must be positive, got {}",
                self.broker.initial_cash
            )));
        }
        let t = &self.training;
        if !(t.short_window_ratio > 0.0 && t.short_window_ratio < t.long_window_ratio) {
            return Err(Error::Invalid(format!(
                "training ratios must satisfy 0 < short ({}) < long ({})",
                t.short_window_ratio, t.long_window_ratio
            )));
        }
        if t.long_window_step == 0 {
            return Err(Error::Invalid("training.long_window_step must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,

    pub optimizer_cores: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseSettings {
    /// SQLite connection URL, e.g. `sqlite://data/stocks.db`.
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// Simulated broker parameters shared by the sizer and the fill simulator.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BrokerSettings {
    pub initial_cash: f64,
    pub commission: f64,
    pub size_buffer: f64,
    pub buy_prop: f64,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            initial_cash: 100_000.0,
            commission: 0.004,
            size_buffer: 0.001,
            buy_prop: 1.0,
        }
    }
}

impl BrokerSettings {
    pub fn sizing(&self) -> SizingSettings {
        SizingSettings {
            commission: self.commission,
            size_buffer: self.size_buffer,
            buy_prop: self.buy_prop,
        }
    }

    pub fn simulation(&self) -> SimulationSettings {
        SimulationSettings {
            commission: self.commission,
        }
    }
}

/// Bounds of the moving-average window grid, as fractions of the history length.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainingSettings {
    pub short_window_ratio: f64,
    pub long_window_ratio: f64,
    pub long_window_step: u32,
    /// How many of the best candidates to print after a search.
    pub report_top: usize,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            short_window_ratio: 0.1,
            long_window_ratio: 0.2,
            long_window_step: 5,
            report_top: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_settings_feed_sizer_and_simulator() {
        let broker = BrokerSettings {
            commission: 0.002,
            ..BrokerSettings::default()
        };
        assert_eq!(broker.sizing().commission, 0.002);
        assert_eq!(broker.sizing().size_buffer, 0.001);
        assert_eq!(broker.simulation().commission, 0.002);
    }
}
