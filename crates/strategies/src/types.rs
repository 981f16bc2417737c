// In crates/strategies/src/types.rs

use core_types::{StrategyKind, WindowPair};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RsiSettings {
    pub period: u32,
    /// Sell when the RSI rises above this level.
    pub upper: f64,
    /// Buy when the RSI falls below this level.
    pub lower: f64,
}

impl Default for RsiSettings {
    fn default() -> Self {
        Self {
            period: 14,
            upper: 70.0,
            lower: 30.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MacdSettings {
    pub fast_period: u32,
    pub slow_period: u32,
    pub signal_period: u32,
}

impl Default for MacdSettings {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// Settings for the variants that are not driven by a trained window pair.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StrategySettings {
    #[serde(default)]
    pub rsi: RsiSettings,
    #[serde(default)]
    pub macd: MacdSettings,
}

/// Plain parameters of a strategy, tagged by variant.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyParams {
    MaTrend(WindowPair),
    Rsi(RsiSettings),
    Macd(MacdSettings),
    Emac(WindowPair),
    Smac(WindowPair),
}

impl StrategyParams {
    /// Builds the parameters for `kind`. Window-pair variants take `windows`
    /// (usually read from the parameter store); the others use `settings`.
    pub fn for_kind(
        kind: StrategyKind,
        windows: Option<WindowPair>,
        settings: &StrategySettings,
    ) -> Result<Self> {
        let params = match kind {
            StrategyKind::Rsi => StrategyParams::Rsi(settings.rsi.clone()),
            StrategyKind::Macd => StrategyParams::Macd(settings.macd.clone()),
            StrategyKind::MaTrend | StrategyKind::Emac | StrategyKind::Smac => {
                let windows = windows.ok_or(Error::MissingWindows(kind))?;
                if windows.short == 0 || windows.short >= windows.long {
                    return Err(Error::InvalidWindows {
                        short: windows.short,
                        long: windows.long,
                    });
                }
                match kind {
                    StrategyKind::MaTrend => StrategyParams::MaTrend(windows),
                    StrategyKind::Emac => StrategyParams::Emac(windows),
                    _ => StrategyParams::Smac(windows),
                }
            }
        };
        Ok(params)
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyParams::MaTrend(_) => StrategyKind::MaTrend,
            StrategyParams::Rsi(_) => StrategyKind::Rsi,
            StrategyParams::Macd(_) => StrategyKind::Macd,
            StrategyParams::Emac(_) => StrategyKind::Emac,
            StrategyParams::Smac(_) => StrategyKind::Smac,
        }
    }
}
