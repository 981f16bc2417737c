// In crates/strategies/src/rsi.rs

use crate::types::RsiSettings;
use crate::{Error, Result, SignalRule, checked_period};
use ta::Next;
use ta::indicators::RelativeStrengthIndex as Rsi;

/// Mean reversion on RSI thresholds: buy oversold, sell overbought.
#[derive(Debug, Clone)]
pub struct RsiThreshold {
    settings: RsiSettings,
    rsi: Rsi,
    last_rsi: f64,
}

impl RsiThreshold {
    pub fn new(settings: RsiSettings) -> Result<Self> {
        let period = checked_period("RSI", settings.period)?;
        let rsi = Rsi::new(period).map_err(|_| Error::InvalidPeriod {
            name: "RSI",
            value: settings.period,
        })?;
        Ok(Self {
            settings,
            rsi,
            last_rsi: 50.0,
        })
    }
}

impl SignalRule for RsiThreshold {
    fn name(&self) -> &'static str {
        "RSIThreshold"
    }

    // RSI works on differences, so the first bar carries no information.
    fn warmup_bars(&self) -> usize {
        self.settings.period as usize + 1
    }

    fn update(&mut self, close: f64) {
        self.last_rsi = self.rsi.next(close);
    }

    fn buy_signal(&self) -> bool {
        self.last_rsi < self.settings.lower
    }

    fn sell_signal(&self) -> bool {
        self.last_rsi > self.settings.upper
    }
}
