// In crates/strategies/src/macd.rs

use crate::crossover::CrossTracker;
use crate::types::MacdSettings;
use crate::{Error, Result, SignalRule, checked_period};
use ta::Next;
use ta::indicators::MovingAverageConvergenceDivergence as Macd;

/// Buys when the MACD line crosses above its signal line, sells on the opposite cross.
#[derive(Debug, Clone)]
pub struct MacdCrossover {
    settings: MacdSettings,
    macd: Macd,
    cross: CrossTracker,
}

impl MacdCrossover {
    pub fn new(settings: MacdSettings) -> Result<Self> {
        let fast = checked_period("MACD fast", settings.fast_period)?;
        let slow = checked_period("MACD slow", settings.slow_period)?;
        let signal = checked_period("MACD signal", settings.signal_period)?;
        if fast >= slow {
            return Err(Error::InvalidWindows {
                short: settings.fast_period,
                long: settings.slow_period,
            });
        }
        let macd = Macd::new(fast, slow, signal).map_err(|_| Error::InvalidPeriod {
            name: "MACD",
            value: settings.slow_period,
        })?;

        Ok(Self {
            settings,
            macd,
            cross: CrossTracker::default(),
        })
    }
}

impl SignalRule for MacdCrossover {
    fn name(&self) -> &'static str {
        "MACDCrossover"
    }

    fn warmup_bars(&self) -> usize {
        (self.settings.slow_period + self.settings.signal_period) as usize
    }

    fn update(&mut self, close: f64) {
        let output = self.macd.next(close);
        self.cross.push(output.macd, output.signal);
    }

    fn buy_signal(&self) -> bool {
        self.cross.crossed_up()
    }

    fn sell_signal(&self) -> bool {
        self.cross.crossed_down()
    }
}
