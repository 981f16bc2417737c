// In crates/strategies/src/ma_trend.rs

use crate::{Error, Result, SignalRule, checked_period};
use core_types::WindowPair;
use ta::Next;
use ta::indicators::SimpleMovingAverage as Sma;

/// Trend following on two simple moving averages.
///
/// Long while the short average is above the long one, flat otherwise.
#[derive(Debug, Clone)]
pub struct MaTrend {
    windows: WindowPair,
    sma_short: Sma,
    sma_long: Sma,
    last_short: f64,
    last_long: f64,
}

impl MaTrend {
    pub fn new(windows: WindowPair) -> Result<Self> {
        let short = checked_period("short moving average", windows.short)?;
        let long = checked_period("long moving average", windows.long)?;
        let invalid = |_| Error::InvalidWindows {
            short: windows.short,
            long: windows.long,
        };

        Ok(Self {
            windows,
            sma_short: Sma::new(short).map_err(invalid)?,
            sma_long: Sma::new(long).map_err(invalid)?,
            last_short: 0.0,
            last_long: 0.0,
        })
    }

    pub fn windows(&self) -> WindowPair {
        self.windows
    }
}

impl SignalRule for MaTrend {
    fn name(&self) -> &'static str {
        "MATrend"
    }

    fn warmup_bars(&self) -> usize {
        self.windows.short.max(self.windows.long) as usize
    }

    fn update(&mut self, close: f64) {
        self.last_short = self.sma_short.next(close);
        self.last_long = self.sma_long.next(close);
    }

    fn buy_signal(&self) -> bool {
        self.last_short > self.last_long
    }

    fn sell_signal(&self) -> bool {
        self.last_short <= self.last_long
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_above_long_is_a_buy() {
        let mut rule = MaTrend::new(WindowPair::new(2, 4)).unwrap();
        for close in [10.0, 11.0, 12.0, 13.0] {
            rule.update(close);
        }
        assert!(rule.buy_signal());
        assert!(!rule.sell_signal());
    }

    #[test]
    fn equal_averages_are_a_sell() {
        let mut rule = MaTrend::new(WindowPair::new(1, 3)).unwrap();
        for close in [5.0, 5.0, 5.0] {
            rule.update(close);
        }
        assert!(!rule.buy_signal());
        assert!(rule.sell_signal());
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(matches!(
            MaTrend::new(WindowPair::new(0, 3)),
            Err(Error::InvalidPeriod { value: 0, .. })
        ));
    }
}
