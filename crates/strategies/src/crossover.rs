// In crates/strategies/src/crossover.rs

use crate::{Error, Result, SignalRule, checked_period};
use core_types::WindowPair;
use ta::Next;
use ta::indicators::{ExponentialMovingAverage as Ema, SimpleMovingAverage as Sma};

/// Remembers the last two (fast, slow) readings to detect crossings.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CrossTracker {
    previous: Option<(f64, f64)>,
    current: Option<(f64, f64)>,
}

impl CrossTracker {
    pub(crate) fn push(&mut self, fast: f64, slow: f64) {
        self.previous = self.current;
        self.current = Some((fast, slow));
    }

    /// Fast line was below the slow line on the previous bar and is above it now.
    pub(crate) fn crossed_up(&self) -> bool {
        match (self.previous, self.current) {
            (Some((prev_fast, prev_slow)), Some((fast, slow))) => {
                prev_fast < prev_slow && fast > slow
            }
            _ => false,
        }
    }

    pub(crate) fn crossed_down(&self) -> bool {
        match (self.previous, self.current) {
            (Some((prev_fast, prev_slow)), Some((fast, slow))) => {
                prev_fast > prev_slow && fast < slow
            }
            _ => false,
        }
    }
}

fn periods(windows: WindowPair) -> Result<(usize, usize)> {
    let fast = checked_period("fast moving average", windows.short)?;
    let slow = checked_period("slow moving average", windows.long)?;
    if fast >= slow {
        return Err(Error::InvalidWindows {
            short: windows.short,
            long: windows.long,
        });
    }
    Ok((fast, slow))
}

/// Buys when the fast SMA crosses above the slow SMA, sells on the opposite cross.
#[derive(Debug, Clone)]
pub struct SmaCrossover {
    windows: WindowPair,
    fast: Sma,
    slow: Sma,
    cross: CrossTracker,
}

impl SmaCrossover {
    pub fn new(windows: WindowPair) -> Result<Self> {
        let (fast, slow) = periods(windows)?;
        let invalid = |_| Error::InvalidWindows {
            short: windows.short,
            long: windows.long,
        };
        Ok(Self {
            windows,
            fast: Sma::new(fast).map_err(invalid)?,
            slow: Sma::new(slow).map_err(invalid)?,
            cross: CrossTracker::default(),
        })
    }
}

impl SignalRule for SmaCrossover {
    fn name(&self) -> &'static str {
        "SMACrossover"
    }

    // One extra bar so the previous reading is already a full window.
    fn warmup_bars(&self) -> usize {
        self.windows.long as usize + 1
    }

    fn update(&mut self, close: f64) {
        let fast = self.fast.next(close);
        let slow = self.slow.next(close);
        self.cross.push(fast, slow);
    }

    fn buy_signal(&self) -> bool {
        self.cross.crossed_up()
    }

    fn sell_signal(&self) -> bool {
        self.cross.crossed_down()
    }
}

/// Same as [`SmaCrossover`] on exponential averages.
#[derive(Debug, Clone)]
pub struct EmaCrossover {
    windows: WindowPair,
    fast: Ema,
    slow: Ema,
    cross: CrossTracker,
}

impl EmaCrossover {
    pub fn new(windows: WindowPair) -> Result<Self> {
        let (fast, slow) = periods(windows)?;
        let invalid = |_| Error::InvalidWindows {
            short: windows.short,
            long: windows.long,
        };
        Ok(Self {
            windows,
            fast: Ema::new(fast).map_err(invalid)?,
            slow: Ema::new(slow).map_err(invalid)?,
            cross: CrossTracker::default(),
        })
    }
}

impl SignalRule for EmaCrossover {
    fn name(&self) -> &'static str {
        "EMACrossover"
    }

    fn warmup_bars(&self) -> usize {
        self.windows.long as usize + 1
    }

    fn update(&mut self, close: f64) {
        let fast = self.fast.next(close);
        let slow = self.slow.next(close);
        self.cross.push(fast, slow);
    }

    fn buy_signal(&self) -> bool {
        self.cross.crossed_up()
    }

    fn sell_signal(&self) -> bool {
        self.cross.crossed_down()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_needs_two_readings() {
        let mut cross = CrossTracker::default();
        cross.push(2.0, 1.0);
        assert!(!cross.crossed_up());
        assert!(!cross.crossed_down());
    }

    #[test]
    fn tracker_detects_both_directions() {
        let mut cross = CrossTracker::default();
        cross.push(1.0, 2.0);
        cross.push(3.0, 2.0);
        assert!(cross.crossed_up());
        cross.push(1.0, 2.0);
        assert!(cross.crossed_down());
        cross.push(1.0, 2.0);
        assert!(!cross.crossed_down());
    }

    #[test]
    fn touching_is_not_a_cross() {
        let mut cross = CrossTracker::default();
        cross.push(2.0, 2.0);
        cross.push(3.0, 2.0);
        assert!(!cross.crossed_up());
    }

    #[test]
    fn sma_crossover_fires_once_on_reversal() {
        let mut rule = SmaCrossover::new(WindowPair::new(1, 3)).unwrap();
        let closes = [5.0, 4.0, 3.0, 2.0, 6.0, 7.0, 8.0];
        let buys: Vec<bool> = closes
            .iter()
            .map(|c| {
                rule.update(*c);
                rule.buy_signal()
            })
            .collect();
        assert_eq!(buys.iter().filter(|b| **b).count(), 1);
        assert!(buys[4]);
    }

    #[test]
    fn crossover_rejects_unordered_windows() {
        assert!(matches!(
            EmaCrossover::new(WindowPair::new(5, 3)),
            Err(Error::InvalidWindows { short: 5, long: 3 })
        ));
    }
}
