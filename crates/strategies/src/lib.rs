// In crates/strategies/src/lib.rs

use core_types::StrategyKind;

pub mod crossover;
pub mod error;
pub mod factory;
pub mod ma_trend;
pub mod macd;
pub mod position;
pub mod rsi;
pub mod types;

pub use error::{Error, Result};
pub use factory::create_strategy;
pub use position::Transition;
pub use types::{StrategyParams, StrategySettings};

use crossover::{EmaCrossover, SmaCrossover};
use ma_trend::MaTrend;
use macd::MacdCrossover;
use rsi::RsiThreshold;

/// The buy/sell predicate pair every strategy variant provides.
///
/// Implementors own their indicator state. `update` is called once per bar with
/// the bar's close, after which both predicates describe that bar.
pub trait SignalRule {
    fn name(&self) -> &'static str;

    /// Number of bars that must be fed before the predicates are meaningful.
    fn warmup_bars(&self) -> usize;

    fn update(&mut self, close: f64);

    fn buy_signal(&self) -> bool;

    fn sell_signal(&self) -> bool;
}

/// The predicates evaluated for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub buy: bool,
    pub sell: bool,
}

/// The concrete variant behind a [`Strategy`].
#[derive(Debug, Clone)]
pub enum Rule {
    MaTrend(MaTrend),
    Rsi(RsiThreshold),
    Macd(MacdCrossover),
    Emac(EmaCrossover),
    Smac(SmaCrossover),
}

/// A strategy instance for one stock: its rule plus the number of bars seen.
///
/// Signals are suppressed until the rule's warm-up is complete.
#[derive(Debug, Clone)]
pub struct Strategy {
    rule: Rule,
    bars_seen: usize,
}

impl Strategy {
    pub fn new(rule: Rule) -> Self {
        Self { rule, bars_seen: 0 }
    }

    pub fn kind(&self) -> StrategyKind {
        match &self.rule {
            Rule::MaTrend(_) => StrategyKind::MaTrend,
            Rule::Rsi(_) => StrategyKind::Rsi,
            Rule::Macd(_) => StrategyKind::Macd,
            Rule::Emac(_) => StrategyKind::Emac,
            Rule::Smac(_) => StrategyKind::Smac,
        }
    }

    pub fn name(&self) -> &'static str {
        match &self.rule {
            Rule::MaTrend(r) => r.name(),
            Rule::Rsi(r) => r.name(),
            Rule::Macd(r) => r.name(),
            Rule::Emac(r) => r.name(),
            Rule::Smac(r) => r.name(),
        }
    }

    pub fn warmup_bars(&self) -> usize {
        match &self.rule {
            Rule::MaTrend(r) => r.warmup_bars(),
            Rule::Rsi(r) => r.warmup_bars(),
            Rule::Macd(r) => r.warmup_bars(),
            Rule::Emac(r) => r.warmup_bars(),
            Rule::Smac(r) => r.warmup_bars(),
        }
    }

    pub fn is_warm(&self) -> bool {
        self.bars_seen >= self.warmup_bars()
    }

    /// Feeds the next close and evaluates both predicates for that bar.
    pub fn next(&mut self, close: f64) -> Signals {
        self.bars_seen += 1;
        let (buy, sell) = match &mut self.rule {
            Rule::MaTrend(r) => evaluate(r, close),
            Rule::Rsi(r) => evaluate(r, close),
            Rule::Macd(r) => evaluate(r, close),
            Rule::Emac(r) => evaluate(r, close),
            Rule::Smac(r) => evaluate(r, close),
        };

        if !self.is_warm() {
            return Signals::default();
        }
        Signals { buy, sell }
    }
}

fn evaluate<R: SignalRule>(rule: &mut R, close: f64) -> (bool, bool) {
    rule.update(close);
    (rule.buy_signal(), rule.sell_signal())
}

/// Validates an indicator period before it is handed to `ta`.
pub(crate) fn checked_period(name: &'static str, value: u32) -> Result<usize> {
    if value == 0 {
        return Err(Error::InvalidPeriod { name, value });
    }
    Ok(value as usize)
}
