// In crates/strategies/src/factory.rs

use crate::crossover::{EmaCrossover, SmaCrossover};
use crate::ma_trend::MaTrend;
use crate::macd::MacdCrossover;
use crate::rsi::RsiThreshold;
use crate::types::StrategyParams;
use crate::{Result, Rule, Strategy};

/// Builds a fresh strategy instance, with empty indicator state, from its parameters.
pub fn create_strategy(params: &StrategyParams) -> Result<Strategy> {
    let rule = match params {
        StrategyParams::MaTrend(windows) => Rule::MaTrend(MaTrend::new(*windows)?),
        StrategyParams::Rsi(settings) => Rule::Rsi(RsiThreshold::new(settings.clone())?),
        StrategyParams::Macd(settings) => Rule::Macd(MacdCrossover::new(settings.clone())?),
        StrategyParams::Emac(windows) => Rule::Emac(EmaCrossover::new(*windows)?),
        StrategyParams::Smac(windows) => Rule::Smac(SmaCrossover::new(*windows)?),
    };
    Ok(Strategy::new(rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StrategySettings;
    use core_types::{StrategyKind, WindowPair};

    #[test]
    fn every_kind_can_be_built() {
        let settings = StrategySettings::default();
        for kind in StrategyKind::ALL {
            let params =
                StrategyParams::for_kind(kind, Some(WindowPair::new(3, 10)), &settings).unwrap();
            let strategy = create_strategy(&params).unwrap();
            assert_eq!(strategy.kind(), kind);
            assert!(strategy.warmup_bars() > 0);
        }
    }

    #[test]
    fn warmup_matches_variant() {
        let settings = StrategySettings::default();
        let windows = Some(WindowPair::new(3, 10));
        let warmup = |kind| {
            let params = StrategyParams::for_kind(kind, windows, &settings).unwrap();
            create_strategy(&params).unwrap().warmup_bars()
        };
        assert_eq!(warmup(StrategyKind::MaTrend), 10);
        assert_eq!(warmup(StrategyKind::Smac), 11);
        assert_eq!(warmup(StrategyKind::Emac), 11);
        assert_eq!(warmup(StrategyKind::Rsi), 15);
        assert_eq!(warmup(StrategyKind::Macd), 35);
    }
}
