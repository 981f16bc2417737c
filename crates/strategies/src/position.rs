// In crates/strategies/src/position.rs

use crate::Signals;
use core_types::{AlertAction, PositionState};

/// The outcome of applying one bar's signals to a position state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: PositionState,
    /// Set when the state changed on this bar.
    pub action: Option<AlertAction>,
}

/// Advances the per-stock state machine. FLAT goes LONG on a buy signal and
/// LONG goes FLAT on a sell signal; there is no short state.
pub fn advance(state: PositionState, signals: Signals) -> Transition {
    match state {
        PositionState::Flat if signals.buy => Transition {
            state: PositionState::Long,
            action: Some(AlertAction::Buy),
        },
        PositionState::Long if signals.sell => Transition {
            state: PositionState::Flat,
            action: Some(AlertAction::Sell),
        },
        _ => Transition { state, action: None },
    }
}
