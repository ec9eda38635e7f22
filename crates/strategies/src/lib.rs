//! # Strategy Library
//!
//! Converts indicator state into one discrete `Signal` per bar.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no knowledge of positions, capital or execution. A strategy
//!   emits intent; whether a position is open is the simulator's business.
//! - **No look-ahead:** `evaluate` sees one bar and the indicator values at that
//!   bar. The only forward-looking code is the explicitly named
//!   `take_profit` oracle overlay.
//!
//! ## Public API
//!
//! - `Strategy`: The core trait all strategies implement.
//! - `MACrossover`: fast/slow MA crossover with an RSI filter.
//! - `generate_signals`: drives a strategy across a bar sequence.
//! - `apply_take_profit_oracle`: the backtest-only take-profit overlay.
//! - `apply_min_distance_filter`: the final minimum-move pass over all signals.

pub mod error;
pub mod ma_crossover;
pub mod proximity;
pub mod take_profit;

pub use error::StrategyError;
pub use ma_crossover::MACrossover;
pub use proximity::apply_min_distance_filter;
pub use take_profit::apply_take_profit_oracle;

use core_types::{Bar, Signal};
use indicators::{IndicatorFrame, IndicatorSnapshot};

/// The core trait that all trading strategies must implement.
///
/// The `&mut self` in `evaluate` is crucial, as strategies keep their own
/// state between bars (e.g. the previous values of an indicator).
pub trait Strategy: Send + Sync {
    /// Evaluates the strategy on a new bar, given the indicator values at that bar.
    ///
    /// Returns `Signal::Flat` when the strategy's conditions are not met.
    fn evaluate(&mut self, bar: &Bar, indicators: &IndicatorSnapshot) -> Result<Signal, StrategyError>;
}

/// Runs `strategy` over every bar in order and collects one signal per bar.
pub fn generate_signals(
    strategy: &mut dyn Strategy,
    bars: &[Bar],
    frame: &IndicatorFrame,
) -> Result<Vec<Signal>, StrategyError> {
    if bars.len() != frame.len() {
        return Err(StrategyError::FrameMismatch {
            bars: bars.len(),
            frame: frame.len(),
        });
    }

    let mut signals = Vec::with_capacity(bars.len());
    for (index, bar) in bars.iter().enumerate() {
        let snapshot = frame.at(index).unwrap_or_default();
        signals.push(strategy.evaluate(bar, &snapshot)?);
    }

    let active = signals.iter().filter(|s| !s.is_flat()).count();
    tracing::debug!(bars = bars.len(), active, "Signals generated");
    Ok(signals)
}
