//! # Retrotrade Risk Gate
//!
//! Measures the risk of the recent past (volatility, VaR/CVaR, Sharpe,
//! drawdown and a Kelly fraction) and classifies it into a `RiskLevel`. The
//! backtester consults the gate before every new entry and vetoes the entry
//! when the level is `High`.

pub mod error;
pub mod gate;
pub mod metrics;
pub mod window;

use core_types::Bar;

pub use error::RiskError;
pub use gate::ReturnWindowGate;
pub use metrics::{RiskLevel, RiskMetrics};
pub use window::ReturnWindow;

/// The contract for any pre-trade risk gate.
///
/// The simulator calls `assess` before it lets a bar open a position and
/// `observe` after the bar has been processed.
pub trait RiskGate: Send {
    /// Feeds a processed bar into the gate's history.
    fn observe(&mut self, bar: &Bar);

    /// A fresh snapshot of the current history. Never cached.
    fn assess(&self) -> RiskMetrics;
}
