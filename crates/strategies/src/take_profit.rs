//! Take-profit overlay in "oracle" mode.
//!
//! This pass looks at bars *after* an entry to place its exit, which is
//! look-ahead relative to the entry bar. It is only meaningful when replaying
//! history and must never feed live signal generation.

use core_types::{Bar, Signal};
use rust_decimal::Decimal;

/// For every long entry at bar `i` with close `P`, overwrites the signal of
/// the first later bar whose high reaches `P * (1 + target_pct)` with an exit.
///
/// Returns the number of exits written.
pub fn apply_take_profit_oracle(bars: &[Bar], signals: &mut [Signal], target_pct: Decimal) -> usize {
    tracing::warn!(
        %target_pct,
        "Take-profit oracle enabled: exits are placed using bars after each entry (backtest only)"
    );

    let n = bars.len().min(signals.len());
    let mut injected = 0;

    for i in 0..n {
        if signals[i] != Signal::Long {
            continue;
        }
        let Some(target) = bars[i].close.checked_mul(Decimal::ONE + target_pct) else {
            continue;
        };
        if let Some(j) = (i + 1..n).find(|&j| bars[j].high >= target) {
            tracing::debug!(entry = %bars[i].timestamp, exit = %bars[j].timestamp, %target, "Oracle take-profit exit");
            signals[j] = Signal::Short;
            injected += 1;
        }
    }

    injected
}
