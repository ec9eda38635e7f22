//! Minimum-move filter over a finished signal stream.
//!
//! Runs after every other pass, the take-profit overlay included, so exits
//! written by the overlay are filtered like any other signal.

use core_types::{Bar, Signal};
use rust_decimal::Decimal;

/// Clears every non-flat signal at bar `i > 0` whose close moved less than
/// `min_distance` from the close of bar `i - 1`.
///
/// Returns the number of signals cleared.
pub fn apply_min_distance_filter(bars: &[Bar], signals: &mut [Signal], min_distance: Decimal) -> usize {
    let n = bars.len().min(signals.len());
    let mut cleared = 0;

    for i in 1..n {
        if signals[i].is_flat() {
            continue;
        }
        if (bars[i].close - bars[i - 1].close).abs() < min_distance {
            tracing::debug!(timestamp = %bars[i].timestamp, signal = ?signals[i], "Signal suppressed by proximity filter");
            signals[i] = Signal::Flat;
            cleared += 1;
        }
    }

    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bars(closes: &[Decimal]) -> Vec<Bar> {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: t0 + Duration::hours(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: Decimal::ZERO,
            })
            .collect()
    }

    #[test]
    fn near_flat_bars_lose_their_signal() {
        let bars = bars(&[dec!(1.1000), dec!(1.1005), dec!(1.1025), dec!(1.1020)]);
        let mut signals = vec![Signal::Flat, Signal::Long, Signal::Long, Signal::Short];

        assert_eq!(apply_min_distance_filter(&bars, &mut signals, dec!(0.0010)), 2);
        assert_eq!(signals, vec![Signal::Flat, Signal::Flat, Signal::Long, Signal::Flat]);
    }

    #[test]
    fn first_bar_has_no_previous_close_and_is_kept() {
        let bars = bars(&[dec!(1.1000), dec!(1.1000)]);
        let mut signals = vec![Signal::Long, Signal::Flat];
        assert_eq!(apply_min_distance_filter(&bars, &mut signals, dec!(0.0010)), 0);
        assert_eq!(signals, vec![Signal::Long, Signal::Flat]);
    }

    #[test]
    fn move_equal_to_distance_is_kept() {
        let bars = bars(&[dec!(1.1000), dec!(1.1010)]);
        let mut signals = vec![Signal::Flat, Signal::Short];
        assert_eq!(apply_min_distance_filter(&bars, &mut signals, dec!(0.0010)), 0);
        assert_eq!(signals[1], Signal::Short);
    }
}
