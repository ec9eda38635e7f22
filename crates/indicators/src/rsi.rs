use crate::error::IndicatorError;
use std::collections::VecDeque;
use ta::{Next, Reset};

/// Relative strength index over a trailing window of close-to-close changes,
/// using simple (not Wilder-smoothed) average gain and loss.
///
/// Sums of gains and losses are maintained incrementally, so each `next` is
/// O(1). The output is `None` until `period` changes have been seen, i.e. for
/// the first `period` closes. A window without any losing change saturates at
/// 100.
#[derive(Debug, Clone)]
pub struct RollingRsi {
    period: usize,
    changes: VecDeque<f64>,
    gain_sum: f64,
    loss_sum: f64,
    gains_in_window: usize,
    losses_in_window: usize,
    prev_close: Option<f64>,
}

impl RollingRsi {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidWindow("rsi"));
        }
        Ok(Self {
            period,
            changes: VecDeque::with_capacity(period),
            gain_sum: 0.0,
            loss_sum: 0.0,
            gains_in_window: 0,
            losses_in_window: 0,
            prev_close: None,
        })
    }

    fn push_change(&mut self, change: f64) {
        if self.changes.len() == self.period {
            if let Some(old) = self.changes.pop_front() {
                if old > 0.0 {
                    self.gain_sum -= old;
                    self.gains_in_window -= 1;
                } else if old < 0.0 {
                    self.loss_sum += old;
                    self.losses_in_window -= 1;
                }
            }
        }

        if change > 0.0 {
            self.gain_sum += change;
            self.gains_in_window += 1;
        } else if change < 0.0 {
            self.loss_sum -= change;
            self.losses_in_window += 1;
        }
        self.changes.push_back(change);
    }
}

impl Next<f64> for RollingRsi {
    type Output = Option<f64>;

    fn next(&mut self, close: f64) -> Self::Output {
        let prev = self.prev_close.replace(close)?;
        self.push_change(close - prev);

        if self.changes.len() < self.period {
            return None;
        }

        let period = self.period as f64;
        // The counters keep float residue from leaking into an empty side.
        let avg_gain = if self.gains_in_window == 0 { 0.0 } else { (self.gain_sum / period).max(0.0) };
        let avg_loss = if self.losses_in_window == 0 { 0.0 } else { (self.loss_sum / period).max(0.0) };

        if avg_loss == 0.0 {
            return Some(100.0);
        }
        let rs = avg_gain / avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }
}

impl Reset for RollingRsi {
    fn reset(&mut self) {
        self.changes.clear();
        self.gain_sum = 0.0;
        self.loss_sum = 0.0;
        self.gains_in_window = 0;
        self.losses_in_window = 0;
        self.prev_close = None;
    }
}

/// RSI series aligned 1:1 with `closes`.
pub fn rsi(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    let mut indicator = RollingRsi::new(period)?;
    Ok(closes.iter().map(|&close| indicator.next(close)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_until_period_changes() {
        let out = rsi(&[1.0, 2.0, 1.5, 2.5], 3).unwrap();
        assert_eq!(&out[..3], &[None, None, None]);
        assert!(out[3].is_some());
    }

    #[test]
    fn no_losses_saturates_at_100() {
        let out = rsi(&[1.0, 2.0, 3.0, 4.0], 3).unwrap();
        assert_eq!(out[3], Some(100.0));
    }

    #[test]
    fn flat_prices_saturate_at_100() {
        let out = rsi(&[5.0; 6], 3).unwrap();
        assert_eq!(out[5], Some(100.0));
    }

    #[test]
    fn only_losses_is_zero() {
        let out = rsi(&[4.0, 3.0, 2.0, 1.0], 3).unwrap();
        assert_eq!(out[3], Some(0.0));
    }

    #[test]
    fn equal_gain_and_loss_is_fifty() {
        // changes: +2, -1, -1 -> avg gain 2/3, avg loss 2/3
        let out = rsi(&[10.0, 12.0, 11.0, 10.0], 3).unwrap();
        assert!((out[3].unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn losses_rolling_out_of_window_restore_saturation() {
        // changes: -1, +1, +1, +1 ; the only loss leaves the 3-wide window at the last bar
        let out = rsi(&[5.0, 4.0, 5.0, 6.0, 7.0], 3).unwrap();
        assert!(out[3].unwrap() < 100.0);
        assert_eq!(out[4], Some(100.0));
    }

    #[test]
    fn reset_forgets_history() {
        let mut indicator = RollingRsi::new(2).unwrap();
        indicator.next(1.0);
        indicator.next(2.0);
        assert!(indicator.next(3.0).is_some());
        indicator.reset();
        assert_eq!(indicator.next(3.0), None);
    }
}
