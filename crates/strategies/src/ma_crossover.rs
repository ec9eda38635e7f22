use crate::Strategy;
use crate::error::StrategyError;
use configuration::MACrossoverParams;
use core_types::{Bar, Signal};
use indicators::{FrameParams, IndicatorSnapshot};

/// Fast/slow moving average crossover with an RSI confirmation filter.
///
/// A buy signal is generated when the fast MA crosses above the slow MA and
/// RSI is not overbought. A sell signal is generated when the fast MA crosses
/// below the slow MA and RSI is not oversold.
pub struct MACrossover {
    params: MACrossoverParams,
    // State: the previous fast and slow MA values, to detect a crossover event.
    prev_mas: Option<(f64, f64)>,
}

impl MACrossover {
    /// Creates a new `MACrossover` instance with the given parameters.
    ///
    /// It performs validation to ensure the parameters are logical.
    pub fn new(params: MACrossoverParams) -> Result<Self, StrategyError> {
        if params.ma_fast_period == 0 || params.rsi_period == 0 {
            return Err(StrategyError::InvalidParameters(
                "Indicator periods cannot be zero".to_string(),
            ));
        }
        if params.ma_fast_period >= params.ma_slow_period {
            return Err(StrategyError::InvalidParameters(
                "Fast MA period must be less than Slow MA period".to_string(),
            ));
        }
        if params.rsi_oversold >= params.rsi_overbought {
            return Err(StrategyError::InvalidParameters(
                "RSI oversold level must be below the overbought level".to_string(),
            ));
        }

        Ok(Self {
            params,
            prev_mas: None,
        })
    }

    /// The indicator windows this strategy reads.
    pub fn frame_params(params: &MACrossoverParams) -> FrameParams {
        FrameParams {
            fast_window: params.ma_fast_period,
            slow_window: params.ma_slow_period,
            rsi_period: params.rsi_period,
            volatility_window: params.volatility_window,
        }
    }

    fn crossover(&mut self, fast: f64, slow: f64) -> Signal {
        let Some((prev_fast, prev_slow)) = self.prev_mas.replace((fast, slow)) else {
            return Signal::Flat;
        };

        if prev_fast <= prev_slow && fast > slow {
            Signal::Long
        } else if prev_fast >= prev_slow && fast < slow {
            Signal::Short
        } else {
            Signal::Flat
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl Strategy for MACrossover {
    fn evaluate(&mut self, bar: &Bar, indicators: &IndicatorSnapshot) -> Result<Signal, StrategyError> {
        // A warm-up gap or a bad value breaks crossover continuity.
        let (Some(fast), Some(slow)) = (finite(indicators.fast), finite(indicators.slow)) else {
            self.prev_mas = None;
            return Ok(Signal::Flat);
        };

        let raw = self.crossover(fast, slow);
        if raw.is_flat() {
            return Ok(Signal::Flat);
        }
        tracing::debug!(timestamp = %bar.timestamp, ?raw, fast, slow, "MACrossover: crossover detected");

        // ---===[ Confirmation Filter ]===---
        let Some(rsi) = finite(indicators.rsi) else {
            tracing::debug!(timestamp = %bar.timestamp, "MACrossover: RSI unavailable, signal dropped");
            return Ok(Signal::Flat);
        };
        let exhausted = match raw {
            Signal::Long => rsi > self.params.rsi_overbought,
            Signal::Short => rsi < self.params.rsi_oversold,
            Signal::Flat => false,
        };
        if exhausted {
            tracing::debug!(timestamp = %bar.timestamp, rsi, ?raw, "MACrossover: suppressed by RSI filter");
            return Ok(Signal::Flat);
        }

        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn params() -> MACrossoverParams {
        MACrossoverParams {
            ma_fast_period: 2,
            ma_slow_period: 3,
            ..MACrossoverParams::default()
        }
    }

    fn bar(i: i64, close: Decimal) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(i),
            open: close,
            high: close,
            low: close,
            close,
            volume: Decimal::ZERO,
        }
    }

    fn snap(fast: f64, slow: f64, rsi: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            fast: Some(fast),
            slow: Some(slow),
            rsi: Some(rsi),
            ..IndicatorSnapshot::default()
        }
    }

    #[test]
    fn rejects_inverted_periods() {
        let p = MACrossoverParams {
            ma_fast_period: 10,
            ma_slow_period: 5,
            ..MACrossoverParams::default()
        };
        assert!(matches!(MACrossover::new(p), Err(StrategyError::InvalidParameters(_))));
    }

    #[test]
    fn rising_cross_is_long_and_falling_cross_is_short() {
        let mut s = MACrossover::new(params()).unwrap();
        assert_eq!(s.evaluate(&bar(0, dec!(100)), &snap(99.0, 100.0, 50.0)).unwrap(), Signal::Flat);
        assert_eq!(s.evaluate(&bar(1, dec!(101)), &snap(101.0, 100.0, 50.0)).unwrap(), Signal::Long);
        assert_eq!(s.evaluate(&bar(2, dec!(102)), &snap(102.0, 100.0, 50.0)).unwrap(), Signal::Flat);
        assert_eq!(s.evaluate(&bar(3, dec!(98)), &snap(99.0, 100.0, 50.0)).unwrap(), Signal::Short);
    }

    #[test]
    fn overbought_rsi_suppresses_long() {
        let mut s = MACrossover::new(params()).unwrap();
        s.evaluate(&bar(0, dec!(100)), &snap(99.0, 100.0, 75.0)).unwrap();
        assert_eq!(s.evaluate(&bar(1, dec!(101)), &snap(101.0, 100.0, 75.0)).unwrap(), Signal::Flat);
    }

    #[test]
    fn oversold_rsi_suppresses_short() {
        let mut s = MACrossover::new(params()).unwrap();
        s.evaluate(&bar(0, dec!(100)), &snap(101.0, 100.0, 25.0)).unwrap();
        assert_eq!(s.evaluate(&bar(1, dec!(99)), &snap(99.0, 100.0, 25.0)).unwrap(), Signal::Flat);
    }

    #[test]
    fn missing_rsi_means_no_signal() {
        let mut s = MACrossover::new(params()).unwrap();
        s.evaluate(&bar(0, dec!(100)), &snap(99.0, 100.0, 50.0)).unwrap();
        let mut current = snap(101.0, 100.0, 50.0);
        current.rsi = None;
        assert_eq!(s.evaluate(&bar(1, dec!(101)), &current).unwrap(), Signal::Flat);
    }

    #[test]
    fn gap_resets_crossover_memory() {
        let mut s = MACrossover::new(params()).unwrap();
        s.evaluate(&bar(0, dec!(100)), &snap(99.0, 100.0, 50.0)).unwrap();
        s.evaluate(&bar(1, dec!(100)), &IndicatorSnapshot::default()).unwrap();
        // Previous state was forgotten, so this bar cannot be a cross.
        assert_eq!(s.evaluate(&bar(2, dec!(101)), &snap(101.0, 100.0, 50.0)).unwrap(), Signal::Flat);
    }

    #[test]
    fn nan_indicator_is_treated_as_gap() {
        let mut s = MACrossover::new(params()).unwrap();
        s.evaluate(&bar(0, dec!(100)), &snap(99.0, 100.0, 50.0)).unwrap();
        assert_eq!(s.evaluate(&bar(1, dec!(101)), &snap(f64::NAN, 100.0, 50.0)).unwrap(), Signal::Flat);
    }
}
