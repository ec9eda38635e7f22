use crate::error::RiskError;
use crate::metrics::{RiskLevel, RiskMetrics};
use crate::window::ReturnWindow;
use crate::RiskGate;
use analytics::stats;
use configuration::RiskGateConfig;
use core_types::Bar;

/// The pre-trade gate fed by a trailing window of close-to-close returns.
///
/// Callers `assess` a bar before they `observe` it, so the snapshot used at
/// bar `i` only contains returns of bars before `i`.
#[derive(Debug, Clone)]
pub struct ReturnWindowGate {
    config: RiskGateConfig,
    annualization_factor: f64,
    window: ReturnWindow,
    prev_close: Option<f64>,
}

impl ReturnWindowGate {
    pub fn new(config: RiskGateConfig, annualization_factor: f64) -> Result<Self, RiskError> {
        if config.lookback_period == 0 {
            return Err(RiskError::InvalidParameters("lookback_period must be positive".to_string()));
        }
        if !(config.confidence_pct > 0.0 && config.confidence_pct < 100.0) {
            return Err(RiskError::InvalidParameters(format!(
                "confidence_pct must be in (0, 100), got {}",
                config.confidence_pct
            )));
        }
        if !(0.0..=1.0).contains(&config.kelly_cap) {
            return Err(RiskError::InvalidParameters(format!(
                "kelly_cap must be in [0, 1], got {}",
                config.kelly_cap
            )));
        }
        if config.medium_threshold >= config.high_threshold {
            return Err(RiskError::InvalidParameters(
                "medium_threshold must be below high_threshold".to_string(),
            ));
        }
        if annualization_factor <= 0.0 {
            return Err(RiskError::InvalidParameters("annualization_factor must be positive".to_string()));
        }

        Ok(Self {
            window: ReturnWindow::new(config.lookback_period),
            config,
            annualization_factor,
            prev_close: None,
        })
    }

    /// Value at risk and conditional value at risk of the current window.
    fn tail_risk(&self) -> (f64, f64) {
        let sorted = self.window.sorted();
        let var = stats::percentile_sorted(&sorted, 100.0 - self.config.confidence_pct);
        let tail: Vec<f64> = sorted.iter().copied().take_while(|r| *r <= var).collect();
        (var, stats::mean(&tail))
    }

    fn kelly_fraction(&self) -> f64 {
        let avg_win = self.window.average_win();
        if avg_win == 0.0 {
            return 0.0;
        }
        let win_rate = self.window.win_rate();
        let raw = (win_rate * avg_win - (1.0 - win_rate) * self.window.average_loss()) / avg_win;
        raw.clamp(0.0, self.config.kelly_cap)
    }

    fn classify(&self, score: f64) -> RiskLevel {
        if score > self.config.high_threshold {
            RiskLevel::High
        } else if score > self.config.medium_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl RiskGate for ReturnWindowGate {
    fn observe(&mut self, bar: &Bar) {
        let close = bar.close_f64();
        let prev = self.prev_close.replace(close);

        let Some(prev) = prev else { return };
        if prev <= 0.0 || !close.is_finite() {
            return;
        }
        let r = close / prev - 1.0;
        if r.is_finite() {
            self.window.push(r);
        }
    }

    fn assess(&self) -> RiskMetrics {
        if self.window.is_empty() {
            return RiskMetrics::default();
        }

        let scale = self.annualization_factor.sqrt();
        let volatility = self.window.std_dev() * scale;
        let sharpe = stats::safe_ratio(self.window.mean(), self.window.std_dev()) * scale;
        let (var, cvar) = self.tail_risk();

        let returns: Vec<f64> = self.window.iter().copied().collect();
        let max_drawdown = stats::max_drawdown(&stats::growth_curve(&returns));

        let weights = &self.config.weights;
        let score = (weights.volatility * volatility + weights.var * var.abs() - weights.sharpe * sharpe)
            * (self.config.risk_tolerance / 50.0);

        RiskMetrics {
            volatility,
            var,
            cvar,
            sharpe,
            max_drawdown,
            kelly_fraction: self.kelly_fraction(),
            score,
            risk_level: self.classify(score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal::prelude::FromPrimitive;

    fn bar(i: i64, close: f64) -> Bar {
        let close = Decimal::from_f64(close).unwrap();
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(i),
            open: close,
            high: close,
            low: close,
            close,
            volume: Decimal::ZERO,
        }
    }

    fn feed(gate: &mut ReturnWindowGate, closes: &[f64]) {
        for (i, c) in closes.iter().enumerate() {
            gate.observe(&bar(i as i64, *c));
        }
    }

    #[test]
    fn empty_window_is_low_risk() {
        let gate = ReturnWindowGate::new(RiskGateConfig::default(), 252.0).unwrap();
        assert_eq!(gate.assess(), RiskMetrics::default());
        assert_eq!(gate.assess().risk_level, RiskLevel::Low);
    }

    #[test]
    fn rejects_bad_parameters() {
        let config = RiskGateConfig { lookback_period: 0, ..RiskGateConfig::default() };
        assert!(ReturnWindowGate::new(config, 252.0).is_err());
        let config = RiskGateConfig { confidence_pct: 100.0, ..RiskGateConfig::default() };
        assert!(ReturnWindowGate::new(config, 252.0).is_err());
    }

    #[test]
    fn violent_swings_are_high_risk() {
        let mut gate = ReturnWindowGate::new(RiskGateConfig::default(), 252.0).unwrap();
        feed(&mut gate, &[100.0, 130.0, 90.0, 125.0, 80.0, 120.0, 85.0]);
        let metrics = gate.assess();
        assert!(metrics.volatility > 1.0);
        assert!(metrics.var < 0.0);
        assert!(metrics.cvar <= metrics.var);
        assert_eq!(metrics.risk_level, RiskLevel::High);
        assert!(metrics.is_high());
    }

    #[test]
    fn steady_gains_are_low_risk() {
        let mut gate = ReturnWindowGate::new(RiskGateConfig::default(), 252.0).unwrap();
        let closes: Vec<f64> = (0..30)
            .map(|i| 100.0 * 1.001_f64.powi(i) + if i % 2 == 0 { 0.01 } else { 0.0 })
            .collect();
        feed(&mut gate, &closes);
        let metrics = gate.assess();
        assert_eq!(metrics.risk_level, RiskLevel::Low);
        assert!(metrics.kelly_fraction > 0.0);
        assert!(metrics.kelly_fraction <= 0.2);
    }

    #[test]
    fn var_is_interpolated_percentile_of_window() {
        let config = RiskGateConfig { confidence_pct: 75.0, ..RiskGateConfig::default() };
        let mut gate = ReturnWindowGate::new(config, 252.0).unwrap();
        // Returns: -0.1, +0.1, -0.2, +0.25 (exact in binary up to rounding).
        feed(&mut gate, &[100.0, 90.0, 99.0, 79.2, 99.0]);
        let metrics = gate.assess();
        // Sorted [-0.2, -0.1, 0.1, 0.25]; 25th percentile sits at rank 0.75.
        assert!((metrics.var + 0.125).abs() < 1e-9);
        assert!((metrics.cvar + 0.2).abs() < 1e-9);
    }

    #[test]
    fn kelly_is_zero_without_winners() {
        let mut gate = ReturnWindowGate::new(RiskGateConfig::default(), 252.0).unwrap();
        feed(&mut gate, &[100.0, 99.0, 98.0, 97.0]);
        assert_eq!(gate.assess().kelly_fraction, 0.0);
    }

    #[test]
    fn constant_growth_has_zero_volatility_and_sharpe() {
        let mut gate = ReturnWindowGate::new(RiskGateConfig::default(), 252.0).unwrap();
        let closes: Vec<f64> = (0..25).map(|i| 100.0 * 1.1_f64.powi(i)).collect();
        feed(&mut gate, &closes);
        let metrics = gate.assess();
        assert_eq!(metrics.volatility, 0.0);
        assert_eq!(metrics.sharpe, 0.0);
        assert!((metrics.var - 0.1).abs() < 1e-9);
        assert_eq!(metrics.max_drawdown, 0.0);
    }
}
