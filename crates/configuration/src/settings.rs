use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// runnable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backtest: Backtest,
    pub risk_management: RiskManagement,
    pub strategies: Strategies,
    pub risk_gate: RiskGateConfig,
    pub analytics: AnalyticsConfig,
    pub logging: LoggingConfig,
}

/// Contains parameters for a single backtest run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Backtest {
    /// The initial starting capital for the simulation.
    pub initial_capital: Decimal,
    /// Lets a `-1` signal open a short when flat, and a `+1` close it.
    pub allow_short: bool,
    /// Close a position still open after the last bar at that bar's close.
    /// When false the position is reported as unrealized.
    pub close_open_position_at_end: bool,
}

/// How the simulator turns capital into a position size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum SizingMode {
    /// `size = capital * risk_per_trade_pct / entry_price`
    #[default]
    FixedFractional,
    /// Use the risk gate's clamped Kelly fraction in place of `risk_per_trade_pct`.
    Kelly,
}

/// Contains parameters for trade-level risk management.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskManagement {
    /// The fraction of capital committed to a single trade (e.g., 0.01 for 1%).
    pub risk_per_trade_pct: Decimal,
    pub sizing: SizingMode,
}

/// Contains the parameter sets for all available strategies.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Strategies {
    pub ma_crossover: MACrossoverParams,
}

/// Parameters for the moving average crossover strategy and its filters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MACrossoverParams {
    pub ma_fast_period: usize,
    pub ma_slow_period: usize,
    pub rsi_period: usize,
    /// Long entries are suppressed while RSI is above this level.
    pub rsi_overbought: f64,
    /// Short signals are suppressed while RSI is below this level.
    pub rsi_oversold: f64,
    /// Window of the rolling volatility indicator.
    pub volatility_window: usize,
    /// Suppress signals on bars whose close moved less than this from the previous close.
    pub min_signal_distance: Option<Decimal>,
    /// Enables the forward-looking take-profit overlay (backtest only).
    pub take_profit_oracle_pct: Option<Decimal>,
}

/// Weights of the composite risk score.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub volatility: f64,
    pub var: f64,
    pub sharpe: f64,
}

/// Parameters of the pre-trade risk gate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskGateConfig {
    pub enabled: bool,
    /// Number of trailing bar returns the gate looks at.
    pub lookback_period: usize,
    /// VaR confidence level in percent (95.0 means the 5th percentile).
    pub confidence_pct: f64,
    /// Upper bound applied to the Kelly fraction before it is used for sizing.
    pub kelly_cap: f64,
    pub weights: RiskWeights,
    /// Scales the composite score; 50 is neutral.
    pub risk_tolerance: f64,
    pub medium_threshold: f64,
    pub high_threshold: f64,
}

/// Parameters for the performance analytics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Periods per year used to annualize Sharpe, Sortino and volatility.
    pub annualization_factor: f64,
    /// Monte Carlo resampling paths; 0 disables the simulation.
    pub monte_carlo_iterations: usize,
    pub monte_carlo_seed: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs go to a daily rolling file in this directory instead of stderr.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for Backtest {
    fn default() -> Self {
        Self {
            initial_capital: dec!(10000),
            allow_short: false,
            close_open_position_at_end: false,
        }
    }
}

impl Default for RiskManagement {
    fn default() -> Self {
        Self {
            risk_per_trade_pct: dec!(0.01),
            sizing: SizingMode::FixedFractional,
        }
    }
}

impl Default for MACrossoverParams {
    fn default() -> Self {
        Self {
            ma_fast_period: 20,
            ma_slow_period: 50,
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            volatility_window: 20,
            min_signal_distance: None,
            take_profit_oracle_pct: None,
        }
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            volatility: 0.3,
            var: 0.4,
            sharpe: 0.3,
        }
    }
}

impl Default for RiskGateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lookback_period: 100,
            confidence_pct: 95.0,
            kelly_cap: 0.2,
            weights: RiskWeights::default(),
            risk_tolerance: 50.0,
            medium_threshold: 0.3,
            high_threshold: 0.7,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            annualization_factor: 252.0,
            monte_carlo_iterations: 0,
            monte_carlo_seed: 42,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Rejects parameter combinations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        if self.backtest.initial_capital <= Decimal::ZERO {
            return invalid("initial_capital must be greater than 0");
        }

        let risk = self.risk_management.risk_per_trade_pct;
        if risk <= Decimal::ZERO || risk >= Decimal::ONE {
            return invalid("risk_per_trade_pct must be between 0 and 1");
        }

        let ma = &self.strategies.ma_crossover;
        if ma.ma_fast_period == 0 || ma.rsi_period == 0 || ma.volatility_window == 0 {
            return invalid("Indicator periods cannot be zero");
        }
        if ma.ma_fast_period >= ma.ma_slow_period {
            return invalid("Fast MA period must be less than Slow MA period");
        }
        if !(0.0..=100.0).contains(&ma.rsi_oversold)
            || !(0.0..=100.0).contains(&ma.rsi_overbought)
            || ma.rsi_oversold >= ma.rsi_overbought
        {
            return invalid("RSI thresholds must satisfy 0 <= oversold < overbought <= 100");
        }
        if ma.min_signal_distance.is_some_and(|d| d < Decimal::ZERO) {
            return invalid("min_signal_distance cannot be negative");
        }
        if ma.take_profit_oracle_pct.is_some_and(|t| t <= Decimal::ZERO) {
            return invalid("take_profit_oracle_pct must be greater than 0");
        }

        let gate = &self.risk_gate;
        if gate.lookback_period < 2 {
            return invalid("risk_gate.lookback_period must be at least 2");
        }
        if !(gate.confidence_pct > 0.0 && gate.confidence_pct < 100.0) {
            return invalid("risk_gate.confidence_pct must be between 0 and 100");
        }
        if !(gate.kelly_cap > 0.0 && gate.kelly_cap <= 1.0) {
            return invalid("risk_gate.kelly_cap must be in (0, 1]");
        }
        if gate.medium_threshold >= gate.high_threshold {
            return invalid("risk_gate.medium_threshold must be below high_threshold");
        }
        if gate.risk_tolerance <= 0.0 {
            return invalid("risk_gate.risk_tolerance must be greater than 0");
        }

        if self.analytics.annualization_factor <= 0.0 {
            return invalid("annualization_factor must be greater than 0");
        }

        Ok(())
    }
}
