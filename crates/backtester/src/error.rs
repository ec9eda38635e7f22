use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Input validation failed: {0}")]
    InputValidation(#[from] core_types::CoreError),

    #[error("Signal stream has {signals} entries for {bars} bars")]
    SignalLengthMismatch { bars: usize, signals: usize },

    #[error("Invalid simulator settings: {0}")]
    InvalidSettings(String),

    #[error("Indicator computation error: {0}")]
    Indicator(#[from] indicators::IndicatorError),

    #[error("Strategy execution error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Risk gate error: {0}")]
    Risk(#[from] risk::RiskError),

    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    /// An internal invariant of the simulator was broken. Always a bug.
    #[error("Simulator state violation: {0}")]
    StateViolation(String),
}
