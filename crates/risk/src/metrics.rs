use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        };
        f.write_str(label)
    }
}

/// A read-only risk snapshot computed from the returns preceding a bar.
///
/// `var` and `cvar` are return thresholds, so a loss shows up as a negative
/// number. `volatility` and `sharpe` are annualized.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RiskMetrics {
    pub volatility: f64,
    pub var: f64,
    pub cvar: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    /// Kelly fraction after clamping to `[0, kelly_cap]`.
    pub kelly_fraction: f64,
    pub score: f64,
    pub risk_level: RiskLevel,
}

impl RiskMetrics {
    pub fn is_high(&self) -> bool {
        self.risk_level == RiskLevel::High
    }
}
