use crate::monte_carlo::MonteCarloSummary;
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;

/// A comprehensive, standardized report of a strategy's performance.
///
/// Money-denominated fields are `Decimal`; ratios derived from trade returns
/// are `f64`. Undefined ratios are reported as `0.0`, except `profit_factor`,
/// which is `f64::INFINITY` when there are trades but no losing ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    // I. Core Profitability Metrics
    pub total_net_profit: Decimal,
    pub gross_profit: Decimal,
    /// Sum of losing trade profits, as a positive magnitude.
    pub gross_loss: Decimal,
    pub profit_factor: f64,
    /// Compounded return over the whole ledger, as a fraction.
    pub total_return: f64,
    pub final_capital: Decimal,
    /// Mean profit per trade.
    pub expectancy: Decimal,

    // II. Risk-Adjusted Metrics
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// Largest peak-to-trough drop of the compounded return curve.
    pub max_drawdown: f64,

    // III. Trade-Level Statistics
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate_pct: f64,
    pub average_win: Decimal,
    pub average_loss: Decimal,
    pub payoff_ratio: Option<Decimal>, // None when there are no losing trades

    // IV. Time-Based Metrics
    #[serde(with = "humantime_serde")]
    pub average_holding_period: Duration,

    // V. Resampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monte_carlo: Option<MonteCarloSummary>,
}

impl PerformanceReport {
    /// The report of an empty ledger: every metric zero, capital untouched.
    pub fn empty(initial_capital: Decimal) -> Self {
        Self {
            total_net_profit: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            profit_factor: 0.0,
            total_return: 0.0,
            final_capital: initial_capital,
            expectancy: Decimal::ZERO,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            max_drawdown: 0.0,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate_pct: 0.0,
            average_win: Decimal::ZERO,
            average_loss: Decimal::ZERO,
            payoff_ratio: None,
            average_holding_period: Duration::ZERO,
            monte_carlo: None,
        }
    }
}
