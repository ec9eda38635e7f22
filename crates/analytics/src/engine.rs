use crate::error::AnalyticsError;
use crate::monte_carlo;
use crate::report::PerformanceReport;
use crate::stats;
use core_types::Trade;
use rust_decimal::Decimal;
use std::time::Duration;

/// A stateless calculator for deriving performance metrics from a trade ledger.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    annualization_factor: f64,
    monte_carlo: Option<(usize, u64)>,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(252.0)
    }
}

impl AnalyticsEngine {
    /// `annualization_factor` is the number of trade periods per year used to
    /// scale Sharpe and Sortino (252 for daily bars).
    pub fn new(annualization_factor: f64) -> Self {
        Self {
            annualization_factor,
            monte_carlo: None,
        }
    }

    /// Attach a seeded Monte Carlo resampling of the ledger to every report.
    /// Zero iterations disables it.
    pub fn with_monte_carlo(mut self, iterations: usize, seed: u64) -> Self {
        self.monte_carlo = (iterations > 0).then_some((iterations, seed));
        self
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `trades` - The closed trades of a run, in exit order.
    /// * `initial_capital` - The starting capital; trade returns are profit / initial capital.
    pub fn calculate(&self, trades: &[Trade], initial_capital: Decimal) -> Result<PerformanceReport, AnalyticsError> {
        if initial_capital <= Decimal::ZERO {
            return Err(AnalyticsError::InvalidInitialCapital(initial_capital));
        }

        let mut report = PerformanceReport::empty(initial_capital);
        if trades.is_empty() {
            // An empty ledger has nothing to measure.
            return Ok(report);
        }

        let returns = Self::trade_returns(trades, initial_capital);

        self.calculate_profitability(trades, initial_capital, &mut report);
        self.calculate_ratios(&returns, &mut report);
        self.calculate_time_metrics(trades, &mut report);

        if let Some((iterations, seed)) = self.monte_carlo {
            report.monte_carlo = monte_carlo::simulate(&returns, iterations, seed);
        }

        tracing::debug!(
            trades = report.total_trades,
            net_profit = %report.total_net_profit,
            sharpe = report.sharpe_ratio,
            "Performance report calculated"
        );
        Ok(report)
    }

    /// Per-trade returns as a fraction of the initial capital.
    pub fn trade_returns(trades: &[Trade], initial_capital: Decimal) -> Vec<f64> {
        trades.iter().map(|t| t.return_on(initial_capital)).collect()
    }

    /// Calculates all profitability and trade-count metrics.
    fn calculate_profitability(&self, trades: &[Trade], initial_capital: Decimal, report: &mut PerformanceReport) {
        report.total_trades = trades.len();

        for trade in trades {
            let pnl = trade.profit;
            report.total_net_profit += pnl;

            if pnl > Decimal::ZERO {
                report.gross_profit += pnl;
                report.winning_trades += 1;
            } else if pnl < Decimal::ZERO {
                report.gross_loss += pnl.abs();
                report.losing_trades += 1;
            }
        }

        // --- Ratios ---
        report.profit_factor = if report.gross_loss > Decimal::ZERO {
            stats::safe_ratio(to_f64(report.gross_profit), to_f64(report.gross_loss))
        } else {
            f64::INFINITY
        };

        report.win_rate_pct = report.winning_trades as f64 / report.total_trades as f64 * 100.0;
        report.expectancy = report.total_net_profit / Decimal::from(report.total_trades);
        // Ledger order, so the figure matches the simulator's running capital to the last digit.
        report.final_capital = trades.iter().fold(initial_capital, |capital, t| capital + t.profit);

        if report.winning_trades > 0 {
            report.average_win = report.gross_profit / Decimal::from(report.winning_trades);
        }
        if report.losing_trades > 0 {
            report.average_loss = report.gross_loss / Decimal::from(report.losing_trades);
            report.payoff_ratio = report.average_win.checked_div(report.average_loss);
        }
    }

    /// Compounded return, Sharpe, Sortino and drawdown over the trade returns.
    fn calculate_ratios(&self, returns: &[f64], report: &mut PerformanceReport) {
        let curve = stats::growth_curve(returns);
        report.total_return = curve.last().copied().unwrap_or(1.0) - 1.0;
        report.max_drawdown = stats::max_drawdown(&curve);

        let scale = self.annualization_factor.sqrt();
        let mean = stats::mean(returns);

        report.sharpe_ratio = stats::safe_ratio(mean, stats::sample_std_dev(returns)) * scale;

        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        report.sortino_ratio = stats::safe_ratio(mean, stats::sample_std_dev(&downside)) * scale;
    }

    /// Calculates time-based metrics.
    fn calculate_time_metrics(&self, trades: &[Trade], report: &mut PerformanceReport) {
        let total_ms: i64 = trades
            .iter()
            .map(|t| t.holding_period().num_milliseconds().max(0))
            .sum();
        let average_ms = total_ms / trades.len() as i64;
        report.average_holding_period = Duration::from_millis(average_ms as u64);
    }
}

fn to_f64(value: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    value.to_f64().unwrap_or(0.0)
}
