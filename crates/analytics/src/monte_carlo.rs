//! Bootstrap resampling of a trade ledger.
//!
//! Each path draws `n` trade returns with replacement from the observed ledger
//! (n = ledger length) and compounds them. The generator is seeded, so the same
//! ledger, iteration count and seed always produce the same summary.

use crate::stats;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Distribution of the compounded return over all simulated paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloSummary {
    pub iterations: usize,
    pub seed: u64,
    pub mean_return: f64,
    pub p05_return: f64,
    pub median_return: f64,
    pub p95_return: f64,
    /// Fraction of paths that ended below the starting capital.
    pub probability_of_loss: f64,
}

/// Runs `iterations` resampled paths over `trade_returns`.
///
/// Returns `None` when there is nothing to resample or no iterations requested.
pub fn simulate(trade_returns: &[f64], iterations: usize, seed: u64) -> Option<MonteCarloSummary> {
    if trade_returns.is_empty() || iterations == 0 {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let n = trade_returns.len();
    let mut outcomes: Vec<f64> = (0..iterations)
        .map(|_| {
            let growth = (0..n).fold(1.0, |level, _| {
                level * (1.0 + trade_returns[rng.gen_range(0..n)])
            });
            growth - 1.0
        })
        .collect();
    outcomes.sort_by(|a, b| a.total_cmp(b));

    let losses = outcomes.iter().filter(|r| **r < 0.0).count();
    let summary = MonteCarloSummary {
        iterations,
        seed,
        mean_return: stats::mean(&outcomes),
        p05_return: stats::percentile_sorted(&outcomes, 5.0),
        median_return: stats::percentile_sorted(&outcomes, 50.0),
        p95_return: stats::percentile_sorted(&outcomes, 95.0),
        probability_of_loss: losses as f64 / iterations as f64,
    };
    tracing::debug!(?summary, "Monte Carlo resampling complete");
    Some(summary)
}
