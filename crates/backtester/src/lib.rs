//! # Retrotrade Backtester
//!
//! Orchestrates one backtest run: validated bars -> indicator frame ->
//! signals -> execution simulator -> performance report.
//!
//! The whole pipeline is synchronous and deterministic. The only parallelism is
//! inside the indicator engine, across indicator kinds.

pub mod error;
pub mod simulator;

pub use error::BacktestError;
pub use simulator::{EquityPoint, ExecutionSimulator, SimulationOutcome, SimulatorSettings};

use analytics::{AnalyticsEngine, PerformanceReport};
use configuration::Config;
use core_types::{Bar, BarSeries, Signal};
use indicators::IndicatorFrame;
use risk::{ReturnWindowGate, RiskGate, RiskMetrics};
use serde::Serialize;
use strategies::{MACrossover, apply_min_distance_filter, apply_take_profit_oracle, generate_signals};

/// The complete product of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub outcome: SimulationOutcome,
    pub report: PerformanceReport,
    /// Risk snapshot over the trailing window at the end of the data, when the gate is enabled.
    pub final_risk: Option<RiskMetrics>,
    pub signals_emitted: usize,
    /// Exits written by the take-profit oracle overlay.
    pub oracle_exits: usize,
}

/// The main backtesting engine.
pub struct Backtester {
    config: Config,
}

impl Backtester {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the configured MA crossover strategy over `bars`.
    ///
    /// The bars are validated and sorted first; any invalid bar or duplicate
    /// timestamp fails the run before anything is simulated.
    pub fn run(&self, bars: Vec<Bar>) -> Result<BacktestResult, BacktestError> {
        let series = BarSeries::new(bars)?;
        let params = &self.config.strategies.ma_crossover;
        tracing::info!(bars = series.len(), fast = params.ma_fast_period, slow = params.ma_slow_period, "Starting backtest");

        let frame = IndicatorFrame::compute(&series.closes(), &MACrossover::frame_params(params))?;
        let mut strategy = MACrossover::new(params.clone())?;
        let mut signals = generate_signals(&mut strategy, series.bars(), &frame)?;

        let oracle_exits = match params.take_profit_oracle_pct {
            Some(target) => apply_take_profit_oracle(series.bars(), &mut signals, target),
            None => 0,
        };
        // Last pass, so it also sees the oracle's exits.
        if let Some(min_distance) = params.min_signal_distance {
            apply_min_distance_filter(series.bars(), &mut signals, min_distance);
        }

        let mut result = self.simulate(series.bars(), &signals)?;
        result.oracle_exits = oracle_exits;
        Ok(result)
    }

    /// Simulates an externally produced signal stream, one signal per bar.
    ///
    /// Bars are validated but not reordered, so the alignment with `signals`
    /// is preserved; out-of-order bars are skipped by the simulator.
    pub fn run_with_signals(&self, bars: &[Bar], signals: &[Signal]) -> Result<BacktestResult, BacktestError> {
        for (index, bar) in bars.iter().enumerate() {
            bar.validate(index)?;
        }
        tracing::info!(bars = bars.len(), "Starting backtest with external signals");
        self.simulate(bars, signals)
    }

    fn simulate(&self, bars: &[Bar], signals: &[Signal]) -> Result<BacktestResult, BacktestError> {
        let settings = SimulatorSettings::from(&self.config);
        let initial_capital = settings.initial_capital;
        let simulator = ExecutionSimulator::new(settings, self.build_gate()?)?;
        let outcome = simulator.run(bars, signals)?;

        let analytics = &self.config.analytics;
        let report = AnalyticsEngine::new(analytics.annualization_factor)
            .with_monte_carlo(analytics.monte_carlo_iterations, analytics.monte_carlo_seed)
            .calculate(&outcome.trades, initial_capital)?;

        let final_risk = match self.build_gate()? {
            Some(mut gate) => {
                for bar in bars {
                    gate.observe(bar);
                }
                Some(gate.assess())
            }
            None => None,
        };

        tracing::info!(
            trades = outcome.trades.len(),
            final_capital = %outcome.final_capital,
            skipped = outcome.skipped_bars,
            vetoed = outcome.vetoed_entries,
            "Backtest complete"
        );

        Ok(BacktestResult {
            signals_emitted: signals.iter().filter(|s| !s.is_flat()).count(),
            outcome,
            report,
            final_risk,
            oracle_exits: 0,
        })
    }

    fn build_gate(&self) -> Result<Option<Box<dyn RiskGate>>, BacktestError> {
        if !self.config.risk_gate.enabled {
            return Ok(None);
        }
        let gate = ReturnWindowGate::new(
            self.config.risk_gate.clone(),
            self.config.analytics.annualization_factor,
        )?;
        Ok(Some(Box::new(gate)))
    }
}
