//! End-to-end scenarios for the execution simulator and the backtest pipeline.

use backtester::{BacktestError, Backtester, ExecutionSimulator, SimulatorSettings};
use chrono::{Duration, TimeZone, Utc};
use configuration::{Config, MACrossoverParams};
use core_types::{Bar, CoreError, ExitReason, Signal};
use risk::{RiskGate, RiskLevel, RiskMetrics};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn bars(closes: &[Decimal]) -> Vec<Bar> {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: t0 + Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: dec!(1000),
        })
        .collect()
}

fn signals(values: &[i8]) -> Vec<Signal> {
    values.iter().map(|v| Signal::try_from(*v).unwrap()).collect()
}

fn config_without_gate() -> Config {
    let mut config = Config::default();
    config.risk_gate.enabled = false;
    config
}

/// A gate that always reports the maximum risk level.
struct AlwaysHigh;

impl RiskGate for AlwaysHigh {
    fn observe(&mut self, _bar: &Bar) {}

    fn assess(&self) -> RiskMetrics {
        RiskMetrics {
            score: 10.0,
            risk_level: RiskLevel::High,
            ..RiskMetrics::default()
        }
    }
}

#[test]
fn single_long_round_trip() {
    let closes = [dec!(100), dec!(102), dec!(101), dec!(105), dec!(103)];
    let backtester = Backtester::new(config_without_gate());
    let result = backtester
        .run_with_signals(&bars(&closes), &signals(&[0, 0, 1, 0, -1]))
        .unwrap();

    let trades = &result.outcome.trades;
    assert_eq!(trades.len(), 1);

    let size = dec!(10000) * dec!(0.01) / dec!(101);
    let expected_profit = (dec!(103) - dec!(101)) * size;
    assert_eq!(trades[0].entry_price, dec!(101));
    assert_eq!(trades[0].exit_price, dec!(103));
    assert_eq!(trades[0].size, size);
    assert_eq!(trades[0].profit, expected_profit);
    assert_eq!(trades[0].exit_reason, ExitReason::Signal);
    assert!(trades[0].profit > Decimal::ZERO);
    assert_eq!(result.outcome.final_capital, dec!(10000) + expected_profit);
    assert_eq!(result.report.final_capital, result.outcome.final_capital);
    assert_eq!(result.report.total_trades, 1);
    assert_eq!(result.signals_emitted, 2);
    assert!(result.final_risk.is_none());
}

#[test]
fn high_risk_vetoes_the_entry() {
    let simulator = ExecutionSimulator::new(SimulatorSettings::default(), Some(Box::new(AlwaysHigh))).unwrap();
    let outcome = simulator
        .run(&bars(&[dec!(100), dec!(101), dec!(102)]), &signals(&[1, 0, -1]))
        .unwrap();

    assert!(outcome.trades.is_empty());
    assert!(outcome.open_position.is_none());
    assert_eq!(outcome.vetoed_entries, 1);
    assert_eq!(outcome.final_capital, dec!(10000));
}

#[test]
fn repeated_long_signal_does_not_pyramid() {
    let simulator = ExecutionSimulator::new(SimulatorSettings::default(), None).unwrap();
    let outcome = simulator
        .run(&bars(&[dec!(100), dec!(110), dec!(120)]), &signals(&[1, 1, 1]))
        .unwrap();

    let position = outcome.open_position.unwrap();
    assert_eq!(position.entry_price, dec!(100));
    assert_eq!(position.size, dec!(1));
    assert!(outcome.trades.is_empty());
}

#[test]
fn strategy_pipeline_trades_its_own_signals() {
    let mut config = config_without_gate();
    config.strategies.ma_crossover = MACrossoverParams {
        ma_fast_period: 1,
        ma_slow_period: 2,
        rsi_period: 3,
        rsi_overbought: 90.0,
        volatility_window: 2,
        ..MACrossoverParams::default()
    };

    let closes = [dec!(100), dec!(102), dec!(101), dec!(105), dec!(103)];
    let result = Backtester::new(config).run(bars(&closes)).unwrap();

    assert_eq!(result.signals_emitted, 2);
    assert_eq!(result.outcome.trades.len(), 1);
    assert_eq!(result.outcome.trades[0].entry_price, dec!(105));
    assert_eq!(result.outcome.trades[0].exit_price, dec!(103));
    assert_eq!(result.report.losing_trades, 1);
    assert_eq!(result.oracle_exits, 0);
}

#[test]
fn take_profit_oracle_rewrites_exits() {
    let mut config = config_without_gate();
    config.strategies.ma_crossover = MACrossoverParams {
        ma_fast_period: 1,
        ma_slow_period: 2,
        rsi_period: 3,
        rsi_overbought: 90.0,
        volatility_window: 2,
        take_profit_oracle_pct: Some(dec!(0.01)),
        ..MACrossoverParams::default()
    };

    let closes = [dec!(100), dec!(102), dec!(101), dec!(105), dec!(103), dec!(107)];
    let result = Backtester::new(config).run(bars(&closes)).unwrap();
    assert_eq!(result.oracle_exits, 1);
}

#[test]
fn proximity_filter_also_clears_oracle_exits() {
    let params = MACrossoverParams {
        ma_fast_period: 1,
        ma_slow_period: 2,
        rsi_period: 3,
        rsi_overbought: 90.0,
        volatility_window: 2,
        take_profit_oracle_pct: Some(dec!(0.01)),
        ..MACrossoverParams::default()
    };
    let mut input = bars(&[dec!(100), dec!(102), dec!(101), dec!(105), dec!(105)]);
    // The entry at 105 reaches its 1% target on the last bar, which did not move.
    input[4].high = dec!(107);

    let mut config = config_without_gate();
    config.strategies.ma_crossover = params.clone();
    let unfiltered = Backtester::new(config).run(input.clone()).unwrap();
    assert_eq!(unfiltered.oracle_exits, 1);
    assert_eq!(unfiltered.outcome.trades.len(), 1);
    assert_eq!(unfiltered.outcome.trades[0].exit_price, dec!(105));

    let mut config = config_without_gate();
    config.strategies.ma_crossover = MACrossoverParams {
        min_signal_distance: Some(dec!(0.0010)),
        ..params
    };
    let filtered = Backtester::new(config).run(input).unwrap();
    assert_eq!(filtered.oracle_exits, 1);
    assert_eq!(filtered.signals_emitted, 1);
    assert!(filtered.outcome.trades.is_empty());
    let position = filtered.outcome.open_position.unwrap();
    assert_eq!(position.entry_price, dec!(105));
}

#[test]
fn bars_are_sorted_before_simulation() {
    let mut input = bars(&[dec!(100), dec!(101), dec!(102)]);
    input.reverse();
    let result = Backtester::new(config_without_gate()).run(input).unwrap();
    let curve = &result.outcome.equity_curve;
    assert_eq!(curve.len(), 3);
    assert!(curve.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn invalid_bar_fails_before_simulation() {
    let mut input = bars(&[dec!(100), dec!(101)]);
    input[1].high = dec!(90);
    let result = Backtester::new(Config::default()).run(input);
    assert!(matches!(
        result,
        Err(BacktestError::InputValidation(CoreError::InvalidBar { index: 1, .. }))
    ));
}

#[test]
fn duplicate_timestamps_fail_validation() {
    let mut input = bars(&[dec!(100), dec!(101)]);
    input[1].timestamp = input[0].timestamp;
    let result = Backtester::new(Config::default()).run(input);
    assert!(matches!(
        result,
        Err(BacktestError::InputValidation(CoreError::DuplicateTimestamp(_)))
    ));
}

#[test]
fn empty_input_yields_empty_report() {
    let result = Backtester::new(Config::default()).run(Vec::new()).unwrap();
    assert!(result.outcome.trades.is_empty());
    assert_eq!(result.report.total_trades, 0);
    assert_eq!(result.outcome.final_capital, dec!(10000));
}
