//! Property tests: one position at a time, and bit-for-bit reproducible runs.

use backtester::{ExecutionSimulator, SimulationOutcome, SimulatorSettings};
use chrono::{Duration, TimeZone, Utc};
use configuration::{RiskGateConfig, SizingMode};
use core_types::{Bar, Signal};
use proptest::prelude::*;
use risk::ReturnWindowGate;
use rust_decimal::Decimal;

fn arb_market() -> impl Strategy<Value = (Vec<Bar>, Vec<Signal>)> {
    prop::collection::vec((1_000i64..20_000, -1i8..=1), 0..150).prop_map(|rows| {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, (cents, signal))| {
                let close = Decimal::new(cents, 2);
                let bar = Bar {
                    timestamp: t0 + Duration::hours(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: Decimal::ONE,
                };
                (bar, Signal::try_from(signal).unwrap())
            })
            .unzip()
    })
}

fn simulate(bars: &[Bar], signals: &[Signal], allow_short: bool, kelly: bool) -> SimulationOutcome {
    let settings = SimulatorSettings {
        allow_short,
        sizing: if kelly { SizingMode::Kelly } else { SizingMode::FixedFractional },
        ..SimulatorSettings::default()
    };
    let gate = ReturnWindowGate::new(
        RiskGateConfig { lookback_period: 20, ..RiskGateConfig::default() },
        252.0,
    )
    .unwrap();
    ExecutionSimulator::new(settings, Some(Box::new(gate)))
        .unwrap()
        .run(bars, signals)
        .unwrap()
}

proptest! {
    #[test]
    fn never_more_than_one_open_position(
        (bars, signals) in arb_market(),
        allow_short in any::<bool>(),
        kelly in any::<bool>(),
    ) {
        let outcome = simulate(&bars, &signals, allow_short, kelly);

        for trade in &outcome.trades {
            prop_assert!(trade.entry_time < trade.exit_time);
        }
        for pair in outcome.trades.windows(2) {
            prop_assert!(pair[0].exit_time < pair[1].entry_time);
        }
        if let (Some(open), Some(last)) = (&outcome.open_position, outcome.trades.last()) {
            prop_assert!(last.exit_time < open.entry_time);
        }

        let compounded = outcome.trades.iter().fold(outcome.initial_capital, |capital, t| capital + t.profit);
        prop_assert_eq!(outcome.final_capital, compounded);
        prop_assert_eq!(outcome.equity_curve.len(), bars.len());
    }

    #[test]
    fn replay_is_deterministic(
        (bars, signals) in arb_market(),
        allow_short in any::<bool>(),
    ) {
        let first = simulate(&bars, &signals, allow_short, false);
        let second = simulate(&bars, &signals, allow_short, false);
        prop_assert_eq!(first, second);
    }
}
