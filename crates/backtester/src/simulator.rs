use crate::error::BacktestError;
use chrono::{DateTime, Utc};
use configuration::{Config, SizingMode};
use core_types::{Bar, ExitReason, Position, Side, Signal, Trade};
use risk::{RiskGate, RiskMetrics};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Serialize;

/// The knobs of the execution simulator, lifted out of the master config.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorSettings {
    pub initial_capital: Decimal,
    /// Fraction of current capital committed per entry in fixed-fractional mode.
    pub risk_per_trade: Decimal,
    pub sizing: SizingMode,
    pub allow_short: bool,
    pub close_open_position_at_end: bool,
}

impl From<&Config> for SimulatorSettings {
    fn from(config: &Config) -> Self {
        Self {
            initial_capital: config.backtest.initial_capital,
            risk_per_trade: config.risk_management.risk_per_trade_pct,
            sizing: config.risk_management.sizing,
            allow_short: config.backtest.allow_short,
            close_open_position_at_end: config.backtest.close_open_position_at_end,
        }
    }
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Capital plus the open position marked at a bar's close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: Decimal,
}

/// Everything the simulator exposes once a run is finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    pub initial_capital: Decimal,
    pub final_capital: Decimal,
    pub trades: Vec<Trade>,
    /// A position still open after the last bar, left unrealized.
    pub open_position: Option<Position>,
    pub equity_curve: Vec<EquityPoint>,
    /// Bars ignored because they were out of order or carried an unusable close.
    pub skipped_bars: usize,
    /// Entries the risk gate refused.
    pub vetoed_entries: usize,
}

/// Walks a bar sequence with its signal stream and turns it into a trade ledger.
///
/// The simulator owns capital and the single open position for the whole run;
/// `run` consumes it so nothing can observe that state mid-run.
pub struct ExecutionSimulator {
    settings: SimulatorSettings,
    gate: Option<Box<dyn RiskGate>>,
    // --- Run state ---
    capital: Decimal,
    position: Option<Position>,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
    last_bar: Option<(DateTime<Utc>, Decimal)>,
    skipped_bars: usize,
    vetoed_entries: usize,
}

impl ExecutionSimulator {
    pub fn new(settings: SimulatorSettings, gate: Option<Box<dyn RiskGate>>) -> Result<Self, BacktestError> {
        if settings.initial_capital <= Decimal::ZERO {
            return Err(BacktestError::InvalidSettings(format!(
                "initial capital must be positive, got {}",
                settings.initial_capital
            )));
        }
        if settings.risk_per_trade <= Decimal::ZERO || settings.risk_per_trade >= Decimal::ONE {
            return Err(BacktestError::InvalidSettings(format!(
                "risk per trade must be in (0, 1), got {}",
                settings.risk_per_trade
            )));
        }

        Ok(Self {
            capital: settings.initial_capital,
            settings,
            gate,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            last_bar: None,
            skipped_bars: 0,
            vetoed_entries: 0,
        })
    }

    /// Runs the whole sequence. `signals[i]` is the signal of `bars[i]`.
    pub fn run(mut self, bars: &[Bar], signals: &[Signal]) -> Result<SimulationOutcome, BacktestError> {
        if bars.len() != signals.len() {
            return Err(BacktestError::SignalLengthMismatch {
                bars: bars.len(),
                signals: signals.len(),
            });
        }

        for (bar, signal) in bars.iter().zip(signals) {
            self.step(bar, *signal)?;
        }

        if self.settings.close_open_position_at_end && self.position.is_some() {
            if let Some((timestamp, close)) = self.last_bar {
                self.close_position(timestamp, close, ExitReason::EndOfData)?;
                if let Some(point) = self.equity_curve.last_mut() {
                    point.equity = self.capital;
                }
            }
        }

        Ok(SimulationOutcome {
            initial_capital: self.settings.initial_capital,
            final_capital: self.capital,
            trades: self.trades,
            open_position: self.position,
            equity_curve: self.equity_curve,
            skipped_bars: self.skipped_bars,
            vetoed_entries: self.vetoed_entries,
        })
    }

    fn step(&mut self, bar: &Bar, signal: Signal) -> Result<(), BacktestError> {
        // ---===[ 1. Malformed Bar Check ]===---
        if let Some((last_time, _)) = self.last_bar {
            if bar.timestamp <= last_time {
                tracing::warn!(timestamp = %bar.timestamp, previous = %last_time, "Out-of-order bar skipped");
                self.skipped_bars += 1;
                return Ok(());
            }
        }
        if bar.close <= Decimal::ZERO {
            tracing::warn!(timestamp = %bar.timestamp, close = %bar.close, "Bar with non-positive close skipped");
            self.skipped_bars += 1;
            return Ok(());
        }

        if self.mark_to_market(bar.close).is_none() {
            tracing::warn!(timestamp = %bar.timestamp, close = %bar.close, "Bar with unrepresentable open profit skipped");
            self.skipped_bars += 1;
            return Ok(());
        }

        // ---===[ 2. Exit Before Entry ]===---
        let exited = match &self.position {
            Some(position) if signal.exits(position.side) => {
                self.close_position(bar.timestamp, bar.close, ExitReason::Signal)?;
                true
            }
            _ => false,
        };

        // ---===[ 3. Entry ]===---
        if !exited && self.position.is_none() {
            if let Some(side) = signal.entry_side() {
                if !self.try_enter(bar, side)? {
                    tracing::warn!(timestamp = %bar.timestamp, close = %bar.close, "Bar with unrepresentable position size skipped");
                    self.skipped_bars += 1;
                    return Ok(());
                }
            }
        }

        // ---===[ 4. Bookkeeping ]===---
        let equity = self.mark_to_market(bar.close).ok_or_else(|| {
            BacktestError::StateViolation(format!("equity at {} does not fit in a Decimal", bar.timestamp))
        })?;
        self.equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            equity,
        });
        if let Some(gate) = self.gate.as_mut() {
            gate.observe(bar);
        }
        self.last_bar = Some((bar.timestamp, bar.close));

        Ok(())
    }

    /// Capital plus the open position's profit at `close`, `None` on overflow.
    fn mark_to_market(&self, close: Decimal) -> Option<Decimal> {
        match &self.position {
            Some(position) => self.capital.checked_add(position.profit_at(close)?),
            None => Some(self.capital),
        }
    }

    /// Returns `Ok(false)` when the position size does not fit in a `Decimal`;
    /// every other outcome, including a declined entry, is `Ok(true)`.
    fn try_enter(&mut self, bar: &Bar, side: Side) -> Result<bool, BacktestError> {
        if side == Side::Short && !self.settings.allow_short {
            return Ok(true);
        }
        if self.capital <= Decimal::ZERO {
            tracing::debug!(timestamp = %bar.timestamp, capital = %self.capital, "Entry skipped: capital exhausted");
            return Ok(true);
        }

        let metrics = self.gate.as_ref().map(|gate| gate.assess());
        if let Some(metrics) = metrics.as_ref().filter(|m| m.is_high()) {
            tracing::debug!(
                timestamp = %bar.timestamp,
                score = metrics.score,
                "Entry vetoed by risk gate"
            );
            self.vetoed_entries += 1;
            return Ok(true);
        }

        let fraction = self.position_fraction(metrics.as_ref());
        if fraction <= Decimal::ZERO {
            tracing::debug!(timestamp = %bar.timestamp, "Entry skipped: sizing fraction is zero");
            return Ok(true);
        }

        let size = self
            .capital
            .checked_mul(fraction)
            .and_then(|stake| stake.checked_div(bar.close))
            .filter(|size| *size > Decimal::ZERO);
        let Some(size) = size else {
            return Ok(false);
        };
        self.open_position(Position {
            side,
            entry_price: bar.close,
            entry_time: bar.timestamp,
            size,
        })?;
        Ok(true)
    }

    fn position_fraction(&self, metrics: Option<&RiskMetrics>) -> Decimal {
        match (self.settings.sizing, metrics) {
            (SizingMode::Kelly, Some(m)) => Decimal::from_f64(m.kelly_fraction).unwrap_or(Decimal::ZERO),
            _ => self.settings.risk_per_trade,
        }
    }

    fn open_position(&mut self, position: Position) -> Result<(), BacktestError> {
        if let Some(existing) = &self.position {
            return Err(BacktestError::StateViolation(format!(
                "attempted to open a {:?} position at {} while a {:?} position from {} is open",
                position.side, position.entry_time, existing.side, existing.entry_time
            )));
        }
        tracing::debug!(
            side = ?position.side,
            price = %position.entry_price,
            size = %position.size,
            timestamp = %position.entry_time,
            "Position opened"
        );
        self.position = Some(position);
        Ok(())
    }

    fn close_position(
        &mut self,
        timestamp: DateTime<Utc>,
        price: Decimal,
        reason: ExitReason,
    ) -> Result<(), BacktestError> {
        let position = self
            .position
            .take()
            .ok_or_else(|| BacktestError::StateViolation(format!("no open position to close at {timestamp}")))?;

        let trade = position
            .close(timestamp, price, reason)
            .ok_or_else(|| BacktestError::StateViolation(format!("profit at {timestamp} does not fit in a Decimal")))?;
        self.capital = self
            .capital
            .checked_add(trade.profit)
            .ok_or_else(|| BacktestError::StateViolation(format!("capital at {timestamp} does not fit in a Decimal")))?;
        tracing::debug!(
            side = ?trade.side,
            profit = %trade.profit,
            capital = %self.capital,
            ?reason,
            "Position closed"
        );
        self.trades.push(trade);
        Ok(())
    }
}
