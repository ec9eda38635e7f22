use crate::enums::{ExitReason, Side};
use crate::error::CoreError;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// One OHLCV sample for a fixed time interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Bar {
    /// Checks `high >= max(open, close) >= min(open, close) >= low >= 0`.
    ///
    /// `index` is only used to make the error message point at the offending row.
    pub fn validate(&self, index: usize) -> Result<(), CoreError> {
        let fail = |reason: String| CoreError::InvalidBar {
            index,
            timestamp: self.timestamp,
            reason,
        };

        if self.low < Decimal::ZERO {
            return Err(fail(format!("low {} is negative", self.low)));
        }
        if self.volume < Decimal::ZERO {
            return Err(fail(format!("volume {} is negative", self.volume)));
        }
        let body_high = self.open.max(self.close);
        let body_low = self.open.min(self.close);
        if self.high < body_high {
            return Err(fail(format!(
                "high {} is below max(open, close) {}",
                self.high, body_high
            )));
        }
        if body_low < self.low {
            return Err(fail(format!(
                "low {} is above min(open, close) {}",
                self.low, body_low
            )));
        }
        Ok(())
    }

    /// The close as `f64`, the representation indicators work in.
    pub fn close_f64(&self) -> f64 {
        self.close.to_f64().unwrap_or(f64::NAN)
    }
}

/// The single open position owned by the execution simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_price: Decimal,
    pub entry_time: DateTime<Utc>,
    pub size: Decimal,
}

impl Position {
    /// Realized profit if the position were closed at `price`, or `None` when
    /// it does not fit in a `Decimal`.
    pub fn profit_at(&self, price: Decimal) -> Option<Decimal> {
        let change = match self.side {
            Side::Long => price.checked_sub(self.entry_price)?,
            Side::Short => self.entry_price.checked_sub(price)?,
        };
        change.checked_mul(self.size)
    }

    /// Consumes the position and produces the immutable ledger record.
    /// `None` when the profit at `exit_price` overflows.
    pub fn close(self, exit_time: DateTime<Utc>, exit_price: Decimal, exit_reason: ExitReason) -> Option<Trade> {
        let profit = self.profit_at(exit_price)?;
        Some(Trade {
            side: self.side,
            entry_time: self.entry_time,
            exit_time,
            entry_price: self.entry_price,
            exit_price,
            size: self.size,
            profit,
            exit_reason,
        })
    }
}

/// A closed round trip. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub side: Side,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub size: Decimal,
    pub profit: Decimal,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn holding_period(&self) -> Duration {
        self.exit_time - self.entry_time
    }

    /// Profit expressed as a fraction of `capital`. Zero when `capital` is not positive.
    pub fn return_on(&self, capital: Decimal) -> f64 {
        if capital <= Decimal::ZERO {
            return 0.0;
        }
        self.profit.checked_div(capital).and_then(|r| r.to_f64()).unwrap_or(0.0)
    }

    pub fn is_win(&self) -> bool {
        self.profit > Decimal::ZERO
    }
}
