use crate::error::CoreError;
use crate::structs::Bar;
use serde::Serialize;

/// A validated, time-ordered bar sequence.
///
/// Construction is the only place bars are checked: every bar must satisfy the
/// OHLC invariant and timestamps must be unique. The bars are sorted ascending
/// before anything downstream sees them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(mut bars: Vec<Bar>) -> Result<Self, CoreError> {
        for (index, bar) in bars.iter().enumerate() {
            bar.validate(index)?;
        }

        bars.sort_by_key(|bar| bar.timestamp);

        if let Some(pair) = bars.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(CoreError::DuplicateTimestamp(pair[1].timestamp));
        }

        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing prices in the `f64` representation the indicators consume.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(Bar::close_f64).collect()
    }
}
