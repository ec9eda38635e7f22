use crate::error::IndicatorError;
use crate::moving_average::sma;
use crate::returns::{rolling_volatility, simple_returns};
use crate::rsi::rsi;
use serde::{Deserialize, Serialize};

/// Lookback windows for every indicator in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameParams {
    pub fast_window: usize,
    pub slow_window: usize,
    pub rsi_period: usize,
    pub volatility_window: usize,
}

/// Indicator series aligned 1:1 with a bar sequence.
///
/// `None` marks a warm-up gap: the indicator's lookback is not yet full at
/// that index. A gap means "no signal possible", never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorFrame {
    pub sma_fast: Vec<Option<f64>>,
    pub sma_slow: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub returns: Vec<Option<f64>>,
    pub volatility: Vec<Option<f64>>,
}

/// Every indicator's value at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndicatorSnapshot {
    pub fast: Option<f64>,
    pub slow: Option<f64>,
    pub rsi: Option<f64>,
    pub bar_return: Option<f64>,
    pub volatility: Option<f64>,
}

impl IndicatorFrame {
    /// Computes all indicators over `closes`.
    ///
    /// Each indicator kind is a sequential scan of its own, but the kinds are
    /// independent read-only passes over the same slice, so they run
    /// concurrently. Every value at index `i` depends only on `closes[..=i]`.
    pub fn compute(closes: &[f64], params: &FrameParams) -> Result<Self, IndicatorError> {
        if let Some((index, &value)) = closes.iter().enumerate().find(|(_, c)| !c.is_finite()) {
            return Err(IndicatorError::NonFiniteInput { index, value });
        }

        let ((sma_fast, sma_slow), (rsi, returns_and_volatility)) = rayon::join(
            || {
                rayon::join(
                    || sma(closes, params.fast_window),
                    || sma(closes, params.slow_window),
                )
            },
            || {
                rayon::join(
                    || rsi(closes, params.rsi_period),
                    || {
                        let returns = simple_returns(closes);
                        rolling_volatility(&returns, params.volatility_window)
                            .map(|volatility| (returns, volatility))
                    },
                )
            },
        );
        let (returns, volatility) = returns_and_volatility?;

        let frame = Self {
            sma_fast: sma_fast?,
            sma_slow: sma_slow?,
            rsi: rsi?,
            returns,
            volatility,
        };
        tracing::debug!(bars = frame.len(), ?params, "Indicator frame computed");
        Ok(frame)
    }

    pub fn len(&self) -> usize {
        self.sma_fast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sma_fast.is_empty()
    }

    /// The indicator values at `index`, or `None` past the end of the frame.
    pub fn at(&self, index: usize) -> Option<IndicatorSnapshot> {
        if index >= self.len() {
            return None;
        }
        Some(IndicatorSnapshot {
            fast: self.sma_fast[index],
            slow: self.sma_slow[index],
            rsi: self.rsi[index],
            bar_return: self.returns[index],
            volatility: self.volatility[index],
        })
    }
}
