use crate::error::IndicatorError;
use ta::indicators::StandardDeviation;
use ta::{Next, Reset};

/// `close[i] / close[i - 1] - 1`, undefined at index 0 and after a zero close.
pub fn simple_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    let mut prev: Option<f64> = None;
    for &close in closes {
        out.push(match prev {
            Some(p) if p != 0.0 => Some(close / p - 1.0),
            _ => None,
        });
        prev = Some(close);
    }
    out
}

/// Rolling population standard deviation of `returns` over `window` values.
///
/// A gap in the input restarts the window, so the output stays undefined
/// until `window` consecutive returns are available again.
pub fn rolling_volatility(
    returns: &[Option<f64>],
    window: usize,
) -> Result<Vec<Option<f64>>, IndicatorError> {
    let mut sd = StandardDeviation::new(window)
        .map_err(|_| IndicatorError::InvalidWindow("volatility"))?;
    let mut filled = 0usize;

    Ok(returns
        .iter()
        .map(|r| match r {
            Some(value) => {
                let std_dev = sd.next(*value);
                filled += 1;
                (filled >= window).then_some(std_dev)
            }
            None => {
                sd.reset();
                filled = 0;
                None
            }
        })
        .collect())
}
