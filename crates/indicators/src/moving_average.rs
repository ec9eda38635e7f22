use crate::error::IndicatorError;
use ta::Next;
use ta::indicators::SimpleMovingAverage as Sma;

/// Simple moving average of `closes` over a trailing `window`.
///
/// `ta` reports a partial mean while it warms up; those values are masked so
/// the first `window - 1` entries are `None`.
pub fn sma(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    let mut ma = Sma::new(window).map_err(|_| IndicatorError::InvalidWindow("sma"))?;

    Ok(closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let value = ma.next(close);
            (i + 1 >= window).then_some(value)
        })
        .collect())
}
