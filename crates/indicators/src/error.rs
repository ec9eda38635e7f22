use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Indicator '{0}' requires a window of at least 1")]
    InvalidWindow(&'static str),

    #[error("Non-finite price {value} at index {index}")]
    NonFiniteInput { index: usize, value: f64 },
}
