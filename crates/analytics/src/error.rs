use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Initial capital must be positive to express trade returns (got {0})")]
    InvalidInitialCapital(Decimal),
}
