use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Risk gate parameters are invalid: {0}")]
    InvalidParameters(String),
}
