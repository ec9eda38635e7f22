use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Strategy received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Indicator frame has {frame} rows but {bars} bars were supplied")]
    FrameMismatch { bars: usize, frame: usize },
}
