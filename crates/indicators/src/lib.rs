//! # Indicator Engine
//!
//! Rolling technical indicators derived from a close-price series. Every
//! output is aligned with its input and is a pure function of the prices up
//! to and including its own index.

pub mod error;
pub mod frame;
pub mod moving_average;
pub mod returns;
pub mod rsi;

pub use error::IndicatorError;
pub use frame::{FrameParams, IndicatorFrame, IndicatorSnapshot};
pub use moving_average::sma;
pub use returns::{rolling_volatility, simple_returns};
pub use rsi::{RollingRsi, rsi};
