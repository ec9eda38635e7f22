//! # Core Types
//!
//! The shared vocabulary of the workspace: bars, signals, the simulator's
//! position and the trades it records. This crate depends on nothing else in
//! the workspace.

pub mod enums;
pub mod error;
pub mod series;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{ExitReason, Side, Signal};
pub use error::CoreError;
pub use series::BarSeries;
pub use structs::{Bar, Position, Trade};
