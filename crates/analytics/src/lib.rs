//! # Retrotrade Analytics Engine
//!
//! Turns a ledger of closed trades into a `PerformanceReport`. It is the
//! unbiased judge of a backtest run.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** depends only on `core-types`. It has no knowledge of bars,
//!   signals or configuration files.
//! - **Stateless calculation:** the same ledger and initial capital always
//!   produce the same report.
//! - **Shared statistics:** the `stats` module is reused by the risk gate so
//!   both compute dispersion and percentiles identically.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod monte_carlo;
pub mod report;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use monte_carlo::{MonteCarloSummary, simulate};
pub use report::PerformanceReport;
