//! # Retrotrade Data Feed
//!
//! The collaborators that hand the backtester a materialized bar sequence.
//! A source has an explicit lifecycle owned by the caller: `open`, then
//! `fetch_bars`, then `close`.

pub mod csv_source;
pub mod error;

pub use csv_source::CsvDataSource;
pub use error::FeedError;

use core_types::Bar;

/// The contract for anything that can supply historical bars.
pub trait DataSource {
    /// Acquires the underlying resource (file handle, connection).
    fn open(&mut self) -> Result<(), FeedError>;

    /// Reads every available bar. The source must be open.
    fn fetch_bars(&mut self) -> Result<Vec<Bar>, FeedError>;

    /// Releases the underlying resource. Closing a closed source is a no-op.
    fn close(&mut self);
}

/// Runs the full open / fetch / close lifecycle, closing even when the fetch fails.
pub fn load_bars(source: &mut dyn DataSource) -> Result<Vec<Bar>, FeedError> {
    source.open()?;
    let bars = source.fetch_bars();
    source.close();
    bars
}
