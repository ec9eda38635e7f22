use crate::DataSource;
use crate::error::FeedError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use core_types::Bar;
use rust_decimal::Decimal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const TIMESTAMP_COLUMNS: &[&str] = &["timestamp", "date", "time", "datetime"];
const VOLUME_COLUMNS: &[&str] = &["volume", "tick_volume", "vol"];

/// Naive layouts tried in order after RFC 3339 and before unix seconds.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y.%m.%d %H:%M:%S", "%Y.%m.%d %H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d"];

/// Reads OHLCV bars from a CSV file with a header row.
///
/// Header names are matched case-insensitively. Naive timestamps are taken as UTC.
pub struct CsvDataSource {
    path: PathBuf,
    reader: Option<csv::Reader<File>>,
}

#[derive(Debug)]
struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl CsvDataSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reader: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn resolve_columns(headers: &csv::StringRecord) -> Result<Columns, FeedError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_ascii_lowercase()).collect();
        let find_any = |aliases: &[&str]| aliases.iter().find_map(|a| names.iter().position(|n| n == a));
        let require = |name: &'static str| names.iter().position(|n| n == name).ok_or(FeedError::MissingColumn(name));

        Ok(Columns {
            timestamp: find_any(TIMESTAMP_COLUMNS).ok_or(FeedError::MissingColumn("timestamp"))?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find_any(VOLUME_COLUMNS),
        })
    }
}

fn field<'r>(record: &'r csv::StringRecord, index: usize) -> &'r str {
    record.get(index).unwrap_or("").trim()
}

fn parse_decimal(raw: &str, row: usize, column: &'static str) -> Result<Decimal, FeedError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| FeedError::Parse {
            row,
            column,
            value: raw.to_string(),
        })
}

/// Parses the timestamp layouts seen in broker and exchange exports.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

impl DataSource for CsvDataSource {
    fn open(&mut self) -> Result<(), FeedError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&self.path)?;
        self.reader = Some(reader);
        tracing::debug!(path = %self.path.display(), "CSV data source opened");
        Ok(())
    }

    fn fetch_bars(&mut self) -> Result<Vec<Bar>, FeedError> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| FeedError::NotOpen(self.path.clone()))?;

        let columns = Self::resolve_columns(reader.headers()?)?;
        let mut bars = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let record = record?;
            // Row numbers are 1-based and count the header.
            let row = index + 2;

            let raw_ts = field(&record, columns.timestamp);
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| FeedError::Parse {
                row,
                column: "timestamp",
                value: raw_ts.to_string(),
            })?;

            let volume = match columns.volume.map(|i| field(&record, i)) {
                Some(raw) if !raw.is_empty() => parse_decimal(raw, row, "volume")?,
                _ => Decimal::ZERO,
            };

            bars.push(Bar {
                timestamp,
                open: parse_decimal(field(&record, columns.open), row, "open")?,
                high: parse_decimal(field(&record, columns.high), row, "high")?,
                low: parse_decimal(field(&record, columns.low), row, "low")?,
                close: parse_decimal(field(&record, columns.close), row, "close")?,
                volume,
            });
        }

        tracing::info!(path = %self.path.display(), bars = bars.len(), "Bars loaded from CSV");
        Ok(bars)
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            tracing::debug!(path = %self.path.display(), "CSV data source closed");
        }
    }
}
