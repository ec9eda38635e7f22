use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Data source {0} is not open")]
    NotOpen(PathBuf),

    #[error("Required column '{0}' is missing from the header")]
    MissingColumn(&'static str),

    #[error("Failed to read data source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: cannot parse {column} value '{value}'")]
    Parse {
        row: usize,
        column: &'static str,
        value: String,
    },
}
