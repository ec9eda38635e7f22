use data_feed::{CsvDataSource, DataSource, FeedError, load_bars};
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_bars_through_the_lifecycle() {
    let file = csv_file(
        "Date,Open,High,Low,Close,Volume\n\
         2024-01-02,100,101.5,99.5,101,1200\n\
         2024-01-03,101,103,100.5,102.25,900\n",
    );
    let mut source = CsvDataSource::new(file.path());
    let bars = load_bars(&mut source).unwrap();

    assert!(!source.is_open());
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].high, dec!(101.5));
    assert_eq!(bars[1].close, dec!(102.25));
    assert_eq!(bars[1].volume, dec!(900));
}

#[test]
fn volume_column_is_optional() {
    let file = csv_file("timestamp,open,high,low,close\n1704153600,1,1,1,1\n");
    let bars = load_bars(&mut CsvDataSource::new(file.path())).unwrap();
    assert_eq!(bars[0].volume, dec!(0));
}

#[test]
fn fetch_requires_open() {
    let file = csv_file("date,open,high,low,close\n");
    let mut source = CsvDataSource::new(file.path());
    assert!(matches!(source.fetch_bars(), Err(FeedError::NotOpen(_))));
}

#[test]
fn missing_price_column_fails() {
    let file = csv_file("date,open,high,low\n2024-01-02,1,1,1\n");
    assert!(matches!(
        load_bars(&mut CsvDataSource::new(file.path())),
        Err(FeedError::MissingColumn("close"))
    ));
}

#[test]
fn unparsable_value_names_row_and_column() {
    let file = csv_file("date,open,high,low,close\n2024-01-02,1,1,1,1\n2024-01-03,1,abc,1,1\n");
    match load_bars(&mut CsvDataSource::new(file.path())) {
        Err(FeedError::Parse { row, column, value }) => {
            assert_eq!(row, 3);
            assert_eq!(column, "high");
            assert_eq!(value, "abc");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_an_io_or_csv_error() {
    let mut source = CsvDataSource::new("/definitely/not/here.csv");
    assert!(matches!(source.open(), Err(FeedError::Csv(_)) | Err(FeedError::Io(_))));
}
