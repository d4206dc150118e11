use std::io::Read;

use crate::entities::ActivityRecord;
use crate::error::SchemaError;

// The exact column set an upload must carry; order in the file is free.
pub const REQUIRED_COLUMNS: [&str; 3] = ["timestamp", "user_id", "action"];

/// Lazy, single-pass row source over uploaded CSV text. The header is
/// validated once at construction; no row is ever yielded from an upload
/// whose column set is wrong. Field values pass through as raw strings,
/// timestamps included.
pub struct CsvRowSource<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    timestamp_idx: usize,
    user_idx: usize,
    action_idx: usize,
}

impl<R: Read> std::fmt::Debug for CsvRowSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvRowSource")
            .field("timestamp_idx", &self.timestamp_idx)
            .field("user_idx", &self.user_idx)
            .field("action_idx", &self.action_idx)
            .finish_non_exhaustive()
    }
}

impl<R: Read> CsvRowSource<R> {
    pub fn new(reader: R) -> Result<Self, SchemaError> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let found: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|column| column.trim().to_string())
            .collect();

        let mut sorted: Vec<&str> = found.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        let mut expected = REQUIRED_COLUMNS;
        expected.sort_unstable();
        if sorted != expected {
            return Err(SchemaError::ColumnMismatch { found });
        }

        let timestamp_idx = column_index(&found, "timestamp")?;
        let user_idx = column_index(&found, "user_id")?;
        let action_idx = column_index(&found, "action")?;

        Ok(Self {
            records: csv_reader.into_records(),
            timestamp_idx,
            user_idx,
            action_idx,
        })
    }
}

fn column_index(columns: &[String], name: &str) -> Result<usize, SchemaError> {
    columns
        .iter()
        .position(|column| column == name)
        .ok_or_else(|| SchemaError::ColumnMismatch {
            found: columns.to_vec(),
        })
}

impl<R: Read> Iterator for CsvRowSource<R> {
    type Item = Result<ActivityRecord, csv::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(err) => return Some(Err(err)),
        };
        Some(Ok(ActivityRecord {
            timestamp: record.get(self.timestamp_idx).unwrap_or("").to_string(),
            user_id: record.get(self.user_idx).unwrap_or("").to_string(),
            action: record.get(self.action_idx).unwrap_or("").to_string(),
        }))
    }
}
