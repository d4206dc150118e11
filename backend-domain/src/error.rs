use thiserror::Error;

// SchemaError is the only error that crosses the analysis boundary; it
// fires at the header gate, before any row is processed.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("input must have columns: timestamp, user_id, action (found: {found:?})")]
    ColumnMismatch { found: Vec<String> },
    #[error("failed to read header row: {0}")]
    Header(#[from] csv::Error),
}

// Per-row failure, recovered by the orchestrator: the row still counts
// toward totals but never reaches the window tracker.
#[derive(Debug, Error)]
#[error("unparseable timestamp '{raw}'")]
pub struct TimestampParseError {
    pub raw: String,
}
