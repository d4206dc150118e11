// Analysis report entity
// The value returned by one analysis pass; never stored server-side

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCount {
    pub user_id: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityReport {
    pub generated_at: DateTime<Utc>,
    pub rows_processed: u64,
    pub rows_skipped: u64,
    // count descending, ties in first-appearance order
    pub top_users: Vec<UserCount>,
    // sorted ascending for display
    pub flagged_users: Vec<String>,
}
