// Activity record entity
// One row of uploaded activity data, fields kept as raw strings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub timestamp: String,
    pub user_id: String,
    pub action: String,
}
