use serde::{Deserialize, Serialize};

use crate::models::errors::RowViolation;

/// One rejected row. A row produces at most one error entry; the first
/// failing field wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based data row index; the header row is not counted.
    pub row: u32,
    pub field: String,
    pub message: String
}

impl RowError {
    pub fn new(row: u32, violation: &RowViolation) -> Self {
        Self {
            row,
            field: violation.field().to_string(),
            message: violation.to_string()
        }
    }
}

/// The outcome of one upload, emitted exactly once after every data row has
/// been visited. Serializes to the JSON shape of the upload endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub imported_count: u32,
    pub skipped_count: u32,
    /// Ordered by row index ascending. Duplicate transaction ids are counted
    /// in `skipped_count` but produce no entry here.
    pub errors: Vec<RowError>
}
