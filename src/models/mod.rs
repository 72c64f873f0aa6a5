mod errors;
mod report;
mod request;
mod transaction;

pub use errors::{RowViolation, UploadError};
pub use report::{ImportResult, RowError};
pub use request::UploadRequest;
pub use transaction::{ParsedTransaction, RawRow};

/// Columns every upload must carry, matched case-sensitively against the
/// header row.
pub const REQUIRED_COLUMNS: [&str; 3] = ["timestamp", "amount", "description"];
