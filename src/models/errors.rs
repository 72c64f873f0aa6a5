use thiserror::Error;
use tokio::task::JoinError;

/// Failures fatal to the whole upload. No rows are imported once one of
/// these is raised.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported file type for '{file_name}': only .csv uploads are accepted")]
    UnsupportedFileType {
        file_name: String
    },
    #[error("File is {size} bytes which exceeds the {max} byte limit")]
    FileTooLarge {
        size: usize,
        max: usize
    },
    #[error("File has {rows} data rows which exceeds the {max} row limit")]
    TooManyRows {
        rows: usize,
        max: usize
    },
    #[error("Missing required columns: {}", columns.join(", "))]
    MissingColumns {
        columns: Vec<String>
    },
    #[error("File is not readable as CSV: {0}")]
    UnreadableCsv(String),
    #[error("Ingestion worker failed: {0}")]
    Worker(#[from] JoinError)
}

impl From<csv::Error> for UploadError {
    fn from(error: csv::Error) -> Self {
        Self::UnreadableCsv(error.to_string())
    }
}

/// Per-row validation failures. These are recovered locally: the offending
/// row is skipped and the batch continues.
#[derive(Debug, Error)]
pub enum RowViolation {
    #[error("Could not parse date: '{raw}'")]
    TimestampUnparseable {
        raw: String
    },
    /// Covers every failure of the amount step: unparseable text, too many
    /// decimal places, and non-positive values all report the same way.
    #[error("Invalid number format: '{raw}'")]
    AmountUnparseable {
        raw: String
    },
    #[error("Description must not be empty")]
    DescriptionMissing,
    #[error("Duplicate transaction id '{transaction_id}'")]
    DuplicateTransactionId {
        transaction_id: String
    }
}

impl RowViolation {
    pub fn timestamp_unparseable(raw: &str) -> Self {
        Self::TimestampUnparseable { raw: raw.to_string() }
    }

    pub fn amount_unparseable(raw: &str) -> Self {
        Self::AmountUnparseable { raw: raw.to_string() }
    }

    pub fn duplicate_transaction_id(transaction_id: &str) -> Self {
        Self::DuplicateTransactionId { transaction_id: transaction_id.to_string() }
    }

    /// The CSV column this violation is attributed to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::TimestampUnparseable { .. } => "timestamp",
            Self::AmountUnparseable { .. } => "amount",
            Self::DescriptionMissing => "description",
            Self::DuplicateTransactionId { .. } => "transaction_id"
        }
    }

    /// Duplicates are skips without an error entry: the stored row is
    /// preserved and only `skipped_count` moves.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::DuplicateTransactionId { .. })
    }
}
