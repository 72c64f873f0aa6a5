use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmountError {
    #[error("Amount error: {0}")]
    InvalidFormat(String),
    #[error("Amount error: value must be positive")]
    NotPositive
}

#[derive(Debug, Error)]
#[error("Timestamp error: no accepted format matched")]
pub struct TimestampError;
