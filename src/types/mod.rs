mod amount;
mod errors;
mod timestamp;

pub use amount::Amount;
pub use errors::{AmountError, TimestampError};
pub use timestamp::parse_timestamp;

pub type BusinessId = u32;
