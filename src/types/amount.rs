use crate::types::errors::AmountError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const MAX_FRACTIONAL_DIGITS: u32 = 2;

/// A strictly positive monetary amount with at most two fractional digits.
///
/// Parsing is deliberately strict: period as the decimal separator, no
/// currency symbols, no thousands separators. Anything else is rejected
/// rather than cleaned up, so the caller can echo the raw value back.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl Display for Amount {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.is_empty() {
            return Err(AmountError::InvalidFormat("Value is an empty string".to_string()));
        }

        let decimal = Decimal::from_str(value).map_err(|error| {
            AmountError::InvalidFormat(format!("Value is not a plain decimal: {error}"))
        })?;

        if decimal.scale() > MAX_FRACTIONAL_DIGITS {
            return Err(AmountError::InvalidFormat("Value has more than two decimal places".to_string()));
        }

        if decimal <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }

        Ok(Amount(decimal))
    }
}
