use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::errors::RowViolation;
use crate::types::{parse_timestamp, Amount};

/// Raw column values for a single data row, before validation.
///
/// Field names mirror the CSV column contract exactly; optional columns that
/// are absent from the file deserialize to `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRow {
    pub transaction_id: Option<String>,
    pub timestamp: Option<String>,
    pub amount: Option<String>,
    pub description: Option<String>,
    pub customer_id: Option<String>,
    pub payment_method: Option<String>
}

/// A fully validated transaction, ready for the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTransaction {
    pub transaction_id: String,
    pub timestamp: NaiveDateTime,
    pub amount: Amount,
    pub description: String,
    pub customer_id: Option<String>,
    pub payment_method: Option<String>
}

impl ParsedTransaction {
    /// Validates one raw row, field by field in contract order.
    ///
    /// The first failing field wins: later fields of the same row are not
    /// inspected once a violation is found.
    ///
    /// # Errors
    /// Returns `RowViolation` if:
    /// - The timestamp matches none of the accepted formats.
    /// - The amount is not a positive decimal with at most two places.
    /// - The description is missing or blank.
    pub fn from_row(row: &RawRow) -> Result<Self, RowViolation> {
        let raw_timestamp = row.timestamp.as_deref().unwrap_or("");
        let timestamp = parse_timestamp(raw_timestamp)
            .map_err(|_| RowViolation::timestamp_unparseable(raw_timestamp))?;

        let raw_amount = row.amount.as_deref().unwrap_or("");
        let amount = Amount::from_str(raw_amount)
            .map_err(|_| RowViolation::amount_unparseable(raw_amount))?;

        let description = row.description.as_deref().unwrap_or("").trim();

        if description.is_empty() {
            return Err(RowViolation::DescriptionMissing);
        }

        let transaction_id = match row.transaction_id.as_deref().map(str::trim) {
            Some(provided) if !provided.is_empty() => provided.to_string(),
            _ => Uuid::new_v4().to_string()
        };

        Ok(Self {
            transaction_id,
            timestamp,
            amount,
            description: description.to_string(),
            customer_id: normalize_optional(row.customer_id.as_deref()),
            payment_method: normalize_optional(row.payment_method.as_deref())
        })
    }
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}
