use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::errors::CoreError;

pub type OrderId = String;
pub type CustomerId = String;
pub type BarcodeId = String;

/// One customer purchase event. `order_id` is the natural key used for
/// uniqueness and merge decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub order_date: NaiveDate,
}

/// One admission ticket instance. `barcode_id` is the natural key;
/// `order_id` must reference a known order when the row is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barcode {
    pub barcode_id: BarcodeId,
    pub order_id: OrderId,
    pub used: bool,
}

pub fn parse_order_date(s: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::ParseDate(s.trim().to_string()))
}

/// Redemption flag column. Extracts vary in spelling, so accept the common
/// ones but never guess: anything else is a parse failure.
pub fn parse_used_flag(s: &str) -> Result<bool, CoreError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(CoreError::ParseFlag(other.to_string())),
    }
}

pub fn require_non_empty(value: &str, field: &'static str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::EmptyField(field));
    }
    Ok(())
}
