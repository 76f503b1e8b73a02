use crate::core::errors::CoreError;
use crate::core::types::{Barcode, Order, OrderId};
use std::collections::HashSet;

/// A rejected field plus the reason. The upsert engine attaches the source
/// line before the issue lands in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationIssue {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Lookup over orders known at validation time: already persisted, or
/// staged earlier in the same batch.
pub trait OrderLookup {
    fn contains_order(&self, id: &str) -> bool;
}

impl OrderLookup for HashSet<OrderId> {
    fn contains_order(&self, id: &str) -> bool {
        self.contains(id)
    }
}

fn non_empty(value: &str, field: &'static str) -> Result<(), ValidationIssue> {
    match crate::core::types::require_non_empty(value, field) {
        Ok(()) => Ok(()),
        Err(CoreError::EmptyField(f)) => Err(ValidationIssue::new(f, "must not be empty")),
        Err(e) => Err(ValidationIssue::new(field, e.to_string())),
    }
}

pub fn validate_order(order: &Order) -> Result<(), ValidationIssue> {
    non_empty(&order.order_id, "order_id")?;
    non_empty(&order.customer_id, "customer_id")?;
    Ok(())
}

pub fn validate_barcode(
    barcode: &Barcode,
    orders: &impl OrderLookup,
) -> Result<(), ValidationIssue> {
    non_empty(&barcode.barcode_id, "barcode_id")?;
    non_empty(&barcode.order_id, "order_id")?;
    if !orders.contains_order(&barcode.order_id) {
        return Err(ValidationIssue::new("order_id", "unknown order"));
    }
    Ok(())
}
