use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::errors::StoreError;
use crate::core::types::{Barcode, BarcodeId, Order, OrderId};

/// Key-addressed persistence the engine reads and writes through. The only
/// guarantee assumed of an implementation is that a single put is atomic.
///
/// `initialized` tracks whether any ingestion ever completed against this
/// store; it is what lets queries tell "never loaded" apart from "loaded
/// zero rows".
pub trait StorageGateway {
    fn get_order(&self, id: &str) -> Result<Option<Order>, StoreError>;
    fn put_order(&mut self, order: Order) -> Result<(), StoreError>;
    fn scan_orders(&self) -> Result<Vec<Order>, StoreError>;
    fn orders_empty(&self) -> Result<bool, StoreError>;

    fn get_barcode(&self, id: &str) -> Result<Option<Barcode>, StoreError>;
    fn put_barcode(&mut self, barcode: Barcode) -> Result<(), StoreError>;
    fn scan_barcodes(&self) -> Result<Vec<Barcode>, StoreError>;
    fn barcodes_empty(&self) -> Result<bool, StoreError>;

    fn initialized(&self) -> Result<bool, StoreError>;
    fn mark_initialized(&mut self) -> Result<(), StoreError>;

    /// Operator escape hatch used by `load --truncate`; the upsert path
    /// itself never deletes.
    fn truncate(&mut self) -> Result<(), StoreError>;
}

/// In-memory gateway. `BTreeMap` keeps scans key-ordered, so reads off this
/// store are deterministic without extra sorting.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    orders: BTreeMap<OrderId, Order>,
    barcodes: BTreeMap<BarcodeId, Barcode>,
    initialized: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageGateway for MemoryStore {
    fn get_order(&self, id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.get(id).cloned())
    }

    fn put_order(&mut self, order: Order) -> Result<(), StoreError> {
        self.orders.insert(order.order_id.clone(), order);
        Ok(())
    }

    fn scan_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.values().cloned().collect())
    }

    fn orders_empty(&self) -> Result<bool, StoreError> {
        Ok(self.orders.is_empty())
    }

    fn get_barcode(&self, id: &str) -> Result<Option<Barcode>, StoreError> {
        Ok(self.barcodes.get(id).cloned())
    }

    fn put_barcode(&mut self, barcode: Barcode) -> Result<(), StoreError> {
        self.barcodes.insert(barcode.barcode_id.clone(), barcode);
        Ok(())
    }

    fn scan_barcodes(&self) -> Result<Vec<Barcode>, StoreError> {
        Ok(self.barcodes.values().cloned().collect())
    }

    fn barcodes_empty(&self) -> Result<bool, StoreError> {
        Ok(self.barcodes.is_empty())
    }

    fn initialized(&self) -> Result<bool, StoreError> {
        Ok(self.initialized)
    }

    fn mark_initialized(&mut self) -> Result<(), StoreError> {
        self.initialized = true;
        Ok(())
    }

    fn truncate(&mut self) -> Result<(), StoreError> {
        self.orders.clear();
        self.barcodes.clear();
        Ok(())
    }
}
