use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::errors::StoreError;
use crate::core::types::{Barcode, Order};
use crate::engine::store::{MemoryStore, StorageGateway};

/// Snapshot-file gateway: the whole table set lives in one JSON document,
/// read once on open. A missing file is an empty, never-initialized store.
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = if path.exists() {
            let file = File::open(&path)?;
            serde_json::from_reader(BufReader::new(file))
                .map_err(|e| StoreError::Serialization(e.to_string()))?
        } else {
            MemoryStore::new()
        };
        Ok(Self { path, inner })
    }

    /// Rewrite the snapshot: written to a sibling temp file first, then
    /// renamed into place.
    pub fn persist(&self) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("tmp");
        let mut out = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut out, &self.inner)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        out.flush()?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "persisted store snapshot");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageGateway for FileStore {
    fn get_order(&self, id: &str) -> Result<Option<Order>, StoreError> {
        self.inner.get_order(id)
    }

    fn put_order(&mut self, order: Order) -> Result<(), StoreError> {
        self.inner.put_order(order)
    }

    fn scan_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.inner.scan_orders()
    }

    fn orders_empty(&self) -> Result<bool, StoreError> {
        self.inner.orders_empty()
    }

    fn get_barcode(&self, id: &str) -> Result<Option<Barcode>, StoreError> {
        self.inner.get_barcode(id)
    }

    fn put_barcode(&mut self, barcode: Barcode) -> Result<(), StoreError> {
        self.inner.put_barcode(barcode)
    }

    fn scan_barcodes(&self) -> Result<Vec<Barcode>, StoreError> {
        self.inner.scan_barcodes()
    }

    fn barcodes_empty(&self) -> Result<bool, StoreError> {
        self.inner.barcodes_empty()
    }

    fn initialized(&self) -> Result<bool, StoreError> {
        self.inner.initialized()
    }

    fn mark_initialized(&mut self) -> Result<(), StoreError> {
        self.inner.mark_initialized()
    }

    fn truncate(&mut self) -> Result<(), StoreError> {
        self.inner.truncate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn order(id: &str) -> Order {
        Order {
            order_id: id.to_string(),
            customer_id: "C1".to_string(),
            order_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn missing_file_opens_as_uninitialized_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("tickets.json")).unwrap();
        assert!(store.orders_empty().unwrap());
        assert!(!store.initialized().unwrap());
    }

    #[test]
    fn persist_then_reopen_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tickets.json");

        let mut store = FileStore::open(&path).unwrap();
        store.put_order(order("O1")).unwrap();
        store
            .put_barcode(Barcode {
                barcode_id: "B1".to_string(),
                order_id: "O1".to_string(),
                used: true,
            })
            .unwrap();
        store.mark_initialized().unwrap();
        store.persist().unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.initialized().unwrap());
        assert_eq!(reopened.scan_orders().unwrap().len(), 1);
        assert!(reopened.get_barcode("B1").unwrap().unwrap().used);
    }

    #[test]
    fn persist_replaces_the_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tickets.json");

        let mut store = FileStore::open(&path).unwrap();
        store.put_order(order("O1")).unwrap();
        store.persist().unwrap();

        store.truncate().unwrap();
        store.put_order(order("O2")).unwrap();
        store.persist().unwrap();

        let reopened = FileStore::open(&path).unwrap();
        let ids: Vec<_> = reopened
            .scan_orders()
            .unwrap()
            .into_iter()
            .map(|o| o.order_id)
            .collect();
        assert_eq!(ids, ["O2"]);
    }
}
