use std::collections::HashSet;

use tracing::{info, warn};

use crate::core::errors::{IngestError, RowError};
use crate::core::types::{Barcode, Order, OrderId};
use crate::core::validate::{validate_barcode, validate_order, ValidationIssue};
use crate::engine::report::{FileReport, IngestReport};
use crate::engine::store::StorageGateway;
use crate::io::{CsvIngester, RecordSource, RowEvent};

/// Write path of the store: parse, validate, merge. Holds an explicit
/// gateway handle; there is no process-wide store.
pub struct UpsertEngine<'a, S: StorageGateway> {
    store: &'a mut S,
}

fn validation_error(line: u64, issue: ValidationIssue) -> RowError {
    RowError::Validation {
        line,
        field: issue.field,
        reason: issue.reason,
    }
}

fn reject(report: &mut FileReport, error: RowError) {
    warn!(file = %report.file, line = error.line(), %error, "row rejected");
    report.reject(error);
}

impl<'a, S: StorageGateway> UpsertEngine<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Establish a clean baseline. Refuses a non-empty store rather than
    /// silently merging; truncation is an explicit operator decision taken
    /// before this call.
    pub fn load(
        &mut self,
        orders: RecordSource<'_>,
        barcodes: RecordSource<'_>,
    ) -> Result<IngestReport, IngestError> {
        if !self.store.orders_empty()? {
            return Err(IngestError::StoreNotEmpty { entity: "order" });
        }
        if !self.store.barcodes_empty()? {
            return Err(IngestError::StoreNotEmpty { entity: "barcode" });
        }
        self.run(orders, barcodes)
    }

    /// Idempotent merge into an existing store. A known natural key is
    /// skipped when the row is identical and overwritten when it differs;
    /// "already exists" is never an error by itself.
    pub fn append(
        &mut self,
        orders: RecordSource<'_>,
        barcodes: RecordSource<'_>,
    ) -> Result<IngestReport, IngestError> {
        self.run(orders, barcodes)
    }

    fn run(
        &mut self,
        orders_src: RecordSource<'_>,
        barcodes_src: RecordSource<'_>,
    ) -> Result<IngestReport, IngestError> {
        let mut orders_report = FileReport::new(orders_src.label.clone());
        let mut barcodes_report = FileReport::new(barcodes_src.label.clone());

        // Both headers are checked before the first write, so a schema
        // mismatch in either file aborts with nothing persisted.
        let order_rows = CsvIngester.rows::<Order>(orders_src)?;
        let barcode_rows = CsvIngester.rows::<Barcode>(barcodes_src)?;

        // Orders go first; barcode validation resolves order ids against
        // this snapshot (persisted rows plus everything staged below).
        let mut known: HashSet<OrderId> = self
            .store
            .scan_orders()?
            .into_iter()
            .map(|o| o.order_id)
            .collect();

        for event in order_rows {
            match event {
                RowEvent::Bad(error) => reject(&mut orders_report, error),
                RowEvent::Record { line, record } => {
                    if let Err(issue) = validate_order(&record) {
                        reject(&mut orders_report, validation_error(line, issue));
                        continue;
                    }
                    known.insert(record.order_id.clone());
                    match self.store.get_order(&record.order_id)? {
                        None => {
                            self.store.put_order(record)?;
                            orders_report.accepted += 1;
                        }
                        Some(existing) if existing == record => orders_report.skipped += 1,
                        Some(_) => {
                            self.store.put_order(record)?;
                            orders_report.updated += 1;
                        }
                    }
                }
            }
        }

        for event in barcode_rows {
            match event {
                RowEvent::Bad(error) => reject(&mut barcodes_report, error),
                RowEvent::Record { line, record } => {
                    if let Err(issue) = validate_barcode(&record, &known) {
                        reject(&mut barcodes_report, validation_error(line, issue));
                        continue;
                    }
                    match self.store.get_barcode(&record.barcode_id)? {
                        None => {
                            self.store.put_barcode(record)?;
                            barcodes_report.accepted += 1;
                        }
                        Some(existing) if existing == record => barcodes_report.skipped += 1,
                        Some(_) => {
                            self.store.put_barcode(record)?;
                            barcodes_report.updated += 1;
                        }
                    }
                }
            }
        }

        self.store.mark_initialized()?;

        for report in [&orders_report, &barcodes_report] {
            info!(
                file = %report.file,
                accepted = report.accepted,
                updated = report.updated,
                skipped = report.skipped,
                rejected = report.rejected,
                "ingest complete"
            );
        }

        Ok(IngestReport {
            orders: orders_report,
            barcodes: barcodes_report,
        })
    }
}
