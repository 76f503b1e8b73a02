use csv::StringRecord;

use crate::core::errors::{CoreError, IngestError, RowError};
use crate::core::types::{
    parse_order_date, parse_used_flag, require_non_empty, Barcode, Order,
};
use crate::io::{RecordSource, RowEvent};

/// A record type with a fixed CSV schema: ordered required columns plus the
/// coercion from one raw row.
pub trait CsvRecord: Sized {
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &StringRecord) -> Result<Self, CoreError>;
}

fn field<'r>(row: &'r StringRecord, idx: usize) -> &'r str {
    row.get(idx).unwrap_or("")
}

impl CsvRecord for Order {
    const COLUMNS: &'static [&'static str] = &["order_id", "customer_id", "order_date"];

    fn from_row(row: &StringRecord) -> Result<Self, CoreError> {
        let order_id = field(row, 0);
        let customer_id = field(row, 1);
        let date_raw = field(row, 2);
        require_non_empty(order_id, "order_id")?;
        require_non_empty(customer_id, "customer_id")?;
        require_non_empty(date_raw, "order_date")?;
        Ok(Order {
            order_id: order_id.to_string(),
            customer_id: customer_id.to_string(),
            order_date: parse_order_date(date_raw)?,
        })
    }
}

impl CsvRecord for Barcode {
    const COLUMNS: &'static [&'static str] = &["barcode_id", "order_id", "used"];

    fn from_row(row: &StringRecord) -> Result<Self, CoreError> {
        let barcode_id = field(row, 0);
        let order_id = field(row, 1);
        let used_raw = field(row, 2);
        require_non_empty(barcode_id, "barcode_id")?;
        require_non_empty(order_id, "order_id")?;
        require_non_empty(used_raw, "used")?;
        Ok(Barcode {
            barcode_id: barcode_id.to_string(),
            order_id: order_id.to_string(),
            used: parse_used_flag(used_raw)?,
        })
    }
}

pub struct CsvIngester;

impl CsvIngester {
    /// The header is checked eagerly: a missing, extra or reordered column
    /// means no per-row recovery is meaningful, so the whole file is
    /// rejected. Everything after that surfaces as row events.
    pub fn rows<'a, T: CsvRecord + 'a>(
        &self,
        src: RecordSource<'a>,
    ) -> Result<impl Iterator<Item = RowEvent<T>> + 'a, IngestError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(src.reader);

        let headers = rdr.headers().map_err(|e| IngestError::Read {
            file: src.label.clone(),
            reason: e.to_string(),
        })?;

        if !headers.iter().eq(T::COLUMNS.iter().copied()) {
            return Err(IngestError::Schema {
                file: src.label,
                expected: T::COLUMNS.join(","),
                found: headers.iter().collect::<Vec<_>>().join(","),
            });
        }

        let iter = rdr.into_records().map(|res| match res {
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                let reason = match e.kind() {
                    csv::ErrorKind::UnequalLengths { expected_len, len, .. } => {
                        format!("expected {expected_len} fields, found {len}")
                    }
                    _ => e.to_string(),
                };
                RowEvent::Bad(RowError::Parse { line, reason })
            }
            Ok(record) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                match T::from_row(&record) {
                    Ok(parsed) => RowEvent::Record {
                        line,
                        record: parsed,
                    },
                    Err(e) => RowEvent::Bad(RowError::Parse {
                        line,
                        reason: e.to_string(),
                    }),
                }
            }
        });

        Ok(iter)
    }
}
