use std::collections::HashMap;

use crate::core::errors::{QueryError, StoreError};
use crate::core::types::{BarcodeId, CustomerId, OrderId};
use crate::engine::store::StorageGateway;

/// Read path of the store. Every operation refuses to answer before the
/// first successful ingestion, which is a different thing from answering
/// zero on a populated-but-empty store.
pub struct QueryEngine<'a, S: StorageGateway> {
    store: &'a S,
}

/// A barcode with its owning order's customer joined in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeRow {
    pub barcode_id: BarcodeId,
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub used: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRank {
    pub customer_id: CustomerId,
    pub tickets: u64,
}

impl<'a, S: StorageGateway> QueryEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn ensure_loaded(&self) -> Result<(), QueryError> {
        if self.store.initialized()? {
            Ok(())
        } else {
            Err(QueryError::DataNotLoaded)
        }
    }

    fn customers_by_order(&self) -> Result<HashMap<OrderId, CustomerId>, QueryError> {
        Ok(self
            .store
            .scan_orders()?
            .into_iter()
            .map(|o| (o.order_id, o.customer_id))
            .collect())
    }

    /// Every barcode, ordered by `barcode_id` ascending. A barcode whose
    /// order is gone means the store broke its own invariant; that is a
    /// storage error, not a row to skip.
    pub fn list_barcodes(&self) -> Result<Vec<BarcodeRow>, QueryError> {
        self.ensure_loaded()?;
        let customers = self.customers_by_order()?;

        let mut rows = Vec::new();
        for barcode in self.store.scan_barcodes()? {
            let customer_id = customers
                .get(&barcode.order_id)
                .cloned()
                .ok_or_else(|| StoreError::Missing {
                    entity: "order",
                    key: barcode.order_id.clone(),
                })?;
            rows.push(BarcodeRow {
                barcode_id: barcode.barcode_id,
                order_id: barcode.order_id,
                customer_id,
                used: barcode.used,
            });
        }
        rows.sort_by(|a, b| a.barcode_id.cmp(&b.barcode_id));
        Ok(rows)
    }

    /// Customers ranked by barcode count, descending; ties broken by
    /// ascending `customer_id`. `n` past the number of distinct customers
    /// returns all of them, no padding.
    pub fn top_customers(&self, n: usize) -> Result<Vec<CustomerRank>, QueryError> {
        self.ensure_loaded()?;
        let customers = self.customers_by_order()?;

        let mut counts: HashMap<CustomerId, u64> = HashMap::new();
        for barcode in self.store.scan_barcodes()? {
            let customer = customers
                .get(&barcode.order_id)
                .ok_or_else(|| StoreError::Missing {
                    entity: "order",
                    key: barcode.order_id.clone(),
                })?;
            *counts.entry(customer.clone()).or_default() += 1;
        }

        let mut ranked: Vec<CustomerRank> = counts
            .into_iter()
            .map(|(customer_id, tickets)| CustomerRank {
                customer_id,
                tickets,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.tickets
                .cmp(&a.tickets)
                .then_with(|| a.customer_id.cmp(&b.customer_id))
        });
        ranked.truncate(n);
        Ok(ranked)
    }

    pub fn unused_barcodes_count(&self) -> Result<u64, QueryError> {
        self.ensure_loaded()?;
        let unused = self
            .store
            .scan_barcodes()?
            .into_iter()
            .filter(|b| !b.used)
            .count();
        Ok(unused as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Barcode, Order};
    use crate::engine::store::MemoryStore;
    use chrono::NaiveDate;

    fn seed(orders: &[(&str, &str)], barcodes: &[(&str, &str, bool)]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for (order_id, customer_id) in orders {
            store
                .put_order(Order {
                    order_id: order_id.to_string(),
                    customer_id: customer_id.to_string(),
                    order_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                })
                .unwrap();
        }
        for (barcode_id, order_id, used) in barcodes {
            store
                .put_barcode(Barcode {
                    barcode_id: barcode_id.to_string(),
                    order_id: order_id.to_string(),
                    used: *used,
                })
                .unwrap();
        }
        store.mark_initialized().unwrap();
        store
    }

    #[test]
    fn queries_fail_before_first_ingestion() {
        let store = MemoryStore::new();
        let queries = QueryEngine::new(&store);
        assert!(matches!(
            queries.unused_barcodes_count(),
            Err(QueryError::DataNotLoaded)
        ));
        assert!(matches!(
            queries.list_barcodes(),
            Err(QueryError::DataNotLoaded)
        ));
        assert!(matches!(
            queries.top_customers(5),
            Err(QueryError::DataNotLoaded)
        ));
    }

    #[test]
    fn populated_but_empty_store_answers_zero() {
        let store = seed(&[], &[]);
        let queries = QueryEngine::new(&store);
        assert_eq!(queries.unused_barcodes_count().unwrap(), 0);
        assert!(queries.list_barcodes().unwrap().is_empty());
        assert!(queries.top_customers(5).unwrap().is_empty());
    }

    #[test]
    fn scenario_from_the_operator_runbook() {
        let store = seed(
            &[("O1", "C1"), ("O2", "C2")],
            &[("B1", "O1", false), ("B2", "O1", true), ("B3", "O2", false)],
        );
        let queries = QueryEngine::new(&store);

        assert_eq!(queries.unused_barcodes_count().unwrap(), 2);

        let top = queries.top_customers(1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].customer_id, "C1");
        assert_eq!(top[0].tickets, 2);
    }

    #[test]
    fn barcodes_come_back_sorted_with_customer_joined() {
        let store = seed(
            &[("O1", "C1"), ("O2", "C2")],
            &[("B3", "O2", false), ("B1", "O1", false), ("B2", "O1", true)],
        );
        let rows = QueryEngine::new(&store).list_barcodes().unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.barcode_id.as_str()).collect();
        assert_eq!(ids, ["B1", "B2", "B3"]);
        assert_eq!(rows[0].customer_id, "C1");
        assert_eq!(rows[2].customer_id, "C2");
    }

    #[test]
    fn top_customers_ties_break_by_ascending_customer_id() {
        let store = seed(
            &[("O1", "C2"), ("O2", "C1"), ("O3", "C3")],
            &[
                ("B1", "O1", false),
                ("B2", "O2", false),
                ("B3", "O3", false),
                ("B4", "O3", false),
            ],
        );
        let top = QueryEngine::new(&store).top_customers(3).unwrap();
        let order: Vec<_> = top.iter().map(|r| r.customer_id.as_str()).collect();
        assert_eq!(order, ["C3", "C1", "C2"]);
    }

    #[test]
    fn top_customers_boundaries() {
        let store = seed(
            &[("O1", "C1"), ("O2", "C2")],
            &[("B1", "O1", false), ("B2", "O2", false)],
        );
        let queries = QueryEngine::new(&store);
        assert!(queries.top_customers(0).unwrap().is_empty());
        assert_eq!(queries.top_customers(10).unwrap().len(), 2);
    }

    #[test]
    fn repeated_calls_return_the_identical_ranking() {
        let store = seed(
            &[("O1", "C1"), ("O2", "C2"), ("O3", "C3")],
            &[
                ("B1", "O1", false),
                ("B2", "O2", true),
                ("B3", "O3", false),
            ],
        );
        let queries = QueryEngine::new(&store);
        assert_eq!(
            queries.top_customers(3).unwrap(),
            queries.top_customers(3).unwrap()
        );
    }

    #[test]
    fn orphaned_barcode_is_a_storage_error() {
        let mut store = seed(&[("O1", "C1")], &[("B1", "O1", false)]);
        store
            .put_barcode(Barcode {
                barcode_id: "B9".to_string(),
                order_id: "O-gone".to_string(),
                used: false,
            })
            .unwrap();
        let err = QueryEngine::new(&store).list_barcodes().unwrap_err();
        assert!(matches!(err, QueryError::Storage(StoreError::Missing { .. })));
    }

    #[test]
    fn customers_without_barcodes_do_not_rank() {
        let store = seed(&[("O1", "C1"), ("O2", "C2")], &[("B1", "O1", false)]);
        let top = QueryEngine::new(&store).top_customers(5).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].customer_id, "C1");
    }
}
