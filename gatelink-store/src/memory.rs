/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! In-memory tick store implementation.
//!
//! This module provides a simple in-memory store suitable for testing and
//! for runs that don't need ticks to outlive the process.

use crate::traits::{TickRecord, TickStore};
use async_trait::async_trait;
use gatelink_core::error::StoreError;
use gatelink_core::types::TickerId;
use parking_lot::RwLock;
use std::collections::VecDeque;

/// In-memory tick store.
///
/// Records are kept in arrival order. Not persistent.
#[derive(Debug, Default)]
pub struct MemoryTickStore {
    /// Stored records.
    records: RwLock<VecDeque<TickRecord>>,
    /// Maximum number of records kept; oldest are evicted first.
    capacity: Option<usize>,
}

impl MemoryTickStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that keeps at most `capacity` records.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of records retained
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity: Some(capacity),
        }
    }

    /// Returns a copy of all stored records.
    #[must_use]
    pub fn records(&self) -> Vec<TickRecord> {
        self.records.read().iter().cloned().collect()
    }

    /// Returns the records of one subscription.
    #[must_use]
    pub fn for_ticker(&self, ticker_id: TickerId) -> Vec<TickRecord> {
        self.records
            .read()
            .iter()
            .filter(|record| record.ticker_id == ticker_id)
            .cloned()
            .collect()
    }

    /// Returns the most recent record.
    #[must_use]
    pub fn last(&self) -> Option<TickRecord> {
        self.records.read().back().cloned()
    }

    /// Removes all records.
    pub fn clear(&self) {
        self.records.write().clear();
    }
}

#[async_trait]
impl TickStore for MemoryTickStore {
    async fn insert(&self, record: &TickRecord) -> Result<(), StoreError> {
        let mut records = self.records.write();
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return Ok(());
            }
            while records.len() >= capacity {
                records.pop_front();
            }
        }
        records.push_back(record.clone());
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatelink_core::types::{TickField, Timestamp};
    use rust_decimal::Decimal;

    fn price(ticker: i64, value: f64, millis: i64) -> TickRecord {
        TickRecord::price(
            TickerId::new(ticker),
            TickField::LAST,
            value,
            Timestamp::from_millis(millis),
        )
    }

    #[tokio::test]
    async fn test_memory_store_new() {
        let store = MemoryTickStore::new();
        assert!(store.is_empty());
        assert!(store.last().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_insert_and_query() {
        let store = MemoryTickStore::new();

        store.insert(&price(1, 10.0, 1)).await.unwrap();
        store.insert(&price(2, 20.0, 2)).await.unwrap();
        store
            .insert(&TickRecord::size(
                TickerId::new(1),
                TickField::LAST_SIZE,
                Decimal::from(5),
                Timestamp::from_millis(3),
            ))
            .await
            .unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.for_ticker(TickerId::new(1)).len(), 2);
        assert_eq!(store.last().unwrap().size, Some(Decimal::from(5)));
    }

    #[tokio::test]
    async fn test_memory_store_capacity_evicts_oldest() {
        let store = MemoryTickStore::with_capacity(2);

        store.insert(&price(1, 1.0, 1)).await.unwrap();
        store.insert(&price(1, 2.0, 2)).await.unwrap();
        store.insert(&price(1, 3.0, 3)).await.unwrap();

        let prices: Vec<_> = store.records().iter().filter_map(|r| r.price).collect();
        assert_eq!(prices, vec![2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_memory_store_keeps_window_under_load() {
        let store = MemoryTickStore::with_capacity(3);
        for i in 0..10 {
            store.insert(&price(1, f64::from(i), i64::from(i))).await.unwrap();
        }

        assert_eq!(store.len(), 3);
        let prices: Vec<_> = store.records().iter().filter_map(|r| r.price).collect();
        assert_eq!(prices, vec![7.0, 8.0, 9.0]);
        assert_eq!(store.last().unwrap().price, Some(9.0));

        let empty = MemoryTickStore::with_capacity(0);
        empty.insert(&price(1, 1.0, 1)).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_clear() {
        let store = MemoryTickStore::new();
        store.insert(&price(1, 1.0, 1)).await.unwrap();
        store.clear();
        assert_eq!(store.len(), 0);
    }
}
