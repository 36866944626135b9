/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tick store trait definition.
//!
//! This module defines the persisted tick record and the abstract interface
//! for tick storage implementations.

use async_trait::async_trait;
use gatelink_core::error::StoreError;
use gatelink_core::types::{TickField, TickerId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One market-data tick as persisted.
///
/// Exactly one of `price` and `size` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    /// Subscription the tick belongs to.
    pub ticker_id: TickerId,
    /// Tick field code.
    pub field: TickField,
    /// Price, for price ticks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Size, for size ticks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Decimal>,
    /// Receive time in milliseconds since the Unix epoch.
    #[serde(rename = "timestamp_ms")]
    pub timestamp: Timestamp,
}

impl TickRecord {
    /// Creates a price record.
    #[must_use]
    pub const fn price(
        ticker_id: TickerId,
        field: TickField,
        price: f64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            ticker_id,
            field,
            price: Some(price),
            size: None,
            timestamp,
        }
    }

    /// Creates a size record.
    #[must_use]
    pub const fn size(
        ticker_id: TickerId,
        field: TickField,
        size: Decimal,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            ticker_id,
            field,
            price: None,
            size: Some(size),
            timestamp,
        }
    }
}

/// Abstract interface for tick storage.
///
/// Implementations are driven from the recorder's worker thread, never from
/// the session's poll loop.
#[async_trait]
pub trait TickStore: Send + Sync {
    /// Persists one tick.
    ///
    /// # Arguments
    /// * `record` - The tick to store
    ///
    /// # Errors
    /// Returns `StoreError` if the record cannot be stored.
    async fn insert(&self, record: &TickRecord) -> Result<(), StoreError>;

    /// Returns the number of records stored so far.
    fn len(&self) -> usize;

    /// Returns true if nothing has been stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flushes buffered records to durable storage.
    ///
    /// # Errors
    /// Returns `StoreError` if the flush fails.
    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl<S: TickStore + ?Sized> TickStore for Arc<S> {
    async fn insert(&self, record: &TickRecord) -> Result<(), StoreError> {
        (**self).insert(record).await
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    async fn flush(&self) -> Result<(), StoreError> {
        (**self).flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStore;

    #[async_trait]
    impl TickStore for MockStore {
        async fn insert(&self, _record: &TickRecord) -> Result<(), StoreError> {
            Ok(())
        }

        fn len(&self) -> usize {
            0
        }
    }

    #[tokio::test]
    async fn test_mock_store() {
        let store = MockStore;
        let record = TickRecord::price(
            TickerId::new(1),
            TickField::BID,
            1.5,
            Timestamp::from_millis(10),
        );
        assert!(store.insert(&record).await.is_ok());
        assert!(store.flush().await.is_ok());
        assert!(store.is_empty());
    }

    #[test]
    fn test_tick_record_json_shape() {
        let record = TickRecord::size(
            TickerId::new(1),
            TickField::ASK_SIZE,
            Decimal::from(300),
            Timestamp::from_millis(1_700_000_000_123),
        );
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["ticker_id"], 1);
        assert_eq!(json["field"], 3);
        assert_eq!(json["timestamp_ms"], 1_700_000_000_123_i64);
        assert!(json.get("price").is_none());
        assert!(json.get("size").is_some());
    }
}
