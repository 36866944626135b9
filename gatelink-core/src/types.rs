/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Core value types for gateway sessions.
//!
//! This module provides the fundamental types used throughout GateLink:
//! - [`OrderId`] and [`TickerId`]: identifiers assigned by the gateway or by us
//! - [`Timestamp`]: wall-clock time with millisecond precision
//! - [`Instrument`]: the tradable entity referenced by orders and subscriptions
//! - [`OrderIntent`]: one order to submit, plus the id it was placed under
//! - [`OrderStatus`]: the gateway's textual order states, parsed

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Order identifier assigned by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Creates an order id from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a market-data subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct TickerId(i64);

impl TickerId {
    /// Creates a ticker id from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TickerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wall-clock timestamp with millisecond precision.
///
/// Deadlines are stored as absolute timestamps so that every check compares
/// against the clock reading of that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp {
    /// Milliseconds since Unix epoch (1970-01-01 00:00:00 UTC).
    millis_since_epoch: i64,
}

impl Timestamp {
    /// Creates a timestamp from milliseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self {
            millis_since_epoch: millis,
        }
    }

    /// Creates a timestamp from seconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self {
            millis_since_epoch: secs * 1_000,
        }
    }

    /// Returns the current UTC timestamp.
    #[inline]
    #[must_use]
    pub fn now() -> Self {
        Self {
            millis_since_epoch: Utc::now().timestamp_millis(),
        }
    }

    /// Returns milliseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.millis_since_epoch
    }

    /// Returns whole seconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn as_secs(self) -> i64 {
        self.millis_since_epoch.div_euclid(1_000)
    }

    /// Returns this timestamp shifted forward by `duration`.
    #[must_use]
    pub fn plus(self, duration: Duration) -> Self {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        Self {
            millis_since_epoch: self.millis_since_epoch.saturating_add(millis),
        }
    }

    /// Returns the time from `earlier` to `self`, or zero if `earlier` is later.
    #[must_use]
    pub fn saturating_duration_since(self, earlier: Self) -> Duration {
        let diff = self.millis_since_epoch.saturating_sub(earlier.millis_since_epoch);
        Duration::from_millis(u64::try_from(diff).unwrap_or(0))
    }

    /// Converts to a chrono `DateTime<Utc>`.
    #[must_use]
    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis_since_epoch).unwrap_or_default()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            millis_since_epoch: dt.timestamp_millis(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_datetime().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Security type of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityType {
    /// Common stock.
    #[serde(rename = "STK")]
    Stock,
    /// Future.
    #[serde(rename = "FUT")]
    Future,
    /// Option.
    #[serde(rename = "OPT")]
    OptionContract,
    /// Currency pair.
    #[serde(rename = "CASH")]
    Forex,
    /// Index.
    #[serde(rename = "IND")]
    Index,
}

impl SecurityType {
    /// Returns the wire code of the security type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stock => "STK",
            Self::Future => "FUT",
            Self::OptionContract => "OPT",
            Self::Forex => "CASH",
            Self::Index => "IND",
        }
    }
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tradable entity: symbol, security type, venue and currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// Ticker symbol.
    pub symbol: String,
    /// Security type.
    pub sec_type: SecurityType,
    /// Routing exchange.
    pub exchange: String,
    /// Trading currency.
    pub currency: String,
}

impl Instrument {
    /// Creates an instrument.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        sec_type: SecurityType,
        exchange: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            sec_type,
            exchange: exchange.into(),
            currency: currency.into(),
        }
    }

    /// Creates a USD stock routed through SMART.
    #[must_use]
    pub fn stock(symbol: impl Into<String>) -> Self {
        Self::new(symbol, SecurityType::Stock, "SMART", "USD")
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.symbol, self.sec_type, self.exchange, self.currency
        )
    }
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
}

impl Side {
    /// Returns the wire action string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Market order.
    #[serde(rename = "MKT")]
    Market,
    /// Limit order.
    #[serde(rename = "LMT")]
    Limit,
}

impl OrderType {
    /// Returns the wire code of the order type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Market => "MKT",
            Self::Limit => "LMT",
        }
    }
}

/// One order to submit to the gateway.
///
/// `order_id` stays `None` until the session places the intent under the id
/// the gateway assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Instrument to trade.
    pub instrument: Instrument,
    /// Buy or sell.
    pub side: Side,
    /// Total quantity.
    pub quantity: Decimal,
    /// Order type.
    pub order_type: OrderType,
    /// Limit price, required for limit orders.
    pub limit_price: Option<Decimal>,
    /// Id the order was placed under.
    pub order_id: Option<OrderId>,
}

impl OrderIntent {
    /// Creates a limit order intent.
    #[must_use]
    pub fn limit(instrument: Instrument, side: Side, quantity: Decimal, price: Decimal) -> Self {
        Self {
            instrument,
            side,
            quantity,
            order_type: OrderType::Limit,
            limit_price: Some(price),
            order_id: None,
        }
    }

    /// Creates a market order intent.
    #[must_use]
    pub fn market(instrument: Instrument, side: Side, quantity: Decimal) -> Self {
        Self {
            instrument,
            side,
            quantity,
            order_type: OrderType::Market,
            limit_price: None,
            order_id: None,
        }
    }
}

impl fmt::Display for OrderIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.side,
            self.quantity,
            self.instrument.symbol,
            self.order_type.as_str()
        )?;
        if let Some(price) = self.limit_price {
            write!(f, " at {price}")?;
        }
        Ok(())
    }
}

/// Order state as reported by the gateway's order-status event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Transmitted, not yet acknowledged by the venue.
    PendingSubmit,
    /// Cancel sent, not yet confirmed.
    PendingCancel,
    /// Accepted but held (e.g. outside regular hours).
    PreSubmitted,
    /// Working at the venue.
    Submitted,
    /// Cancelled by the API before reaching the venue.
    ApiCancelled,
    /// Cancelled.
    Cancelled,
    /// Completely filled.
    Filled,
    /// Rejected or otherwise inactive.
    Inactive,
    /// Any status text not listed above.
    Unknown(String),
}

impl OrderStatus {
    /// Returns the wire text of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PendingSubmit => "PendingSubmit",
            Self::PendingCancel => "PendingCancel",
            Self::PreSubmitted => "PreSubmitted",
            Self::Submitted => "Submitted",
            Self::ApiCancelled => "ApiCancelled",
            Self::Cancelled => "Cancelled",
            Self::Filled => "Filled",
            Self::Inactive => "Inactive",
            Self::Unknown(text) => text,
        }
    }

    /// Returns true if the gateway accepted the order for working.
    #[must_use]
    pub const fn is_acknowledged(&self) -> bool {
        matches!(
            self,
            Self::PendingSubmit | Self::PreSubmitted | Self::Submitted
        )
    }

    /// Returns true if the order is cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::ApiCancelled)
    }

    /// Returns true if the order ended without a cancel.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Filled | Self::Inactive)
    }
}

impl FromStr for OrderStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "PendingSubmit" => Self::PendingSubmit,
            "PendingCancel" => Self::PendingCancel,
            "PreSubmitted" => Self::PreSubmitted,
            "Submitted" => Self::Submitted,
            "ApiCancelled" => Self::ApiCancelled,
            "Cancelled" => Self::Cancelled,
            "Filled" => Self::Filled,
            "Inactive" => Self::Inactive,
            other => Self::Unknown(other.to_string()),
        })
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field code of a market-data tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct TickField(i32);

impl TickField {
    /// Bid size.
    pub const BID_SIZE: Self = Self(0);
    /// Bid price.
    pub const BID: Self = Self(1);
    /// Ask price.
    pub const ASK: Self = Self(2);
    /// Ask size.
    pub const ASK_SIZE: Self = Self(3);
    /// Last traded price.
    pub const LAST: Self = Self(4);
    /// Last traded size.
    pub const LAST_SIZE: Self = Self(5);
    /// Session high.
    pub const HIGH: Self = Self(6);
    /// Session low.
    pub const LOW: Self = Self(7);
    /// Session volume.
    pub const VOLUME: Self = Self(8);
    /// Previous close.
    pub const CLOSE: Self = Self(9);

    /// Creates a tick field from its code.
    #[inline]
    #[must_use]
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// Returns the raw code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for TickField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_conversions() {
        let ts = Timestamp::from_secs(2);
        assert_eq!(ts.as_millis(), 2_000);
        assert_eq!(ts.as_secs(), 2);
        assert_eq!(ts.plus(Duration::from_millis(500)).as_millis(), 2_500);
    }

    #[test]
    fn test_timestamp_saturating_duration() {
        let a = Timestamp::from_secs(10);
        let b = Timestamp::from_secs(12);
        assert_eq!(b.saturating_duration_since(a), Duration::from_secs(2));
        assert_eq!(a.saturating_duration_since(b), Duration::ZERO);
    }

    #[test]
    fn test_timestamp_format() {
        let ts = Timestamp::from_millis(0);
        assert!(ts.to_string().starts_with("1970-01-01 00:00:00"));
    }

    #[test]
    fn test_instrument_stock() {
        let msft = Instrument::stock("MSFT");
        assert_eq!(msft.sec_type, SecurityType::Stock);
        assert_eq!(msft.exchange, "SMART");
        assert_eq!(msft.currency, "USD");
        assert_eq!(msft.to_string(), "MSFT STK SMART USD");
    }

    #[test]
    fn test_order_intent_display() {
        let intent = OrderIntent::limit(
            Instrument::stock("MSFT"),
            Side::Buy,
            Decimal::from(1000),
            Decimal::new(1, 2),
        );
        assert_eq!(intent.to_string(), "BUY 1000 MSFT LMT at 0.01");
        assert!(intent.order_id.is_none());
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!("Submitted".parse::<OrderStatus>(), Ok(OrderStatus::Submitted));
        assert_eq!("Cancelled".parse::<OrderStatus>(), Ok(OrderStatus::Cancelled));
        assert_eq!(
            "Weird".parse::<OrderStatus>(),
            Ok(OrderStatus::Unknown("Weird".to_string()))
        );
    }

    #[test]
    fn test_order_status_classes() {
        assert!(OrderStatus::PreSubmitted.is_acknowledged());
        assert!(OrderStatus::PendingSubmit.is_acknowledged());
        assert!(!OrderStatus::PendingCancel.is_acknowledged());
        assert!(OrderStatus::ApiCancelled.is_cancelled());
        assert!(OrderStatus::Filled.is_finished());
        assert!(!OrderStatus::Submitted.is_finished());
    }

    #[test]
    fn test_side_serde() {
        let json = serde_json::to_string(&Side::Buy).unwrap();
        assert_eq!(json, "\"BUY\"");
    }
}
