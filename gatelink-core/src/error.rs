/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the GateLink gateway client.
//!
//! This module provides a unified error hierarchy using `thiserror` for typed,
//! domain-specific errors across decoding, session and persistence operations.
//! Transport failures live next to the transport in `gatelink-transport`.

use thiserror::Error;

/// Result type alias using [`GateLinkError`] as the error type.
pub type Result<T> = std::result::Result<T, GateLinkError>;

/// Top-level error type for GateLink operations.
#[derive(Debug, Error)]
pub enum GateLinkError {
    /// Error while decoding a gateway message.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error in session layer operations.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Error in tick store operations.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error from the underlying socket or file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur while decoding the fields of a gateway message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The message carried no fields at all.
    #[error("empty message")]
    EmptyMessage,

    /// The leading message id is not an integer.
    #[error("invalid message id: {0}")]
    InvalidMessageId(String),

    /// A field the message layout requires is absent.
    #[error("message {msg_id}: missing field at index {index}")]
    MissingField {
        /// Message id being decoded.
        msg_id: i32,
        /// Zero-based field index.
        index: usize,
    },

    /// A field could not be parsed into its expected type.
    #[error("message {msg_id}: invalid value {value:?} at index {index}")]
    InvalidFieldValue {
        /// Message id being decoded.
        msg_id: i32,
        /// Zero-based field index.
        index: usize,
        /// The raw field text.
        value: String,
    },

    /// A field is not valid UTF-8.
    #[error("invalid utf-8 in field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Errors in session layer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The gateway has not assigned an order id yet, or it was consumed.
    #[error("no order id assigned by the gateway")]
    NoOrderId,

    /// An order workflow is already running.
    #[error("order {order_id} is still in flight")]
    OrderInFlight {
        /// Id of the order being worked.
        order_id: i64,
    },

    /// The session is not in a phase that allows the operation.
    #[error("invalid session phase: expected {expected}, current {current}")]
    InvalidPhase {
        /// Phases that allow the operation.
        expected: String,
        /// Current phase.
        current: String,
    },

    /// The session has no live connection.
    #[error("session is not connected")]
    NotConnected,
}

/// Errors in tick store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Failed to persist a record.
    #[error("failed to store tick for ticker {ticker_id}: {reason}")]
    StoreFailed {
        /// Ticker the record belongs to.
        ticker_id: i64,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to serialize a record.
    #[error("serialization failed: {0}")]
    Serialize(String),

    /// The hand-off queue to the store worker is closed.
    #[error("tick queue closed")]
    Closed,

    /// I/O error in a persistent store.
    #[error("store i/o error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::MissingField {
            msg_id: 3,
            index: 4,
        };
        assert_eq!(err.to_string(), "message 3: missing field at index 4");
    }

    #[test]
    fn test_gatelink_error_from_session() {
        let err: GateLinkError = SessionError::NoOrderId.into();
        assert!(matches!(err, GateLinkError::Session(SessionError::NoOrderId)));
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::InvalidPhase {
            expected: "Idle".to_string(),
            current: "PingAck".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid session phase: expected Idle, current PingAck"
        );
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::StoreFailed {
            ticker_id: 1,
            reason: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "failed to store tick for ticker 1: disk full");
    }
}
