/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Transport error type.

use crate::codec::CodecError;
use gatelink_core::error::DecodeError;
use thiserror::Error;

/// Errors raised by a [`crate::Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// Socket I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Framing failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A handshake reply could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The endpoint did not resolve to any address.
    #[error("cannot resolve {0}")]
    Resolve(String),

    /// The gateway rejected or broke off the handshake.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// Operation needs a live connection.
    #[error("not connected")]
    NotConnected,

    /// The peer closed the socket.
    #[error("connection closed by peer")]
    Closed,
}

impl TransportError {
    /// Returns true if the error means the connection is gone.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Handshake("no reply".to_string());
        assert_eq!(err.to_string(), "handshake failed: no reply");
    }

    #[test]
    fn test_transport_error_from_codec() {
        let err: TransportError = CodecError::FrameTooLarge {
            size: 10,
            max_size: 8,
        }
        .into();
        assert!(err.is_fatal());
        assert!(matches!(err, TransportError::Codec(_)));
    }

    #[test]
    fn test_decode_error_is_not_fatal() {
        let err: TransportError = DecodeError::EmptyMessage.into();
        assert!(!err.is_fatal());
    }
}
