/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # GateLink Transport
//!
//! Network transport layer for the GateLink gateway client.
//!
//! This crate provides:
//! - **Transport trait**: The capability set the session drives
//! - **TCP transport**: Blocking handshake, then a non-blocking socket with outbound buffering
//! - **Codec**: Length-prefixed framing implemented as a `tokio_util` codec
//! - **Messages**: NUL-delimited field encoding and event decoding
//! - **Multiplexing**: Single-descriptor readiness wait over `poll(2)`

pub mod codec;
pub mod error;
pub mod message;
pub mod poll;
pub mod tcp;
pub mod traits;

pub use codec::{CodecError, FrameCodec};
pub use error::TransportError;
pub use message::{FieldReader, FieldWriter, decode_event};
pub use poll::{Interest, Multiplexer, PollMultiplexer, Readiness};
pub use tcp::TcpTransport;
pub use traits::{Endpoint, Transport};
