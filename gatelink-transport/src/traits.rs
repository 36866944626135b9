/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Transport trait and gateway endpoint.

use crate::error::TransportError;
use gatelink_core::event::GatewayEvent;
use gatelink_core::types::{Instrument, OrderId, OrderIntent, TickerId};
use std::fmt;
use std::os::fd::RawFd;

/// Host used when the endpoint host is empty.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default gateway port.
pub const DEFAULT_PORT: u16 = 4001;

/// Address and client id of a gateway connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or address. Empty means loopback.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Client id announced in START_API.
    pub client_id: i32,
}

impl Endpoint {
    /// Creates a new endpoint with client id 0.
    ///
    /// # Arguments
    /// * `host` - Host name or address
    /// * `port` - TCP port
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            client_id: 0,
        }
    }

    /// Sets the client id.
    #[must_use]
    pub const fn with_client_id(mut self, client_id: i32) -> Self {
        self.client_id = client_id;
        self
    }

    /// Returns the host to connect to.
    #[must_use]
    pub fn effective_host(&self) -> &str {
        if self.host.is_empty() {
            DEFAULT_HOST
        } else {
            &self.host
        }
    }

    /// Returns `host:port` suitable for address resolution.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.effective_host(), self.port)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (client id {})", self.addr(), self.client_id)
    }
}

/// Capabilities the session needs from a gateway connection.
///
/// Inbound messages are decoded by the transport and handed back to the
/// caller through the `events` buffer of [`Transport::on_readable`], so the
/// owner of the transport can dispatch them without aliasing it.
pub trait Transport {
    /// Opens the connection and completes the handshake.
    ///
    /// # Errors
    /// Returns `TransportError` if the gateway is unreachable or the
    /// handshake fails.
    fn connect(&mut self, endpoint: &Endpoint) -> Result<(), TransportError>;

    /// Closes the connection. Idempotent.
    fn disconnect(&mut self);

    /// Returns true while the connection is up.
    fn is_connected(&self) -> bool;

    /// Returns the socket descriptor while connected.
    fn handle(&self) -> Option<RawFd>;

    /// Returns true if no outbound bytes are pending.
    fn is_outbound_empty(&self) -> bool;

    /// Reads available bytes and appends decoded events.
    ///
    /// # Errors
    /// Returns `TransportError` if the socket or framing fails.
    fn on_readable(&mut self, events: &mut Vec<GatewayEvent>) -> Result<(), TransportError>;

    /// Flushes pending outbound bytes.
    ///
    /// # Errors
    /// Returns `TransportError` if the socket write fails.
    fn on_writable(&mut self) -> Result<(), TransportError>;

    /// Handles an error condition on the socket.
    ///
    /// # Errors
    /// Returns the pending socket error, if any.
    fn on_errorable(&mut self) -> Result<(), TransportError>;

    /// Subscribes to market data for an instrument.
    ///
    /// # Errors
    /// Returns `TransportError` if the request cannot be queued.
    fn request_market_data(
        &mut self,
        ticker_id: TickerId,
        instrument: &Instrument,
        snapshot: bool,
    ) -> Result<(), TransportError>;

    /// Asks the gateway for its clock.
    ///
    /// # Errors
    /// Returns `TransportError` if the request cannot be queued.
    fn request_current_time(&mut self) -> Result<(), TransportError>;

    /// Places an order.
    ///
    /// # Errors
    /// Returns `TransportError` if the request cannot be queued.
    fn place_order(&mut self, order_id: OrderId, intent: &OrderIntent)
    -> Result<(), TransportError>;

    /// Cancels an order.
    ///
    /// # Errors
    /// Returns `TransportError` if the request cannot be queued.
    fn cancel_order(&mut self, order_id: OrderId) -> Result<(), TransportError>;
}
