/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! TCP transport.
//!
//! The handshake runs on a blocking socket with a read timeout. Once the
//! gateway has answered, the socket switches to non-blocking mode and all
//! further I/O is driven by readiness notifications from the session's poll
//! loop. Requests are framed into an outbound buffer and flushed as far as
//! the socket accepts; the remainder goes out on the next writable event.

use crate::codec::FrameCodec;
use crate::error::TransportError;
use crate::message::{
    API_PREFIX, decode_event, decode_server_hello, encode_cancel_order, encode_place_order,
    encode_request_current_time, encode_request_market_data, encode_start_api,
    encode_version_range,
};
use crate::traits::{Endpoint, Transport};
use bytes::{Buf, BytesMut};
use gatelink_core::event::GatewayEvent;
use gatelink_core::types::{Instrument, OrderId, OrderIntent, TickerId};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::os::fd::{AsRawFd, RawFd};
use std::time::Duration;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, info, warn};

/// Bytes read per readable notification.
const READ_CHUNK: usize = 16 * 1024;

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time to wait for the handshake reply.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateway connection over a TCP socket.
#[derive(Debug)]
pub struct TcpTransport {
    /// Socket, present while connected.
    stream: Option<TcpStream>,
    /// Frame codec.
    codec: FrameCodec,
    /// Bytes read but not yet decoded.
    inbound: BytesMut,
    /// Framed bytes not yet written.
    outbound: BytesMut,
    /// Protocol version announced by the gateway.
    server_version: i32,
    /// Gateway clock at connection time, as reported in the handshake.
    connection_time: String,
    /// TCP connect timeout.
    connect_timeout: Duration,
    /// Handshake reply timeout.
    handshake_timeout: Duration,
}

impl TcpTransport {
    /// Creates a disconnected transport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stream: None,
            codec: FrameCodec::new(),
            inbound: BytesMut::with_capacity(READ_CHUNK),
            outbound: BytesMut::with_capacity(1024),
            server_version: 0,
            connection_time: String::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets the TCP connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the handshake reply timeout.
    #[must_use]
    pub const fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Sets the frame codec.
    #[must_use]
    pub fn with_codec(mut self, codec: FrameCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Returns the protocol version announced by the gateway.
    #[must_use]
    pub const fn server_version(&self) -> i32 {
        self.server_version
    }

    /// Returns the gateway's connection time string.
    #[must_use]
    pub fn connection_time(&self) -> &str {
        &self.connection_time
    }

    /// Reads one frame on the blocking handshake socket.
    fn read_frame_blocking(&mut self, stream: &mut TcpStream) -> Result<BytesMut, TransportError> {
        let mut chunk = [0u8; 1024];
        loop {
            if let Some(frame) = self.codec.decode(&mut self.inbound)? {
                return Ok(frame);
            }
            match stream.read(&mut chunk) {
                Ok(0) => {
                    return Err(TransportError::Handshake(
                        "connection closed during handshake".to_string(),
                    ));
                }
                Ok(n) => self.inbound.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    return Err(TransportError::Handshake(format!(
                        "no reply within {:?}",
                        self.handshake_timeout
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Runs the version exchange and START_API on a freshly opened socket.
    fn handshake(&mut self, stream: &mut TcpStream, client_id: i32) -> Result<(), TransportError> {
        stream.set_read_timeout(Some(self.handshake_timeout))?;

        let mut hello = BytesMut::from(API_PREFIX);
        self.codec.encode(encode_version_range(), &mut hello)?;
        stream.write_all(&hello)?;

        let reply = self.read_frame_blocking(stream)?;
        let (version, connection_time) = decode_server_hello(&reply)?;
        self.server_version = version;
        self.connection_time = connection_time;

        let mut start = BytesMut::new();
        self.codec.encode(encode_start_api(client_id), &mut start)?;
        stream.write_all(&start)?;

        stream.set_read_timeout(None)?;
        stream.set_nonblocking(true)?;
        Ok(())
    }

    /// Frames a payload into the outbound buffer and flushes.
    fn send(&mut self, payload: BytesMut) -> Result<(), TransportError> {
        if self.stream.is_none() {
            return Err(TransportError::NotConnected);
        }
        self.codec.encode(payload, &mut self.outbound)?;
        if let Err(err) = self.flush() {
            self.disconnect();
            return Err(err);
        }
        Ok(())
    }

    /// Writes outbound bytes until the buffer empties or the socket would block.
    fn flush(&mut self) -> Result<(), TransportError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(TransportError::NotConnected);
        };
        while !self.outbound.is_empty() {
            match stream.write(&self.outbound) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => self.outbound.advance(n),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Decodes every complete frame in the inbound buffer.
    fn drain_frames(&mut self, events: &mut Vec<GatewayEvent>) -> Result<(), TransportError> {
        while let Some(frame) = self.codec.decode(&mut self.inbound)? {
            match decode_event(&frame) {
                Ok(event) => events.push(event),
                Err(err) => warn!(error = %err, "Dropping undecodable message"),
            }
        }
        Ok(())
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Tries each resolved address in turn.
///
/// Returns `Ok(None)` when there is no address to try, otherwise the first
/// stream that connects or the error of the last attempt.
fn connect_first(
    addrs: impl IntoIterator<Item = SocketAddr>,
    timeout: Duration,
) -> Result<Option<TcpStream>, TransportError> {
    let mut last_err = None;
    for socket_addr in addrs {
        match TcpStream::connect_timeout(&socket_addr, timeout) {
            Ok(stream) => return Ok(Some(stream)),
            Err(e) => {
                debug!(%socket_addr, error = %e, "Connect attempt failed");
                last_err = Some(e);
            }
        }
    }
    match last_err {
        Some(e) => Err(e.into()),
        None => Ok(None),
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, endpoint: &Endpoint) -> Result<(), TransportError> {
        self.disconnect();

        let addr = endpoint.addr();
        let addrs = addr
            .to_socket_addrs()
            .map_err(|e| TransportError::Resolve(format!("{addr}: {e}")))?;

        let mut stream = connect_first(addrs, self.connect_timeout)?
            .ok_or_else(|| TransportError::Resolve(addr.clone()))?;
        stream.set_nodelay(true)?;
        self.handshake(&mut stream, endpoint.client_id)?;

        info!(
            endpoint = %endpoint,
            server_version = self.server_version,
            connection_time = %self.connection_time,
            "Connected to gateway"
        );
        self.stream = Some(stream);
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.shutdown(Shutdown::Both) {
                debug!(error = %err, "Socket shutdown failed");
            }
            debug!("Socket closed");
        }
        self.inbound.clear();
        self.outbound.clear();
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn handle(&self) -> Option<RawFd> {
        self.stream.as_ref().map(AsRawFd::as_raw_fd)
    }

    fn is_outbound_empty(&self) -> bool {
        self.outbound.is_empty()
    }

    fn on_readable(&mut self, events: &mut Vec<GatewayEvent>) -> Result<(), TransportError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(TransportError::NotConnected);
        };

        let mut chunk = [0u8; READ_CHUNK];
        let closed = match stream.read(&mut chunk) {
            Ok(0) => true,
            Ok(n) => {
                self.inbound.extend_from_slice(&chunk[..n]);
                false
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                false
            }
            Err(e) => {
                self.disconnect();
                return Err(e.into());
            }
        };

        if let Err(err) = self.drain_frames(events) {
            self.disconnect();
            return Err(err);
        }

        if closed {
            events.push(GatewayEvent::ConnectionClosed);
            self.disconnect();
        }
        Ok(())
    }

    fn on_writable(&mut self) -> Result<(), TransportError> {
        if let Err(err) = self.flush() {
            self.disconnect();
            return Err(err);
        }
        Ok(())
    }

    fn on_errorable(&mut self) -> Result<(), TransportError> {
        let pending = match self.stream.as_ref() {
            Some(stream) => stream.take_error()?,
            None => return Err(TransportError::NotConnected),
        };
        self.disconnect();
        match pending {
            Some(err) => Err(err.into()),
            None => Err(TransportError::Closed),
        }
    }

    fn request_market_data(
        &mut self,
        ticker_id: TickerId,
        instrument: &Instrument,
        snapshot: bool,
    ) -> Result<(), TransportError> {
        self.send(encode_request_market_data(ticker_id, instrument, snapshot))
    }

    fn request_current_time(&mut self) -> Result<(), TransportError> {
        self.send(encode_request_current_time())
    }

    fn place_order(&mut self, order_id: OrderId, intent: &OrderIntent) -> Result<(), TransportError> {
        self.send(encode_place_order(order_id, intent))
    }

    fn cancel_order(&mut self, order_id: OrderId) -> Result<(), TransportError> {
        self.send(encode_cancel_order(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::{Interest, Multiplexer, PollMultiplexer};
    use std::net::TcpListener;
    use std::thread;

    fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
        let mut prefix = [0u8; 4];
        stream.read_exact(&mut prefix).unwrap();
        let mut payload = vec![0u8; u32::from_be_bytes(prefix) as usize];
        stream.read_exact(&mut payload).unwrap();
        payload
    }

    fn write_frame(stream: &mut TcpStream, payload: &[u8]) {
        let mut out = (payload.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(payload);
        stream.write_all(&out).unwrap();
    }

    #[test]
    fn test_tcp_transport_loopback_session() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let gateway = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();

            let mut prefix = [0u8; 4];
            socket.read_exact(&mut prefix).unwrap();
            assert_eq!(&prefix, API_PREFIX);
            assert_eq!(read_frame(&mut socket), b"v100..151");

            write_frame(&mut socket, b"151\x0020260127 10:00:00 UTC\x00");
            assert_eq!(read_frame(&mut socket), b"71\x002\x007\x00\x00");

            write_frame(&mut socket, b"9\x001\x0042\x00");
            assert_eq!(read_frame(&mut socket), b"49\x001\x00");
            write_frame(&mut socket, b"49\x001\x001700000000\x00");
        });

        let mut transport = TcpTransport::new().with_handshake_timeout(Duration::from_secs(5));
        transport
            .connect(&Endpoint::new("127.0.0.1", port).with_client_id(7))
            .unwrap();
        assert!(transport.is_connected());
        assert_eq!(transport.server_version(), 151);
        assert_eq!(transport.connection_time(), "20260127 10:00:00 UTC");

        transport.request_current_time().unwrap();

        let mut mux = PollMultiplexer::new();
        let mut events = Vec::new();
        for _ in 0..100 {
            let Some(fd) = transport.handle() else {
                break;
            };
            let ready = mux
                .wait(fd, Interest::READ, Some(Duration::from_secs(2)))
                .unwrap();
            if ready.readable {
                transport.on_readable(&mut events).unwrap();
            }
        }
        gateway.join().unwrap();

        assert!(!transport.is_connected());
        assert_eq!(
            events,
            vec![
                GatewayEvent::NextValidId(OrderId::new(42)),
                GatewayEvent::CurrentTime(1_700_000_000),
                GatewayEvent::ConnectionClosed,
            ]
        );
    }

    #[test]
    fn test_tcp_transport_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut transport = TcpTransport::new().with_connect_timeout(Duration::from_secs(1));
        let result = transport.connect(&Endpoint::new("127.0.0.1", port));
        assert!(matches!(result, Err(TransportError::Io(_))));
        assert!(!transport.is_connected());
        assert!(transport.handle().is_none());
    }

    #[test]
    fn test_connect_first_falls_through_to_next_address() {
        let refused = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let open = listener.local_addr().unwrap();

        let stream = connect_first([refused, open], Duration::from_secs(1))
            .unwrap()
            .unwrap();
        assert_eq!(stream.peer_addr().unwrap(), open);
    }

    #[test]
    fn test_connect_first_reports_last_error() {
        let refused = |_| {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let addrs: Vec<SocketAddr> = (0..2).map(refused).collect();

        let result = connect_first(addrs, Duration::from_secs(1));
        assert!(matches!(result, Err(TransportError::Io(_))));
        assert!(matches!(
            connect_first(Vec::new(), Duration::from_secs(1)),
            Ok(None)
        ));
    }

    #[test]
    fn test_tcp_transport_handshake_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let gateway = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut prefix = [0u8; 4];
            socket.read_exact(&mut prefix).unwrap();
            let _ = read_frame(&mut socket);
        });

        let mut transport = TcpTransport::new();
        let result = transport.connect(&Endpoint::new("127.0.0.1", port));
        gateway.join().unwrap();

        assert!(matches!(result, Err(TransportError::Handshake(_))));
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_requests_need_connection() {
        let mut transport = TcpTransport::new();
        assert!(matches!(
            transport.request_current_time(),
            Err(TransportError::NotConnected)
        ));
        assert!(transport.is_outbound_empty());
    }
}
