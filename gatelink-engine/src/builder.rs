/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Client builder for fluent configuration.
//!
//! This module wires the TCP transport, the poll multiplexer and the system
//! clock into sessions, and a supervisor that reconnects them.

use crate::supervisor::{RunSummary, Supervisor, SupervisorConfig};
use gatelink_core::event::EventSink;
use gatelink_session::clock::SystemClock;
use gatelink_session::config::SessionConfig;
use gatelink_session::session::Session;
use gatelink_transport::poll::PollMultiplexer;
use gatelink_transport::tcp::{DEFAULT_CONNECT_TIMEOUT, TcpTransport};
use gatelink_transport::traits::Endpoint;
use std::time::Duration;

/// Session over a real socket.
pub type TcpSession = Session<TcpTransport, PollMultiplexer, SystemClock>;

/// Builder for a reconnecting gateway client.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    /// Gateway address and client id.
    endpoint: Endpoint,
    /// Per-session settings.
    session: SessionConfig,
    /// TCP connect timeout.
    connect_timeout: Duration,
    /// Pause between attempts.
    reconnect_interval: Duration,
    /// Total connection attempts.
    max_reconnect_attempts: u32,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        let supervisor = SupervisorConfig::default();
        Self {
            endpoint: supervisor.endpoint,
            session: SessionConfig::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            reconnect_interval: supervisor.retry_interval,
            max_reconnect_attempts: supervisor.max_attempts,
        }
    }

    /// Sets the gateway endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the per-session configuration.
    #[must_use]
    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        self.session = config;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the reconnect interval.
    #[must_use]
    pub const fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Sets the maximum reconnect attempts.
    #[must_use]
    pub const fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Returns the gateway endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the per-session configuration.
    #[must_use]
    pub const fn session_config(&self) -> &SessionConfig {
        &self.session
    }

    /// Returns the connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the reconnect interval.
    #[must_use]
    pub const fn reconnect_interval(&self) -> Duration {
        self.reconnect_interval
    }

    /// Returns the maximum reconnect attempts.
    #[must_use]
    pub const fn max_reconnect_attempts(&self) -> u32 {
        self.max_reconnect_attempts
    }

    /// Returns the supervisor settings.
    #[must_use]
    pub fn supervisor_config(&self) -> SupervisorConfig {
        SupervisorConfig::new(self.endpoint.clone())
            .with_max_attempts(self.max_reconnect_attempts)
            .with_retry_interval(self.reconnect_interval)
    }

    /// Creates a disconnected session over TCP.
    #[must_use]
    pub fn build_session(&self) -> TcpSession {
        let transport = TcpTransport::new().with_connect_timeout(self.connect_timeout);
        Session::new(
            transport,
            PollMultiplexer,
            SystemClock,
            self.session.clone(),
        )
    }

    /// Creates the supervisor.
    #[must_use]
    pub fn build(&self) -> Supervisor {
        Supervisor::new(self.supervisor_config())
    }

    /// Runs the reconnect loop until the attempt budget is spent.
    ///
    /// `observer` is asked for a fresh observer before each attempt.
    pub fn run<F>(&self, mut observer: F) -> RunSummary
    where
        F: FnMut() -> Option<Box<dyn EventSink>>,
    {
        self.build().run(|_| {
            let session = self.build_session();
            match observer() {
                Some(sink) => session.with_observer(sink),
                None => session,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatelink_core::event::NoOpSink;
    use gatelink_session::phase::Phase;
    use std::net::TcpListener;

    #[test]
    fn test_client_builder_default() {
        let builder = ClientBuilder::new();
        assert_eq!(builder.endpoint().addr(), "127.0.0.1:4001");
        assert_eq!(builder.connect_timeout(), Duration::from_secs(10));
        assert_eq!(builder.reconnect_interval(), Duration::from_secs(10));
        assert_eq!(builder.max_reconnect_attempts(), 50);
    }

    #[test]
    fn test_client_builder_overrides() {
        let builder = ClientBuilder::new()
            .with_endpoint(Endpoint::new("gateway", 7497).with_client_id(3))
            .with_connect_timeout(Duration::from_secs(2))
            .with_reconnect_interval(Duration::from_secs(1))
            .with_max_reconnect_attempts(5)
            .with_session_config(SessionConfig::new().with_ping_interval(Duration::from_secs(5)));

        let supervisor = builder.supervisor_config();
        assert_eq!(supervisor.endpoint.addr(), "gateway:7497");
        assert_eq!(supervisor.endpoint.client_id, 3);
        assert_eq!(supervisor.max_attempts, 5);
        assert_eq!(supervisor.retry_interval, Duration::from_secs(1));
        assert_eq!(
            builder.session_config().ping_interval,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_build_session_starts_disconnected() {
        let session = ClientBuilder::new().build_session();
        assert!(!session.is_connected());
        assert_eq!(session.phase(), Phase::Connect);
    }

    #[test]
    fn test_run_against_closed_port() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut observers = 0;

        let summary = ClientBuilder::new()
            .with_endpoint(Endpoint::new("127.0.0.1", port))
            .with_connect_timeout(Duration::from_millis(200))
            .with_reconnect_interval(Duration::ZERO)
            .with_max_reconnect_attempts(2)
            .run(|| {
                observers += 1;
                Some(Box::new(NoOpSink) as Box<dyn EventSink>)
            });

        assert_eq!(summary.attempts, 2);
        assert_eq!(summary.sessions_established, 0);
        assert_eq!(observers, 2);
    }
}
