/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session configuration.
//!
//! This module provides the tunables of a gateway session: the ping cadence,
//! the market-data subscription issued on connect and an optional probe order.

use gatelink_core::types::{Instrument, OrderIntent, TickerId};
use std::time::Duration;

/// Default time allowed for a current-time reply.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Default interval between successful pings.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for a gateway session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long PingAck waits for the current-time reply.
    pub ping_timeout: Duration,
    /// How long Idle waits before the next ping.
    pub ping_interval: Duration,
    /// Ticker id of the market-data subscription.
    pub market_data_ticker: TickerId,
    /// Instrument subscribed on connect.
    pub market_data_instrument: Instrument,
    /// Whether the subscription is a one-shot snapshot.
    pub market_data_snapshot: bool,
    /// Order submitted once per session when the first ping succeeds.
    pub probe_order: Option<OrderIntent>,
}

impl SessionConfig {
    /// Creates a configuration with default timings and an MSFT subscription.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ping_timeout: DEFAULT_PING_TIMEOUT,
            ping_interval: DEFAULT_PING_INTERVAL,
            market_data_ticker: TickerId::new(1),
            market_data_instrument: Instrument::stock("MSFT"),
            market_data_snapshot: false,
            probe_order: None,
        }
    }

    /// Sets the ping reply timeout.
    #[must_use]
    pub const fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    /// Sets the interval between pings.
    #[must_use]
    pub const fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Sets the market-data subscription.
    ///
    /// # Arguments
    /// * `ticker_id` - Id the gateway tags ticks with
    /// * `instrument` - Instrument to subscribe
    #[must_use]
    pub fn with_market_data(mut self, ticker_id: TickerId, instrument: Instrument) -> Self {
        self.market_data_ticker = ticker_id;
        self.market_data_instrument = instrument;
        self
    }

    /// Sets whether the subscription is a snapshot.
    #[must_use]
    pub const fn with_snapshot(mut self, snapshot: bool) -> Self {
        self.market_data_snapshot = snapshot;
        self
    }

    /// Sets the probe order.
    #[must_use]
    pub fn with_probe_order(mut self, intent: OrderIntent) -> Self {
        self.probe_order = Some(intent);
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for session configuration.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    ping_timeout: Option<Duration>,
    ping_interval: Option<Duration>,
    market_data: Option<(TickerId, Instrument)>,
    snapshot: bool,
    probe_order: Option<OrderIntent>,
}

impl SessionConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ping reply timeout.
    #[must_use]
    pub fn ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = Some(timeout);
        self
    }

    /// Sets the interval between pings.
    #[must_use]
    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = Some(interval);
        self
    }

    /// Sets the market-data subscription.
    #[must_use]
    pub fn market_data(mut self, ticker_id: TickerId, instrument: Instrument) -> Self {
        self.market_data = Some((ticker_id, instrument));
        self
    }

    /// Sets whether the subscription is a snapshot.
    #[must_use]
    pub const fn snapshot(mut self, snapshot: bool) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Sets the probe order.
    #[must_use]
    pub fn probe_order(mut self, intent: OrderIntent) -> Self {
        self.probe_order = Some(intent);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> SessionConfig {
        let mut config = SessionConfig::new().with_snapshot(self.snapshot);

        if let Some(timeout) = self.ping_timeout {
            config.ping_timeout = timeout;
        }
        if let Some(interval) = self.ping_interval {
            config.ping_interval = interval;
        }
        if let Some((ticker_id, instrument)) = self.market_data {
            config = config.with_market_data(ticker_id, instrument);
        }
        config.probe_order = self.probe_order;

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatelink_core::types::Side;
    use rust_decimal::Decimal;

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();

        assert_eq!(config.ping_timeout, Duration::from_secs(2));
        assert_eq!(config.ping_interval, Duration::from_secs(30));
        assert_eq!(config.market_data_ticker, TickerId::new(1));
        assert_eq!(config.market_data_instrument.to_string(), "MSFT STK SMART USD");
        assert!(!config.market_data_snapshot);
        assert!(config.probe_order.is_none());
    }

    #[test]
    fn test_session_config_builder() {
        let probe = OrderIntent::limit(
            Instrument::stock("MSFT"),
            Side::Buy,
            Decimal::from(1000),
            Decimal::new(1, 2),
        );
        let config = SessionConfigBuilder::new()
            .ping_timeout(Duration::from_secs(5))
            .ping_interval(Duration::from_secs(60))
            .market_data(TickerId::new(7), Instrument::stock("AAPL"))
            .snapshot(true)
            .probe_order(probe.clone())
            .build();

        assert_eq!(config.ping_timeout, Duration::from_secs(5));
        assert_eq!(config.ping_interval, Duration::from_secs(60));
        assert_eq!(config.market_data_ticker, TickerId::new(7));
        assert_eq!(config.market_data_instrument.symbol, "AAPL");
        assert!(config.market_data_snapshot);
        assert_eq!(config.probe_order, Some(probe));
    }
}
