/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Gateway session and its poll loop.
//!
//! A [`Session`] owns one transport connection and the authoritative
//! [`Phase`]. Each call to [`Session::poll_once`] issues the phase's pending
//! request, checks the wake deadline, waits on the socket and dispatches
//! whatever the transport decoded. Decoded events go to the session's own
//! [`EventSink`] handlers first and then to the optional observer.
//!
//! A session lives for exactly one connection; reconnecting means building
//! a new one.

use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::phase::{DeadlineAction, Phase, PhaseAction};
use crate::ping::PingSchedule;
use chrono::DateTime;
use gatelink_core::error::SessionError;
use gatelink_core::event::{self, EventSink, GatewayEvent, OrderStatusUpdate};
use gatelink_core::types::{OrderId, OrderIntent, Timestamp};
use gatelink_transport::error::TransportError;
use gatelink_transport::poll::{Interest, Multiplexer};
use gatelink_transport::traits::{Endpoint, Transport};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Request id the gateway uses for connection-wide notices.
pub const CONNECTION_NOTICE_ID: i64 = -1;

/// Error code for "connectivity between gateway and venue lost".
pub const CONNECTIVITY_LOST: i32 = 1100;

/// How a single poll iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The session is not connected; nothing was done.
    Disconnected,
    /// The wait elapsed without readiness.
    TimedOut,
    /// The idle deadline passed; the next iteration pings.
    DeadlineElapsed,
    /// The ping reply did not arrive in time; the session disconnected.
    PingTimeout,
    /// The wait primitive failed; the session disconnected.
    WaitFailed,
    /// Socket readiness was handled.
    Processed,
}

/// One gateway connection and its state machine.
pub struct Session<T, M, C> {
    /// Gateway connection.
    transport: T,
    /// Readiness wait.
    multiplexer: M,
    /// Time source for deadlines.
    clock: C,
    /// Session settings.
    config: SessionConfig,
    /// Current phase.
    phase: Phase,
    /// Next order id assigned by the gateway, until consumed.
    order_id: Option<OrderId>,
    /// Order being placed or cancelled.
    tracked_order: Option<OrderIntent>,
    /// Absolute deadline for PingAck and Idle.
    wake_deadline: Option<Timestamp>,
    /// Ping round-trip bookkeeping.
    ping: PingSchedule,
    /// Whether the configured probe order still has to go out.
    probe_pending: bool,
    /// Receives every event after the session has handled it.
    observer: Option<Box<dyn EventSink>>,
    /// Reused buffer for decoded events.
    events: Vec<GatewayEvent>,
}

impl<T, M, C> Session<T, M, C>
where
    T: Transport,
    M: Multiplexer,
    C: Clock,
{
    /// Creates a session in the Connect phase.
    ///
    /// # Arguments
    /// * `transport` - Gateway connection, not yet connected
    /// * `multiplexer` - Readiness wait over the transport's descriptor
    /// * `clock` - Time source for deadlines
    /// * `config` - Session settings
    #[must_use]
    pub fn new(transport: T, multiplexer: M, clock: C, config: SessionConfig) -> Self {
        let ping = PingSchedule::new(config.ping_timeout, config.ping_interval);
        let probe_pending = config.probe_order.is_some();
        Self {
            transport,
            multiplexer,
            clock,
            config,
            phase: Phase::Connect,
            order_id: None,
            tracked_order: None,
            wake_deadline: None,
            ping,
            probe_pending,
            observer: None,
            events: Vec::with_capacity(16),
        }
    }

    /// Sets the sink that sees every event after the session.
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn EventSink>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Connects the transport and starts the bootstrap sequence.
    ///
    /// # Errors
    /// Returns `TransportError` if the gateway cannot be reached.
    pub fn connect(&mut self, endpoint: &Endpoint) -> Result<(), TransportError> {
        info!(%endpoint, "Connecting");
        self.phase = Phase::Connect;
        match self.transport.connect(endpoint) {
            Ok(()) => {
                info!(%endpoint, "Connected");
                self.set_phase(Phase::MarketData);
                Ok(())
            }
            Err(err) => {
                error!(%endpoint, error = %err, "Cannot connect");
                Err(err)
            }
        }
    }

    /// Closes the connection.
    pub fn disconnect(&mut self) {
        self.transport.disconnect();
        self.ping.reset();
        info!(phase = %self.phase, "Disconnected");
    }

    /// Returns true while the transport is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the unused order id assigned by the gateway.
    #[must_use]
    pub const fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    /// Returns the active wake deadline.
    #[must_use]
    pub const fn wake_deadline(&self) -> Option<Timestamp> {
        self.wake_deadline
    }

    /// Returns the order being worked.
    #[must_use]
    pub const fn tracked_order(&self) -> Option<&OrderIntent> {
        self.tracked_order.as_ref()
    }

    /// Returns the session settings.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the ping bookkeeping.
    #[must_use]
    pub const fn ping(&self) -> &PingSchedule {
        &self.ping
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the transport mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Starts the place-then-cancel workflow for an order.
    ///
    /// The order consumes the id last assigned by the gateway and goes out on
    /// the next poll iteration.
    ///
    /// # Errors
    /// Returns `SessionError` if the session is disconnected, an order is
    /// already in flight, the phase is not Idle or Ping, or no order id is
    /// available.
    pub fn submit_order(&mut self, mut intent: OrderIntent) -> Result<OrderId, SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        if self.phase.is_order_workflow() {
            let order_id = self
                .tracked_order
                .as_ref()
                .and_then(|order| order.order_id)
                .map_or(0, OrderId::value);
            return Err(SessionError::OrderInFlight { order_id });
        }
        if !self.phase.accepts_order() {
            return Err(SessionError::InvalidPhase {
                expected: "Idle or Ping".to_string(),
                current: self.phase.to_string(),
            });
        }
        let order_id = self.order_id.take().ok_or(SessionError::NoOrderId)?;

        intent.order_id = Some(order_id);
        self.tracked_order = Some(intent);
        self.wake_deadline = None;
        self.ping.reset();
        self.set_phase(Phase::PlaceOrder);
        Ok(order_id)
    }

    /// Routes one event to the session handlers and then to the observer.
    pub fn dispatch(&mut self, event: &GatewayEvent) {
        event::dispatch(self, event);
        if let Some(observer) = self.observer.as_mut() {
            event::dispatch(observer.as_mut(), event);
        }
    }

    /// Runs one iteration of the poll loop.
    pub fn poll_once(&mut self) -> PollOutcome {
        if !self.is_connected() {
            return PollOutcome::Disconnected;
        }
        let now = self.clock.now();

        if let Some(action) = self.phase.action() {
            self.run_action(action, now);
            if !self.is_connected() {
                return PollOutcome::Disconnected;
            }
        }

        if let (Some(action), Some(deadline)) = (self.phase.deadline_action(), self.wake_deadline)
            && now > deadline
        {
            return match action {
                DeadlineAction::Disconnect => {
                    warn!(%deadline, %now, "No current-time reply before deadline");
                    self.disconnect();
                    PollOutcome::PingTimeout
                }
                DeadlineAction::Ping => {
                    self.set_phase(Phase::Ping);
                    PollOutcome::DeadlineElapsed
                }
            };
        }

        let Some(fd) = self.transport.handle() else {
            return PollOutcome::Disconnected;
        };
        let interest = Interest {
            read: true,
            write: !self.transport.is_outbound_empty(),
        };
        let timeout = self.wait_timeout(now);

        let readiness = match self.multiplexer.wait(fd, interest, timeout) {
            Ok(readiness) => readiness,
            Err(err) => {
                error!(error = %err, "Socket wait failed");
                self.disconnect();
                return PollOutcome::WaitFailed;
            }
        };
        if readiness.is_empty() {
            return PollOutcome::TimedOut;
        }

        if readiness.errored {
            if let Err(err) = self.transport.on_errorable() {
                warn!(error = %err, "Socket error");
            }
            if !self.is_connected() {
                return PollOutcome::Disconnected;
            }
        }

        if readiness.writable {
            if let Err(err) = self.transport.on_writable() {
                warn!(error = %err, "Send failed");
                self.disconnect_if_connected();
            }
            if !self.is_connected() {
                return PollOutcome::Disconnected;
            }
        }

        if readiness.readable {
            let mut events = std::mem::take(&mut self.events);
            let result = self.transport.on_readable(&mut events);

            let connected_before = self.is_connected();
            for event in &events {
                self.dispatch(event);
                if connected_before && !self.is_connected() {
                    break;
                }
            }
            events.clear();
            self.events = events;

            if let Err(err) = result {
                warn!(error = %err, "Receive failed");
                if err.is_fatal() {
                    self.disconnect_if_connected();
                }
            }
        }

        if self.is_connected() {
            PollOutcome::Processed
        } else {
            PollOutcome::Disconnected
        }
    }

    /// Computes how long the socket wait may block.
    fn wait_timeout(&self, now: Timestamp) -> Option<Duration> {
        if self.phase.has_action() {
            return Some(Duration::ZERO);
        }
        self.wake_deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Issues the phase's request and moves to the follow-up phase.
    fn run_action(&mut self, action: PhaseAction, now: Timestamp) {
        let result = match action {
            PhaseAction::RequestMarketData => {
                self.set_phase(Phase::Ping);
                debug!(
                    ticker_id = %self.config.market_data_ticker,
                    instrument = %self.config.market_data_instrument,
                    "Requesting market data"
                );
                self.transport.request_market_data(
                    self.config.market_data_ticker,
                    &self.config.market_data_instrument,
                    self.config.market_data_snapshot,
                )
            }
            PhaseAction::RequestCurrentTime => {
                info!("Requesting current time");
                self.wake_deadline = Some(self.ping.on_ping_sent(now));
                self.set_phase(Phase::PingAck);
                self.transport.request_current_time()
            }
            PhaseAction::PlaceOrder => {
                self.set_phase(Phase::PlaceOrderAck);
                let tracked = self
                    .tracked_order
                    .as_ref()
                    .and_then(|intent| intent.order_id.map(|order_id| (order_id, intent)));
                match tracked {
                    Some((order_id, intent)) => {
                        info!(%order_id, order = %intent, "Placing order");
                        self.transport.place_order(order_id, intent)
                    }
                    None => {
                        warn!("No order to place");
                        self.set_phase(Phase::Ping);
                        Ok(())
                    }
                }
            }
            PhaseAction::CancelOrder => {
                self.set_phase(Phase::CancelOrderAck);
                match self.tracked_order.as_ref().and_then(|order| order.order_id) {
                    Some(order_id) => {
                        info!(%order_id, "Cancelling order");
                        self.transport.cancel_order(order_id)
                    }
                    None => {
                        warn!("No order to cancel");
                        self.set_phase(Phase::Ping);
                        Ok(())
                    }
                }
            }
        };

        if let Err(err) = result {
            error!(?action, error = %err, "Request failed");
            self.disconnect_if_connected();
        }
    }

    /// Changes phase.
    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "Phase change");
            self.phase = phase;
        }
    }

    /// Ends the order workflow and resumes pinging.
    fn finish_order(&mut self) {
        self.tracked_order = None;
        self.set_phase(Phase::Ping);
    }

    /// Disconnects unless the transport already dropped the connection.
    fn disconnect_if_connected(&mut self) {
        if self.is_connected() {
            self.disconnect();
        } else {
            self.ping.reset();
        }
    }

    /// Starts the probe order once an id is available in Idle.
    fn maybe_submit_probe(&mut self) {
        if !self.probe_pending || self.phase != Phase::Idle || self.order_id.is_none() {
            return;
        }
        let Some(intent) = self.config.probe_order.clone() else {
            self.probe_pending = false;
            return;
        };
        match self.submit_order(intent) {
            Ok(order_id) => {
                self.probe_pending = false;
                info!(%order_id, "Probe order queued");
            }
            Err(err) => warn!(error = %err, "Probe order not queued"),
        }
    }

    /// Returns the id of the order being worked.
    fn tracked_order_id(&self) -> Option<OrderId> {
        self.tracked_order.as_ref().and_then(|order| order.order_id)
    }
}

impl<T, M, C> EventSink for Session<T, M, C>
where
    T: Transport,
    M: Multiplexer,
    C: Clock,
{
    fn on_order_status(&mut self, update: &OrderStatusUpdate) {
        if self.tracked_order_id() != Some(update.order_id) {
            debug!(order_id = %update.order_id, status = %update.status, "Ignoring untracked order");
            return;
        }
        info!(order_id = %update.order_id, status = %update.status, "Order status");

        match self.phase {
            Phase::PlaceOrderAck if update.status.is_acknowledged() => {
                self.set_phase(Phase::CancelOrder);
            }
            Phase::CancelOrderAck if update.status.is_cancelled() => {
                self.finish_order();
            }
            Phase::PlaceOrderAck | Phase::CancelOrderAck
                if update.status.is_finished() || update.status.is_cancelled() =>
            {
                info!(order_id = %update.order_id, status = %update.status, "Order ended by gateway");
                self.finish_order();
            }
            _ => {}
        }
    }

    fn on_next_valid_id(&mut self, order_id: OrderId) {
        debug!(%order_id, "Next valid order id");
        self.order_id = Some(order_id);
        if self.phase == Phase::Connect {
            self.set_phase(Phase::MarketData);
        }
        self.maybe_submit_probe();
    }

    fn on_current_time(&mut self, epoch_secs: i64) {
        if self.phase != Phase::PingAck {
            debug!(epoch_secs, "Ignoring current time outside PingAck");
            return;
        }
        match DateTime::from_timestamp(epoch_secs, 0) {
            Some(time) => info!("The current date/time is: {}", time.format("%a %b %e %H:%M:%S %Y")),
            None => info!(epoch_secs, "The current date/time is out of range"),
        }

        let now = self.clock.now();
        let next = self
            .ping
            .on_reply(now)
            .unwrap_or_else(|| now.plus(self.config.ping_interval));
        self.wake_deadline = Some(next);
        self.set_phase(Phase::Idle);
        self.maybe_submit_probe();
    }

    fn on_error(&mut self, id: i64, code: i32, message: &str) {
        if id == CONNECTION_NOTICE_ID && code == CONNECTIVITY_LOST {
            warn!(code, message, "Gateway lost connectivity");
            self.disconnect_if_connected();
            return;
        }
        warn!(id, code, message, "Gateway error");
    }

    fn on_connection_closed(&mut self) {
        warn!(phase = %self.phase, "Connection closed by gateway");
    }

    fn on_unhandled(&mut self, msg_id: i32) {
        debug!(msg_id, "Unhandled message");
    }
}
