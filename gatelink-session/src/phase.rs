/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session phases.
//!
//! The session follows a linear bootstrap (MarketData, Ping, PingAck, Idle)
//! and an optional order workflow (PlaceOrder through CancelOrderAck). Each
//! phase maps to at most one request issued by the poll loop and at most one
//! deadline reaction; both are listed here so the transition table lives in
//! one place.

use std::fmt;

/// Current step of a gateway session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Waiting for the transport to connect.
    #[default]
    Connect,
    /// Subscribe to market data.
    MarketData,
    /// Submit the tracked order.
    PlaceOrder,
    /// Waiting for the order to be acknowledged.
    PlaceOrderAck,
    /// Cancel the tracked order.
    CancelOrder,
    /// Waiting for the cancel to be confirmed.
    CancelOrderAck,
    /// Request the gateway clock.
    Ping,
    /// Waiting for the clock reply.
    PingAck,
    /// Waiting for the next ping.
    Idle,
}

/// Request a phase issues when the poll loop reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAction {
    /// Subscribe to market data, then Ping.
    RequestMarketData,
    /// Place the tracked order, then PlaceOrderAck.
    PlaceOrder,
    /// Cancel the tracked order, then CancelOrderAck.
    CancelOrder,
    /// Request the gateway clock, then PingAck.
    RequestCurrentTime,
}

/// Reaction when a phase's wake deadline has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineAction {
    /// The gateway did not answer in time.
    Disconnect,
    /// Time for the next ping.
    Ping,
}

impl Phase {
    /// Returns the request issued in this phase, if any.
    #[must_use]
    pub const fn action(self) -> Option<PhaseAction> {
        match self {
            Self::MarketData => Some(PhaseAction::RequestMarketData),
            Self::PlaceOrder => Some(PhaseAction::PlaceOrder),
            Self::CancelOrder => Some(PhaseAction::CancelOrder),
            Self::Ping => Some(PhaseAction::RequestCurrentTime),
            _ => None,
        }
    }

    /// Returns the reaction to an elapsed wake deadline, if the phase has one.
    #[must_use]
    pub const fn deadline_action(self) -> Option<DeadlineAction> {
        match self {
            Self::PingAck => Some(DeadlineAction::Disconnect),
            Self::Idle => Some(DeadlineAction::Ping),
            _ => None,
        }
    }

    /// Returns true if the poll loop still has a request to issue.
    #[inline]
    #[must_use]
    pub const fn has_action(self) -> bool {
        self.action().is_some()
    }

    /// Returns true while an order is being placed or cancelled.
    #[must_use]
    pub const fn is_order_workflow(self) -> bool {
        matches!(
            self,
            Self::PlaceOrder | Self::PlaceOrderAck | Self::CancelOrder | Self::CancelOrderAck
        )
    }

    /// Returns true if a new order may be started from this phase.
    #[must_use]
    pub const fn accepts_order(self) -> bool {
        matches!(self, Self::Idle | Self::Ping)
    }

    /// Returns the phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "Connect",
            Self::MarketData => "MarketData",
            Self::PlaceOrder => "PlaceOrder",
            Self::PlaceOrderAck => "PlaceOrderAck",
            Self::CancelOrder => "CancelOrder",
            Self::CancelOrderAck => "CancelOrderAck",
            Self::Ping => "Ping",
            Self::PingAck => "PingAck",
            Self::Idle => "Idle",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
