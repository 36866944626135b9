/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # GateLink
//!
//! A reconnecting client for a trading gateway.
//!
//! GateLink keeps one connection to the gateway alive, subscribes to market
//! data, sends a liveness ping every few seconds and can run a place-then-cancel
//! order round trip. Everything happens on one thread around a single
//! readiness wait; ticks are handed to a worker thread for persistence.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gatelink::prelude::*;
//!
//! let summary = ClientBuilder::new()
//!     .with_endpoint(Endpoint::new("127.0.0.1", 4001))
//!     .with_max_reconnect_attempts(3)
//!     .run(|| None);
//! println!("{} attempts", summary.attempts);
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Identifiers, order intents, events and error definitions
//! - [`transport`]: Wire framing, TCP transport and the readiness wait
//! - [`session`]: Phase machine, ping schedule and the poll loop
//! - [`store`]: Tick stores and the tick recorder
//! - [`engine`]: Reconnection supervisor and client builder

pub mod core {
    //! Identifiers, order intents, events and error definitions.
    pub use gatelink_core::*;
}

pub mod transport {
    //! Wire framing, TCP transport and the readiness wait.
    pub use gatelink_transport::*;
}

pub mod session {
    //! Phase machine, ping schedule and the poll loop.
    pub use gatelink_session::*;
}

pub mod store {
    //! Tick stores and the tick recorder.
    pub use gatelink_store::*;
}

pub mod engine {
    //! Reconnection supervisor and client builder.
    pub use gatelink_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use gatelink_core::{
        EventSink, GateLinkError, GatewayEvent, Instrument, OrderId, OrderIntent, OrderStatus,
        OrderType, SessionError, Side, StoreError, TickField, TickerId, Timestamp,
    };

    // Transport
    pub use gatelink_transport::{Endpoint, PollMultiplexer, TcpTransport, Transport};

    // Session
    pub use gatelink_session::{Phase, PollOutcome, Session, SessionConfig, SystemClock};

    // Store
    pub use gatelink_store::{JsonLinesTickStore, MemoryTickStore, TickRecorder, TickStore};

    // Engine
    pub use gatelink_engine::{ClientBuilder, RunSummary, Supervisor, SupervisorConfig};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let _ticker = TickerId::new(1);
        let _ts = Timestamp::now();
        let _side = Side::Buy;
        assert_eq!(Endpoint::default().addr(), "127.0.0.1:4001");
    }

    #[test]
    fn test_builder_from_prelude() {
        let builder = ClientBuilder::new().with_max_reconnect_attempts(1);
        assert_eq!(builder.supervisor_config().max_attempts, 1);
        assert_eq!(builder.build_session().phase(), Phase::Connect);
    }
}
