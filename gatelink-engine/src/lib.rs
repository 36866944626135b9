/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # GateLink Engine
//!
//! Reconnecting client facade for the GateLink gateway session.
//!
//! This crate provides:
//! - **Supervisor**: Bounded reconnect loop around a session factory
//! - **Sleeper trait**: Pause between attempts, replaceable in tests
//! - **Builder API**: Fluent configuration wiring TCP sessions to the supervisor

pub mod builder;
pub mod supervisor;

pub use builder::{ClientBuilder, TcpSession};
pub use supervisor::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_INTERVAL, RunSummary, Sleeper, Supervisor,
    SupervisorConfig, ThreadSleeper,
};
