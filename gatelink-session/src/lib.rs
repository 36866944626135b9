/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # GateLink Session
//!
//! Session layer of the GateLink gateway client.
//!
//! This crate provides:
//! - **Phases**: Explicit phase enum with its request and deadline tables
//! - **Session**: The state machine, its event handlers and the poll loop
//! - **Ping scheduling**: Current-time round trips and idle deadlines
//! - **Clock**: System and manual time sources
//! - **Configuration**: Session configuration options

pub mod clock;
pub mod config;
pub mod phase;
pub mod ping;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{SessionConfig, SessionConfigBuilder};
pub use phase::{DeadlineAction, Phase, PhaseAction};
pub use ping::PingSchedule;
pub use session::{PollOutcome, Session};
