/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # GateLink Core
//!
//! Core types, events and error definitions for the GateLink gateway client.
//!
//! This crate provides the building blocks shared by every GateLink crate:
//! - **Error types**: Layered error hierarchy using `thiserror`
//! - **Value types**: `OrderId`, `TickerId`, `Timestamp`, `Instrument`, `OrderIntent`
//! - **Events**: The closed `GatewayEvent` set and the `EventSink` callback trait

pub mod error;
pub mod event;
pub mod types;

pub use error::{DecodeError, GateLinkError, Result, SessionError, StoreError};
pub use event::{
    ContractSummary, EventSink, Execution, GatewayEvent, HistoricalBar, NoOpSink,
    OpenOrderSummary, OptionComputation, OrderStatusUpdate, PortfolioPosition, ScannerRow,
    dispatch,
};
pub use types::{
    Instrument, OrderId, OrderIntent, OrderStatus, OrderType, SecurityType, Side, TickField,
    TickerId, Timestamp,
};
