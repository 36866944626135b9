/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # GateLink Store
//!
//! Tick persistence for the GateLink gateway client.
//!
//! This crate provides:
//! - **TickStore trait**: Abstract interface for tick storage
//! - **MemoryTickStore**: In-memory store for testing and short runs
//! - **JsonLinesTickStore**: Append-only JSON-lines file store
//! - **TickRecorder**: Event sink that hands ticks to a store worker thread

pub mod jsonl;
pub mod memory;
pub mod recorder;
pub mod traits;

pub use jsonl::JsonLinesTickStore;
pub use memory::MemoryTickStore;
pub use recorder::{DEFAULT_QUEUE_CAPACITY, RecorderStats, TickRecorder};
pub use traits::{TickRecord, TickStore};
