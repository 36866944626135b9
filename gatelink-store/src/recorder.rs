/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tick recorder.
//!
//! The recorder is the session's observer for market-data ticks. It stamps
//! each tick and hands it to a dedicated worker thread over a bounded
//! channel; the worker runs a current-thread Tokio runtime and writes into a
//! [`TickStore`]. Handing off never blocks: when the queue is full the tick
//! is dropped and counted.

use crate::jsonl::JsonLinesTickStore;
use crate::traits::{TickRecord, TickStore};
use gatelink_core::error::Result;
use gatelink_core::event::EventSink;
use gatelink_core::types::{TickField, TickerId, Timestamp};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, warn};

/// Default hand-off queue length.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

/// Counters shared by the recorder handles and the worker.
#[derive(Debug, Default)]
struct Shared {
    accepted: AtomicU64,
    dropped: AtomicU64,
    stored: AtomicU64,
    failed: AtomicU64,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// Snapshot of recorder counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecorderStats {
    /// Ticks queued for the worker.
    pub accepted: u64,
    /// Ticks dropped because the queue was full or closed.
    pub dropped: u64,
    /// Ticks the store accepted.
    pub stored: u64,
    /// Ticks the store rejected.
    pub failed: u64,
}

/// Event sink that persists ticks off the poll-loop thread.
///
/// Clones share the queue and the worker; each clone keeps its own
/// last-sample time.
#[derive(Debug, Clone)]
pub struct TickRecorder {
    /// Producer side of the hand-off queue.
    sender: mpsc::Sender<TickRecord>,
    /// Counters and worker handle.
    shared: Arc<Shared>,
    /// Receive time of the last tick seen by this handle.
    last_sample: Option<Timestamp>,
}

impl TickRecorder {
    /// Starts the worker thread and returns a recorder feeding it.
    ///
    /// # Arguments
    /// * `store` - Destination of the ticks
    /// * `capacity` - Hand-off queue length
    ///
    /// # Errors
    /// Returns an I/O error if the worker thread cannot be spawned.
    pub fn spawn<S>(store: S, capacity: usize) -> io::Result<Self>
    where
        S: TickStore + 'static,
    {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let shared = Arc::new(Shared::default());
        let worker_shared = Arc::clone(&shared);

        let handle = thread::Builder::new()
            .name("gatelink-ticks".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        error!(error = %err, "Cannot start tick worker runtime");
                        return;
                    }
                };
                runtime.block_on(drain(store, receiver, worker_shared));
            })?;

        *shared.worker.lock() = Some(handle);
        Ok(Self {
            sender,
            shared,
            last_sample: None,
        })
    }

    /// Opens a JSON-lines tick file and starts a recorder appending to it.
    ///
    /// # Arguments
    /// * `path` - Tick file, created if missing
    /// * `capacity` - Hand-off queue length
    ///
    /// # Errors
    /// Returns `GateLinkError::Store` if the file cannot be opened and
    /// `GateLinkError::Io` if the runtime or worker cannot be started.
    pub fn spawn_jsonl(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let store = runtime.block_on(JsonLinesTickStore::open(path))?;
        Ok(Self::spawn(store, capacity)?)
    }

    /// Queues a record without blocking.
    ///
    /// Returns false if the record was dropped.
    pub fn record(&mut self, record: TickRecord) -> bool {
        self.last_sample = Some(record.timestamp);
        match self.sender.try_send(record) {
            Ok(()) => {
                self.shared.accepted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Full(record)) => {
                let dropped = self.shared.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped.is_power_of_two() {
                    warn!(ticker_id = %record.ticker_id, dropped, "Tick queue full, dropping");
                }
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.shared.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Returns the receive time of the last tick seen by this handle.
    #[must_use]
    pub const fn last_sample(&self) -> Option<Timestamp> {
        self.last_sample
    }

    /// Returns the current counters.
    #[must_use]
    pub fn stats(&self) -> RecorderStats {
        RecorderStats {
            accepted: self.shared.accepted.load(Ordering::Relaxed),
            dropped: self.shared.dropped.load(Ordering::Relaxed),
            stored: self.shared.stored.load(Ordering::Relaxed),
            failed: self.shared.failed.load(Ordering::Relaxed),
        }
    }

    /// Closes this handle and waits for the worker to drain the queue.
    ///
    /// The worker only finishes once every clone has been dropped or shut
    /// down, so call this on the last handle.
    pub fn shutdown(self) -> RecorderStats {
        let Self { sender, shared, .. } = self;
        drop(sender);

        let handle = shared.worker.lock().take();
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            error!("Tick worker panicked");
        }

        RecorderStats {
            accepted: shared.accepted.load(Ordering::Relaxed),
            dropped: shared.dropped.load(Ordering::Relaxed),
            stored: shared.stored.load(Ordering::Relaxed),
            failed: shared.failed.load(Ordering::Relaxed),
        }
    }
}

/// Worker loop: stores records until every sender is gone.
async fn drain<S: TickStore>(store: S, mut receiver: mpsc::Receiver<TickRecord>, shared: Arc<Shared>) {
    while let Some(record) = receiver.recv().await {
        match store.insert(&record).await {
            Ok(()) => {
                shared.stored.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                shared.failed.fetch_add(1, Ordering::Relaxed);
                warn!(error = %err, "Tick not stored");
            }
        }
        if receiver.is_empty()
            && let Err(err) = store.flush().await
        {
            warn!(error = %err, "Tick store flush failed");
        }
    }
    if let Err(err) = store.flush().await {
        warn!(error = %err, "Tick store flush failed");
    }
    debug!(stored = store.len(), "Tick worker finished");
}

impl EventSink for TickRecorder {
    fn on_tick_price(
        &mut self,
        ticker_id: TickerId,
        field: TickField,
        price: f64,
        _can_auto_execute: bool,
    ) {
        self.record(TickRecord::price(ticker_id, field, price, Timestamp::now()));
    }

    fn on_tick_size(&mut self, ticker_id: TickerId, field: TickField, size: Decimal) {
        debug!(%ticker_id, %field, %size, "Tick size");
        self.record(TickRecord::size(ticker_id, field, size, Timestamp::now()));
    }
}
