/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! JSON-lines tick store.
//!
//! Each record becomes one line of JSON appended to a file. Existing files
//! are appended to, never truncated.

use crate::traits::{TickRecord, TickStore};
use async_trait::async_trait;
use gatelink_core::error::StoreError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// Tick store backed by an append-only JSON-lines file.
#[derive(Debug)]
pub struct JsonLinesTickStore {
    /// File location.
    path: PathBuf,
    /// Buffered writer.
    writer: Mutex<BufWriter<File>>,
    /// Records written through this handle.
    written: AtomicUsize,
}

impl JsonLinesTickStore {
    /// Opens `path` for appending, creating it if needed.
    ///
    /// # Errors
    /// Returns `StoreError::Io` if the file cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {e}", path.display())))?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
            written: AtomicUsize::new(0),
        })
    }

    /// Returns the file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TickStore for JsonLinesTickStore {
    async fn insert(&self, record: &TickRecord) -> Result<(), StoreError> {
        let mut line =
            serde_json::to_vec(record).map_err(|e| StoreError::Serialize(e.to_string()))?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .map_err(|e| StoreError::StoreFailed {
                ticker_id: record.ticker_id.value(),
                reason: e.to_string(),
            })?;
        self.written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn len(&self) -> usize {
        self.written.load(Ordering::Relaxed)
    }

    async fn flush(&self) -> Result<(), StoreError> {
        self.writer
            .lock()
            .await
            .flush()
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }
}
