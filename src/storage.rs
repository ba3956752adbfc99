// src/storage.rs
//! Fix record persistence behind a narrow interface

use crate::error::Result;
use crate::gps::FixRecord;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Destination for completed, validated fix records.
///
/// The recorder calls `insert` once per fix and treats failures as
/// recoverable: a store error is logged and ingestion continues.
#[allow(async_fn_in_trait)]
pub trait FixStore {
    /// Persist one fix record.
    async fn insert(&mut self, fix: &FixRecord) -> Result<()>;
}

/// Appends one JSON object per fix to a file.
///
/// Each line carries latitude, longitude, date, time, speed, bearing and the
/// fix quality as an integer.
pub struct JsonlStore {
    file: File,
}

impl JsonlStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .await?;
        Ok(Self { file })
    }
}

impl FixStore for JsonlStore {
    async fn insert(&mut self, fix: &FixRecord) -> Result<()> {
        let mut line = serde_json::to_string(fix)?;
        line.push('\n');
        self.file.write_all(line.as_bytes()).await?;
        self.file.flush().await?;
        Ok(())
    }
}

/// Collects fix records in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<FixRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[FixRecord] {
        &self.records
    }
}

impl FixStore for MemoryStore {
    async fn insert(&mut self, fix: &FixRecord) -> Result<()> {
        self.records.push(fix.clone());
        Ok(())
    }
}
