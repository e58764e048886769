//! In-memory record store.

use std::sync::Mutex;

use cartsync_core::CartRecordStore;
use cartsync_core::error::{CartError, Result};

/// Keeps the raw record in memory. Used by tests and by callers with no disk.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    slot: Mutex<Option<String>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `raw`.
    pub fn with_record(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }
}

impl CartRecordStore for MemoryRecordStore {
    fn read(&self) -> Result<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| CartError::storage(format!("Record slot poisoned: {}", e)))?;
        Ok(slot.clone())
    }

    fn write(&self, raw: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| CartError::storage(format!("Record slot poisoned: {}", e)))?;
        *slot = Some(raw.to_string());
        Ok(())
    }
}
