//! On-device record storage port.

use crate::error::Result;

/// Key/value slot holding the raw persisted cart record.
///
/// Access is synchronous: persistence writes happen right after a state
/// commit, without awaiting.
pub trait CartRecordStore: Send + Sync {
    /// Reads the raw record. `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;

    /// Overwrites the raw record.
    fn write(&self, raw: &str) -> Result<()>;
}
