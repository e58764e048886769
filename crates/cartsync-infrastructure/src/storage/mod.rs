//! Record stores backing the on-device cart snapshot.

mod file_record_store;
mod memory_record_store;

pub use file_record_store::FileRecordStore;
pub use memory_record_store::MemoryRecordStore;
