//! Cache Module
//!
//! Persistent document cache with per-record expiry and revision tokens.

mod record;
mod stats;
mod store;


// Re-export public types
pub use record::{
    child_index_id, tag_index_id, CacheRecord, RecordKind, CHILD_INDEX_PREFIX, TAG_INDEX_PREFIX,
};
pub use stats::CacheStats;
pub use store::{MemoryStore, PersistentCache};
