//! Cache Store Module
//!
//! Persistent cache abstraction with optimistic concurrency, plus the
//! in-memory implementation used by the binary and the tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheRecord, CacheStats};
use crate::error::{DistillerError, Result};

// == Persistent Cache ==
/// Document store keyed by canonical address strings and index ids.
///
/// Each operation is individually atomic; there are no multi-record
/// transactions.
#[async_trait]
pub trait PersistentCache: Send + Sync {
    /// Looks up a record by id.
    async fn get(&self, id: &str) -> Result<Option<CacheRecord>>;

    /// Creates or replaces a record.
    ///
    /// Replacing requires `record.revision` to match the stored revision;
    /// creating requires revision 0. Otherwise fails with
    /// [`DistillerError::Conflict`]. Returns the record as stored, carrying its
    /// new revision.
    async fn put(&self, record: CacheRecord) -> Result<CacheRecord>;

    /// Wipes every record.
    async fn drop_all(&self) -> Result<()>;

    /// Current activity counters.
    async fn stats(&self) -> CacheStats;

    /// Atomic read-modify-write of `id`, retried once on conflict.
    ///
    /// `mutate` receives the stored record, or a blank expired one when `id`
    /// does not exist yet. It may run twice, so it must not consume captured state.
    async fn upsert_mutate(
        &self,
        id: &str,
        mutate: &(dyn for<'a> Fn(&'a mut CacheRecord) + Send + Sync),
    ) -> Result<CacheRecord> {
        match upsert_once(self, id, mutate).await {
            Err(DistillerError::Conflict(_)) => {
                debug!(id, "upsert hit a revision conflict, retrying");
                upsert_once(self, id, mutate).await
            }
            other => other,
        }
    }
}

async fn upsert_once<S>(
    store: &S,
    id: &str,
    mutate: &(dyn for<'a> Fn(&'a mut CacheRecord) + Send + Sync),
) -> Result<CacheRecord>
where
    S: PersistentCache + ?Sized,
{
    let mut doc = store
        .get(id)
        .await?
        .unwrap_or_else(|| CacheRecord::blank(id));
    mutate(&mut doc);
    doc.id = id.to_string();
    store.put(doc).await
}

// == Memory Store ==
/// In-process [`PersistentCache`] backed by a HashMap.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    records: HashMap<String, CacheRecord>,
    stats: CacheStats,
}

impl MemoryStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current number of records.
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }
}

#[async_trait]
impl PersistentCache for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<CacheRecord>> {
        // Write lock: lookups update the counters
        let mut state = self.state.write().await;
        let record = state.records.get(id).cloned();

        if record.is_some() {
            state.stats.record_hit();
        } else {
            state.stats.record_miss();
        }
        Ok(record)
    }

    async fn put(&self, mut record: CacheRecord) -> Result<CacheRecord> {
        let mut state = self.state.write().await;
        let current = state
            .records
            .get(&record.id)
            .map(|existing| existing.revision)
            .unwrap_or(0);

        if record.revision != current {
            state.stats.record_conflict();
            warn!(
                id = %record.id,
                expected = current,
                got = record.revision,
                "rejected write with stale revision"
            );
            return Err(DistillerError::Conflict(record.id));
        }

        record.revision = current + 1;
        state.records.insert(record.id.clone(), record.clone());
        state.stats.record_write();
        let total = state.records.len();
        state.stats.set_total_entries(total);

        Ok(record)
    }

    async fn drop_all(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.records.clear();
        state.stats = CacheStats::new();
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        let state = self.state.read().await;
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.records.len());
        stats
    }
}
