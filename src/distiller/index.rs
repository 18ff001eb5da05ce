//! Derived index records: reply threads and tag listings.

use serde_json::Value;
use tracing::debug;

use super::{Distiller, ListOptions, Listing};
use crate::address::{ContentAddress, IntoAddress, SourceSystem};
use crate::cache::{child_index_id, tag_index_id, CacheRecord, RecordKind};
use crate::error::Result;

impl Distiller {
    /// Replies to `address`, backed by the `child/<address>` index.
    ///
    /// On a miss or after expiry the index is rebuilt from the remote reply
    /// list, replacing the previous address list wholesale. Remote errors
    /// propagate; there is no stale fallback for indexes.
    pub async fn get_children(
        &self,
        address: impl IntoAddress,
        options: ListOptions,
    ) -> Result<Listing> {
        let address = address.into_address()?;
        let client = self.sources.client(address.source)?;
        let id = child_index_id(&address);

        let entries = match self.store.get(&id).await? {
            Some(index) if !index.is_expired() => {
                debug!(index = %id, "child index hit");
                index.entries
            }
            cached => {
                debug!(index = %id, "child index missing or expired, rebuilding");
                let replies = client.fetch_replies(&address).await?;
                self.rebuild_index(id, RecordKind::ChildIndex, address.source, replies, cached)
                    .await?
            }
        };

        self.resolve(entries, options).await
    }

    /// Newest posts carrying `tag`, backed by the `tag/<tag>` index.
    ///
    /// Listings come from the primary source system.
    pub async fn get_tag(&self, tag: &str, options: ListOptions) -> Result<Listing> {
        let client = self.sources.primary_client()?;
        let id = tag_index_id(tag);

        let entries = match self.store.get(&id).await? {
            Some(index) if !index.is_expired() => {
                debug!(index = %id, "tag index hit");
                index.entries
            }
            cached => {
                debug!(index = %id, limit = options.limit, "tag index missing or expired, rebuilding");
                let posts = client.fetch_discussions_by_tag(tag, options.limit).await?;
                self.rebuild_index(id, RecordKind::TagIndex, self.sources.primary(), posts, cached)
                    .await?
            }
        };

        self.resolve(entries, options).await
    }

    /// Runs `raw` through the pipeline and stores the resulting addresses as
    /// the new index, in remote order.
    async fn rebuild_index(
        &self,
        id: String,
        kind: RecordKind,
        source: SourceSystem,
        raw: Vec<Value>,
        previous: Option<CacheRecord>,
    ) -> Result<Vec<ContentAddress>> {
        let entries: Vec<ContentAddress> = self
            .normalize_posts(source, raw)
            .await?
            .into_iter()
            .map(|normalized| normalized.address)
            .collect();

        let mut index = CacheRecord::index(id, kind, entries.clone(), self.next_expiry()?);
        index.revision = previous.map_or(0, |record| record.revision);
        self.store.put(index).await?;

        Ok(entries)
    }
}
