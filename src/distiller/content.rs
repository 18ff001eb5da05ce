//! Content read-through with stale-on-error fallback.

use tracing::{debug, warn};

use super::Distiller;
use crate::address::{ContentAddress, IntoAddress};
use crate::cache::{CacheRecord, RecordKind};
use crate::error::{DistillerError, Result};
use crate::remote::RemoteSourceClient;

impl Distiller {
    /// Returns the cached record for `address`, refreshing it when missing or
    /// expired.
    ///
    /// A live record is returned without contacting the remote. When a refresh
    /// fails, the previous payload is served if there is one; otherwise the
    /// call fails with [`DistillerError::PersistentFetchFailure`].
    pub async fn get_content(&self, address: impl IntoAddress) -> Result<CacheRecord> {
        let address = address.into_address()?;
        let client = self.sources.client(address.source)?;
        let cached = self.store.get(&address.to_string()).await?;

        match &cached {
            Some(record) if !record.is_expired() => {
                debug!(address = %address, "content cache hit");
                return Ok(record.clone());
            }
            Some(_) => debug!(address = %address, "content expired, refreshing"),
            None => debug!(address = %address, "content cache miss"),
        }

        match self
            .refresh_content(client.as_ref(), &address, cached.as_ref())
            .await
        {
            Ok(record) => Ok(record),
            Err(err) => match cached {
                Some(stale) if stale.payload.is_some() => {
                    warn!(address = %address, error = %err, "refresh failed, serving stale content");
                    Ok(stale)
                }
                _ => Err(DistillerError::PersistentFetchFailure {
                    address: address.to_string(),
                    reason: err.to_string(),
                }),
            },
        }
    }

    async fn refresh_content(
        &self,
        client: &dyn RemoteSourceClient,
        address: &ContentAddress,
        cached: Option<&CacheRecord>,
    ) -> Result<CacheRecord> {
        let fetched = if address.is_account() {
            client.fetch_account(address).await?
        } else {
            client.fetch_content(address).await?
        };

        if fetched.is_none() {
            // No content is a normal outcome; never replace a payload with it
            if let Some(stale) = cached.filter(|record| record.payload.is_some()) {
                warn!(address = %address, "remote returned no content, keeping cached payload");
                return Ok(stale.clone());
            }
            debug!(address = %address, "remote returned no content, caching empty record");
        }

        let kind = if address.is_account() {
            RecordKind::Account
        } else {
            RecordKind::Post
        };
        let expires_at = self.next_expiry()?;

        self.store
            .upsert_mutate(&address.to_string(), &|doc| {
                doc.kind = kind;
                doc.payload = fetched.clone();
                doc.expires_at = expires_at;
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{expired, harness, live, raw_post};
    use super::*;
    use crate::cache::PersistentCache;
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn test_cold_fetch_then_cache_hit() {
        let h = harness();
        h.remote.set_content(
            "hive:alice:my-post",
            json!({ "author": "alice", "permlink": "my-post", "body": "hi" }),
        );

        let first = h.distiller.get_content("hive:alice:my-post").await.unwrap();
        assert_eq!(first.payload.as_ref().unwrap()["body"], "hi");
        assert!(first.expires_at > Utc::now());
        assert_eq!(first.kind, RecordKind::Post);

        let second = h.distiller.get_content("hive:alice:my-post").await.unwrap();
        assert_eq!(second, first);
        assert_eq!(h.remote.calls().content, 1);
    }

    #[tokio::test]
    async fn test_live_record_ignores_upstream_changes() {
        let h = harness();
        h.store
            .put(live("hive:alice:p", RecordKind::Post, Some(json!({ "body": "old" }))))
            .await
            .unwrap();
        h.remote.set_content("hive:alice:p", raw_post("alice", "p", "new"));

        let record = h.distiller.get_content("hive:alice:p").await.unwrap();

        assert_eq!(record.payload.unwrap()["body"], "old");
        assert_eq!(h.remote.calls().content, 0);
    }

    #[tokio::test]
    async fn test_expired_record_is_refreshed_in_place() {
        let h = harness();
        let seeded = h
            .store
            .put(expired("hive:alice:p", RecordKind::Post, Some(json!({ "body": "old" }))))
            .await
            .unwrap();
        h.remote.set_content("hive:alice:p", raw_post("alice", "p", "new"));

        let record = h.distiller.get_content("hive:alice:p").await.unwrap();

        assert_eq!(record.payload.as_ref().unwrap()["body"], "new");
        assert_eq!(record.id, "hive:alice:p");
        assert_eq!(record.revision, seeded.revision + 1);
        assert!(record.expires_at > seeded.expires_at);
        assert_eq!(h.remote.calls().content, 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_serves_stale_payload() {
        let h = harness();
        let seeded = h
            .store
            .put(expired("hive:alice:p", RecordKind::Post, Some(json!({ "body": "old" }))))
            .await
            .unwrap();
        h.remote.set_failing(true);

        let record = h.distiller.get_content("hive:alice:p").await.unwrap();

        assert_eq!(record, seeded);
        assert_eq!(h.remote.calls().content, 1);
    }

    #[tokio::test]
    async fn test_failed_cold_fetch_is_persistent_failure() {
        let h = harness();
        h.remote.set_failing(true);

        let result = h.distiller.get_content("hive:alice:p").await;

        assert!(matches!(
            result,
            Err(DistillerError::PersistentFetchFailure { address, .. }) if address == "hive:alice:p"
        ));
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_refresh_without_payload_is_persistent_failure() {
        let h = harness();
        h.store
            .put(expired("hive:alice:p", RecordKind::Post, None))
            .await
            .unwrap();
        h.remote.set_failing(true);

        let result = h.distiller.get_content("hive:alice:p").await;
        assert!(matches!(result, Err(DistillerError::PersistentFetchFailure { .. })));
    }

    #[tokio::test]
    async fn test_no_content_keeps_stale_payload() {
        let h = harness();
        let seeded = h
            .store
            .put(expired("hive:alice:p", RecordKind::Post, Some(json!({ "body": "old" }))))
            .await
            .unwrap();

        let record = h.distiller.get_content("hive:alice:p").await.unwrap();

        assert_eq!(record, seeded);
        let stored = h.store.get("hive:alice:p").await.unwrap().unwrap();
        assert_eq!(stored.payload, Some(json!({ "body": "old" })));
    }

    #[tokio::test]
    async fn test_no_content_on_cold_fetch_caches_empty_record() {
        let h = harness();

        let record = h.distiller.get_content("hive:ghost:nothing").await.unwrap();
        assert!(record.payload.is_none());
        assert!(!record.is_expired());

        h.distiller.get_content("hive:ghost:nothing").await.unwrap();
        assert_eq!(h.remote.calls().content, 1);
    }

    #[tokio::test]
    async fn test_account_address_fetches_profile() {
        let h = harness();
        h.remote.set_account("alice", json!({ "name": "alice" }));

        let record = h.distiller.get_content("hive:alice").await.unwrap();

        assert_eq!(record.kind, RecordKind::Account);
        assert_eq!(record.payload.unwrap()["name"], "alice");
        assert_eq!(h.remote.calls().account, 1);
        assert_eq!(h.remote.calls().content, 0);
    }

    #[tokio::test]
    async fn test_parse_and_dispatch_errors_propagate() {
        let h = harness();

        assert!(matches!(
            h.distiller.get_content("hive").await,
            Err(DistillerError::Parse(_))
        ));
        assert!(matches!(
            h.distiller.get_content("steem:alice:p").await,
            Err(DistillerError::UnknownSourceSystem(_))
        ));
        // Known system with no registered backend
        assert!(matches!(
            h.distiller.get_content("orbitdb:alice:p").await,
            Err(DistillerError::UnknownSourceSystem(_))
        ));
        assert_eq!(h.remote.calls().content, 0);
    }
}
