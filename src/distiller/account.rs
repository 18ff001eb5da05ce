//! Account profiles, blog feeds and follower counts.
//!
//! Profiles and feeds live on the same record (id = account address). Each
//! operation only writes its own fields, so one never clears the other's data,
//! but either may extend the shared expiry.

use tracing::debug;

use super::{Distiller, ListOptions, Listing};
use crate::address::IntoAddress;
use crate::cache::{CacheRecord, RecordKind};
use crate::error::Result;

impl Distiller {
    /// Blog feed of the account at `address`, cached on the account record.
    ///
    /// The feed is fetched when the record is missing, or when it is still
    /// live but has no feed yet. An expired record keeps serving whatever
    /// feed it holds. `options.resolve` selects raw posts over addresses.
    pub async fn get_posts(&self, address: impl IntoAddress, options: ListOptions) -> Result<Listing> {
        let address = address.into_address()?;
        let client = self.sources.client(address.source)?;
        let id = address.to_string();

        let feed = match self.store.get(&id).await? {
            None => {
                debug!(address = %address, "no account record, fetching blog feed");
                let feed = client.fetch_blog_feed(&address.author, options.limit).await?;
                let expires_at = self.next_expiry()?;
                self.store
                    .upsert_mutate(&id, &|doc| {
                        doc.kind = RecordKind::Account;
                        doc.posts = Some(feed.clone());
                        doc.expires_at = expires_at;
                    })
                    .await?;
                feed
            }
            Some(record) if !record.is_expired() && record.posts.is_none() => {
                debug!(address = %address, "live account record without feed, fetching");
                let feed = client.fetch_blog_feed(&address.author, options.limit).await?;
                self.store
                    .upsert_mutate(&id, &|doc| doc.posts = Some(feed.clone()))
                    .await?;
                feed
            }
            Some(record) => {
                debug!(
                    address = %address,
                    expired = record.is_expired(),
                    "serving cached blog feed"
                );
                record.posts.unwrap_or_default()
            }
        };

        let normalized = self.normalize_posts(address.source, feed).await?;
        Ok(if options.resolve {
            Listing::Posts(normalized.into_iter().map(|n| n.post).collect())
        } else {
            Listing::Addresses(normalized.into_iter().map(|n| n.address).collect())
        })
    }

    /// Profile of the account at `address`.
    ///
    /// Refreshed when missing, expired or without a profile payload. Remote
    /// errors propagate unconditionally; a stale profile is never served in
    /// their place.
    pub async fn get_account(&self, address: impl IntoAddress) -> Result<CacheRecord> {
        let address = address.into_address()?;
        let client = self.sources.client(address.source)?;
        let id = address.to_string();

        let cached = self.store.get(&id).await?;
        match &cached {
            Some(record) if !record.is_expired() && record.payload.is_some() => {
                debug!(address = %address, "account cache hit");
                return Ok(record.clone());
            }
            Some(record) if record.is_expired() => {
                debug!(address = %address, "account expired, refreshing")
            }
            Some(_) => debug!(address = %address, "account record without profile, fetching"),
            None => debug!(address = %address, "account cache miss"),
        }

        let profile = client.fetch_account(&address).await?;
        let expires_at = self.next_expiry()?;
        let is_new = cached.is_none();

        self.store
            .upsert_mutate(&id, &|doc| {
                if is_new {
                    doc.kind = RecordKind::Account;
                }
                doc.payload = profile.clone();
                doc.expires_at = expires_at;
            })
            .await
    }

    /// Current follower count of the account at `address`. Never cached.
    pub async fn get_follower_count(&self, address: impl IntoAddress) -> Result<u64> {
        let address = address.into_address()?;
        let client = self.sources.client(address.source)?;
        Ok(client.fetch_follower_count(&address).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{capture_logs, expired, harness, live, raw_post};
    use super::*;
    use crate::cache::PersistentCache;
    use crate::error::DistillerError;
    use serde_json::json;

    #[tokio::test]
    async fn test_posts_cold_fetch_caches_feed() {
        let h = harness();
        h.remote.set_blog(
            "alice",
            vec![raw_post("alice", "one", "1"), raw_post("alice", "two", "2")],
        );

        let listing = h
            .distiller
            .get_posts("hive:alice", ListOptions::feed())
            .await
            .unwrap();

        match listing {
            Listing::Posts(posts) => {
                assert_eq!(posts.len(), 2);
                assert_eq!(posts[0]["json_metadata"]["tags"][0], "gaming");
            }
            other => panic!("expected posts, got {:?}", other),
        }
        let record = h.store.get("hive:alice").await.unwrap().unwrap();
        assert_eq!(record.kind, RecordKind::Account);
        assert_eq!(record.posts.map(|p| p.len()), Some(2));
        assert!(h.store.get("hive:alice:two").await.unwrap().is_some());
        assert_eq!(h.remote.calls().blog, 1);
    }

    #[tokio::test]
    async fn test_posts_second_call_uses_cached_feed() {
        let h = harness();
        h.remote.set_blog("alice", vec![raw_post("alice", "one", "1")]);

        h.distiller.get_posts("hive:alice", ListOptions::feed()).await.unwrap();
        let listing = h
            .distiller
            .get_posts("hive:alice", ListOptions::new(10, false))
            .await
            .unwrap();

        assert_eq!(listing, Listing::Addresses(vec!["hive:alice:one".parse().unwrap()]));
        assert_eq!(h.remote.calls().blog, 1);
    }

    #[tokio::test]
    async fn test_posts_refreshes_live_record_without_feed() {
        let h = harness();
        h.store
            .put(live("hive:alice", RecordKind::Account, Some(json!({ "name": "alice" }))))
            .await
            .unwrap();
        h.remote.set_blog("alice", vec![raw_post("alice", "one", "1")]);

        let listing = h.distiller.get_posts("hive:alice", ListOptions::feed()).await.unwrap();

        assert_eq!(listing.len(), 1);
        assert_eq!(h.remote.calls().blog, 1);
        let record = h.store.get("hive:alice").await.unwrap().unwrap();
        assert_eq!(record.payload, Some(json!({ "name": "alice" })));
        assert!(record.posts.is_some());
    }

    #[tokio::test]
    async fn test_posts_expired_record_does_not_refresh() {
        let h = harness();
        let mut seeded = expired("hive:alice", RecordKind::Account, None);
        seeded.posts = Some(vec![raw_post("alice", "old", "1")]);
        h.store.put(seeded).await.unwrap();
        h.remote.set_blog("alice", vec![raw_post("alice", "new", "2")]);

        let listing = h
            .distiller
            .get_posts("hive:alice", ListOptions::new(10, false))
            .await
            .unwrap();

        assert_eq!(listing, Listing::Addresses(vec!["hive:alice:old".parse().unwrap()]));
        assert_eq!(h.remote.calls().blog, 0);
    }

    #[tokio::test]
    async fn test_posts_expired_record_without_feed_is_empty() {
        let h = harness();
        h.store
            .put(expired("hive:alice", RecordKind::Account, None))
            .await
            .unwrap();

        let listing = h.distiller.get_posts("hive:alice", ListOptions::feed()).await.unwrap();

        assert!(listing.is_empty());
        assert_eq!(h.remote.calls().blog, 0);
    }

    #[tokio::test]
    async fn test_account_cold_then_cached() {
        let h = harness();
        h.remote.set_account("alice", json!({ "name": "alice", "reputation": 70 }));

        let first = h.distiller.get_account("hive:alice").await.unwrap();
        assert_eq!(first.kind, RecordKind::Account);
        assert_eq!(first.payload.as_ref().unwrap()["reputation"], 70);

        let second = h.distiller.get_account("hive:alice").await.unwrap();
        assert_eq!(second, first);
        assert_eq!(h.remote.calls().account, 1);
    }

    #[tokio::test]
    async fn test_account_refreshes_record_without_payload() {
        let h = harness();
        // Feed-only record written by get_posts
        h.remote.set_blog("alice", vec![raw_post("alice", "one", "1")]);
        h.distiller.get_posts("hive:alice", ListOptions::feed()).await.unwrap();
        h.remote.set_account("alice", json!({ "name": "alice" }));

        let record = h.distiller.get_account("hive:alice").await.unwrap();

        assert_eq!(record.payload, Some(json!({ "name": "alice" })));
        assert!(record.posts.is_some(), "profile refresh keeps the cached feed");
        assert_eq!(h.remote.calls().account, 1);
    }

    #[tokio::test]
    async fn test_account_failure_propagates_despite_stale_profile() {
        let h = harness();
        h.store
            .put(expired("hive:alice", RecordKind::Account, Some(json!({ "name": "alice" }))))
            .await
            .unwrap();
        h.remote.set_failing(true);

        let result = h.distiller.get_account("hive:alice").await;

        assert!(matches!(result, Err(DistillerError::Remote(_))));
    }

    #[tokio::test]
    async fn test_dispatch_errors_propagate_from_account_operations() {
        let h = harness();

        for raw in ["hive", "steem:alice", "orbitdb:alice"] {
            let posts = h.distiller.get_posts(raw, ListOptions::feed()).await;
            let account = h.distiller.get_account(raw).await;
            let followers = h.distiller.get_follower_count(raw).await;

            let expect_parse = raw == "hive";
            for outcome in [posts.map(|_| ()), account.map(|_| ()), followers.map(|_| ())] {
                match outcome {
                    Err(DistillerError::Parse(_)) => assert!(expect_parse, "{}", raw),
                    Err(DistillerError::UnknownSourceSystem(_)) => assert!(!expect_parse, "{}", raw),
                    other => panic!("{}: unexpected {:?}", raw, other),
                }
            }
        }

        let calls = h.remote.calls();
        assert_eq!((calls.blog, calls.account, calls.followers), (0, 0, 0));
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_cached_feed_read_is_logged() {
        let h = harness();
        let mut seeded = expired("hive:alice", RecordKind::Account, None);
        seeded.posts = Some(vec![raw_post("alice", "old", "1")]);
        h.store.put(seeded).await.unwrap();
        let (logs, _guard) = capture_logs();

        h.distiller.get_posts("hive:alice", ListOptions::feed()).await.unwrap();

        let output = logs.contents();
        assert!(output.contains("serving cached blog feed"), "{}", output);
        assert!(output.contains("expired=true"), "{}", output);
    }

    #[tokio::test]
    async fn test_account_refresh_paths_are_logged() {
        let h = harness();
        h.remote.set_account("alice", json!({ "name": "alice" }));
        h.store
            .put(expired("hive:bob", RecordKind::Account, Some(json!({ "name": "bob" }))))
            .await
            .unwrap();
        let (logs, _guard) = capture_logs();

        h.distiller.get_account("hive:alice").await.unwrap();
        h.distiller.get_account("hive:bob").await.unwrap();

        let output = logs.contents();
        assert!(output.contains("account cache miss"), "{}", output);
        assert!(output.contains("account expired, refreshing"), "{}", output);
    }

    #[tokio::test]
    async fn test_follower_count_is_uncached() {
        let h = harness();
        h.remote.set_followers("alice", 42);

        assert_eq!(h.distiller.get_follower_count("hive:alice").await.unwrap(), 42);
        assert_eq!(h.distiller.get_follower_count("hive:alice:post").await.unwrap(), 42);
        assert_eq!(h.remote.calls().followers, 2);
        assert!(h.store.is_empty().await);
    }
}
