//! Distiller Module
//!
//! The cache/freshness engine. Every read goes through the persistent cache
//! first and only reaches the remote network on a miss or after expiry.
//!
//! # Operations
//! - [`Distiller::get_content`] - post or account body, stale-on-error fallback
//! - [`Distiller::get_children`] - reply-thread index under `child/<address>`
//! - [`Distiller::get_tag`] - tag listing index under `tag/<tag>`
//! - [`Distiller::get_posts`] - blog feed cached on the account record
//! - [`Distiller::get_account`] - profile, remote errors propagate
//! - [`Distiller::get_follower_count`] - uncached passthrough
//!
//! Concurrent reads of the same key are not coalesced: each may issue its own
//! remote fetch, and the store's revision check settles the writes.

mod account;
mod content;
mod index;
mod pipeline;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::address::ContentAddress;
use crate::cache::{CacheRecord, CacheStats, PersistentCache};
use crate::config::{Config, MAX_EXPIRE_SECS};
use crate::error::{DistillerError, Result};
use crate::remote::SourceRegistry;

pub use pipeline::{address_of, NormalizedPost, ADDRESS_FIELD};

/// Default record lifetime: fifteen minutes.
pub const DEFAULT_EXPIRE_SECS: i64 = 15 * 60;

/// Default page size for tag and reply listings.
pub const DEFAULT_LIST_LIMIT: usize = 25;

/// Default page size for blog feeds.
pub const DEFAULT_FEED_LIMIT: usize = 10;

// == List Options ==
/// Paging and output shape for listing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum number of items returned
    pub limit: usize,
    /// Hydrate items into posts instead of returning bare addresses
    pub resolve: bool,
}

impl ListOptions {
    pub const fn new(limit: usize, resolve: bool) -> Self {
        Self { limit, resolve }
    }

    /// Defaults for [`Distiller::get_posts`].
    pub const fn feed() -> Self {
        Self::new(DEFAULT_FEED_LIMIT, true)
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::new(DEFAULT_LIST_LIMIT, true)
    }
}

// == Listing ==
/// Output of a listing operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    /// Bare addresses, in listing order
    Addresses(Vec<ContentAddress>),
    /// Addresses resolved through the content cache
    Records(Vec<CacheRecord>),
    /// Raw posts as delivered in a blog feed
    Posts(Vec<Value>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Listing::Addresses(items) => items.len(),
            Listing::Records(items) => items.len(),
            Listing::Posts(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Distiller ==
/// Read-through, stale-while-revalidate cache in front of remote sources.
pub struct Distiller {
    store: Arc<dyn PersistentCache>,
    sources: SourceRegistry,
    default_expire: Duration,
}

impl Distiller {
    // == Constructor ==
    pub fn new(store: Arc<dyn PersistentCache>, sources: SourceRegistry) -> Self {
        Self {
            store,
            sources,
            default_expire: Duration::seconds(DEFAULT_EXPIRE_SECS),
        }
    }

    /// Builds a distiller whose record lifetime comes from `config`, capped at
    /// [`MAX_EXPIRE_SECS`].
    pub fn from_config(
        config: &Config,
        store: Arc<dyn PersistentCache>,
        sources: SourceRegistry,
    ) -> Self {
        let expire = i64::try_from(config.default_expire_secs.min(MAX_EXPIRE_SECS))
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| Duration::seconds(DEFAULT_EXPIRE_SECS));
        Self::new(store, sources).with_expire(expire)
    }

    /// Overrides the lifetime given to every written record.
    pub fn with_expire(mut self, expire: Duration) -> Self {
        self.default_expire = expire;
        self
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    /// Wipes the whole cache. Maintenance and tests only.
    pub async fn drop_all(&self) -> Result<()> {
        self.store.drop_all().await
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.stats().await
    }

    fn next_expiry(&self) -> Result<DateTime<Utc>> {
        Utc::now()
            .checked_add_signed(self.default_expire)
            .ok_or_else(|| {
                DistillerError::Internal(format!(
                    "record lifetime of {}s overflows the clock",
                    self.default_expire.num_seconds()
                ))
            })
    }

    /// Applies `options` to an index's address list.
    async fn resolve(&self, entries: Vec<ContentAddress>, options: ListOptions) -> Result<Listing> {
        let entries: Vec<ContentAddress> = entries.into_iter().take(options.limit).collect();
        if !options.resolve {
            return Ok(Listing::Addresses(entries));
        }

        // Sequential on purpose: each entry is its own read-through
        let mut records = Vec::with_capacity(entries.len());
        for address in entries {
            records.push(self.get_content(address).await?);
        }
        Ok(Listing::Records(records))
    }
}
