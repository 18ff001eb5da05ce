//! Remote Source Module
//!
//! Pluggable clients for the slow, rate-limited content networks the cache
//! sits in front of, and the registry that dispatches to them by source system.

mod error;
pub mod hive;
pub mod mock;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::address::{ContentAddress, SourceSystem};
use crate::error::{DistillerError, Result};

pub use error::RemoteError;
pub use hive::{HiveClient, HiveConfig};
pub use mock::{MockCalls, MockSource};

/// Field carrying post metadata, delivered by the network as JSON text.
pub const METADATA_FIELD: &str = "json_metadata";

// == Remote Source Client ==
/// Raw access to one content network.
///
/// Payloads are returned exactly as the network shapes them, apart from
/// metadata decoding.
#[async_trait]
pub trait RemoteSourceClient: Send + Sync {
    /// Fetches a single post.
    ///
    /// `Ok(None)` means no content, including when a backend has exhausted its
    /// retries; callers treat it as a normal outcome.
    async fn fetch_content(
        &self,
        address: &ContentAddress,
    ) -> std::result::Result<Option<Value>, RemoteError>;

    /// Fetches the profile of `address.author`.
    async fn fetch_account(
        &self,
        address: &ContentAddress,
    ) -> std::result::Result<Option<Value>, RemoteError>;

    /// Newest-first posts carrying `tag`.
    async fn fetch_discussions_by_tag(
        &self,
        tag: &str,
        limit: usize,
    ) -> std::result::Result<Vec<Value>, RemoteError>;

    /// Newest-first blog feed of `author`.
    async fn fetch_blog_feed(
        &self,
        author: &str,
        limit: usize,
    ) -> std::result::Result<Vec<Value>, RemoteError>;

    /// Direct replies to `parent`.
    async fn fetch_replies(
        &self,
        parent: &ContentAddress,
    ) -> std::result::Result<Vec<Value>, RemoteError>;

    async fn fetch_follower_count(
        &self,
        address: &ContentAddress,
    ) -> std::result::Result<u64, RemoteError>;
}

// == Source Registry ==
/// Maps each source system to the client serving it.
#[derive(Clone)]
pub struct SourceRegistry {
    clients: HashMap<SourceSystem, Arc<dyn RemoteSourceClient>>,
    primary: SourceSystem,
}

impl SourceRegistry {
    /// Creates an empty registry; `primary` serves queries not tied to an
    /// address, such as tag listings.
    pub fn new(primary: SourceSystem) -> Self {
        Self {
            clients: HashMap::new(),
            primary,
        }
    }

    /// Registers `client` for `system`, replacing any previous one.
    pub fn with_client(mut self, system: SourceSystem, client: Arc<dyn RemoteSourceClient>) -> Self {
        self.clients.insert(system, client);
        self
    }

    /// Client for `system`; fails fast when none is registered.
    pub fn client(&self, system: SourceSystem) -> Result<Arc<dyn RemoteSourceClient>> {
        self.clients
            .get(&system)
            .cloned()
            .ok_or_else(|| DistillerError::UnknownSourceSystem(system.to_string()))
    }

    pub fn primary(&self) -> SourceSystem {
        self.primary
    }

    pub fn primary_client(&self) -> Result<Arc<dyn RemoteSourceClient>> {
        self.client(self.primary)
    }
}

impl fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("systems", &self.clients.keys().collect::<Vec<_>>())
            .field("primary", &self.primary)
            .finish()
    }
}

// == Metadata Decoding ==
/// Replaces a text-encoded metadata field with the JSON it encodes.
///
/// Text that is not valid JSON is left in place.
pub fn decode_metadata(post: &mut Value) {
    let Some(field) = post.get_mut(METADATA_FIELD) else {
        return;
    };
    let Value::String(raw) = field else {
        return;
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(decoded) => *field = decoded,
        Err(err) => debug!(error = %err, "leaving undecodable metadata as text"),
    }
}
