//! Post normalization pipeline.
//!
//! Turns raw remote posts into addressed cache entries. Posts that are already
//! cached are never overwritten here, even when newer remote data is at hand
//! and the cached copy is stale; refreshing is left to the content read-through.

use serde_json::Value;
use tracing::trace;

use super::Distiller;
use crate::address::{ContentAddress, SourceSystem};
use crate::cache::{CacheRecord, RecordKind};
use crate::error::{DistillerError, Result};
use crate::remote::decode_metadata;

/// Field an already-addressed item may carry instead of author and permlink.
pub const ADDRESS_FIELD: &str = "address";

/// A raw post paired with its canonical address.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPost {
    pub post: Value,
    pub address: ContentAddress,
}

fn non_empty_str<'a>(post: &'a Value, field: &str) -> Option<&'a str> {
    post.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

/// Derives the canonical address of a raw post delivered by `source`.
pub fn address_of(source: SourceSystem, post: &Value) -> Result<ContentAddress> {
    if let (Some(author), Some(permlink)) = (
        non_empty_str(post, "author"),
        non_empty_str(post, "permlink"),
    ) {
        // The author segment cannot hold the separator and still round-trip
        if author.contains(':') {
            return Err(DistillerError::InvalidPost(format!(
                "author '{}' contains ':'",
                author
            )));
        }
        return Ok(ContentAddress::post(source, author, permlink));
    }

    match non_empty_str(post, ADDRESS_FIELD) {
        Some(raw) => ContentAddress::parse(raw),
        None => Err(DistillerError::InvalidPost(
            "expected author and permlink, or an address".to_string(),
        )),
    }
}

impl Distiller {
    /// Addresses, decodes and caches each post, in input order.
    ///
    /// Stops at the first post that cannot be addressed.
    pub async fn normalize_posts(
        &self,
        source: SourceSystem,
        posts: Vec<Value>,
    ) -> Result<Vec<NormalizedPost>> {
        let mut normalized = Vec::with_capacity(posts.len());

        for mut post in posts {
            let address = address_of(source, &post)?;
            decode_metadata(&mut post);

            let id = address.to_string();
            match self.store.get(&id).await? {
                Some(existing) if existing.is_expired() => {
                    trace!(address = %address, "stale post left for read-through refresh");
                }
                Some(_) => {}
                None => {
                    let record = CacheRecord::new(
                        id,
                        RecordKind::Post,
                        Some(post.clone()),
                        self.next_expiry()?,
                    );
                    self.store.put(record).await?;
                }
            }

            normalized.push(NormalizedPost { post, address });
        }

        Ok(normalized)
    }
}
