//! Cache Record Module
//!
//! Defines the document shape stored for posts, accounts and derived indexes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::ContentAddress;

/// Id prefix of tag listing indexes.
pub const TAG_INDEX_PREFIX: &str = "tag/";

/// Id prefix of reply-thread indexes.
pub const CHILD_INDEX_PREFIX: &str = "child/";

/// Id of the tag index for `tag`.
pub fn tag_index_id(tag: &str) -> String {
    format!("{}{}", TAG_INDEX_PREFIX, tag)
}

/// Id of the reply index for `parent`.
pub fn child_index_id(parent: &ContentAddress) -> String {
    format!("{}{}", CHILD_INDEX_PREFIX, parent)
}

// == Record Kind ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    Post,
    Account,
    TagIndex,
    ChildIndex,
}

// == Cache Record ==
/// A single document in the persistent cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Canonical address string or synthetic index id
    pub id: String,
    pub kind: RecordKind,
    /// Post or profile body; `None` until a fetch produced one
    pub payload: Option<Value>,
    /// Raw blog feed cached on account records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<Value>>,
    /// Ordered addresses held by index records
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<ContentAddress>,
    pub expires_at: DateTime<Utc>,
    /// Concurrency token; 0 means the record has never been stored
    pub revision: u64,
}

impl CacheRecord {
    // == Constructor ==
    /// Creates an unsaved record with the given payload and expiry.
    pub fn new(
        id: impl Into<String>,
        kind: RecordKind,
        payload: Option<Value>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            payload,
            posts: None,
            entries: Vec::new(),
            expires_at,
            revision: 0,
        }
    }

    /// Creates an unsaved index record holding `entries`.
    pub fn index(
        id: impl Into<String>,
        kind: RecordKind,
        entries: Vec<ContentAddress>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entries,
            ..Self::new(id, kind, None, expires_at)
        }
    }

    /// Empty, already-expired document handed to upsert mutations when `id`
    /// does not exist yet.
    pub fn blank(id: impl Into<String>) -> Self {
        let id = id.into();
        let kind = if id.starts_with(TAG_INDEX_PREFIX) {
            RecordKind::TagIndex
        } else if id.starts_with(CHILD_INDEX_PREFIX) {
            RecordKind::ChildIndex
        } else {
            RecordKind::Post
        };
        Self::new(id, kind, None, DateTime::<Utc>::default())
    }

    // == Is Expired ==
    /// Checks if the record has expired.
    ///
    /// A record is expired once the current time reaches `expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        let remaining = self.expires_at - Utc::now();
        if remaining > Duration::zero() {
            remaining
        } else {
            Duration::zero()
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::SourceSystem;
    use serde_json::json;

    #[test]
    fn test_record_creation() {
        let expires = Utc::now() + Duration::minutes(15);
        let record = CacheRecord::new(
            "hive:alice:p",
            RecordKind::Post,
            Some(json!({"body": "hi"})),
            expires,
        );

        assert_eq!(record.revision, 0);
        assert!(!record.is_expired());
        assert!(record.ttl_remaining() <= Duration::minutes(15));
        assert!(record.ttl_remaining() > Duration::minutes(14));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Utc::now();
        let record = CacheRecord::new("hive:alice", RecordKind::Account, None, now);

        assert!(record.is_expired_at(now), "Record should be expired at boundary");
        assert!(!record.is_expired_at(now - Duration::milliseconds(1)));
        assert_eq!(record.ttl_remaining(), Duration::zero());
    }

    #[test]
    fn test_blank_record_kind_and_expiry() {
        let parent = ContentAddress::post(SourceSystem::Hive, "alice", "p");

        assert_eq!(CacheRecord::blank(tag_index_id("gaming")).kind, RecordKind::TagIndex);
        assert_eq!(CacheRecord::blank(child_index_id(&parent)).kind, RecordKind::ChildIndex);

        let blank = CacheRecord::blank("hive:alice:p");
        assert_eq!(blank.kind, RecordKind::Post);
        assert!(blank.payload.is_none());
        assert!(blank.is_expired());
    }

    #[test]
    fn test_index_ids() {
        let parent = ContentAddress::post(SourceSystem::Hive, "alice", "p");
        assert_eq!(tag_index_id("gaming"), "tag/gaming");
        assert_eq!(child_index_id(&parent), "child/hive:alice:p");
    }

    #[test]
    fn test_index_record_serializes_entries() {
        let entries = vec![ContentAddress::post(SourceSystem::Hive, "bob", "reply")];
        let record = CacheRecord::index(
            "child/hive:alice:p",
            RecordKind::ChildIndex,
            entries,
            Utc::now(),
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "childIndex");
        assert_eq!(json["entries"][0], "hive:bob:reply");
        assert!(json.get("posts").is_none());
    }
}
