//! Content Address Module
//!
//! Canonical `"<source>:<author>[:<permlink>]"` identifiers for posts and accounts.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DistillerError, Result};

// == Source System ==
/// Backend a content address belongs to, resolved when the address is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSystem {
    /// Hive blockchain content network
    Hive,
    /// Decentralized log store, reserved for a future backend
    OrbitDb,
}

impl SourceSystem {
    /// Tag used in the canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceSystem::Hive => "hive",
            SourceSystem::OrbitDb => "orbitdb",
        }
    }
}

impl fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceSystem {
    type Err = DistillerError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "hive" => Ok(SourceSystem::Hive),
            "orbitdb" => Ok(SourceSystem::OrbitDb),
            other => Err(DistillerError::UnknownSourceSystem(other.to_string())),
        }
    }
}

// == Content Address ==
/// Identifies a post (`permlink` present) or an account (`permlink` absent).
///
/// Two addresses are equal exactly when their canonical strings are.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentAddress {
    pub source: SourceSystem,
    pub author: String,
    pub permlink: Option<String>,
}

impl ContentAddress {
    /// Address of a post.
    pub fn post(
        source: SourceSystem,
        author: impl Into<String>,
        permlink: impl Into<String>,
    ) -> Self {
        Self {
            source,
            author: author.into(),
            permlink: Some(permlink.into()),
        }
    }

    /// Address of an account.
    pub fn account(source: SourceSystem, author: impl Into<String>) -> Self {
        Self {
            source,
            author: author.into(),
            permlink: None,
        }
    }

    /// Parses the canonical string form.
    ///
    /// An empty permlink segment (`"hive:alice:"`) normalizes to an account address.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.splitn(3, ':');
        let tag = parts.next().unwrap_or_default();
        let author = parts.next().unwrap_or_default();

        if tag.is_empty() || author.is_empty() {
            return Err(DistillerError::Parse(format!(
                "'{}' lacks a source system or author segment",
                raw
            )));
        }

        let source = tag.parse::<SourceSystem>()?;
        let permlink = parts
            .next()
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(Self {
            source,
            author: author.to_string(),
            permlink,
        })
    }

    /// True when this address names an account rather than a post.
    pub fn is_account(&self) -> bool {
        self.permlink.is_none()
    }

    /// Address of the account that authored this content.
    pub fn root(&self) -> ContentAddress {
        ContentAddress::account(self.source, self.author.clone())
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.permlink {
            Some(permlink) => write!(f, "{}:{}:{}", self.source, self.author, permlink),
            None => write!(f, "{}:{}", self.source, self.author),
        }
    }
}

impl PartialEq for ContentAddress {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for ContentAddress {}

impl Hash for ContentAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl FromStr for ContentAddress {
    type Err = DistillerError;

    fn from_str(raw: &str) -> Result<Self> {
        Self::parse(raw)
    }
}

impl TryFrom<String> for ContentAddress {
    type Error = DistillerError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<ContentAddress> for String {
    fn from(address: ContentAddress) -> Self {
        address.to_string()
    }
}

// == Into Address ==
/// Arguments accepted wherever an address is expected: a parsed
/// [`ContentAddress`] or its canonical string.
pub trait IntoAddress {
    fn into_address(self) -> Result<ContentAddress>;
}

impl IntoAddress for ContentAddress {
    fn into_address(self) -> Result<ContentAddress> {
        Ok(self)
    }
}

impl IntoAddress for &ContentAddress {
    fn into_address(self) -> Result<ContentAddress> {
        Ok(self.clone())
    }
}

impl IntoAddress for &str {
    fn into_address(self) -> Result<ContentAddress> {
        ContentAddress::parse(self)
    }
}

impl IntoAddress for String {
    fn into_address(self) -> Result<ContentAddress> {
        ContentAddress::parse(&self)
    }
}

impl IntoAddress for &String {
    fn into_address(self) -> Result<ContentAddress> {
        ContentAddress::parse(self)
    }
}
