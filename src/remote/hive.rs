//! Hive Client
//!
//! Reference backend: Hive condenser API over JSON-RPC 2.0, with failover
//! across a list of public nodes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use super::{decode_metadata, RemoteError, RemoteSourceClient};
use crate::address::ContentAddress;
use crate::config::{Config, DEFAULT_HIVE_NODES};

type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Connection settings for [`HiveClient`].
#[derive(Debug, Clone)]
pub struct HiveConfig {
    /// Node URLs, tried in order on transient failure
    pub nodes: Vec<String>,
    pub timeout_secs: u64,
    /// Attempts per content fetch before reporting no content
    pub content_fetch_attempts: u32,
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            nodes: DEFAULT_HIVE_NODES.iter().map(|n| n.to_string()).collect(),
            timeout_secs: 5,
            content_fetch_attempts: 5,
        }
    }
}

impl From<&Config> for HiveConfig {
    fn from(config: &Config) -> Self {
        Self {
            nodes: config.hive_nodes.clone(),
            timeout_secs: config.rpc_timeout_secs,
            content_fetch_attempts: config.content_fetch_attempts,
        }
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: &'a Value,
    id: u64,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC client for the Hive network.
pub struct HiveClient {
    /// Reusable HTTP client with connection pooling
    http: ReqwestClient,
    nodes: Vec<String>,
    content_fetch_attempts: u32,
}

impl HiveClient {
    pub fn new(config: HiveConfig) -> RemoteResult<Self> {
        let http = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            nodes: config.nodes,
            content_fetch_attempts: config.content_fetch_attempts.max(1),
        })
    }

    /// Calls `method` on the first node that answers.
    ///
    /// Transient failures move on to the next node; RPC errors are returned
    /// immediately.
    pub async fn call(&self, method: &str, params: Value) -> RemoteResult<Value> {
        let mut last_error = None;

        for node in &self.nodes {
            match self.call_node(node, method, &params).await {
                Ok(result) => return Ok(result),
                Err(err) if err.is_transient() => {
                    warn!(node = %node, method, error = %err, "hive node failed, trying next");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or(RemoteError::NoNodes))
    }

    async fn call_node(&self, node: &str, method: &str, params: &Value) -> RemoteResult<Value> {
        debug!(node, method, "hive rpc call");
        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let response = self.http.post(node).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let body: RpcResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(RemoteError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(body.result.unwrap_or(Value::Null))
    }
}

/// Hive answers lookups of unknown posts with an empty-author placeholder.
fn is_missing_post(post: &Value) -> bool {
    post.get("author")
        .and_then(Value::as_str)
        .map_or(true, str::is_empty)
}

fn into_list(result: Value, method: &str) -> RemoteResult<Vec<Value>> {
    match result {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(RemoteError::Decode(format!(
            "{} returned {} instead of a list",
            method, other
        ))),
    }
}

#[async_trait]
impl RemoteSourceClient for HiveClient {
    async fn fetch_content(&self, address: &ContentAddress) -> RemoteResult<Option<Value>> {
        let Some(permlink) = &address.permlink else {
            return self.fetch_account(address).await;
        };
        let params = json!([address.author, permlink]);

        // Sequential attempts, no backoff; exhaustion reports no content
        for attempt in 1..=self.content_fetch_attempts {
            match self.call("condenser_api.get_content", params.clone()).await {
                Ok(post) if is_missing_post(&post) => return Ok(None),
                Ok(mut post) => {
                    decode_metadata(&mut post);
                    return Ok(Some(post));
                }
                Err(err) => {
                    warn!(address = %address, attempt, error = %err, "content fetch failed");
                }
            }
        }

        error!(
            address = %address,
            attempts = self.content_fetch_attempts,
            "content fetch attempts exhausted"
        );
        Ok(None)
    }

    async fn fetch_account(&self, address: &ContentAddress) -> RemoteResult<Option<Value>> {
        let method = "condenser_api.get_accounts";
        let result = self.call(method, json!([[address.author]])).await?;
        Ok(into_list(result, method)?.into_iter().next())
    }

    async fn fetch_discussions_by_tag(&self, tag: &str, limit: usize) -> RemoteResult<Vec<Value>> {
        let method = "condenser_api.get_discussions_by_created";
        let result = self
            .call(method, json!([{ "tag": tag, "limit": limit }]))
            .await?;
        into_list(result, method)
    }

    async fn fetch_blog_feed(&self, author: &str, limit: usize) -> RemoteResult<Vec<Value>> {
        let method = "condenser_api.get_discussions_by_blog";
        let result = self
            .call(method, json!([{ "tag": author, "limit": limit }]))
            .await?;
        into_list(result, method)
    }

    async fn fetch_replies(&self, parent: &ContentAddress) -> RemoteResult<Vec<Value>> {
        let method = "condenser_api.get_content_replies";
        let permlink = parent.permlink.as_deref().unwrap_or_default();
        let result = self.call(method, json!([parent.author, permlink])).await?;
        into_list(result, method)
    }

    async fn fetch_follower_count(&self, address: &ContentAddress) -> RemoteResult<u64> {
        let result = self
            .call("condenser_api.get_follow_count", json!([address.author]))
            .await?;
        result
            .get("follower_count")
            .and_then(Value::as_u64)
            .ok_or_else(|| RemoteError::Decode(format!("missing follower_count in {}", result)))
    }
}
