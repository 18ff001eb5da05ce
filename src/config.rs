//! Configuration Module
//!
//! Handles loading and managing distiller configuration from environment variables.

use std::env;

/// Public Hive API nodes tried in order when `HIVE_NODES` is not set.
pub const DEFAULT_HIVE_NODES: [&str; 4] = [
    "https://deathwing.me",
    "https://api.openhive.network",
    "https://hived.privex.io",
    "https://anyx.io",
];

/// Longest accepted record lifetime: one year.
pub const MAX_EXPIRE_SECS: u64 = 365 * 24 * 60 * 60;

/// Distiller configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL in seconds applied to every cache record on write or refresh
    pub default_expire_secs: u64,
    /// Hive JSON-RPC endpoints, tried in order
    pub hive_nodes: Vec<String>,
    /// Per-request transport timeout in seconds
    pub rpc_timeout_secs: u64,
    /// Attempts made by the reference backend before giving up on a content fetch
    pub content_fetch_attempts: u32,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_EXPIRE_SECS` - Record TTL in seconds, 1..=one year (default: 900)
    /// - `HIVE_NODES` - Comma-separated node URLs (default: four public nodes)
    /// - `RPC_TIMEOUT_SECS` - Remote request timeout (default: 5)
    /// - `CONTENT_FETCH_ATTEMPTS` - Content fetch attempts (default: 5)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_expire_secs: parse_var("DEFAULT_EXPIRE_SECS")
                .filter(|secs| valid_expire_secs(*secs))
                .unwrap_or(defaults.default_expire_secs),
            hive_nodes: env::var("HIVE_NODES")
                .ok()
                .map(|v| split_nodes(&v))
                .filter(|nodes| !nodes.is_empty())
                .unwrap_or(defaults.hive_nodes),
            rpc_timeout_secs: parse_var("RPC_TIMEOUT_SECS").unwrap_or(defaults.rpc_timeout_secs),
            content_fetch_attempts: parse_var("CONTENT_FETCH_ATTEMPTS")
                .filter(|attempts| *attempts > 0)
                .unwrap_or(defaults.content_fetch_attempts),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_expire_secs: 15 * 60,
            hive_nodes: DEFAULT_HIVE_NODES.iter().map(|n| n.to_string()).collect(),
            rpc_timeout_secs: 5,
            content_fetch_attempts: 5,
            server_port: 3000,
        }
    }
}

/// Whether `secs` is a usable record lifetime.
pub fn valid_expire_secs(secs: u64) -> bool {
    (1..=MAX_EXPIRE_SECS).contains(&secs)
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn split_nodes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|node| !node.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_expire_secs, 900);
        assert_eq!(config.hive_nodes.len(), 4);
        assert_eq!(config.rpc_timeout_secs, 5);
        assert_eq!(config.content_fetch_attempts, 5);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("DEFAULT_EXPIRE_SECS");
        env::remove_var("HIVE_NODES");
        env::remove_var("RPC_TIMEOUT_SECS");
        env::remove_var("CONTENT_FETCH_ATTEMPTS");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.default_expire_secs, 900);
        assert_eq!(config.hive_nodes[0], "https://deathwing.me");
        assert_eq!(config.content_fetch_attempts, 5);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_expire_secs_bounds() {
        assert!(valid_expire_secs(1));
        assert!(valid_expire_secs(900));
        assert!(valid_expire_secs(MAX_EXPIRE_SECS));
        assert!(!valid_expire_secs(0));
        assert!(!valid_expire_secs(MAX_EXPIRE_SECS + 1));
        assert!(!valid_expire_secs(10_000_000_000_000));
    }

    #[test]
    fn test_split_nodes() {
        let nodes = split_nodes(" https://a.example , ,https://b.example");
        assert_eq!(nodes, vec!["https://a.example", "https://b.example"]);
    }
}
