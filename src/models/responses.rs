//! Response DTOs for the distiller API
//!
//! Defines the structure of outgoing HTTP response bodies that are not plain
//! cache records or listings.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the followers endpoint (GET /followers/:address)
#[derive(Debug, Clone, Serialize)]
pub struct FollowerCountResponse {
    pub address: String,
    pub follower_count: u64,
}

impl FollowerCountResponse {
    pub fn new(address: impl Into<String>, follower_count: u64) -> Self {
        Self {
            address: address.into(),
            follower_count,
        }
    }
}

/// Response body for the drop endpoint (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct DropResponse {
    /// Success message
    pub message: String,
    /// Number of records removed
    pub dropped: usize,
}

impl DropResponse {
    pub fn new(dropped: usize) -> Self {
        Self {
            message: format!("Dropped {} cached records", dropped),
            dropped,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Lookups that found a record
    pub hits: u64,
    /// Lookups for ids with no record
    pub misses: u64,
    /// Successful writes
    pub writes: u64,
    /// Writes rejected for a stale revision
    pub conflicts: u64,
    /// Current number of records
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            writes: stats.writes,
            conflicts: stats.conflicts,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
