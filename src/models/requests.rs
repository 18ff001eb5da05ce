//! Request DTOs for the distiller API
//!
//! Defines the query strings accepted by the listing endpoints.

use serde::Deserialize;

use crate::distiller::ListOptions;

/// Largest page the remote API will serve.
pub const MAX_LIST_LIMIT: usize = 100;

/// Query string for listing endpoints (`?limit=&resolve=`).
///
/// Missing fields fall back to the operation's own defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Maximum number of items, 1..=100
    #[serde(default)]
    pub limit: Option<usize>,
    /// Hydrate items instead of returning bare addresses
    #[serde(default)]
    pub resolve: Option<bool>,
}

impl ListQuery {
    /// Validates the query
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match self.limit {
            Some(0) => Some("limit must be at least 1".to_string()),
            Some(limit) if limit > MAX_LIST_LIMIT => Some(format!(
                "limit exceeds maximum of {}",
                MAX_LIST_LIMIT
            )),
            _ => None,
        }
    }

    /// Merges the query over `defaults`.
    pub fn options(&self, defaults: ListOptions) -> ListOptions {
        ListOptions::new(
            self.limit.unwrap_or(defaults.limit),
            self.resolve.unwrap_or(defaults.resolve),
        )
    }
}
