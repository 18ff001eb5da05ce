//! Distiller - A read-through cache for decentralized content networks
//!
//! Serves posts, accounts, reply threads and tag listings from a persistent
//! cache, refreshing from the remote network on miss or expiry and falling
//! back to stale content when the network fails.

pub mod address;
pub mod api;
pub mod cache;
pub mod config;
pub mod distiller;
pub mod error;
pub mod models;
pub mod remote;

pub use address::{ContentAddress, IntoAddress, SourceSystem};
pub use api::AppState;
pub use config::Config;
pub use distiller::{Distiller, ListOptions, Listing};
pub use error::{DistillerError, Result};
