//! API Module
//!
//! HTTP read surface over the distiller.
//!
//! # Endpoints
//! - `GET /content/:address` - Post or account record
//! - `GET /children/:address?limit&resolve` - Replies to a post
//! - `GET /tag/:tag?limit&resolve` - Newest posts with a tag
//! - `GET /posts/:address?limit&resolve` - Blog feed of an account
//! - `GET /account/:address` - Account profile record
//! - `GET /followers/:address` - Follower count, uncached
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint
//! - `DELETE /cache` - Drop every cached record

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
