//! Request and Response models for the distiller API
//!
//! Query strings and response bodies for the HTTP surface. Cache records and
//! listings are serialized directly.

pub mod requests;
pub mod responses;

pub use requests::{ListQuery, MAX_LIST_LIMIT};
pub use responses::{
    DropResponse, ErrorResponse, FollowerCountResponse, HealthResponse, StatsResponse,
};
