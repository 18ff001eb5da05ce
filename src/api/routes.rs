//! API Routes
//!
//! Configures the Axum router with all distiller endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    account_handler, children_handler, content_handler, drop_handler, followers_handler,
    health_handler, posts_handler, stats_handler, tag_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin; the presentation layer is served elsewhere
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/content/:address", get(content_handler))
        .route("/children/:address", get(children_handler))
        .route("/tag/:tag", get(tag_handler))
        .route("/posts/:address", get(posts_handler))
        .route("/account/:address", get(account_handler))
        .route("/followers/:address", get(followers_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .route("/cache", delete(drop_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::SourceSystem;
    use crate::cache::MemoryStore;
    use crate::distiller::Distiller;
    use crate::remote::{MockSource, SourceRegistry};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let remote = Arc::new(MockSource::new());
        let sources = SourceRegistry::new(SourceSystem::Hive).with_client(SourceSystem::Hive, remote);
        create_router(AppState::new(Distiller::new(
            Arc::new(MemoryStore::new()),
            sources,
        )))
    }

    async fn status_of(app: Router, method: &str, uri: &str) -> StatusCode {
        app.oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(status_of(create_test_app(), "GET", "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        assert_eq!(status_of(create_test_app(), "GET", "/stats").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_drop_endpoint() {
        assert_eq!(status_of(create_test_app(), "DELETE", "/cache").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_source_is_bad_request() {
        assert_eq!(
            status_of(create_test_app(), "GET", "/content/steem:alice:p").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_malformed_limit_is_rejected() {
        assert_eq!(
            status_of(create_test_app(), "GET", "/tag/gaming?limit=lots").await,
            StatusCode::BAD_REQUEST
        );
    }
}
