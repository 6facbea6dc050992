//! HTTP server for ShapeTrees.
//!
//! An LDP front end whose POST and PUT handling plants ShapeTree instances,
//! validates writes inside them, and materializes their static structure.
//! [`Dispatcher`] holds the protocol logic independent of HTTP; the axum
//! [`router`] adapts it to real requests.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use dispatch::Dispatcher;
pub use error::{DispatchError, DispatchResult, ServerError, ServerResult};
pub use handler::AppState;
pub use server::{schema_fetcher, ShapeTreeServer};

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn health_endpoint() {
        let app = ShapeTreeServer::new(ServerConfig::default()).unwrap().router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/.well-known/shapetree/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: shapetree_protocol::HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.storage, "memory");
    }

    #[tokio::test]
    async fn unknown_path_goes_to_the_dispatcher() {
        let server = ShapeTreeServer::new(ServerConfig::default()).unwrap();
        server.prepare().await.unwrap();
        let response = server
            .router()
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(response.headers()["content-type"], "application/json");
    }
}
