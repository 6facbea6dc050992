use axum::routing::get;
use axum::Router;
use shapetree_protocol::endpoints;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router: the health endpoint, with every other method and
/// path going to the dispatcher.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(handler::health))
        .fallback(handler::dispatch)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
