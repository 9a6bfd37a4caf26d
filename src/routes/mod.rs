use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::registry::actor_client::RoomRegistryClient;

mod health;
mod metrics;
mod room;

pub fn create_router(config: &Config) -> Router<Arc<RoomRegistryClient>> {
    Router::new()
        .route("/health", get(health::get))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/ws", get(room::connect_player_to_websocket))
        .layer(if config.allow_cors {
            log::info!("CorsLayer Permissive");
            CorsLayer::permissive()
        } else {
            CorsLayer::default()
        })
}
