use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::metrics::register_metrics;
use crate::registry::actor::RoomRegistryActor;
use crate::routes;

/// Wires everything together and serves until the listener dies: registers
/// the metrics, spawns the room registry actor and runs the axum router.
pub async fn run_web_server(listener: TcpListener, config: Config) -> std::io::Result<()> {
    register_metrics();
    let registry = Arc::new(RoomRegistryActor::spawn(config.game.clone()));

    let router = routes::create_router(&config).with_state(registry);

    log::info!(
        "Listening on {}",
        listener
            .local_addr()
            .map(|address| address.to_string())
            .unwrap_or_else(|_| "unknown address".to_string())
    );
    axum::serve(listener, router).await
}
