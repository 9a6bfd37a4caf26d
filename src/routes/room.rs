use std::sync::Arc;

use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;

use crate::player::actor::PlayerActor;
use crate::registry::actor_client::RoomRegistryClient;

/// Upgrades the request to a websocket and hands the connection to a player
/// actor. The connection binds to a room later, with its first
/// `room:create`/`room:join` message.
pub async fn connect_player_to_websocket(
    State(registry): State<Arc<RoomRegistryClient>>,
    websocket_upgrade: WebSocketUpgrade,
) -> Response {
    websocket_upgrade.on_upgrade(move |websocket| async move {
        PlayerActor::create((*registry).clone(), websocket).await
    })
}
