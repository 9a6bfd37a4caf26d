use lazy_static::lazy_static;
use prometheus::{IntGauge, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref ACTIVE_ROOMS: IntGauge =
        IntGauge::new("turncoat_active_rooms", "Active game rooms").expect("metric cannot be created");
    pub static ref CONNECTED_PLAYERS: IntGauge =
        IntGauge::new("turncoat_connected_players", "Amount of players connected")
            .expect("metric cannot be created");
}

/// Registering twice (several servers in one process, as in the integration
/// tests) is a no-op.
pub fn register_metrics() {
    let _ = REGISTRY.register(Box::new(ACTIVE_ROOMS.clone()));
    let _ = REGISTRY.register(Box::new(CONNECTED_PLAYERS.clone()));
}
