use std::net::SocketAddr;

use tokio::net::TcpListener;
use turncoat::config::Config;

use super::test_player::TestPlayer;

pub struct TestApp {
    pub base_address: String,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        // Binding to port 0 triggers an OS scan for an available port, this way we can run tests in parallel where each runs its own application
        let random_port_address = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = TcpListener::bind(random_port_address)
            .await
            .expect("Failed to bind random port.");
        let address = listener.local_addr().unwrap();

        std::env::set_var("ENVIRONMENT", "dev");
        let config = Config::get().expect("Failed to read configuration.");
        let _ = tokio::spawn(turncoat::startup::run_web_server(listener, config));

        TestApp {
            base_address: format!("localhost:{}", address.port()),
        }
    }

    /// Connects a websocket, reads the `session` greeting and creates the
    /// room, returning the player and the room code the server settled on.
    pub async fn create_room(&self, code: &str, name: &str) -> (TestPlayer, String) {
        let mut player = TestPlayer::connect(&self.base_address).await;
        player
            .send(serde_json::json!({ "type": "room:create", "code": code, "name": name }))
            .await;
        let update = player.receive_until("room:update").await;
        let code = update["code"].as_str().expect("no room code").to_string();
        (player, code)
    }

    pub async fn join_room(&self, code: &str, name: &str) -> TestPlayer {
        let mut player = TestPlayer::connect(&self.base_address).await;
        player
            .send(serde_json::json!({ "type": "room:join", "code": code, "name": name }))
            .await;
        let _ = player.receive_until("room:update").await;
        player
    }
}
