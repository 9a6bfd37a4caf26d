use std::time::Duration;

use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestPlayer {
    /// Session id the server assigned on connect.
    pub id: String,
    tx: SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>,
    rx: SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl TestPlayer {
    pub async fn connect(base_address: &str) -> TestPlayer {
        let (websocket, _) = tokio_tungstenite::connect_async(format!("ws://{base_address}/ws"))
            .await
            .expect("WebSocket could not be created.");
        let (tx, rx) = websocket.split();
        let mut player = TestPlayer {
            id: String::new(),
            tx,
            rx,
        };

        let greeting = player.receive().await;
        assert_eq!(greeting["type"], "session");
        player.id = greeting["id"].as_str().expect("no session id").to_string();
        player
    }

    pub async fn send(&mut self, message: Value) {
        self.tx
            .send(Message::Text(message.to_string()))
            .await
            .expect("Could not send message");
    }

    pub async fn receive(&mut self) -> Value {
        match timeout(RECEIVE_TIMEOUT, self.rx.next()).await {
            Ok(Some(Ok(message))) => {
                serde_json::from_str(message.to_text().expect("Message was not a text"))
                    .expect("Message was not valid JSON")
            }
            Ok(Some(Err(error))) => panic!("Websocket returned an error {error}"),
            Ok(None) => panic!("Websocket closed before expected."),
            Err(_) => panic!("Timed out waiting for a message."),
        }
    }

    /// Reads messages until one of the wanted type arrives, skipping
    /// everything else (most importantly the `timer:tick` stream).
    pub async fn receive_until(&mut self, wanted: &str) -> Value {
        loop {
            let message = self.receive().await;
            if message["type"] == wanted {
                return message;
            }
        }
    }

    /// Reads `room:update` messages until one satisfies the predicate.
    /// Needed because every player accumulates the updates of everyone
    /// else's actions in their receive queue.
    pub async fn receive_update_where(&mut self, predicate: impl Fn(&Value) -> bool) -> Value {
        loop {
            let update = self.receive_until("room:update").await;
            if predicate(&update) {
                return update;
            }
        }
    }
}
