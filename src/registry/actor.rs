use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::oneshot::Sender as OneshotSender;

use crate::config::GameSettings;
use crate::registry::actor_client::RoomRegistryClient;
use crate::registry::RoomRegistry;
use crate::room::actor_client::RoomClient;

pub struct RoomRegistryActor {
    registry: RoomRegistry,
    registry_rx: Receiver<RoomRegistryCommand>,
    registry_tx: Sender<RoomRegistryCommand>,
}

impl RoomRegistryActor {
    /// Runs the RoomRegistry actor in background and returns a client to
    /// communicate with it.
    pub fn spawn(game_settings: GameSettings) -> RoomRegistryClient {
        let registry = RoomRegistry::new(game_settings);
        let (registry_tx, registry_rx): (
            Sender<RoomRegistryCommand>,
            Receiver<RoomRegistryCommand>,
        ) = mpsc::channel(512);

        tokio::spawn(
            RoomRegistryActor {
                registry,
                registry_rx,
                registry_tx: registry_tx.clone(),
            }
            .start(),
        );

        RoomRegistryClient { registry_tx }
    }

    async fn start(mut self) {
        while let Some(message) = self.registry_rx.recv().await {
            match message {
                RoomRegistryCommand::EnsureRoom {
                    code,
                    response_channel,
                } => {
                    // Room actors get their own registry client so they can
                    // deregister themselves once they are empty.
                    let (code, room) = self.registry.ensure_room(
                        code.as_deref(),
                        RoomRegistryClient {
                            registry_tx: self.registry_tx.clone(),
                        },
                    );
                    if response_channel
                        .send(RoomRegistryResponse::RoomReady { code, room })
                        .is_err()
                    {
                        log::error!(
                            "Sent RoomRegistryResponse but the response channel is closed."
                        );
                    }
                }
                RoomRegistryCommand::RemoveRoom { code } => {
                    self.registry.remove_room(&code);
                }
            }
        }
    }
}

#[derive(Debug)]
pub(crate) enum RoomRegistryCommand {
    EnsureRoom {
        code: Option<String>,
        response_channel: OneshotSender<RoomRegistryResponse>,
    },
    RemoveRoom {
        code: String,
    },
}

#[derive(Debug)]
pub(crate) enum RoomRegistryResponse {
    RoomReady { code: String, room: RoomClient },
}
