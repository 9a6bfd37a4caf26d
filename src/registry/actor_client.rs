use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::{self, Receiver as OneshotReceiver, Sender as OneshotSender};

use crate::error::Error;
use crate::registry::actor::{RoomRegistryCommand, RoomRegistryResponse};
use crate::room::actor_client::RoomClient;

#[derive(Clone, Debug)]
pub struct RoomRegistryClient {
    pub(super) registry_tx: Sender<RoomRegistryCommand>,
}

impl RoomRegistryClient {
    /// Gets or creates the room under the given code. `None` (or a code that
    /// normalizes to nothing) gets a freshly generated code.
    pub async fn ensure_room(&self, code: Option<&str>) -> Result<(String, RoomClient), Error> {
        let (tx, rx): (
            OneshotSender<RoomRegistryResponse>,
            OneshotReceiver<RoomRegistryResponse>,
        ) = oneshot::channel();

        self.send_command(
            RoomRegistryCommand::EnsureRoom {
                code: code.map(|code| code.to_string()),
                response_channel: tx,
            },
            "The RoomRegistry is not alive. Can't create Room",
        )
        .await?;

        match rx.await {
            Ok(RoomRegistryResponse::RoomReady { code, room }) => Ok((code, room)),
            Err(_) => Err(Error::log_and_create_internal(
                "Sent a command to the RoomRegistry actor, but the actor channel died.",
            )),
        }
    }

    pub async fn remove_room(&self, code: &str) -> Result<(), Error> {
        self.send_command(
            RoomRegistryCommand::RemoveRoom {
                code: code.to_string(),
            },
            "The RoomRegistry channel is closed",
        )
        .await
    }

    async fn send_command(
        &self,
        command: RoomRegistryCommand,
        error_message: &str,
    ) -> Result<(), Error> {
        self.registry_tx.send(command).await.map_err(|error| {
            Error::log_and_create_internal(&format!("{error_message}. Error: '{error}'"))
        })
    }
}
