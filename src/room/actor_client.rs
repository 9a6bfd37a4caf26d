use tokio::sync::broadcast;
use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::{self, Receiver as OneshotReceiver, Sender as OneshotSender};

use crate::error::Error;
use crate::room::actor::{RoomCommand, RoomResponse, RoomWideMessage};

#[derive(Clone, Debug)]
pub struct RoomClient {
    pub(super) room_tx: Sender<RoomCommand>,
}

impl RoomClient {
    /// True once the room actor stopped taking commands.
    pub fn is_closed(&self) -> bool {
        self.room_tx.is_closed()
    }

    pub async fn join(
        &self,
        player_id: &str,
        name: &str,
        as_host: bool,
    ) -> Result<RoomSubscription, Error> {
        let (tx, rx): (OneshotSender<RoomResponse>, OneshotReceiver<RoomResponse>) =
            oneshot::channel();

        self.room_tx
            .send(RoomCommand::Join {
                player_id: player_id.to_string(),
                name: name.to_string(),
                as_host,
                response_tx: tx,
            })
            .await
            // Reachable when the registry still knows the room but its actor
            // already stopped because the last player left a moment ago.
            .map_err(|error| {
                Error::log_and_create_internal(&format!(
                    "The Room is not alive. Can't join the Room. Error: '{error}'."
                ))
            })?;

        match rx.await {
            Ok(RoomResponse::Joined { broadcast_rx }) => Ok(RoomSubscription { broadcast_rx }),
            Ok(RoomResponse::Error { error }) => Err(error),
            _ => Err(Error::log_and_create_internal(
                "Player sent a RoomCommand::Join to the Room, but the Room channel died.",
            )),
        }
    }

    pub async fn leave(&self, player_id: &str) -> Result<(), Error> {
        self.room_tx
            .send(RoomCommand::Leave {
                player_id: player_id.to_string(),
            })
            .await
            .map_err(|error| {
                Error::log_and_create_internal(&format!(
                    "Tried to send RoomCommand::Leave but the RoomActor is not listening. Error: '{error}'."
                ))
            })
    }

    pub async fn sync(&self, player_id: &str) -> Result<(), Error> {
        self.room_tx
            .send(RoomCommand::Sync {
                player_id: player_id.to_string(),
            })
            .await
            .map_err(|error| {
                Error::log_and_create_internal(&format!(
                    "Tried to send RoomCommand::Sync but the RoomActor is not listening. Error: '{error}'."
                ))
            })
    }

    pub async fn remind_role(&self, player_id: &str) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::RemindRole {
            player_id: player_id.to_string(),
            response_tx,
        })
        .await
    }

    pub async fn set_topic(&self, player_id: &str, topic: &str) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::SetTopic {
            player_id: player_id.to_string(),
            topic: topic.to_string(),
            response_tx,
        })
        .await
    }

    pub async fn set_discuss_timer(&self, player_id: &str, seconds: i64) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::SetDiscussTimer {
            player_id: player_id.to_string(),
            seconds,
            response_tx,
        })
        .await
    }

    pub async fn set_vote_timer(&self, player_id: &str, seconds: i64) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::SetVoteTimer {
            player_id: player_id.to_string(),
            seconds,
            response_tx,
        })
        .await
    }

    pub async fn deal(&self, player_id: &str) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::Deal {
            player_id: player_id.to_string(),
            response_tx,
        })
        .await
    }

    pub async fn start_discussion(&self, player_id: &str) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::StartDiscussion {
            player_id: player_id.to_string(),
            response_tx,
        })
        .await
    }

    pub async fn start_vote(&self, player_id: &str) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::StartVote {
            player_id: player_id.to_string(),
            response_tx,
        })
        .await
    }

    pub async fn submit_turn(&self, player_id: &str, text: &str) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::SubmitTurn {
            player_id: player_id.to_string(),
            text: text.to_string(),
            response_tx,
        })
        .await
    }

    pub async fn cast_vote(&self, player_id: &str, target_id: &str) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::CastVote {
            player_id: player_id.to_string(),
            target_id: target_id.to_string(),
            response_tx,
        })
        .await
    }

    pub async fn imposter_guess(&self, player_id: &str, guess: &str) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::ImposterGuess {
            player_id: player_id.to_string(),
            guess: guess.to_string(),
            response_tx,
        })
        .await
    }

    pub async fn reveal_now(&self, player_id: &str) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::RevealNow {
            player_id: player_id.to_string(),
            response_tx,
        })
        .await
    }

    pub async fn end_game(&self, player_id: &str) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::EndGame {
            player_id: player_id.to_string(),
            response_tx,
        })
        .await
    }

    pub async fn reset_game(&self, player_id: &str) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::ResetGame {
            player_id: player_id.to_string(),
            response_tx,
        })
        .await
    }

    pub async fn send_dm(&self, player_id: &str, to: &str, text: &str) -> Result<(), Error> {
        self.round_trip(|response_tx| RoomCommand::SendDm {
            player_id: player_id.to_string(),
            to: to.to_string(),
            text: text.to_string(),
            response_tx,
        })
        .await
    }

    async fn round_trip(
        &self,
        command: impl FnOnce(OneshotSender<RoomResponse>) -> RoomCommand,
    ) -> Result<(), Error> {
        let (tx, rx): (OneshotSender<RoomResponse>, OneshotReceiver<RoomResponse>) =
            oneshot::channel();

        self.room_tx.send(command(tx)).await.map_err(|error| {
            Error::log_and_create_internal(&format!(
                "Tried to send a RoomCommand but the RoomActor is not listening. Error: '{error}'."
            ))
        })?;

        match rx.await {
            Ok(RoomResponse::Ok) => Ok(()),
            Ok(RoomResponse::Error { error }) => Err(error),
            _ => Err(Error::log_and_create_internal(
                "Player sent a RoomCommand to the Room, but the Room channel died.",
            )),
        }
    }
}

pub struct RoomSubscription {
    broadcast_rx: broadcast::Receiver<RoomWideMessage>,
}

impl RoomSubscription {
    pub async fn next(&mut self) -> Result<RoomWideMessage, Error> {
        self.broadcast_rx.recv().await.map_err(|error| {
            Error::log_and_create_internal(&format!(
                "The broadcast channel with the Room has been closed. Error: {error}."
            ))
        })
    }
}
