use std::time::Duration;
use tokio::sync::oneshot::Sender as OneshotSender;
use tokio::sync::{
    broadcast, mpsc,
    mpsc::{Receiver, Sender},
};
use tokio::time;

use crate::config::GameSettings;
use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::metrics::ACTIVE_ROOMS;
use crate::registry::actor_client::RoomRegistryClient;
use crate::room::actor_client::RoomClient;
use crate::room::countdown::{Countdown, TICK_INTERVAL};
use crate::room::event::{Effect, RoomEvent};
use crate::room::Room;

/// Owns one `Room` plus its countdown. Commands arrive over the mpsc channel
/// and are applied one at a time; the interval drives `timer:tick` updates
/// and feeds countdown expiries back into the room.
pub struct RoomActor {
    room: Room,
    room_rx: Receiver<RoomCommand>,
    broadcast_tx: broadcast::Sender<RoomWideMessage>,
    registry: RoomRegistryClient,
    countdown: Countdown,
}

impl RoomActor {
    pub fn spawn(code: &str, settings: &GameSettings, registry: RoomRegistryClient) -> RoomClient {
        let room = Room::new(code, settings);
        let (room_tx, room_rx): (Sender<RoomCommand>, Receiver<RoomCommand>) = mpsc::channel(128);
        let (broadcast_tx, _): (
            broadcast::Sender<RoomWideMessage>,
            broadcast::Receiver<RoomWideMessage>,
        ) = broadcast::channel(64);

        tokio::spawn(
            RoomActor {
                room,
                room_rx,
                broadcast_tx,
                registry,
                countdown: Countdown::default(),
            }
            .start(),
        );

        RoomClient { room_tx }
    }

    async fn start(mut self) {
        ACTIVE_ROOMS.inc();
        let mut tick = time::interval(TICK_INTERVAL);

        loop {
            tokio::select! {
                command = self.room_rx.recv() => match command {
                    None => {
                        log::info!("Room channel has been dropped. Stopping room actor.");
                        break;
                    }
                    Some(command) => {
                        if self.handle_command(command) {
                            log::info!("Room {} is empty. Stopping room actor.", self.room.code());
                            break;
                        }
                    }
                },
                _ = tick.tick() => self.handle_tick(),
            }
        }

        // Close the command channel first, so the registry can tell this
        // stopping actor apart from a live room under the same code.
        self.room_rx.close();
        self.stop_room().await;
        ACTIVE_ROOMS.dec();
    }

    /// Returns true once the room has no players left and the actor should
    /// stop.
    fn handle_command(&mut self, command: RoomCommand) -> bool {
        match command {
            RoomCommand::Join {
                player_id,
                name,
                as_host,
                response_tx,
            } => {
                // Subscribe before applying the effects: the channel does not
                // replay, and the join's own room:update must reach the joiner.
                let broadcast_rx = self.broadcast_tx.subscribe();
                let effects = self.room.join(&player_id, &name, as_host);
                self.apply_effects(effects);
                if response_tx
                    .send(RoomResponse::Joined { broadcast_rx })
                    .is_err()
                {
                    log::warn!(
                        "Player {player_id} joined room {} but the response channel is closed. Removing the player.",
                        self.room.code()
                    );
                    let effects = self.room.leave(&player_id);
                    self.apply_effects(effects);
                    return self.room.is_empty();
                }
            }
            RoomCommand::Leave { player_id } => {
                let effects = self.room.leave(&player_id);
                self.apply_effects(effects);
                return self.room.is_empty();
            }
            RoomCommand::Sync { player_id } => {
                let effects = self.room.sync(&player_id);
                self.apply_effects(effects);
            }
            RoomCommand::RemindRole {
                player_id,
                response_tx,
            } => {
                let result = self.room.remind_role(&player_id);
                self.respond(&player_id, result, response_tx);
            }
            RoomCommand::SetTopic {
                player_id,
                topic,
                response_tx,
            } => {
                let result = self.room.set_topic(&player_id, &topic);
                self.respond(&player_id, result, response_tx);
            }
            RoomCommand::SetDiscussTimer {
                player_id,
                seconds,
                response_tx,
            } => {
                let result = self.room.set_discuss_timer(&player_id, seconds);
                self.respond(&player_id, result, response_tx);
            }
            RoomCommand::SetVoteTimer {
                player_id,
                seconds,
                response_tx,
            } => {
                let result = self.room.set_vote_timer(&player_id, seconds);
                self.respond(&player_id, result, response_tx);
            }
            RoomCommand::Deal {
                player_id,
                response_tx,
            } => {
                let result = self.room.deal(&player_id);
                self.respond(&player_id, result, response_tx);
            }
            RoomCommand::StartDiscussion {
                player_id,
                response_tx,
            } => {
                let result = self.room.start_discussion(&player_id);
                self.respond(&player_id, result, response_tx);
            }
            RoomCommand::StartVote {
                player_id,
                response_tx,
            } => {
                let result = self.room.start_vote(&player_id);
                self.respond(&player_id, result, response_tx);
            }
            RoomCommand::SubmitTurn {
                player_id,
                text,
                response_tx,
            } => {
                let result = self.room.submit_turn(&player_id, &text);
                self.respond(&player_id, result, response_tx);
            }
            RoomCommand::CastVote {
                player_id,
                target_id,
                response_tx,
            } => {
                let result = self.room.cast_vote(&player_id, &target_id);
                self.respond(&player_id, result, response_tx);
            }
            RoomCommand::ImposterGuess {
                player_id,
                guess,
                response_tx,
            } => {
                let result = self.room.imposter_guess(&player_id, &guess);
                self.respond(&player_id, result, response_tx);
            }
            RoomCommand::RevealNow {
                player_id,
                response_tx,
            } => {
                let result = self.room.reveal_now(&player_id);
                self.respond(&player_id, result, response_tx);
            }
            RoomCommand::EndGame {
                player_id,
                response_tx,
            } => {
                let result = self.room.end_game(&player_id);
                self.respond(&player_id, result, response_tx);
            }
            RoomCommand::ResetGame {
                player_id,
                response_tx,
            } => {
                let result = self.room.reset(&player_id);
                self.respond(&player_id, result, response_tx);
            }
            RoomCommand::SendDm {
                player_id,
                to,
                text,
                response_tx,
            } => {
                let result = self.room.send_dm(&player_id, &to, &text);
                self.respond(&player_id, result, response_tx);
            }
        }
        false
    }

    fn handle_tick(&mut self) {
        if !self.countdown.is_armed() {
            return;
        }
        if let Some(tick) = self.countdown.poll() {
            self.send(RoomWideMessage::Broadcast(RoomEvent::TimerTick {
                secs: tick.secs_remaining,
            }));
            if tick.expired {
                match self.room.timer_expired(tick.kind) {
                    Ok(effects) => self.apply_effects(effects),
                    Err(error) => log::error!(
                        "Countdown expiry could not be applied to room {}. Error: '{error}'.",
                        self.room.code()
                    ),
                }
            }
        }
    }

    /// A player shortfall is reported to the caller as a room event rather
    /// than an error, so clients can show it inline. Every other domain error
    /// travels back over the response channel.
    fn respond(
        &mut self,
        player_id: &str,
        result: Result<Vec<Effect>, Error>,
        response_tx: OneshotSender<RoomResponse>,
    ) {
        let response = match result {
            Ok(effects) => {
                self.apply_effects(effects);
                RoomResponse::Ok
            }
            Err(Error::Domain(DomainError::NotEnoughPlayers { need, have })) => {
                self.apply_effects(vec![Effect::direct(
                    player_id,
                    RoomEvent::RoundError {
                        reason: "not_enough_players",
                        need,
                        have,
                    },
                )]);
                RoomResponse::Ok
            }
            Err(error) => RoomResponse::Error { error },
        };
        if response_tx.send(response).is_err() {
            log::warn!(
                "Sent a RoomResponse to player {player_id} but the response channel is closed."
            );
        }
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Broadcast(event) => self.send(RoomWideMessage::Broadcast(event)),
                Effect::Direct { to, event } => self.send(RoomWideMessage::Direct { to, event }),
                Effect::StartTimer { kind, seconds } => {
                    self.countdown.start(kind, Duration::from_secs(seconds))
                }
                Effect::StopTimer => self.countdown.stop(),
            }
        }
    }

    fn send(&self, message: RoomWideMessage) {
        // A send error only means nobody is subscribed right now.
        let _ = self.broadcast_tx.send(message);
    }

    async fn stop_room(self) {
        let code = self.room.code();
        if let Err(error) = self.registry.remove_room(code).await {
            log::error!("The RoomRegistry channel is closed, can't remove the Room. RoomCode: '{code}', Error: '{error}'.");
        }
    }
}

pub(crate) enum RoomCommand {
    Join {
        player_id: String,
        name: String,
        as_host: bool,
        response_tx: OneshotSender<RoomResponse>,
    },
    Leave {
        player_id: String,
    },
    Sync {
        player_id: String,
    },
    RemindRole {
        player_id: String,
        response_tx: OneshotSender<RoomResponse>,
    },
    SetTopic {
        player_id: String,
        topic: String,
        response_tx: OneshotSender<RoomResponse>,
    },
    SetDiscussTimer {
        player_id: String,
        seconds: i64,
        response_tx: OneshotSender<RoomResponse>,
    },
    SetVoteTimer {
        player_id: String,
        seconds: i64,
        response_tx: OneshotSender<RoomResponse>,
    },
    Deal {
        player_id: String,
        response_tx: OneshotSender<RoomResponse>,
    },
    StartDiscussion {
        player_id: String,
        response_tx: OneshotSender<RoomResponse>,
    },
    StartVote {
        player_id: String,
        response_tx: OneshotSender<RoomResponse>,
    },
    SubmitTurn {
        player_id: String,
        text: String,
        response_tx: OneshotSender<RoomResponse>,
    },
    CastVote {
        player_id: String,
        target_id: String,
        response_tx: OneshotSender<RoomResponse>,
    },
    ImposterGuess {
        player_id: String,
        guess: String,
        response_tx: OneshotSender<RoomResponse>,
    },
    RevealNow {
        player_id: String,
        response_tx: OneshotSender<RoomResponse>,
    },
    EndGame {
        player_id: String,
        response_tx: OneshotSender<RoomResponse>,
    },
    ResetGame {
        player_id: String,
        response_tx: OneshotSender<RoomResponse>,
    },
    SendDm {
        player_id: String,
        to: String,
        text: String,
        response_tx: OneshotSender<RoomResponse>,
    },
}

#[derive(Debug)]
pub(crate) enum RoomResponse {
    Joined {
        broadcast_rx: broadcast::Receiver<RoomWideMessage>,
    },
    Ok,
    Error {
        error: Error,
    },
}

/// What travels on the room-wide broadcast channel. Every member's connection
/// actor subscribes; `Direct` messages are dropped by everyone except the
/// addressed player before anything reaches a socket.
#[derive(Clone, Debug)]
pub enum RoomWideMessage {
    Broadcast(RoomEvent),
    Direct { to: String, event: RoomEvent },
}
