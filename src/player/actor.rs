use axum::extract::ws::{Message, WebSocket};
use tokio::select;
use uuid::Uuid;

use crate::error::Error;
use crate::metrics::CONNECTED_PLAYERS;
use crate::registry::actor_client::RoomRegistryClient;
use crate::room::actor::RoomWideMessage;
use crate::room::actor_client::{RoomClient, RoomSubscription};
use crate::websocket::message::{WsMessageIn, WsMessageOut};
use crate::websocket::{close, parse_message, send_error, send_message, send_message_string};

/// Bridges one websocket connection to the room it is currently in. The
/// connection starts unbound; the first `room:create`/`room:join` message
/// binds it and `room:leave` unbinds it without closing the socket. Closing
/// the socket is an implicit leave.
pub struct PlayerActor {
    session_id: String,
    registry: RoomRegistryClient,
    websocket: WebSocket,
    membership: Option<Membership>,
}

struct Membership {
    code: String,
    room: RoomClient,
    subscription: RoomSubscription,
}

impl PlayerActor {
    pub async fn create(registry: RoomRegistryClient, mut websocket: WebSocket) {
        let session_id = Uuid::new_v4().to_string();
        // The client needs its own id to recognize turns, votes and directs.
        if let Err(error) = send_message(
            &mut websocket,
            &WsMessageOut::Session {
                id: session_id.clone(),
            },
        )
        .await
        {
            log::info!("Could not greet a new connection. Error: '{error}'.");
            close(websocket).await;
            return;
        }

        PlayerActor {
            session_id,
            registry,
            websocket,
            membership: None,
        }
        .start()
        .await
    }

    async fn start(mut self) {
        CONNECTED_PLAYERS.inc();

        loop {
            select! {
                room_message = PlayerActor::next_room_message(&mut self.membership) => {
                    if let Err(error) = self.receive_room_message(room_message).await {
                        if PlayerActor::should_close_websocket(error) {
                            break;
                        }
                    }
                },
                websocket_message = self.websocket.recv() => {
                    if let Err(error) = self.receive_websocket_message(websocket_message).await {
                        if PlayerActor::should_close_websocket(error) {
                            break;
                        }
                    }
                },
            }
        }

        self.leave_room().await;
        close(self.websocket).await;
        CONNECTED_PLAYERS.dec();
    }

    /// Pends forever while the connection is not in a room, so the select
    /// loop only wakes up for websocket traffic.
    async fn next_room_message(
        membership: &mut Option<Membership>,
    ) -> Result<RoomWideMessage, Error> {
        match membership {
            Some(membership) => membership.subscription.next().await,
            None => std::future::pending().await,
        }
    }

    fn should_close_websocket(error: Error) -> bool {
        match error {
            Error::Internal(_) => true,
            Error::WebsocketClosed(_) => true,
            Error::Domain(_) => false,
            Error::UnprocessableMessage(_, _) => false,
        }
    }

    async fn receive_room_message(
        &mut self,
        room_message: Result<RoomWideMessage, Error>,
    ) -> Result<(), Error> {
        match room_message {
            Ok(RoomWideMessage::Broadcast(event)) => {
                send_message(&mut self.websocket, &WsMessageOut::from(event)).await
            }
            Ok(RoomWideMessage::Direct { to, event }) => {
                if to == self.session_id {
                    send_message(&mut self.websocket, &WsMessageOut::from(event)).await
                } else {
                    Ok(())
                }
            }
            Err(error) => Err(error),
        }
    }

    async fn receive_websocket_message(
        &mut self,
        websocket_message: Option<Result<Message, axum::Error>>,
    ) -> Result<(), Error> {
        match websocket_message {
            Some(Ok(Message::Text(text))) => match text.as_str() {
                "ping" => send_message_string(&mut self.websocket, "pong").await,
                message => match parse_message(message) {
                    Ok(message) => self.dispatch(message).await,
                    Err(error) => {
                        send_error(&mut self.websocket, &error).await;
                        Err(error)
                    }
                },
            },
            // browser said "close"
            Some(Ok(Message::Close(_))) => {
                self.log_connection_lost("browser sent 'Close' websocket frame");
                Err(Error::WebsocketClosed(
                    "browser sent 'Close' websocket frame".to_string(),
                ))
            }
            // websocket was closed
            None => {
                self.log_connection_lost("other end of websocket was closed abruptly");
                Err(Error::WebsocketClosed(
                    "other end of websocket was closed abruptly".to_string(),
                ))
            }
            Some(Err(error)) => Err(Error::UnprocessableMessage(
                "Message cannot be loaded".to_string(),
                error.to_string(),
            )),
            Some(Ok(_)) => Err(Error::UnprocessableMessage(
                "Unsupported message type".to_string(),
                "Unsupported message type".to_string(),
            )),
        }
    }

    async fn dispatch(&mut self, message: WsMessageIn) -> Result<(), Error> {
        match message {
            WsMessageIn::CreateRoom { code, name } => {
                let name = name.unwrap_or_else(|| "Host".to_string());
                self.bind_room(code.as_deref(), &name, true).await
            }
            WsMessageIn::JoinRoom { code, name } => {
                let name = name.unwrap_or_else(|| "Player".to_string());
                self.bind_room(Some(&code), &name, false).await
            }
            WsMessageIn::LeaveRoom => {
                self.leave_room().await;
                Ok(())
            }
            message => {
                let Some(membership) = &self.membership else {
                    log::debug!(
                        "Ignoring a room command from session {} that is not in a room.",
                        self.session_id
                    );
                    return Ok(());
                };
                let room = &membership.room;
                let result = match message {
                    WsMessageIn::SyncRoom => room.sync(&self.session_id).await,
                    WsMessageIn::RemindRole => room.remind_role(&self.session_id).await,
                    WsMessageIn::SetTopic { topic } => {
                        room.set_topic(&self.session_id, &topic).await
                    }
                    WsMessageIn::SetDiscussTimer { seconds } => {
                        room.set_discuss_timer(&self.session_id, seconds.floor() as i64)
                            .await
                    }
                    WsMessageIn::SetVoteTimer { seconds } => {
                        room.set_vote_timer(&self.session_id, seconds.floor() as i64)
                            .await
                    }
                    WsMessageIn::Deal => room.deal(&self.session_id).await,
                    WsMessageIn::StartDiscussion => room.start_discussion(&self.session_id).await,
                    WsMessageIn::StartVote => room.start_vote(&self.session_id).await,
                    WsMessageIn::SubmitTurn { word } => {
                        room.submit_turn(&self.session_id, &word).await
                    }
                    WsMessageIn::CastVote { target_id } => {
                        room.cast_vote(&self.session_id, &target_id).await
                    }
                    WsMessageIn::ImposterGuess { guess } => {
                        room.imposter_guess(&self.session_id, &guess).await
                    }
                    WsMessageIn::RevealNow => room.reveal_now(&self.session_id).await,
                    WsMessageIn::EndGame => room.end_game(&self.session_id).await,
                    WsMessageIn::ResetGame => room.reset_game(&self.session_id).await,
                    WsMessageIn::SendDm { to, text } => {
                        room.send_dm(&self.session_id, &to, &text).await
                    }
                    WsMessageIn::CreateRoom { .. }
                    | WsMessageIn::JoinRoom { .. }
                    | WsMessageIn::LeaveRoom => Ok(()),
                };
                match result {
                    Err(Error::Domain(domain_error)) => {
                        // Invalid commands are dropped like the clients expect.
                        log::debug!(
                            "Dropped a command from session {}. Reason: '{domain_error}'.",
                            self.session_id
                        );
                        Ok(())
                    }
                    other => other,
                }
            }
        }
    }

    async fn bind_room(
        &mut self,
        code: Option<&str>,
        name: &str,
        as_host: bool,
    ) -> Result<(), Error> {
        self.leave_room().await;
        let (code, room) = self.registry.ensure_room(code).await?;
        let subscription = room.join(&self.session_id, name, as_host).await?;
        log::info!(
            "Session {} joined room {code} as '{name}'. Host: {as_host}.",
            self.session_id
        );
        self.membership = Some(Membership {
            code,
            room,
            subscription,
        });
        Ok(())
    }

    async fn leave_room(&mut self) {
        if let Some(membership) = self.membership.take() {
            log::info!(
                "Session {} left room {}.",
                self.session_id,
                membership.code
            );
            let _ = membership.room.leave(&self.session_id).await;
        }
    }

    fn log_connection_lost(&self, reason: &str) {
        log::info!(
            "Connection with session {} lost due to: {}. Stopping player actor.",
            self.session_id,
            reason,
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::error::domain_error::DomainError;
    use crate::error::Error;
    use crate::player::actor::PlayerActor;

    #[test]
    fn should_close_websocket_is_false() {
        assert!(!PlayerActor::should_close_websocket(Error::Domain(
            DomainError::NotHost("".to_owned())
        )));
        assert!(!PlayerActor::should_close_websocket(Error::Domain(
            DomainError::EmptySubmission
        )));
        assert!(!PlayerActor::should_close_websocket(
            Error::UnprocessableMessage("".to_string(), "".to_string())
        ));
    }

    #[test]
    fn should_close_websocket_is_true() {
        assert!(PlayerActor::should_close_websocket(Error::Internal(
            "".to_owned()
        )));
        assert!(PlayerActor::should_close_websocket(Error::WebsocketClosed(
            "".to_owned()
        )));
    }
}
