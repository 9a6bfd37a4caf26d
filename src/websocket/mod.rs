pub mod message;

use axum::extract::ws::{Message, WebSocket};
use serde::Serialize;

use crate::error::domain_error::DomainError;
use crate::error::Error;
use message::{WsMessageIn, WsMessageOut};

pub async fn send_error(websocket: &mut WebSocket, error: &Error) {
    if let Err(error) = send_message(websocket, &error_to_ws_message(error.clone())).await {
        log::warn!("Could not send an error message to the browser. Error: '{error}'.");
    }
}

pub async fn close(mut websocket: WebSocket) {
    if let Err(error) = websocket.close().await {
        log::error!("Could not close WebSocket. Error: '{error}'.")
    }
}

pub fn parse_message(message: &str) -> Result<WsMessageIn, Error> {
    serde_json::from_str(message)
        .map_err(|error| Error::UnprocessableMessage(error.to_string(), message.to_string()))
}

pub async fn send_message<T>(websocket: &mut WebSocket, value: &T) -> Result<(), Error>
where
    T: ?Sized + Serialize,
{
    let message = serde_json::to_string(value).map_err(|error| {
        Error::log_and_create_internal(&format!(
            "Could not serialize the message. Error: '{error}'."
        ))
    })?;

    websocket
        .send(Message::Text(message))
        .await
        .map_err(|error| Error::WebsocketClosed(error.to_string()))
}

pub async fn send_message_string(websocket: &mut WebSocket, value: &str) -> Result<(), Error> {
    websocket
        .send(Message::Text(value.to_string()))
        .await
        .map_err(|error| Error::WebsocketClosed(error.to_string()))
}

fn error_to_ws_message(error: Error) -> WsMessageOut {
    let detail = error.to_string();
    let (code, title) = match error {
        Error::Domain(domain_error) => match domain_error {
            DomainError::UnknownPlayer(_) => ("UNKNOWN_PLAYER", "The player is not in the room"),
            DomainError::NotEnoughPlayers { .. } => {
                ("NOT_ENOUGH_PLAYERS", "Not enough players in the room")
            }
            DomainError::NotHost(_) => ("NOT_HOST", "Only the host can do this"),
            DomainError::InvalidPhase(_) => ("INVALID_PHASE", "Not allowed in the current phase"),
            DomainError::NotYourTurn(_) => ("NOT_YOUR_TURN", "It is not your turn"),
            DomainError::EmptySubmission => ("EMPTY_SUBMISSION", "The submitted text is empty"),
            DomainError::InvalidTarget(_) => ("INVALID_TARGET", "Invalid vote target"),
            DomainError::ValueOutOfRange { .. } => {
                ("VALUE_OUT_OF_RANGE", "The duration is out of range")
            }
            DomainError::NotImposter(_) => ("NOT_IMPOSTER", "Only the impostor can guess"),
            DomainError::GuessAlreadyUsed(_) => {
                ("GUESS_ALREADY_USED", "The guess was already used")
            }
        },
        Error::Internal(_) => ("INTERNAL_SERVER", "Internal Server error"),
        Error::UnprocessableMessage(_, _) => {
            ("UNPROCESSABLE_WEBSOCKET_MESSAGE", "Invalid message")
        }
        Error::WebsocketClosed(_) => ("WEBSOCKET_CLOSED", "The player websocket is closed"),
    };
    WsMessageOut::Error {
        code: code.to_string(),
        title: title.to_string(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_their_code_next_to_the_event_tag() {
        let message = error_to_ws_message(Error::Domain(DomainError::NotHost("p2".to_string())));

        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "NOT_HOST");
        assert_eq!(json["title"], "Only the host can do this");
    }
}
