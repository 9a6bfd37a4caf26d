use thiserror::Error;

use crate::room::room_fsm::RoomFsmState;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("The player does not exist in the room. PlayerId: '{0}'.")]
    UnknownPlayer(String),
    #[error("Not enough players. ActualPlayers: '{have}', MinimumPlayers: '{need}'.")]
    NotEnoughPlayers { need: usize, have: usize },
    #[error("A non host player cannot perform this action. PlayerId: '{0}'.")]
    NotHost(String),
    #[error("Invalid phase for this action. ActualPhase: '{0:?}'.")]
    InvalidPhase(RoomFsmState),
    #[error("It is not this player's turn. PlayerId: '{0}'.")]
    NotYourTurn(String),
    #[error("The submitted text is empty.")]
    EmptySubmission,
    #[error("The vote target is not a valid player. TargetId: '{0}'.")]
    InvalidTarget(String),
    #[error("The configured duration is out of range. Seconds: '{seconds}', Min: '{min}', Max: '{max}'.")]
    ValueOutOfRange { seconds: i64, min: u64, max: u64 },
    #[error("Only the impostor can guess the secret word. PlayerId: '{0}'.")]
    NotImposter(String),
    #[error("The impostor has already used their guess this round. PlayerId: '{0}'.")]
    GuessAlreadyUsed(String),
}
