use std::fmt;

use rust_fsm::state_machine;

/*
 * Lobby
 *   Host picks a topic and deals roles
 * Roles -> Discuss (turn rotation + countdown)
 * Discuss -> Vote (turns exhausted, countdown expiry or host skip)
 * Vote -> Reveal (all voted, countdown expiry or jailbreak guess)
 * Reveal -> new deal, replay the discussion, or back to Lobby
 * Ended is reachable from anywhere and only leaves via a reset
 */
state_machine! {
    derive(Debug, Clone, PartialEq)
    pub RoomFsm(Lobby)

    Lobby => {
        Deal => Roles,
        ResetToLobby => Lobby,
        EndGame => Ended,
    },
    Roles => {
        Deal => Roles,
        StartDiscussion => Discuss,
        ResetToLobby => Lobby,
        EndGame => Ended,
    },
    Discuss => {
        StartVote => Vote,
        ResetToLobby => Lobby,
        EndGame => Ended,
    },
    Vote => {
        StartVote => Vote,
        Reveal => Reveal,
        ResetToLobby => Lobby,
        EndGame => Ended,
    },
    Reveal => {
        Deal => Roles,
        StartDiscussion => Discuss,
        ResetToLobby => Lobby,
        EndGame => Ended,
    },
    Ended => {
        ResetToLobby => Lobby,
    }
}

/// Wire name of a phase, as sent in `room:update`.
pub fn phase_name(state: &RoomFsmState) -> &'static str {
    match state {
        RoomFsmState::Lobby => "lobby",
        RoomFsmState::Roles => "roles",
        RoomFsmState::Discuss => "discuss",
        RoomFsmState::Vote => "vote",
        RoomFsmState::Reveal => "reveal",
        RoomFsmState::Ended => "ended",
    }
}

impl fmt::Display for RoomFsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", phase_name(self))
    }
}
