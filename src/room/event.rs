use std::collections::HashMap;

use crate::room::countdown::CountdownKind;
use crate::room::room_fsm::RoomFsmState;

/// What a room operation asks its surroundings to do, in order. The room
/// actor interprets these: broadcasts go out on the room-wide channel and the
/// timer effects drive the actor's countdown.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Broadcast(RoomEvent),
    Direct { to: String, event: RoomEvent },
    StartTimer { kind: CountdownKind, seconds: u64 },
    StopTimer,
}

impl Effect {
    pub fn direct(to: &str, event: RoomEvent) -> Self {
        Effect::Direct {
            to: to.to_string(),
            event,
        }
    }
}

/// Room-wide events, delivered to every member's connection actor. Events
/// produced as `Effect::Direct` reach only the addressed player's socket.
#[derive(Clone, Debug, PartialEq)]
pub enum RoomEvent {
    Update(PublicRoom),
    RoleAssigned {
        topic: String,
        is_imposter: bool,
        word: Option<String>,
    },
    RoundError {
        reason: &'static str,
        need: usize,
        have: usize,
    },
    TurnState {
        current_turn: Option<String>,
        order: Vec<OrderEntry>,
    },
    TurnWord {
        player_id: String,
        name: String,
        text: String,
    },
    TimerTick {
        secs: u64,
    },
    TimerEnd,
    VoteUpdate {
        tally: HashMap<String, usize>,
        total: usize,
    },
    GuessResult {
        ok: bool,
    },
    Results(RevealOutcome),
    Ended,
    Dm {
        from: String,
        to: String,
        name: String,
        text: String,
        at: u64,
    },
}

/// The public projection of a room, safe to show to every member. Secret
/// words, roles and individual votes never appear here; they travel only via
/// the private `RoleAssigned`/`GuessResult` events.
#[derive(Clone, Debug, PartialEq)]
pub struct PublicRoom {
    pub code: String,
    pub host: Option<String>,
    pub topic: Option<String>,
    pub phase: RoomFsmState,
    pub timer_sec: u64,
    pub vote_timer_sec: u64,
    pub current_turn: Option<String>,
    pub order: Vec<OrderEntry>,
    pub players: Vec<OrderEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderEntry {
    pub id: String,
    pub name: String,
}

/// The outcome of a round, broadcast as `round:results`.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealOutcome {
    pub executed: Option<String>,
    pub is_hit: bool,
    pub imposters: Vec<String>,
    pub secret: String,
    pub jailbreak: Option<String>,
}
