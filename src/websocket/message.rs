use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::room::event::{OrderEntry, PublicRoom, RevealOutcome, RoomEvent};
use crate::room::room_fsm::phase_name;

/// Everything a client may send, tagged with the wire event name.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum WsMessageIn {
    #[serde(rename = "room:create")]
    CreateRoom {
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
    #[serde(rename = "room:join")]
    JoinRoom {
        code: String,
        #[serde(default)]
        name: Option<String>,
    },
    #[serde(rename = "room:leave")]
    LeaveRoom,
    #[serde(rename = "room:sync")]
    SyncRoom,
    #[serde(rename = "role:remind")]
    RemindRole,
    #[serde(rename = "topic:set")]
    SetTopic { topic: String },
    #[serde(rename = "timer:set")]
    SetDiscussTimer { seconds: f64 },
    #[serde(rename = "voteTimer:set")]
    SetVoteTimer { seconds: f64 },
    #[serde(rename = "round:deal")]
    Deal,
    #[serde(rename = "round:discuss")]
    StartDiscussion,
    #[serde(rename = "round:start-vote")]
    StartVote,
    #[serde(rename = "turn:submit")]
    SubmitTurn { word: String },
    #[serde(rename = "vote:cast")]
    CastVote {
        #[serde(rename = "targetId")]
        target_id: String,
    },
    #[serde(rename = "imposter:guess")]
    ImposterGuess { guess: String },
    #[serde(rename = "round:reveal")]
    RevealNow,
    #[serde(rename = "game:end")]
    EndGame,
    #[serde(rename = "game:reset")]
    ResetGame,
    #[serde(rename = "dm:send")]
    SendDm { to: String, text: String },
}

/// Everything the server sends, tagged with the wire event name.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum WsMessageOut {
    #[serde(rename = "session")]
    Session { id: String },
    // Newtype payload so the room fields land next to the tag, the way the
    // browser expects the room:update payload.
    #[serde(rename = "room:update")]
    RoomUpdate(RoomDto),
    #[serde(rename = "role:assign", rename_all = "camelCase")]
    RoleAssign {
        topic: String,
        is_imposter: bool,
        word: Option<String>,
    },
    #[serde(rename = "round:error")]
    RoundError {
        reason: String,
        need: usize,
        have: usize,
    },
    #[serde(rename = "turn:state", rename_all = "camelCase")]
    TurnState {
        current_turn: Option<String>,
        order: Vec<OrderEntryDto>,
    },
    #[serde(rename = "turn:word")]
    TurnWord {
        pid: String,
        name: String,
        text: String,
    },
    #[serde(rename = "timer:tick")]
    TimerTick { secs: u64 },
    #[serde(rename = "timer:end")]
    TimerEnd,
    #[serde(rename = "vote:update")]
    VoteUpdate {
        tally: HashMap<String, usize>,
        total: usize,
    },
    #[serde(rename = "guess:result")]
    GuessResult { ok: bool },
    #[serde(rename = "round:results", rename_all = "camelCase")]
    RoundResults {
        executed: Option<String>,
        is_hit: bool,
        imposters: Vec<String>,
        secret: String,
        jailbreak: Option<String>,
    },
    #[serde(rename = "game:ended")]
    GameEnded,
    #[serde(rename = "dm:msg")]
    DmMessage {
        from: String,
        to: String,
        name: String,
        text: String,
        at: u64,
    },
    #[serde(rename = "error")]
    Error {
        code: String,
        title: String,
        detail: String,
    },
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    code: String,
    host: Option<String>,
    topic: Option<String>,
    phase: String,
    timer_sec: u64,
    vote_timer_sec: u64,
    current_turn: Option<String>,
    order: Vec<OrderEntryDto>,
    players: Vec<OrderEntryDto>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct OrderEntryDto {
    id: String,
    name: String,
}

impl From<PublicRoom> for RoomDto {
    fn from(room: PublicRoom) -> Self {
        RoomDto {
            code: room.code,
            host: room.host,
            topic: room.topic,
            phase: phase_name(&room.phase).to_string(),
            timer_sec: room.timer_sec,
            vote_timer_sec: room.vote_timer_sec,
            current_turn: room.current_turn,
            order: room.order.into_iter().map(|entry| entry.into()).collect(),
            players: room.players.into_iter().map(|entry| entry.into()).collect(),
        }
    }
}

impl From<OrderEntry> for OrderEntryDto {
    fn from(entry: OrderEntry) -> Self {
        OrderEntryDto {
            id: entry.id,
            name: entry.name,
        }
    }
}

impl From<RoomEvent> for WsMessageOut {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::Update(room) => WsMessageOut::RoomUpdate(room.into()),
            RoomEvent::RoleAssigned {
                topic,
                is_imposter,
                word,
            } => WsMessageOut::RoleAssign {
                topic,
                is_imposter,
                word,
            },
            RoomEvent::RoundError { reason, need, have } => WsMessageOut::RoundError {
                reason: reason.to_string(),
                need,
                have,
            },
            RoomEvent::TurnState {
                current_turn,
                order,
            } => WsMessageOut::TurnState {
                current_turn,
                order: order.into_iter().map(|entry| entry.into()).collect(),
            },
            RoomEvent::TurnWord {
                player_id,
                name,
                text,
            } => WsMessageOut::TurnWord {
                pid: player_id,
                name,
                text,
            },
            RoomEvent::TimerTick { secs } => WsMessageOut::TimerTick { secs },
            RoomEvent::TimerEnd => WsMessageOut::TimerEnd,
            RoomEvent::VoteUpdate { tally, total } => WsMessageOut::VoteUpdate { tally, total },
            RoomEvent::GuessResult { ok } => WsMessageOut::GuessResult { ok },
            RoomEvent::Results(outcome) => outcome.into(),
            RoomEvent::Ended => WsMessageOut::GameEnded,
            RoomEvent::Dm {
                from,
                to,
                name,
                text,
                at,
            } => WsMessageOut::DmMessage {
                from,
                to,
                name,
                text,
                at,
            },
        }
    }
}

impl From<RevealOutcome> for WsMessageOut {
    fn from(outcome: RevealOutcome) -> Self {
        WsMessageOut::RoundResults {
            executed: outcome.executed,
            is_hit: outcome.is_hit,
            imposters: outcome.imposters,
            secret: outcome.secret,
            jailbreak: outcome.jailbreak,
        }
    }
}
