pub mod actor;
pub mod actor_client;
pub mod countdown;
pub mod event;
pub mod room_fsm;

use std::time::{SystemTime, UNIX_EPOCH};

use rand::seq::SliceRandom;
use rust_fsm::StateMachine;

use crate::config::GameSettings;
use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::player::Player;
use crate::room::countdown::CountdownKind;
use crate::room::event::{Effect, OrderEntry, PublicRoom, RevealOutcome, RoomEvent};
use crate::room::room_fsm::{RoomFsm, RoomFsmInput, RoomFsmState};
use crate::words;

/// One game session. All operations are synchronous and funneled through the
/// owning room actor, so no two operations ever interleave on the same room.
/// Every operation validates its guards first and either mutates the room and
/// returns the effects to apply, or returns an error and leaves the room
/// untouched.
pub struct Room {
    code: String,
    host: Option<String>,
    topic: Option<String>,
    fsm: StateMachine<RoomFsm>,
    secret_word: Option<String>,
    timer_sec: u64,
    vote_timer_sec: u64,
    round_number: u32,
    order: Vec<String>,
    start_index: usize,
    current_turn: Option<String>,
    turns_remaining: usize,
    // Join order; vote tally tie-breaks scan players in this order.
    players: Vec<Player>,
}

impl Room {
    pub const MINIMUM_PLAYERS: usize = 3;
    pub const MAX_SUBMISSION_CHARS: usize = 40;
    const DISCUSS_BOUNDS: (u64, u64) = (10, 600);
    const VOTE_BOUNDS: (u64, u64) = (5, 180);

    pub fn new(code: &str, settings: &GameSettings) -> Self {
        Room {
            code: code.to_string(),
            host: None,
            topic: None,
            fsm: StateMachine::default(),
            secret_word: None,
            timer_sec: settings.discuss_seconds,
            vote_timer_sec: settings.vote_seconds,
            round_number: 0,
            order: Vec::default(),
            start_index: 0,
            current_turn: None,
            turns_remaining: 0,
            players: Vec::default(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn state(&self) -> &RoomFsmState {
        self.fsm.state()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn current_turn(&self) -> Option<&str> {
        self.current_turn.as_deref()
    }

    pub fn turns_remaining(&self) -> usize {
        self.turns_remaining
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn secret_word(&self) -> Option<&str> {
        self.secret_word.as_deref()
    }

    pub fn timer_sec(&self) -> u64 {
        self.timer_sec
    }

    pub fn vote_timer_sec(&self) -> u64 {
        self.vote_timer_sec
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn is_host(&self, player_id: &str) -> bool {
        self.host.as_deref() == Some(player_id)
    }

    fn require_host(&self, player_id: &str) -> Result<(), Error> {
        if self.is_host(player_id) {
            Ok(())
        } else {
            Err(Error::Domain(DomainError::NotHost(player_id.to_string())))
        }
    }

    fn get_player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == player_id)
    }

    fn get_player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .find(|player| player.id == player_id)
    }

    fn player_name(&self, player_id: &str) -> String {
        self.get_player(player_id)
            .map(|player| player.name.clone())
            .unwrap_or_else(|| "Player".to_string())
    }

    fn process_event(&mut self, input: &RoomFsmInput) -> Result<(), Error> {
        self.fsm
            .consume(input)
            .map(|_| ())
            .map_err(|_| Error::Domain(DomainError::InvalidPhase(self.fsm.state().clone())))
    }

    /// Adds a player, replacing any stale entry with the same session id. A
    /// `room:create` additionally claims hostship for the joining player.
    pub fn join(&mut self, player_id: &str, name: &str, as_host: bool) -> Vec<Effect> {
        self.players.retain(|player| player.id != player_id);
        self.players.push(Player::new(player_id, name));
        if as_host {
            self.host = Some(player_id.to_string());
        }
        vec![Effect::Broadcast(RoomEvent::Update(self.public_state()))]
    }

    /// Removes a player on leave or disconnect, splicing them out of the turn
    /// order. If they held the current turn, the next remaining occupant of
    /// the same index (wrapping) takes over without consuming a turn.
    pub fn leave(&mut self, player_id: &str) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.players.retain(|player| player.id != player_id);
        if self.host.as_deref() == Some(player_id) {
            self.host = None;
        }

        if let Some(old_index) = self.order.iter().position(|id| id == player_id) {
            self.order.remove(old_index);
            if self.current_turn.as_deref() == Some(player_id) {
                if self.order.is_empty() {
                    self.current_turn = None;
                    self.turns_remaining = 0;
                } else {
                    self.current_turn = Some(self.order[old_index % self.order.len()].clone());
                    effects.push(Effect::Broadcast(self.turn_state()));
                }
            }
        }

        effects.push(Effect::Broadcast(RoomEvent::Update(self.public_state())));
        if self.players.is_empty() {
            effects.push(Effect::StopTimer);
        }
        effects
    }

    /// Re-sends the full public state to the requester only.
    pub fn sync(&self, player_id: &str) -> Vec<Effect> {
        vec![Effect::direct(
            player_id,
            RoomEvent::Update(self.public_state()),
        )]
    }

    /// Re-sends the requester's private role while a round is active.
    pub fn remind_role(&self, player_id: &str) -> Result<Vec<Effect>, Error> {
        if self.secret_word.is_none() {
            return Err(Error::Domain(DomainError::InvalidPhase(
                self.fsm.state().clone(),
            )));
        }
        let player = self
            .get_player(player_id)
            .ok_or_else(|| Error::Domain(DomainError::UnknownPlayer(player_id.to_string())))?;
        Ok(vec![Effect::direct(
            player_id,
            RoomEvent::RoleAssigned {
                topic: self.topic_key().to_string(),
                is_imposter: player.is_imposter,
                word: player.word.clone(),
            },
        )])
    }

    pub fn set_topic(&mut self, player_id: &str, topic: &str) -> Result<Vec<Effect>, Error> {
        self.require_host(player_id)?;
        self.process_event(&RoomFsmInput::ResetToLobby)?;
        self.topic = Some(words::resolve(topic).to_string());
        self.clear_round_state();
        Ok(vec![
            Effect::StopTimer,
            Effect::Broadcast(RoomEvent::Update(self.public_state())),
        ])
    }

    pub fn set_discuss_timer(&mut self, player_id: &str, seconds: i64) -> Result<Vec<Effect>, Error> {
        self.require_host(player_id)?;
        let (min, max) = Room::DISCUSS_BOUNDS;
        if seconds < min as i64 || seconds > max as i64 {
            return Err(Error::Domain(DomainError::ValueOutOfRange {
                seconds,
                min,
                max,
            }));
        }
        self.timer_sec = seconds as u64;
        Ok(vec![Effect::Broadcast(RoomEvent::Update(
            self.public_state(),
        ))])
    }

    pub fn set_vote_timer(&mut self, player_id: &str, seconds: i64) -> Result<Vec<Effect>, Error> {
        self.require_host(player_id)?;
        let (min, max) = Room::VOTE_BOUNDS;
        if seconds < min as i64 || seconds > max as i64 {
            return Err(Error::Domain(DomainError::ValueOutOfRange {
                seconds,
                min,
                max,
            }));
        }
        self.vote_timer_sec = seconds as u64;
        Ok(vec![Effect::Broadcast(RoomEvent::Update(
            self.public_state(),
        ))])
    }

    /// Deals a round: picks the secret, assigns exactly one impostor at
    /// random, informs every player privately and snapshots the turn order
    /// with a rotating starting player.
    pub fn deal(&mut self, player_id: &str) -> Result<Vec<Effect>, Error> {
        self.require_host(player_id)?;
        if self.players.len() < Room::MINIMUM_PLAYERS {
            return Err(Error::Domain(DomainError::NotEnoughPlayers {
                need: Room::MINIMUM_PLAYERS,
                have: self.players.len(),
            }));
        }
        self.process_event(&RoomFsmInput::Deal)?;

        let topic = self.topic_key().to_string();
        let secret = words::pick(&topic);
        self.secret_word = Some(secret.clone());

        let imposter_id = self
            .players
            .choose(&mut rand::thread_rng())
            .map(|player| player.id.clone())
            .unwrap_or_default();

        let mut effects = Vec::new();
        for player in self.players.iter_mut() {
            let is_imposter = player.id == imposter_id;
            player.is_imposter = is_imposter;
            player.word = if is_imposter { None } else { Some(secret.clone()) };
            player.vote_for = None;
            player.guessed = false;
            effects.push(Effect::direct(
                &player.id,
                RoomEvent::RoleAssigned {
                    topic: topic.clone(),
                    is_imposter,
                    word: player.word.clone(),
                },
            ));
        }

        self.order = self.players.iter().map(|player| player.id.clone()).collect();
        self.round_number += 1;
        self.start_index = (self.round_number as usize - 1) % self.order.len();
        self.current_turn = None;
        self.turns_remaining = 0;

        effects.push(Effect::StopTimer);
        effects.push(Effect::Broadcast(RoomEvent::Update(self.public_state())));
        Ok(effects)
    }

    /// Starts the discussion phase: first turn goes to the round's rotating
    /// starter and the discussion countdown is armed. Deals first when the
    /// host skipped the explicit deal.
    pub fn start_discussion(&mut self, player_id: &str) -> Result<Vec<Effect>, Error> {
        self.require_host(player_id)?;
        if self.players.len() < Room::MINIMUM_PLAYERS {
            return Err(Error::Domain(DomainError::NotEnoughPlayers {
                need: Room::MINIMUM_PLAYERS,
                have: self.players.len(),
            }));
        }

        let mut effects = Vec::new();
        if self.secret_word.is_none() {
            effects.extend(self.deal(player_id)?);
        }
        self.process_event(&RoomFsmInput::StartDiscussion)?;

        if self.order.is_empty() {
            self.order = self.players.iter().map(|player| player.id.clone()).collect();
        }
        self.turns_remaining = self.order.len();
        self.current_turn = Some(self.order[self.start_index % self.order.len()].clone());

        effects.push(Effect::Broadcast(self.turn_state()));
        effects.push(Effect::Broadcast(RoomEvent::Update(self.public_state())));
        effects.push(Effect::StartTimer {
            kind: CountdownKind::Discuss,
            seconds: self.timer_sec,
        });
        Ok(effects)
    }

    /// Host skips straight to voting.
    pub fn start_vote(&mut self, player_id: &str) -> Result<Vec<Effect>, Error> {
        self.require_host(player_id)?;
        self.process_event(&RoomFsmInput::StartVote)?;
        Ok(self.enter_vote())
    }

    fn enter_vote(&mut self) -> Vec<Effect> {
        for player in self.players.iter_mut() {
            player.vote_for = None;
        }
        self.current_turn = None;
        self.turns_remaining = 0;
        vec![
            Effect::StopTimer,
            Effect::Broadcast(RoomEvent::Update(self.public_state())),
            Effect::StartTimer {
                kind: CountdownKind::Vote,
                seconds: self.vote_timer_sec,
            },
        ]
    }

    /// A player submits their description on their turn. The last turn of the
    /// cycle moves the room to voting.
    pub fn submit_turn(&mut self, player_id: &str, text: &str) -> Result<Vec<Effect>, Error> {
        if self.fsm.state() != &RoomFsmState::Discuss {
            return Err(Error::Domain(DomainError::InvalidPhase(
                self.fsm.state().clone(),
            )));
        }
        let clean: String = text.trim().chars().take(Room::MAX_SUBMISSION_CHARS).collect();
        if clean.is_empty() {
            return Err(Error::Domain(DomainError::EmptySubmission));
        }
        if self.current_turn.as_deref() != Some(player_id) {
            return Err(Error::Domain(DomainError::NotYourTurn(
                player_id.to_string(),
            )));
        }

        let mut effects = vec![Effect::Broadcast(RoomEvent::TurnWord {
            player_id: player_id.to_string(),
            name: self.player_name(player_id),
            text: clean,
        })];

        self.turns_remaining = self.turns_remaining.saturating_sub(1);
        if self.turns_remaining == 0 {
            self.process_event(&RoomFsmInput::StartVote)?;
            effects.extend(self.enter_vote());
        } else {
            let next_index = self
                .order
                .iter()
                .position(|id| Some(id.as_str()) == self.current_turn.as_deref())
                .map(|index| (index + 1) % self.order.len())
                .unwrap_or(0);
            self.current_turn = Some(self.order[next_index].clone());
            effects.push(Effect::Broadcast(self.turn_state()));
            effects.push(Effect::Broadcast(RoomEvent::Update(self.public_state())));
        }
        Ok(effects)
    }

    /// Records or overwrites a vote. Once every player has voted the round
    /// reveals automatically.
    pub fn cast_vote(&mut self, player_id: &str, target_id: &str) -> Result<Vec<Effect>, Error> {
        if self.fsm.state() != &RoomFsmState::Vote {
            return Err(Error::Domain(DomainError::InvalidPhase(
                self.fsm.state().clone(),
            )));
        }
        if target_id == player_id || self.get_player(target_id).is_none() {
            return Err(Error::Domain(DomainError::InvalidTarget(
                target_id.to_string(),
            )));
        }
        let voter = self
            .get_player_mut(player_id)
            .ok_or_else(|| Error::Domain(DomainError::UnknownPlayer(player_id.to_string())))?;
        voter.vote_for = Some(target_id.to_string());

        let (ordered_tally, total) = self.tally();
        let mut effects = vec![Effect::Broadcast(RoomEvent::VoteUpdate {
            tally: ordered_tally.iter().cloned().collect(),
            total,
        })];
        if total == self.players.len() {
            self.process_event(&RoomFsmInput::Reveal)?;
            effects.extend(self.do_reveal(None));
        }
        Ok(effects)
    }

    /// The impostor's single jailbreak attempt. A correct guess short-circuits
    /// to a reveal with no execution; a wrong one is reported privately and
    /// voting continues.
    pub fn imposter_guess(&mut self, player_id: &str, guess: &str) -> Result<Vec<Effect>, Error> {
        if self.fsm.state() != &RoomFsmState::Vote {
            return Err(Error::Domain(DomainError::InvalidPhase(
                self.fsm.state().clone(),
            )));
        }
        let secret = self.secret_word.clone().unwrap_or_default();
        let player = self
            .get_player_mut(player_id)
            .ok_or_else(|| Error::Domain(DomainError::UnknownPlayer(player_id.to_string())))?;
        if !player.is_imposter {
            return Err(Error::Domain(DomainError::NotImposter(
                player_id.to_string(),
            )));
        }
        if player.guessed {
            return Err(Error::Domain(DomainError::GuessAlreadyUsed(
                player_id.to_string(),
            )));
        }
        player.guessed = true;

        if normalize_guess(guess) == normalize_guess(&secret) {
            self.process_event(&RoomFsmInput::Reveal)?;
            Ok(self.do_reveal(Some(player_id.to_string())))
        } else {
            Ok(vec![Effect::direct(
                player_id,
                RoomEvent::GuessResult { ok: false },
            )])
        }
    }

    /// Host cuts voting short and reveals with whatever votes are in.
    pub fn reveal_now(&mut self, player_id: &str) -> Result<Vec<Effect>, Error> {
        self.require_host(player_id)?;
        self.process_event(&RoomFsmInput::Reveal)?;
        Ok(self.do_reveal(None))
    }

    /// A countdown expiry, fed back by the room actor. A stale expiry for a
    /// phase the room already left is a no-op.
    pub fn timer_expired(&mut self, kind: CountdownKind) -> Result<Vec<Effect>, Error> {
        match kind {
            CountdownKind::Discuss => {
                if self.fsm.state() != &RoomFsmState::Discuss {
                    return Ok(Vec::new());
                }
                self.process_event(&RoomFsmInput::StartVote)?;
                let mut effects = self.enter_vote();
                effects.push(Effect::Broadcast(RoomEvent::TimerEnd));
                Ok(effects)
            }
            CountdownKind::Vote => {
                if self.fsm.state() != &RoomFsmState::Vote {
                    return Ok(Vec::new());
                }
                self.process_event(&RoomFsmInput::Reveal)?;
                Ok(self.do_reveal(None))
            }
        }
    }

    /// Computes and broadcasts the round outcome. With a jailbreak there is
    /// no execution; otherwise the strictly-highest-voted target is executed,
    /// ties resolving to the first maximum encountered in join order.
    fn do_reveal(&mut self, jailbreak: Option<String>) -> Vec<Effect> {
        let executed = if jailbreak.is_some() {
            None
        } else {
            let (ordered_tally, _) = self.tally();
            let mut executed: Option<String> = None;
            let mut max = 0;
            for (target, count) in ordered_tally {
                if count > max {
                    max = count;
                    executed = Some(target);
                }
            }
            executed
        };

        let is_hit = executed
            .as_deref()
            .and_then(|id| self.get_player(id))
            .map(|player| player.is_imposter)
            .unwrap_or(false);
        let imposters = self
            .players
            .iter()
            .filter(|player| player.is_imposter)
            .map(|player| player.id.clone())
            .collect();

        vec![
            Effect::StopTimer,
            Effect::Broadcast(RoomEvent::Results(RevealOutcome {
                executed,
                is_hit,
                imposters,
                secret: self.secret_word.clone().unwrap_or_default(),
                jailbreak,
            })),
            Effect::Broadcast(RoomEvent::Update(self.public_state())),
        ]
    }

    pub fn end_game(&mut self, player_id: &str) -> Result<Vec<Effect>, Error> {
        self.require_host(player_id)?;
        self.process_event(&RoomFsmInput::EndGame)?;
        Ok(vec![
            Effect::StopTimer,
            Effect::Broadcast(RoomEvent::Ended),
            Effect::Broadcast(RoomEvent::Update(self.public_state())),
        ])
    }

    /// Returns the room to a fresh lobby, keeping players and topic.
    pub fn reset(&mut self, player_id: &str) -> Result<Vec<Effect>, Error> {
        self.require_host(player_id)?;
        self.process_event(&RoomFsmInput::ResetToLobby)?;
        self.round_number = 0;
        self.start_index = 0;
        self.order.clear();
        self.clear_round_state();
        Ok(vec![
            Effect::StopTimer,
            Effect::Broadcast(RoomEvent::Update(self.public_state())),
        ])
    }

    /// Relays a direct message to the target and echoes it to the sender.
    pub fn send_dm(&self, player_id: &str, to: &str, text: &str) -> Result<Vec<Effect>, Error> {
        let clean = text.trim();
        if clean.is_empty() {
            return Err(Error::Domain(DomainError::EmptySubmission));
        }
        if self.get_player(to).is_none() {
            return Err(Error::Domain(DomainError::InvalidTarget(to.to_string())));
        }
        let sender = self
            .get_player(player_id)
            .ok_or_else(|| Error::Domain(DomainError::UnknownPlayer(player_id.to_string())))?;

        let message = RoomEvent::Dm {
            from: player_id.to_string(),
            to: to.to_string(),
            name: sender.name.clone(),
            text: clean.to_string(),
            at: unix_millis(),
        };
        let mut effects = vec![Effect::direct(to, message.clone())];
        if to != player_id {
            effects.push(Effect::direct(player_id, message));
        }
        Ok(effects)
    }

    pub fn public_state(&self) -> PublicRoom {
        PublicRoom {
            code: self.code.clone(),
            host: self.host.clone(),
            topic: self.topic.clone(),
            phase: self.fsm.state().clone(),
            timer_sec: self.timer_sec,
            vote_timer_sec: self.vote_timer_sec,
            current_turn: self.current_turn.clone(),
            order: self
                .order
                .iter()
                .map(|id| OrderEntry {
                    id: id.clone(),
                    name: self.player_name(id),
                })
                .collect(),
            players: self
                .players
                .iter()
                .map(|player| OrderEntry {
                    id: player.id.clone(),
                    name: player.name.clone(),
                })
                .collect(),
        }
    }

    fn turn_state(&self) -> RoomEvent {
        RoomEvent::TurnState {
            current_turn: self.current_turn.clone(),
            order: self
                .order
                .iter()
                .map(|id| OrderEntry {
                    id: id.clone(),
                    name: self.player_name(id),
                })
                .collect(),
        }
    }

    fn topic_key(&self) -> &str {
        self.topic.as_deref().unwrap_or(words::DEFAULT_TOPIC)
    }

    fn clear_round_state(&mut self) {
        self.secret_word = None;
        self.current_turn = None;
        self.turns_remaining = 0;
        for player in self.players.iter_mut() {
            player.clear_round_state();
        }
    }

    /// Vote counts per target, preserving the order in which targets are
    /// first seen while scanning players in join order. The reveal tie-break
    /// depends on this enumeration order staying fixed.
    fn tally(&self) -> (Vec<(String, usize)>, usize) {
        let mut ordered: Vec<(String, usize)> = Vec::new();
        let mut total = 0;
        for player in &self.players {
            if let Some(target) = &player.vote_for {
                total += 1;
                match ordered.iter_mut().find(|(id, _)| id == target) {
                    Some((_, count)) => *count += 1,
                    None => ordered.push((target.clone(), 1)),
                }
            }
        }
        (ordered, total)
    }
}

fn normalize_guess(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
