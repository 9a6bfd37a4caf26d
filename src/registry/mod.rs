pub mod actor;
pub mod actor_client;

use rand::seq::SliceRandom;
use std::collections::HashMap;

use crate::config::GameSettings;
use crate::registry::actor_client::RoomRegistryClient;
use crate::room::actor::RoomActor;
use crate::room::actor_client::RoomClient;

/// The map of live rooms, keyed by their join code. Owned by the registry
/// actor; a room disappears from the map when its actor stops.
pub struct RoomRegistry {
    room_channels: HashMap<String, RoomClient>,
    game_settings: GameSettings,
}

impl RoomRegistry {
    // No O/0 and I/1 so codes survive being read out loud.
    const CODE_ALPHABET: &'static [u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    const CODE_LENGTH: usize = 4;

    pub fn new(game_settings: GameSettings) -> Self {
        RoomRegistry {
            room_channels: HashMap::default(),
            game_settings,
        }
    }

    /// Returns the room under the given code, spawning a fresh one when no
    /// such room is live. Client codes are opaque and used verbatim; an empty
    /// or missing code gets a generated one. A held entry whose actor already
    /// stopped counts as not live and is replaced.
    pub fn ensure_room(
        &mut self,
        code: Option<&str>,
        registry: RoomRegistryClient,
    ) -> (String, RoomClient) {
        let code = match code {
            Some(code) if !code.is_empty() => code.to_string(),
            _ => self.create_unique_room_code(),
        };
        let room = match self.room_channels.get(&code) {
            Some(room) if !room.is_closed() => room.clone(),
            _ => {
                let room = RoomActor::spawn(&code, &self.game_settings, registry);
                self.room_channels.insert(code.clone(), room.clone());
                room
            }
        };
        (code, room)
    }

    /// Deregistration request from a stopping room actor. A live entry under
    /// the code belongs to a newer room actor and stays.
    pub fn remove_room(&mut self, code: &str) {
        if let Some(room) = self.room_channels.get(code) {
            if room.is_closed() {
                self.room_channels.remove(code);
            }
        }
    }

    fn create_unique_room_code(&self) -> String {
        loop {
            let code: String = (0..RoomRegistry::CODE_LENGTH)
                .filter_map(|_| {
                    RoomRegistry::CODE_ALPHABET
                        .choose(&mut rand::thread_rng())
                        .map(|byte| *byte as char)
                })
                .collect();
            if !self.room_channels.contains_key(&code) {
                return code;
            }
        }
    }
}
