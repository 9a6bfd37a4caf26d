pub mod actor;

/// A room member, keyed by the session id of its connection. Role fields are
/// only populated between a deal and the next topic change or reset.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub is_imposter: bool,
    pub word: Option<String>,
    pub vote_for: Option<String>,
    pub guessed: bool,
}

impl Player {
    pub fn new(id: &str, name: &str) -> Self {
        Player {
            id: id.to_string(),
            name: name.to_string(),
            is_imposter: false,
            word: None,
            vote_for: None,
            guessed: false,
        }
    }

    /// Clears everything that only lives for the duration of a round.
    pub fn clear_round_state(&mut self) {
        self.is_imposter = false;
        self.word = None;
        self.vote_for = None;
        self.guessed = false;
    }
}
