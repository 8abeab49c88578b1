use super::player::PlayerId;
use serde::{Deserialize, Serialize};

/// The pairing of a designated key player in one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMatchup {
    pub key_player: PlayerId,
    pub opponent: PlayerId,
}

impl KeyMatchup {
    pub const fn new(key_player: PlayerId, opponent: PlayerId) -> Self {
        Self {
            key_player,
            opponent,
        }
    }

    /// Opponent of `key_player`, if this matchup was recorded for them.
    pub fn opponent_of(&self, key_player: PlayerId) -> Option<PlayerId> {
        (self.key_player == key_player).then_some(self.opponent)
    }
}

/// One completed round from the local player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundHistoryEntry {
    pub round: u32,
    pub my_opponent: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_matchup: Option<KeyMatchup>,
}

impl RoundHistoryEntry {
    pub const fn new(round: u32, my_opponent: PlayerId) -> Self {
        Self {
            round,
            my_opponent,
            key_matchup: None,
        }
    }

    pub const fn with_key_matchup(mut self, key_player: PlayerId, opponent: PlayerId) -> Self {
        self.key_matchup = Some(KeyMatchup::new(key_player, opponent));
        self
    }
}
