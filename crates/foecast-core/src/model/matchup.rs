use super::player::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Unordered pairing of two players in one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub player1: PlayerId,
    pub player2: PlayerId,
}

impl Matchup {
    pub const fn new(player1: PlayerId, player2: PlayerId) -> Self {
        Self { player1, player2 }
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1 == player || self.player2 == player
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        if self.player1 == player {
            Some(self.player2)
        } else if self.player2 == player {
            Some(self.player1)
        } else {
            None
        }
    }
}

/// Every pairing of one round, as confirmed in full-analysis mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullRoundHistoryEntry {
    pub round: u32,
    pub matchups: Vec<Matchup>,
}

impl FullRoundHistoryEntry {
    pub fn new(round: u32, matchups: Vec<Matchup>) -> Self {
        Self { round, matchups }
    }

    pub fn pairings(&self) -> Result<RoundPairings, PairingError> {
        RoundPairings::from_matchups(&self.matchups)
    }

    /// Opponent lookup that tolerates inconsistent matchup lists (first match wins).
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.matchups
            .iter()
            .find_map(|matchup| matchup.opponent_of(player))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("player {0} cannot be paired with themself")]
    SelfPairing(PlayerId),
    #[error("player {0} is already paired this round")]
    AlreadyPaired(PlayerId),
    #[error("player {0} is not on the roster")]
    UnknownPlayer(PlayerId),
    #[error("{unpaired} player(s) still need an opponent")]
    Incomplete { unpaired: usize },
}

/// Symmetric player-to-opponent lookup for a single round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundPairings {
    opponents: BTreeMap<PlayerId, PlayerId>,
}

impl RoundPairings {
    pub fn from_matchups(matchups: &[Matchup]) -> Result<Self, PairingError> {
        let mut pairings = Self::default();
        for matchup in matchups {
            pairings.insert(matchup.player1, matchup.player2)?;
        }
        Ok(pairings)
    }

    pub fn insert(&mut self, a: PlayerId, b: PlayerId) -> Result<(), PairingError> {
        if a == b {
            return Err(PairingError::SelfPairing(a));
        }
        for player in [a, b] {
            if self.opponents.contains_key(&player) {
                return Err(PairingError::AlreadyPaired(player));
            }
        }
        self.opponents.insert(a, b);
        self.opponents.insert(b, a);
        Ok(())
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.opponents.get(&player).copied()
    }

    pub fn is_paired(&self, player: PlayerId) -> bool {
        self.opponents.contains_key(&player)
    }

    /// Number of paired players (twice the number of matchups).
    pub fn len(&self) -> usize {
        self.opponents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opponents.is_empty()
    }

    pub fn clear(&mut self) {
        self.opponents.clear();
    }
}
