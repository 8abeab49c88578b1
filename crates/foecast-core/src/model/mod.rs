pub mod history;
pub mod matchup;
pub mod player;

pub use history::{KeyMatchup, RoundHistoryEntry};
pub use matchup::{FullRoundHistoryEntry, Matchup, PairingError, RoundPairings};
pub use player::{Player, PlayerId, Roster};
