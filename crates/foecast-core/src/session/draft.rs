use crate::model::matchup::{FullRoundHistoryEntry, Matchup, PairingError, RoundPairings};
use crate::model::player::{Player, PlayerId, Roster};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Pairings selected so far for the round being entered in full-analysis mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingDraft {
    pairings: RoundPairings,
}

impl PairingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair(&mut self, roster: &Roster, a: PlayerId, b: PlayerId) -> Result<(), PairingError> {
        for player in [a, b] {
            if !roster.contains(player) {
                return Err(PairingError::UnknownPlayer(player));
            }
        }
        self.pairings.insert(a, b)
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.pairings.opponent_of(player)
    }

    pub fn unpaired<'r>(&self, roster: &'r Roster) -> Vec<&'r Player> {
        roster
            .players()
            .iter()
            .filter(|p| !self.pairings.is_paired(p.id))
            .collect()
    }

    pub fn is_complete(&self, roster: &Roster) -> bool {
        !roster.is_empty() && self.unpaired(roster).is_empty()
    }

    pub fn clear(&mut self) {
        self.pairings.clear();
    }

    /// Freezes the draft into a confirmed round.
    ///
    /// Matchups follow roster order, each listed once with the earlier-registered
    /// player first.
    pub fn finalize(&self, round: u32, roster: &Roster) -> Result<FullRoundHistoryEntry, PairingError> {
        let unpaired = self.unpaired(roster).len();
        if roster.is_empty() || unpaired > 0 {
            return Err(PairingError::Incomplete { unpaired });
        }

        let mut processed = HashSet::new();
        let mut matchups = Vec::with_capacity(roster.len() / 2);
        for player in roster.players() {
            if processed.contains(&player.id) {
                continue;
            }
            if let Some(opponent) = self.opponent_of(player.id) {
                matchups.push(Matchup::new(player.id, opponent));
                processed.insert(player.id);
                processed.insert(opponent);
            }
        }
        Ok(FullRoundHistoryEntry::new(round, matchups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::with_opponents(["Ann", "Ben", "Cat"])
    }

    #[test]
    fn pairing_is_recorded_both_ways() {
        let roster = roster();
        let mut draft = PairingDraft::new();
        draft.pair(&roster, PlayerId(3), PlayerId(1)).unwrap();
        assert_eq!(draft.opponent_of(PlayerId(1)), Some(PlayerId(3)));
        let unpaired: Vec<u32> = draft.unpaired(&roster).iter().map(|p| p.id.get()).collect();
        assert_eq!(unpaired, vec![2, 4]);
    }

    #[test]
    fn already_paired_player_is_rejected() {
        let roster = roster();
        let mut draft = PairingDraft::new();
        draft.pair(&roster, PlayerId(1), PlayerId(2)).unwrap();
        assert_eq!(
            draft.pair(&roster, PlayerId(2), PlayerId(3)),
            Err(PairingError::AlreadyPaired(PlayerId(2)))
        );
    }

    #[test]
    fn unknown_player_is_rejected() {
        let roster = roster();
        let mut draft = PairingDraft::new();
        assert_eq!(
            draft.pair(&roster, PlayerId(1), PlayerId(9)),
            Err(PairingError::UnknownPlayer(PlayerId(9)))
        );
    }

    #[test]
    fn finalize_requires_everyone_paired() {
        let roster = roster();
        let mut draft = PairingDraft::new();
        draft.pair(&roster, PlayerId(1), PlayerId(2)).unwrap();
        assert_eq!(
            draft.finalize(1, &roster),
            Err(PairingError::Incomplete { unpaired: 2 })
        );
        assert_eq!(
            PairingDraft::new().finalize(1, &Roster::empty()),
            Err(PairingError::Incomplete { unpaired: 0 })
        );
    }

    #[test]
    fn finalize_lists_each_matchup_once_in_roster_order() {
        let roster = roster();
        let mut draft = PairingDraft::new();
        draft.pair(&roster, PlayerId(4), PlayerId(1)).unwrap();
        draft.pair(&roster, PlayerId(3), PlayerId(2)).unwrap();
        assert!(draft.is_complete(&roster));

        let entry = draft.finalize(6, &roster).unwrap();
        assert_eq!(entry.round, 6);
        assert_eq!(
            entry.matchups,
            vec![
                Matchup::new(PlayerId(1), PlayerId(4)),
                Matchup::new(PlayerId(2), PlayerId(3)),
            ]
        );
    }

    #[test]
    fn clear_discards_selections() {
        let roster = roster();
        let mut draft = PairingDraft::new();
        draft.pair(&roster, PlayerId(1), PlayerId(2)).unwrap();
        draft.clear();
        assert_eq!(draft.unpaired(&roster).len(), 4);
    }
}
