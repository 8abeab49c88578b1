//! Reduces full-analysis pairings to the per-round history the predictors read.

use crate::cycle::{effective_round, round_in_cycle};
use crate::model::history::{KeyMatchup, RoundHistoryEntry};
use crate::model::matchup::FullRoundHistoryEntry;
use crate::model::player::PlayerId;

/// Derives one history entry per full round in which I have an opponent.
///
/// Key matchups are filled in retroactively: at effective rounds 2, 4 and 6
/// the cycle's round-1 opponent is tracked, at effective round 5 the round-3
/// opponent.
pub fn derive_round_history(full_history: &[FullRoundHistoryEntry]) -> Vec<RoundHistoryEntry> {
    full_history
        .iter()
        .filter_map(|round| derive_entry(round, full_history))
        .collect()
}

pub fn derive_entry(
    round: &FullRoundHistoryEntry,
    full_history: &[FullRoundHistoryEntry],
) -> Option<RoundHistoryEntry> {
    let my_opponent = opponent_in(round, PlayerId::ME)?;

    let key_source = match effective_round(round.round) {
        2 | 4 | 6 => Some(1),
        5 => Some(3),
        _ => None,
    };
    let key_player = key_source.and_then(|effective| {
        let source_round = round_in_cycle(round.round, effective);
        full_history
            .iter()
            .find(|h| h.round == source_round)
            .and_then(|h| opponent_in(h, PlayerId::ME))
    });
    let key_matchup = key_player.and_then(|key_player| {
        opponent_in(round, key_player).map(|opponent| KeyMatchup::new(key_player, opponent))
    });

    Some(RoundHistoryEntry {
        round: round.round,
        my_opponent,
        key_matchup,
    })
}

fn opponent_in(round: &FullRoundHistoryEntry, player: PlayerId) -> Option<PlayerId> {
    match round.pairings() {
        Ok(pairings) => pairings.opponent_of(player),
        Err(_) => round.opponent_of(player),
    }
}
