use crate::cycle::CycleWindow;
use crate::model::player::PlayerId;

/// Later rounds replay the round-1 opponent's earlier matchups.
///
/// The key player is whoever I faced in round 1. Round 5 takes their round-4
/// opponent, round 6 their round-2 opponent and round 7 their round-3 opponent,
/// read from the key matchups recorded for those rounds.
pub fn predict_with_alternate(window: &CycleWindow) -> Option<PlayerId> {
    let source = match window.effective_round() {
        5 => 4,
        6 => 2,
        7 => 3,
        _ => return None,
    };
    let key_player = window.entry(1)?.my_opponent;
    window
        .entry(source)?
        .key_matchup?
        .opponent_of(key_player)
}
