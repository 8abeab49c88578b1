use foecast_core::cycle::CYCLE_LENGTH;
use foecast_core::model::{Matchup, PlayerId};
use foecast_core::predict::Pattern;
use foecast_core::session::FULL_MODE_OPPONENTS;
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

/// Players in a simulated lobby, me included.
pub const LOBBY_SIZE: u32 = FULL_MODE_OPPONENTS as u32 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("player {player} has no opponent in round {round} of the generated cycle")]
    Unpaired { round: usize, player: PlayerId },
}

/// Complete pairings for one 7-round cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSchedule {
    pattern: Pattern,
    rounds: Vec<Vec<Matchup>>,
}

impl CycleSchedule {
    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn rounds(&self) -> &[Vec<Matchup>] {
        &self.rounds
    }

    /// Opponent of `player` in effective round `effective` (1-based).
    pub fn opponent(&self, effective: usize, player: PlayerId) -> Result<PlayerId, ScheduleError> {
        opponent_in(&self.rounds, effective, player)
    }
}

/// Generates a cycle whose pairings follow `pattern` from player 1's point of view.
///
/// Classic: round 4 repeats my round-1 opponent and round 5 my round-3 opponent.
/// Alternate: with `a` my round-1 opponent, I avoid `a` in rounds 2 to 4, then
/// face `a`'s round-4, round-2 and round-3 opponents in rounds 5, 6 and 7.
/// Unknown: every round is drawn independently.
pub fn generate_cycle<R: Rng>(
    rng: &mut R,
    pattern: Pattern,
) -> Result<CycleSchedule, ScheduleError> {
    let mut rounds: Vec<Vec<Matchup>> = Vec::with_capacity(CYCLE_LENGTH as usize);

    let first = pick_opponent(rng, None);
    rounds.push(random_round(rng, first));

    match pattern {
        Pattern::Classic => {
            for _ in 2..=3 {
                let opponent = pick_opponent(rng, None);
                rounds.push(random_round(rng, opponent));
            }
            rounds.push(random_round(rng, first));
            let third = opponent_in(&rounds, 3, PlayerId::ME)?;
            rounds.push(random_round(rng, third));
            for _ in 6..=7 {
                let opponent = pick_opponent(rng, None);
                rounds.push(random_round(rng, opponent));
            }
        }
        Pattern::Alternate => {
            for _ in 2..=4 {
                let opponent = pick_opponent(rng, Some(first));
                rounds.push(random_round(rng, opponent));
            }
            for source in [4, 2, 3] {
                let opponent = opponent_in(&rounds, source, first)?;
                rounds.push(random_round(rng, opponent));
            }
        }
        Pattern::Unknown => {
            for _ in 2..=CYCLE_LENGTH {
                let opponent = pick_opponent(rng, None);
                rounds.push(random_round(rng, opponent));
            }
        }
    }

    Ok(CycleSchedule { pattern, rounds })
}

fn pick_opponent<R: Rng>(rng: &mut R, exclude: Option<PlayerId>) -> PlayerId {
    let candidates: Vec<PlayerId> = (2..=LOBBY_SIZE)
        .map(PlayerId)
        .filter(|id| Some(*id) != exclude)
        .collect();
    candidates[rng.gen_range(0..candidates.len())]
}

/// Pairs me with `my_opponent` and everyone else at random.
fn random_round<R: Rng>(rng: &mut R, my_opponent: PlayerId) -> Vec<Matchup> {
    let mut rest: Vec<PlayerId> = (2..=LOBBY_SIZE)
        .map(PlayerId)
        .filter(|id| *id != my_opponent)
        .collect();
    rest.shuffle(rng);

    let mut matchups = Vec::with_capacity(LOBBY_SIZE as usize / 2);
    matchups.push(Matchup::new(PlayerId::ME, my_opponent));
    matchups.extend(
        rest.chunks_exact(2)
            .map(|pair| Matchup::new(pair[0], pair[1])),
    );
    matchups
}

fn opponent_in(
    rounds: &[Vec<Matchup>],
    effective: usize,
    player: PlayerId,
) -> Result<PlayerId, ScheduleError> {
    rounds
        .get(effective - 1)
        .and_then(|round| round.iter().find_map(|m| m.opponent_of(player)))
        .ok_or(ScheduleError::Unpaired {
            round: effective,
            player,
        })
}
