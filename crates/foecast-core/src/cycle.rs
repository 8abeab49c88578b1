//! Position of a round within the repeating 7-round pairing cycle.

use crate::model::history::RoundHistoryEntry;

pub const CYCLE_LENGTH: u32 = 7;

/// Position of `round` within its cycle, in `1..=7`. Round 0 is treated as round 1.
pub const fn effective_round(round: u32) -> u32 {
    let round = if round == 0 { 1 } else { round };
    (round - 1) % CYCLE_LENGTH + 1
}

/// First absolute round of the cycle containing `round`.
pub const fn cycle_start_round(round: u32) -> u32 {
    let round = if round == 0 { 1 } else { round };
    (round - 1) / CYCLE_LENGTH * CYCLE_LENGTH + 1
}

/// Absolute round number of effective round `effective` in the cycle containing `round`.
pub const fn round_in_cycle(round: u32, effective: u32) -> u32 {
    cycle_start_round(round) + effective - 1
}

/// Entries of the current cycle recorded strictly before `current_round`.
pub fn completed_cycle_history(
    current_round: u32,
    history: &[RoundHistoryEntry],
) -> Vec<RoundHistoryEntry> {
    let start = cycle_start_round(current_round);
    history
        .iter()
        .filter(|h| h.round >= start && h.round < current_round)
        .copied()
        .collect()
}

/// Cycle-local view of the history for the round being predicted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleWindow {
    current_round: u32,
    effective_round: u32,
    entries: Vec<RoundHistoryEntry>,
}

impl CycleWindow {
    pub fn new(current_round: u32, history: &[RoundHistoryEntry]) -> Self {
        Self {
            current_round,
            effective_round: effective_round(current_round),
            entries: completed_cycle_history(current_round, history),
        }
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn effective_round(&self) -> u32 {
        self.effective_round
    }

    pub fn entries(&self) -> &[RoundHistoryEntry] {
        &self.entries
    }

    /// First completed entry sitting at `effective` within this cycle.
    pub fn entry(&self, effective: u32) -> Option<&RoundHistoryEntry> {
        self.entries
            .iter()
            .find(|h| effective_round(h.round) == effective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::PlayerId;

    #[test]
    fn effective_round_wraps_every_seven() {
        let expected = [1, 2, 3, 4, 5, 6, 7, 1, 2];
        for (round, want) in (1..=9).zip(expected) {
            assert_eq!(effective_round(round), want, "round {round}");
        }
        assert_eq!(effective_round(14), 7);
        assert_eq!(effective_round(15), 1);
    }

    #[test]
    fn cycle_start_is_first_round_of_cycle() {
        assert_eq!(cycle_start_round(1), 1);
        assert_eq!(cycle_start_round(7), 1);
        assert_eq!(cycle_start_round(8), 8);
        assert_eq!(cycle_start_round(20), 15);
        assert_eq!(round_in_cycle(10, 3), 10);
        assert_eq!(round_in_cycle(10, 1), 8);
    }

    #[test]
    fn round_zero_is_normalized() {
        assert_eq!(effective_round(0), 1);
        assert_eq!(cycle_start_round(0), 1);
    }

    #[test]
    fn completed_history_excludes_previous_cycle_and_future_rounds() {
        let history: Vec<_> = (1..=12)
            .map(|round| RoundHistoryEntry::new(round, PlayerId(round + 1)))
            .collect();
        let window = completed_cycle_history(10, &history);
        let rounds: Vec<u32> = window.iter().map(|h| h.round).collect();
        assert_eq!(rounds, vec![8, 9]);
    }

    #[test]
    fn window_entry_finds_by_effective_round() {
        let history = vec![
            RoundHistoryEntry::new(8, PlayerId(3)),
            RoundHistoryEntry::new(10, PlayerId(5)),
        ];
        let window = CycleWindow::new(12, &history);
        assert_eq!(window.effective_round(), 5);
        assert_eq!(window.entry(3).map(|h| h.my_opponent), Some(PlayerId(5)));
        assert!(window.entry(2).is_none());
    }
}
