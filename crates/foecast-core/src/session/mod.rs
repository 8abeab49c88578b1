//! In-memory state of one prediction session.
//!
//! A session runs in one of two modes. In simple mode only my own opponent is
//! entered each round, plus the key player's opponent when a later prediction
//! depends on it. In full-analysis mode every pairing of the round is entered
//! through a [`PairingDraft`] and the simple history is derived from it.

mod draft;

pub use draft::PairingDraft;

use std::borrow::Cow;

use crate::analysis::derive_round_history;
use crate::cycle::{effective_round, round_in_cycle};
use crate::model::history::{KeyMatchup, RoundHistoryEntry};
use crate::model::matchup::{FullRoundHistoryEntry, PairingError, RoundPairings};
use crate::model::player::{Player, PlayerId, Roster};
use crate::predict::{PredictionEngine, Predictor};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, event};

/// Other players entered at full-analysis setup; with me that makes one cycle's round robin.
pub const FULL_MODE_OPPONENTS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Simple,
    Full,
}

impl GameMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            GameMode::Simple => "simple",
            GameMode::Full => "full",
        }
    }
}

/// Free-text input for one simple-mode round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleRoundInput {
    pub my_opponent: String,
    #[serde(default)]
    pub key_opponent: Option<String>,
}

impl SimpleRoundInput {
    pub fn new(my_opponent: impl Into<String>) -> Self {
        Self {
            my_opponent: my_opponent.into(),
            key_opponent: None,
        }
    }

    pub fn with_key_opponent(mut self, name: impl Into<String>) -> Self {
        self.key_opponent = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("operation requires {expected} mode but the session is in {actual} mode")]
    WrongMode { expected: GameMode, actual: GameMode },
    #[error("{field} must not be empty")]
    EmptyName { field: &'static str },
    #[error("the opponent of key player {key_player} is required this round")]
    MissingKeyOpponent { key_player: PlayerId },
    #[error("expected {expected} opponent names, got {found}")]
    OpponentCount { expected: usize, found: usize },
    #[error("player name '{0}' entered more than once")]
    DuplicateName(String),
    #[error("full-analysis setup has not been completed")]
    SetupIncomplete,
    #[error(transparent)]
    Pairing(#[from] PairingError),
}

#[derive(Debug, Clone)]
pub struct Session {
    mode: GameMode,
    engine: PredictionEngine,
    roster: Roster,
    current_round: u32,
    simple_history: Vec<RoundHistoryEntry>,
    full_history: Vec<FullRoundHistoryEntry>,
    draft: PairingDraft,
    setup_complete: bool,
}

impl Session {
    pub fn new(mode: GameMode) -> Self {
        Self::with_engine(mode, PredictionEngine::default())
    }

    pub fn with_engine(mode: GameMode, engine: PredictionEngine) -> Self {
        let mut session = Self {
            mode,
            engine,
            roster: Roster::empty(),
            current_round: 1,
            simple_history: Vec::new(),
            full_history: Vec::new(),
            draft: PairingDraft::new(),
            setup_complete: false,
        };
        session.reset();
        session
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn engine(&self) -> PredictionEngine {
        self.engine
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn simple_history(&self) -> &[RoundHistoryEntry] {
        &self.simple_history
    }

    pub fn full_history(&self) -> &[FullRoundHistoryEntry] {
        &self.full_history
    }

    pub fn draft(&self) -> &PairingDraft {
        &self.draft
    }

    pub fn is_setup_complete(&self) -> bool {
        self.setup_complete
    }

    /// Clears all rounds and returns to round 1.
    ///
    /// Simple mode keeps only "You"; full mode needs a fresh setup.
    pub fn reset(&mut self) {
        self.roster = match self.mode {
            GameMode::Simple => Roster::with_me(),
            GameMode::Full => Roster::empty(),
        };
        self.current_round = 1;
        self.simple_history.clear();
        self.full_history.clear();
        self.draft.clear();
        self.setup_complete = false;
    }

    pub fn switch_mode(&mut self, mode: GameMode) {
        if mode != self.mode {
            self.mode = mode;
            self.reset();
        }
    }

    /// Registers the other players of a full-analysis session.
    pub fn start_full<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), SessionError> {
        self.expect_mode(GameMode::Full)?;
        if names.len() != FULL_MODE_OPPONENTS {
            return Err(SessionError::OpponentCount {
                expected: FULL_MODE_OPPONENTS,
                found: names.len(),
            });
        }

        let mut seen = vec![Player::me().name.to_lowercase()];
        for name in names {
            let trimmed = name.as_ref().trim();
            if trimmed.is_empty() {
                return Err(SessionError::EmptyName {
                    field: "player name",
                });
            }
            let folded = trimmed.to_lowercase();
            if seen.contains(&folded) {
                return Err(SessionError::DuplicateName(trimmed.to_string()));
            }
            seen.push(folded);
        }

        self.roster = Roster::with_opponents(names);
        self.setup_complete = true;
        Ok(())
    }

    /// The player whose opponent must also be entered for the current round.
    ///
    /// In effective rounds 2 to 4 this is the cycle's round-1 opponent, whose
    /// matchups drive the alternate-schedule predictions of rounds 5 to 7.
    pub fn key_player_for_round(&self) -> Option<PlayerId> {
        if self.mode != GameMode::Simple || !(2..=4).contains(&effective_round(self.current_round)) {
            return None;
        }
        let first_round = round_in_cycle(self.current_round, 1);
        self.simple_history
            .iter()
            .find(|h| h.round == first_round)
            .map(|h| h.my_opponent)
    }

    pub fn submit_simple_round(
        &mut self,
        input: &SimpleRoundInput,
    ) -> Result<RoundHistoryEntry, SessionError> {
        self.expect_mode(GameMode::Simple)?;

        let my_name = input.my_opponent.trim();
        if my_name.is_empty() {
            return Err(SessionError::EmptyName { field: "opponent" });
        }
        let key_player = self.key_player_for_round();
        let key_name = input
            .key_opponent
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        // Resolve against a scratch roster so a rejected round registers nobody.
        let mut roster = self.roster.clone();
        let my_opponent = roster.get_or_create(my_name);
        let mut pairings = RoundPairings::default();
        pairings.insert(PlayerId::ME, my_opponent)?;

        let mut entry = RoundHistoryEntry::new(self.current_round, my_opponent);
        if let Some(key_player) = key_player {
            let opponent = match (pairings.opponent_of(key_player), key_name) {
                // I am facing the key player myself.
                (Some(already), None) => already,
                (_, None) => return Err(SessionError::MissingKeyOpponent { key_player }),
                (Some(already), Some(name)) => {
                    let named = roster.get_or_create(name);
                    if named != already {
                        return Err(PairingError::AlreadyPaired(key_player).into());
                    }
                    already
                }
                (None, Some(name)) => {
                    let named = roster.get_or_create(name);
                    pairings.insert(key_player, named)?;
                    named
                }
            };
            entry.key_matchup = Some(KeyMatchup::new(key_player, opponent));
        }

        self.roster = roster;
        self.simple_history.push(entry);
        self.log_round_recorded(entry.my_opponent, entry.key_matchup.is_some());
        self.current_round += 1;
        Ok(entry)
    }

    pub fn pair(&mut self, a: PlayerId, b: PlayerId) -> Result<(), SessionError> {
        self.expect_full_setup()?;
        self.draft.pair(&self.roster, a, b)?;
        Ok(())
    }

    pub fn clear_draft(&mut self) {
        self.draft.clear();
    }

    /// Commits the current draft as this round's pairings and starts the next round.
    pub fn confirm_full_round(&mut self) -> Result<&FullRoundHistoryEntry, SessionError> {
        self.expect_full_setup()?;
        let entry = self.draft.finalize(self.current_round, &self.roster)?;
        let my_opponent = entry.opponent_of(PlayerId::ME).unwrap_or(PlayerId::ME);
        self.full_history.push(entry);
        self.draft.clear();
        self.log_round_recorded(my_opponent, false);
        self.current_round += 1;
        let index = self.full_history.len() - 1;
        Ok(&self.full_history[index])
    }

    /// History in the shape the predictors read, derived in full mode.
    pub fn history_for_prediction(&self) -> Cow<'_, [RoundHistoryEntry]> {
        match self.mode {
            GameMode::Simple => Cow::Borrowed(&self.simple_history),
            GameMode::Full => Cow::Owned(derive_round_history(&self.full_history)),
        }
    }

    pub fn predicted_opponent_id(&self) -> Option<PlayerId> {
        let history = self.history_for_prediction();
        self.engine.predict(self.current_round, &history)
    }

    /// `None` reads as "Random / Unknown".
    pub fn predicted_opponent(&self) -> Option<&Player> {
        self.predicted_opponent_id()
            .and_then(|id| self.roster.get(id))
    }

    fn expect_mode(&self, expected: GameMode) -> Result<(), SessionError> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(SessionError::WrongMode {
                expected,
                actual: self.mode,
            })
        }
    }

    fn expect_full_setup(&self) -> Result<(), SessionError> {
        self.expect_mode(GameMode::Full)?;
        if !self.setup_complete {
            return Err(SessionError::SetupIncomplete);
        }
        Ok(())
    }

    fn log_round_recorded(&self, my_opponent: PlayerId, key_matchup: bool) {
        event!(
            target: "foecast_core::session",
            Level::INFO,
            mode = self.mode.as_str(),
            round = self.current_round,
            effective_round = effective_round(self.current_round),
            my_opponent = my_opponent.get(),
            key_matchup,
            roster = self.roster.len(),
            "round recorded"
        );
    }
}

impl core::fmt::Display for GameMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["Ann", "Ben", "Cat", "Dan", "Eve", "Fay", "Gus"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn submit(session: &mut Session, opponent: &str, key: Option<&str>) -> RoundHistoryEntry {
        let mut input = SimpleRoundInput::new(opponent);
        if let Some(key) = key {
            input = input.with_key_opponent(key);
        }
        session.submit_simple_round(&input).expect("round accepted")
    }

    #[test]
    fn simple_session_starts_with_me_only() {
        let session = Session::new(GameMode::Simple);
        assert_eq!(session.current_round(), 1);
        assert_eq!(session.roster().players(), &[Player::me()]);
        assert!(session.predicted_opponent().is_none());
    }

    #[test]
    fn key_player_is_asked_for_in_rounds_two_to_four() {
        let mut session = Session::new(GameMode::Simple);
        assert_eq!(session.key_player_for_round(), None);
        let first = submit(&mut session, "Ann", None);
        for _ in 2..=4 {
            assert_eq!(session.key_player_for_round(), Some(first.my_opponent));
            let round = session.current_round();
            submit(&mut session, &format!("P{round}"), Some(&format!("Q{round}")));
        }
        assert_eq!(session.key_player_for_round(), None);
    }

    #[test]
    fn missing_key_opponent_rejects_round_without_side_effects() {
        let mut session = Session::new(GameMode::Simple);
        submit(&mut session, "Ann", None);
        let err = session
            .submit_simple_round(&SimpleRoundInput::new("Ben"))
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::MissingKeyOpponent {
                key_player: PlayerId(2)
            }
        );
        assert_eq!(session.current_round(), 2);
        assert!(session.roster().find_by_name("Ben").is_none());
    }

    #[test]
    fn facing_the_key_player_fills_the_key_matchup() {
        let mut session = Session::new(GameMode::Simple);
        submit(&mut session, "Ann", None);
        let entry = submit(&mut session, "ann", None);
        assert_eq!(
            entry.key_matchup,
            Some(KeyMatchup::new(PlayerId(2), PlayerId::ME))
        );
    }

    #[test]
    fn key_opponent_must_be_consistent_with_my_pairing() {
        let mut session = Session::new(GameMode::Simple);
        submit(&mut session, "Ann", None);
        let err = session
            .submit_simple_round(&SimpleRoundInput::new("Ben").with_key_opponent("Ben"))
            .unwrap_err();
        assert_eq!(err, SessionError::Pairing(PairingError::AlreadyPaired(PlayerId(3))));
        let err = session
            .submit_simple_round(&SimpleRoundInput::new("Ben").with_key_opponent("ann"))
            .unwrap_err();
        assert_eq!(err, SessionError::Pairing(PairingError::SelfPairing(PlayerId(2))));
    }

    #[test]
    fn cannot_face_myself() {
        let mut session = Session::new(GameMode::Simple);
        let err = session
            .submit_simple_round(&SimpleRoundInput::new("you"))
            .unwrap_err();
        assert_eq!(err, SessionError::Pairing(PairingError::SelfPairing(PlayerId::ME)));
        let err = session
            .submit_simple_round(&SimpleRoundInput::new("   "))
            .unwrap_err();
        assert_eq!(err, SessionError::EmptyName { field: "opponent" });
    }

    #[test]
    fn simple_mode_predicts_round_four_tentatively() {
        let mut session = Session::new(GameMode::Simple);
        submit(&mut session, "Ann", None);
        submit(&mut session, "Ben", Some("Cat"));
        submit(&mut session, "Dan", Some("Eve"));
        assert_eq!(session.current_round(), 4);
        assert_eq!(session.predicted_opponent().map(|p| p.name.as_str()), Some("Ann"));
    }

    #[test]
    fn full_mode_requires_setup() {
        let mut session = Session::new(GameMode::Full);
        assert!(session.roster().is_empty());
        assert_eq!(
            session.pair(PlayerId(1), PlayerId(2)),
            Err(SessionError::SetupIncomplete)
        );
        let mut short = names();
        short.pop();
        assert_eq!(
            session.start_full(&short),
            Err(SessionError::OpponentCount {
                expected: 7,
                found: 6
            })
        );
        let mut duplicate = names();
        duplicate[3] = " ann ".to_string();
        assert_eq!(
            session.start_full(&duplicate),
            Err(SessionError::DuplicateName("ann".to_string()))
        );
        session.start_full(&names()).unwrap();
        assert_eq!(session.roster().len(), 8);
        assert_eq!(session.roster().label(PlayerId(8)), "Gus");
    }

    #[test]
    fn confirming_full_round_advances_and_clears_draft() {
        let mut session = Session::new(GameMode::Full);
        session.start_full(&names()).unwrap();
        for (a, b) in [(1, 2), (3, 4), (5, 6)] {
            session.pair(PlayerId(a), PlayerId(b)).unwrap();
        }
        assert_eq!(
            session.confirm_full_round().unwrap_err(),
            SessionError::Pairing(PairingError::Incomplete { unpaired: 2 })
        );
        session.pair(PlayerId(7), PlayerId(8)).unwrap();
        let entry = session.confirm_full_round().unwrap();
        assert_eq!(entry.matchups.len(), 4);
        assert_eq!(session.current_round(), 2);
        assert!(session.draft().unpaired(session.roster()).len() == 8);
        assert_eq!(session.history_for_prediction().len(), 1);
    }

    #[test]
    fn simple_only_operations_reject_full_mode() {
        let mut session = Session::new(GameMode::Full);
        assert_eq!(
            session.submit_simple_round(&SimpleRoundInput::new("Ann")),
            Err(SessionError::WrongMode {
                expected: GameMode::Simple,
                actual: GameMode::Full
            })
        );
    }

    #[test]
    fn switching_mode_resets_state() {
        let mut session = Session::new(GameMode::Simple);
        submit(&mut session, "Ann", None);
        session.switch_mode(GameMode::Simple);
        assert_eq!(session.current_round(), 2);
        session.switch_mode(GameMode::Full);
        assert_eq!(session.current_round(), 1);
        assert!(session.simple_history().is_empty());
        assert!(!session.is_setup_complete());
        session.switch_mode(GameMode::Simple);
        assert_eq!(session.roster().len(), 1);
    }
}
