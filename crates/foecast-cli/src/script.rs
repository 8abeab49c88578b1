//! Scripted sessions: a YAML file of rounds replayed through a [`Session`].
//!
//! ```yaml
//! mode: full
//! players: [Ann, Ben, Cat, Dan, Eve, Fay, Gus]
//! rounds:
//!   - pairs: [[You, Ann], [Ben, Cat], [Dan, Eve], [Fay, Gus]]
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use foecast_core::cycle::effective_round;
use foecast_core::model::PlayerId;
use foecast_core::predict::{Pattern, PredictionEngine, explain_prediction};
use foecast_core::session::{GameMode, Session, SessionError, SimpleRoundInput};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionScript {
    Simple {
        rounds: Vec<SimpleRoundInput>,
    },
    Full {
        players: Vec<String>,
        rounds: Vec<FullRoundScript>,
    },
}

/// One full-analysis round given as pairs of player names.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FullRoundScript {
    pub pairs: Vec<[String; 2]>,
}

impl SessionScript {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ScriptError::Read {
            source,
            path: path.to_path_buf(),
        })?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ScriptError::Parse {
            source,
            path: path.to_path_buf(),
        })
    }

    pub fn mode(&self) -> GameMode {
        match self {
            SessionScript::Simple { .. } => GameMode::Simple,
            SessionScript::Full { .. } => GameMode::Full,
        }
    }

    /// Plays every round into a fresh session.
    pub fn play(&self, engine: PredictionEngine) -> Result<Session, ScriptError> {
        self.play_with(engine, |_, _| {})
    }

    /// Plays the script, reporting the prediction made before each round and its actual opponent.
    fn play_with<F>(&self, engine: PredictionEngine, mut observe: F) -> Result<Session, ScriptError>
    where
        F: FnMut(&Session, PlayerId),
    {
        let mut session = Session::with_engine(self.mode(), engine);
        match self {
            SessionScript::Simple { rounds } => {
                for input in rounds {
                    let round = session.current_round();
                    let before = session.clone();
                    let entry = session
                        .submit_simple_round(input)
                        .map_err(|source| ScriptError::Round { round, source })?;
                    observe(&before, entry.my_opponent);
                }
            }
            SessionScript::Full { players, rounds } => {
                session
                    .start_full(players.as_slice())
                    .map_err(|source| ScriptError::Round { round: 0, source })?;
                for script in rounds {
                    let round = session.current_round();
                    for [a, b] in &script.pairs {
                        let a = resolve(&session, round, a)?;
                        let b = resolve(&session, round, b)?;
                        session
                            .pair(a, b)
                            .map_err(|source| ScriptError::Round { round, source })?;
                    }
                    let before = session.clone();
                    let entry = session
                        .confirm_full_round()
                        .map_err(|source| ScriptError::Round { round, source })?;
                    let mine = entry.opponent_of(PlayerId::ME).unwrap_or(PlayerId::ME);
                    observe(&before, mine);
                }
            }
        }
        Ok(session)
    }
}

fn resolve(session: &Session, round: u32, name: &str) -> Result<PlayerId, ScriptError> {
    session
        .roster()
        .find_by_name(name)
        .map(|p| p.id)
        .ok_or_else(|| ScriptError::UnknownPlayer {
            round,
            name: name.to_string(),
        })
}

/// Prediction shown before a round and, once played, who actually came.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayRow {
    pub round: u32,
    pub effective_round: u32,
    pub pattern: Pattern,
    pub predicted: Option<String>,
    /// `None` for the upcoming round after the script ends.
    pub actual: Option<String>,
}

impl ReplayRow {
    pub fn hit(&self) -> Option<bool> {
        match (&self.predicted, &self.actual) {
            (Some(predicted), Some(actual)) => Some(predicted == actual),
            _ => None,
        }
    }

    fn capture(session: &Session) -> Self {
        let round = session.current_round();
        let history = session.history_for_prediction();
        Self {
            round,
            effective_round: effective_round(round),
            pattern: explain_prediction(round, &history).pattern,
            predicted: session.predicted_opponent().map(|p| p.name.clone()),
            actual: None,
        }
    }
}

/// Replays a script and returns one row per round plus the prediction for the next one.
pub fn replay(
    script: &SessionScript,
    engine: PredictionEngine,
) -> Result<Vec<ReplayRow>, ScriptError> {
    let mut played: Vec<(ReplayRow, PlayerId)> = Vec::new();
    let session = script.play_with(engine, |before, actual| {
        played.push((ReplayRow::capture(before), actual));
    })?;

    // Labels come from the final roster: a first-time opponent is registered by its own round.
    let mut rows: Vec<ReplayRow> = played
        .into_iter()
        .map(|(mut row, actual)| {
            row.actual = Some(session.roster().label(actual));
            row
        })
        .collect();
    rows.push(ReplayRow::capture(&session));
    Ok(rows)
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse script {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("round {round} rejected: {source}")]
    Round {
        round: u32,
        #[source]
        source: SessionError,
    },
    #[error("round {round} names unknown player '{name}'")]
    UnknownPlayer { round: u32, name: String },
}
