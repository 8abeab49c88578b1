//! Next-opponent prediction.
//!
//! - `pattern`: detects which schedule the current cycle follows.
//! - `classic`: predictor for cycles where round 4 repeats round 1.
//! - `alternate`: predictor that follows the round-1 opponent's own matchups.
//!
//! Every function here is pure over the history slice it is handed. An
//! under-determined round is reported as `None`, never as an error.

mod alternate;
mod classic;
pub mod pattern;

pub use alternate::predict_with_alternate;
pub use classic::predict_with_classic;
pub use pattern::{Pattern, detect_pattern};

use crate::cycle::CycleWindow;
use crate::model::history::RoundHistoryEntry;
use crate::model::player::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

/// Outcome of a single prediction, kept for logging and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredictionTrace {
    pub round: u32,
    pub effective_round: u32,
    pub pattern: Pattern,
    pub opponent: Option<PlayerId>,
    /// Set when the classic schedule was assumed before it could be confirmed.
    pub tentative: bool,
}

/// Predicts my opponent for `current_round` from the rounds already played.
pub fn predict_opponent_id(current_round: u32, history: &[RoundHistoryEntry]) -> Option<PlayerId> {
    explain_prediction(current_round, history).opponent
}

pub fn explain_prediction(current_round: u32, history: &[RoundHistoryEntry]) -> PredictionTrace {
    let window = CycleWindow::new(current_round, history);
    let pattern = detect_pattern(&window);

    let (opponent, tentative) = match pattern {
        Pattern::Classic => (predict_with_classic(&window), false),
        Pattern::Alternate => (predict_with_alternate(&window), false),
        // Round 4 is the first round the classic schedule can answer; assume it
        // until the round-4 result says otherwise.
        Pattern::Unknown if window.effective_round() == 4 => {
            (predict_with_classic(&window), true)
        }
        Pattern::Unknown => (None, false),
    };

    let trace = PredictionTrace {
        round: current_round,
        effective_round: window.effective_round(),
        pattern,
        opponent,
        tentative,
    };
    log_prediction(&trace, window.entries().len());
    trace
}

/// Strategy seam for the two prediction engines.
pub trait Predictor {
    fn predict(&self, current_round: u32, history: &[RoundHistoryEntry]) -> Option<PlayerId>;
}

/// Pattern-detecting engine with the round-4 fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectingPredictor;

impl Predictor for DetectingPredictor {
    fn predict(&self, current_round: u32, history: &[RoundHistoryEntry]) -> Option<PlayerId> {
        predict_opponent_id(current_round, history)
    }
}

/// Single-pattern engine: always follows the key player, never detects.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyPlayerPredictor;

impl Predictor for KeyPlayerPredictor {
    fn predict(&self, current_round: u32, history: &[RoundHistoryEntry]) -> Option<PlayerId> {
        predict_with_alternate(&CycleWindow::new(current_round, history))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionEngine {
    #[default]
    Detecting,
    KeyPlayer,
}

impl PredictionEngine {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().replace('-', "_").as_str() {
            "detecting" | "dual" => Some(PredictionEngine::Detecting),
            "key_player" | "single" => Some(PredictionEngine::KeyPlayer),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PredictionEngine::Detecting => "detecting",
            PredictionEngine::KeyPlayer => "key_player",
        }
    }
}

impl Predictor for PredictionEngine {
    fn predict(&self, current_round: u32, history: &[RoundHistoryEntry]) -> Option<PlayerId> {
        match self {
            PredictionEngine::Detecting => DetectingPredictor.predict(current_round, history),
            PredictionEngine::KeyPlayer => KeyPlayerPredictor.predict(current_round, history),
        }
    }
}

fn log_prediction(trace: &PredictionTrace, cycle_entries: usize) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    event!(
        target: "foecast_core::predict",
        Level::DEBUG,
        round = trace.round,
        effective_round = trace.effective_round,
        pattern = trace.pattern.as_str(),
        opponent = ?trace.opponent.map(PlayerId::get),
        tentative = trace.tentative,
        cycle_entries,
    );
}
