use crate::cycle::CycleWindow;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Opponent-assignment regularity in effect for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Round 4 repeats the round-1 opponent.
    Classic,
    /// Round 4 brings a new opponent; later rounds follow the key player.
    Alternate,
    Unknown,
}

impl Pattern {
    pub const fn as_str(self) -> &'static str {
        match self {
            Pattern::Classic => "classic",
            Pattern::Alternate => "alternate",
            Pattern::Unknown => "unknown",
        }
    }

    pub const fn is_known(self) -> bool {
        !matches!(self, Pattern::Unknown)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies the cycle once both its round-1 and round-4 results are known.
pub fn detect_pattern(window: &CycleWindow) -> Pattern {
    match (window.entry(1), window.entry(4)) {
        (Some(r1), Some(r4)) if r4.my_opponent == r1.my_opponent => Pattern::Classic,
        (Some(_), Some(_)) => Pattern::Alternate,
        _ => Pattern::Unknown,
    }
}
