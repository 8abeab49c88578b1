use core::fmt;
use serde::{Deserialize, Serialize};

/// Stable identifier for a player within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// The local player is always registered first.
    pub const ME: PlayerId = PlayerId(1);

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_me(self) -> bool {
        self.0 == Self::ME.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn me() -> Self {
        Self::new(PlayerId::ME, "You")
    }
}

/// Players known to the session, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub const fn empty() -> Self {
        Self {
            players: Vec::new(),
        }
    }

    pub fn with_me() -> Self {
        Self {
            players: vec![Player::me()],
        }
    }

    /// "You" as id 1 followed by `names` as ids 2, 3, ...
    pub fn with_opponents<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roster = Self::with_me();
        for name in names {
            let id = roster.next_id();
            roster.players.push(Player::new(id, name.as_ref().trim()));
        }
        roster
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Case-insensitive lookup on the trimmed name.
    pub fn find_by_name(&self, name: &str) -> Option<&Player> {
        let needle = name.trim().to_lowercase();
        self.players
            .iter()
            .find(|p| p.name.to_lowercase() == needle)
    }

    /// Resolves `name` to an existing player or registers a new one.
    pub fn get_or_create(&mut self, name: &str) -> PlayerId {
        if let Some(existing) = self.find_by_name(name) {
            return existing.id;
        }
        let id = self.next_id();
        self.players.push(Player::new(id, name.trim()));
        id
    }

    /// Display label used by history views and exports.
    pub fn label(&self, id: PlayerId) -> String {
        self.get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("ID: {id}"))
    }

    pub fn position(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    fn next_id(&self) -> PlayerId {
        let max = self.players.iter().map(|p| p.id.0).max().unwrap_or(0);
        PlayerId(max + 1)
    }
}
