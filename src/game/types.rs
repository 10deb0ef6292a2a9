use serde::{Serialize, Deserialize};

/// Lifecycle state of a game.
///
/// A game is created `Waiting` with a single player, becomes `Playing` when a
/// second player is matched into it, and becomes `Finished` when a player
/// leaves mid-game. `Finished` games are kept until their last player leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Waiting,
    Playing,
    Finished,
}

/// A player inside a game: identity, display name, and score.
///
/// The outbound connection handle is deliberately not stored here; the
/// registry keeps it in a separate map so this type stays pure data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub score: u32,
}

impl Player {
    pub fn new(id: String, name: String) -> Self {
        Self { id, name, score: 0 }
    }
}
