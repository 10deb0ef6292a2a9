use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::game::deck;
use crate::game::types::{GamePhase, Player};

/// Authoritative state of one memory-matching game.
///
/// Player order is join order and defines the turn cycle. The serialized form
/// of this struct is the session snapshot embedded in outbound events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub players: Vec<Player>,
    pub state: GamePhase,
    pub current_turn_player_id: Option<String>,
    pub grid_size: u32,
    pub card_order: Option<Vec<u32>>,
}

impl Game {
    /// Create a new game in `Waiting` state with a single player.
    pub fn new(id: Uuid, grid_size: u32, first_player: Player) -> Self {
        Self {
            id,
            players: vec![first_player],
            state: GamePhase::Waiting,
            current_turn_player_id: None,
            grid_size,
            card_order: None,
        }
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    /// Add the second player and start play: transition to `Playing`,
    /// generate the shared card order, and give the turn to the first joiner.
    ///
    /// The card order is generated exactly once; `Waiting` games never have
    /// one and the order is immutable afterwards.
    pub fn begin_play(&mut self, second_player: Player) {
        self.players.push(second_player);
        self.state = GamePhase::Playing;
        self.current_turn_player_id = self.players.first().map(|p| p.id.clone());
        self.card_order = Some(deck::generate(self.grid_size));
    }

    /// Advance the turn to the next player in join order, wrapping around.
    ///
    /// A single-player game wraps back to the same id. If the recorded turn
    /// holder is no longer a member (departed mid-game), the cycle restarts
    /// at the first remaining player. Returns the new holder, or `None` when
    /// there is no holder to advance from (game still waiting or empty).
    pub fn advance_turn(&mut self) -> Option<String> {
        let current = self.current_turn_player_id.as_deref()?;
        if self.players.is_empty() {
            return None;
        }
        let next_index = match self.players.iter().position(|p| p.id == current) {
            Some(index) => (index + 1) % self.players.len(),
            None => 0,
        };
        let next_id = self.players[next_index].id.clone();
        self.current_turn_player_id = Some(next_id.clone());
        Some(next_id)
    }

    /// Remove a player from the game. Returns true if the player was a member.
    pub fn remove_player(&mut self, player_id: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != player_id);
        self.players.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Mark the game as finished. Play cannot resume afterwards; a new join
    /// is required to start another game.
    pub fn finish(&mut self) {
        self.state = GamePhase::Finished;
    }
}
