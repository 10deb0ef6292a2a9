use actix::prelude::*;
use serde::{Serialize, Deserialize};

use crate::config::game::DEFAULT_GRID_SIZE;
use crate::game::state::Game;

fn default_player_name() -> String {
    "Player".to_string()
}

fn default_grid_size() -> u32 {
    DEFAULT_GRID_SIZE
}

/// Actions a connected client can take. Every action except `Join` is scoped
/// to the player id the connection established with its `join`.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientRequest {
    Join {
        player_id: String,
        #[serde(default = "default_player_name")]
        player_name: String,
        #[serde(default = "default_grid_size")]
        grid_size: u32,
    },
    /// A card flip by the turn holder. Does not advance the turn; the client
    /// signals that separately with `next_turn` once its flips are done.
    Move {
        card_id: u32,
        flip_count: u32,
    },
    /// Client reports the two flipped cards matched.
    MatchFound {
        cards: Vec<u32>,
    },
    NextTurn,
    Leave,
}

/// Events the server pushes to clients. Several embed the full game snapshot
/// so clients never have to reconstruct state incrementally.
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent only to a joiner with no opponent yet.
    Waiting {
        game: Game,
    },
    GameStart {
        game: Game,
    },
    Move {
        player_id: String,
        card_id: u32,
        flip_count: u32,
    },
    MatchFound {
        player_id: String,
        cards: Vec<u32>,
        game: Game,
    },
    TurnChange {
        current_turn_player_id: String,
        game: Game,
    },
    PlayerLeft {
        player_id: String,
        game: Game,
    },
    /// Sent only to the offending player.
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn waiting(game: Game) -> Self {
        Self::Waiting { game }
    }
    pub fn game_start(game: Game) -> Self {
        Self::GameStart { game }
    }
    pub fn match_found(player_id: String, cards: Vec<u32>, game: Game) -> Self {
        Self::MatchFound { player_id, cards, game }
    }
    pub fn turn_change(current_turn_player_id: String, game: Game) -> Self {
        Self::TurnChange { current_turn_player_id, game }
    }
    pub fn player_left(player_id: String, game: Game) -> Self {
        Self::PlayerLeft { player_id, game }
    }
    pub fn error(message: &str) -> Self {
        Self::Error { message: message.to_string() }
    }
}
