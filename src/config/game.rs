/// Game configuration constants.
///
/// This module defines the main gameplay parameters such as the default grid
/// dimension and the number of players per game.
pub const DEFAULT_GRID_SIZE: u32 = 6; // Grid dimension used when a join request omits one.

/// Smallest grid dimension the card order generator accepts.
/// The dimension must also be even so every card has a matching pair.
pub const MIN_GRID_SIZE: u32 = 2;

/// Largest grid dimension a join request may ask for. Keeps decks at a
/// playable size and the card count far away from arithmetic overflow.
pub const MAX_GRID_SIZE: u32 = 16;
