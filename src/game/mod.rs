//! Pure game state for the memory-matching game.
//!
//! Everything in this module is plain serializable data: no actor addresses,
//! no transport types. The server layer owns the connection handles and drives
//! these types through the registry actor.

pub mod deck;
pub mod state;
pub mod types;
