//! Card order generation.
//!
//! A game's deck is a shuffled sequence of card face values shared by both
//! players, generated once when the second player joins.

use rand::rng;
use rand::seq::SliceRandom;

/// Generate a random card order for a square grid of the given dimension.
///
/// For a grid dimension `d` accepted by [`is_valid_grid_size`] there are
/// `d * d / 2` pairs; the result has length `d * d` and contains every face
/// value in `1..=d * d / 2` exactly twice, uniformly shuffled.
pub fn generate(grid_size: u32) -> Vec<u32> {
    let num_pairs = (grid_size * grid_size) / 2;
    let mut cards: Vec<u32> = (1..=num_pairs).chain(1..=num_pairs).collect();
    cards.shuffle(&mut rng());
    cards
}

/// True if the dimension is acceptable for deck generation: even, so every
/// card has a partner, and within
/// [`MIN_GRID_SIZE`](crate::config::game::MIN_GRID_SIZE)..=
/// [`MAX_GRID_SIZE`](crate::config::game::MAX_GRID_SIZE). The upper bound
/// keeps `grid_size * grid_size` well inside `u32` range.
pub fn is_valid_grid_size(grid_size: u32) -> bool {
    (crate::config::game::MIN_GRID_SIZE..=crate::config::game::MAX_GRID_SIZE).contains(&grid_size)
        && grid_size % 2 == 0
}
