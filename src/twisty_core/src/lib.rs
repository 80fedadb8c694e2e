#![warn(clippy::pedantic)]

//! Named moves of a twisty puzzle, given as disjoint cycles over sticker
//! indices, together with the permutation arithmetic needed to validate and
//! apply them.

mod moves;
mod permutation;

pub use moves::{Cycle, Move, MoveError, PuzzleMoves};
pub use permutation::Permutation;
