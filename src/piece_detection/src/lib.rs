#![warn(clippy::pedantic)]

//! Detects the pieces of a twisty puzzle: the largest sets of points that
//! always move together, found from nothing but the moves as permutations.
//!
//! Two strategies are provided. [`detect_pieces_local`] looks at each move on
//! its own and is deterministic. [`detect_pieces_probed`] follows a seeded
//! random walk and also separates pieces that only come apart under
//! sequences of moves. Its result always refines the local one.

use std::collections::HashMap;

use fastrand::Rng;

pub mod local;
mod partition;
pub mod probe;
pub mod report;
pub mod sets;

pub use local::{LocalRefiner, local_pieces};
pub use partition::{Partition, PartitionError};
pub use probe::{ProbeConfig, ProbeOutcome, ProbeRefiner, probe_pieces, template_partition};
pub use report::SizeHistogram;
pub use twisty_core::{Cycle, Move, MoveError, Permutation, PuzzleMoves};

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}

/// Partition `0..point_count` into pieces using the move-local rules.
///
/// # Errors
///
/// If any move is malformed. Nothing is refined in that case.
pub fn detect_pieces_local(
    moves: &HashMap<String, Vec<Cycle>>,
    point_count: usize,
) -> Result<Partition, MoveError> {
    let puzzle = PuzzleMoves::new(moves, point_count)?;

    Ok(local_pieces(&puzzle))
}

/// Partition `0..point_count` into pieces with a random walk of at most
/// `max_moves` moves drawn from `rng`.
///
/// # Errors
///
/// If any move is malformed or `inverse_of` doesn't match the moves. Nothing
/// is refined in that case.
pub fn detect_pieces_probed(
    moves: &HashMap<String, Vec<Cycle>>,
    point_count: usize,
    inverse_of: Option<&HashMap<String, String>>,
    max_moves: usize,
    rng: &mut Rng,
) -> Result<Partition, MoveError> {
    let puzzle = PuzzleMoves::new(moves, point_count)?;
    let config = ProbeConfig::default().with_max_moves(max_moves);

    Ok(probe_pieces(&puzzle, inverse_of, config, rng)?.partition)
}
