use std::collections::HashMap;

use fxhash::FxHashMap;
use itertools::Itertools;
use log::debug;
use thiserror::Error;

use crate::Permutation;

/// One orbit of a move, as an ordered list of point indices. The point at
/// `cycle[i]` is sent to `cycle[i + 1]`, and the last one wraps to the first.
pub type Cycle = Vec<usize>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error(
        "Move `{move_name}` references point {point}, expected a value between 0 and {point_count} (exclusive)"
    )]
    PointOutOfRange {
        move_name: String,
        point: usize,
        point_count: usize,
    },
    #[error("Move `{move_name}` contains an empty cycle")]
    EmptyCycle { move_name: String },
    #[error("Move `{move_name}` is not a permutation: point {point} appears more than once")]
    RepeatedPoint { move_name: String, point: usize },
    #[error("The move `{name}` doesn't exist")]
    UnknownMove { name: String },
    #[error("The move `{inverse}` is declared as the inverse of `{move_name}` but isn't")]
    NotAnInverse { move_name: String, inverse: String },
}

/// A validated, named move.
#[derive(Clone, Debug)]
pub struct Move {
    name: String,
    permutation: Permutation,
}

impl Move {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// The cycles of the move that actually move something.
    pub fn cycles(&self) -> &[Cycle] {
        self.permutation.cycles()
    }

    /// Every point touched by at least one cycle of the move, ascending.
    pub fn touched_points(&self) -> Vec<usize> {
        self.cycles().iter().flatten().copied().sorted_unstable().collect()
    }

    /// The cycles of the move viewed as unordered sets, each ascending.
    pub fn cycle_sets(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        self.cycles()
            .iter()
            .map(|cycle| cycle.iter().copied().sorted_unstable().collect())
    }

    /// The multiset of cycle lengths, ascending. Fixed points are left out.
    pub fn cycle_signature(&self) -> Vec<usize> {
        self.cycles().iter().map(Vec::len).sorted_unstable().collect()
    }
}

/// The moves of one puzzle, validated against its point count.
///
/// Moves are kept sorted by name so that everything derived from them is
/// independent of the order the caller supplied them in.
#[derive(Clone, Debug)]
pub struct PuzzleMoves {
    point_count: usize,
    moves: Vec<Move>,
}

impl PuzzleMoves {
    /// Validate every move against `point_count`.
    ///
    /// # Errors
    ///
    /// If any cycle is empty, references a point outside `0..point_count`,
    /// or shares a point with another cycle of the same move. See
    /// `MoveError`.
    pub fn new(
        moves: &HashMap<String, Vec<Cycle>>,
        point_count: usize,
    ) -> Result<PuzzleMoves, MoveError> {
        Self::from_named(
            moves.iter().map(|(name, cycles)| (name.clone(), cycles.clone())),
            point_count,
        )
    }

    /// Build from a plain list of moves, naming them `m0`, `m1`, ...
    ///
    /// # Errors
    ///
    /// See [`PuzzleMoves::new`].
    pub fn from_unnamed(
        moves: Vec<Vec<Cycle>>,
        point_count: usize,
    ) -> Result<PuzzleMoves, MoveError> {
        Self::from_named(
            moves
                .into_iter()
                .enumerate()
                .map(|(i, cycles)| (format!("m{i}"), cycles)),
            point_count,
        )
    }

    fn from_named(
        moves: impl Iterator<Item = (String, Vec<Cycle>)>,
        point_count: usize,
    ) -> Result<PuzzleMoves, MoveError> {
        let mut validated = vec![];

        for (name, cycles) in moves {
            validate_cycles(&name, &cycles, point_count)?;

            validated.push(Move {
                permutation: Permutation::from_cycles(cycles, point_count),
                name,
            });
        }

        validated.sort_unstable_by(|a, b| a.name.cmp(&b.name));

        debug!(
            "Validated {} moves over {point_count} points",
            validated.len()
        );

        Ok(PuzzleMoves {
            point_count,
            moves: validated,
        })
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn find_move(&self, name: &str) -> Option<&Move> {
        self.moves
            .binary_search_by(|move_| move_.name.as_str().cmp(name))
            .ok()
            .map(|idx| &self.moves[idx])
    }

    /// Check a caller-declared inverse map.
    ///
    /// # Errors
    ///
    /// If a name in the map is not a move of this puzzle, or a declared pair
    /// does not compose to the identity.
    pub fn check_inverses(&self, inverse_of: &HashMap<String, String>) -> Result<(), MoveError> {
        for (name, inverse_name) in inverse_of {
            let move_ = self.find_move(name).ok_or_else(|| MoveError::UnknownMove {
                name: name.clone(),
            })?;
            let inverse = self
                .find_move(inverse_name)
                .ok_or_else(|| MoveError::UnknownMove {
                    name: inverse_name.clone(),
                })?;

            let mut composed = move_.permutation.clone();
            composed.compose(&inverse.permutation);

            if !composed.is_identity() {
                return Err(MoveError::NotAnInverse {
                    move_name: name.clone(),
                    inverse: inverse_name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Find, for every move whose inverse is also a move of the puzzle, the
    /// name of that inverse. Moves of order two map to themselves.
    pub fn derive_inverses(&self) -> HashMap<String, String> {
        // An inverse always has the same cycle structure
        let mut by_signature: FxHashMap<Vec<usize>, Vec<&Move>> = FxHashMap::default();

        for move_ in &self.moves {
            by_signature
                .entry(move_.cycle_signature())
                .or_default()
                .push(move_);
        }

        let mut inverse_of = HashMap::new();

        for move_ in &self.moves {
            let inverse = move_.permutation.inverse();

            let found = by_signature[&move_.cycle_signature()]
                .iter()
                .find(|candidate| candidate.permutation == inverse);

            if let Some(found) = found {
                inverse_of.insert(move_.name.clone(), found.name.clone());
            }
        }

        inverse_of
    }
}

fn validate_cycles(name: &str, cycles: &[Cycle], point_count: usize) -> Result<(), MoveError> {
    let mut seen = vec![false; point_count];

    for cycle in cycles {
        if cycle.is_empty() {
            return Err(MoveError::EmptyCycle {
                move_name: name.to_owned(),
            });
        }

        for &point in cycle {
            if point >= point_count {
                return Err(MoveError::PointOutOfRange {
                    move_name: name.to_owned(),
                    point,
                    point_count,
                });
            }

            if seen[point] {
                return Err(MoveError::RepeatedPoint {
                    move_name: name.to_owned(),
                    point,
                });
            }

            seen[point] = true;
        }
    }

    Ok(())
}
