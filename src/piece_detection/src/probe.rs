//! Piece detection by random walks.
//!
//! Starting from the pieces each move forces on its own, random moves are
//! applied to a scrambled state. Whenever the points sitting in the home
//! positions of some piece don't form a piece themselves, the partition is
//! intersected with the partition those images form.
//!
//! This is a Monte-Carlo method. Points that only come apart under an
//! astronomically rare sequence of moves may be reported as one piece. The
//! walk itself never separates two points unless some observed state
//! separated them, though the template it starts from already keeps the
//! cycles of every move apart. Under-splitting is the accepted cost of the
//! method and is not reported as an error.

use std::{collections::HashMap, time::Instant};

use fastrand::Rng;
use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;
use log::{debug, info, trace};
use twisty_core::{Move, MoveError, PuzzleMoves};

use crate::{LocalRefiner, Partition, start, success, working};

/// When the random walk stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeConfig {
    /// The most random moves to apply.
    pub max_moves: usize,
    /// Stop early after this many consecutive moves without a split.
    pub stall_limit: Option<usize>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            max_moves: 10_000,
            stall_limit: None,
        }
    }
}

impl ProbeConfig {
    #[must_use]
    pub fn with_max_moves(mut self, max_moves: usize) -> Self {
        self.max_moves = max_moves;
        self
    }

    #[must_use]
    pub fn with_stall_limit(mut self, stall_limit: usize) -> Self {
        self.stall_limit = Some(stall_limit);
        self
    }
}

#[derive(Clone, Debug)]
pub struct ProbeOutcome {
    pub partition: Partition,
    /// The number of pieces before the walk started.
    pub template_pieces: usize,
    pub moves_applied: usize,
    /// States that were inspected, not counting repeats.
    pub distinct_states: usize,
    /// How many inspected states split at least one piece.
    pub refinements: usize,
}

/// Intersect the partitions that each move forces when looked at alone.
pub fn template_partition(puzzle: &PuzzleMoves) -> Partition {
    let point_count = puzzle.point_count();
    let mut template = Partition::trivial(point_count);

    for move_ in puzzle.moves() {
        let mut forced = Partition::trivial(point_count);
        LocalRefiner::for_move(move_).refine(&mut forced);

        trace!(
            "`{}` with cycle type {:?} forces {}",
            move_.name(),
            move_.cycle_signature(),
            forced
        );

        template.intersect(&forced);
    }

    template
}

pub struct ProbeRefiner<'a> {
    puzzle: &'a PuzzleMoves,
    generators: Vec<&'a Move>,
    config: ProbeConfig,
}

impl<'a> ProbeRefiner<'a> {
    /// Moves paired with an earlier move in `inverse_of` are left out of the
    /// walk, since they only undo what the earlier move does. Pairs count in
    /// either direction.
    ///
    /// # Errors
    ///
    /// If `inverse_of` names a move that doesn't exist or pairs two moves
    /// that aren't inverses.
    pub fn new(
        puzzle: &'a PuzzleMoves,
        inverse_of: Option<&HashMap<String, String>>,
        config: ProbeConfig,
    ) -> Result<ProbeRefiner<'a>, MoveError> {
        let mut partners: FxHashMap<&str, Vec<&str>> = FxHashMap::default();

        if let Some(inverse_of) = inverse_of {
            puzzle.check_inverses(inverse_of)?;

            for (name, inverse) in inverse_of {
                if name != inverse {
                    partners.entry(name.as_str()).or_default().push(inverse.as_str());
                    partners.entry(inverse.as_str()).or_default().push(name.as_str());
                }
            }
        }

        let mut generators: Vec<&Move> = vec![];

        for move_ in puzzle.moves() {
            let redundant = partners.get(move_.name()).is_some_and(|partners| {
                generators
                    .iter()
                    .any(|generator| partners.contains(&generator.name()))
            });

            if redundant {
                trace!("Leaving `{}` out of the walk", move_.name());
                continue;
            }

            generators.push(move_);
        }

        Ok(ProbeRefiner {
            puzzle,
            generators,
            config,
        })
    }

    /// The names of the moves the walk draws from.
    pub fn generators(&self) -> impl Iterator<Item = &str> {
        self.generators.iter().map(|generator| generator.name())
    }

    pub fn run(&self, rng: &mut Rng) -> ProbeOutcome {
        info!(
            start!("Probing for pieces with up to {} random moves"),
            self.config.max_moves
        );
        let start = Instant::now();

        let point_count = self.puzzle.point_count();
        let mut partition = template_partition(self.puzzle);
        let template_pieces = partition.len();

        debug!(
            working!("Template has {} pieces: {}"),
            template_pieces,
            partition.size_histogram()
        );

        // `state[position]` is the point currently at `position`
        let mut state = (0..point_count).collect::<Vec<_>>();
        let mut seen_states = FxHashSet::default();
        seen_states.insert(state.clone());
        let mut image_labels = vec![0; point_count];

        let mut moves_applied = 0;
        let mut distinct_states = 1;
        let mut refinements = 0;
        let mut since_refinement = 0;

        while moves_applied < self.config.max_moves
            && !self.generators.is_empty()
            && !partition.is_discrete()
        {
            if self
                .config
                .stall_limit
                .is_some_and(|stall_limit| since_refinement >= stall_limit)
            {
                debug!(
                    working!("No split in the last {} moves, stopping"),
                    since_refinement
                );
                break;
            }

            let generator = self.generators[rng.usize(..self.generators.len())];
            generator.permutation().permute_in_place(&mut state);
            moves_applied += 1;
            since_refinement += 1;

            if seen_states.contains(&state) {
                continue;
            }
            seen_states.insert(state.clone());
            distinct_states += 1;

            // Label each point by the piece whose home it now occupies
            for (label, piece) in partition.labelled_pieces() {
                for &position in piece {
                    image_labels[state[position]] = label;
                }
            }

            if partition.intersect_labels(&image_labels) {
                refinements += 1;
                since_refinement = 0;

                debug!(
                    working!("Move {}: split into {} pieces"),
                    moves_applied,
                    partition.len()
                );

                // Old states may split the finer partition further
                seen_states.clear();
                seen_states.insert(state.clone());
            }
        }

        info!(
            success!("Found {} pieces in {:.3}s after {} moves ({} distinct states): {}"),
            partition.len(),
            start.elapsed().as_secs_f64(),
            moves_applied,
            distinct_states,
            partition.size_histogram()
        );

        ProbeOutcome {
            partition,
            template_pieces,
            moves_applied,
            distinct_states,
            refinements,
        }
    }
}

/// Detect pieces with a random walk of at most `config.max_moves` moves.
///
/// # Errors
///
/// If `inverse_of` is given and is inconsistent with the moves. See
/// [`ProbeRefiner::new`].
pub fn probe_pieces(
    puzzle: &PuzzleMoves,
    inverse_of: Option<&HashMap<String, String>>,
    config: ProbeConfig,
    rng: &mut Rng,
) -> Result<ProbeOutcome, MoveError> {
    let refiner = ProbeRefiner::new(puzzle, inverse_of, config)?;

    debug!(
        "Walking over {}",
        refiner.generators().map(|name| format!("`{name}`")).join(", ")
    );

    Ok(refiner.run(rng))
}
