//! Piece detection from the structure of each individual move.
//!
//! Two rules are alternated until neither changes anything:
//!
//! 1. A piece that a move only partly touches is cut along the move's
//!    boundary.
//! 2. A cycle lying strictly inside a piece of at least three points is split
//!    off into its own piece. This catches gears: points that ride along with
//!    a larger carrier under most moves but also spin on their own.
//!
//! Only single moves are looked at, so pieces that only come apart under a
//! sequence of moves are reported as one. See [`crate::probe`] for that.

use std::time::Instant;

use log::{debug, info};
use twisty_core::{Move, PuzzleMoves};

use crate::{Partition, sets::MoveSets, start, success, working};

#[derive(Clone, Debug)]
pub struct LocalRefiner {
    sets: MoveSets,
}

impl LocalRefiner {
    pub fn new(puzzle: &PuzzleMoves) -> LocalRefiner {
        LocalRefiner {
            sets: MoveSets::new(puzzle.moves()),
        }
    }

    /// A refiner that only knows about one move.
    pub fn for_move(move_: &Move) -> LocalRefiner {
        LocalRefiner {
            sets: MoveSets::new([move_]),
        }
    }

    /// Apply both rules to `partition` until it stops changing. Returns
    /// whether anything was split.
    pub fn refine(&self, partition: &mut Partition) -> bool {
        let mut changed = false;
        let mut pass = 0;

        loop {
            pass += 1;

            let cut = self.split_move_sets(partition);
            let geared = self.split_gears(partition);

            debug!(
                working!("Pass {}: {} pieces (move sets {}, gears {})"),
                pass,
                partition.len(),
                if cut { "split" } else { "stable" },
                if geared { "split" } else { "stable" },
            );

            if !cut && !geared {
                break;
            }

            changed = true;
        }

        debug_assert!(partition.verify());

        changed
    }

    /// Rule 1
    fn split_move_sets(&self, partition: &mut Partition) -> bool {
        let mut changed = false;

        for move_set in self.sets.move_sets() {
            changed |= partition.split_by(move_set);
        }

        changed
    }

    /// Rule 2
    fn split_gears(&self, partition: &mut Partition) -> bool {
        let mut changed = false;

        for cycle_set in self.sets.cycle_sets() {
            let label = partition.label_of(cycle_set[0]);
            let piece_len = partition.piece_by_label(label).len();

            if piece_len < 3 || cycle_set.len() >= piece_len {
                continue;
            }

            if cycle_set
                .iter()
                .all(|&point| partition.label_of(point) == label)
            {
                partition.split_off(label, cycle_set.clone());
                changed = true;
            }
        }

        changed
    }
}

/// Detect pieces using only the structure of each individual move.
pub fn local_pieces(puzzle: &PuzzleMoves) -> Partition {
    info!(start!("Detecting pieces move by move"));
    let start = Instant::now();

    let mut partition = Partition::trivial(puzzle.point_count());
    LocalRefiner::new(puzzle).refine(&mut partition);

    info!(
        success!("Found {} pieces in {:.3}s: {}"),
        partition.len(),
        start.elapsed().as_secs_f64(),
        partition.size_histogram()
    );

    partition
}
