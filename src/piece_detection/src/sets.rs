use fxhash::FxHashSet;
use itertools::Itertools;
use twisty_core::Move;

/// The point sets the move-local rules split along, deduplicated and in a
/// fixed order that doesn't depend on move names.
#[derive(Clone, Debug, Default)]
pub struct MoveSets {
    /// For each move, every point it touches.
    move_sets: Vec<Vec<usize>>,
    /// Every non-trivial cycle of every move, as a set.
    cycle_sets: Vec<Vec<usize>>,
}

impl MoveSets {
    pub fn new<'a>(moves: impl IntoIterator<Item = &'a Move>) -> MoveSets {
        let mut move_sets = FxHashSet::default();
        let mut cycle_sets = FxHashSet::default();

        for move_ in moves {
            let touched = move_.touched_points();

            if touched.is_empty() {
                continue;
            }

            move_sets.insert(touched);
            cycle_sets.extend(move_.cycle_sets());
        }

        MoveSets {
            move_sets: move_sets.into_iter().sorted_unstable().collect(),
            cycle_sets: cycle_sets.into_iter().sorted_unstable().collect(),
        }
    }

    pub fn move_sets(&self) -> &[Vec<usize>] {
        &self.move_sets
    }

    pub fn cycle_sets(&self) -> &[Vec<usize>] {
        &self.cycle_sets
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use twisty_core::PuzzleMoves;

    use super::MoveSets;

    #[test_log::test]
    fn deduplicates() {
        let puzzle = PuzzleMoves::new(
            &HashMap::from([
                ("A".to_owned(), vec![vec![0, 1, 2], vec![3, 4]]),
                ("A'".to_owned(), vec![vec![2, 1, 0], vec![4, 3]]),
                ("B".to_owned(), vec![vec![4, 5]]),
                ("I".to_owned(), vec![vec![6]]),
            ]),
            7,
        )
        .unwrap();

        let sets = MoveSets::new(puzzle.moves());

        assert_eq!(sets.move_sets(), &[vec![0, 1, 2, 3, 4], vec![4, 5]]);
        assert_eq!(
            sets.cycle_sets(),
            &[vec![0, 1, 2], vec![3, 4], vec![4, 5]]
        );
    }
}
