use std::{collections::BTreeSet, fmt};

use itertools::Itertools;
use log::trace;
use thiserror::Error;

use crate::report::SizeHistogram;

/// A partition of the points `0..point_count` into pieces.
///
/// Pieces are never empty, are pairwise disjoint and together cover every
/// point. Each piece is stored ascending. Pieces are only ever split, so a
/// piece keeps its index for the lifetime of the partition.
#[derive(Clone, Debug)]
pub struct Partition {
    pieces: Vec<Vec<usize>>,
    // The index into `pieces` of the piece containing each point
    piece_of: Vec<usize>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartitionError {
    #[error("Point {point} is out of range, expected a value between 0 and {point_count} (exclusive)")]
    PointOutOfRange { point: usize, point_count: usize },
    #[error("Point {0} belongs to more than one piece")]
    Overlap(usize),
    #[error("Point {0} doesn't belong to any piece")]
    Uncovered(usize),
    #[error("Pieces must not be empty")]
    EmptyPiece,
}

impl Partition {
    /// The partition with every point in one piece. There are no pieces at
    /// all when `point_count` is zero.
    pub fn trivial(point_count: usize) -> Partition {
        let pieces = if point_count == 0 {
            vec![]
        } else {
            vec![(0..point_count).collect()]
        };

        Partition {
            pieces,
            piece_of: vec![0; point_count],
        }
    }

    /// The partition with every point in its own piece.
    pub fn discrete(point_count: usize) -> Partition {
        Partition {
            pieces: (0..point_count).map(|point| vec![point]).collect(),
            piece_of: (0..point_count).collect(),
        }
    }

    /// Build a partition from explicit pieces.
    ///
    /// # Errors
    ///
    /// If the pieces are not a partition of `0..point_count`. See
    /// `PartitionError`.
    pub fn from_pieces(
        pieces: Vec<Vec<usize>>,
        point_count: usize,
    ) -> Result<Partition, PartitionError> {
        let mut piece_of = vec![usize::MAX; point_count];

        for (idx, piece) in pieces.iter().enumerate() {
            if piece.is_empty() {
                return Err(PartitionError::EmptyPiece);
            }

            for &point in piece {
                if point >= point_count {
                    return Err(PartitionError::PointOutOfRange { point, point_count });
                }

                if piece_of[point] != usize::MAX {
                    return Err(PartitionError::Overlap(point));
                }

                piece_of[point] = idx;
            }
        }

        if let Some(point) = piece_of.iter().position(|&idx| idx == usize::MAX) {
            return Err(PartitionError::Uncovered(point));
        }

        let pieces = pieces
            .into_iter()
            .map(|piece| piece.into_iter().sorted_unstable().collect())
            .collect();

        Ok(Partition { pieces, piece_of })
    }

    pub fn point_count(&self) -> usize {
        self.piece_of.len()
    }

    /// The number of pieces.
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Whether every point is its own piece, in which case nothing can be
    /// split any further.
    pub fn is_discrete(&self) -> bool {
        self.pieces.len() == self.piece_of.len()
    }

    /// The pieces ordered by their smallest point.
    pub fn pieces(&self) -> impl Iterator<Item = &[usize]> {
        self.pieces
            .iter()
            .map(Vec::as_slice)
            .sorted_unstable_by_key(|piece| piece[0])
    }

    /// The piece containing `point`.
    ///
    /// # Panics
    ///
    /// If `point` is out of range.
    pub fn piece_containing(&self, point: usize) -> &[usize] {
        &self.pieces[self.piece_of[point]]
    }

    pub fn same_piece(&self, a: usize, b: usize) -> bool {
        self.piece_of[a] == self.piece_of[b]
    }

    /// The stable index of the piece containing `point`.
    pub(crate) fn label_of(&self, point: usize) -> usize {
        self.piece_of[point]
    }

    pub(crate) fn piece_by_label(&self, label: usize) -> &[usize] {
        &self.pieces[label]
    }

    /// Every piece with its stable index, in index order.
    pub(crate) fn labelled_pieces(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.pieces.iter().map(Vec::as_slice).enumerate()
    }

    /// Whether the given distinct points make up exactly one piece.
    pub fn is_piece(&self, points: &[usize]) -> bool {
        let Some(&first) = points.first() else {
            return false;
        };
        let label = self.piece_of[first];

        self.pieces[label].len() == points.len()
            && points.iter().all(|&point| self.piece_of[point] == label)
    }

    /// Whether every piece of `self` lies inside a single piece of `other`.
    pub fn refines(&self, other: &Partition) -> bool {
        self.point_count() == other.point_count()
            && self.pieces.iter().all(|piece| {
                let label = other.piece_of[piece[0]];
                piece.iter().all(|&point| other.piece_of[point] == label)
            })
    }

    pub fn size_histogram(&self) -> SizeHistogram {
        SizeHistogram::of(self)
    }

    /// The pieces as sets, ordered by their smallest point.
    pub fn into_sets(self) -> Vec<BTreeSet<usize>> {
        self.pieces
            .into_iter()
            .sorted_unstable_by_key(|piece| piece[0])
            .map(BTreeSet::from_iter)
            .collect()
    }

    /// Split every piece `P` that `points` cuts into `P \ points` and
    /// `P ∩ points`. Returns whether anything changed.
    ///
    /// `points` must be distinct.
    pub fn split_by(&mut self, points: &[usize]) -> bool {
        let cuts = points
            .iter()
            .copied()
            .sorted_unstable_by_key(|&point| (self.piece_of[point], point))
            .chunk_by(|&point| self.piece_of[point])
            .into_iter()
            .map(|(label, inside)| (label, inside.collect::<Vec<_>>()))
            .filter(|(label, inside)| inside.len() < self.pieces[*label].len())
            .collect::<Vec<_>>();

        let changed = !cuts.is_empty();

        for (label, inside) in cuts {
            self.split_off(label, inside);
        }

        changed
    }

    /// Move `subset` out of piece `label` into a new piece. `subset` must be
    /// ascending, non-empty and strictly contained in the piece.
    pub(crate) fn split_off(&mut self, label: usize, subset: Vec<usize>) {
        debug_assert!(!subset.is_empty() && subset.len() < self.pieces[label].len());

        let new_label = self.pieces.len();

        self.pieces[label].retain(|point| subset.binary_search(point).is_err());

        for &point in &subset {
            debug_assert_eq!(self.piece_of[point], label);
            self.piece_of[point] = new_label;
        }

        trace!(
            "Split {:?} off of {:?}",
            subset,
            self.pieces[label].as_slice()
        );

        self.pieces.push(subset);
    }

    /// Replace each piece `P` by the non-empty intersections `P ∩ Q` over
    /// the pieces `Q` of `other`. Returns whether anything changed.
    ///
    /// # Panics
    ///
    /// If the partitions are over a different number of points.
    pub fn intersect(&mut self, other: &Partition) -> bool {
        assert_eq!(self.point_count(), other.point_count());

        self.intersect_labels(&other.piece_of)
    }

    /// Like [`Partition::intersect`], with the other partition given as the
    /// label of each point. Points with equal labels share a piece.
    pub(crate) fn intersect_labels(&mut self, labels: &[usize]) -> bool {
        debug_assert_eq!(labels.len(), self.point_count());

        let mut changed = false;

        // Pieces pushed during the loop are already uniform in `labels`
        for label in 0..self.pieces.len() {
            let piece = &self.pieces[label];
            let first = labels[piece[0]];

            if piece.iter().all(|&point| labels[point] == first) {
                continue;
            }

            let mut groups = piece
                .iter()
                .copied()
                .sorted_by_key(|&point| labels[point])
                .chunk_by(|&point| labels[point])
                .into_iter()
                .map(|(_, group)| group.collect::<Vec<_>>())
                .collect::<Vec<_>>()
                .into_iter();

            // The group that stays keeps the label
            let Some(stays) = groups.next() else {
                continue;
            };
            self.pieces[label] = stays;

            for group in groups {
                let new_label = self.pieces.len();

                for &point in &group {
                    self.piece_of[point] = new_label;
                }

                self.pieces.push(group);
            }

            changed = true;
        }

        debug_assert!(self.verify());

        changed
    }

    /// Check the partition invariants.
    pub fn verify(&self) -> bool {
        let mut covered = vec![false; self.point_count()];

        for (label, piece) in self.pieces.iter().enumerate() {
            if piece.is_empty() || !piece.iter().tuple_windows().all(|(a, b)| a < b) {
                return false;
            }

            for &point in piece {
                if point >= covered.len() || covered[point] || self.piece_of[point] != label {
                    return false;
                }

                covered[point] = true;
            }
        }

        covered.into_iter().all(|covered| covered)
    }
}

impl PartialEq for Partition {
    fn eq(&self, other: &Self) -> bool {
        self.point_count() == other.point_count()
            && self.len() == other.len()
            && self.pieces.iter().all(|piece| other.is_piece(piece))
    }
}

impl Eq for Partition {}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.pieces()
                .map(|piece| format!("{{{}}}", piece.iter().join(", ")))
                .join(" ")
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{Partition, PartitionError};

    #[test_log::test]
    fn trivial_and_discrete() {
        let trivial = Partition::trivial(5);
        assert_eq!(trivial.len(), 1);
        assert!(trivial.verify());
        assert_eq!(trivial.pieces().next().unwrap(), &[0, 1, 2, 3, 4]);

        let discrete = Partition::discrete(5);
        assert!(discrete.is_discrete());
        assert!(discrete.refines(&trivial));
        assert!(!trivial.refines(&discrete));

        let empty = Partition::trivial(0);
        assert!(empty.is_empty());
        assert!(empty.verify());
    }

    #[test_log::test]
    fn from_pieces_validates() {
        assert_eq!(
            Partition::from_pieces(vec![vec![0, 1], vec![1, 2]], 3).unwrap_err(),
            PartitionError::Overlap(1)
        );
        assert_eq!(
            Partition::from_pieces(vec![vec![0, 1]], 3).unwrap_err(),
            PartitionError::Uncovered(2)
        );
        assert_eq!(
            Partition::from_pieces(vec![vec![0, 3], vec![1, 2]], 3).unwrap_err(),
            PartitionError::PointOutOfRange {
                point: 3,
                point_count: 3
            }
        );
        assert_eq!(
            Partition::from_pieces(vec![vec![0, 1, 2], vec![]], 3).unwrap_err(),
            PartitionError::EmptyPiece
        );

        let partition = Partition::from_pieces(vec![vec![2, 0], vec![1]], 3).unwrap();
        assert!(partition.verify());
        assert_eq!(partition.piece_containing(2), &[0, 2]);
    }

    #[test_log::test]
    fn split_by() {
        let mut partition = Partition::trivial(8);

        assert!(partition.split_by(&[5, 1, 2]));
        assert_eq!(
            partition,
            Partition::from_pieces(vec![vec![0, 3, 4, 6, 7], vec![1, 2, 5]], 8).unwrap()
        );

        assert!(partition.split_by(&[0, 1]));
        assert_eq!(
            partition,
            Partition::from_pieces(vec![vec![3, 4, 6, 7], vec![0], vec![2, 5], vec![1]], 8)
                .unwrap()
        );

        // Already a union of pieces
        assert!(!partition.split_by(&[0, 1, 2, 5]));
        assert!(partition.verify());
    }

    #[test_log::test]
    fn intersect() {
        let mut a = Partition::from_pieces(vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]], 8).unwrap();
        let b = Partition::from_pieces(vec![vec![0, 1, 4, 5], vec![2, 3, 6, 7]], 8).unwrap();

        assert!(a.intersect(&b));
        assert_eq!(
            a,
            Partition::from_pieces(vec![vec![0, 1], vec![2, 3], vec![4, 5], vec![6, 7]], 8)
                .unwrap()
        );
        assert!(a.refines(&b));
    }

    #[test_log::test]
    fn intersect_with_self_is_idempotent() {
        let original =
            Partition::from_pieces(vec![vec![0, 4], vec![1, 2, 3], vec![5]], 6).unwrap();
        let mut partition = original.clone();

        assert!(!partition.intersect(&original));
        assert_eq!(partition, original);

        let mut trivial = Partition::trivial(6);
        assert!(trivial.intersect(&original));
        assert_eq!(trivial, original);
    }

    #[test_log::test]
    fn equality_ignores_piece_order() {
        let a = Partition::from_pieces(vec![vec![0, 1], vec![2]], 3).unwrap();
        let b = Partition::from_pieces(vec![vec![2], vec![1, 0]], 3).unwrap();
        let c = Partition::from_pieces(vec![vec![0], vec![1, 2]], 3).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "{0, 1} {2}");
        assert_eq!(
            b.into_sets(),
            vec![BTreeSet::from([0, 1]), BTreeSet::from([2])]
        );
    }

    #[test_log::test]
    fn is_piece() {
        let partition = Partition::from_pieces(vec![vec![0, 1], vec![2, 3, 4]], 5).unwrap();

        assert!(partition.is_piece(&[1, 0]));
        assert!(partition.is_piece(&[4, 2, 3]));
        assert!(!partition.is_piece(&[2, 3]));
        assert!(!partition.is_piece(&[1, 2]));
        assert!(!partition.is_piece(&[]));
        assert!(partition.same_piece(2, 4));
        assert!(!partition.same_piece(1, 2));
    }
}
