use std::{collections::BTreeMap, fmt};

use itertools::Itertools;

use crate::Partition;

/// How many pieces of each size a partition has.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SizeHistogram {
    counts: BTreeMap<usize, usize>,
}

impl SizeHistogram {
    pub fn of(partition: &Partition) -> SizeHistogram {
        let mut counts = BTreeMap::new();

        for piece in partition.pieces() {
            *counts.entry(piece.len()).or_insert(0) += 1;
        }

        SizeHistogram { counts }
    }

    /// The number of pieces of the given size.
    pub fn count(&self, size: usize) -> usize {
        self.counts.get(&size).copied().unwrap_or(0)
    }

    pub fn piece_count(&self) -> usize {
        self.counts.values().sum()
    }

    /// `(size, count)` pairs by ascending size.
    pub fn sizes(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.counts.iter().map(|(&size, &count)| (size, count))
    }
}

impl fmt::Display for SizeHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.counts.is_empty() {
            return write!(f, "no pieces");
        }

        write!(
            f,
            "{}",
            self.sizes()
                .map(|(size, count)| format!("{count} × {size}"))
                .join(", ")
        )
    }
}
