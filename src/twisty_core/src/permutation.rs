use std::cell::OnceCell;

use itertools::Itertools;

/// A bijection on `0..point_count`. Either view may be the one it was built
/// from; the other is derived on first use.
#[derive(Clone, Debug)]
pub struct Permutation {
    point_count: usize,
    // One of these two must be defined
    mapping: OnceCell<Vec<usize>>,
    cycles: OnceCell<Vec<Vec<usize>>>,
}

impl Permutation {
    pub fn identity(point_count: usize) -> Permutation {
        Permutation {
            point_count,
            // Map every value to itself
            mapping: OnceCell::from((0..point_count).collect::<Vec<_>>()),
            cycles: OnceCell::new(),
        }
    }

    /// The caller guarantees that the cycles are disjoint and in range.
    pub(crate) fn from_cycles(mut cycles: Vec<Vec<usize>>, point_count: usize) -> Permutation {
        cycles.retain(|cycle| cycle.len() > 1);

        Permutation {
            point_count,
            mapping: OnceCell::new(),
            cycles: OnceCell::from(cycles),
        }
    }

    pub(crate) fn from_mapping(mapping: Vec<usize>) -> Permutation {
        Permutation {
            point_count: mapping.len(),
            mapping: OnceCell::from(mapping),
            cycles: OnceCell::new(),
        }
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// `mapping()[p]` is the position the point at position `p` is sent to.
    #[allow(clippy::missing_panics_doc)]
    pub fn mapping(&self) -> &[usize] {
        self.mapping.get_or_init(|| {
            let cycles = self
                .cycles
                .get()
                .expect("either `mapping` or `cycles` to be defined");

            // Start with the identity permutation
            let mut mapping = (0..self.point_count).collect::<Vec<_>>();

            for cycle in cycles {
                for (start, end) in cycle.iter().cycle().tuple_windows().take(cycle.len()) {
                    mapping[*start] = *end;
                }
            }

            mapping
        })
    }

    /// The non-trivial cycles of the permutation.
    #[allow(clippy::missing_panics_doc)]
    pub fn cycles(&self) -> &[Vec<usize>] {
        self.cycles.get_or_init(|| {
            let mapping = self
                .mapping
                .get()
                .expect("either `mapping` or `cycles` to be defined");

            let mut covered = vec![false; self.point_count];
            let mut cycles = vec![];

            for i in 0..self.point_count {
                if covered[i] {
                    continue;
                }

                covered[i] = true;
                let mut cycle = vec![i];
                let mut next = mapping[i];

                while next != i {
                    covered[next] = true;
                    cycle.push(next);
                    next = mapping[next];
                }

                if cycle.len() > 1 {
                    cycles.push(cycle);
                }
            }

            cycles
        })
    }

    fn mapping_mut(&mut self) -> &mut Vec<usize> {
        self.mapping();

        self.mapping.get_mut().unwrap()
    }

    /// Apply `self` and then `other`.
    ///
    /// # Panics
    ///
    /// If the two permutations act on a different number of points.
    pub fn compose(&mut self, other: &Permutation) {
        assert_eq!(self.point_count, other.point_count);

        let other_mapping = other.mapping();
        let my_mapping = self.mapping_mut();

        for value in my_mapping.iter_mut() {
            *value = other_mapping[*value];
        }

        // Invalidate `cycles`
        self.cycles = OnceCell::new();
    }

    #[must_use]
    pub fn inverse(&self) -> Permutation {
        let mut inverse = vec![0; self.point_count];

        for (from, &to) in self.mapping().iter().enumerate() {
            inverse[to] = from;
        }

        Permutation::from_mapping(inverse)
    }

    pub fn is_identity(&self) -> bool {
        match self.cycles.get() {
            Some(cycles) => cycles.is_empty(),
            None => self
                .mapping()
                .iter()
                .enumerate()
                .all(|(from, &to)| from == to),
        }
    }

    /// Move the contents of `state` along the permutation: whatever sits at
    /// position `p` ends up at position `mapping()[p]`.
    ///
    /// # Panics
    ///
    /// If `state` does not have one slot per point.
    pub fn permute_in_place<T: Copy>(&self, state: &mut [T]) {
        assert_eq!(state.len(), self.point_count);

        for cycle in self.cycles() {
            let last = state[cycle[cycle.len() - 1]];

            for i in (1..cycle.len()).rev() {
                state[cycle[i]] = state[cycle[i - 1]];
            }

            state[cycle[0]] = last;
        }
    }
}

impl PartialEq for Permutation {
    fn eq(&self, other: &Self) -> bool {
        self.mapping() == other.mapping()
    }
}

impl Eq for Permutation {}
