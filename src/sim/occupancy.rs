//! Cells currently covered by the snake body

use std::collections::HashMap;

use super::grid::Cell;

/// Counted set of body cells.
///
/// A cell may be covered by more than one segment for a step (Ghost
/// pass-through, stacked tail growth), so membership is reference counted:
/// `contains` stays true until every segment on the cell has left.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    counts: HashMap<Cell, u32>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        let mut occupancy = Self::new();
        for &c in cells {
            occupancy.add(c);
        }
        occupancy
    }

    pub fn add(&mut self, c: Cell) {
        *self.counts.entry(c).or_insert(0) += 1;
    }

    /// Drop one segment from `c`. Absent cells are ignored.
    pub fn remove(&mut self, c: Cell) {
        if let Some(count) = self.counts.get_mut(&c) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&c);
            }
        }
    }

    pub fn contains(&self, c: Cell) -> bool {
        self.counts.contains_key(&c)
    }

    /// Number of distinct covered cells
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.counts.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_add_remove_contains() {
        let mut occ = Occupancy::new();
        let c = Cell::new(1, 2);
        assert!(!occ.contains(c));
        occ.add(c);
        assert!(occ.contains(c));
        occ.remove(c);
        assert!(!occ.contains(c));
        // Removing again is harmless
        occ.remove(c);
        assert!(occ.is_empty());
    }

    #[test]
    fn test_overlapping_segments_keep_cell_covered() {
        let mut occ = Occupancy::new();
        let c = Cell::new(0, 0);
        occ.add(c);
        occ.add(c);
        assert_eq!(occ.len(), 1);
        occ.remove(c);
        assert!(occ.contains(c));
        occ.remove(c);
        assert!(!occ.contains(c));
    }

    proptest! {
        #[test]
        fn prop_matches_distinct_cells(
            cells in prop::collection::vec((-4i32..4, -4i32..4), 0..40),
            drop in 0usize..40,
        ) {
            let cells: Vec<Cell> = cells.into_iter().map(|(x, y)| Cell::new(x, y)).collect();
            let mut occ = Occupancy::from_cells(&cells);
            let drop = drop.min(cells.len());
            for c in &cells[..drop] {
                occ.remove(*c);
            }
            let expected: HashSet<Cell> = cells[drop..].iter().copied().collect();
            prop_assert_eq!(occ.len(), expected.len());
            for c in &expected {
                prop_assert!(occ.contains(*c));
            }
        }
    }
}
