use std::collections::{BTreeSet, HashMap};

use super::assemble::{CellId, FacetId, Subdivision};
use super::select::BooleanOp;

/// A region of space made of cells and facets of one [`Subdivision`].
///
/// Marked cells are open 3D pieces; marked facets are 2D pieces. Sets built
/// over different subdivisions must not be combined.
#[derive(Debug, Clone)]
pub struct PolyhedralSet<'s> {
    space: &'s Subdivision,
    cells: BTreeSet<CellId>,
    facets: BTreeSet<FacetId>,
}

impl PartialEq for PolyhedralSet<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.space, other.space)
            && self.cells == other.cells
            && self.facets == other.facets
    }
}

impl Eq for PolyhedralSet<'_> {}

impl<'s> PolyhedralSet<'s> {
    /// The empty set.
    #[must_use]
    pub fn empty(space: &'s Subdivision) -> Self {
        Self {
            space,
            cells: BTreeSet::new(),
            facets: BTreeSet::new(),
        }
    }

    /// All of space.
    #[must_use]
    pub fn universe(space: &'s Subdivision) -> Self {
        Self {
            space,
            cells: space.cells.keys().collect(),
            facets: space.facets.keys().collect(),
        }
    }

    pub(super) fn from_cells(space: &'s Subdivision, cells: BTreeSet<CellId>) -> Self {
        Self {
            space,
            cells,
            facets: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn complement(&self) -> Self {
        let universe = Self::universe(self.space);
        universe.difference(self)
    }

    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.combine(other, BooleanOp::Intersect)
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.combine(other, BooleanOp::Union)
    }

    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.combine(other, BooleanOp::Subtract)
    }

    fn combine(&self, other: &Self, op: BooleanOp) -> Self {
        debug_assert!(std::ptr::eq(self.space, other.space));
        Self {
            space: self.space,
            cells: select(&self.cells, &other.cells, op),
            facets: select(&self.facets, &other.facets, op),
        }
    }

    /// The largest open subset: facets survive only between two marked cells.
    #[must_use]
    pub fn interior(&self) -> Self {
        let facets = self
            .facets
            .iter()
            .copied()
            .filter(|&id| {
                self.space
                    .facets
                    .get(id)
                    .is_some_and(|f| f.cells.iter().all(|c| self.cells.contains(c)))
            })
            .collect();
        Self {
            space: self.space,
            cells: self.cells.clone(),
            facets,
        }
    }

    /// Closure of the interior. Drops facets that bound no marked cell and
    /// adds every facet that does.
    #[must_use]
    pub fn regularization(&self) -> Self {
        Self::from_cells(self.space, self.cells.clone()).closure()
    }

    pub(super) fn closure(mut self) -> Self {
        for (id, facet) in &self.space.facets {
            if facet.cells.iter().any(|c| self.cells.contains(c)) {
                self.facets.insert(id);
            }
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.facets.is_empty()
    }

    /// Whether the set contains a 3D piece.
    #[must_use]
    pub fn has_volume(&self) -> bool {
        !self.cells.is_empty()
    }

    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.cells.is_subset(&other.cells) && self.facets.is_subset(&other.facets)
    }

    /// Number of connected volumes of space, the unbounded one included.
    ///
    /// Two cells belong to the same volume when they carry the same mark and
    /// the facet between them carries that mark too. An empty set therefore
    /// has one volume and a single closed box has two.
    #[must_use]
    pub fn number_of_volumes(&self) -> usize {
        let ids: Vec<CellId> = self.space.cells.keys().collect();
        let index: HashMap<CellId, usize> = ids.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        let mut components = DisjointSet::new(ids.len());

        for (facet_id, facet) in &self.space.facets {
            let [a, b] = facet.cells;
            let marked = self.cells.contains(&a);
            if self.cells.contains(&b) != marked || self.facets.contains(&facet_id) != marked {
                continue;
            }
            if let (Some(&i), Some(&j)) = (index.get(&a), index.get(&b)) {
                components.union(i, j);
            }
        }
        components.count()
    }

    #[must_use]
    pub fn cells(&self) -> &BTreeSet<CellId> {
        &self.cells
    }

    #[must_use]
    pub fn facets(&self) -> &BTreeSet<FacetId> {
        &self.facets
    }
}

fn select<T: Ord + Copy>(a: &BTreeSet<T>, b: &BTreeSet<T>, op: BooleanOp) -> BTreeSet<T> {
    a.union(b)
        .copied()
        .filter(|x| op.keeps(a.contains(x), b.contains(x)))
        .collect()
}

struct DisjointSet {
    parent: Vec<usize>,
    roots: usize,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            roots: n,
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
            self.roots -= 1;
        }
    }

    fn count(&self) -> usize {
        self.roots
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::fixtures::{exact_box, octahedron_shell, tetrahedron_shell};
    use crate::operations::boolean::{ExactPolyhedron, PolyhedralSet, Subdivision};

    fn space(boxes: &[([f64; 3], [f64; 3])]) -> Subdivision {
        let shells: Vec<ExactPolyhedron> = boxes.iter().map(|&(lo, hi)| exact_box(lo, hi)).collect();
        Subdivision::build(&shells).unwrap()
    }

    #[test]
    fn empty_set_has_one_volume() {
        let space = space(&[([0.0; 3], [1.0; 3])]);
        let empty = PolyhedralSet::empty(&space);
        assert!(empty.is_empty());
        assert_eq!(empty.number_of_volumes(), 1);
        assert_eq!(PolyhedralSet::universe(&space).number_of_volumes(), 1);
    }

    #[test]
    fn single_box_has_two_volumes() {
        let space = space(&[([0.0; 3], [1.0; 3])]);
        let cube = space.shell_set(0);
        assert!(cube.has_volume());
        assert_eq!(cube.number_of_volumes(), 2);
    }

    #[test]
    fn cavity_adds_a_volume() {
        let space = space(&[([0.0; 3], [4.0; 3]), ([1.0; 3], [2.0; 3])]);
        let outer = space.shell_set(0);
        let inner = space.shell_set(1);
        assert!(inner.is_subset(&outer));
        let hollow = outer.difference(&inner).regularization();
        assert_eq!(hollow.number_of_volumes(), 3);
    }

    #[test]
    fn two_cavities_add_two_volumes() {
        let space = space(&[
            ([0.0; 3], [6.0; 3]),
            ([1.0; 3], [2.0; 3]),
            ([3.0; 3], [4.0; 3]),
        ]);
        let hollow = space
            .shell_set(0)
            .difference(&space.shell_set(1))
            .regularization()
            .difference(&space.shell_set(2))
            .regularization();
        assert_eq!(hollow.number_of_volumes(), 4);
    }

    #[test]
    fn cavity_touching_the_boundary_opens_up() {
        let space = space(&[([0.0; 3], [4.0; 3]), ([0.0, 1.0, 1.0], [2.0, 2.0, 2.0])]);
        let hollow = space
            .shell_set(0)
            .difference(&space.shell_set(1))
            .regularization();
        assert_eq!(hollow.number_of_volumes(), 2);
    }

    #[test]
    fn complement_of_shell_misses_its_interior() {
        let space = space(&[([0.0; 3], [4.0; 3]), ([3.0; 3], [5.0; 3])]);
        let outer = space.shell_set(0);
        let inner = space.shell_set(1);
        assert!(!outer.complement().intersection(&inner).is_empty());
        assert!(outer.complement().intersection(&outer).is_empty());
        assert_eq!(outer.complement().complement(), outer);
    }

    #[test]
    fn face_adjacent_boxes_share_only_facets() {
        let space = space(&[([0.0; 3], [1.0; 3]), ([1.0, 0.0, 0.0], [2.0, 1.0, 1.0])]);
        let a = space.shell_set(0);
        let b = space.shell_set(1);
        let common = a.intersection(&b);
        assert!(!common.is_empty());
        assert!(!common.has_volume());
        assert!(a.interior().intersection(&b.interior()).is_empty());
        assert_eq!(a.union(&b).number_of_volumes(), 2);
    }

    #[test]
    fn slanted_shells_count_volumes() {
        let outer = ExactPolyhedron::from_shell(&octahedron_shell([0.0; 3], 6.0)).unwrap();
        let inner = ExactPolyhedron::from_shell(&tetrahedron_shell([0.5; 3], 1.5)).unwrap();
        let space = Subdivision::build(&[outer, inner]).unwrap();
        let outer = space.shell_set(0);
        let inner = space.shell_set(1);
        assert_eq!(outer.number_of_volumes(), 2);
        assert!(inner.is_subset(&outer));
        assert_eq!(outer.difference(&inner).regularization().number_of_volumes(), 3);
    }
}
