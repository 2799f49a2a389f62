use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use num_rational::BigRational;
use num_traits::{One, Zero};
use slotmap::SlotMap;
use tracing::debug;

use crate::error::KernelError;
use crate::math::exact::{ExactPlane, ExactPoint2, ExactPoint3};
use crate::math::polygon_2d::{
    bounds_2d, centroid_2d, clip_convex_2d, point_in_triangle_2d, signed_area_2d,
};

use super::classify::propagate_membership;
use super::polyhedron::ExactPolyhedron;
use super::set::PolyhedralSet;
use super::split::{
    is_degenerate, split_cell, split_polygon, CellFacet, ConvexCell, Fragment, PlaneTable,
};

slotmap::new_key_type! {
    /// Identifier of a volume cell in a [`Subdivision`].
    pub struct CellId;
}

slotmap::new_key_type! {
    /// Identifier of a planar facet separating two cells.
    pub struct FacetId;
}

/// An open convex region of space, or the unbounded region around the box.
#[derive(Debug, Clone)]
pub struct Cell {
    pub(super) inside: Vec<bool>,
}

impl Cell {
    /// Whether the cell lies inside shell `shell`.
    #[must_use]
    pub fn is_inside(&self, shell: usize) -> bool {
        self.inside.get(shell).copied().unwrap_or(false)
    }
}

/// A planar patch shared by exactly two cells.
#[derive(Debug, Clone)]
pub struct Facet {
    pub(super) cells: [CellId; 2],
    pub(super) covered_by: Vec<usize>,
}

impl Facet {
    /// The two cells on either side of the facet.
    #[must_use]
    pub fn cells(&self) -> [CellId; 2] {
        self.cells
    }

    /// Whether the facet lies on a face of shell `shell`.
    #[must_use]
    pub fn is_covered_by(&self, shell: usize) -> bool {
        self.covered_by.binary_search(&shell).is_ok()
    }
}

/// A partition of space into convex cells, induced by the faces of a set of
/// closed shells.
///
/// Every shell is a union of cells and facets of the subdivision, which makes
/// boolean operations between shells exact set operations on cell and facet
/// ids (see [`PolyhedralSet`]).
#[derive(Debug)]
pub struct Subdivision {
    pub(super) cells: SlotMap<CellId, Cell>,
    pub(super) facets: SlotMap<FacetId, Facet>,
    pub(super) unbounded: CellId,
    shell_count: usize,
}

/// One side of a leaf facet, projected onto its plane's coordinate frame.
struct FacetSide {
    cell: CellId,
    polygon: Vec<ExactPoint2>,
    bounds: (BigRational, BigRational, BigRational, BigRational),
}

/// Triangles of one shell lying on a plane, in that plane's projection.
type Coverage = HashMap<usize, Vec<(usize, [ExactPoint2; 3])>>;

impl Subdivision {
    /// Builds the subdivision induced by `shells`.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InconsistentClassification`] if a shell does not
    /// bound its volume consistently (for example when it is not closed), and
    /// [`KernelError::Subdivision`] if the partition cannot be completed.
    pub fn build(shells: &[ExactPolyhedron]) -> Result<Self, KernelError> {
        let mut cells = SlotMap::with_key();
        let unbounded = cells.insert(Cell {
            inside: vec![false; shells.len()],
        });
        let mut space = Self {
            cells,
            facets: SlotMap::with_key(),
            unbounded,
            shell_count: shells.len(),
        };

        let Some((min, max)) = exact_bounds(shells) else {
            return Ok(space);
        };

        let mut planes = PlaneTable::default();
        let root = bounding_cell(&mut planes, &min, &max);
        let box_planes = planes.len();

        let mut fragments = Vec::new();
        let mut coverage = Coverage::new();
        for (shell, polyhedron) in shells.iter().enumerate() {
            for [a, b, c] in polyhedron.triangles() {
                let Some(plane) = ExactPlane::through(a, b, c) else {
                    continue;
                };
                let id = planes.intern(&plane);
                let axis = planes.get(id).dominant_axis();
                coverage
                    .entry(id)
                    .or_default()
                    .push((shell, [a.project(axis), b.project(axis), c.project(axis)]));
                fragments.push(Fragment {
                    polygon: vec![a.clone(), b.clone(), c.clone()],
                    plane: id,
                });
            }
        }

        let leaves = partition(root, fragments, &planes)?;
        debug!(
            shells = shells.len(),
            planes = planes.len(),
            cells = leaves.len(),
            "space partitioned"
        );

        let mut by_plane: BTreeMap<usize, (Vec<FacetSide>, Vec<FacetSide>)> = BTreeMap::new();
        for leaf in leaves {
            let cell = space.cells.insert(Cell {
                inside: vec![false; shells.len()],
            });
            for CellFacet {
                plane,
                side,
                polygon,
            } in leaf.facets
            {
                if plane < box_planes {
                    space.facets.insert(Facet {
                        cells: [cell, unbounded],
                        covered_by: Vec::new(),
                    });
                    continue;
                }
                let axis = planes.get(plane).dominant_axis();
                let polygon: Vec<ExactPoint2> = polygon.iter().map(|p| p.project(axis)).collect();
                let Some(bounds) = bounds_2d(&polygon) else {
                    continue;
                };
                let entry = by_plane.entry(plane).or_default();
                let side_entry = FacetSide {
                    cell,
                    polygon,
                    bounds,
                };
                if side == Ordering::Greater {
                    entry.0.push(side_entry);
                } else {
                    entry.1.push(side_entry);
                }
            }
        }

        for (plane, (front, back)) in &by_plane {
            let triangles = coverage.get(plane).map(Vec::as_slice).unwrap_or_default();
            for f in front {
                for b in back {
                    if !bounds_overlap(&f.bounds, &b.bounds) {
                        continue;
                    }
                    let overlap = clip_convex_2d(&f.polygon, &b.polygon);
                    if signed_area_2d(&overlap).is_zero() {
                        continue;
                    }
                    let Some(sample) = centroid_2d(&overlap) else {
                        continue;
                    };
                    let mut covered_by: Vec<usize> = triangles
                        .iter()
                        .filter(|(_, tri)| point_in_triangle_2d(&sample, tri))
                        .map(|&(shell, _)| shell)
                        .collect();
                    covered_by.sort_unstable();
                    covered_by.dedup();
                    space.facets.insert(Facet {
                        cells: [f.cell, b.cell],
                        covered_by,
                    });
                }
            }
        }

        propagate_membership(&mut space)?;
        Ok(space)
    }

    /// Number of shells the subdivision was built from.
    #[must_use]
    pub fn shell_count(&self) -> usize {
        self.shell_count
    }

    /// Number of cells, the unbounded one included.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    /// The cell extending to infinity.
    #[must_use]
    pub fn unbounded(&self) -> CellId {
        self.unbounded
    }

    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    #[must_use]
    pub fn facet(&self, id: FacetId) -> Option<&Facet> {
        self.facets.get(id)
    }

    /// The closed region bounded by shell `shell`: the cells inside it and
    /// every facet touching one of them.
    #[must_use]
    pub fn shell_set(&self, shell: usize) -> PolyhedralSet<'_> {
        let cells = self
            .cells
            .iter()
            .filter(|(_, cell)| cell.is_inside(shell))
            .map(|(id, _)| id)
            .collect();
        PolyhedralSet::from_cells(self, cells).closure()
    }
}

/// Recursively splits `root` by the fragment planes until no fragment is left
/// inside a cell.
fn partition(
    root: ConvexCell,
    fragments: Vec<Fragment>,
    planes: &PlaneTable,
) -> Result<Vec<ConvexCell>, KernelError> {
    let mut leaves = Vec::new();
    let mut stack = vec![(root, fragments)];

    while let Some((cell, fragments)) = stack.pop() {
        let Some(plane_id) = fragments.first().map(|f| f.plane) else {
            leaves.push(cell);
            continue;
        };
        let plane = planes.get(plane_id);

        let mut front_fragments = Vec::new();
        let mut back_fragments = Vec::new();
        for fragment in fragments {
            if fragment.plane == plane_id {
                continue;
            }
            let (front, back) = split_polygon(&fragment.polygon, plane);
            if !is_degenerate(&front) {
                front_fragments.push(Fragment {
                    polygon: front,
                    plane: fragment.plane,
                });
            }
            if !is_degenerate(&back) {
                back_fragments.push(Fragment {
                    polygon: back,
                    plane: fragment.plane,
                });
            }
        }

        let (front, back) = split_cell(&cell, plane_id, plane)?;
        if let Some(front) = front {
            stack.push((front, front_fragments));
        }
        if let Some(back) = back {
            stack.push((back, back_fragments));
        }
    }
    Ok(leaves)
}

/// Exact bounds of every triangle vertex, enlarged by one unit on each side.
fn exact_bounds(shells: &[ExactPolyhedron]) -> Option<(ExactPoint3, ExactPoint3)> {
    let mut points = shells
        .iter()
        .flat_map(ExactPolyhedron::triangles)
        .flat_map(|tri| tri.iter());
    let first = points.next()?;
    let mut min = first.clone();
    let mut max = first.clone();
    for p in points {
        for (lo, hi, v) in [
            (&mut min.x, &mut max.x, &p.x),
            (&mut min.y, &mut max.y, &p.y),
            (&mut min.z, &mut max.z, &p.z),
        ] {
            if *v < *lo {
                lo.clone_from(v);
            }
            if *v > *hi {
                hi.clone_from(v);
            }
        }
    }

    let margin = BigRational::one();
    let min = ExactPoint3::new(&min.x - &margin, &min.y - &margin, &min.z - &margin);
    let max = ExactPoint3::new(&max.x + &margin, &max.y + &margin, &max.z + &margin);
    Some((min, max))
}

/// The box `[min, max]` as a convex cell. Its six planes are interned first.
fn bounding_cell(planes: &mut PlaneTable, min: &ExactPoint3, max: &ExactPoint3) -> ConvexCell {
    let mut facets = Vec::with_capacity(6);
    for axis in 0..3 {
        for (value, side) in [
            (min.coord(axis), Ordering::Greater),
            (max.coord(axis), Ordering::Less),
        ] {
            let plane = planes.intern(&ExactPlane::axis_aligned(axis, value));
            let b = (axis + 1) % 3;
            let c = (axis + 2) % 3;
            let corner = |pb: &ExactPoint3, pc: &ExactPoint3| {
                let mut coords = [min.x.clone(), min.y.clone(), min.z.clone()];
                coords[axis] = value.clone();
                coords[b] = pb.coord(b).clone();
                coords[c] = pc.coord(c).clone();
                let [x, y, z] = coords;
                ExactPoint3::new(x, y, z)
            };
            facets.push(CellFacet {
                plane,
                side,
                polygon: vec![
                    corner(min, min),
                    corner(max, min),
                    corner(max, max),
                    corner(min, max),
                ],
            });
        }
    }
    ConvexCell { facets }
}

fn bounds_overlap(
    a: &(BigRational, BigRational, BigRational, BigRational),
    b: &(BigRational, BigRational, BigRational, BigRational),
) -> bool {
    a.0 < b.2 && b.0 < a.2 && a.1 < b.3 && b.1 < a.3
}
