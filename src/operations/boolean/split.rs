use std::cmp::Ordering;
use std::collections::HashMap;

use num_traits::{Signed, Zero};

use crate::error::KernelError;
use crate::math::exact::{orient_2d, ExactPlane, ExactPoint2, ExactPoint3};
use crate::math::polygon_2d::centroid_2d;

/// Interned canonical planes, addressed by index.
#[derive(Debug, Default)]
pub(super) struct PlaneTable {
    planes: Vec<ExactPlane>,
    index: HashMap<ExactPlane, usize>,
}

impl PlaneTable {
    /// Returns the id of the canonical form of `plane`, inserting it if new.
    pub(super) fn intern(&mut self, plane: &ExactPlane) -> usize {
        let (canonical, _) = plane.canonical();
        if let Some(&id) = self.index.get(&canonical) {
            return id;
        }
        let id = self.planes.len();
        self.planes.push(canonical.clone());
        self.index.insert(canonical, id);
        id
    }

    pub(super) fn get(&self, id: usize) -> &ExactPlane {
        &self.planes[id]
    }

    pub(super) fn len(&self) -> usize {
        self.planes.len()
    }
}

/// A convex planar polygon lying on one of the table's planes.
#[derive(Debug, Clone)]
pub(super) struct Fragment {
    pub polygon: Vec<ExactPoint3>,
    pub plane: usize,
}

/// A boundary polygon of a convex cell.
///
/// `side` tells on which side of the canonical plane the cell lies.
#[derive(Debug, Clone)]
pub(super) struct CellFacet {
    pub plane: usize,
    pub side: Ordering,
    pub polygon: Vec<ExactPoint3>,
}

/// A bounded convex polytope described by its facets.
#[derive(Debug, Clone)]
pub(super) struct ConvexCell {
    pub facets: Vec<CellFacet>,
}

/// Splits a convex polygon by a plane into its front (positive) and back
/// (negative) parts. Vertices on the plane go to both parts.
///
/// Either part may come back degenerate; see [`is_degenerate`].
pub(super) fn split_polygon(
    polygon: &[ExactPoint3],
    plane: &ExactPlane,
) -> (Vec<ExactPoint3>, Vec<ExactPoint3>) {
    let n = polygon.len();
    let sides: Vec<Ordering> = polygon.iter().map(|p| plane.side(p)).collect();
    let mut front = Vec::with_capacity(n + 1);
    let mut back = Vec::with_capacity(n + 1);

    for i in 0..n {
        let j = (i + 1) % n;
        let si = sides[i];
        let sj = sides[j];

        if si != Ordering::Less {
            front.push(polygon[i].clone());
        }
        if si != Ordering::Greater {
            back.push(polygon[i].clone());
        }

        if si != Ordering::Equal && sj != Ordering::Equal && si != sj {
            let crossing = plane.intersect_segment(&polygon[i], &polygon[j]);
            front.push(crossing.clone());
            back.push(crossing);
        }
    }
    (front, back)
}

/// Whether a polygon encloses no area.
pub(super) fn is_degenerate(polygon: &[ExactPoint3]) -> bool {
    if polygon.len() < 3 {
        return true;
    }
    let origin = &polygon[0];
    let mut area = (&polygon[1] - origin).cross(&(&polygon[2] - origin));
    for k in 3..polygon.len() {
        let next = (&polygon[k - 1] - origin).cross(&(&polygon[k] - origin));
        area.x += next.x;
        area.y += next.y;
        area.z += next.z;
    }
    area.is_zero()
}

/// Splits a convex cell by a canonical plane.
///
/// Returns the front and back cells; a side is `None` when the plane does not
/// cut the cell's interior.
pub(super) fn split_cell(
    cell: &ConvexCell,
    plane_id: usize,
    plane: &ExactPlane,
) -> Result<(Option<ConvexCell>, Option<ConvexCell>), KernelError> {
    let mut has_front = false;
    let mut has_back = false;
    for facet in &cell.facets {
        for p in &facet.polygon {
            match plane.side(p) {
                Ordering::Greater => has_front = true,
                Ordering::Less => has_back = true,
                Ordering::Equal => {}
            }
        }
    }
    if !has_back {
        return Ok((Some(cell.clone()), None));
    }
    if !has_front {
        return Ok((None, Some(cell.clone())));
    }

    let mut front = Vec::with_capacity(cell.facets.len() + 1);
    let mut back = Vec::with_capacity(cell.facets.len() + 1);
    let mut section = Vec::new();
    for facet in &cell.facets {
        let (f, b) = split_polygon(&facet.polygon, plane);
        section.extend(
            f.iter()
                .filter(|p| plane.side(p) == Ordering::Equal)
                .cloned(),
        );
        if !is_degenerate(&f) {
            front.push(CellFacet {
                plane: facet.plane,
                side: facet.side,
                polygon: f,
            });
        }
        if !is_degenerate(&b) {
            back.push(CellFacet {
                plane: facet.plane,
                side: facet.side,
                polygon: b,
            });
        }
    }

    let cap = order_convex(section, plane);
    if is_degenerate(&cap) {
        return Err(KernelError::Subdivision(
            "plane crosses a cell without a cross-section".into(),
        ));
    }

    front.push(CellFacet {
        plane: plane_id,
        side: Ordering::Greater,
        polygon: cap.clone(),
    });
    back.push(CellFacet {
        plane: plane_id,
        side: Ordering::Less,
        polygon: cap,
    });
    Ok((Some(ConvexCell { facets: front }), Some(ConvexCell { facets: back })))
}

/// Orders the vertices of a convex polygon lying on `plane` cyclically.
fn order_convex(mut points: Vec<ExactPoint3>, plane: &ExactPlane) -> Vec<ExactPoint3> {
    points.sort();
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let axis = plane.dominant_axis();
    let mut keyed: Vec<(ExactPoint2, ExactPoint3)> =
        points.into_iter().map(|p| (p.project(axis), p)).collect();
    let projected: Vec<ExactPoint2> = keyed.iter().map(|(uv, _)| uv.clone()).collect();
    let Some(center) = centroid_2d(&projected) else {
        return Vec::new();
    };

    keyed.sort_by(|(a, _), (b, _)| angular_order(&center, a, b));
    keyed.into_iter().map(|(_, p)| p).collect()
}

/// Counter-clockwise angular order of `a` and `b` around `center`, starting
/// from the positive `u` direction.
fn angular_order(center: &ExactPoint2, a: &ExactPoint2, b: &ExactPoint2) -> Ordering {
    let upper = |p: &ExactPoint2| {
        let dv = &p.v - &center.v;
        dv.is_positive() || (dv.is_zero() && p.u > center.u)
    };
    upper(b)
        .cmp(&upper(a))
        .then_with(|| orient_2d(center, b, a))
}

/// Twice the area of a polygon projected along the dominant axis of `plane`.
#[cfg(test)]
fn projected_area(polygon: &[ExactPoint3], plane: &ExactPlane) -> num_rational::BigRational {
    let axis = plane.dominant_axis();
    let uv: Vec<ExactPoint2> = polygon.iter().map(|p| p.project(axis)).collect();
    crate::math::polygon_2d::signed_area_2d(&uv)
}
