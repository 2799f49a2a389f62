use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::GeometryError;
use crate::math::plane::Plane;
use crate::math::polygon_3d::best_fit_plane;
use crate::math::Point3;
use crate::topology::Face;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates a planar face with holes.
///
/// The face is projected onto its best-fit plane and triangulated with a
/// constrained Delaunay triangulation; triangles inside holes are removed.
/// The output refers to the shell's vertex indices, counter-clockwise in the
/// projection frame.
pub struct TessellateFace<'a> {
    vertices: &'a [Point3],
    face: &'a Face,
}

impl<'a> TessellateFace<'a> {
    /// Creates a new `TessellateFace` operation.
    #[must_use]
    pub fn new(vertices: &'a [Point3], face: &'a Face) -> Self {
        Self { vertices, face }
    }

    /// Executes the triangulation.
    ///
    /// # Errors
    ///
    /// Returns an error if a ring references a missing vertex, the outer ring
    /// has no area, or rings cross each other.
    pub fn execute(&self) -> Result<Vec<[usize; 3]>, GeometryError> {
        let outer = ring_points(self.vertices, &self.face.outer)?;
        let plane = best_fit_plane(&outer)?;

        let mut cdt = Cdt::new();
        let mut original: HashMap<usize, usize> = HashMap::new();
        for ring in self.face.rings() {
            insert_constraint_loop(&mut cdt, &mut original, self.vertices, ring, &plane)?;
        }

        let interior = classify_interior_faces(&cdt);
        let mut triangles = Vec::with_capacity(interior.len());
        for face_handle in cdt.inner_faces() {
            if !interior.contains(&face_handle.fix().index()) {
                continue;
            }
            let mut tri = [0usize; 3];
            for (slot, vh) in tri.iter_mut().zip(face_handle.vertices()) {
                let index = vh.fix().index();
                *slot = *original.get(&index).ok_or_else(|| {
                    GeometryError::Triangulation(format!("unmapped vertex {index}"))
                })?;
            }
            triangles.push(tri);
        }
        Ok(triangles)
    }
}

/// Looks up the positions of a ring's vertex indices.
///
/// # Errors
///
/// Returns an error if an index is out of range.
pub fn ring_points(vertices: &[Point3], ring: &[usize]) -> Result<Vec<Point3>, GeometryError> {
    ring.iter()
        .map(|&index| {
            vertices
                .get(index)
                .copied()
                .ok_or(GeometryError::VertexOutOfRange {
                    index,
                    count: vertices.len(),
                })
        })
        .collect()
}

/// Inserts a closed ring as constraint edges into the CDT.
fn insert_constraint_loop(
    cdt: &mut Cdt,
    original: &mut HashMap<usize, usize>,
    vertices: &[Point3],
    ring: &[usize],
    plane: &Plane,
) -> Result<(), GeometryError> {
    if ring.len() < 3 {
        return Err(GeometryError::Triangulation(
            "constraint loop needs at least 3 points".into(),
        ));
    }

    let mut handles: Vec<FixedVertexHandle> = Vec::with_capacity(ring.len());
    for &index in ring {
        let point = vertices.get(index).ok_or(GeometryError::VertexOutOfRange {
            index,
            count: vertices.len(),
        })?;
        let uv = plane.project(point);
        let h = cdt
            .insert(SpadePoint2::new(uv.x, uv.y))
            .map_err(|e: InsertionError| GeometryError::Triangulation(format!("CDT insert: {e}")))?;
        original.entry(h.index()).or_insert(index);
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(GeometryError::Triangulation(format!(
                "ring edge ({}, {}) crosses another ring edge",
                ring[i],
                ring[(i + 1) % ring.len()]
            )));
        }
        cdt.add_constraint(from, to);
    }

    Ok(())
}

/// Classifies which inner faces of the CDT are inside the face using flood-fill.
///
/// Starts from faces adjacent to the outer (infinite) face at depth 0. Each time
/// a constraint edge is crossed, depth increments. Odd depth = interior.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        let face = cdt.face(face_fix);
        for edge in face.adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let n_idx = neighbor.fix().index();
            if depth_map.contains_key(&n_idx) {
                continue;
            }
            let new_depth = if cdt.is_constraint_edge(edge.as_undirected().fix()) {
                depth + 1
            } else {
                depth
            };
            depth_map.insert(n_idx, new_depth);
            if new_depth % 2 == 1 {
                interior.insert(n_idx);
            }
            queue.push_back((neighbor.fix(), new_depth));
        }
    }

    interior
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn triangle_produces_1_triangle() {
        let vertices = [p(0.0, 0.0), p(4.0, 0.0), p(2.0, 3.0)];
        let face = Face::new(vec![0, 1, 2]);
        let tris = TessellateFace::new(&vertices, &face).execute().unwrap();
        assert_eq!(tris.len(), 1);
        let mut used: Vec<usize> = tris[0].to_vec();
        used.sort_unstable();
        assert_eq!(used, vec![0, 1, 2]);
    }

    #[test]
    fn l_shape_concave_tessellates() {
        let vertices = [
            p(0.0, 0.0),
            p(4.0, 0.0),
            p(4.0, 2.0),
            p(2.0, 2.0),
            p(2.0, 4.0),
            p(0.0, 4.0),
        ];
        let face = Face::new(vec![0, 1, 2, 3, 4, 5]);
        let tris = TessellateFace::new(&vertices, &face).execute().unwrap();
        assert_eq!(tris.len(), 4);
    }

    #[test]
    fn face_with_hole_excludes_interior() {
        let vertices = [
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(10.0, 10.0),
            p(0.0, 10.0),
            p(3.0, 3.0),
            p(3.0, 7.0),
            p(7.0, 7.0),
            p(7.0, 3.0),
        ];
        let face = Face::with_holes(vec![0, 1, 2, 3], vec![vec![4, 5, 6, 7]]);
        let tris = TessellateFace::new(&vertices, &face).execute().unwrap();
        assert_eq!(tris.len(), 8);
        for tri in &tris {
            let cx = tri.iter().map(|&i| vertices[i].x).sum::<f64>() / 3.0;
            let cy = tri.iter().map(|&i| vertices[i].y).sum::<f64>() / 3.0;
            let in_hole = cx > 3.0 && cx < 7.0 && cy > 3.0 && cy < 7.0;
            assert!(!in_hole, "triangle centroid ({cx}, {cy}) is inside the hole");
        }
    }

    #[test]
    fn bow_tie_ring_is_rejected() {
        let vertices = [p(0.0, 0.0), p(2.0, 2.0), p(2.0, 0.0), p(0.0, 2.0)];
        let face = Face::new(vec![0, 1, 2, 3]);
        assert!(TessellateFace::new(&vertices, &face).execute().is_err());
    }

    #[test]
    fn missing_vertex_is_reported() {
        let vertices = [p(0.0, 0.0), p(1.0, 0.0)];
        let face = Face::new(vec![0, 1, 5]);
        assert!(matches!(
            TessellateFace::new(&vertices, &face).execute(),
            Err(GeometryError::VertexOutOfRange { index: 5, .. })
        ));
    }
}
