use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::config::ValidationConfig;
use crate::math::polygon_3d::{best_fit_plane, triangle_normal};
use crate::math::Point3;
use crate::report::{ErrorCode, ErrorLog, FaceRecord};
use crate::tessellation::{ring_points, TessellateFace};
use crate::topology::Face;

/// Validates the faces and, for solids, the topology of one shell.
///
/// Ring errors (101, 102) or planarity errors (104, 203, 204) on any face stop
/// the shell before the topological checks (301, 302, 304, 307), which only
/// run for primitives that require closed shells. Unreferenced vertices (309)
/// are always reported.
pub struct ValidateShell<'a> {
    vertices: &'a [Point3],
    faces: &'a [Face],
    config: ValidationConfig,
}

/// How often an undirected edge is traversed in each direction.
struct EdgeUse {
    forward: usize,
    backward: usize,
    first_face: usize,
}

impl<'a> ValidateShell<'a> {
    /// Creates a new `ValidateShell` operation.
    #[must_use]
    pub fn new(vertices: &'a [Point3], faces: &'a [Face], config: &ValidationConfig) -> Self {
        Self {
            vertices,
            faces,
            config: *config,
        }
    }

    /// Runs every check and returns the errors found, grouped by code.
    #[must_use]
    pub fn execute(&self) -> ErrorLog<FaceRecord> {
        let mut log = ErrorLog::new();
        for (index, face) in self.faces.iter().enumerate() {
            if let Some(points) = self.check_rings(index, face, &mut log) {
                self.check_planarity(index, face, &points, &mut log);
            }
        }

        if log.is_empty() && self.config.primitive.requires_closed_shells() {
            self.check_topology(&mut log);
        }
        self.check_unused_vertices(&mut log);

        debug!(
            faces = self.faces.len(),
            vertices = self.vertices.len(),
            errors = log.len(),
            "shell checked"
        );
        log
    }

    /// Returns the points of every ring, or `None` if a ring is malformed.
    fn check_rings(
        &self,
        index: usize,
        face: &Face,
        log: &mut ErrorLog<FaceRecord>,
    ) -> Option<Vec<Point3>> {
        let mut all = Vec::new();
        let mut ok = true;
        for ring in face.rings() {
            let points = match ring_points(self.vertices, ring) {
                Ok(points) => points,
                Err(e) => {
                    log.push(ErrorCode::UnknownError, record(index, e.to_string()));
                    ok = false;
                    continue;
                }
            };

            if let Some(p) = points.iter().find(|p| !p.coords.iter().all(|c| c.is_finite())) {
                log.push(
                    ErrorCode::UnknownError,
                    record(index, format!("non-finite coordinate ({}, {}, {})", p.x, p.y, p.z)),
                );
                ok = false;
                continue;
            }

            let n = points.len();
            if n > 1 && (0..n).any(|i| points[i] == points[(i + 1) % n]) {
                log.push(
                    ErrorCode::ConsecutivePointsSame,
                    record(index, "ring has two consecutive identical points".into()),
                );
                ok = false;
            }
            let distinct: HashSet<[u64; 3]> = points.iter().map(point_key).collect();
            if distinct.len() < 3 {
                log.push(
                    ErrorCode::TooFewPoints,
                    record(index, format!("ring has {} distinct points", distinct.len())),
                );
                ok = false;
            }
            all.extend(points);
        }
        ok.then_some(all)
    }

    fn check_planarity(
        &self,
        index: usize,
        face: &Face,
        points: &[Point3],
        log: &mut ErrorLog<FaceRecord>,
    ) {
        let Ok(plane) = best_fit_plane(points) else {
            log.push(
                ErrorCode::TooFewPoints,
                record(index, "ring has fewer than 3 non-collinear points".into()),
            );
            return;
        };

        let distance = points
            .iter()
            .map(|p| plane.signed_distance(p).abs())
            .fold(0.0_f64, f64::max);
        if distance > self.config.planarity_d2p {
            log.push(
                ErrorCode::NonPlanarDistancePlane,
                record(index, format!("{distance:.6} from the fitted plane")),
            );
            return;
        }

        let triangles = match TessellateFace::new(self.vertices, face).execute() {
            Ok(triangles) if !triangles.is_empty() => triangles,
            Ok(_) => {
                log.push(
                    ErrorCode::RingSelfIntersection,
                    record(index, "face has no area".into()),
                );
                return;
            }
            Err(e) => {
                log.push(ErrorCode::RingSelfIntersection, record(index, e.to_string()));
                return;
            }
        };

        let normals: Vec<_> = triangles
            .iter()
            .filter_map(|&[a, b, c]| {
                triangle_normal(&self.vertices[a], &self.vertices[b], &self.vertices[c])
            })
            .collect();
        let Some(reference) = normals.first() else {
            return;
        };
        let deviation = normals
            .iter()
            .map(|n| reference.dot(n).clamp(-1.0, 1.0).acos().to_degrees())
            .fold(0.0_f64, f64::max);
        if deviation > self.config.planarity_normals {
            log.push(
                ErrorCode::NonPlanarNormalsDeviation,
                record(index, format!("normals deviate by {deviation:.4} degrees")),
            );
        }
    }

    fn check_topology(&self, log: &mut ErrorLog<FaceRecord>) {
        if self.faces.len() < 4 {
            log.push(
                ErrorCode::TooFewPolygons,
                FaceRecord {
                    face: None,
                    info: format!("shell has {} faces", self.faces.len()),
                },
            );
            return;
        }

        let canonical = canonical_indices(self.vertices);
        let mut edges: BTreeMap<(usize, usize), EdgeUse> = BTreeMap::new();
        for (index, face) in self.faces.iter().enumerate() {
            for (a, b) in face.edges() {
                let (a, b) = (canonical[a], canonical[b]);
                if a == b {
                    continue;
                }
                let entry = edges.entry((a.min(b), a.max(b))).or_insert(EdgeUse {
                    forward: 0,
                    backward: 0,
                    first_face: index,
                });
                if a < b {
                    entry.forward += 1;
                } else {
                    entry.backward += 1;
                }
            }
        }

        for ((a, b), usage) in &edges {
            let face = Some(usage.first_face);
            match usage.forward + usage.backward {
                1 => log.push(
                    ErrorCode::ShellNotClosed,
                    FaceRecord {
                        face,
                        info: format!("edge ({a}, {b}) is used by one face"),
                    },
                ),
                2 if usage.forward != 1 => log.push(
                    ErrorCode::PolygonWrongOrientation,
                    FaceRecord {
                        face,
                        info: format!("edge ({a}, {b}) is traversed twice in the same direction"),
                    },
                ),
                n if n > 2 => log.push(
                    ErrorCode::NonManifoldEdge,
                    FaceRecord {
                        face,
                        info: format!("edge ({a}, {b}) is shared by {n} faces"),
                    },
                ),
                _ => {}
            }
        }
    }

    fn check_unused_vertices(&self, log: &mut ErrorLog<FaceRecord>) {
        let used: HashSet<usize> = self
            .faces
            .iter()
            .flat_map(|face| face.rings().flatten().copied().collect::<Vec<_>>())
            .collect();
        for index in (0..self.vertices.len()).filter(|i| !used.contains(i)) {
            log.push(
                ErrorCode::VerticesNotUsed,
                FaceRecord {
                    face: None,
                    info: format!("vertex {index} is not referenced by any face"),
                },
            );
        }
    }
}

fn record(face: usize, info: String) -> FaceRecord {
    FaceRecord {
        face: Some(face),
        info,
    }
}

/// Bit pattern of a point, with `-0.0` folded onto `0.0`.
fn point_key(p: &Point3) -> [u64; 3] {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}

/// Maps every vertex index to the first index with identical coordinates.
fn canonical_indices(vertices: &[Point3]) -> Vec<usize> {
    let mut first: HashMap<[u64; 3], usize> = HashMap::new();
    vertices
        .iter()
        .enumerate()
        .map(|(i, p)| *first.entry(point_key(p)).or_insert(i))
        .collect()
}
