use std::collections::HashMap;

use crate::error::Result;
use crate::math::exact::{ExactPlane, ExactPoint3};
use crate::math::Point3;
use crate::tessellation::TessellateFace;
use crate::topology::{Face, Shell};

/// A closed triangulated surface with exact rational coordinates.
///
/// Triangle winding is not meaningful: each face is triangulated
/// counter-clockwise in its own projection frame, and membership is decided
/// by crossing parity. Triangles whose exact vertices are collinear carry no
/// area and are dropped.
#[derive(Debug, Clone, Default)]
pub struct ExactPolyhedron {
    triangles: Vec<[ExactPoint3; 3]>,
}

impl ExactPolyhedron {
    /// Builds a polyhedron from exact triangles.
    #[must_use]
    pub fn from_triangles(triangles: Vec<[ExactPoint3; 3]>) -> Self {
        let triangles = triangles
            .into_iter()
            .filter(|[a, b, c]| ExactPlane::through(a, b, c).is_some())
            .collect();
        Self { triangles }
    }

    /// Converts a shell, triangulating every face and converting its
    /// coordinates without rounding.
    ///
    /// # Errors
    ///
    /// Returns an error if a face cannot be triangulated or a coordinate is
    /// not finite.
    pub fn from_shell(shell: &Shell) -> Result<Self> {
        Self::from_faces(shell.vertices(), shell.faces())
    }

    fn from_faces(vertices: &[Point3], faces: &[Face]) -> Result<Self> {
        let mut exact: HashMap<usize, ExactPoint3> = HashMap::new();
        let mut convert = |index: usize| -> Result<ExactPoint3> {
            if let Some(p) = exact.get(&index) {
                return Ok(p.clone());
            }
            let p = ExactPoint3::from_point(&vertices[index])?;
            exact.insert(index, p.clone());
            Ok(p)
        };

        let mut triangles = Vec::new();
        for face in faces {
            for [i, j, k] in TessellateFace::new(vertices, face).execute()? {
                triangles.push([convert(i)?, convert(j)?, convert(k)?]);
            }
        }
        Ok(Self::from_triangles(triangles))
    }

    /// The triangles of the surface.
    #[must_use]
    pub fn triangles(&self) -> &[[ExactPoint3; 3]] {
        &self.triangles
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
