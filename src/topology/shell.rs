use std::collections::BTreeSet;
use std::fmt::Write as _;

use tracing::warn;

use crate::config::{Primitive3D, ValidationConfig};
use crate::error::Result;
use crate::math::Point3;
use crate::operations::boolean::ExactPolyhedron;
use crate::operations::query::{Aabb, BoundingBox};
use crate::operations::validation::ValidateShell;
use crate::report::{escape_xml, index_label, ErrorCode, ErrorLog, FaceRecord};

use super::face::Face;

/// A polygonal surface bounding one component of a solid.
///
/// A shell owns its vertices and faces. For a solid, the shell is expected to
/// be closed and consistently oriented; [`Shell::validate`] checks this and
/// records what it finds in the shell's own error log.
#[derive(Debug, Clone)]
pub struct Shell {
    id: usize,
    vertices: Vec<Point3>,
    faces: Vec<Face>,
    errors: ErrorLog<FaceRecord>,
}

impl Shell {
    /// Creates a shell with id 0.
    #[must_use]
    pub fn new(vertices: Vec<Point3>, faces: Vec<Face>) -> Self {
        Self {
            id: 0,
            vertices,
            faces,
            errors: ErrorLog::new(),
        }
    }

    /// Position of the shell in its solid; 0 is the outer shell.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// A shell without faces is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    #[must_use]
    pub fn number_faces(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn number_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<Aabb> {
        BoundingBox::new(&self.vertices).execute()
    }

    /// Smallest x and y over the vertices.
    #[must_use]
    pub fn min_bbox_xy(&self) -> Option<(f64, f64)> {
        self.bounding_box().map(|aabb| (aabb.min.x, aabb.min.y))
    }

    /// Shifts every vertex by `(-minx, -miny, 0)`.
    pub fn translate_vertices(&mut self, minx: f64, miny: f64) {
        for v in &mut self.vertices {
            v.x -= minx;
            v.y -= miny;
        }
    }

    /// Validates the shell, replacing any earlier results.
    ///
    /// Returns `true` if no error was found.
    pub fn validate(
        &mut self,
        primitive: Primitive3D,
        tol_planarity_d2p: f64,
        tol_planarity_normals: f64,
    ) -> bool {
        let config = ValidationConfig {
            primitive,
            planarity_d2p: tol_planarity_d2p,
            planarity_normals: tol_planarity_normals,
        };
        self.validate_with(&config)
    }

    /// Same as [`Shell::validate`] with the parameters taken from `config`.
    pub fn validate_with(&mut self, config: &ValidationConfig) -> bool {
        self.errors = ValidateShell::new(&self.vertices, &self.faces, config).execute();
        for (code, record) in self.errors.iter() {
            warn!(
                shell = self.id,
                code = code.code(),
                face = %index_label(record.face),
                info = %record.info,
                "{}",
                code.description()
            );
        }
        self.errors.is_empty()
    }

    /// Records an error against this shell.
    pub fn add_error(&mut self, code: ErrorCode, face: Option<usize>, info: impl Into<String>) {
        let info = info.into();
        warn!(
            shell = self.id,
            code = code.code(),
            face = %index_label(face),
            info = %info,
            "{}",
            code.description()
        );
        self.errors.push(code, FaceRecord { face, info });
    }

    #[must_use]
    pub fn errors(&self) -> &ErrorLog<FaceRecord> {
        &self.errors
    }

    pub(crate) fn clear_errors(&mut self) {
        self.errors.clear();
    }

    #[must_use]
    pub fn unique_error_codes(&self) -> BTreeSet<ErrorCode> {
        self.errors.codes()
    }

    /// XML report of the shell's errors; empty when there are none.
    #[must_use]
    pub fn report_xml(&self) -> String {
        let mut out = String::new();
        if self.errors.is_empty() {
            return out;
        }
        let _ = writeln!(out, "\t\t<Shell>");
        let _ = writeln!(out, "\t\t\t<id>{}</id>", self.id);
        for (code, record) in self.errors.iter() {
            let _ = writeln!(out, "\t\t\t<Error>");
            let _ = writeln!(out, "\t\t\t\t<code>{code}</code>");
            let _ = writeln!(out, "\t\t\t\t<type>{}</type>", code.description());
            let _ = writeln!(out, "\t\t\t\t<face>{}</face>", index_label(record.face));
            let _ = writeln!(out, "\t\t\t\t<info>{}</info>", escape_xml(&record.info));
            let _ = writeln!(out, "\t\t\t</Error>");
        }
        let _ = writeln!(out, "\t\t</Shell>");
        out
    }

    /// Plain-text report of the shell's errors; empty when there are none.
    #[must_use]
    pub fn report_text(&self) -> String {
        let mut out = String::new();
        if self.errors.is_empty() {
            return out;
        }
        let _ = writeln!(out, "\t--- Shell {} ---", self.id);
        for (code, record) in self.errors.iter() {
            let _ = writeln!(out, "\t{code} -- {}", code.description());
            let _ = writeln!(out, "\t\tFace: {}", index_label(record.face));
            let _ = writeln!(out, "\t\tInfo: {}", record.info);
        }
        out
    }

    /// The shell in `TetGen` `.poly` format.
    #[must_use]
    pub fn poly_representation(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} 3 0 0", self.vertices.len());
        for (i, v) in self.vertices.iter().enumerate() {
            let _ = writeln!(out, "{i} {} {} {}", v.x, v.y, v.z);
        }
        let _ = writeln!(out, "{} 0", self.faces.len());
        for face in &self.faces {
            let _ = writeln!(out, "{} 0", face.rings().count());
            for ring in face.rings() {
                let _ = write!(out, "{}", ring.len());
                for index in ring {
                    let _ = write!(out, " {index}");
                }
                let _ = writeln!(out);
            }
        }
        let _ = writeln!(out, "0");
        let _ = writeln!(out, "0");
        out
    }

    /// Converts the shell to exact rational triangles.
    ///
    /// # Errors
    ///
    /// Returns an error if a face cannot be triangulated or a coordinate is
    /// not finite.
    pub fn to_exact_polyhedron(&self) -> Result<ExactPolyhedron> {
        ExactPolyhedron::from_shell(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::{box_faces, box_shell, box_vertices};
    use approx::assert_relative_eq;

    #[test]
    fn counts_and_emptiness() {
        let shell = box_shell([0.0; 3], [1.0; 3]);
        assert_eq!(shell.number_faces(), 6);
        assert_eq!(shell.number_vertices(), 8);
        assert!(!shell.is_empty());
        assert!(Shell::new(Vec::new(), Vec::new()).is_empty());
    }

    #[test]
    fn translation_moves_min_corner_to_origin() {
        let mut shell = box_shell([100.5, -20.0, 3.0], [101.5, -19.0, 4.0]);
        let (minx, miny) = shell.min_bbox_xy().unwrap();
        shell.translate_vertices(minx, miny);
        let aabb = shell.bounding_box().unwrap();
        assert_relative_eq!(aabb.min.x, 0.0);
        assert_relative_eq!(aabb.min.y, 0.0);
        assert_relative_eq!(aabb.min.z, 3.0);
        assert_relative_eq!(aabb.max.x, 1.0);
    }

    #[test]
    fn revalidation_replaces_errors() {
        let mut faces = box_faces();
        faces.pop();
        let mut shell = Shell::new(box_vertices([0.0; 3], [1.0; 3]), faces);
        assert!(!shell.validate(Primitive3D::Solid, 0.01, 1.0));
        let count = shell.errors().len();
        assert!(!shell.validate(Primitive3D::Solid, 0.01, 1.0));
        assert_eq!(shell.errors().len(), count);
        assert!(shell.validate(Primitive3D::MultiSurface, 0.01, 1.0));
        assert!(shell.unique_error_codes().is_empty());
    }

    #[test]
    fn reports_list_every_record() {
        let mut shell = box_shell([0.0; 3], [1.0; 3]);
        assert_eq!(shell.report_xml(), "");
        assert_eq!(shell.report_text(), "");

        shell.add_error(ErrorCode::NonPlanarDistancePlane, Some(2), "a < b");
        let xml = shell.report_xml();
        assert!(xml.contains("<code>203</code>"));
        assert!(xml.contains("<face>2</face>"));
        assert!(xml.contains("<info>a &lt; b</info>"));
        let text = shell.report_text();
        assert!(text.contains("\t203 -- NON_PLANAR_POLYGON_DISTANCE_PLANE\n"));
        assert!(text.contains("\t\tFace: 2\n"));
    }

    #[test]
    fn poly_lists_vertices_and_facets() {
        let shell = box_shell([0.0; 3], [1.0; 3]);
        let poly = shell.poly_representation();
        let lines: Vec<&str> = poly.lines().collect();
        assert_eq!(lines[0], "8 3 0 0");
        assert_eq!(lines[9], "6 0");
        assert_eq!(lines[10], "1 0");
        assert_eq!(lines[11], "4 0 2 3 1");
        assert_eq!(lines.len(), 1 + 8 + 1 + 6 * 2 + 2);
    }

    #[test]
    fn converts_to_exact_triangles() {
        let shell = box_shell([0.0; 3], [1.0; 3]);
        assert_eq!(shell.to_exact_polyhedron().unwrap().triangles().len(), 12);
    }
}
