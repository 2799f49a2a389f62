use std::collections::BTreeSet;
use std::fmt::Write as _;

use tracing::{info, warn};

use crate::config::{Primitive3D, ValidationConfig};
use crate::operations::query::Aabb;
use crate::operations::validation::ShellInteraction;
use crate::report::{escape_xml, index_label, ErrorCode, ErrorLog, ShellPairRecord};

use super::shell::Shell;

/// Hands out solid ids in increasing order.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// A generator starting at `"0"`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Returns the next id.
    pub fn next_id(&mut self) -> String {
        let id = self.next.to_string();
        self.next += 1;
        id
    }
}

/// Outcome of the last validation of a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validity {
    #[default]
    Unknown,
    Valid,
    Invalid,
}

/// A solid bounded by an outer shell and zero or more inner shells.
///
/// Shell 0 is the outer shell; the others are cavities. The solid owns its
/// shells and keeps its own error log for problems that involve several
/// shells, next to the per-shell logs.
#[derive(Debug)]
pub struct Solid {
    id: String,
    shells: Vec<Shell>,
    validity: Validity,
    errors: ErrorLog<ShellPairRecord>,
}

impl Solid {
    /// Creates an empty solid with the next id from `ids`.
    #[must_use]
    pub fn new(ids: &mut IdGenerator) -> Self {
        Self::with_id(ids.next_id())
    }

    /// Creates a solid with an outer shell and the next id from `ids`.
    #[must_use]
    pub fn with_outer_shell(ids: &mut IdGenerator, shell: Shell) -> Self {
        let mut solid = Self::new(ids);
        solid.set_outer_shell(shell);
        solid
    }

    /// Creates an empty solid with a caller-supplied id.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            shells: Vec::new(),
            validity: Validity::Unknown,
            errors: ErrorLog::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// The outer shell, if the solid has any shell.
    #[must_use]
    pub fn outer_shell(&self) -> Option<&Shell> {
        self.shells.first()
    }

    /// Replaces the outer shell, or sets it if the solid has none.
    pub fn set_outer_shell(&mut self, mut shell: Shell) {
        shell.set_id(0);
        if let Some(outer) = self.shells.first_mut() {
            *outer = shell;
        } else {
            self.shells.push(shell);
        }
    }

    /// Appends an inner shell.
    pub fn add_inner_shell(&mut self, mut shell: Shell) {
        shell.set_id(self.shells.len());
        self.shells.push(shell);
    }

    /// All shells, outer first.
    #[must_use]
    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    #[must_use]
    pub fn inner_shells(&self) -> &[Shell] {
        self.shells.get(1..).unwrap_or_default()
    }

    #[must_use]
    pub fn num_inner_shells(&self) -> usize {
        self.inner_shells().len()
    }

    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.shells.iter().map(Shell::number_faces).sum()
    }

    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.shells.iter().map(Shell::number_vertices).sum()
    }

    /// Whether the solid has no shell, or any of its shells is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shells.is_empty() || self.shells.iter().any(Shell::is_empty)
    }

    /// Bounding box over all shells.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.shells
            .iter()
            .filter_map(Shell::bounding_box)
            .reduce(|a, b| a.union(&b))
    }

    /// Moves all shells so that the smallest x and y over their bounding
    /// boxes become 0.
    pub fn translate_vertices(&mut self) {
        let Some(aabb) = self.bounding_box() else {
            return;
        };
        for shell in &mut self.shells {
            shell.translate_vertices(aabb.min.x, aabb.min.y);
        }
    }

    /// Validates every shell, then the way the shells fit together.
    ///
    /// Earlier results are discarded. Returns `true` if the solid is valid;
    /// details are in [`Solid::errors`] and each shell's own log.
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

    /// Same as [`Solid::validate`] with the parameters taken from `config`.
    pub fn validate_with(&mut self, config: &ValidationConfig) -> bool {
        self.errors.clear();
        for shell in &mut self.shells {
            shell.clear_errors();
        }

        if self.is_empty() {
            self.add_error(
                ErrorCode::EmptyPrimitive,
                None,
                None,
                "probably error while parsing input",
            );
            self.validity = Validity::Invalid;
            return false;
        }

        info!(solid = %self.id, shells = self.shells.len(), "validating solid");
        let mut valid = true;
        for shell in &mut self.shells {
            if !shell.validate_with(config) {
                valid = false;
            }
        }
        if valid {
            valid = self.validate_interactions();
        }

        self.validity = if valid {
            Validity::Valid
        } else {
            Validity::Invalid
        };
        valid
    }

    fn validate_interactions(&mut self) -> bool {
        match ShellInteraction::new(&self.shells).execute() {
            Ok(outcome) => {
                let valid = outcome.is_valid();
                for finding in outcome.findings {
                    self.add_error(finding.code, finding.shell_a, finding.shell_b, finding.info);
                }
                valid
            }
            Err(e) => {
                self.add_error(ErrorCode::UnknownError, None, None, e.to_string());
                false
            }
        }
    }

    #[must_use]
    pub fn validity(&self) -> Validity {
        self.validity
    }

    /// Whether the last validation succeeded and the solid is not empty.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validity == Validity::Valid && !self.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &ErrorLog<ShellPairRecord> {
        &self.errors
    }

    /// Records an error involving up to two shells.
    pub fn add_error(
        &mut self,
        code: ErrorCode,
        shell_a: Option<usize>,
        shell_b: Option<usize>,
        info: impl Into<String>,
    ) {
        let info = info.into();
        warn!(
            solid = %self.id,
            code = code.code(),
            shells = %format!("{}&{}", index_label(shell_a), index_label(shell_b)),
            info = %info,
            "{}",
            code.description()
        );
        self.errors.push(
            code,
            ShellPairRecord {
                shell_a,
                shell_b,
                info,
            },
        );
    }

    /// Distinct error codes of the solid and all its shells.
    #[must_use]
    pub fn unique_error_codes(&self) -> BTreeSet<ErrorCode> {
        let mut codes = self.errors.codes();
        for shell in &self.shells {
            codes.extend(shell.unique_error_codes());
        }
        codes
    }

    #[must_use]
    pub fn report_xml(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\t<Primitive>");
        let _ = writeln!(out, "\t\t<id>{}</id>", escape_xml(&self.id));
        let _ = writeln!(out, "\t\t<numbershells>{}</numbershells>", self.shells.len());
        let _ = writeln!(out, "\t\t<numberfaces>{}</numberfaces>", self.num_faces());
        let _ = writeln!(
            out,
            "\t\t<numbervertices>{}</numbervertices>",
            self.num_vertices()
        );
        for (code, record) in self.errors.iter() {
            let _ = writeln!(out, "\t\t<Error>");
            let _ = writeln!(out, "\t\t\t<code>{code}</code>");
            let _ = writeln!(out, "\t\t\t<type>{}</type>", code.description());
            let _ = writeln!(
                out,
                "\t\t\t<shell>{};{}</shell>",
                index_label(record.shell_a),
                index_label(record.shell_b)
            );
            let _ = writeln!(out, "\t\t\t<info>{}</info>", escape_xml(&record.info));
            let _ = writeln!(out, "\t\t</Error>");
        }
        for shell in &self.shells {
            out.push_str(&shell.report_xml());
        }
        if self.is_valid() {
            let _ = writeln!(out, "\t\t<VALID/>");
        }
        let _ = writeln!(out, "\t</Primitive>");
        out
    }

    #[must_use]
    pub fn report_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "===== Primitive {} =====", self.id);
        for (code, record) in self.errors.iter() {
            let _ = writeln!(out, "\t{code} -- {}", code.description());
            let _ = writeln!(
                out,
                "\t\tShells: {};{}",
                index_label(record.shell_a),
                index_label(record.shell_b)
            );
            let _ = writeln!(out, "\t\tInfo: {}", record.info);
        }
        for shell in &self.shells {
            out.push_str(&shell.report_text());
        }
        if self.is_valid() {
            let _ = writeln!(out, "\tVALID");
        }
        out
    }

    /// Every shell in `.poly` format, one block per shell.
    #[must_use]
    pub fn poly_representation(&self) -> String {
        let mut out = String::new();
        for shell in &self.shells {
            out.push_str(&shell.poly_representation());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::{
        box_faces, box_shell, box_vertices, cavity_shell, init_tracing, prism_shell,
    };
    use crate::math::Point3;
    use crate::topology::Face;
    use approx::assert_relative_eq;

    fn solid(shells: Vec<Shell>) -> Solid {
        let mut ids = IdGenerator::new();
        let mut shells = shells.into_iter();
        let mut solid = Solid::new(&mut ids);
        if let Some(outer) = shells.next() {
            solid.set_outer_shell(outer);
        }
        for shell in shells {
            solid.add_inner_shell(shell);
        }
        solid
    }

    fn validate(solid: &mut Solid) -> bool {
        init_tracing();
        solid.validate_with(&ValidationConfig::default())
    }

    fn codes(solid: &Solid) -> Vec<u16> {
        solid.unique_error_codes().iter().map(|c| c.code()).collect()
    }

    #[test]
    fn ids_increase() {
        let mut ids = IdGenerator::new();
        assert_eq!(Solid::new(&mut ids).id(), "0");
        assert_eq!(Solid::new(&mut ids).id(), "1");
        let mut ids = IdGenerator::starting_at(7);
        assert_eq!(Solid::with_outer_shell(&mut ids, box_shell([0.0; 3], [1.0; 3])).id(), "7");
        let mut named = Solid::with_id("b12");
        named.set_id("b13");
        assert_eq!(named.id(), "b13");
    }

    #[test]
    fn empty_solid_is_invalid() {
        let mut s = solid(Vec::new());
        assert!(s.is_empty());
        assert!(s.outer_shell().is_none());
        assert!(!validate(&mut s));
        assert_eq!(s.validity(), Validity::Invalid);
        assert_eq!(codes(&s), vec![902]);
        let record = &s.errors().records(ErrorCode::EmptyPrimitive)[0];
        assert_eq!((record.shell_a, record.shell_b), (None, None));
    }

    #[test]
    fn any_empty_shell_makes_the_solid_empty() {
        let s = solid(vec![
            box_shell([0.0; 3], [4.0; 3]),
            Shell::new(Vec::new(), Vec::new()),
        ]);
        assert!(s.is_empty());
    }

    #[test]
    fn validity_starts_unknown() {
        let s = solid(vec![box_shell([0.0; 3], [1.0; 3])]);
        assert_eq!(s.validity(), Validity::Unknown);
        assert!(!s.is_valid());
    }

    #[test]
    fn single_valid_shell() {
        let mut s = solid(vec![box_shell([0.0; 3], [1.0; 3])]);
        assert!(validate(&mut s));
        assert!(s.is_valid());
        assert!(s.unique_error_codes().is_empty());
        assert!(s.report_text().ends_with("\tVALID\n"));
        assert!(s.report_xml().contains("\t\t<VALID/>\n"));
    }

    #[test]
    fn single_invalid_shell() {
        let mut faces = box_faces();
        faces.pop();
        let mut s = solid(vec![Shell::new(box_vertices([0.0; 3], [1.0; 3]), faces)]);
        assert!(!validate(&mut s));
        assert_eq!(codes(&s), vec![302]);
        assert!(s.errors().is_empty());
        assert!(!s.report_text().contains("VALID"));
    }

    #[test]
    fn every_shell_is_checked() {
        let mut open = box_faces();
        open.pop();
        let mut flipped = box_faces();
        flipped[0].outer.reverse();
        let mut s = solid(vec![
            Shell::new(box_vertices([0.0; 3], [10.0; 3]), open),
            Shell::new(box_vertices([1.0; 3], [2.0; 3]), flipped),
        ]);
        assert!(!validate(&mut s));
        assert_eq!(codes(&s), vec![302, 307]);
        assert!(s.errors().is_empty());
    }

    #[test]
    fn proper_cavity() {
        let mut s = solid(vec![
            box_shell([0.0; 3], [10.0; 3]),
            cavity_shell([2.0; 3], [5.0; 3]),
        ]);
        assert!(validate(&mut s));
        assert_eq!(s.validity(), Validity::Valid);
        assert_eq!(s.num_inner_shells(), 1);
    }

    #[test]
    fn cavity_partly_outside() {
        let mut s = solid(vec![
            box_shell([0.0; 3], [10.0; 3]),
            cavity_shell([8.0; 3], [12.0; 3]),
        ]);
        assert!(!validate(&mut s));
        let records = s.errors().records(ErrorCode::OverlappingShells);
        assert_eq!(records.len(), 1);
        assert_eq!((records[0].shell_a, records[0].shell_b), (Some(0), Some(1)));
    }

    #[test]
    fn overlapping_and_disjoint_cavities() {
        let mut overlapping = solid(vec![
            box_shell([0.0; 3], [10.0; 3]),
            cavity_shell([1.0; 3], [4.0; 3]),
            cavity_shell([3.0; 3], [6.0; 3]),
        ]);
        assert!(!validate(&mut overlapping));
        assert_eq!(codes(&overlapping), vec![402]);

        let mut disjoint = solid(vec![
            box_shell([0.0; 3], [10.0; 3]),
            cavity_shell([1.0; 3], [4.0; 3]),
            cavity_shell([6.0; 3], [9.0; 3]),
        ]);
        assert!(validate(&mut disjoint));
    }

    #[test]
    fn revalidation_does_not_duplicate_errors() {
        let mut s = solid(vec![
            box_shell([0.0; 3], [10.0; 3]),
            cavity_shell([8.0; 3], [12.0; 3]),
        ]);
        validate(&mut s);
        let first = s.report_xml();
        validate(&mut s);
        assert_eq!(s.report_xml(), first);
    }

    #[test]
    fn reports_are_stable() {
        let mut s = solid(vec![
            box_shell([0.0; 3], [10.0; 3]),
            cavity_shell([0.0, 2.0, 2.0], [3.0, 4.0, 4.0]),
        ]);
        validate(&mut s);
        assert_eq!(s.report_xml(), s.report_xml());
        assert_eq!(s.report_text(), s.report_text());

        let text = s.report_text();
        assert!(text.starts_with("===== Primitive 0 =====\n"));
        assert!(text.contains("\t401 -- SHELLS_FACE_ADJACENT\n\t\tShells: 0;1\n"));
        let xml = s.report_xml();
        assert!(xml.contains("<numbershells>2</numbershells>"));
        assert!(xml.contains("<numberfaces>12</numberfaces>"));
        assert!(xml.contains("<numbervertices>16</numbervertices>"));
        assert!(xml.contains("<shell>0;1</shell>"));
    }

    #[test]
    fn unique_codes_merge_solid_and_shells() {
        let mut s = solid(vec![
            box_shell([0.0; 3], [1.0; 3]),
            cavity_shell([0.2; 3], [0.4; 3]),
        ]);
        s.add_error(ErrorCode::InteriorDisconnected, None, None, "");
        s.shells[1].add_error(ErrorCode::NonPlanarDistancePlane, Some(0), "");
        assert_eq!(codes(&s), vec![203, 404]);
    }

    #[test]
    fn counts_sum_over_shells() {
        let s = solid(vec![
            box_shell([0.0; 3], [10.0; 3]),
            cavity_shell([1.0; 3], [2.0; 3]),
            Shell::new(
                box_vertices([3.0; 3], [4.0; 3]),
                vec![Face::new(vec![0, 1, 2])],
            ),
        ]);
        assert_eq!(s.num_faces(), 13);
        assert_eq!(s.num_vertices(), 24);
        assert_eq!(s.shells()[2].id(), 2);
    }

    #[test]
    fn outer_shell_can_be_replaced() {
        let mut s = solid(vec![box_shell([0.0; 3], [1.0; 3])]);
        s.set_outer_shell(box_shell([0.0; 3], [5.0; 3]));
        assert_eq!(s.shells().len(), 1);
        let aabb = s.outer_shell().unwrap().bounding_box().unwrap();
        assert_relative_eq!(aabb.max.x, 5.0);
    }

    #[test]
    fn translation_uses_the_minimum_over_shells() {
        let mut s = solid(vec![
            box_shell([10.0, 20.0, 0.0], [20.0, 30.0, 10.0]),
            cavity_shell([12.0, 22.0, 2.0], [14.0, 24.0, 4.0]),
        ]);
        s.translate_vertices();
        let outer = s.outer_shell().unwrap().bounding_box().unwrap();
        let inner = s.inner_shells()[0].bounding_box().unwrap();
        assert_relative_eq!(outer.min.x, 0.0);
        assert_relative_eq!(outer.min.y, 0.0);
        assert_relative_eq!(inner.min.x, 2.0);
        assert_relative_eq!(inner.min.y, 2.0);
        assert_relative_eq!(inner.min.z, 2.0);
    }

    #[test]
    fn kernel_failure_is_recorded() {
        let mut open = box_faces();
        open.pop();
        let mut s = solid(vec![
            box_shell([0.0; 3], [10.0; 3]),
            Shell::new(box_vertices([2.0; 3], [4.0; 3]), open),
        ]);
        assert!(!s.validate(Primitive3D::MultiSurface, 0.01, 1.0));
        assert!(s.shells().iter().all(|shell| shell.errors().is_empty()));
        let records = s.errors().records(ErrorCode::UnknownError);
        assert_eq!(records.len(), 1);
        assert_eq!((records[0].shell_a, records[0].shell_b), (None, None));
        assert!(records[0].info.contains("shell 1"));
    }

    #[test]
    fn decimal_coordinates() {
        let mut s = solid(vec![
            box_shell([0.1; 3], [10.3; 3]),
            cavity_shell([2.7; 3], [3.9; 3]),
            cavity_shell([5.3; 3], [7.1; 3]),
        ]);
        assert!(validate(&mut s));
    }

    #[test]
    fn prism_with_a_box_cavity() {
        let mut s = solid(vec![
            prism_shell(12, [5.0, 5.0], 5.0, 0.0, 10.0),
            cavity_shell([4.0; 3], [6.0; 3]),
        ]);
        assert!(validate(&mut s));
        assert_eq!(s.num_faces(), 14 + 6);
    }

    #[test]
    fn many_sided_prisms() {
        let mut s = solid(vec![
            prism_shell(32, [5.0, 5.0], 5.0, 0.0, 10.0),
            prism_shell(16, [5.0, 5.0], 2.0, 3.0, 7.0),
        ]);
        assert!(validate(&mut s));
    }

    #[test]
    fn top_face_with_a_plugged_hole() {
        let mut vertices = box_vertices([0.0; 3], [10.0; 3]);
        for [x, y] in [[3.0, 3.0], [7.0, 3.0], [7.0, 7.0], [3.0, 7.0]] {
            vertices.push(Point3::new(x, y, 10.0));
        }
        let mut faces = box_faces();
        faces[1] = Face::with_holes(vec![4, 5, 7, 6], vec![vec![8, 11, 10, 9]]);
        faces.push(Face::new(vec![8, 9, 10, 11]));
        let mut s = solid(vec![
            Shell::new(vertices, faces),
            cavity_shell([2.0; 3], [5.0; 3]),
        ]);
        assert!(validate(&mut s), "{}", s.report_text());
    }

    #[test]
    fn nan_vertex_is_reported_on_its_shell() {
        let cavity = cavity_shell([2.0; 3], [4.0; 3]);
        let vertices = cavity
            .vertices()
            .iter()
            .map(|p| {
                if *p == Point3::new(4.0, 4.0, 4.0) {
                    Point3::new(f64::NAN, 4.0, 4.0)
                } else {
                    *p
                }
            })
            .collect();
        let mut s = solid(vec![
            box_shell([0.0; 3], [10.0; 3]),
            Shell::new(vertices, cavity.faces().to_vec()),
        ]);
        assert!(!validate(&mut s));
        assert!(s.errors().is_empty());
        assert_eq!(codes(&s), vec![999]);
    }
}
