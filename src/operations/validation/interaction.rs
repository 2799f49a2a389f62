use tracing::{debug, info, warn};

use crate::error::Result;
use crate::operations::boolean::{ExactPolyhedron, PolyhedralSet, Subdivision};
use crate::report::ErrorCode;
use crate::topology::Shell;

/// One of the three conditions a multi-shell solid must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxiomViolation {
    /// Inner shell `inner` has material outside the outer shell.
    Containment { inner: usize },
    /// Inner shells `a` and `b` share volume.
    Overlap { a: usize, b: usize },
    /// After subtracting inner shell `inner`, the number of volumes differs
    /// from the expected count.
    VolumeCount {
        inner: usize,
        expected: usize,
        found: usize,
    },
}

/// An error localized to a pair of shells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairFinding {
    pub code: ErrorCode,
    pub shell_a: Option<usize>,
    pub shell_b: Option<usize>,
    pub info: String,
}

/// Result of a [`ShellInteraction`] check.
#[derive(Debug, Clone, Default)]
pub struct InteractionOutcome {
    /// Axioms that failed, in the order they were checked.
    pub violations: Vec<AxiomViolation>,
    /// Errors attributed to shell pairs; empty when no axiom failed.
    pub findings: Vec<PairFinding>,
}

impl InteractionOutcome {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Checks that an outer shell (index 0) and its inner shells form one solid.
///
/// All shells are converted to exact polyhedra and partitioned together, then
/// three axioms are tested:
///
/// 1. every inner shell lies inside the outer shell;
/// 2. no two inner shells share volume;
/// 3. subtracting the inner shells one by one from the outer shell adds
///    exactly one volume each time.
///
/// When an axiom fails, a diagnosis pass attributes error codes 401 to 404 to
/// the shell pairs responsible.
pub struct ShellInteraction<'a> {
    shells: &'a [Shell],
}

impl<'a> ShellInteraction<'a> {
    /// Creates a new `ShellInteraction` check.
    #[must_use]
    pub fn new(shells: &'a [Shell]) -> Self {
        Self { shells }
    }

    /// Executes the check.
    ///
    /// # Errors
    ///
    /// Returns an error if a shell cannot be converted to exact arithmetic or
    /// the exact kernel fails on it.
    pub fn execute(&self) -> Result<InteractionOutcome> {
        if self.shells.len() < 2 {
            return Ok(InteractionOutcome::default());
        }
        info!(shells = self.shells.len(), "inspecting shell interactions");

        let polyhedra = self
            .shells
            .iter()
            .map(ExactPolyhedron::from_shell)
            .collect::<Result<Vec<_>>>()?;
        let space = Subdivision::build(&polyhedra)?;
        let sets: Vec<PolyhedralSet<'_>> = (0..self.shells.len())
            .map(|k| space.shell_set(k))
            .collect();

        let violations = check_axioms(&sets);
        if violations.is_empty() {
            return Ok(InteractionOutcome::default());
        }
        for violation in &violations {
            warn!(?violation, "axiom violated");
        }
        let findings = diagnose(&sets);
        Ok(InteractionOutcome {
            violations,
            findings,
        })
    }
}

fn check_axioms(sets: &[PolyhedralSet<'_>]) -> Vec<AxiomViolation> {
    let mut violations = Vec::new();
    let outer = &sets[0];
    let inner = &sets[1..];

    let outside = outer.complement();
    for (i, set) in inner.iter().enumerate() {
        if !outside.intersection(set).is_empty() {
            violations.push(AxiomViolation::Containment { inner: i + 1 });
        }
    }

    for (i, a) in inner.iter().enumerate() {
        for (j, b) in inner.iter().enumerate().skip(i + 1) {
            if a.intersection(b).has_volume() {
                violations.push(AxiomViolation::Overlap { a: i + 1, b: j + 1 });
            }
        }
    }

    let mut solid = outer.clone();
    let mut expected = 2;
    for (i, set) in inner.iter().enumerate() {
        solid = solid.difference(set).regularization();
        expected += 1;
        let found = solid.number_of_volumes();
        debug!(inner = i + 1, expected, found, "volume count");
        if found != expected {
            violations.push(AxiomViolation::VolumeCount {
                inner: i + 1,
                expected,
                found,
            });
            break;
        }
    }
    violations
}

fn diagnose(sets: &[PolyhedralSet<'_>]) -> Vec<PairFinding> {
    let mut findings = Vec::new();
    let outer = &sets[0];

    for (i, inner) in sets.iter().enumerate().skip(1) {
        let pair = |code, info: &str| PairFinding {
            code,
            shell_a: Some(0),
            shell_b: Some(i),
            info: info.to_string(),
        };
        if inner.is_subset(outer) {
            let volumes = outer.difference(inner).regularization().number_of_volumes();
            if volumes < 3 {
                findings.push(pair(
                    ErrorCode::FaceAdjacentShells,
                    "inner shell touches the outer shell along a face",
                ));
            } else if volumes > 3 {
                findings.push(pair(
                    ErrorCode::InteriorDisconnected,
                    "inner shell splits the interior of the solid",
                ));
            }
        } else if interiors_overlap(outer, inner) {
            findings.push(pair(
                ErrorCode::OverlappingShells,
                "inner shell overlaps the outer shell",
            ));
        } else {
            findings.push(pair(
                ErrorCode::InnerShellOutsideOuter,
                "inner shell lies outside the outer shell",
            ));
            if !outer.intersection(inner).is_empty() {
                findings.push(pair(
                    ErrorCode::FaceAdjacentShells,
                    "inner shell touches the outer shell along a face",
                ));
            }
        }
    }

    for (i, a) in sets.iter().enumerate().skip(1) {
        for (j, b) in sets.iter().enumerate().skip(i + 1) {
            let pair = |code, info: &str| PairFinding {
                code,
                shell_a: Some(i),
                shell_b: Some(j),
                info: info.to_string(),
            };
            if interiors_overlap(a, b) {
                findings.push(pair(ErrorCode::OverlappingShells, "inner shells overlap"));
            } else if !a.intersection(b).is_empty() {
                findings.push(pair(
                    ErrorCode::FaceAdjacentShells,
                    "inner shells touch along a face",
                ));
            }
        }
    }

    if findings.is_empty() {
        findings.push(PairFinding {
            code: ErrorCode::InteriorDisconnected,
            shell_a: None,
            shell_b: None,
            info: "interior of the solid is disconnected".into(),
        });
    }
    findings
}

fn interiors_overlap(a: &PolyhedralSet<'_>, b: &PolyhedralSet<'_>) -> bool {
    a.interior().intersection(&b.interior()).has_volume()
}
