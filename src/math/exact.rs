//! Exact rational geometry used by the boolean kernel.
//!
//! Every `f64` is a dyadic rational, so input coordinates convert without
//! loss. All predicates below are evaluated without rounding.

use std::cmp::Ordering;
use std::ops::Sub;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::error::KernelError;

use super::Point3;

/// An exact point in 3D space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExactPoint3 {
    pub x: BigRational,
    pub y: BigRational,
    pub z: BigRational,
}

/// An exact vector in 3D space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactVector3 {
    pub x: BigRational,
    pub y: BigRational,
    pub z: BigRational,
}

/// Converts a finite `f64` into the rational with the same value.
///
/// # Errors
///
/// Returns an error for NaN and infinities.
pub fn rational(value: f64) -> Result<BigRational, KernelError> {
    BigRational::from_float(value).ok_or(KernelError::NonFiniteCoordinate(value))
}

impl ExactPoint3 {
    #[must_use]
    pub fn new(x: BigRational, y: BigRational, z: BigRational) -> Self {
        Self { x, y, z }
    }

    /// Converts a floating-point point exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if any coordinate is not finite.
    pub fn from_point(p: &Point3) -> Result<Self, KernelError> {
        Ok(Self::new(rational(p.x)?, rational(p.y)?, rational(p.z)?))
    }

    /// Returns the coordinate along `axis` (0 = x, 1 = y, 2 = z).
    #[must_use]
    pub fn coord(&self, axis: usize) -> &BigRational {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }

    /// Drops the coordinate along `axis`, keeping the other two in cyclic order.
    #[must_use]
    pub fn project(&self, axis: usize) -> ExactPoint2 {
        match axis {
            0 => ExactPoint2::new(self.y.clone(), self.z.clone()),
            1 => ExactPoint2::new(self.z.clone(), self.x.clone()),
            _ => ExactPoint2::new(self.x.clone(), self.y.clone()),
        }
    }

    /// Arithmetic mean of a non-empty set of points.
    #[must_use]
    pub fn centroid(points: &[ExactPoint3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut x = BigRational::zero();
        let mut y = BigRational::zero();
        let mut z = BigRational::zero();
        for p in points {
            x += &p.x;
            y += &p.y;
            z += &p.z;
        }
        let n = BigRational::from_integer(BigInt::from(points.len()));
        Some(Self::new(x / &n, y / &n, z / n))
    }

    /// Point on segment `self`..`other` at parameter `t`.
    #[must_use]
    pub fn lerp(&self, other: &ExactPoint3, t: &BigRational) -> Self {
        Self::new(
            &self.x + (&other.x - &self.x) * t,
            &self.y + (&other.y - &self.y) * t,
            &self.z + (&other.z - &self.z) * t,
        )
    }
}

impl Sub for &ExactPoint3 {
    type Output = ExactVector3;

    fn sub(self, rhs: &ExactPoint3) -> ExactVector3 {
        ExactVector3 {
            x: &self.x - &rhs.x,
            y: &self.y - &rhs.y,
            z: &self.z - &rhs.z,
        }
    }
}

impl ExactVector3 {
    #[must_use]
    pub fn dot(&self, other: &ExactVector3) -> BigRational {
        &self.x * &other.x + &self.y * &other.y + &self.z * &other.z
    }

    #[must_use]
    pub fn cross(&self, other: &ExactVector3) -> ExactVector3 {
        ExactVector3 {
            x: &self.y * &other.z - &self.z * &other.y,
            y: &self.z * &other.x - &self.x * &other.z,
            z: &self.x * &other.y - &self.y * &other.x,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero() && self.z.is_zero()
    }
}

/// An exact point in a coordinate plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactPoint2 {
    pub u: BigRational,
    pub v: BigRational,
}

impl ExactPoint2 {
    #[must_use]
    pub fn new(u: BigRational, v: BigRational) -> Self {
        Self { u, v }
    }
}

/// Orientation of `c` relative to the directed line `a -> b`.
///
/// `Greater` means `c` lies to the left (counter-clockwise turn).
#[must_use]
pub fn orient_2d(a: &ExactPoint2, b: &ExactPoint2, c: &ExactPoint2) -> Ordering {
    let det = (&b.u - &a.u) * (&c.v - &a.v) - (&b.v - &a.v) * (&c.u - &a.u);
    det.cmp(&BigRational::zero())
}

/// An exact oriented plane `a*x + b*y + c*z + d = 0`.
///
/// Planes built through [`ExactPlane::canonical`] are scaled so that the first
/// non-zero normal coefficient is exactly `1`, which makes geometrically equal
/// planes compare and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactPlane {
    a: BigRational,
    b: BigRational,
    c: BigRational,
    d: BigRational,
}

impl ExactPlane {
    /// Plane through three points, oriented by their winding.
    ///
    /// Returns `None` if the points are collinear.
    #[must_use]
    pub fn through(p0: &ExactPoint3, p1: &ExactPoint3, p2: &ExactPoint3) -> Option<Self> {
        let n = (p1 - p0).cross(&(p2 - p0));
        if n.is_zero() {
            return None;
        }
        let d = -(&n.x * &p0.x + &n.y * &p0.y + &n.z * &p0.z);
        Some(Self {
            a: n.x,
            b: n.y,
            c: n.z,
            d,
        })
    }

    /// Axis-aligned plane `coord(axis) = value`, with normal along `+axis`.
    #[must_use]
    pub fn axis_aligned(axis: usize, value: &BigRational) -> Self {
        let one = BigRational::one();
        let zero = BigRational::zero();
        let (a, b, c) = match axis {
            0 => (one, zero.clone(), zero),
            1 => (zero.clone(), one, zero),
            _ => (zero.clone(), zero, one),
        };
        Self {
            a,
            b,
            c,
            d: -value.clone(),
        }
    }

    /// Returns the canonical form of this plane and whether it was reversed.
    #[must_use]
    pub fn canonical(&self) -> (Self, bool) {
        let lead = [&self.a, &self.b, &self.c]
            .into_iter()
            .find(|v| !v.is_zero())
            .cloned()
            .unwrap_or_else(BigRational::one);
        let reversed = lead.is_negative();
        let plane = Self {
            a: &self.a / &lead,
            b: &self.b / &lead,
            c: &self.c / &lead,
            d: &self.d / &lead,
        };
        (plane, reversed)
    }

    /// Signed (unnormalized) distance of `p` from the plane.
    #[must_use]
    pub fn eval(&self, p: &ExactPoint3) -> BigRational {
        &self.a * &p.x + &self.b * &p.y + &self.c * &p.z + &self.d
    }

    /// Side of the plane on which `p` lies.
    #[must_use]
    pub fn side(&self, p: &ExactPoint3) -> Ordering {
        self.eval(p).cmp(&BigRational::zero())
    }

    /// Axis along which the normal has its largest magnitude.
    ///
    /// Dropping this axis projects the plane bijectively onto a coordinate
    /// plane.
    #[must_use]
    pub fn dominant_axis(&self) -> usize {
        let mags = [self.a.abs(), self.b.abs(), self.c.abs()];
        let mut axis = 0;
        for i in 1..3 {
            if mags[i] > mags[axis] {
                axis = i;
            }
        }
        axis
    }

    /// Intersection of the segment `p`..`q` with the plane.
    ///
    /// The endpoints must lie strictly on opposite sides.
    #[must_use]
    pub fn intersect_segment(&self, p: &ExactPoint3, q: &ExactPoint3) -> ExactPoint3 {
        let dp = self.eval(p);
        let dq = self.eval(q);
        let t = &dp / (&dp - dq);
        p.lerp(q, &t)
    }
}
