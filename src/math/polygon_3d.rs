use crate::error::GeometryError;

use super::plane::Plane;
use super::{Point3, Vector3};

/// Newell's normal of a (possibly non-planar) polygon.
///
/// The length equals twice the area of the projected polygon; the direction
/// follows the winding of the vertices.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Best-fitting plane of a polygon: Newell's normal through the centroid.
///
/// The normal is computed on centroid-relative coordinates, and a polygon is
/// degenerate only relative to its own extent, so small faces far from the
/// origin keep their plane.
///
/// # Errors
///
/// Returns an error if the polygon has no area (collinear or repeated points).
pub fn best_fit_plane(points: &[Point3]) -> Result<Plane, GeometryError> {
    if points.len() < 3 {
        return Err(GeometryError::Degenerate(format!(
            "polygon has {} points",
            points.len()
        )));
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    #[allow(clippy::cast_precision_loss)]
    let count = points.len() as f64;
    let centroid = Point3::from(sum / count);

    let local: Vec<Point3> = points.iter().map(|p| Point3::from(p - centroid)).collect();
    let extent = local
        .iter()
        .map(|p| p.coords.norm())
        .fold(0.0_f64, f64::max);
    let normal = newell_normal(&local);
    let length = normal.norm();
    if length.is_nan() || length <= count * f64::EPSILON * extent * extent {
        return Err(GeometryError::Degenerate("polygon has no area".into()));
    }
    Plane::from_normal(centroid, normal / length)
}

/// Unit normal of triangle `a`, `b`, `c`, or `None` if it is degenerate.
#[must_use]
pub fn triangle_normal(a: &Point3, b: &Point3, c: &Point3) -> Option<Vector3> {
    (b - a).cross(&(c - a)).try_normalize(f64::EPSILON)
}
