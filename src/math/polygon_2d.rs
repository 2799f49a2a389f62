use std::cmp::Ordering;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use super::exact::{orient_2d, ExactPoint2};

/// Twice the signed area of a polygon (shoelace formula), computed exactly.
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[ExactPoint2]) -> BigRational {
    let n = points.len();
    let mut sum = BigRational::zero();
    if n < 3 {
        return sum;
    }
    for i in 0..n {
        let j = (i + 1) % n;
        sum += &points[i].u * &points[j].v - &points[j].u * &points[i].v;
    }
    sum
}

/// Clips a convex `subject` polygon against a convex `clipper` polygon.
///
/// Both polygons may have either winding. The result may be degenerate
/// (fewer than three vertices or zero area) when the polygons only touch.
#[must_use]
pub fn clip_convex_2d(subject: &[ExactPoint2], clipper: &[ExactPoint2]) -> Vec<ExactPoint2> {
    let keep = if signed_area_2d(clipper).is_negative() {
        Ordering::Less
    } else {
        Ordering::Greater
    };

    let mut output = subject.to_vec();
    let n = clipper.len();
    for i in 0..n {
        if output.is_empty() {
            break;
        }
        let a = &clipper[i];
        let b = &clipper[(i + 1) % n];
        let input = std::mem::take(&mut output);
        let m = input.len();
        for k in 0..m {
            let cur = &input[k];
            let next = &input[(k + 1) % m];
            let s_cur = orient_2d(a, b, cur);
            let s_next = orient_2d(a, b, next);
            if s_cur != keep.reverse() {
                output.push(cur.clone());
            }
            if s_cur != Ordering::Equal && s_next != Ordering::Equal && s_cur != s_next {
                output.push(line_intersection(a, b, cur, next));
            }
        }
    }
    output
}

/// Intersection of segment `p`..`q` with the infinite line through `a`, `b`.
fn line_intersection(
    a: &ExactPoint2,
    b: &ExactPoint2,
    p: &ExactPoint2,
    q: &ExactPoint2,
) -> ExactPoint2 {
    let eu = &b.u - &a.u;
    let ev = &b.v - &a.v;
    let dp = &eu * (&p.v - &a.v) - &ev * (&p.u - &a.u);
    let dq = &eu * (&q.v - &a.v) - &ev * (&q.u - &a.u);
    let t = &dp / (&dp - dq);
    ExactPoint2::new(
        &p.u + (&q.u - &p.u) * &t,
        &p.v + (&q.v - &p.v) * &t,
    )
}

/// Closed point-in-triangle test: points on edges or corners count as inside.
#[must_use]
pub fn point_in_triangle_2d(p: &ExactPoint2, tri: &[ExactPoint2; 3]) -> bool {
    let d0 = orient_2d(&tri[0], &tri[1], p);
    let d1 = orient_2d(&tri[1], &tri[2], p);
    let d2 = orient_2d(&tri[2], &tri[0], p);
    let has_neg = [d0, d1, d2].contains(&Ordering::Less);
    let has_pos = [d0, d1, d2].contains(&Ordering::Greater);
    !(has_neg && has_pos)
}

/// Arithmetic mean of the vertices; strictly interior for a convex polygon
/// of positive area.
#[must_use]
pub fn centroid_2d(points: &[ExactPoint2]) -> Option<ExactPoint2> {
    if points.is_empty() {
        return None;
    }
    let mut u = BigRational::zero();
    let mut v = BigRational::zero();
    for p in points {
        u += &p.u;
        v += &p.v;
    }
    let n = BigRational::from_integer(BigInt::from(points.len()));
    Some(ExactPoint2::new(u / &n, v / n))
}

/// Axis-aligned bounds `(min_u, min_v, max_u, max_v)` of a point set.
#[must_use]
pub fn bounds_2d(
    points: &[ExactPoint2],
) -> Option<(BigRational, BigRational, BigRational, BigRational)> {
    let first = points.first()?;
    let (mut min_u, mut min_v) = (first.u.clone(), first.v.clone());
    let (mut max_u, mut max_v) = (first.u.clone(), first.v.clone());
    for p in &points[1..] {
        if p.u < min_u {
            min_u = p.u.clone();
        }
        if p.u > max_u {
            max_u = p.u.clone();
        }
        if p.v < min_v {
            min_v = p.v.clone();
        }
        if p.v > max_v {
            max_v = p.v.clone();
        }
    }
    Some((min_u, min_v, max_u, max_v))
}
