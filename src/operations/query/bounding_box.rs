use crate::math::Point3;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Grows the box to include `point`.
    pub fn expand(&mut self, point: &Point3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }
}

/// Computes the axis-aligned bounding box of a point set.
pub struct BoundingBox<'a> {
    points: &'a [Point3],
}

impl<'a> BoundingBox<'a> {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(points: &'a [Point3]) -> Self {
        Self { points }
    }

    /// Executes the query, returning `None` for an empty point set.
    #[must_use]
    pub fn execute(&self) -> Option<Aabb> {
        let (first, rest) = self.points.split_first()?;
        let mut aabb = Aabb {
            min: *first,
            max: *first,
        };
        for p in rest {
            aabb.expand(p);
        }
        Some(aabb)
    }
}
