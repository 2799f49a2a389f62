/// The kind of 3D primitive being validated.
///
/// Only [`Primitive3D::Solid`] requires shells to be closed and consistently
/// oriented; surface primitives are checked ring by ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Primitive3D {
    #[default]
    Solid,
    CompositeSurface,
    MultiSurface,
}

impl Primitive3D {
    /// Whether shells of this primitive must bound a volume.
    #[must_use]
    pub fn requires_closed_shells(self) -> bool {
        matches!(self, Self::Solid)
    }
}

/// Parameters controlling validation.
#[derive(Debug, Clone, Copy)]
pub struct ValidationConfig {
    /// The kind of primitive the shells describe.
    pub primitive: Primitive3D,
    /// Maximum distance between a face vertex and the face's fitted plane.
    pub planarity_d2p: f64,
    /// Maximum angle, in degrees, between triangle normals of one face.
    pub planarity_normals: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            primitive: Primitive3D::Solid,
            planarity_d2p: 0.01,
            planarity_normals: 1.0,
        }
    }
}

impl ValidationConfig {
    /// Sets the primitive kind.
    #[must_use]
    pub fn with_primitive(mut self, primitive: Primitive3D) -> Self {
        self.primitive = primitive;
        self
    }

    /// Sets the distance-to-plane tolerance.
    #[must_use]
    pub fn with_planarity_d2p(mut self, tolerance: f64) -> Self {
        self.planarity_d2p = tolerance;
        self
    }

    /// Sets the normal deviation tolerance, in degrees.
    #[must_use]
    pub fn with_planarity_normals(mut self, degrees: f64) -> Self {
        self.planarity_normals = degrees;
        self
    }
}
