use std::fmt;

/// Validation error codes shared by solids and shells.
///
/// The numeric values are stable and appear verbatim in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    TooFewPoints,
    ConsecutivePointsSame,
    RingSelfIntersection,
    NonPlanarDistancePlane,
    NonPlanarNormalsDeviation,
    TooFewPolygons,
    ShellNotClosed,
    NonManifoldEdge,
    PolygonWrongOrientation,
    VerticesNotUsed,
    FaceAdjacentShells,
    OverlappingShells,
    InnerShellOutsideOuter,
    InteriorDisconnected,
    EmptyPrimitive,
    UnknownError,
}

impl ErrorCode {
    /// Every code, in ascending numeric order.
    pub const ALL: [ErrorCode; 16] = [
        Self::TooFewPoints,
        Self::ConsecutivePointsSame,
        Self::RingSelfIntersection,
        Self::NonPlanarDistancePlane,
        Self::NonPlanarNormalsDeviation,
        Self::TooFewPolygons,
        Self::ShellNotClosed,
        Self::NonManifoldEdge,
        Self::PolygonWrongOrientation,
        Self::VerticesNotUsed,
        Self::FaceAdjacentShells,
        Self::OverlappingShells,
        Self::InnerShellOutsideOuter,
        Self::InteriorDisconnected,
        Self::EmptyPrimitive,
        Self::UnknownError,
    ];

    /// The numeric code.
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::TooFewPoints => 101,
            Self::ConsecutivePointsSame => 102,
            Self::RingSelfIntersection => 104,
            Self::NonPlanarDistancePlane => 203,
            Self::NonPlanarNormalsDeviation => 204,
            Self::TooFewPolygons => 301,
            Self::ShellNotClosed => 302,
            Self::NonManifoldEdge => 304,
            Self::PolygonWrongOrientation => 307,
            Self::VerticesNotUsed => 309,
            Self::FaceAdjacentShells => 401,
            Self::OverlappingShells => 402,
            Self::InnerShellOutsideOuter => 403,
            Self::InteriorDisconnected => 404,
            Self::EmptyPrimitive => 902,
            Self::UnknownError => 999,
        }
    }

    /// Looks up a code by its numeric value.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Human-readable description used in reports.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::TooFewPoints => "TOO_FEW_POINTS",
            Self::ConsecutivePointsSame => "CONSECUTIVE_POINTS_SAME",
            Self::RingSelfIntersection => "RING_SELF_INTERSECTION",
            Self::NonPlanarDistancePlane => "NON_PLANAR_POLYGON_DISTANCE_PLANE",
            Self::NonPlanarNormalsDeviation => "NON_PLANAR_POLYGON_NORMALS_DEVIATION",
            Self::TooFewPolygons => "TOO_FEW_POLYGONS",
            Self::ShellNotClosed => "SHELL_NOT_CLOSED",
            Self::NonManifoldEdge => "NON_MANIFOLD_EDGE",
            Self::PolygonWrongOrientation => "POLYGON_WRONG_ORIENTATION",
            Self::VerticesNotUsed => "VERTICES_NOT_USED",
            Self::FaceAdjacentShells => "SHELLS_FACE_ADJACENT",
            Self::OverlappingShells => "SHELLS_OVERLAP",
            Self::InnerShellOutsideOuter => "INNER_SHELL_OUTSIDE_OUTER",
            Self::InteriorDisconnected => "INTERIOR_OF_SOLID_DISCONNECTED",
            Self::EmptyPrimitive => "EMPTY_PRIMITIVE",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
