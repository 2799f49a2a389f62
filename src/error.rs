use thiserror::Error;

/// Top-level error type for solid validation.
#[derive(Debug, Error)]
pub enum SolidError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Errors related to floating-point face geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("vertex index {index} out of range (shell has {count} vertices)")]
    VertexOutOfRange { index: usize, count: usize },

    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

/// Errors raised by the exact boolean-geometry kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("coordinate {0} cannot be represented exactly")]
    NonFiniteCoordinate(f64),

    #[error("inconsistent classification of cell against shell {shell}")]
    InconsistentClassification { shell: usize },

    #[error("subdivision failed: {0}")]
    Subdivision(String),
}

/// Convenience type alias for results using [`SolidError`].
pub type Result<T> = std::result::Result<T, SolidError>;
