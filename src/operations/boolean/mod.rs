//! Exact boolean geometry on closed polyhedral shells.
//!
//! All shells of a solid are converted to exact rational triangles and
//! partitioned together into one [`Subdivision`]; each shell then becomes a
//! [`PolyhedralSet`] over that subdivision, and boolean operations reduce to
//! set operations on cells and facets.

mod assemble;
mod classify;
mod polyhedron;
mod select;
mod set;
mod split;

pub use assemble::{Cell, CellId, Facet, FacetId, Subdivision};
pub use polyhedron::ExactPolyhedron;
pub use select::BooleanOp;
pub use set::PolyhedralSet;
