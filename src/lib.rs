//! Validation of 3D solids bounded by polygonal shells.
//!
//! A [`Solid`] is an outer [`Shell`] plus zero or more inner shells
//! (cavities). Validation checks every shell on its own, then uses an exact
//! boolean kernel to check that the shells fit together, and collects the
//! findings as numbered error codes that can be reported as XML or text.

pub mod config;
pub mod error;
pub mod math;
pub mod operations;
pub mod report;
pub mod tessellation;
pub mod topology;

#[cfg(test)]
mod fixtures;

pub use config::{Primitive3D, ValidationConfig};
pub use error::{Result, SolidError};
pub use report::ErrorCode;
pub use topology::{Face, IdGenerator, Shell, Solid, Validity};
