mod face;
mod shell;
mod solid;

pub use face::Face;
pub use shell::Shell;
pub use solid::{IdGenerator, Solid, Validity};
