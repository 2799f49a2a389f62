mod tessellate_face;

pub use tessellate_face::{ring_points, TessellateFace};
