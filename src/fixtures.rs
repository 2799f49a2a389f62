use crate::math::Point3;
use crate::operations::boolean::ExactPolyhedron;
use crate::topology::{Face, Shell};

/// Corners of the box `[min, max]`; corner `x + 2y + 4z` takes `max` on the
/// axes whose bit is set.
pub fn box_vertices(min: [f64; 3], max: [f64; 3]) -> Vec<Point3> {
    (0..8)
        .map(|i| {
            let pick = |axis: usize| if (i >> axis) & 1 == 1 { max[axis] } else { min[axis] };
            Point3::new(pick(0), pick(1), pick(2))
        })
        .collect()
}

/// Quad faces of a box, counter-clockwise seen from outside.
pub fn box_faces() -> Vec<Face> {
    vec![
        Face::new(vec![0, 2, 3, 1]),
        Face::new(vec![4, 5, 7, 6]),
        Face::new(vec![0, 1, 5, 4]),
        Face::new(vec![2, 6, 7, 3]),
        Face::new(vec![0, 4, 6, 2]),
        Face::new(vec![1, 3, 7, 5]),
    ]
}

/// A closed box shell with outward orientation.
pub fn box_shell(min: [f64; 3], max: [f64; 3]) -> Shell {
    Shell::new(box_vertices(min, max), box_faces())
}

/// A box shell oriented inward, as cavities are.
pub fn cavity_shell(min: [f64; 3], max: [f64; 3]) -> Shell {
    let faces = box_faces()
        .into_iter()
        .map(|face| Face::new(face.outer.into_iter().rev().collect()))
        .collect();
    Shell::new(box_vertices(min, max), faces)
}

/// Tetrahedron with its right-angle corner at `origin` and legs of length
/// `edge` along the axes.
pub fn tetrahedron_shell(origin: [f64; 3], edge: f64) -> Shell {
    let [x, y, z] = origin;
    let vertices = vec![
        Point3::new(x, y, z),
        Point3::new(x + edge, y, z),
        Point3::new(x, y + edge, z),
        Point3::new(x, y, z + edge),
    ];
    let faces = vec![
        Face::new(vec![0, 2, 1]),
        Face::new(vec![0, 1, 3]),
        Face::new(vec![0, 3, 2]),
        Face::new(vec![1, 2, 3]),
    ];
    Shell::new(vertices, faces)
}

/// Regular octahedron `|x - cx| + |y - cy| + |z - cz| <= radius`.
pub fn octahedron_shell(center: [f64; 3], radius: f64) -> Shell {
    let [x, y, z] = center;
    let vertices = vec![
        Point3::new(x + radius, y, z),
        Point3::new(x - radius, y, z),
        Point3::new(x, y + radius, z),
        Point3::new(x, y - radius, z),
        Point3::new(x, y, z + radius),
        Point3::new(x, y, z - radius),
    ];
    let mut faces = Vec::with_capacity(8);
    for (px, sx) in [(0, 1), (1, -1)] {
        for (py, sy) in [(2, 1), (3, -1)] {
            for (pz, sz) in [(4, 1), (5, -1)] {
                if sx * sy * sz > 0 {
                    faces.push(Face::new(vec![px, py, pz]));
                } else {
                    faces.push(Face::new(vec![px, pz, py]));
                }
            }
        }
    }
    Shell::new(vertices, faces)
}

/// Extrudes a counter-clockwise `profile` in the xy plane from `z0` to `z1`.
pub fn extruded_shell(profile: &[[f64; 2]], z0: f64, z1: f64) -> Shell {
    let n = profile.len();
    let vertices = [z0, z1]
        .iter()
        .flat_map(|&z| profile.iter().map(move |&[x, y]| Point3::new(x, y, z)))
        .collect();
    let mut faces = vec![
        Face::new((0..n).rev().collect()),
        Face::new((n..2 * n).collect()),
    ];
    for i in 0..n {
        let j = (i + 1) % n;
        faces.push(Face::new(vec![i, j, n + j, n + i]));
    }
    Shell::new(vertices, faces)
}

/// Regular `sides`-gon prism around the vertical axis through `(cx, cy)`.
pub fn prism_shell(sides: usize, center: [f64; 2], radius: f64, z0: f64, z1: f64) -> Shell {
    let profile: Vec<[f64; 2]> = (0..sides)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let angle = std::f64::consts::TAU * i as f64 / sides as f64;
            [
                center[0] + radius * angle.cos(),
                center[1] + radius * angle.sin(),
            ]
        })
        .collect();
    extruded_shell(&profile, z0, z1)
}

#[allow(clippy::unwrap_used)]
pub fn exact_box(min: [f64; 3], max: [f64; 3]) -> ExactPolyhedron {
    ExactPolyhedron::from_shell(&box_shell(min, max)).unwrap()
}

/// Installs a test subscriber so `RUST_LOG` shows validation traces.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
