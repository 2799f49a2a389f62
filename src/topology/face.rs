/// A planar polygonal face of a shell.
///
/// Rings are lists of indices into the shell's vertex array. The outer ring
/// runs counter-clockwise seen from outside the shell; inner rings (holes) run
/// the other way. Rings are implicitly closed: the last vertex connects back to
/// the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    /// The outer boundary ring.
    pub outer: Vec<usize>,
    /// Inner boundary rings (holes).
    pub inner: Vec<Vec<usize>>,
}

impl Face {
    /// Creates a face without holes.
    #[must_use]
    pub fn new(outer: Vec<usize>) -> Self {
        Self {
            outer,
            inner: Vec::new(),
        }
    }

    /// Creates a face with holes.
    #[must_use]
    pub fn with_holes(outer: Vec<usize>, inner: Vec<Vec<usize>>) -> Self {
        Self { outer, inner }
    }

    /// All rings, outer first.
    pub fn rings(&self) -> impl Iterator<Item = &[usize]> {
        std::iter::once(self.outer.as_slice()).chain(self.inner.iter().map(Vec::as_slice))
    }

    /// Directed edges of every ring as `(from, to)` vertex index pairs.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rings().flat_map(|ring| {
            let n = ring.len();
            (0..n).map(move |i| (ring[i], ring[(i + 1) % n]))
        })
    }
}
