//! Uniform-grid neighbor lookup over a fixed point set.
//!
//! Points are binned into cubic cells with per-cell linked lists (`head`/`next`), so
//! fixed-radius queries only visit cells overlapping the query sphere.

use super::boundary::Boundary;
use nalgebra::{Point3, Vector3};

const SENTINEL: u32 = u32::MAX;
const MIN_CELL_SIZE: f64 = 2.0;
const PADDING: f64 = 1e-6;

/// Result of a radius query: local point indices and squared distances, in visit order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lookup3DResult {
    pub indices: Vec<u32>,
    pub squared_distances: Vec<f64>,
}

impl Lookup3DResult {
    pub fn count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.indices
            .iter()
            .copied()
            .zip(self.squared_distances.iter().copied())
    }

    fn push(&mut self, index: u32, sq_dist: f64) {
        self.indices.push(index);
        self.squared_distances.push(sq_dist);
    }
}

#[derive(Debug, Clone)]
pub struct GridLookup3D {
    positions: Vec<Point3<f64>>,
    radii: Option<Vec<f64>>,
    max_radius: f64,
    cell_size: f64,
    origin: Point3<f64>,
    dims: Vector3<usize>,
    head: Vec<u32>,
    next: Vec<u32>,
    boundary: Boundary,
}

impl GridLookup3D {
    pub fn new(positions: Vec<Point3<f64>>) -> Self {
        Self::build(positions, None)
    }

    /// A lookup whose queries match points whose sphere of the given radius touches the query.
    pub fn with_radii(positions: Vec<Point3<f64>>, radii: Vec<f64>) -> Self {
        debug_assert_eq!(positions.len(), radii.len());
        Self::build(positions, Some(radii))
    }

    fn build(positions: Vec<Point3<f64>>, radii: Option<Vec<f64>>) -> Self {
        let boundary = Boundary::from_points(&positions, radii.as_deref());
        let max_radius = radii
            .as_deref()
            .map_or(0.0, |r| r.iter().copied().fold(0.0, f64::max));
        let n = positions.len();

        let min = boundary.bbox.min;
        let extent = boundary.bbox.max - min + Vector3::repeat(PADDING);
        let volume = extent.x * extent.y * extent.z;
        let cell_size = if n == 0 {
            MIN_CELL_SIZE
        } else {
            (volume / n as f64).cbrt().max(MIN_CELL_SIZE)
        };

        let dims = if n == 0 {
            Vector3::zeros()
        } else {
            Vector3::new(
                ((extent.x / cell_size).ceil() as usize).max(1),
                ((extent.y / cell_size).ceil() as usize).max(1),
                ((extent.z / cell_size).ceil() as usize).max(1),
            )
        };

        let mut head = vec![SENTINEL; dims.x * dims.y * dims.z];
        let mut next = vec![SENTINEL; n];
        for (i, p) in positions.iter().enumerate() {
            let (x, y, z) = Self::cell_coords(p, &min, cell_size, &dims);
            let cell = x + y * dims.x + z * dims.x * dims.y;
            next[i] = head[cell];
            head[cell] = i as u32;
        }

        Self {
            positions,
            radii,
            max_radius,
            cell_size,
            origin: min,
            dims,
            head,
            next,
            boundary,
        }
    }

    fn cell_coords(
        p: &Point3<f64>,
        origin: &Point3<f64>,
        cell_size: f64,
        dims: &Vector3<usize>,
    ) -> (usize, usize, usize) {
        let o = p - origin;
        let clamp = |v: f64, d: usize| ((v / cell_size).floor().max(0.0) as usize).min(d - 1);
        (clamp(o.x, dims.x), clamp(o.y, dims.y), clamp(o.z, dims.z))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn position(&self, index: u32) -> &Point3<f64> {
        &self.positions[index as usize]
    }

    /// Visits every point within `radius` of `(x, y, z)` (plus the point's own radius, if any).
    fn visit(&self, x: f64, y: f64, z: f64, radius: f64, mut f: impl FnMut(u32, f64) -> bool) {
        if self.positions.is_empty() || radius < 0.0 {
            return;
        }
        let reach = radius + self.max_radius;
        let center = Point3::new(x, y, z);
        let lo = center - Vector3::repeat(reach);
        let hi = center + Vector3::repeat(reach);
        if hi.x < self.boundary.bbox.min.x
            || hi.y < self.boundary.bbox.min.y
            || hi.z < self.boundary.bbox.min.z
            || lo.x > self.boundary.bbox.max.x
            || lo.y > self.boundary.bbox.max.y
            || lo.z > self.boundary.bbox.max.z
        {
            return;
        }
        let (x0, y0, z0) = Self::cell_coords(&lo, &self.origin, self.cell_size, &self.dims);
        let (x1, y1, z1) = Self::cell_coords(&hi, &self.origin, self.cell_size, &self.dims);

        for cz in z0..=z1 {
            for cy in y0..=y1 {
                for cx in x0..=x1 {
                    let mut i = self.head[cx + cy * self.dims.x + cz * self.dims.x * self.dims.y];
                    while i != SENTINEL {
                        let d2 = nalgebra::distance_squared(&center, &self.positions[i as usize]);
                        let r = radius + self.radii.as_ref().map_or(0.0, |r| r[i as usize]);
                        if d2 <= r * r && !f(i, d2) {
                            return;
                        }
                        i = self.next[i as usize];
                    }
                }
            }
        }
    }

    pub fn find(&self, x: f64, y: f64, z: f64, radius: f64) -> Lookup3DResult {
        let mut result = Lookup3DResult::default();
        self.visit(x, y, z, radius, |i, d2| {
            result.push(i, d2);
            true
        });
        result
    }

    /// Whether any point lies within `radius` of `(x, y, z)`.
    pub fn check(&self, x: f64, y: f64, z: f64, radius: f64) -> bool {
        let mut found = false;
        self.visit(x, y, z, radius, |_, _| {
            found = true;
            false
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(points: &[Point3<f64>], q: Point3<f64>, r: f64) -> Vec<u32> {
        let mut out: Vec<u32> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| nalgebra::distance_squared(p, &q) <= r * r)
            .map(|(i, _)| i as u32)
            .collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn find_on_empty_lookup_returns_nothing() {
        let grid = GridLookup3D::new(Vec::new());
        assert_eq!(grid.find(0.0, 0.0, 0.0, 10.0).count(), 0);
        assert!(!grid.check(0.0, 0.0, 0.0, 10.0));
    }

    #[test]
    fn find_on_single_point() {
        let grid = GridLookup3D::new(vec![Point3::new(1.0, 2.0, 3.0)]);
        let hit = grid.find(1.0, 2.0, 4.0, 1.0);
        assert_eq!(hit.indices, vec![0]);
        assert!((hit.squared_distances[0] - 1.0).abs() < 1e-12);
        assert_eq!(grid.find(1.0, 2.0, 4.5, 1.0).count(), 0);
    }

    #[test]
    fn find_matches_brute_force_on_lattice() {
        let mut points = Vec::new();
        for i in 0..6 {
            for j in 0..6 {
                for k in 0..6 {
                    points.push(Point3::new(i as f64 * 1.3, j as f64 * 0.9, k as f64 * 1.7));
                }
            }
        }
        let grid = GridLookup3D::new(points.clone());
        for (q, r) in [
            (Point3::new(2.0, 2.0, 2.0), 1.5),
            (Point3::new(0.0, 0.0, 0.0), 3.0),
            (Point3::new(-5.0, 1.0, 1.0), 2.0),
            (Point3::new(6.5, 4.5, 8.5), 2.2),
        ] {
            let mut found = grid.find(q.x, q.y, q.z, r).indices;
            found.sort_unstable();
            assert_eq!(found, brute_force(&points, q, r));
        }
    }

    #[test]
    fn radii_extend_the_match_distance() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)];
        let grid = GridLookup3D::with_radii(points, vec![0.5, 3.0]);
        let mut hit = grid.find(6.5, 0.0, 0.0, 1.0).indices;
        hit.sort_unstable();
        assert_eq!(hit, vec![1]);
        assert!(grid.check(1.2, 0.0, 0.0, 1.0));
    }

    #[test]
    fn duplicate_points_are_all_reported() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let grid = GridLookup3D::new(vec![p, p, p]);
        assert_eq!(grid.find(1.0, 1.0, 1.0, 0.1).count(), 3);
    }
}
