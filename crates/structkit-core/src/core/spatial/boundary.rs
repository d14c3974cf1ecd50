use crate::core::math::{max_axis_scale, transform_point};
use nalgebra::{Matrix4, Point3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3D {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Box3D {
    pub fn empty() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::origin(),
        }
    }

    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn volume(&self) -> f64 {
        let e = self.extent();
        e.x * e.y * e.z
    }

    pub fn contains(&self, p: &Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.y >= self.min.y
            && p.z >= self.min.z
            && p.x <= self.max.x
            && p.y <= self.max.y
            && p.z <= self.max.z
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere3D {
    pub center: Point3<f64>,
    pub radius: f64,
}

impl Sphere3D {
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Whether the two spheres overlap after growing both by `margin / 2`.
    pub fn overlaps(&self, other: &Sphere3D, margin: f64) -> bool {
        let reach = self.radius + other.radius + margin;
        nalgebra::distance_squared(&self.center, &other.center) <= reach * reach
    }

    /// Image of the sphere under an affine transform; the radius is scaled conservatively.
    pub fn transform(&self, m: &Matrix4<f64>) -> Sphere3D {
        Sphere3D {
            center: transform_point(m, &self.center),
            radius: self.radius * max_axis_scale(m),
        }
    }
}

/// Axis-aligned box plus enclosing sphere of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub bbox: Box3D,
    pub sphere: Sphere3D,
}

impl Boundary {
    pub fn empty() -> Self {
        Self {
            bbox: Box3D::empty(),
            sphere: Sphere3D::new(Point3::origin(), 0.0),
        }
    }

    /// Computes the boundary of `points`, inflating by per-point radii when given.
    pub fn from_points(points: &[Point3<f64>], radii: Option<&[f64]>) -> Self {
        if points.is_empty() {
            return Self::empty();
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        let mut sum = Vector3::zeros();
        for (i, p) in points.iter().enumerate() {
            let r = radii.map_or(0.0, |r| r[i]);
            let rv = Vector3::new(r, r, r);
            min = min.inf(&(p - rv));
            max = max.sup(&(p + rv));
            sum += p.coords;
        }
        let center = Point3::from(sum / points.len() as f64);

        let radius = points
            .iter()
            .enumerate()
            .map(|(i, p)| nalgebra::distance(&center, p) + radii.map_or(0.0, |r| r[i]))
            .fold(0.0, f64::max);

        Self {
            bbox: Box3D { min, max },
            sphere: Sphere3D::new(center, radius),
        }
    }

    pub fn from_spheres(spheres: &[Sphere3D]) -> Self {
        let centers: Vec<_> = spheres.iter().map(|s| s.center).collect();
        let radii: Vec<_> = spheres.iter().map(|s| s.radius).collect();
        Self::from_points(&centers, Some(&radii))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_of_empty_set_is_degenerate() {
        let b = Boundary::from_points(&[], None);
        assert_eq!(b.sphere.radius, 0.0);
        assert_eq!(b.bbox.volume(), 0.0);
    }

    #[test]
    fn boundary_encloses_all_points() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 1.0),
        ];
        let b = Boundary::from_points(&points, None);
        for p in &points {
            assert!(b.bbox.contains(p));
            assert!(nalgebra::distance(&b.sphere.center, p) <= b.sphere.radius + 1e-12);
        }
        assert_eq!(b.bbox.max, Point3::new(4.0, 3.0, 1.0));
    }

    #[test]
    fn radii_inflate_boundary() {
        let points = vec![Point3::new(1.0, 1.0, 1.0)];
        let b = Boundary::from_points(&points, Some(&[2.0]));
        assert_eq!(b.sphere.radius, 2.0);
        assert_eq!(b.bbox.min, Point3::new(-1.0, -1.0, -1.0));
    }

    #[test]
    fn sphere_overlap_honors_margin() {
        let a = Sphere3D::new(Point3::origin(), 1.0);
        let b = Sphere3D::new(Point3::new(5.0, 0.0, 0.0), 1.0);
        assert!(!a.overlaps(&b, 2.0));
        assert!(a.overlaps(&b, 3.0));
    }

    #[test]
    fn sphere_transform_moves_center() {
        let mut m = Matrix4::identity();
        m[(0, 3)] = 10.0;
        let s = Sphere3D::new(Point3::new(1.0, 2.0, 3.0), 1.5).transform(&m);
        assert_eq!(s.center, Point3::new(11.0, 2.0, 3.0));
        assert!((s.radius - 1.5).abs() < 1e-12);
    }
}
