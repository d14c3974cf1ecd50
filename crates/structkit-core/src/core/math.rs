use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Tolerance used for matrix comparisons and rigid-transform checks.
pub const EPSILON: f64 = 1e-6;

/// Applies the affine part of `m` to `(x, y, z)` without the projective divide.
#[inline]
pub fn apply_affine(m: &Matrix4<f64>, x: f64, y: f64, z: f64) -> Point3<f64> {
    Point3::new(
        m[(0, 0)] * x + m[(0, 1)] * y + m[(0, 2)] * z + m[(0, 3)],
        m[(1, 0)] * x + m[(1, 1)] * y + m[(1, 2)] * z + m[(1, 3)],
        m[(2, 0)] * x + m[(2, 1)] * y + m[(2, 2)] * z + m[(2, 3)],
    )
}

#[inline]
pub fn transform_point(m: &Matrix4<f64>, p: &Point3<f64>) -> Point3<f64> {
    apply_affine(m, p.x, p.y, p.z)
}

pub fn approx_eq(a: &Matrix4<f64>, b: &Matrix4<f64>, eps: f64) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= eps)
}

pub fn is_identity(m: &Matrix4<f64>, eps: f64) -> bool {
    approx_eq(m, &Matrix4::identity(), eps)
}

pub fn from_rotation_translation(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Matrix4<f64> {
    let mut m = Matrix4::identity();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
    m.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
    m
}

pub fn translation(m: &Matrix4<f64>) -> Vector3<f64> {
    Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

/// Checks that `m` is a proper rotation followed by a translation.
///
/// The bottom row must be `(0, 0, 0, 1)`, the upper-left block orthonormal and its
/// determinant `+1`, all within `eps`.
pub fn is_rotation_and_translation(m: &Matrix4<f64>, eps: f64) -> bool {
    if m[(3, 0)].abs() > eps || m[(3, 1)].abs() > eps || m[(3, 2)].abs() > eps {
        return false;
    }
    if (m[(3, 3)] - 1.0).abs() > eps {
        return false;
    }
    let r: Matrix3<f64> = m.fixed_view::<3, 3>(0, 0).into_owned();
    let rtr = r.transpose() * r;
    let orthonormal = rtr
        .iter()
        .zip(Matrix3::<f64>::identity().iter())
        .all(|(a, b)| (a - b).abs() <= eps);
    orthonormal && (r.determinant() - 1.0).abs() <= eps
}

/// Inverse of an affine matrix; falls back to the pseudo-inverse for singular input.
pub fn affine_inverse(m: &Matrix4<f64>) -> Matrix4<f64> {
    if let Some(inv) = m.try_inverse() {
        return inv;
    }
    tracing::warn!("Singular operator matrix; using pseudo-inverse.");
    m.pseudo_inverse(EPSILON).unwrap_or_else(|_| Matrix4::identity())
}

/// Largest scaling applied by the linear part of `m` along any axis.
pub fn max_axis_scale(m: &Matrix4<f64>) -> f64 {
    (0..3)
        .map(|c| Vector3::new(m[(0, c)], m[(1, c)], m[(2, c)]).norm())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Rotation3;

    #[test]
    fn apply_affine_rotates_and_translates() {
        let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        let m = from_rotation_translation(rot.matrix(), &Vector3::new(1.0, 0.0, 0.0));
        let p = apply_affine(&m, 1.0, 0.0, 0.0);
        assert!((p - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn identity_is_detected_within_epsilon() {
        let mut m = Matrix4::identity();
        m[(0, 3)] = 1e-9;
        assert!(is_identity(&m, EPSILON));
        m[(0, 3)] = 1e-3;
        assert!(!is_identity(&m, EPSILON));
    }

    #[test]
    fn rigid_check_accepts_rotation_and_rejects_scaling() {
        let rot = Rotation3::from_euler_angles(0.3, -0.2, 1.1);
        let m = from_rotation_translation(rot.matrix(), &Vector3::new(4.0, -2.0, 7.5));
        assert!(is_rotation_and_translation(&m, EPSILON));

        let mut scaled = m;
        scaled[(0, 0)] *= 2.0;
        assert!(!is_rotation_and_translation(&scaled, EPSILON));

        let mut mirrored = Matrix4::identity();
        mirrored[(0, 0)] = -1.0;
        assert!(!is_rotation_and_translation(&mirrored, EPSILON));

        let mut projective = Matrix4::identity();
        projective[(3, 0)] = 0.5;
        assert!(!is_rotation_and_translation(&projective, EPSILON));
    }

    #[test]
    fn affine_inverse_round_trips_points() {
        let rot = Rotation3::from_euler_angles(0.1, 0.2, 0.3);
        let m = from_rotation_translation(rot.matrix(), &Vector3::new(1.0, 2.0, 3.0));
        let inv = affine_inverse(&m);
        let p = Point3::new(-3.0, 4.5, 0.25);
        let back = transform_point(&inv, &transform_point(&m, &p));
        assert!((back - p).norm() < 1e-9);
    }
}
