use crate::core::math::{
    EPSILON, affine_inverse, apply_affine, approx_eq, from_rotation_translation, is_identity,
    is_rotation_and_translation,
};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Name of the identity operator.
pub const DEFAULT_OPERATOR_NAME: &str = "1_555";

/// Assembly descriptor carried by operators produced from an assembly generator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssemblyInfo {
    pub id: String,
    pub oper_id: i32,
    pub oper_list: Vec<String>,
}

/// Optional metadata accepted by [`SymmetryOperator::create`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperatorInfo {
    pub assembly: Option<AssemblyInfo>,
    pub ncs_id: Option<i32>,
    pub hkl: Option<Vector3<i32>>,
    pub spgr_op: Option<i32>,
    pub key: Option<i32>,
}

/// An affine transform with crystallographic or assembly identity.
///
/// `key` distinguishes operators with identical matrices applied to different sites;
/// `-1` means the operator cannot be matched against index-pair tables.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryOperator {
    pub name: String,
    pub matrix: Matrix4<f64>,
    pub inverse: Matrix4<f64>,
    pub is_identity: bool,
    pub key: i32,
    pub assembly: Option<AssemblyInfo>,
    pub ncs_id: Option<i32>,
    pub hkl: Vector3<i32>,
    pub spgr_op: Option<i32>,
}

impl Default for SymmetryOperator {
    fn default() -> Self {
        Self {
            name: DEFAULT_OPERATOR_NAME.to_string(),
            matrix: Matrix4::identity(),
            inverse: Matrix4::identity(),
            is_identity: true,
            key: -1,
            assembly: None,
            ncs_id: None,
            hkl: Vector3::zeros(),
            spgr_op: None,
        }
    }
}

impl SymmetryOperator {
    pub fn create(name: impl Into<String>, matrix: Matrix4<f64>, info: OperatorInfo) -> Self {
        let inverse = affine_inverse(&matrix);
        Self {
            name: name.into(),
            is_identity: is_identity(&matrix, EPSILON),
            matrix,
            inverse,
            key: info.key.unwrap_or(-1),
            assembly: info.assembly,
            ncs_id: info.ncs_id,
            hkl: info.hkl.unwrap_or_else(Vector3::zeros),
            spgr_op: info.spgr_op,
        }
    }

    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self::create("", matrix, OperatorInfo::default())
    }

    pub fn from_rotation_and_offset(
        rotation: &Matrix3<f64>,
        offset: &Vector3<f64>,
        name: impl Into<String>,
    ) -> Self {
        Self::create(
            name,
            from_rotation_translation(rotation, offset),
            OperatorInfo::default(),
        )
    }

    pub fn with_key(mut self, key: i32) -> Self {
        self.key = key;
        self
    }

    /// Whether the operator carries no identity beyond its matrix.
    fn is_bare(&self) -> bool {
        self.key == -1
            && self.assembly.is_none()
            && self.ncs_id.is_none()
            && self.spgr_op.is_none()
            && self.hkl == Vector3::zeros()
            && (self.name.is_empty() || self.name == DEFAULT_OPERATOR_NAME)
    }

    /// Composes two operators; the resulting matrix is `outer · inner`, so `inner` applies first.
    ///
    /// Metadata comes from `outer` unless it is bare (see `is_bare`), in which case
    /// `inner`'s identity is preserved. The key is `outer`'s unless it is `-1`.
    pub fn compose(outer: &SymmetryOperator, inner: &SymmetryOperator) -> SymmetryOperator {
        let matrix = outer.matrix * inner.matrix;
        let inverse = inner.inverse * outer.inverse;
        let source = if outer.is_bare() { inner } else { outer };
        SymmetryOperator {
            name: source.name.clone(),
            is_identity: is_identity(&matrix, EPSILON),
            matrix,
            inverse,
            key: if outer.key != -1 { outer.key } else { inner.key },
            assembly: source.assembly.clone().or_else(|| inner.assembly.clone()),
            ncs_id: source.ncs_id.or(inner.ncs_id),
            hkl: if source.hkl != Vector3::zeros() {
                source.hkl
            } else {
                inner.hkl
            },
            spgr_op: source.spgr_op.or(inner.spgr_op),
        }
    }

    /// Matrix equality within [`EPSILON`].
    pub fn approx_eq(&self, other: &SymmetryOperator) -> bool {
        approx_eq(&self.matrix, &other.matrix, EPSILON)
    }

    #[inline]
    pub fn apply(&self, x: f64, y: f64, z: f64) -> Point3<f64> {
        if self.is_identity {
            return Point3::new(x, y, z);
        }
        apply_affine(&self.matrix, x, y, z)
    }

    #[inline]
    pub fn apply_inverse(&self, x: f64, y: f64, z: f64) -> Point3<f64> {
        if self.is_identity {
            return Point3::new(x, y, z);
        }
        apply_affine(&self.inverse, x, y, z)
    }

    pub fn is_rigid(&self) -> bool {
        is_rotation_and_translation(&self.matrix, EPSILON)
    }
}

/// Removes operators whose matrix matches an earlier one within [`EPSILON`], keeping order.
pub fn dedup_operators(operators: Vec<SymmetryOperator>) -> Vec<SymmetryOperator> {
    let mut out: Vec<SymmetryOperator> = Vec::with_capacity(operators.len());
    for op in operators {
        if !out.iter().any(|o| o.approx_eq(&op)) {
            out.push(op);
        }
    }
    out
}
