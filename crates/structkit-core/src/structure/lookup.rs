use super::unit::Unit;
use crate::core::spatial::{Boundary, Sphere3D};
use itertools::Itertools;
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use std::fmt;

/// Elements found near a query point, as parallel columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureLookup3DResult {
    /// Position of the owning unit in the structure's unit list.
    pub units: Vec<usize>,
    /// Local index of the element inside its unit.
    pub indices: Vec<u32>,
    pub squared_distances: Vec<f64>,
}

impl StructureLookup3DResult {
    pub fn count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Two-level spatial index: a k-d tree over the world boundary spheres of all units, then
/// each unit's own grid in the unit's untransformed frame.
pub struct StructureLookup3D {
    units: Vec<Unit>,
    spheres: Vec<Sphere3D>,
    tree: ImmutableKdTree<f64, 3>,
    max_sphere_radius: f64,
}

impl fmt::Debug for StructureLookup3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructureLookup3D")
            .field("units", &self.units.len())
            .field("max_sphere_radius", &self.max_sphere_radius)
            .finish()
    }
}

impl StructureLookup3D {
    pub fn new(units: &[Unit]) -> Self {
        let spheres: Vec<Sphere3D> = units.iter().map(Unit::world_boundary_sphere).collect();
        let centers: Vec<[f64; 3]> = spheres
            .iter()
            .map(|s| [s.center.x, s.center.y, s.center.z])
            .collect();
        // built in one pass so collinear or coplanar centers never overflow a bucket
        let tree = ImmutableKdTree::new_from_slice(&centers);
        let max_sphere_radius = spheres.iter().map(|s| s.radius).fold(0.0, f64::max);
        Self {
            units: units.to_vec(),
            spheres,
            tree,
            max_sphere_radius,
        }
    }

    pub fn spheres(&self) -> &[Sphere3D] {
        &self.spheres
    }

    pub fn boundary(&self) -> Boundary {
        Boundary::from_spheres(&self.spheres)
    }

    /// Positions of the units whose boundary sphere intersects the query sphere, ascending.
    pub fn find_unit_indices(&self, x: f64, y: f64, z: f64, radius: f64) -> Vec<usize> {
        if self.spheres.is_empty() {
            return Vec::new();
        }
        let reach = radius + self.max_sphere_radius;
        let query = Sphere3D::new(nalgebra::Point3::new(x, y, z), radius);
        self.tree
            .within_unsorted::<SquaredEuclidean>(&[x, y, z], reach * reach)
            .into_iter()
            .map(|n| n.item as usize)
            .filter(|&i| query.overlaps(&self.spheres[i], 0.0))
            .sorted_unstable()
            .collect()
    }

    /// Elements of all units within `radius` of the world-space point.
    pub fn find(&self, x: f64, y: f64, z: f64, radius: f64) -> StructureLookup3DResult {
        let mut result = StructureLookup3DResult::default();
        for i in self.find_unit_indices(x, y, z, radius) {
            let unit = &self.units[i];
            let p = unit.operator().apply_inverse(x, y, z);
            for (index, d2) in unit.lookup3d().find(p.x, p.y, p.z, radius).iter() {
                result.units.push(i);
                result.indices.push(index);
                result.squared_distances.push(d2);
            }
        }
        result
    }

    pub fn check(&self, x: f64, y: f64, z: f64, radius: f64) -> bool {
        self.find_unit_indices(x, y, z, radius).into_iter().any(|i| {
            let unit = &self.units[i];
            let p = unit.operator().apply_inverse(x, y, z);
            unit.lookup3d().check(p.x, p.y, p.z, radius)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::test_fixtures::small_protein_model;
    use crate::core::symmetry::SymmetryOperator;
    use crate::structure::unit::test_support::atomic_unit;
    use nalgebra::{Matrix4, Vector3};

    fn units() -> Vec<Unit> {
        let model = small_protein_model();
        let peptide = atomic_unit(0, &model, (0..6).collect());
        let shift = SymmetryOperator::from_matrix(Matrix4::new_translation(&Vector3::new(0.0, 50.0, 0.0)));
        let image = peptide.apply_operator(1, &shift, false);
        vec![
            peptide,
            image,
            atomic_unit(2, &model, vec![6]),
            atomic_unit(3, &model, vec![7]),
        ]
    }

    #[test]
    fn finds_units_near_a_point() {
        let lookup = StructureLookup3D::new(&units());
        assert_eq!(lookup.find_unit_indices(2.0, 1.0, 0.0, 1.0), vec![0]);
        assert_eq!(lookup.find_unit_indices(2.0, 51.0, 0.0, 1.0), vec![1]);
        assert_eq!(lookup.find_unit_indices(20.0, 0.0, 0.0, 0.5), vec![2]);
        assert!(lookup.find_unit_indices(0.0, -30.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn finds_elements_through_unit_operators() {
        let lookup = StructureLookup3D::new(&units());
        // CA of the shifted image sits at (1.45, 50, 0)
        let found = lookup.find(1.45, 50.0, 0.0, 0.1);
        assert_eq!(found.count(), 1);
        assert_eq!(found.units, vec![1]);
        assert_eq!(found.indices, vec![1]);
        assert!(found.squared_distances[0] < 1e-12);

        assert!(lookup.check(-20.0, 0.0, 0.0, 0.1));
        assert!(!lookup.check(-20.0, 5.0, 0.0, 0.1));
    }

    #[test]
    fn many_units_along_one_axis() {
        let model = small_protein_model();
        let water = atomic_unit(0, &model, vec![6]);
        let units: Vec<Unit> = (0..40)
            .map(|i| {
                let op = SymmetryOperator::from_matrix(Matrix4::new_translation(&Vector3::new(
                    -20.0,
                    0.0,
                    10.0 * i as f64,
                )));
                water.apply_operator(i, &op, false)
            })
            .collect();
        let lookup = StructureLookup3D::new(&units);
        assert_eq!(lookup.spheres().len(), 40);
        assert_eq!(lookup.find_unit_indices(0.0, 0.0, 390.0, 0.5), vec![39]);
        assert_eq!(lookup.find_unit_indices(0.0, 0.0, 205.0, 6.0), vec![20, 21]);
        assert!(lookup.find_unit_indices(0.0, 0.0, 405.0, 1.0).is_empty());
    }

    #[test]
    fn empty_lookup_finds_nothing() {
        let lookup = StructureLookup3D::new(&[]);
        assert!(lookup.find(0.0, 0.0, 0.0, 100.0).is_empty());
        assert_eq!(lookup.boundary().sphere.radius, 0.0);
    }
}
