use super::structure::Structure;
use super::unit::{Unit, UnitId};
use crate::core::symmetry::SymmetryOperator;
use nalgebra::Point3;

/// Borrowed projection of a structure onto its coordinate-system ancestry.
///
/// Transformed structures keep their units in the transformed frame; the view maps positions
/// and units back to the root structure they were derived from.
#[derive(Debug, Clone, Copy)]
pub struct StructureView<'a> {
    structure: &'a Structure,
}

impl<'a> StructureView<'a> {
    pub fn new(structure: &'a Structure) -> Self {
        Self { structure }
    }

    pub fn structure(&self) -> &'a Structure {
        self.structure
    }

    pub fn root(&self) -> &'a Structure {
        self.structure.root()
    }

    pub fn coordinate_system(&self) -> &'a SymmetryOperator {
        self.structure.coordinate_system()
    }

    /// Number of parent links between this structure and its root.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Parents from the nearest to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &'a Structure> + 'a {
        std::iter::successors(self.structure.parent(), |s| s.parent())
    }

    /// World position of an element in this structure's frame.
    pub fn position(&self, unit: &Unit, index: usize) -> Point3<f64> {
        unit.position(index)
    }

    /// Position of an element expressed in the root structure's frame.
    pub fn root_position(&self, unit: &Unit, index: usize) -> Point3<f64> {
        let p = unit.position(index);
        self.coordinate_system().apply_inverse(p.x, p.y, p.z)
    }

    /// The unit of the root structure this unit was derived from, matched by id.
    pub fn root_unit(&self, id: UnitId) -> Option<&'a Unit> {
        let unit = self.structure.unit_by_id(id)?;
        self.root()
            .unit_by_id(id)
            .filter(|r| r.elements().are_equal(unit.elements()))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::model::test_fixtures::small_protein_model;
    use crate::structure::structure::{Structure, StructureProps};
    use crate::structure::unit::test_support::atomic_unit;
    use nalgebra::{Matrix4, Vector3};

    fn shift(dx: f64) -> Matrix4<f64> {
        Matrix4::new_translation(&Vector3::new(dx, 0.0, 0.0))
    }

    #[test]
    fn root_positions_undo_every_transform() {
        let model = small_protein_model();
        let base = Structure::create(
            vec![atomic_unit(0, &model, (0..6).collect())],
            StructureProps::default(),
        );
        let moved = base
            .transform(&shift(5.0))
            .unwrap()
            .transform(&shift(-2.0))
            .unwrap();

        let view = moved.view();
        let unit = &moved.units()[0];
        assert!((view.position(unit, 1).x - (1.45 + 3.0)).abs() < 1e-9);
        let p = view.root_position(unit, 1);
        assert!((p - nalgebra::Point3::new(1.45, 0.0, 0.0)).norm() < 1e-9);
        assert!(view.root().ptr_eq(&base));
        assert_eq!(view.depth(), 1);
    }

    #[test]
    fn root_unit_matches_by_id_and_elements() {
        let model = small_protein_model();
        let base = Structure::create(
            vec![atomic_unit(0, &model, (0..6).collect()), atomic_unit(1, &model, vec![6])],
            StructureProps::default(),
        );
        let moved = base.transform(&shift(1.0)).unwrap();
        let view = moved.view();
        assert!(view.root_unit(1).unwrap().ptr_eq(&base.units()[1]));
        assert!(view.root_unit(7).is_none());

        let root_view = base.view();
        assert_eq!(root_view.depth(), 0);
        assert!(root_view.root_unit(0).unwrap().ptr_eq(&base.units()[0]));
    }
}
