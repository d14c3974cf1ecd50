use super::unit::{Unit, UnitId};
use crate::core::collections::SortedArray;
use std::collections::HashMap;

/// Units sharing an invariant id and an identical element set; they differ only by operator.
#[derive(Debug, Clone)]
pub struct UnitSymmetryGroup {
    units: Vec<Unit>,
    hash_code: u32,
}

impl UnitSymmetryGroup {
    fn new(first: Unit) -> Self {
        let hash_code = first
            .invariant_id()
            .wrapping_mul(31)
            .wrapping_add(first.elements().hash_code());
        Self {
            units: vec![first],
            hash_code,
        }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn elements(&self) -> &SortedArray {
        self.units[0].elements()
    }

    pub fn invariant_id(&self) -> u32 {
        self.units[0].invariant_id()
    }

    pub fn hash_code(&self) -> u32 {
        self.hash_code
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnitSymmetryGroups {
    groups: Vec<UnitSymmetryGroup>,
    by_unit: HashMap<UnitId, usize>,
}

impl UnitSymmetryGroups {
    pub fn groups(&self) -> &[UnitSymmetryGroup] {
        &self.groups
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitSymmetryGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Index of the group holding the unit with `id`.
    pub fn group_index_of(&self, id: UnitId) -> Option<usize> {
        self.by_unit.get(&id).copied()
    }

    pub fn group_of(&self, id: UnitId) -> Option<&UnitSymmetryGroup> {
        self.group_index_of(id).map(|i| &self.groups[i])
    }
}

/// Partitions units into symmetry groups, in order of first appearance.
pub fn compute(units: &[Unit]) -> UnitSymmetryGroups {
    let mut groups: Vec<UnitSymmetryGroup> = Vec::new();
    let mut by_invariant: HashMap<u32, Vec<usize>> = HashMap::new();
    let mut by_unit = HashMap::with_capacity(units.len());

    for unit in units {
        let candidates = by_invariant.entry(unit.invariant_id()).or_default();
        let existing = candidates
            .iter()
            .copied()
            .find(|&g| groups[g].elements().are_equal(unit.elements()));
        let index = match existing {
            Some(g) => {
                groups[g].units.push(unit.clone());
                g
            }
            None => {
                groups.push(UnitSymmetryGroup::new(unit.clone()));
                candidates.push(groups.len() - 1);
                groups.len() - 1
            }
        };
        by_unit.insert(unit.id(), index);
    }

    UnitSymmetryGroups { groups, by_unit }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::test_fixtures::small_protein_model;
    use crate::core::symmetry::SymmetryOperator;
    use crate::structure::unit::test_support::atomic_unit;
    use nalgebra::{Matrix4, Vector3};

    fn shifted(unit: &Unit, id: UnitId, dx: f64) -> Unit {
        let op = SymmetryOperator::from_matrix(Matrix4::new_translation(&Vector3::new(dx, 0.0, 0.0)));
        unit.apply_operator(id, &op, false)
    }

    #[test]
    fn copies_of_two_units_form_two_groups() {
        let model = small_protein_model();
        let peptide = atomic_unit(0, &model, (0..6).collect());
        let water = atomic_unit(1, &model, vec![6]);
        let units = vec![
            peptide.clone(),
            water.clone(),
            shifted(&peptide, 2, 40.0),
            shifted(&water, 3, 40.0),
        ];
        let groups = compute(&units);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.groups()[0].len(), 2);
        assert_eq!(groups.groups()[1].len(), 2);
        assert_eq!(groups.group_index_of(2), Some(0));
        assert_eq!(groups.group_index_of(3), Some(1));
        assert_eq!(groups.group_of(1).unwrap().invariant_id(), 1);
    }

    #[test]
    fn same_invariant_with_different_elements_splits() {
        let model = small_protein_model();
        let whole = atomic_unit(0, &model, (0..6).collect());
        let child = whole.get_child(SortedArray::of_range(0, 4));
        let groups = compute(&[whole, shifted(&child, 1, 10.0)]);
        assert_eq!(groups.len(), 2);
        assert_ne!(groups.groups()[0].hash_code(), groups.groups()[1].hash_code());
    }
}
