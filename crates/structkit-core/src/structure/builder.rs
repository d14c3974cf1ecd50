use super::structure::{Structure, StructureProps};
use super::unit::{Unit, UnitId, UnitKind, UnitProps, UnitTraits};
use crate::core::collections::SortedArray;
use crate::core::model::Model;
use crate::core::symmetry::SymmetryOperator;
use std::collections::HashMap;
use std::sync::Arc;

/// Identity of a single-element unit: its invariant and its exact world position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SingleElementKey {
    invariant_id: u32,
    x: u64,
    y: u64,
    z: u64,
}

fn coordinate_bits(v: f64) -> u64 {
    // -0.0 and 0.0 name the same position
    if v == 0.0 { 0u64 } else { v.to_bits() }
}

impl SingleElementKey {
    fn of(unit: &Unit) -> Self {
        let p = unit.position(0);
        Self {
            invariant_id: unit.invariant_id(),
            x: coordinate_bits(p.x),
            y: coordinate_bits(p.y),
            z: coordinate_bits(p.z),
        }
    }
}

/// Incremental assembly of a [`Structure`].
///
/// Unit ids are assigned in insertion order. Single-element units that coincide with an
/// earlier one (same invariant, same world position) are not added twice; the earlier
/// unit is returned instead.
#[derive(Debug)]
pub struct StructureBuilder {
    props: StructureProps,
    units: Vec<Unit>,
    single_element_units: HashMap<SingleElementKey, Unit>,
    next_invariant_id: u32,
    chain_group_id: i32,
    in_chain_group: bool,
}

impl StructureBuilder {
    pub fn new(props: StructureProps) -> Self {
        Self {
            props,
            units: Vec::new(),
            single_element_units: HashMap::new(),
            next_invariant_id: 0,
            chain_group_id: -1,
            in_chain_group: false,
        }
    }

    /// Starts a group; units added until [`end_chain_group`](Self::end_chain_group) share
    /// one chain group id.
    pub fn begin_chain_group(&mut self) {
        self.chain_group_id += 1;
        self.in_chain_group = true;
    }

    pub fn end_chain_group(&mut self) {
        self.in_chain_group = false;
    }

    fn next_chain_group_id(&mut self) -> i32 {
        if !self.in_chain_group {
            self.chain_group_id += 1;
        }
        self.chain_group_id
    }

    pub fn new_invariant_id(&mut self) -> u32 {
        let id = self.next_invariant_id;
        self.next_invariant_id += 1;
        id
    }

    fn next_unit_id(&self) -> UnitId {
        self.units.len() as UnitId
    }

    /// Creates and adds a unit placed by `operator`. A fresh invariant id is drawn unless
    /// one is given.
    pub fn add_unit(
        &mut self,
        kind: UnitKind,
        model: &Arc<Model>,
        operator: Arc<SymmetryOperator>,
        elements: SortedArray,
        traits: UnitTraits,
        invariant_id: Option<u32>,
    ) -> Unit {
        let invariant_id = invariant_id.unwrap_or_else(|| self.new_invariant_id());
        let chain_group_id = self.next_chain_group_id();
        let unit = Unit::create(
            self.next_unit_id(),
            invariant_id,
            chain_group_id,
            traits,
            kind,
            Arc::clone(model),
            operator,
            elements,
            UnitProps {
                bonds: None,
                bond_props: self.props.bonds.intra.clone(),
            },
        );
        self.add(unit)
    }

    /// Adds an existing unit as is.
    pub fn add(&mut self, unit: Unit) -> Unit {
        if unit.element_count() == 1 {
            let key = SingleElementKey::of(&unit);
            if let Some(existing) = self.single_element_units.get(&key) {
                return existing.clone();
            }
            self.single_element_units.insert(key, unit.clone());
        }
        self.units.push(unit.clone());
        unit
    }

    /// Adds a copy of `unit` under the next unit id, keeping its operator.
    pub fn copy_unit(&mut self, unit: &Unit) -> Unit {
        let operator = unit.operator().as_ref().clone();
        let copy = unit.apply_operator(self.next_unit_id(), &operator, true);
        self.add(copy)
    }

    /// Adds a copy of `unit` additionally placed by `operator` (or by `operator` alone with
    /// `dont_compose`).
    pub fn add_with_operator(
        &mut self,
        unit: &Unit,
        operator: &SymmetryOperator,
        dont_compose: bool,
    ) -> Unit {
        let copy = unit.apply_operator(self.next_unit_id(), operator, dont_compose);
        self.add(copy)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get_structure(self) -> Structure {
        Structure::create(self.units, self.props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::test_fixtures::small_protein_model;
    use nalgebra::{Matrix4, Rotation3, Vector3};

    fn identity() -> Arc<SymmetryOperator> {
        Arc::new(SymmetryOperator::default())
    }

    #[test]
    fn coinciding_single_element_units_are_deduplicated() {
        let model = small_protein_model();
        let mut b = StructureBuilder::new(StructureProps::default());
        let zn = b.add_unit(UnitKind::Atomic, &model, identity(), SortedArray::of_single(7), UnitTraits::empty(), None);

        // rotation about the x axis keeps the ion at (-20, 0, 0)
        let rotation = SymmetryOperator::from_matrix(
            Rotation3::from_axis_angle(&Vector3::x_axis(), 1.0).to_homogeneous(),
        );
        let same = b.add_with_operator(&zn, &rotation, false);
        assert!(same.ptr_eq(&zn));
        assert_eq!(b.unit_count(), 1);

        let shift = SymmetryOperator::from_matrix(Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0)));
        let moved = b.add_with_operator(&zn, &shift, false);
        assert!(!moved.ptr_eq(&zn));
        assert_eq!(moved.id(), 1);
        assert_eq!(b.get_structure().unit_count(), 2);
    }

    #[test]
    fn negative_zero_matches_positive_zero() {
        let model = small_protein_model();
        let mut b = StructureBuilder::new(StructureProps::default());
        // atom 0 sits at the origin
        let n = b.add_unit(UnitKind::Atomic, &model, identity(), SortedArray::of_single(0), UnitTraits::empty(), Some(5));
        let flip = SymmetryOperator::from_matrix(Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, -1.0, 1.0)));
        let flipped = b.add_with_operator(&n, &flip, false);
        assert!(flipped.ptr_eq(&n));
    }

    #[test]
    fn multi_element_units_are_never_deduplicated() {
        let model = small_protein_model();
        let mut b = StructureBuilder::new(StructureProps::default());
        let u = b.add_unit(UnitKind::Atomic, &model, identity(), SortedArray::of_range(0, 6), UnitTraits::empty(), None);
        let copy = b.copy_unit(&u);
        assert!(!copy.ptr_eq(&u));
        assert_eq!(copy.invariant_id(), u.invariant_id());
        assert_eq!(b.unit_count(), 2);
    }

    #[test]
    fn chain_groups_share_ids_inside_a_group() {
        let model = small_protein_model();
        let mut b = StructureBuilder::new(StructureProps::default());
        let a = b.add_unit(UnitKind::Atomic, &model, identity(), SortedArray::of_range(0, 6), UnitTraits::empty(), None);
        b.begin_chain_group();
        let w = b.add_unit(UnitKind::Atomic, &model, identity(), SortedArray::of_single(6), UnitTraits::empty(), None);
        let z = b.add_unit(UnitKind::Atomic, &model, identity(), SortedArray::of_single(7), UnitTraits::empty(), None);
        b.end_chain_group();
        let last = b.add_unit(UnitKind::Atomic, &model, identity(), SortedArray::of_range(0, 2), UnitTraits::empty(), None);

        assert_eq!(a.chain_group_id(), 0);
        assert_eq!(w.chain_group_id(), 1);
        assert_eq!(z.chain_group_id(), 1);
        assert_eq!(last.chain_group_id(), 2);
        assert_ne!(w.invariant_id(), z.invariant_id());
    }
}
