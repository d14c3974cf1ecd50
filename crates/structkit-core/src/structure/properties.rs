//! Per-element property accessors over a [`StructureElementLocation`].
//!
//! Atomic accessors fail with [`StructureError::AtomicOnly`] on coarse units, coarse accessors
//! with [`StructureError::CoarseOnly`] on atomic units.

use super::unit::Unit;
use crate::core::collections::ElementIndex;
use crate::error::StructureError;

/// One element of a unit, addressed by its model element index.
#[derive(Debug, Clone)]
pub struct StructureElementLocation {
    pub unit: Unit,
    pub element: ElementIndex,
}

impl StructureElementLocation {
    pub fn new(unit: Unit, element: ElementIndex) -> Self {
        Self { unit, element }
    }

    /// Location of the `index`-th element of `unit`.
    pub fn from_local(unit: &Unit, index: usize) -> Option<Self> {
        let element = *unit.elements().get(index)?;
        Some(Self::new(unit.clone(), element))
    }

    pub fn local_index(&self) -> Option<usize> {
        self.unit.elements().index_of(self.element)
    }
}

impl PartialEq for StructureElementLocation {
    fn eq(&self, other: &Self) -> bool {
        self.unit.id() == other.unit.id() && self.element == other.element
    }
}

fn atomic(loc: &StructureElementLocation) -> Result<&Unit, StructureError> {
    if loc.unit.is_atomic() {
        Ok(&loc.unit)
    } else {
        Err(StructureError::AtomicOnly)
    }
}

pub mod unit {
    use super::StructureElementLocation;
    use crate::structure::unit::{UnitId, UnitKind};

    pub fn id(loc: &StructureElementLocation) -> UnitId {
        loc.unit.id()
    }

    pub fn invariant_id(loc: &StructureElementLocation) -> u32 {
        loc.unit.invariant_id()
    }

    pub fn kind(loc: &StructureElementLocation) -> UnitKind {
        loc.unit.kind()
    }

    pub fn operator_name(loc: &StructureElementLocation) -> &str {
        &loc.unit.operator().name
    }

    pub fn model_num(loc: &StructureElementLocation) -> i32 {
        loc.unit.model().model_num
    }
}

pub mod atom {
    use super::{StructureElementLocation, atomic};
    use crate::core::chemistry::{Element, MoleculeType};
    use crate::error::StructureError;
    use nalgebra::Point3;

    /// World position of the element.
    pub fn position(loc: &StructureElementLocation) -> Point3<f64> {
        loc.unit.conformation().position(loc.element)
    }

    pub fn x(loc: &StructureElementLocation) -> f64 {
        position(loc).x
    }

    pub fn y(loc: &StructureElementLocation) -> f64 {
        position(loc).y
    }

    pub fn z(loc: &StructureElementLocation) -> f64 {
        position(loc).z
    }

    pub fn type_symbol(loc: &StructureElementLocation) -> Result<Element, StructureError> {
        Ok(atomic(loc)?.model().atomic_hierarchy.element(loc.element))
    }

    pub fn label_atom_id(loc: &StructureElementLocation) -> Result<&str, StructureError> {
        Ok(atomic(loc)?.model().atomic_hierarchy.atom_name(loc.element))
    }

    pub fn label_alt_id(loc: &StructureElementLocation) -> Result<&str, StructureError> {
        Ok(atomic(loc)?.model().atomic_hierarchy.alt_id(loc.element))
    }

    pub fn source_index(loc: &StructureElementLocation) -> Result<u32, StructureError> {
        let unit = atomic(loc)?;
        Ok(unit.model().atomic_hierarchy.atoms.source_index[loc.element as usize])
    }

    pub fn occupancy(loc: &StructureElementLocation) -> Result<f64, StructureError> {
        Ok(atomic(loc)?.model().atomic_conformation.occupancy[loc.element as usize])
    }

    pub fn b_iso(loc: &StructureElementLocation) -> Result<f64, StructureError> {
        Ok(atomic(loc)?.model().atomic_conformation.b_iso[loc.element as usize])
    }

    pub fn molecule_type(loc: &StructureElementLocation) -> Result<MoleculeType, StructureError> {
        Ok(atomic(loc)?.model().atom_molecule_type(loc.element))
    }
}

pub mod residue {
    use super::{StructureElementLocation, atomic};
    use crate::core::model::hierarchy::ResidueIndex;
    use crate::error::StructureError;

    pub fn index(loc: &StructureElementLocation) -> Result<ResidueIndex, StructureError> {
        loc.unit.residue_index(loc.element)
    }

    pub fn label_comp_id(loc: &StructureElementLocation) -> Result<&str, StructureError> {
        let h = &atomic(loc)?.model().atomic_hierarchy;
        Ok(h.comp_id(h.residue_of(loc.element)))
    }

    pub fn label_seq_id(loc: &StructureElementLocation) -> Result<i32, StructureError> {
        let h = &atomic(loc)?.model().atomic_hierarchy;
        Ok(h.residues.label_seq_id[h.residue_of(loc.element) as usize])
    }

    pub fn auth_seq_id(loc: &StructureElementLocation) -> Result<i32, StructureError> {
        let h = &atomic(loc)?.model().atomic_hierarchy;
        Ok(h.residues.auth_seq_id[h.residue_of(loc.element) as usize])
    }

    pub fn ins_code(loc: &StructureElementLocation) -> Result<&str, StructureError> {
        let h = &atomic(loc)?.model().atomic_hierarchy;
        Ok(&h.residues.ins_code[h.residue_of(loc.element) as usize])
    }
}

pub mod chain {
    use super::{StructureElementLocation, atomic};
    use crate::core::model::entities::EntityType;
    use crate::core::model::hierarchy::ChainIndex;
    use crate::error::StructureError;

    pub fn index(loc: &StructureElementLocation) -> Result<ChainIndex, StructureError> {
        loc.unit.chain_index(loc.element)
    }

    pub fn label_asym_id(loc: &StructureElementLocation) -> Result<&str, StructureError> {
        let h = &atomic(loc)?.model().atomic_hierarchy;
        Ok(&h.chains.label_asym_id[h.chain_of(loc.element) as usize])
    }

    pub fn auth_asym_id(loc: &StructureElementLocation) -> Result<&str, StructureError> {
        let h = &atomic(loc)?.model().atomic_hierarchy;
        Ok(&h.chains.auth_asym_id[h.chain_of(loc.element) as usize])
    }

    pub fn label_entity_id(loc: &StructureElementLocation) -> Result<&str, StructureError> {
        let h = &atomic(loc)?.model().atomic_hierarchy;
        Ok(&h.chains.label_entity_id[h.chain_of(loc.element) as usize])
    }

    pub fn entity_type(loc: &StructureElementLocation) -> Result<Option<EntityType>, StructureError> {
        let unit = atomic(loc)?;
        let model = unit.model();
        Ok(model.chain_entity_type(model.atomic_hierarchy.chain_of(loc.element)))
    }
}

pub mod coarse {
    use super::StructureElementLocation;
    use crate::error::StructureError;

    pub fn entity_id(loc: &StructureElementLocation) -> Result<&str, StructureError> {
        Ok(&loc.unit.coarse_elements()?.entity_id[loc.element as usize])
    }

    pub fn asym_id(loc: &StructureElementLocation) -> Result<&str, StructureError> {
        Ok(&loc.unit.coarse_elements()?.asym_id[loc.element as usize])
    }

    pub fn seq_id_begin(loc: &StructureElementLocation) -> Result<i32, StructureError> {
        Ok(loc.unit.coarse_elements()?.seq_id_begin[loc.element as usize])
    }

    pub fn seq_id_end(loc: &StructureElementLocation) -> Result<i32, StructureError> {
        Ok(loc.unit.coarse_elements()?.seq_id_end[loc.element as usize])
    }

    pub fn radius(loc: &StructureElementLocation) -> Result<f64, StructureError> {
        loc.unit.coarse_elements()?;
        Ok(loc.unit.conformation().radius(loc.element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chemistry::{Element, MoleculeType};
    use crate::core::model::builder::{CoarseRecord, ModelBuilder};
    use crate::core::model::entities::EntityType;
    use crate::core::model::test_fixtures::small_protein_model;
    use crate::structure::structure::{Structure, StructureProps};
    use crate::structure::unit::test_support::atomic_unit;
    use nalgebra::{Matrix4, Point3, Vector3};
    use std::sync::Arc;

    fn water_location() -> StructureElementLocation {
        let model = small_protein_model();
        StructureElementLocation::from_local(&atomic_unit(3, &model, vec![6]), 0).unwrap()
    }

    #[test]
    fn atomic_properties_follow_the_hierarchy() {
        let loc = water_location();
        assert_eq!(loc.element, 6);
        assert_eq!(atom::type_symbol(&loc), Ok(Element::O));
        assert_eq!(atom::label_atom_id(&loc), Ok("O"));
        assert_eq!(atom::molecule_type(&loc), Ok(MoleculeType::Water));
        assert_eq!(residue::label_comp_id(&loc), Ok("HOH"));
        assert_eq!(residue::auth_seq_id(&loc), Ok(101));
        assert_eq!(chain::label_asym_id(&loc), Ok("W"));
        assert_eq!(chain::label_entity_id(&loc), Ok("2"));
        assert_eq!(chain::entity_type(&loc), Ok(Some(EntityType::Water)));
        assert_eq!(unit::id(&loc), 3);
        assert_eq!(unit::operator_name(&loc), "1_555");
        assert_eq!(atom::x(&loc), 20.0);
    }

    #[test]
    fn positions_follow_the_unit_operator() {
        let model = small_protein_model();
        let s = Structure::create(
            vec![atomic_unit(0, &model, (0..6).collect())],
            StructureProps::default(),
        );
        let moved = s
            .transform(&Matrix4::new_translation(&Vector3::new(0.0, 0.0, 3.0)))
            .unwrap();
        let loc = StructureElementLocation::from_local(&moved.units()[0], 1).unwrap();
        assert_eq!(atom::position(&loc), Point3::new(1.45, 0.0, 3.0));
        assert_eq!(loc.local_index(), Some(1));
    }

    #[test]
    fn coarse_accessors_reject_atomic_units_and_back() {
        let loc = water_location();
        assert_eq!(coarse::asym_id(&loc), Err(StructureError::CoarseOnly));

        let mut b = ModelBuilder::new("COARSE");
        b.add_entity("1", EntityType::Polymer, "chain");
        b.add_sphere(CoarseRecord::new("1", "A", (1, 4), Point3::new(0.0, 0.0, 0.0)), 2.5);
        let model = Arc::new(b.build().unwrap());
        let s = Structure::of_model(model, StructureProps::default());
        let loc = StructureElementLocation::from_local(&s.units()[0], 0).unwrap();
        assert_eq!(coarse::asym_id(&loc), Ok("A"));
        assert_eq!(coarse::seq_id_end(&loc), Ok(4));
        assert_eq!(coarse::radius(&loc), Ok(2.5));
        assert_eq!(atom::label_atom_id(&loc), Err(StructureError::AtomicOnly));
        assert_eq!(residue::label_seq_id(&loc), Err(StructureError::AtomicOnly));
        assert_eq!(chain::index(&loc), Err(StructureError::AtomicOnly));
    }

    #[test]
    fn out_of_range_local_index_has_no_location() {
        let model = small_protein_model();
        assert!(StructureElementLocation::from_local(&atomic_unit(0, &model, vec![6]), 1).is_none());
    }
}
