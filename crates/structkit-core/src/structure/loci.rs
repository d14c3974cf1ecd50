use super::properties::StructureElementLocation;
use super::structure::Structure;
use super::unit::{Unit, UnitId};
use crate::core::collections::SortedArray;
use crate::error::StructureError;
use std::collections::BTreeMap;

/// Selected elements of one unit, as ascending unit-local indices.
#[derive(Debug, Clone)]
pub struct LociElement {
    pub unit: Unit,
    pub indices: SortedArray,
}

impl LociElement {
    pub fn new(unit: Unit, indices: SortedArray) -> Self {
        Self { unit, indices }
    }

    /// Every element of `unit`.
    pub fn whole(unit: &Unit) -> Self {
        let n = unit.element_count() as u32;
        Self::new(unit.clone(), SortedArray::of_range(0, n))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// A selection of elements within one structure, grouped by unit in structure order.
#[derive(Debug, Clone)]
pub struct StructureElementLoci {
    structure: Structure,
    elements: Vec<LociElement>,
}

impl StructureElementLoci {
    /// Groups `elements` by unit, merging repeated units and dropping empty selections.
    ///
    /// Fails when an element's unit is not part of `structure`.
    pub fn new(structure: Structure, elements: Vec<LociElement>) -> Result<Self, StructureError> {
        let mut by_position: BTreeMap<usize, LociElement> = BTreeMap::new();
        for element in elements {
            let position = structure
                .unit_index(element.unit.id())
                .ok_or(StructureError::UnitNotFound(element.unit.id()))?;
            let indices = match by_position.remove(&position) {
                Some(existing) => existing.indices.union(&element.indices),
                None => element.indices,
            };
            by_position.insert(position, LociElement::new(element.unit, indices));
        }
        let elements = by_position
            .into_values()
            .filter(|e| !e.is_empty())
            .collect();
        Ok(Self {
            structure,
            elements,
        })
    }

    pub fn empty(structure: Structure) -> Self {
        Self {
            structure,
            elements: Vec::new(),
        }
    }

    /// Every element of every unit of `structure`.
    pub fn all(structure: Structure) -> Self {
        let elements = structure.units().iter().map(LociElement::whole).collect();
        Self {
            structure,
            elements,
        }
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn elements(&self) -> &[LociElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of selected elements.
    pub fn size(&self) -> usize {
        self.elements.iter().map(LociElement::len).sum()
    }

    pub fn indices_of(&self, unit: UnitId) -> Option<&SortedArray> {
        self.elements
            .iter()
            .find(|e| e.unit.id() == unit)
            .map(|e| &e.indices)
    }

    /// Whether every element of the structure is selected.
    pub fn is_whole(&self) -> bool {
        self.size() == self.structure.element_count()
    }

    fn check_same_structure(&self, other: &StructureElementLoci) -> Result<(), StructureError> {
        if Structure::are_equivalent(&self.structure, &other.structure) {
            Ok(())
        } else {
            Err(StructureError::LociStructureMismatch)
        }
    }

    pub fn union(&self, other: &StructureElementLoci) -> Result<StructureElementLoci, StructureError> {
        self.check_same_structure(other)?;
        let merged = self
            .elements
            .iter()
            .chain(&other.elements)
            .cloned()
            .collect();
        Self::new(self.structure.clone(), merged)
    }

    pub fn subtract(&self, other: &StructureElementLoci) -> Result<StructureElementLoci, StructureError> {
        self.check_same_structure(other)?;
        let elements = self
            .elements
            .iter()
            .filter_map(|e| {
                let indices = match other.indices_of(e.unit.id()) {
                    Some(removed) => e.indices.subtract(removed),
                    None => e.indices.clone(),
                };
                (!indices.is_empty()).then(|| LociElement::new(e.unit.clone(), indices))
            })
            .collect();
        Ok(Self {
            structure: self.structure.clone(),
            elements,
        })
    }

    pub fn are_equal(&self, other: &StructureElementLoci) -> bool {
        Structure::are_equivalent(&self.structure, &other.structure)
            && self.elements.len() == other.elements.len()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| a.unit.id() == b.unit.id() && a.indices.are_equal(&b.indices))
    }

    /// First selected element in structure order.
    pub fn first_location(&self) -> Option<StructureElementLocation> {
        let first = self.elements.first()?;
        StructureElementLocation::from_local(&first.unit, *first.indices.first()? as usize)
    }

    /// A structure made of the selected elements, one child unit per selected unit.
    ///
    /// Units keep their ids; a fully selected unit is reused as is.
    pub fn to_structure(&self) -> Structure {
        let units = self
            .elements
            .iter()
            .map(|e| {
                let model_elements = e
                    .indices
                    .iter()
                    .map(|&i| e.unit.elements()[i as usize])
                    .collect();
                e.unit
                    .get_child(SortedArray::from_sorted_unchecked(model_elements))
            })
            .collect();
        Structure::create(units, self.structure.props().clone())
    }
}

/// The whole of a structure, selected as a unit.
#[derive(Debug, Clone)]
pub struct StructureLoci {
    pub structure: Structure,
}

impl StructureLoci {
    pub fn new(structure: Structure) -> Self {
        Self { structure }
    }

    pub fn to_element_loci(&self) -> StructureElementLoci {
        StructureElementLoci::all(self.structure.clone())
    }

    pub fn are_equal(&self, other: &StructureLoci) -> bool {
        Structure::are_equivalent(&self.structure, &other.structure)
    }
}
