use super::structure::Structure;
use super::unit::{Unit, UnitId};
use crate::core::chemistry::{Element, MoleculeType};
use crate::core::model::hierarchy::ResidueIndex;
use itertools::Itertools;
use nalgebra::{Point3, Vector3};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A saccharide residue identified by its ring.
#[derive(Debug, Clone, PartialEq)]
pub struct CarbohydrateElement {
    pub unit_id: UnitId,
    pub residue: ResidueIndex,
    pub comp_id: String,
    /// Unit-local indices of the ring atoms, ascending.
    pub ring: Vec<u32>,
    /// Ring centroid in world space.
    pub center: Point3<f64>,
}

/// Bond between two saccharide residues; `a < b` index into [`Carbohydrates::elements`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CarbohydrateLink {
    pub a: usize,
    pub b: usize,
}

/// Bond from a saccharide residue to an atom outside any saccharide residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CarbohydrateTerminalLink {
    pub carbohydrate: usize,
    pub unit_id: UnitId,
    /// Unit-local index of the partner atom.
    pub element: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Carbohydrates {
    elements: Vec<CarbohydrateElement>,
    links: Vec<CarbohydrateLink>,
    terminal_links: Vec<CarbohydrateTerminalLink>,
    by_residue: HashMap<(UnitId, ResidueIndex), usize>,
}

impl Carbohydrates {
    pub fn elements(&self) -> &[CarbohydrateElement] {
        &self.elements
    }

    pub fn links(&self) -> &[CarbohydrateLink] {
        &self.links
    }

    pub fn terminal_links(&self) -> &[CarbohydrateTerminalLink] {
        &self.terminal_links
    }

    pub fn element_of(&self, unit: UnitId, residue: ResidueIndex) -> Option<&CarbohydrateElement> {
        self.by_residue.get(&(unit, residue)).map(|&i| &self.elements[i])
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

struct LinkCollector {
    links: HashSet<CarbohydrateLink>,
    terminal_links: HashSet<CarbohydrateTerminalLink>,
}

impl LinkCollector {
    fn add(&mut self, this: Option<usize>, other: Option<usize>, other_unit: UnitId, other_element: u32) {
        match (this, other) {
            (Some(a), Some(b)) if a != b => {
                self.links.insert(CarbohydrateLink {
                    a: a.min(b),
                    b: a.max(b),
                });
            }
            (Some(carbohydrate), None) => {
                self.terminal_links.insert(CarbohydrateTerminalLink {
                    carbohydrate,
                    unit_id: other_unit,
                    element: other_element,
                });
            }
            _ => {}
        }
    }
}

fn saccharide_ring<'a>(unit: &Unit, ring: &'a [u32]) -> Option<(ResidueIndex, &'a [u32])> {
    let model = unit.model();
    let h = &model.atomic_hierarchy;
    let elements = unit.elements();
    let residue = h.residue_of(elements[*ring.first()? as usize]);
    if model.residue_molecule_type(residue) != MoleculeType::Saccharide {
        return None;
    }
    let same_residue = ring
        .iter()
        .all(|&i| h.residue_of(elements[i as usize]) == residue);
    let has_oxygen = ring
        .iter()
        .any(|&i| h.element(elements[i as usize]) == Element::O);
    (same_residue && has_oxygen).then_some((residue, ring))
}

fn ring_center(unit: &Unit, ring: &[u32]) -> Point3<f64> {
    let sum = ring
        .iter()
        .fold(Vector3::zeros(), |acc, &i| acc + unit.position(i as usize).coords);
    Point3::from(sum / ring.len() as f64)
}

fn residue_of_local(unit: &Unit, local: u32) -> ResidueIndex {
    unit.model()
        .atomic_hierarchy
        .residue_of(unit.elements()[local as usize])
}

/// Finds saccharide rings in the atomic units of `structure` and the bonds linking them.
///
/// Each saccharide residue contributes its first ring that contains an oxygen. Links are
/// read from intra-unit bonds and, when any saccharide is present, from inter-unit bonds.
pub fn compute(structure: &Structure) -> Carbohydrates {
    let mut result = Carbohydrates::default();

    for unit in structure.units().iter().filter(|u| u.is_atomic()) {
        let has_saccharide = unit
            .elements()
            .iter()
            .any(|&e| unit.model().atom_molecule_type(e) == MoleculeType::Saccharide);
        if !has_saccharide {
            continue;
        }
        for ring in unit.rings().rings() {
            let Some((residue, ring)) = saccharide_ring(unit, ring) else {
                continue;
            };
            let key = (unit.id(), residue);
            if result.by_residue.contains_key(&key) {
                continue;
            }
            result.by_residue.insert(key, result.elements.len());
            result.elements.push(CarbohydrateElement {
                unit_id: unit.id(),
                residue,
                comp_id: unit.model().atomic_hierarchy.comp_id(residue).to_string(),
                ring: ring.to_vec(),
                center: ring_center(unit, ring),
            });
        }
    }

    if result.elements.is_empty() {
        return result;
    }

    let mut collector = LinkCollector {
        links: HashSet::new(),
        terminal_links: HashSet::new(),
    };
    let lookup = |unit: &Unit, local: u32| {
        result
            .by_residue
            .get(&(unit.id(), residue_of_local(unit, local)))
            .copied()
    };

    for unit in structure.units().iter().filter(|u| u.is_atomic()) {
        for edge in unit.bonds().graph().edges() {
            let ra = residue_of_local(unit, edge.a);
            let rb = residue_of_local(unit, edge.b);
            if ra == rb {
                continue;
            }
            let (ca, cb) = (lookup(unit, edge.a), lookup(unit, edge.b));
            collector.add(ca, cb, unit.id(), edge.b);
            collector.add(cb, ca, unit.id(), edge.a);
        }
    }

    for pair in structure.inter_unit_bonds().pairs() {
        let (Some(unit_a), Some(unit_b)) = (
            structure.unit_by_id(pair.unit_a()),
            structure.unit_by_id(pair.unit_b()),
        ) else {
            continue;
        };
        if !unit_a.is_atomic() || !unit_b.is_atomic() {
            continue;
        }
        for edge in pair.edges() {
            let ca = lookup(unit_a, edge.index_a);
            let cb = lookup(unit_b, edge.index_b);
            collector.add(ca, cb, unit_b.id(), edge.index_b);
            collector.add(cb, ca, unit_a.id(), edge.index_a);
        }
    }

    result.links = collector
        .links
        .into_iter()
        .sorted_unstable_by_key(|l| (l.a, l.b))
        .collect();
    result.terminal_links = collector
        .terminal_links
        .into_iter()
        .sorted_unstable_by_key(|l| (l.carbohydrate, l.unit_id, l.element))
        .collect();

    debug!(
        carbohydrates = result.elements.len(),
        links = result.links.len(),
        terminal_links = result.terminal_links.len(),
        "Computed carbohydrates."
    );
    result
}
