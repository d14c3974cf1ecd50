//! # Model
//!
//! The read-only input of the structure layer: atomic and coarse hierarchies, their
//! conformations, entity and chemical-component metadata, and optional bond tables.
//!
//! ## Key Components
//!
//! - [`Model`] - One frame of a parsed entry; shared by `Arc` between all units built on it
//! - [`builder::ModelBuilder`] - Programmatic construction, appended chain → residue → atom
//! - [`bonds::ModelBonds`] - Index-pair, `struct_conn` and component-dictionary bond tables
//!
//! Hierarchy-derived classifications (residue molecule types, trace atoms, water chains,
//! the inverted source-index map) are computed once on first access and shared between
//! all frames of a trajectory.

pub mod bonds;
pub mod builder;
pub mod coarse;
pub mod conformation;
pub mod entities;
pub mod error;
pub mod hierarchy;

use crate::bonds::intra::IntraUnitBonds;
use crate::core::chemistry::MoleculeType;
use crate::core::chemistry::identifiers::is_trace_atom;
use crate::core::collections::{ElementIndex, ElementSetCache};
use bonds::ModelBonds;
use coarse::{CoarseConformation, CoarseHierarchy};
use conformation::{AtomicConformation, Coordinates};
use entities::{ChemicalComponentMap, Entities, EntityType};
use error::ModelError;
use hierarchy::{AtomicHierarchy, ChainIndex, ResidueIndex};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl ModelId {
    fn next() -> Self {
        ModelId(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrajectoryInfo {
    pub index: usize,
    pub size: usize,
}

impl Default for TrajectoryInfo {
    fn default() -> Self {
        Self { index: 0, size: 1 }
    }
}

#[derive(Debug, Default)]
struct ModelDerived {
    residue_types: OnceCell<Vec<MoleculeType>>,
    trace_elements: OnceCell<Vec<Option<ElementIndex>>>,
    water_chains: OnceCell<Vec<bool>>,
    coarse_grained: OnceCell<bool>,
    source_index_map: OnceCell<HashMap<u32, ElementIndex>>,
}

#[derive(Debug)]
pub struct Model {
    id: ModelId,
    pub entry_id: String,
    pub label: String,
    pub model_num: i32,
    pub trajectory: TrajectoryInfo,
    pub atomic_hierarchy: Arc<AtomicHierarchy>,
    pub atomic_conformation: Arc<AtomicConformation>,
    pub coarse_hierarchy: Arc<CoarseHierarchy>,
    pub coarse_conformation: Arc<CoarseConformation>,
    pub entities: Arc<Entities>,
    pub chem_comps: Arc<ChemicalComponentMap>,
    pub bonds: ModelBonds,
    derived: Arc<ModelDerived>,
    intra_bond_cache: Arc<ElementSetCache<IntraUnitBonds>>,
}

pub(crate) struct ModelParts {
    pub entry_id: String,
    pub label: String,
    pub model_num: i32,
    pub atomic_hierarchy: AtomicHierarchy,
    pub atomic_conformation: AtomicConformation,
    pub coarse_hierarchy: CoarseHierarchy,
    pub coarse_conformation: CoarseConformation,
    pub entities: Entities,
    pub chem_comps: ChemicalComponentMap,
    pub bonds: ModelBonds,
    pub bond_cache_capacity: usize,
}

impl Model {
    pub(crate) fn from_parts(parts: ModelParts) -> Self {
        Self {
            id: ModelId::next(),
            entry_id: parts.entry_id,
            label: parts.label,
            model_num: parts.model_num,
            trajectory: TrajectoryInfo::default(),
            atomic_hierarchy: Arc::new(parts.atomic_hierarchy),
            atomic_conformation: Arc::new(parts.atomic_conformation),
            coarse_hierarchy: Arc::new(parts.coarse_hierarchy),
            coarse_conformation: Arc::new(parts.coarse_conformation),
            entities: Arc::new(parts.entities),
            chem_comps: Arc::new(parts.chem_comps),
            bonds: parts.bonds,
            derived: Arc::new(ModelDerived::default()),
            intra_bond_cache: Arc::new(ElementSetCache::with_capacity(parts.bond_cache_capacity)),
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    /// A new frame of this model: same hierarchy, bond tables and derived data, new coordinates.
    pub fn with_conformation(
        &self,
        coordinates: Coordinates,
        trajectory: TrajectoryInfo,
    ) -> Result<Model, ModelError> {
        let expected = self.atomic_hierarchy.atom_count();
        if coordinates.len() != expected {
            return Err(ModelError::FrameSizeMismatch {
                expected,
                actual: coordinates.len(),
            });
        }
        let conformation = AtomicConformation::new(
            coordinates,
            self.atomic_conformation.occupancy.to_vec(),
            self.atomic_conformation.b_iso.to_vec(),
        );
        tracing::debug!(
            frame = trajectory.index,
            atoms = expected,
            "Created trajectory frame."
        );
        Ok(Self {
            id: ModelId::next(),
            entry_id: self.entry_id.clone(),
            label: self.label.clone(),
            model_num: self.model_num,
            trajectory,
            atomic_hierarchy: Arc::clone(&self.atomic_hierarchy),
            atomic_conformation: Arc::new(conformation),
            coarse_hierarchy: Arc::clone(&self.coarse_hierarchy),
            coarse_conformation: Arc::clone(&self.coarse_conformation),
            entities: Arc::clone(&self.entities),
            chem_comps: Arc::clone(&self.chem_comps),
            bonds: self.bonds.clone(),
            derived: Arc::clone(&self.derived),
            intra_bond_cache: Arc::new(ElementSetCache::with_capacity(
                self.intra_bond_cache_capacity(),
            )),
        })
    }

    fn intra_bond_cache_capacity(&self) -> usize {
        self.intra_bond_cache.capacity()
    }

    pub(crate) fn intra_bond_cache(&self) -> &ElementSetCache<IntraUnitBonds> {
        &self.intra_bond_cache
    }

    pub fn atom_count(&self) -> usize {
        self.atomic_hierarchy.atom_count()
    }

    pub fn residue_types(&self) -> &[MoleculeType] {
        self.derived.residue_types.get_or_init(|| {
            let h = &self.atomic_hierarchy;
            (0..h.residue_count() as u32)
                .map(|r| self.chem_comps.molecule_type(h.comp_id(r)))
                .collect()
        })
    }

    pub fn residue_molecule_type(&self, residue: ResidueIndex) -> MoleculeType {
        self.residue_types()[residue as usize]
    }

    pub fn atom_molecule_type(&self, atom: ElementIndex) -> MoleculeType {
        self.residue_molecule_type(self.atomic_hierarchy.residue_of(atom))
    }

    /// The atom carrying the polymer trace (CA, C4' or P) of a polymer residue.
    pub fn trace_element(&self, residue: ResidueIndex) -> Option<ElementIndex> {
        self.derived.trace_elements.get_or_init(|| {
            let h = &self.atomic_hierarchy;
            let types = self.residue_types();
            (0..h.residue_count() as u32)
                .map(|r| {
                    let kind = types[r as usize];
                    if !kind.is_polymer() {
                        return None;
                    }
                    let names: &[&str] = if kind.is_nucleic() {
                        &["C4'", "C4*", "P"]
                    } else {
                        &["CA"]
                    };
                    names
                        .iter()
                        .find_map(|name| h.residue_atoms(r).find(|&a| h.atom_name(a) == *name))
                })
                .collect()
        })[residue as usize]
    }

    pub fn chain_entity_type(&self, chain: ChainIndex) -> Option<EntityType> {
        let entity = &self.atomic_hierarchy.chains.label_entity_id[chain as usize];
        self.entities.entity_type(entity)
    }

    /// Whether the chain is a water entity, or consists of water residues only.
    pub fn is_water_chain(&self, chain: ChainIndex) -> bool {
        self.derived.water_chains.get_or_init(|| {
            let h = &self.atomic_hierarchy;
            let types = self.residue_types();
            (0..h.chain_count() as u32)
                .map(|c| {
                    if self.chain_entity_type(c) == Some(EntityType::Water) {
                        return true;
                    }
                    let residues = h.chain_residue_segments.range(c);
                    !residues.is_empty()
                        && residues.into_iter().all(|r| types[r as usize] == MoleculeType::Water)
                })
                .collect()
        })[chain as usize]
    }

    /// Coarse-grained models carry only trace atoms (CA/P), or only coarse elements.
    pub fn is_coarse_grained(&self) -> bool {
        *self.derived.coarse_grained.get_or_init(|| {
            let h = &self.atomic_hierarchy;
            if h.atom_count() == 0 {
                return !self.coarse_hierarchy.is_empty();
            }
            h.atoms.label_atom_id.iter().all(|name| is_trace_atom(name))
        })
    }

    pub fn source_index_map(&self) -> &HashMap<u32, ElementIndex> {
        self.derived.source_index_map.get_or_init(|| {
            self.atomic_hierarchy
                .atoms
                .source_index
                .iter()
                .enumerate()
                .map(|(i, &s)| (s, i as ElementIndex))
                .collect()
        })
    }

    pub fn element_of_source(&self, source_index: u32) -> Option<ElementIndex> {
        self.source_index_map().get(&source_index).copied()
    }

    /// Whether both models carry the very same index-pair table.
    pub fn shares_index_pairs_with(&self, other: &Model) -> bool {
        match (&self.bonds.index_pairs, &other.bonds.index_pairs) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::small_protein_model;
    use super::*;

    #[test]
    fn residue_types_are_classified_from_names() {
        let model = small_protein_model();
        assert_eq!(model.residue_molecule_type(0), MoleculeType::Protein);
        assert_eq!(model.residue_molecule_type(2), MoleculeType::Water);
        assert_eq!(model.residue_molecule_type(3), MoleculeType::Ion);
    }

    #[test]
    fn trace_element_finds_alpha_carbon() {
        let model = small_protein_model();
        assert_eq!(model.trace_element(0), Some(1));
        assert_eq!(model.trace_element(1), Some(5));
        assert_eq!(model.trace_element(2), None);
    }

    #[test]
    fn water_chains_are_detected() {
        let model = small_protein_model();
        assert!(!model.is_water_chain(0));
        assert!(model.is_water_chain(1));
        assert!(!model.is_water_chain(2));
    }

    #[test]
    fn full_atom_model_is_not_coarse_grained() {
        assert!(!small_protein_model().is_coarse_grained());
    }

    #[test]
    fn with_conformation_shares_hierarchy_and_checks_size() {
        let model = small_protein_model();
        let n = model.atom_count();
        let frame = model
            .with_conformation(
                Coordinates::new(vec![1.0; n], vec![2.0; n], vec![3.0; n]),
                TrajectoryInfo { index: 1, size: 2 },
            )
            .unwrap();
        assert!(Arc::ptr_eq(&frame.atomic_hierarchy, &model.atomic_hierarchy));
        assert_ne!(frame.id(), model.id());
        assert_ne!(
            frame.atomic_conformation.version,
            model.atomic_conformation.version
        );

        let err = model
            .with_conformation(Coordinates::default(), TrajectoryInfo::default())
            .unwrap_err();
        assert_eq!(err, ModelError::FrameSizeMismatch { expected: n, actual: 0 });
    }

    #[test]
    fn source_index_map_inverts_source_indices() {
        let model = small_protein_model();
        for atom in 0..model.atom_count() as u32 {
            let source = model.atomic_hierarchy.atoms.source_index[atom as usize];
            assert_eq!(model.element_of_source(source), Some(atom));
        }
    }
}
