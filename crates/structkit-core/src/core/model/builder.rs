use super::bonds::{
    ComponentBondDictionary, IndexPairBond, IndexPairBonds, ModelBonds, StructConn,
    StructConnEntry, StructConnKind, StructConnPartner,
};
use super::coarse::{CoarseConformation, CoarseElements, CoarseGaussians, CoarseHierarchy, CoarseSpheres};
use super::conformation::{AtomicConformation, Coordinates};
use super::entities::{ChemicalComponent, ChemicalComponentMap, Entities, Entity, EntityType};
use super::error::ModelError;
use super::hierarchy::{AtomTable, AtomicHierarchy, ChainIndex, ChainTable, ResidueIndex, ResidueTable};
use super::{Model, ModelParts};
use crate::core::chemistry::Element;
use crate::core::collections::element_set_cache::DEFAULT_CAPACITY;
use crate::core::collections::{ElementIndex, Segmentation};
use nalgebra::{Matrix3, Point3};
use std::collections::HashMap;
use std::sync::Arc;

/// One atom to append to the most recently added residue.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub name: String,
    pub element: Element,
    pub position: Point3<f64>,
    pub alt_id: String,
    pub occupancy: f64,
    pub b_iso: f64,
    /// Index of the atom in the source file; defaults to the atom's own index.
    pub source_index: Option<u32>,
}

impl AtomRecord {
    pub fn new(name: &str, element: Element, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            element,
            position,
            alt_id: String::new(),
            occupancy: 1.0,
            b_iso: 0.0,
            source_index: None,
        }
    }

    pub fn with_alt_id(mut self, alt_id: &str) -> Self {
        self.alt_id = alt_id.to_string();
        self
    }

    pub fn with_occupancy(mut self, occupancy: f64) -> Self {
        self.occupancy = occupancy;
        self
    }

    pub fn with_b_iso(mut self, b_iso: f64) -> Self {
        self.b_iso = b_iso;
        self
    }

    pub fn with_source_index(mut self, source_index: u32) -> Self {
        self.source_index = Some(source_index);
        self
    }
}

/// One coarse element (sphere or gaussian) covering a sequence range.
#[derive(Debug, Clone, PartialEq)]
pub struct CoarseRecord {
    pub entity_id: String,
    pub asym_id: String,
    pub seq_id_begin: i32,
    pub seq_id_end: i32,
    pub position: Point3<f64>,
}

impl CoarseRecord {
    pub fn new(entity_id: &str, asym_id: &str, seq_id: (i32, i32), position: Point3<f64>) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            asym_id: asym_id.to_string(),
            seq_id_begin: seq_id.0,
            seq_id_end: seq_id.1,
            position,
        }
    }
}

#[derive(Debug, Default)]
struct CoarseColumns {
    records: Vec<CoarseRecord>,
}

impl CoarseColumns {
    fn elements(&self) -> CoarseElements {
        let mut sizes = Vec::new();
        let mut previous: Option<(&str, &str)> = None;
        for r in &self.records {
            let key = (r.entity_id.as_str(), r.asym_id.as_str());
            if previous == Some(key) {
                if let Some(last) = sizes.last_mut() {
                    *last += 1;
                }
            } else {
                sizes.push(1u32);
                previous = Some(key);
            }
        }
        CoarseElements {
            entity_id: self.records.iter().map(|r| r.entity_id.clone()).collect(),
            asym_id: self.records.iter().map(|r| r.asym_id.clone()).collect(),
            seq_id_begin: self.records.iter().map(|r| r.seq_id_begin).collect(),
            seq_id_end: self.records.iter().map(|r| r.seq_id_end).collect(),
            chain_segments: Segmentation::from_sizes(sizes),
        }
    }

    fn coordinates(&self) -> Coordinates {
        let points: Vec<_> = self.records.iter().map(|r| r.position).collect();
        Coordinates::from_points(&points)
    }
}

/// Builds a [`Model`] by appending chains, residues and atoms in file order.
///
/// Atoms are always appended to the most recently added residue, and residues to the most
/// recently added chain, so the hierarchy stays contiguous.
#[derive(Debug)]
pub struct ModelBuilder {
    entry_id: String,
    label: String,
    model_num: i32,
    atoms: AtomTable,
    positions: Vec<Point3<f64>>,
    occupancy: Vec<f64>,
    b_iso: Vec<f64>,
    residues: ResidueTable,
    residue_sizes: Vec<u32>,
    chains: ChainTable,
    chain_residue_sizes: Vec<u32>,
    entities: Entities,
    chem_comps: ChemicalComponentMap,
    spheres: CoarseColumns,
    sphere_radius: Vec<f64>,
    gaussians: CoarseColumns,
    gaussian_weight: Vec<f64>,
    gaussian_covariance: Vec<Matrix3<f64>>,
    struct_conn: Vec<StructConnEntry>,
    struct_conn_exhaustive: bool,
    index_pairs: Option<Vec<IndexPairBond>>,
    source_index_pairs: Vec<(u32, u32, IndexPairBond)>,
    index_pair_max_distance: Option<f64>,
    component_bonds: Option<Arc<ComponentBondDictionary>>,
    bond_cache_capacity: usize,
}

impl ModelBuilder {
    pub fn new(entry_id: &str) -> Self {
        Self {
            entry_id: entry_id.to_string(),
            label: entry_id.to_string(),
            model_num: 1,
            atoms: AtomTable::default(),
            positions: Vec::new(),
            occupancy: Vec::new(),
            b_iso: Vec::new(),
            residues: ResidueTable::default(),
            residue_sizes: Vec::new(),
            chains: ChainTable::default(),
            chain_residue_sizes: Vec::new(),
            entities: Entities::default(),
            chem_comps: ChemicalComponentMap::default(),
            spheres: CoarseColumns::default(),
            sphere_radius: Vec::new(),
            gaussians: CoarseColumns::default(),
            gaussian_weight: Vec::new(),
            gaussian_covariance: Vec::new(),
            struct_conn: Vec::new(),
            struct_conn_exhaustive: false,
            index_pairs: None,
            source_index_pairs: Vec::new(),
            index_pair_max_distance: None,
            component_bonds: None,
            bond_cache_capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn label(&mut self, label: &str) -> &mut Self {
        self.label = label.to_string();
        self
    }

    pub fn model_num(&mut self, model_num: i32) -> &mut Self {
        self.model_num = model_num;
        self
    }

    /// Number of element sets whose intra-unit bonds the model keeps cached.
    pub fn bond_cache_capacity(&mut self, capacity: usize) -> &mut Self {
        self.bond_cache_capacity = capacity;
        self
    }

    pub fn add_entity(&mut self, id: &str, entity_type: EntityType, description: &str) -> &mut Self {
        self.entities.insert(Entity {
            id: id.to_string(),
            entity_type,
            description: description.to_string(),
        });
        self
    }

    pub fn add_chem_comp(&mut self, id: &str, comp_type: &str, name: &str) -> &mut Self {
        self.chem_comps.insert(ChemicalComponent {
            id: id.to_string(),
            comp_type: comp_type.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn add_chain(
        &mut self,
        label_asym_id: &str,
        auth_asym_id: &str,
        entity_id: &str,
    ) -> Result<ChainIndex, ModelError> {
        if !self.entities.contains(entity_id) {
            return Err(ModelError::UnknownEntity(entity_id.to_string()));
        }
        self.chains.label_asym_id.push(label_asym_id.to_string());
        self.chains.auth_asym_id.push(auth_asym_id.to_string());
        self.chains.label_entity_id.push(entity_id.to_string());
        self.chain_residue_sizes.push(0);
        Ok((self.chains.label_asym_id.len() - 1) as ChainIndex)
    }

    /// Appends a residue to `chain`, which must be the most recently added chain.
    ///
    /// Consecutive residues of a chain sharing a non-zero `label_seq_id` are flagged as
    /// micro-heterogeneous.
    pub fn add_residue(
        &mut self,
        chain: ChainIndex,
        comp_id: &str,
        label_seq_id: i32,
        auth_seq_id: i32,
    ) -> Result<ResidueIndex, ModelError> {
        let chain_count = self.chains.label_asym_id.len();
        if chain as usize >= chain_count {
            return Err(ModelError::UnknownChain(chain));
        }
        if chain as usize != chain_count - 1 {
            return Err(ModelError::OutOfOrder("residue"));
        }

        let index = self.residues.label_comp_id.len();
        let mut heterogeneous = false;
        if self.chain_residue_sizes[chain as usize] > 0 && label_seq_id != 0 {
            let previous = index - 1;
            if self.residues.label_seq_id[previous] == label_seq_id {
                self.residues.microheterogeneity[previous] = true;
                heterogeneous = true;
            }
        }

        self.residues.label_comp_id.push(comp_id.to_string());
        self.residues.label_seq_id.push(label_seq_id);
        self.residues.auth_seq_id.push(auth_seq_id);
        self.residues.ins_code.push(String::new());
        self.residues.microheterogeneity.push(heterogeneous);
        self.residue_sizes.push(0);
        self.chain_residue_sizes[chain as usize] += 1;
        Ok(index as ResidueIndex)
    }

    pub fn set_ins_code(&mut self, residue: ResidueIndex, ins_code: &str) -> Result<(), ModelError> {
        let slot = self
            .residues
            .ins_code
            .get_mut(residue as usize)
            .ok_or(ModelError::UnknownResidue(residue))?;
        *slot = ins_code.to_string();
        Ok(())
    }

    pub fn set_microheterogeneity(&mut self, residue: ResidueIndex, value: bool) -> Result<(), ModelError> {
        let slot = self
            .residues
            .microheterogeneity
            .get_mut(residue as usize)
            .ok_or(ModelError::UnknownResidue(residue))?;
        *slot = value;
        Ok(())
    }

    /// Appends an atom to `residue`, which must be the most recently added residue.
    pub fn add_atom(&mut self, residue: ResidueIndex, atom: AtomRecord) -> Result<ElementIndex, ModelError> {
        let residue_count = self.residues.label_comp_id.len();
        if residue as usize >= residue_count {
            return Err(ModelError::UnknownResidue(residue));
        }
        let latest_chain_has_residues = self.chain_residue_sizes.last().is_some_and(|&n| n > 0);
        if residue as usize != residue_count - 1 || !latest_chain_has_residues {
            return Err(ModelError::OutOfOrder("atom"));
        }

        let index = self.atoms.type_symbol.len() as ElementIndex;
        self.atoms.type_symbol.push(atom.element);
        self.atoms.label_atom_id.push(atom.name);
        self.atoms.label_alt_id.push(atom.alt_id);
        self.atoms.source_index.push(atom.source_index.unwrap_or(index));
        self.positions.push(atom.position);
        self.occupancy.push(atom.occupancy);
        self.b_iso.push(atom.b_iso);
        self.residue_sizes[residue as usize] += 1;
        Ok(index)
    }

    pub fn add_sphere(&mut self, record: CoarseRecord, radius: f64) -> ElementIndex {
        self.spheres.records.push(record);
        self.sphere_radius.push(radius);
        (self.sphere_radius.len() - 1) as ElementIndex
    }

    pub fn add_gaussian(&mut self, record: CoarseRecord, weight: f64, covariance: Matrix3<f64>) -> ElementIndex {
        self.gaussians.records.push(record);
        self.gaussian_weight.push(weight);
        self.gaussian_covariance.push(covariance);
        (self.gaussian_weight.len() - 1) as ElementIndex
    }

    /// Records an explicit connection; returns its row index.
    pub fn add_struct_conn(
        &mut self,
        kind: StructConnKind,
        order: u8,
        partner_a: StructConnPartner,
        partner_b: StructConnPartner,
        distance: Option<f64>,
    ) -> u32 {
        let row_index = self.struct_conn.len() as u32;
        self.struct_conn.push(StructConnEntry {
            row_index,
            kind,
            order,
            flags: kind.flags(),
            partner_a,
            partner_b,
            distance,
        });
        row_index
    }

    pub fn set_struct_conn_exhaustive(&mut self, exhaustive: bool) -> &mut Self {
        self.struct_conn_exhaustive = exhaustive;
        self
    }

    /// Declares that the model carries an index-pair table, even if it ends up empty.
    pub fn enable_index_pairs(&mut self, max_distance: Option<f64>) -> &mut Self {
        self.index_pairs.get_or_insert_with(Vec::new);
        self.index_pair_max_distance = max_distance;
        self
    }

    pub fn add_index_pair_bond(&mut self, bond: IndexPairBond) -> &mut Self {
        self.index_pairs.get_or_insert_with(Vec::new).push(bond);
        self
    }

    /// Adds a bond whose endpoints are given as source indices; resolved in [`build`](Self::build).
    pub fn add_index_pair_bond_by_source(&mut self, source_a: u32, source_b: u32, template: IndexPairBond) -> &mut Self {
        self.index_pairs.get_or_insert_with(Vec::new);
        self.source_index_pairs.push((source_a, source_b, template));
        self
    }

    pub fn set_component_bonds(&mut self, dictionary: Arc<ComponentBondDictionary>) -> &mut Self {
        self.component_bonds = Some(dictionary);
        self
    }

    fn validate_hierarchy(&self) -> Result<(), ModelError> {
        let mut residue = 0usize;
        for (chain, &count) in self.chain_residue_sizes.iter().enumerate() {
            let atoms: u32 = self.residue_sizes[residue..residue + count as usize].iter().sum();
            if count == 0 || atoms == 0 {
                return Err(ModelError::EmptyChain(self.chains.label_asym_id[chain].clone()));
            }
            residue += count as usize;
        }
        if let Some(empty) = self.residue_sizes.iter().position(|&n| n == 0) {
            return Err(ModelError::EmptyResidue(empty as u32));
        }
        Ok(())
    }

    fn source_map(&self) -> Result<HashMap<u32, ElementIndex>, ModelError> {
        let mut map = HashMap::with_capacity(self.atoms.source_index.len());
        for (i, &s) in self.atoms.source_index.iter().enumerate() {
            if map.insert(s, i as ElementIndex).is_some() {
                return Err(ModelError::DuplicateSourceIndex(s));
            }
        }
        Ok(map)
    }

    pub fn build(self) -> Result<Model, ModelError> {
        self.validate_hierarchy()?;
        let atom_count = self.atoms.type_symbol.len();
        let source_map = self.source_map()?;

        let residue_atom_segments = Segmentation::from_sizes(self.residue_sizes.iter().copied());
        let chain_residue_segments = Segmentation::from_sizes(self.chain_residue_sizes.iter().copied());
        let mut chain_atom_sizes = Vec::with_capacity(self.chain_residue_sizes.len());
        let mut residue = 0usize;
        for &count in &self.chain_residue_sizes {
            chain_atom_sizes.push(self.residue_sizes[residue..residue + count as usize].iter().sum::<u32>());
            residue += count as usize;
        }
        let chain_atom_segments = Segmentation::from_sizes(chain_atom_sizes);

        let hierarchy = AtomicHierarchy {
            atoms: self.atoms,
            residues: self.residues,
            chains: self.chains,
            residue_atom_segments,
            chain_atom_segments,
            chain_residue_segments,
        };

        let index_pairs = match self.index_pairs {
            Some(mut bonds) => {
                for (source_a, source_b, template) in self.source_index_pairs {
                    let a = *source_map
                        .get(&source_a)
                        .ok_or(ModelError::UnknownSourceIndex(source_a))?;
                    let b = *source_map
                        .get(&source_b)
                        .ok_or(ModelError::UnknownSourceIndex(source_b))?;
                    bonds.push(IndexPairBond { a, b, ..template });
                }
                Some(Arc::new(IndexPairBonds::new(
                    atom_count,
                    &bonds,
                    self.index_pair_max_distance,
                )?))
            }
            None => None,
        };

        for entry in &self.struct_conn {
            for partner in [&entry.partner_a, &entry.partner_b] {
                if partner.element as usize >= atom_count {
                    return Err(ModelError::BondOutOfRange {
                        index: partner.element,
                        count: atom_count,
                    });
                }
            }
        }
        let struct_conn = if self.struct_conn.is_empty() && !self.struct_conn_exhaustive {
            None
        } else {
            Some(Arc::new(StructConn::new(
                self.struct_conn,
                self.struct_conn_exhaustive,
                |atom| hierarchy.residue_of(atom),
            )))
        };

        let conformation = AtomicConformation::new(
            Coordinates::from_points(&self.positions),
            self.occupancy,
            self.b_iso,
        );

        let coarse_hierarchy = CoarseHierarchy {
            spheres: self.spheres.elements(),
            gaussians: self.gaussians.elements(),
        };
        let coarse_conformation = CoarseConformation {
            spheres: CoarseSpheres {
                coordinates: Arc::new(self.spheres.coordinates()),
                radius: Arc::from(self.sphere_radius),
            },
            gaussians: CoarseGaussians::new(
                self.gaussians.coordinates(),
                self.gaussian_weight,
                self.gaussian_covariance,
            ),
        };

        tracing::debug!(
            entry = %self.entry_id,
            atoms = atom_count,
            residues = hierarchy.residue_count(),
            chains = hierarchy.chain_count(),
            spheres = coarse_hierarchy.spheres.count(),
            gaussians = coarse_hierarchy.gaussians.count(),
            "Built model."
        );

        Ok(Model::from_parts(ModelParts {
            entry_id: self.entry_id,
            label: self.label,
            model_num: self.model_num,
            atomic_hierarchy: hierarchy,
            atomic_conformation: conformation,
            coarse_hierarchy,
            coarse_conformation,
            entities: self.entities,
            chem_comps: self.chem_comps,
            bonds: ModelBonds {
                index_pairs,
                struct_conn,
                component_bonds: self.component_bonds,
            },
            bond_cache_capacity: self.bond_cache_capacity,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder_with_entity() -> ModelBuilder {
        let mut b = ModelBuilder::new("1ABC");
        b.add_entity("1", EntityType::Polymer, "protein");
        b
    }

    #[test]
    fn add_chain_requires_registered_entity() {
        let mut b = ModelBuilder::new("1ABC");
        assert_eq!(
            b.add_chain("A", "A", "9"),
            Err(ModelError::UnknownEntity("9".into()))
        );
    }

    #[test]
    fn appends_must_target_the_latest_parent() {
        let mut b = builder_with_entity();
        let a = b.add_chain("A", "A", "1").unwrap();
        let r0 = b.add_residue(a, "ALA", 1, 1).unwrap();
        b.add_atom(r0, AtomRecord::new("CA", Element::C, Point3::origin())).unwrap();
        let _b_chain = b.add_chain("B", "B", "1").unwrap();
        assert_eq!(b.add_residue(a, "ALA", 2, 2), Err(ModelError::OutOfOrder("residue")));
        assert_eq!(
            b.add_atom(r0, AtomRecord::new("CB", Element::C, Point3::origin())),
            Err(ModelError::OutOfOrder("atom"))
        );
        assert_eq!(b.add_residue(7, "ALA", 2, 2), Err(ModelError::UnknownChain(7)));
    }

    #[test]
    fn build_rejects_empty_chains() {
        let mut b = builder_with_entity();
        let a = b.add_chain("A", "A", "1").unwrap();
        let r = b.add_residue(a, "ALA", 1, 1).unwrap();
        b.add_atom(r, AtomRecord::new("CA", Element::C, Point3::origin())).unwrap();
        b.add_chain("B", "B", "1").unwrap();
        assert_eq!(b.build().unwrap_err(), ModelError::EmptyChain("B".into()));
    }

    #[test]
    fn build_produces_consistent_segmentations() {
        let mut b = builder_with_entity();
        let a = b.add_chain("A", "A", "1").unwrap();
        for seq in 1..=3 {
            let r = b.add_residue(a, "GLY", seq, seq).unwrap();
            b.add_atom(r, AtomRecord::new("N", Element::N, Point3::new(seq as f64, 0.0, 0.0))).unwrap();
            b.add_atom(r, AtomRecord::new("CA", Element::C, Point3::new(seq as f64, 1.0, 0.0))).unwrap();
        }
        let model = b.build().unwrap();
        let h = &model.atomic_hierarchy;
        assert_eq!(h.atom_count(), 6);
        assert_eq!(h.residue_count(), 3);
        assert_eq!(h.residue_of(5), 2);
        assert_eq!(h.chain_atoms(0), 0..6);
        assert_eq!(model.atomic_conformation.coordinates.point(3), Point3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn repeated_sequence_ids_are_flagged_microheterogeneous() {
        let mut b = builder_with_entity();
        let a = b.add_chain("A", "A", "1").unwrap();
        let r0 = b.add_residue(a, "SER", 5, 5).unwrap();
        b.add_atom(r0, AtomRecord::new("CA", Element::C, Point3::origin())).unwrap();
        let r1 = b.add_residue(a, "THR", 5, 5).unwrap();
        b.add_atom(r1, AtomRecord::new("CA", Element::C, Point3::origin())).unwrap();
        let model = b.build().unwrap();
        assert_eq!(model.atomic_hierarchy.residues.microheterogeneity, vec![true, true]);
    }

    #[test]
    fn index_pairs_by_source_are_resolved_through_source_map() {
        let mut b = builder_with_entity();
        let a = b.add_chain("A", "A", "1").unwrap();
        let r = b.add_residue(a, "GLY", 1, 1).unwrap();
        b.add_atom(r, AtomRecord::new("N", Element::N, Point3::origin()).with_source_index(100)).unwrap();
        b.add_atom(r, AtomRecord::new("CA", Element::C, Point3::new(1.5, 0.0, 0.0)).with_source_index(200))
            .unwrap();
        b.add_index_pair_bond_by_source(200, 100, IndexPairBond::new(0, 0).with_order(1));
        let model = b.build().unwrap();
        let table = model.bonds.index_pairs.as_ref().unwrap();
        assert_eq!(table.edges_of(0)[0].other, 1);
    }

    #[test]
    fn unknown_source_index_is_reported() {
        let mut b = builder_with_entity();
        let a = b.add_chain("A", "A", "1").unwrap();
        let r = b.add_residue(a, "GLY", 1, 1).unwrap();
        b.add_atom(r, AtomRecord::new("N", Element::N, Point3::origin())).unwrap();
        b.add_index_pair_bond_by_source(0, 42, IndexPairBond::new(0, 0));
        assert_eq!(b.build().unwrap_err(), ModelError::UnknownSourceIndex(42));
    }

    #[test]
    fn coarse_elements_are_segmented_by_chain() {
        let mut b = ModelBuilder::new("COARSE");
        b.add_sphere(CoarseRecord::new("1", "A", (1, 1), Point3::origin()), 2.0);
        b.add_sphere(CoarseRecord::new("1", "A", (2, 2), Point3::new(3.0, 0.0, 0.0)), 2.0);
        b.add_sphere(CoarseRecord::new("1", "B", (1, 1), Point3::new(9.0, 0.0, 0.0)), 2.0);
        b.add_gaussian(
            CoarseRecord::new("1", "A", (1, 10), Point3::origin()),
            1.0,
            Matrix3::identity() * 9.0,
        );
        let model = b.build().unwrap();
        assert_eq!(model.coarse_hierarchy.spheres.chain_segments.count(), 2);
        assert_eq!(model.coarse_hierarchy.gaussians.chain_segments.count(), 1);
        assert!((model.coarse_conformation.gaussians.radius[0] - 3.0).abs() < 1e-12);
        assert!(model.is_coarse_grained());
    }

    #[test]
    fn struct_conn_partners_are_range_checked() {
        let mut b = builder_with_entity();
        let a = b.add_chain("A", "A", "1").unwrap();
        let r = b.add_residue(a, "CYS", 1, 1).unwrap();
        b.add_atom(r, AtomRecord::new("SG", Element::S, Point3::origin())).unwrap();
        b.add_struct_conn(
            StructConnKind::Disulfide,
            1,
            StructConnPartner::new(0),
            StructConnPartner::new(3),
            Some(2.05),
        );
        assert_eq!(
            b.build().unwrap_err(),
            ModelError::BondOutOfRange { index: 3, count: 1 }
        );
    }
}
