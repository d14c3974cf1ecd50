use super::builder::StructureBuilder;
use super::structure::{Structure, StructureProps};
use super::unit::{UnitKind, UnitTraits};
use crate::config::StructureConfig;
use crate::core::collections::SortedArray;
use crate::core::model::Model;
use crate::core::model::hierarchy::ChainIndex;
use crate::core::symmetry::SymmetryOperator;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Water units with more atoms than this are split into partitions of contiguous residues.
pub const WATER_PARTITION_ATOM_COUNT: usize = 4096;

fn is_single_atom_chain(model: &Model, chain: ChainIndex) -> bool {
    model.atomic_hierarchy.chain_atoms(chain).len() == 1
}

fn same_entity_and_auth_chain(model: &Model, a: ChainIndex, b: ChainIndex) -> bool {
    let chains = &model.atomic_hierarchy.chains;
    chains.label_entity_id[a as usize] == chains.label_entity_id[b as usize]
        && chains.auth_asym_id[a as usize] == chains.auth_asym_id[b as usize]
}

/// Number of chains starting at `start` that form one unit: runs of water chains, or runs of
/// single-atom chains of the same entity and author chain.
fn merged_chain_run(model: &Model, start: ChainIndex) -> u32 {
    let chain_count = model.atomic_hierarchy.chain_count() as u32;
    let mut end = start + 1;
    if model.is_water_chain(start) {
        while end < chain_count && model.is_water_chain(end) {
            end += 1;
        }
    } else if is_single_atom_chain(model, start) {
        while end < chain_count
            && is_single_atom_chain(model, end)
            && !model.is_water_chain(end)
            && same_entity_and_auth_chain(model, start, end)
        {
            end += 1;
        }
    }
    end - start
}

/// Splits a water unit into contiguous residue blocks of at most
/// [`WATER_PARTITION_ATOM_COUNT`] atoms.
fn water_partitions(model: &Model, elements: &SortedArray) -> Vec<SortedArray> {
    let h = &model.atomic_hierarchy;
    let mut partitions = Vec::new();
    let mut current: Vec<u32> = Vec::new();
    for chunk in h.residue_atom_segments.chunks(elements) {
        let residue_atoms = &elements[chunk.start..chunk.end];
        if !current.is_empty() && current.len() + residue_atoms.len() > WATER_PARTITION_ATOM_COUNT {
            partitions.push(SortedArray::from_sorted_unchecked(std::mem::take(&mut current)));
        }
        current.extend_from_slice(residue_atoms);
    }
    if !current.is_empty() {
        partitions.push(SortedArray::from_sorted_unchecked(current));
    }
    partitions
}

impl Structure {
    /// One unit per chain of the model, placed by the identity operator.
    ///
    /// Consecutive water chains are merged into one unit, as are consecutive single-atom
    /// chains of the same entity and author chain. Coarse spheres and gaussians contribute
    /// one unit per coarse chain segment.
    #[instrument(skip_all, name = "structure_of_model", fields(entry = %model.entry_id))]
    pub fn of_model(model: Arc<Model>, props: StructureProps) -> Structure {
        let identity = Arc::new(SymmetryOperator::default());
        let mut builder = StructureBuilder::new(props);
        let h = &model.atomic_hierarchy;
        let chain_count = h.chain_count() as u32;

        let mut chain = 0;
        while chain < chain_count {
            let run = merged_chain_run(&model, chain);
            let start = h.chain_atoms(chain).start;
            let end = h.chain_atoms(chain + run - 1).end;
            let elements = SortedArray::of_range(start, end);
            let traits = if run > 1 {
                UnitTraits::MULTI_CHAIN
            } else {
                UnitTraits::empty()
            };

            if model.is_water_chain(chain) && elements.len() > WATER_PARTITION_ATOM_COUNT {
                let partitions = water_partitions(&model, &elements);
                debug!(
                    chain,
                    atoms = elements.len(),
                    partitions = partitions.len(),
                    "Partitioned water unit."
                );
                for part in partitions {
                    builder.add_unit(
                        UnitKind::Atomic,
                        &model,
                        Arc::clone(&identity),
                        part,
                        traits | UnitTraits::PARTITIONED | UnitTraits::FAST_BOUNDARY,
                        None,
                    );
                }
            } else if !elements.is_empty() {
                builder.add_unit(UnitKind::Atomic, &model, Arc::clone(&identity), elements, traits, None);
            }
            chain += run;
        }

        let coarse = &model.coarse_hierarchy;
        for (kind, elements) in [
            (UnitKind::Spheres, &coarse.spheres),
            (UnitKind::Gaussians, &coarse.gaussians),
        ] {
            for segment in 0..elements.chain_segments.count() as u32 {
                let range = elements.chain_segments.range(segment);
                if range.is_empty() {
                    continue;
                }
                builder.add_unit(
                    kind,
                    &model,
                    Arc::clone(&identity),
                    SortedArray::of_range(range.start, range.end),
                    UnitTraits::FAST_BOUNDARY,
                    None,
                );
            }
        }

        debug!(units = builder.unit_count(), "Created structure from model.");
        builder.get_structure()
    }

    pub fn of_model_with_config(model: Arc<Model>, config: &StructureConfig) -> Structure {
        Self::of_model(model, StructureProps::from_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chemistry::Element;
    use crate::core::model::builder::{AtomRecord, CoarseRecord, ModelBuilder};
    use crate::core::model::entities::EntityType;
    use crate::core::model::test_fixtures::small_protein_model;
    use nalgebra::Point3;

    #[test]
    fn one_unit_per_chain() {
        let s = Structure::of_model(small_protein_model(), StructureProps::default());
        assert_eq!(s.unit_count(), 3);
        let sizes: Vec<_> = s.units().iter().map(|u| u.element_count()).collect();
        assert_eq!(sizes, vec![6, 1, 1]);
        assert!(s.units()[1].is_water());
        assert!(s.units()[2].is_ion());
        assert!(s.units().iter().all(|u| u.operator().is_identity));
        let invariants: Vec<_> = s.units().iter().map(|u| u.invariant_id()).collect();
        assert_eq!(invariants, vec![0, 1, 2]);
    }

    fn model_with_split_chains() -> Arc<Model> {
        let mut b = ModelBuilder::new("SPLIT");
        b.add_entity("1", EntityType::Water, "water");
        b.add_entity("2", EntityType::NonPolymer, "sodium");
        for (i, asym) in ["W1", "W2", "W3"].iter().enumerate() {
            let c = b.add_chain(asym, "A", "1").unwrap();
            let r = b.add_residue(c, "HOH", 0, 100 + i as i32).unwrap();
            b.add_atom(r, AtomRecord::new("O", Element::O, Point3::new(10.0 * i as f64, 0.0, 0.0)))
                .unwrap();
        }
        for (i, (asym, auth)) in [("N1", "B"), ("N2", "B"), ("N3", "C")].iter().enumerate() {
            let c = b.add_chain(asym, auth, "2").unwrap();
            let r = b.add_residue(c, "NA", 0, 200 + i as i32).unwrap();
            b.add_atom(r, AtomRecord::new("NA", Element::from_symbol("NA"), Point3::new(0.0, 10.0 * i as f64, 0.0)))
                .unwrap();
        }
        Arc::new(b.build().unwrap())
    }

    #[test]
    fn consecutive_water_and_single_atom_chains_are_merged() {
        let s = Structure::of_model(model_with_split_chains(), StructureProps::default());
        let sizes: Vec<_> = s.units().iter().map(|u| u.element_count()).collect();
        assert_eq!(sizes, vec![3, 2, 1]);
        assert!(s.units()[0].traits().contains(UnitTraits::MULTI_CHAIN));
        assert!(s.units()[1].traits().contains(UnitTraits::MULTI_CHAIN));
        assert!(!s.units()[2].traits().contains(UnitTraits::MULTI_CHAIN));
    }

    #[test]
    fn coarse_chains_become_sphere_units() {
        let mut b = ModelBuilder::new("COARSE");
        for (i, asym) in ["A", "A", "B"].iter().enumerate() {
            b.add_sphere(
                CoarseRecord::new("1", asym, (i as i32 + 1, i as i32 + 1), Point3::new(i as f64 * 4.0, 0.0, 0.0)),
                2.0,
            );
        }
        let s = Structure::of_model(Arc::new(b.build().unwrap()), StructureProps::default());
        assert_eq!(s.unit_count(), 2);
        assert!(s.units().iter().all(|u| u.kind() == UnitKind::Spheres));
        assert!(s.units()[0].traits().contains(UnitTraits::FAST_BOUNDARY));
        assert_eq!(s.units()[0].element_count(), 2);
    }

    #[test]
    fn config_props_reach_units() {
        let mut config = StructureConfig::default();
        config.bonds.intra.force_compute = true;
        config.dynamic_bonds = true;
        let s = Structure::of_model_with_config(small_protein_model(), &config);
        assert!(s.dynamic_bonds());
        assert!(s.units()[0].bond_props().force_compute);
    }
}
