use super::common::{
    COARSE_INTER_RESIDUE_MAX_DISTANCE, COARSE_INTRA_RESIDUE_MAX_DISTANCE, COARSE_SEARCH_RADIUS,
    alt_ids_compatible, geometric_bond_flags, is_hydrogen_pair, pairing_threshold,
};
use super::graph::{BondGraph, BondGraphBuilder, BondProps};
use super::index_pair::{can_get_from_index_pair_bonds, find_index_pair_bonds, get_index_pair_bonds};
use crate::config::IntraBondProps;
use crate::core::chemistry::{BondType, MoleculeType};
use crate::core::model::bonds::StructConn;
use crate::core::model::hierarchy::ResidueIndex;
use crate::structure::unit::{Unit, UnitKind};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Where the edges of an intra-unit bond graph came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondSource {
    /// Sliced from the model's index-pair table by operator key.
    IndexPairSlice,
    /// Index-pair candidates confirmed against the actual geometry.
    IndexPairGeometry,
    /// Explicit connectivity, dictionary lookups and distance inference.
    Geometry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntraUnitBonds {
    graph: BondGraph,
    source: BondSource,
    can_remap: bool,
}

impl IntraUnitBonds {
    pub fn new(graph: BondGraph, source: BondSource, can_remap: bool) -> Self {
        Self {
            graph,
            source,
            can_remap,
        }
    }

    pub fn empty(element_count: usize) -> Self {
        Self::new(BondGraph::empty(element_count), BondSource::Geometry, true)
    }

    /// Edges over unit-local indices.
    pub fn graph(&self) -> &BondGraph {
        &self.graph
    }

    pub fn source(&self) -> BondSource {
        self.source
    }

    /// Whether the edges stay valid for other coordinates of the same elements.
    pub fn can_remap(&self) -> bool {
        self.can_remap
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

fn cache_tag(unit: &Unit) -> i32 {
    match unit.kind() {
        UnitKind::Atomic if can_get_from_index_pair_bonds(unit) => unit.operator().key,
        UnitKind::Atomic => -1,
        UnitKind::Spheres => -2,
        UnitKind::Gaussians => -3,
    }
}

/// Bonds of `unit`, shared through the model's element-set cache when the unit uses the
/// default bond settings.
pub(crate) fn cached_intra_unit_bonds(unit: &Unit) -> Arc<IntraUnitBonds> {
    let props = unit.bond_props();
    if *props != IntraBondProps::default() {
        return Arc::new(compute_intra_unit_bonds(unit, props));
    }
    let cache = unit.model().intra_bond_cache();
    let tag = cache_tag(unit);
    if let Some(bonds) = cache.get(tag, unit.elements()) {
        trace!(unit = unit.id(), "Reusing cached intra-unit bonds.");
        return bonds;
    }
    cache.insert(tag, unit.elements(), Arc::new(compute_intra_unit_bonds(unit, props)))
}

/// Computes the bonds between the elements of a single unit.
///
/// The first applicable source wins for the whole unit: the index-pair table (sliced by
/// operator key, or re-derived geometrically when the key cannot be matched), then explicit
/// connectivity, dictionary lookups and distance inference.
#[instrument(skip_all, name = "intra_unit_bonds", fields(unit = unit.id(), elements = unit.element_count()))]
pub fn compute_intra_unit_bonds(unit: &Unit, props: &IntraBondProps) -> IntraUnitBonds {
    let n = unit.element_count();
    if n <= 1 || props.no_compute {
        return IntraUnitBonds::empty(n);
    }
    if unit.is_coarse() {
        return find_coarse_bonds(unit);
    }

    if unit.model().bonds.index_pairs.is_some() && !props.force_compute {
        let bonds = if can_get_from_index_pair_bonds(unit) {
            get_index_pair_bonds(unit)
        } else {
            find_index_pair_bonds(unit)
        };
        if let Some(bonds) = bonds {
            debug!(
                edges = bonds.edge_count(),
                source = ?bonds.source(),
                "Bonds taken from index-pair table."
            );
            return bonds;
        }
    }

    let bonds = find_bonds(unit, props);
    debug!(
        edges = bonds.edge_count(),
        can_remap = bonds.can_remap(),
        "Bonds inferred."
    );
    bonds
}

/// Distance inference between coarse elements, with a larger cutoff inside one residue range.
fn find_coarse_bonds(unit: &Unit) -> IntraUnitBonds {
    let n = unit.element_count();
    let Ok(coarse) = unit.coarse_elements() else {
        return IntraUnitBonds::empty(n);
    };
    let elements = unit.elements();
    let lookup = unit.lookup3d();
    let mut builder = BondGraphBuilder::new(n);

    for i in 0..n {
        let p = unit.invariant_position(i);
        let found = lookup.find(p.x, p.y, p.z, COARSE_SEARCH_RADIUS);
        for (j, d2) in found.iter() {
            if (j as usize) <= i || d2 == 0.0 {
                continue;
            }
            let threshold = if coarse.same_residue(elements[i], elements[j as usize]) {
                COARSE_INTRA_RESIDUE_MAX_DISTANCE
            } else {
                COARSE_INTER_RESIDUE_MAX_DISTANCE
            };
            if d2 <= threshold * threshold {
                builder.add(i as u32, j, BondProps::computed(BondType::COVALENT));
            }
        }
    }
    IntraUnitBonds::new(builder.build(), BondSource::Geometry, false)
}

fn find_bonds(unit: &Unit, props: &IntraBondProps) -> IntraUnitBonds {
    let model = unit.model();
    let h = &model.atomic_hierarchy;
    let elements = unit.elements();
    let n = elements.len();

    let struct_conn = model.bonds.struct_conn.as_deref();
    let exhaustive = struct_conn.is_some_and(StructConn::is_exhaustive) && !props.force_compute;
    let dictionary = model.bonds.component_bonds.as_deref();
    let coarse_grained = model.is_coarse_grained();
    let search_radius = if coarse_grained {
        COARSE_SEARCH_RADIUS
    } else {
        props.max_radius
    };

    let mut builder = BondGraphBuilder::new(n);

    // Explicit connectivity between partners under the same operator.
    let mut from_struct_conn = vec![false; n];
    if let Some(sc) = struct_conn {
        for (i, &e) in elements.iter().enumerate() {
            for entry in sc.entries_of_atom(e) {
                let Some((this, other)) = entry.partner_of(e) else {
                    continue;
                };
                if this.symmetry() != other.symmetry() {
                    continue;
                }
                if let Some(j) = elements.index_of(other.element) {
                    if j != i {
                        builder.add(
                            i as u32,
                            j as u32,
                            BondProps::new(entry.order, entry.flags, entry.row_index as i32),
                        );
                        from_struct_conn[i] = true;
                    }
                }
            }
        }
    }

    let component_of = |residue: ResidueIndex| {
        dictionary
            .filter(|_| !h.residues.microheterogeneity[residue as usize])
            .and_then(|d| d.get(h.comp_id(residue)))
    };
    let is_watery = elements
        .iter()
        .all(|&e| model.residue_molecule_type(h.residue_of(e)) == MoleculeType::Water);
    let is_dictionary_based = elements
        .iter()
        .all(|&e| component_of(h.residue_of(e)).is_some());

    if !exhaustive {
        let lookup = unit.lookup3d();
        for (i, &e) in elements.iter().enumerate() {
            if from_struct_conn[i] && !props.force_compute {
                continue;
            }
            let residue = h.residue_of(e);
            let component = component_of(residue);

            let type_a = h.element(e);
            let alt_a = h.alt_id(e);
            let name_a = h.atom_name(e);
            let p = unit.invariant_position(i);
            let found = lookup.find(p.x, p.y, p.z, search_radius);

            for (j, d2) in found.iter() {
                let j = j as usize;
                if j == i || d2 == 0.0 {
                    continue;
                }
                let b = elements[j];
                if !alt_ids_compatible(alt_a, h.alt_id(b)) {
                    continue;
                }
                let type_b = h.element(b);
                if is_hydrogen_pair(type_a, type_b) {
                    continue;
                }
                let residue_b = h.residue_of(b);

                if residue == residue_b {
                    if let Some(component) = component {
                        if let Some(info) = component.get(name_a, h.atom_name(b)) {
                            builder.add(
                                i as u32,
                                j as u32,
                                BondProps::new(info.order, info.flags, info.key),
                            );
                        }
                        continue;
                    }
                } else if from_struct_conn[j]
                    && struct_conn.is_some_and(|sc| sc.has_residue_pair(residue, residue_b))
                {
                    continue;
                }

                let threshold = if coarse_grained {
                    if residue == residue_b {
                        COARSE_INTRA_RESIDUE_MAX_DISTANCE
                    } else {
                        COARSE_INTER_RESIDUE_MAX_DISTANCE
                    }
                } else {
                    pairing_threshold(type_a, type_b)
                };
                if d2 <= threshold * threshold {
                    builder.add(
                        i as u32,
                        j as u32,
                        BondProps::computed(geometric_bond_flags(type_a, type_b)),
                    );
                }
            }
        }
    }

    let graph = builder.build();
    let seq = &h.residues.label_seq_id;
    let is_sequenced = graph.edges().iter().all(|edge| {
        let ra = h.residue_of(elements[edge.a as usize]) as usize;
        let rb = h.residue_of(elements[edge.b as usize]) as usize;
        seq[ra].abs_diff(seq[rb]) <= 1
    });
    let can_remap = is_watery || (is_dictionary_based && is_sequenced);
    IntraUnitBonds::new(graph, BondSource::Geometry, can_remap)
}
