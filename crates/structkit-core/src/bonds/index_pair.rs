use super::common::{INDEX_PAIR_DISTANCE_TOLERANCE, is_hydrogen_pair, pairing_threshold};
use super::graph::{BondGraphBuilder, BondProps};
use super::intra::{BondSource, IntraUnitBonds};
use crate::core::model::bonds::{IndexPairBonds, IndexPairEdge};
use crate::structure::unit::Unit;

fn operator_matches(operator: Option<i32>, key: i32) -> bool {
    operator.is_none_or(|op| op == key)
}

/// An edge joining two images under different operators is an inter-unit bond.
fn is_intra_edge(edge: &IndexPairEdge) -> bool {
    match (edge.operator_self, edge.operator_other) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Whether the unit's bonds can be sliced from the model's index-pair table by operator key.
pub fn can_get_from_index_pair_bonds(unit: &Unit) -> bool {
    if !unit.is_atomic() {
        return false;
    }
    match unit.model().bonds.index_pairs.as_deref() {
        Some(table) => unit.operator().key != -1 || !table.has_operators(),
        None => false,
    }
}

/// Edges of the index-pair table whose endpoints both lie in the unit and whose operators
/// are absent or equal to the unit's operator key.
pub fn get_index_pair_bonds(unit: &Unit) -> Option<IntraUnitBonds> {
    let table = unit.model().bonds.index_pairs.as_deref()?;
    let key = unit.operator().key;
    let elements = unit.elements();
    let mut builder = BondGraphBuilder::new(elements.len());

    for (i, &e) in elements.iter().enumerate() {
        for edge in table.edges_of(e) {
            if edge.other <= e
                || !is_intra_edge(edge)
                || !operator_matches(edge.operator_self, key)
                || !operator_matches(edge.operator_other, key)
            {
                continue;
            }
            if let Some(j) = elements.index_of(edge.other) {
                builder.add(
                    i as u32,
                    j as u32,
                    BondProps::new(edge.order, edge.flags, edge.key),
                );
            }
        }
    }

    Some(IntraUnitBonds::new(
        builder.build(),
        BondSource::IndexPairSlice,
        false,
    ))
}

/// Whether a declared pair at `distance` is kept: close to its declared distance, below the
/// table's maximum, or with neither given, within the covalent `threshold`.
pub(crate) fn accept_by_distance(
    table: &IndexPairBonds,
    edge: &IndexPairEdge,
    distance: f64,
    threshold: f64,
) -> bool {
    if let Some(declared) = edge.distance {
        if (distance - declared).abs() <= INDEX_PAIR_DISTANCE_TOLERANCE {
            return true;
        }
    }
    if let Some(max) = table.max_distance() {
        if distance < max {
            return true;
        }
    }
    edge.distance.is_none() && table.max_distance().is_none() && distance <= threshold
}

/// Re-derives index-pair bonds geometrically when the unit's operator cannot be matched
/// against the table: declared pairs are kept when the actual distance agrees with the
/// declared one, stays below the table's maximum, or (with neither given) below the
/// covalent threshold.
pub fn find_index_pair_bonds(unit: &Unit) -> Option<IntraUnitBonds> {
    let model = unit.model();
    let table = model.bonds.index_pairs.as_deref()?;
    let h = &model.atomic_hierarchy;
    let elements = unit.elements();
    let mut builder = BondGraphBuilder::new(elements.len());

    for (i, &e) in elements.iter().enumerate() {
        let type_a = h.element(e);
        let pa = unit.invariant_position(i);
        for edge in table.edges_of(e) {
            if edge.other <= e || !is_intra_edge(edge) {
                continue;
            }
            let Some(j) = elements.index_of(edge.other) else {
                continue;
            };
            let type_b = h.element(edge.other);
            if is_hydrogen_pair(type_a, type_b) {
                continue;
            }
            let distance = nalgebra::distance(&pa, &unit.invariant_position(j));
            if accept_by_distance(table, edge, distance, pairing_threshold(type_a, type_b)) {
                builder.add(
                    i as u32,
                    j as u32,
                    BondProps::new(edge.order, edge.flags, edge.key),
                );
            }
        }
    }

    Some(IntraUnitBonds::new(
        builder.build(),
        BondSource::IndexPairGeometry,
        false,
    ))
}
