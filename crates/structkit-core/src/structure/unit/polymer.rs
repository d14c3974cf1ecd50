use super::Unit;
use crate::core::chemistry::MoleculeType;
use crate::core::collections::{ElementIndex, SortedArray};

/// Trace elements (CA, C4' or P) of the polymer residues in an atomic unit; every element of
/// a coarse unit.
pub(super) fn polymer_elements(unit: &Unit) -> SortedArray {
    if unit.is_coarse() {
        return unit.elements().clone();
    }
    trace_elements_of_type(unit, MoleculeType::is_polymer)
}

pub(super) fn trace_elements_of_type(unit: &Unit, accept: impl Fn(MoleculeType) -> bool) -> SortedArray {
    if unit.is_coarse() {
        return SortedArray::empty();
    }
    let model = unit.model();
    let h = &model.atomic_hierarchy;
    let elements = unit.elements();
    let mut out = Vec::new();
    for chunk in h.residue_atom_segments.chunks(elements) {
        if !accept(model.residue_molecule_type(chunk.segment)) {
            continue;
        }
        if let Some(trace) = model.trace_element(chunk.segment) {
            if elements[chunk.start..chunk.end].binary_search(&trace).is_ok() {
                out.push(trace);
            }
        }
    }
    SortedArray::from_sorted_unchecked(out)
}

/// Endpoints of polymer-trace breaks: consecutive polymer elements whose residues are not
/// sequence neighbors.
pub(super) fn gap_elements(unit: &Unit) -> SortedArray {
    let polymer = unit.polymer_elements();
    let mut out: Vec<ElementIndex> = Vec::new();
    if unit.is_atomic() {
        let h = &unit.model().atomic_hierarchy;
        for pair in polymer.windows(2) {
            let (ra, rb) = (h.residue_of(pair[0]), h.residue_of(pair[1]));
            let delta = h.residues.label_seq_id[rb as usize] - h.residues.label_seq_id[ra as usize];
            if h.chain_of_residue(ra) != h.chain_of_residue(rb) || delta > 1 {
                out.extend_from_slice(pair);
            }
        }
    } else if let Ok(coarse) = unit.coarse_elements() {
        for pair in polymer.windows(2) {
            let (a, b) = (pair[0] as usize, pair[1] as usize);
            if coarse.asym_id[a] != coarse.asym_id[b]
                || coarse.seq_id_begin[b] > coarse.seq_id_end[a] + 1
            {
                out.extend_from_slice(pair);
            }
        }
    }
    SortedArray::from_unsorted(out)
}

pub(super) fn residue_count(unit: &Unit) -> usize {
    if unit.is_coarse() {
        return unit.element_count();
    }
    let h = &unit.model().atomic_hierarchy;
    h.residue_atom_segments.chunks(unit.elements()).count()
}
