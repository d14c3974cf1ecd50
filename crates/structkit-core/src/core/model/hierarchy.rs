use crate::core::chemistry::Element;
use crate::core::collections::{ElementIndex, Segmentation};
use std::ops::Range;

pub type ResidueIndex = u32;
pub type ChainIndex = u32;

#[derive(Debug, Clone, Default)]
pub struct AtomTable {
    pub type_symbol: Vec<Element>,
    pub label_atom_id: Vec<String>,
    pub label_alt_id: Vec<String>,
    pub source_index: Vec<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ResidueTable {
    pub label_comp_id: Vec<String>,
    pub label_seq_id: Vec<i32>,
    pub auth_seq_id: Vec<i32>,
    pub ins_code: Vec<String>,
    /// Set when another residue shares this sequence position (sequence micro-heterogeneity).
    pub microheterogeneity: Vec<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ChainTable {
    pub label_asym_id: Vec<String>,
    pub auth_asym_id: Vec<String>,
    pub label_entity_id: Vec<String>,
}

/// Atom → residue → chain tables with contiguous segmentations.
#[derive(Debug, Clone, Default)]
pub struct AtomicHierarchy {
    pub atoms: AtomTable,
    pub residues: ResidueTable,
    pub chains: ChainTable,
    /// Atoms partitioned by residue.
    pub residue_atom_segments: Segmentation,
    /// Atoms partitioned by chain.
    pub chain_atom_segments: Segmentation,
    /// Residues partitioned by chain.
    pub chain_residue_segments: Segmentation,
}

impl AtomicHierarchy {
    pub fn atom_count(&self) -> usize {
        self.atoms.type_symbol.len()
    }

    pub fn residue_count(&self) -> usize {
        self.residues.label_comp_id.len()
    }

    pub fn chain_count(&self) -> usize {
        self.chains.label_asym_id.len()
    }

    #[inline]
    pub fn residue_of(&self, atom: ElementIndex) -> ResidueIndex {
        self.residue_atom_segments.segment_of(atom)
    }

    #[inline]
    pub fn chain_of(&self, atom: ElementIndex) -> ChainIndex {
        self.chain_atom_segments.segment_of(atom)
    }

    pub fn chain_of_residue(&self, residue: ResidueIndex) -> ChainIndex {
        self.chain_residue_segments.segment_of(residue)
    }

    pub fn residue_atoms(&self, residue: ResidueIndex) -> Range<ElementIndex> {
        self.residue_atom_segments.range(residue)
    }

    pub fn chain_atoms(&self, chain: ChainIndex) -> Range<ElementIndex> {
        self.chain_atom_segments.range(chain)
    }

    pub fn element(&self, atom: ElementIndex) -> Element {
        self.atoms.type_symbol[atom as usize]
    }

    pub fn atom_name(&self, atom: ElementIndex) -> &str {
        &self.atoms.label_atom_id[atom as usize]
    }

    pub fn alt_id(&self, atom: ElementIndex) -> &str {
        &self.atoms.label_alt_id[atom as usize]
    }

    pub fn comp_id(&self, residue: ResidueIndex) -> &str {
        &self.residues.label_comp_id[residue as usize]
    }

    pub fn atom_comp_id(&self, atom: ElementIndex) -> &str {
        self.comp_id(self.residue_of(atom))
    }

    /// Finds an atom of `residue` by name, preferring one whose alt id is compatible with `alt_id`.
    pub fn find_atom_in_residue(
        &self,
        residue: ResidueIndex,
        name: &str,
        alt_id: &str,
    ) -> Option<ElementIndex> {
        let mut fallback = None;
        for atom in self.residue_atoms(residue) {
            if self.atom_name(atom) != name {
                continue;
            }
            let other = self.alt_id(atom);
            if other == alt_id || other.is_empty() || alt_id.is_empty() {
                return Some(atom);
            }
            fallback.get_or_insert(atom);
        }
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_residue_hierarchy() -> AtomicHierarchy {
        AtomicHierarchy {
            atoms: AtomTable {
                type_symbol: vec![Element::N, Element::C, Element::O, Element::O],
                label_atom_id: vec!["N".into(), "CA".into(), "O".into(), "O".into()],
                label_alt_id: vec!["".into(), "".into(), "A".into(), "B".into()],
                source_index: vec![0, 1, 2, 3],
            },
            residues: ResidueTable {
                label_comp_id: vec!["GLY".into(), "HOH".into()],
                label_seq_id: vec![1, 0],
                auth_seq_id: vec![1, 101],
                ins_code: vec!["".into(), "".into()],
                microheterogeneity: vec![false, false],
            },
            chains: ChainTable {
                label_asym_id: vec!["A".into(), "B".into()],
                auth_asym_id: vec!["A".into(), "A".into()],
                label_entity_id: vec!["1".into(), "2".into()],
            },
            residue_atom_segments: Segmentation::from_sizes([2, 2]),
            chain_atom_segments: Segmentation::from_sizes([2, 2]),
            chain_residue_segments: Segmentation::from_sizes([1, 1]),
        }
    }

    #[test]
    fn navigation_between_levels() {
        let h = two_residue_hierarchy();
        assert_eq!(h.atom_count(), 4);
        assert_eq!(h.residue_of(3), 1);
        assert_eq!(h.chain_of(1), 0);
        assert_eq!(h.chain_of_residue(1), 1);
        assert_eq!(h.atom_comp_id(2), "HOH");
    }

    #[test]
    fn find_atom_in_residue_prefers_matching_alt_id() {
        let h = two_residue_hierarchy();
        assert_eq!(h.find_atom_in_residue(1, "O", "B"), Some(3));
        assert_eq!(h.find_atom_in_residue(1, "O", ""), Some(2));
        assert_eq!(h.find_atom_in_residue(1, "O", "C"), Some(2));
        assert_eq!(h.find_atom_in_residue(0, "CB", ""), None);
    }
}
