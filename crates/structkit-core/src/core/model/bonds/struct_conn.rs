use crate::core::chemistry::BondType;
use crate::core::collections::ElementIndex;
use crate::core::model::hierarchy::ResidueIndex;
use crate::core::symmetry::operator::DEFAULT_OPERATOR_NAME;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructConnKind {
    Covalent,
    Disulfide,
    MetalCoordination,
    HydrogenBond,
    Other,
}

impl StructConnKind {
    pub fn flags(self) -> BondType {
        match self {
            Self::Covalent | Self::Other => BondType::COVALENT,
            Self::Disulfide => BondType::COVALENT | BondType::DISULFIDE,
            Self::MetalCoordination => BondType::METALLIC_COORDINATION,
            Self::HydrogenBond => BondType::HYDROGEN_BOND,
        }
    }
}

impl FromStr for StructConnKind {
    type Err = std::convert::Infallible;

    /// Accepts `conn_type_id` values; unrecognized values map to `Other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "covale" | "covale_base" | "covale_phosphate" | "covale_sugar" => Self::Covalent,
            "disulf" => Self::Disulfide,
            "metalc" => Self::MetalCoordination,
            "hydrog" => Self::HydrogenBond,
            _ => Self::Other,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructConnPartner {
    pub element: ElementIndex,
    /// Operator name the partner lives under; `None` means the identity (`1_555`).
    pub symmetry: Option<String>,
}

impl StructConnPartner {
    pub fn new(element: ElementIndex) -> Self {
        Self {
            element,
            symmetry: None,
        }
    }

    pub fn with_symmetry(element: ElementIndex, symmetry: impl Into<String>) -> Self {
        Self {
            element,
            symmetry: Some(symmetry.into()),
        }
    }

    pub fn symmetry(&self) -> &str {
        self.symmetry.as_deref().unwrap_or(DEFAULT_OPERATOR_NAME)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructConnEntry {
    pub row_index: u32,
    pub kind: StructConnKind,
    pub order: u8,
    pub flags: BondType,
    pub partner_a: StructConnPartner,
    pub partner_b: StructConnPartner,
    pub distance: Option<f64>,
}

impl StructConnEntry {
    /// The partner opposite `element`, if `element` takes part in the entry.
    pub fn partner_of(&self, element: ElementIndex) -> Option<(&StructConnPartner, &StructConnPartner)> {
        if self.partner_a.element == element {
            Some((&self.partner_a, &self.partner_b))
        } else if self.partner_b.element == element {
            Some((&self.partner_b, &self.partner_a))
        } else {
            None
        }
    }
}

/// Explicit connectivity records with per-atom and per-residue-pair indices.
#[derive(Debug, Clone, Default)]
pub struct StructConn {
    entries: Vec<StructConnEntry>,
    is_exhaustive: bool,
    by_atom: HashMap<ElementIndex, Vec<usize>>,
    residue_pairs: HashSet<(ResidueIndex, ResidueIndex)>,
}

fn ordered(a: ResidueIndex, b: ResidueIndex) -> (ResidueIndex, ResidueIndex) {
    if a <= b { (a, b) } else { (b, a) }
}

impl StructConn {
    pub fn new(
        entries: Vec<StructConnEntry>,
        is_exhaustive: bool,
        residue_of: impl Fn(ElementIndex) -> ResidueIndex,
    ) -> Self {
        let mut by_atom: HashMap<ElementIndex, Vec<usize>> = HashMap::new();
        let mut residue_pairs = HashSet::new();
        for (i, entry) in entries.iter().enumerate() {
            by_atom.entry(entry.partner_a.element).or_default().push(i);
            if entry.partner_b.element != entry.partner_a.element {
                by_atom.entry(entry.partner_b.element).or_default().push(i);
            }
            residue_pairs.insert(ordered(
                residue_of(entry.partner_a.element),
                residue_of(entry.partner_b.element),
            ));
        }
        Self {
            entries,
            is_exhaustive,
            by_atom,
            residue_pairs,
        }
    }

    /// When set, only these records define bonds and geometric inference is skipped.
    pub fn is_exhaustive(&self) -> bool {
        self.is_exhaustive
    }

    pub fn entries(&self) -> &[StructConnEntry] {
        &self.entries
    }

    pub fn entries_of_atom(&self, atom: ElementIndex) -> impl Iterator<Item = &StructConnEntry> {
        self.by_atom
            .get(&atom)
            .into_iter()
            .flat_map(move |ids| ids.iter().map(move |&i| &self.entries[i]))
    }

    pub fn has_atom(&self, atom: ElementIndex) -> bool {
        self.by_atom.contains_key(&atom)
    }

    pub fn has_residue_pair(&self, a: ResidueIndex, b: ResidueIndex) -> bool {
        self.residue_pairs.contains(&ordered(a, b))
    }

    /// Whether any record links an atom of `a` to an atom of `b`.
    pub fn links_any(&self, a: &[ElementIndex], b: &[ElementIndex]) -> bool {
        a.iter().any(|&atom| {
            self.entries_of_atom(atom).any(|entry| {
                entry
                    .partner_of(atom)
                    .is_some_and(|(_, other)| b.binary_search(&other.element).is_ok())
            })
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(row: u32, a: u32, b: u32) -> StructConnEntry {
        StructConnEntry {
            row_index: row,
            kind: StructConnKind::Covalent,
            order: 1,
            flags: BondType::COVALENT,
            partner_a: StructConnPartner::new(a),
            partner_b: StructConnPartner::new(b),
            distance: None,
        }
    }

    #[test]
    fn entries_are_indexed_by_atom_and_residue_pair() {
        let conn = StructConn::new(vec![entry(0, 1, 10), entry(1, 1, 20)], false, |a| a / 10);
        assert_eq!(conn.entries_of_atom(1).count(), 2);
        assert_eq!(conn.entries_of_atom(10).count(), 1);
        assert_eq!(conn.entries_of_atom(5).count(), 0);
        assert!(conn.has_residue_pair(1, 0));
        assert!(conn.has_residue_pair(0, 2));
        assert!(!conn.has_residue_pair(1, 2));
    }

    #[test]
    fn partner_of_returns_opposite_partner() {
        let e = entry(0, 3, 4);
        assert_eq!(e.partner_of(3).map(|(_, o)| o.element), Some(4));
        assert_eq!(e.partner_of(4).map(|(_, o)| o.element), Some(3));
        assert!(e.partner_of(5).is_none());
    }

    #[test]
    fn links_any_checks_cross_set_records() {
        let conn = StructConn::new(vec![entry(0, 1, 10)], false, |a| a);
        assert!(conn.links_any(&[0, 1], &[9, 10]));
        assert!(!conn.links_any(&[0], &[10]));
    }

    #[test]
    fn kind_parsing_and_flags() {
        assert_eq!("disulf".parse::<StructConnKind>().unwrap(), StructConnKind::Disulfide);
        assert_eq!("METALC".parse::<StructConnKind>().unwrap(), StructConnKind::MetalCoordination);
        assert_eq!("mismat".parse::<StructConnKind>().unwrap(), StructConnKind::Other);
        assert!(StructConnKind::Disulfide.flags().contains(BondType::DISULFIDE));
        assert_eq!(
            StructConnPartner::new(0).symmetry(),
            DEFAULT_OPERATOR_NAME
        );
    }
}
