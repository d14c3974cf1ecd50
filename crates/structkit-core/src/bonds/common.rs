use crate::core::chemistry::{BondType, Element};

/// Slack added to the covalent-radius sum when accepting a distance-inferred bond, in Å.
pub const PAIRING_TOLERANCE: f64 = 0.4;

/// Accepted deviation from a declared index-pair bond distance, in Å.
pub const INDEX_PAIR_DISTANCE_TOLERANCE: f64 = 0.3;

/// Largest trace-to-trace distance bonded within one residue of a coarse-grained model, in Å.
pub const COARSE_INTRA_RESIDUE_MAX_DISTANCE: f64 = 5.5;

/// Largest trace-to-trace distance bonded between residues of a coarse-grained model, in Å.
pub const COARSE_INTER_RESIDUE_MAX_DISTANCE: f64 = 3.9;

/// Neighbor search radius for coarse-grained models, in Å.
pub const COARSE_SEARCH_RADIUS: f64 = 5.5;

/// Largest distance at which `a` and `b` are considered covalently bonded.
#[inline]
pub fn pairing_threshold(a: Element, b: Element) -> f64 {
    a.covalent_radius() + b.covalent_radius() + PAIRING_TOLERANCE
}

#[inline]
pub fn is_hydrogen_pair(a: Element, b: Element) -> bool {
    a.is_hydrogen() && b.is_hydrogen()
}

/// Flags of a distance-inferred bond: metal coordination when exactly one side is a metal and
/// neither is a hydrogen.
pub fn geometric_bond_flags(a: Element, b: Element) -> BondType {
    let metallic = a.is_metal() != b.is_metal() && !a.is_hydrogen() && !b.is_hydrogen();
    let kind = if metallic {
        BondType::METALLIC_COORDINATION
    } else {
        BondType::COVALENT
    };
    kind | BondType::COMPUTED
}

/// Alternate locations bond unless both are set and differ.
#[inline]
pub fn alt_ids_compatible(a: &str, b: &str) -> bool {
    a.is_empty() || b.is_empty() || a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_sums_radii_with_tolerance() {
        let t = pairing_threshold(Element::C, Element::C);
        assert!((t - (0.76 + 0.76 + 0.4)).abs() < 1e-9);
        let t = pairing_threshold(Element::S, Element::O);
        assert!((t - 2.11).abs() < 1e-9);
    }

    #[test]
    fn metal_flag_requires_exactly_one_metal() {
        let zn = Element::from_symbol("ZN");
        let fe = Element::from_symbol("FE");
        assert!(geometric_bond_flags(zn, Element::N).contains(BondType::METALLIC_COORDINATION));
        assert!(!geometric_bond_flags(zn, Element::H).contains(BondType::METALLIC_COORDINATION));
        assert!(geometric_bond_flags(zn, fe).contains(BondType::COVALENT));
        assert!(geometric_bond_flags(Element::C, Element::N).contains(BondType::COMPUTED));
    }

    #[test]
    fn alt_ids_bond_when_empty_or_equal() {
        assert!(alt_ids_compatible("", "B"));
        assert!(alt_ids_compatible("A", "A"));
        assert!(!alt_ids_compatible("A", "B"));
    }

    #[test]
    fn hydrogen_pair_detection() {
        assert!(is_hydrogen_pair(Element::H, Element::H));
        assert!(!is_hydrogen_pair(Element::H, Element::C));
    }
}
