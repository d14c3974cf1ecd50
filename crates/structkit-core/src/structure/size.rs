use super::structure::Structure;
use super::symmetry_groups::UnitSymmetryGroup;
use crate::config::SizeThresholds;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StructureSize {
    Small,
    Medium,
    Large,
    Huge,
    Gigantic,
}

impl fmt::Display for StructureSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StructureSize::Small => "small",
            StructureSize::Medium => "medium",
            StructureSize::Large => "large",
            StructureSize::Huge => "huge",
            StructureSize::Gigantic => "gigantic",
        };
        f.write_str(s)
    }
}

fn polymer_symmetry_groups(structure: &Structure) -> Vec<&UnitSymmetryGroup> {
    structure
        .unit_symmetry_groups()
        .iter()
        .filter(|g| !g.units()[0].polymer_elements().is_empty())
        .collect()
}

fn has_high_symmetry(groups: &[&UnitSymmetryGroup], thresholds: &SizeThresholds) -> bool {
    groups
        .iter()
        .map(|g| g.len())
        .max()
        .is_some_and(|n| n > thresholds.high_symmetry_unit_count)
}

/// One polymer symmetry group of more than two short polymer units.
fn is_fiber_like(groups: &[&UnitSymmetryGroup], thresholds: &SizeThresholds) -> bool {
    match groups {
        [group] => {
            group.len() > 2
                && group.units()[0].polymer_elements().len() < thresholds.fiber_residue_count
        }
        _ => false,
    }
}

/// Classifies a structure by polymer residue count, scaled by `residue_count_factor`.
///
/// Very large structures are `Huge` when a polymer symmetry group has more than
/// `high_symmetry_unit_count` copies and `Gigantic` otherwise.
pub fn get_size(
    structure: &Structure,
    thresholds: &SizeThresholds,
    residue_count_factor: f64,
) -> StructureSize {
    let residues = structure.polymer_residue_count() as f64;
    let scaled = |count: usize| count as f64 * residue_count_factor;
    let groups = polymer_symmetry_groups(structure);

    if residues >= scaled(thresholds.large_residue_count) {
        if has_high_symmetry(&groups, thresholds) {
            StructureSize::Huge
        } else {
            StructureSize::Gigantic
        }
    } else if is_fiber_like(&groups, thresholds) {
        StructureSize::Small
    } else if residues < scaled(thresholds.small_residue_count) {
        StructureSize::Small
    } else if residues < scaled(thresholds.medium_residue_count) {
        StructureSize::Medium
    } else {
        StructureSize::Large
    }
}
