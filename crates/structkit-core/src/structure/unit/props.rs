use super::rings::UnitRings;
use crate::bonds::intra::IntraUnitBonds;
use crate::core::collections::SortedArray;
use crate::core::spatial::{Boundary, GridLookup3D};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Derived data of one unit instance. A derived unit always starts from an empty cache.
#[derive(Debug, Default)]
pub(super) struct UnitCache {
    pub boundary: OnceCell<Boundary>,
    pub lookup3d: OnceCell<GridLookup3D>,
    pub bonds: OnceCell<Arc<IntraUnitBonds>>,
    pub rings: OnceCell<UnitRings>,
    pub polymer_elements: OnceCell<SortedArray>,
    pub gap_elements: OnceCell<SortedArray>,
    pub nucleotide_elements: OnceCell<SortedArray>,
    pub protein_elements: OnceCell<SortedArray>,
    pub residue_count: OnceCell<usize>,
}
