//! # Unit
//!
//! A unit is a chain-like group of elements of one [`Model`] placed in world space by a
//! [`SymmetryOperator`]. Units are immutable; every derivation (`get_child`,
//! `apply_operator`, `remap_model`) produces a new unit with a fresh cache of derived data.
//!
//! ## Key Components
//!
//! - [`Unit`] - Cheaply clonable handle (`Arc`) over the unit data
//! - [`UnitKind`] - Atomic, sphere or gaussian elements; selects the model tables a unit reads
//! - [`UnitTraits`] - Construction hints (merged chains, partitions, fast boundaries)
//! - [`polymer`] / [`rings`] - Lazily derived element subsets and ring systems

pub mod polymer;
mod props;
pub mod rings;

use crate::bonds::intra::{self, BondSource, IntraUnitBonds};
use crate::config::IntraBondProps;
use crate::core::chemistry::MoleculeType;
use crate::core::collections::{ElementIndex, SortedArray};
use crate::core::model::Model;
use crate::core::model::coarse::CoarseElements;
use crate::core::model::conformation::Coordinates;
use crate::core::model::hierarchy::{ChainIndex, ResidueIndex};
use crate::core::spatial::{Boundary, Box3D, GridLookup3D, Sphere3D};
use crate::core::symmetry::{ConformationMapping, RadiusSource, SymmetryOperator};
use crate::error::StructureError;
use bitflags::bitflags;
use nalgebra::Point3;
use props::UnitCache;
use rings::UnitRings;
use std::fmt;
use std::sync::Arc;

pub type UnitId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Atomic,
    Spheres,
    Gaussians,
}

impl UnitKind {
    pub fn is_coarse(self) -> bool {
        !matches!(self, UnitKind::Atomic)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnitKind::Atomic => "atomic",
            UnitKind::Spheres => "spheres",
            UnitKind::Gaussians => "gaussians",
        };
        f.write_str(s)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UnitTraits: u8 {
        /// The unit spans several consecutive chains of the model.
        const MULTI_CHAIN = 0x01;
        /// The unit is one of several partitions of a single chain.
        const PARTITIONED = 0x02;
        /// The boundary sphere is derived from the bounding box instead of the centroid.
        const FAST_BOUNDARY = 0x04;
    }
}

/// Construction-time inputs of a unit besides its identity.
#[derive(Debug, Clone, Default)]
pub struct UnitProps {
    /// Bonds carried over from the unit this one was derived from.
    pub bonds: Option<Arc<IntraUnitBonds>>,
    pub bond_props: IntraBondProps,
}

#[derive(Debug)]
struct UnitData {
    id: UnitId,
    invariant_id: u32,
    chain_group_id: i32,
    traits: UnitTraits,
    kind: UnitKind,
    model: Arc<Model>,
    elements: SortedArray,
    conformation: ConformationMapping,
    bond_props: IntraBondProps,
    cache: UnitCache,
}

#[derive(Clone)]
pub struct Unit(Arc<UnitData>);

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("id", &self.0.id)
            .field("invariant_id", &self.0.invariant_id)
            .field("kind", &self.0.kind)
            .field("operator", &self.0.conformation.operator().name)
            .field("elements", &self.0.elements.len())
            .finish()
    }
}

fn kind_tables(model: &Model, kind: UnitKind) -> (Arc<Coordinates>, RadiusSource) {
    match kind {
        UnitKind::Atomic => (
            Arc::clone(&model.atomic_conformation.coordinates),
            RadiusSource::Constant(0.0),
        ),
        UnitKind::Spheres => {
            let spheres = &model.coarse_conformation.spheres;
            (
                Arc::clone(&spheres.coordinates),
                RadiusSource::PerElement(Arc::clone(&spheres.radius)),
            )
        }
        UnitKind::Gaussians => {
            let gaussians = &model.coarse_conformation.gaussians;
            (
                Arc::clone(&gaussians.coordinates),
                RadiusSource::PerElement(Arc::clone(&gaussians.radius)),
            )
        }
    }
}

impl Unit {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: UnitId,
        invariant_id: u32,
        chain_group_id: i32,
        traits: UnitTraits,
        kind: UnitKind,
        model: Arc<Model>,
        operator: Arc<SymmetryOperator>,
        elements: SortedArray,
        props: UnitProps,
    ) -> Unit {
        let (coordinates, radius) = kind_tables(&model, kind);
        let conformation = ConformationMapping::new(operator, coordinates, radius);
        Self::from_parts(
            id,
            invariant_id,
            chain_group_id,
            traits,
            kind,
            model,
            elements,
            conformation,
            props,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn from_parts(
        id: UnitId,
        invariant_id: u32,
        chain_group_id: i32,
        traits: UnitTraits,
        kind: UnitKind,
        model: Arc<Model>,
        elements: SortedArray,
        conformation: ConformationMapping,
        props: UnitProps,
    ) -> Unit {
        let cache = UnitCache::default();
        if let Some(bonds) = props.bonds {
            let _ = cache.bonds.set(bonds);
        }
        Unit(Arc::new(UnitData {
            id,
            invariant_id,
            chain_group_id,
            traits,
            kind,
            model,
            elements,
            conformation,
            bond_props: props.bond_props,
            cache,
        }))
    }

    pub fn ptr_eq(&self, other: &Unit) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn id(&self) -> UnitId {
        self.0.id
    }

    pub fn invariant_id(&self) -> u32 {
        self.0.invariant_id
    }

    pub fn chain_group_id(&self) -> i32 {
        self.0.chain_group_id
    }

    pub fn traits(&self) -> UnitTraits {
        self.0.traits
    }

    pub fn kind(&self) -> UnitKind {
        self.0.kind
    }

    pub fn is_atomic(&self) -> bool {
        self.0.kind == UnitKind::Atomic
    }

    pub fn is_coarse(&self) -> bool {
        self.0.kind.is_coarse()
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.0.model
    }

    pub fn elements(&self) -> &SortedArray {
        &self.0.elements
    }

    pub fn element_count(&self) -> usize {
        self.0.elements.len()
    }

    pub fn conformation(&self) -> &ConformationMapping {
        &self.0.conformation
    }

    pub fn operator(&self) -> &Arc<SymmetryOperator> {
        self.0.conformation.operator()
    }

    pub fn bond_props(&self) -> &IntraBondProps {
        &self.0.bond_props
    }

    /// The unit over `elements`, or this very unit when the set is unchanged.
    ///
    /// `elements` must be a subset of this unit's elements.
    pub fn get_child(&self, elements: SortedArray) -> Unit {
        if elements.are_equal(&self.0.elements) {
            return self.clone();
        }
        debug_assert!(elements.is_subset_of(&self.0.elements));
        Self::from_parts(
            self.0.id,
            self.0.invariant_id,
            self.0.chain_group_id,
            self.0.traits,
            self.0.kind,
            Arc::clone(&self.0.model),
            elements,
            self.0.conformation.clone(),
            UnitProps {
                bonds: None,
                bond_props: self.0.bond_props.clone(),
            },
        )
    }

    /// A copy of the unit with id `id`, additionally transformed by `operator`.
    ///
    /// The new operator applies the existing one first, then `operator`; with
    /// `dont_compose` the unit is placed by `operator` alone.
    pub fn apply_operator(&self, id: UnitId, operator: &SymmetryOperator, dont_compose: bool) -> Unit {
        let current = self.operator();
        let next = if dont_compose {
            operator.clone()
        } else {
            SymmetryOperator::compose(operator, current)
        };
        // Index-pair slices depend on the operator key; everything else is operator-invariant.
        let bonds = self.0.cache.bonds.get().and_then(|b| {
            (b.source() != BondSource::IndexPairSlice || next.key == current.key).then(|| Arc::clone(b))
        });
        Self::from_parts(
            id,
            self.0.invariant_id,
            self.0.chain_group_id,
            self.0.traits,
            self.0.kind,
            Arc::clone(&self.0.model),
            self.0.elements.clone(),
            self.0.conformation.with_operator(Arc::new(next)),
            UnitProps {
                bonds,
                bond_props: self.0.bond_props.clone(),
            },
        )
    }

    /// Rebinds the unit to `model`, typically another frame of the same trajectory.
    ///
    /// Computed bonds survive when they were sliced from an index-pair table the new model
    /// shares, when they are remappable and `dynamic_bonds` is off, or when every element of
    /// the unit keeps its exact position. New `props` replace the unit's bond settings; bonds
    /// computed under different settings are dropped.
    pub fn remap_model(
        &self,
        model: Arc<Model>,
        dynamic_bonds: bool,
        props: Option<&IntraBondProps>,
    ) -> Unit {
        let bond_props = props.unwrap_or(&self.0.bond_props).clone();
        let settings_kept = bond_props == self.0.bond_props;
        let bonds = self.0.cache.bonds.get().filter(|_| settings_kept).and_then(|b| {
            let keep = match b.source() {
                BondSource::IndexPairSlice | BondSource::IndexPairGeometry
                    if self.0.model.shares_index_pairs_with(&model) =>
                {
                    true
                }
                _ if b.can_remap() && !dynamic_bonds => true,
                _ => self.has_same_positions_in(&model),
            };
            keep.then(|| Arc::clone(b))
        });
        let (coordinates, radius) = kind_tables(&model, self.0.kind);
        let conformation = self.0.conformation.with_coordinates(coordinates, radius);
        Self::from_parts(
            self.0.id,
            self.0.invariant_id,
            self.0.chain_group_id,
            self.0.traits,
            self.0.kind,
            model,
            self.0.elements.clone(),
            conformation,
            UnitProps { bonds, bond_props },
        )
    }

    fn has_same_positions_in(&self, model: &Model) -> bool {
        let elements = self.0.elements.as_slice();
        match self.0.kind {
            UnitKind::Atomic => model
                .atomic_conformation
                .is_same_conformation(&self.0.model.atomic_conformation, elements),
            UnitKind::Spheres => model
                .coarse_conformation
                .spheres
                .coordinates
                .same_positions(&self.0.model.coarse_conformation.spheres.coordinates, elements),
            UnitKind::Gaussians => model
                .coarse_conformation
                .gaussians
                .coordinates
                .same_positions(&self.0.model.coarse_conformation.gaussians.coordinates, elements),
        }
    }

    /// Position of the `index`-th element of the unit in world space.
    #[inline]
    pub fn position(&self, index: usize) -> Point3<f64> {
        self.0.conformation.position(self.0.elements[index])
    }

    /// Untransformed position of the `index`-th element of the unit.
    #[inline]
    pub fn invariant_position(&self, index: usize) -> Point3<f64> {
        self.0.conformation.invariant_position(self.0.elements[index])
    }

    /// Boundary of the untransformed element positions.
    pub fn boundary(&self) -> &Boundary {
        self.0.cache.boundary.get_or_init(|| {
            let lookup = self.lookup3d();
            if self.0.traits.contains(UnitTraits::FAST_BOUNDARY) {
                fast_boundary(lookup.boundary())
            } else {
                *lookup.boundary()
            }
        })
    }

    /// Boundary sphere in world space.
    pub fn world_boundary_sphere(&self) -> Sphere3D {
        let sphere = self.boundary().sphere;
        if self.operator().is_identity {
            return sphere;
        }
        sphere.transform(&self.operator().matrix)
    }

    /// Grid over the untransformed element positions, addressed by local index.
    pub fn lookup3d(&self) -> &GridLookup3D {
        self.0.cache.lookup3d.get_or_init(|| {
            let n = self.0.elements.len();
            let positions: Vec<_> = (0..n).map(|i| self.invariant_position(i)).collect();
            match self.0.conformation.radius_source() {
                RadiusSource::Constant(r) if *r == 0.0 => GridLookup3D::new(positions),
                source => {
                    let radii = self.0.elements.iter().map(|&e| source.get(e)).collect();
                    GridLookup3D::with_radii(positions, radii)
                }
            }
        })
    }

    /// Bonds between elements of this unit, computed on first access.
    pub fn bonds(&self) -> &Arc<IntraUnitBonds> {
        self.0
            .cache
            .bonds
            .get_or_init(|| intra::cached_intra_unit_bonds(self))
    }

    /// Whether bonds have already been computed or carried over.
    pub fn has_bonds(&self) -> bool {
        self.0.cache.bonds.get().is_some()
    }

    pub fn rings(&self) -> &UnitRings {
        self.0
            .cache
            .rings
            .get_or_init(|| UnitRings::compute(self.bonds().graph()))
    }

    pub fn polymer_elements(&self) -> &SortedArray {
        self.0
            .cache
            .polymer_elements
            .get_or_init(|| polymer::polymer_elements(self))
    }

    pub fn gap_elements(&self) -> &SortedArray {
        self.0
            .cache
            .gap_elements
            .get_or_init(|| polymer::gap_elements(self))
    }

    pub fn nucleotide_elements(&self) -> &SortedArray {
        self.0
            .cache
            .nucleotide_elements
            .get_or_init(|| polymer::trace_elements_of_type(self, MoleculeType::is_nucleic))
    }

    pub fn protein_elements(&self) -> &SortedArray {
        self.0
            .cache
            .protein_elements
            .get_or_init(|| polymer::trace_elements_of_type(self, |t| t == MoleculeType::Protein))
    }

    pub fn residue_count(&self) -> usize {
        *self
            .0
            .cache
            .residue_count
            .get_or_init(|| polymer::residue_count(self))
    }

    /// Number of polymer residues covered by the unit.
    pub fn polymer_residue_count(&self) -> usize {
        if self.is_atomic() {
            return self.polymer_elements().len();
        }
        let elements = match self.coarse_elements() {
            Ok(e) => e,
            Err(_) => return 0,
        };
        self.0
            .elements
            .iter()
            .map(|&e| elements.residue_span(e).max(0) as usize)
            .sum()
    }

    pub fn residue_index(&self, element: ElementIndex) -> Result<ResidueIndex, StructureError> {
        if !self.is_atomic() {
            return Err(StructureError::AtomicOnly);
        }
        Ok(self.0.model.atomic_hierarchy.residue_of(element))
    }

    pub fn chain_index(&self, element: ElementIndex) -> Result<ChainIndex, StructureError> {
        if !self.is_atomic() {
            return Err(StructureError::AtomicOnly);
        }
        Ok(self.0.model.atomic_hierarchy.chain_of(element))
    }

    /// Hierarchy columns of the coarse table this unit reads.
    pub fn coarse_elements(&self) -> Result<&CoarseElements, StructureError> {
        match self.0.kind {
            UnitKind::Atomic => Err(StructureError::CoarseOnly),
            UnitKind::Spheres => Ok(&self.0.model.coarse_hierarchy.spheres),
            UnitKind::Gaussians => Ok(&self.0.model.coarse_hierarchy.gaussians),
        }
    }

    pub fn is_water(&self) -> bool {
        self.is_atomic()
            && self.0.elements.first().is_some_and(|&e| {
                let h = &self.0.model.atomic_hierarchy;
                self.0.model.is_water_chain(h.chain_of(e))
            })
    }

    pub fn is_ion(&self) -> bool {
        self.is_atomic()
            && !self.0.elements.is_empty()
            && self
                .0
                .elements
                .iter()
                .all(|&e| self.0.model.atom_molecule_type(e) == MoleculeType::Ion)
    }

    pub fn is_polymer(&self) -> bool {
        match self.0.kind {
            UnitKind::Atomic => self
                .0
                .elements
                .first()
                .is_some_and(|&e| self.0.model.atom_molecule_type(e).is_polymer()),
            UnitKind::Spheres | UnitKind::Gaussians => true,
        }
    }
}

fn fast_boundary(exact: &Boundary) -> Boundary {
    let Box3D { min, max } = exact.bbox;
    if min.x > max.x {
        return *exact;
    }
    let center = nalgebra::center(&min, &max);
    Boundary {
        bbox: exact.bbox,
        sphere: Sphere3D::new(center, nalgebra::distance(&center, &max)),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn atomic_unit(id: UnitId, model: &Arc<Model>, elements: Vec<ElementIndex>) -> Unit {
        Unit::create(
            id,
            id,
            -1,
            UnitTraits::empty(),
            UnitKind::Atomic,
            Arc::clone(model),
            Arc::new(SymmetryOperator::default()),
            SortedArray::from_unsorted(elements),
            UnitProps::default(),
        )
    }
}
