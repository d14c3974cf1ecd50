use super::builder::StructureBuilder;
use super::carbohydrates::{self, Carbohydrates};
use super::lookup::StructureLookup3D;
use super::symmetry_groups::{self, UnitSymmetryGroups};
use super::unit::{Unit, UnitId};
use super::view::StructureView;
use crate::bonds::inter::{self, InterUnitBonds};
use crate::config::{BondComputationProps, StructureConfig};
use crate::core::math::{EPSILON, is_identity, is_rotation_and_translation};
use crate::core::model::Model;
use crate::core::spatial::Boundary;
use crate::core::symmetry::{SymmetryOperator, dedup_operators};
use crate::error::StructureError;
use nalgebra::Matrix4;
use once_cell::sync::OnceCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, Default)]
pub struct StructureProps {
    pub label: String,
    /// Coordinate-system ancestor this structure was derived from.
    pub parent: Option<Structure>,
    /// Transform from the root structure's frame into this structure's frame.
    pub coordinate_system: Arc<SymmetryOperator>,
    /// Recompute intra-unit bonds on every model remap instead of carrying them over.
    pub dynamic_bonds: bool,
    pub bonds: BondComputationProps,
    pub master_model: Option<Arc<Model>>,
    pub representative_model: Option<Arc<Model>>,
}

impl StructureProps {
    pub fn from_config(config: &StructureConfig) -> Self {
        Self {
            dynamic_bonds: config.dynamic_bonds,
            bonds: config.bonds.clone(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[derive(Debug, Default)]
struct StructureState {
    element_count: OnceCell<usize>,
    polymer_residue_count: OnceCell<usize>,
    residue_count: OnceCell<usize>,
    polymer_unit_count: OnceCell<usize>,
    hash_code: OnceCell<u32>,
    unit_symmetry_groups: OnceCell<UnitSymmetryGroups>,
    inter_unit_bonds: OnceCell<Arc<InterUnitBonds>>,
    lookup3d: OnceCell<StructureLookup3D>,
    boundary: OnceCell<Boundary>,
    carbohydrates: OnceCell<Carbohydrates>,
    models: OnceCell<Vec<Arc<Model>>>,
    intra_unit_bond_count: OnceCell<usize>,
}

#[derive(Debug)]
struct StructureData {
    units: Vec<Unit>,
    unit_map: HashMap<UnitId, usize>,
    props: StructureProps,
    state: StructureState,
}

/// An ordered set of units with lazily derived aggregates. Cloning is cheap and shares all
/// computed state.
#[derive(Clone)]
pub struct Structure(Arc<StructureData>);

impl fmt::Debug for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Structure")
            .field("label", &self.0.props.label)
            .field("units", &self.0.units.len())
            .field("has_parent", &self.0.props.parent.is_some())
            .finish()
    }
}

impl Structure {
    /// Creates a structure over `units`, sorting by id when needed and dropping repeated ids.
    pub fn create(mut units: Vec<Unit>, props: StructureProps) -> Structure {
        if !units.windows(2).all(|w| w[0].id() < w[1].id()) {
            units.sort_by_key(Unit::id);
            units.dedup_by_key(|u| u.id());
        }
        let unit_map = units
            .iter()
            .enumerate()
            .map(|(i, u)| (u.id(), i))
            .collect();
        Structure(Arc::new(StructureData {
            units,
            unit_map,
            props,
            state: StructureState::default(),
        }))
    }

    pub fn empty() -> Structure {
        Self::create(Vec::new(), StructureProps::default())
    }

    pub fn builder(props: StructureProps) -> StructureBuilder {
        StructureBuilder::new(props)
    }

    pub fn ptr_eq(&self, other: &Structure) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn units(&self) -> &[Unit] {
        &self.0.units
    }

    pub fn unit_count(&self) -> usize {
        self.0.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.units.is_empty()
    }

    pub fn unit_index(&self, id: UnitId) -> Option<usize> {
        self.0.unit_map.get(&id).copied()
    }

    pub fn unit_by_id(&self, id: UnitId) -> Option<&Unit> {
        self.unit_index(id).map(|i| &self.0.units[i])
    }

    pub fn props(&self) -> &StructureProps {
        &self.0.props
    }

    pub fn label(&self) -> &str {
        &self.0.props.label
    }

    pub fn parent(&self) -> Option<&Structure> {
        self.0.props.parent.as_ref()
    }

    /// The outermost ancestor, or this structure when it has no parent.
    pub fn root(&self) -> &Structure {
        match &self.0.props.parent {
            Some(parent) => parent.root(),
            None => self,
        }
    }

    pub fn coordinate_system(&self) -> &Arc<SymmetryOperator> {
        &self.0.props.coordinate_system
    }

    pub fn view(&self) -> StructureView<'_> {
        StructureView::new(self)
    }

    pub fn dynamic_bonds(&self) -> bool {
        self.0.props.dynamic_bonds
    }

    pub fn bond_props(&self) -> &BondComputationProps {
        &self.0.props.bonds
    }

    pub fn element_count(&self) -> usize {
        *self
            .0
            .state
            .element_count
            .get_or_init(|| self.0.units.iter().map(Unit::element_count).sum())
    }

    pub fn polymer_residue_count(&self) -> usize {
        *self
            .0
            .state
            .polymer_residue_count
            .get_or_init(|| self.0.units.iter().map(Unit::polymer_residue_count).sum())
    }

    pub fn residue_count(&self) -> usize {
        *self
            .0
            .state
            .residue_count
            .get_or_init(|| self.0.units.iter().map(Unit::residue_count).sum())
    }

    pub fn polymer_unit_count(&self) -> usize {
        *self.0.state.polymer_unit_count.get_or_init(|| {
            self.0
                .units
                .iter()
                .filter(|u| !u.polymer_elements().is_empty())
                .count()
        })
    }

    /// Hash over unit ids and element sets.
    pub fn hash_code(&self) -> u32 {
        *self.0.state.hash_code.get_or_init(|| {
            let mut hash: u32 = 23;
            for unit in &self.0.units {
                hash = hash.wrapping_mul(31).wrapping_add(unit.id());
                hash = hash.wrapping_mul(31).wrapping_add(unit.elements().hash_code());
            }
            hash = hash.wrapping_mul(31).wrapping_add(self.element_count() as u32);
            hash & 0x7fff_ffff
        })
    }

    /// Same unit ids over the same element sets.
    pub fn are_equivalent(a: &Structure, b: &Structure) -> bool {
        if a.ptr_eq(b) {
            return true;
        }
        if a.hash_code() != b.hash_code() || a.unit_count() != b.unit_count() {
            return false;
        }
        a.units()
            .iter()
            .zip(b.units())
            .all(|(x, y)| x.id() == y.id() && x.elements().are_equal(y.elements()))
    }

    /// Distinct models referenced by the units, in first-use order.
    pub fn models(&self) -> &[Arc<Model>] {
        self.0.state.models.get_or_init(|| {
            let mut seen = HashSet::new();
            self.0
                .units
                .iter()
                .filter(|u| seen.insert(u.model().id()))
                .map(|u| Arc::clone(u.model()))
                .collect()
        })
    }

    /// The model the structure is based on: the master model, the representative model, or
    /// the only model referenced by the units.
    pub fn model(&self) -> Result<&Arc<Model>, StructureError> {
        if let Some(model) = &self.0.props.master_model {
            return Ok(model);
        }
        if let Some(model) = &self.0.props.representative_model {
            return Ok(model);
        }
        match self.models() {
            [] => Err(StructureError::Empty),
            [model] => Ok(model),
            _ => Err(StructureError::AmbiguousModel),
        }
    }

    pub fn lookup3d(&self) -> &StructureLookup3D {
        self.0
            .state
            .lookup3d
            .get_or_init(|| StructureLookup3D::new(&self.0.units))
    }

    /// Boundary of all unit boundary spheres in world space.
    pub fn boundary(&self) -> &Boundary {
        self.0
            .state
            .boundary
            .get_or_init(|| self.lookup3d().boundary())
    }

    pub fn unit_symmetry_groups(&self) -> &UnitSymmetryGroups {
        self.0
            .state
            .unit_symmetry_groups
            .get_or_init(|| symmetry_groups::compute(&self.0.units))
    }

    pub fn inter_unit_bonds(&self) -> &Arc<InterUnitBonds> {
        self.0.state.inter_unit_bonds.get_or_init(|| {
            Arc::new(inter::compute_inter_unit_bonds(
                self,
                &self.0.props.bonds.inter,
            ))
        })
    }

    pub fn carbohydrates(&self) -> &Carbohydrates {
        self.0
            .state
            .carbohydrates
            .get_or_init(|| carbohydrates::compute(self))
    }

    pub fn intra_unit_bond_count(&self) -> usize {
        *self
            .0
            .state
            .intra_unit_bond_count
            .get_or_init(|| self.0.units.iter().map(|u| u.bonds().edge_count()).sum())
    }

    pub fn inter_unit_bond_count(&self) -> usize {
        self.inter_unit_bonds().edge_count()
    }

    /// Computes the intra-unit bonds of every unit ahead of first use.
    pub fn warm_intra_unit_bonds(&self) {
        #[cfg(not(feature = "parallel"))]
        self.0.units.iter().for_each(|u| {
            let _ = u.bonds();
        });

        #[cfg(feature = "parallel")]
        self.0.units.par_iter().for_each(|u| {
            let _ = u.bonds();
        });

        debug!(units = self.unit_count(), "Warmed intra-unit bonds.");
    }

    /// Applies a rigid transform to every unit.
    ///
    /// The identity returns this very structure; matrices with scaling, shear or projection
    /// are rejected.
    pub fn transform(&self, matrix: &Matrix4<f64>) -> Result<Structure, StructureError> {
        if is_identity(matrix, EPSILON) {
            return Ok(self.clone());
        }
        if !is_rotation_and_translation(matrix, EPSILON) {
            return Err(StructureError::NonRigidTransform);
        }
        let operator = SymmetryOperator::from_matrix(*matrix);
        let units = self
            .0
            .units
            .iter()
            .map(|u| u.apply_operator(u.id(), &operator, false))
            .collect();
        let coordinate_system = SymmetryOperator::compose(&operator, self.coordinate_system());
        let parent = self.parent().cloned().unwrap_or_else(|| self.clone());
        Ok(Structure::create(
            units,
            StructureProps {
                parent: Some(parent),
                coordinate_system: Arc::new(coordinate_system),
                ..self.props_without_parent()
            },
        ))
    }

    fn props_without_parent(&self) -> StructureProps {
        StructureProps {
            parent: None,
            ..self.0.props.clone()
        }
    }

    /// Rebinds every unit to `model`, e.g. the next frame of a trajectory.
    pub fn remap_model(&self, model: Arc<Model>) -> Structure {
        let dynamic = self.0.props.dynamic_bonds;
        let units = self
            .0
            .units
            .iter()
            .map(|u| u.remap_model(Arc::clone(&model), dynamic, None))
            .collect();
        let props = StructureProps {
            master_model: None,
            representative_model: None,
            ..self.0.props.clone()
        };
        let remapped = Structure::create(units, props);
        if !dynamic {
            if let Some(bonds) = self.0.state.inter_unit_bonds.get() {
                let _ = remapped.0.state.inter_unit_bonds.set(Arc::clone(bonds));
            }
        }
        debug!(
            units = remapped.unit_count(),
            frame = model.trajectory.index,
            "Remapped structure to model."
        );
        remapped
    }

    /// Expands the structure by a list of operators, one copy of every unit per operator.
    ///
    /// Operators equal within epsilon are applied once.
    pub fn apply_operators(&self, operators: &[SymmetryOperator]) -> Structure {
        let operators = dedup_operators(operators.to_vec());
        let mut builder = StructureBuilder::new(self.props_without_parent());
        for operator in &operators {
            for unit in &self.0.units {
                builder.add_with_operator(unit, operator, false);
            }
        }
        debug!(
            operators = operators.len(),
            units = builder.unit_count(),
            "Applied operators to structure."
        );
        builder.get_structure()
    }
}
