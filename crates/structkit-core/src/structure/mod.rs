//! # Structure Module
//!
//! Queryable structures built from a [`Model`](crate::core::model::Model): an ordered,
//! deduplicated set of [`Unit`]s with lazily computed aggregates.
//!
//! ## Overview
//!
//! A [`Structure`] is immutable from the outside. Transforming it, remapping it to another
//! trajectory frame or expanding it by symmetry operators always yields a new structure that
//! shares unit and model data with the original. Aggregates such as inter-unit bonds, symmetry
//! groups and the spatial lookup are computed on first access and cached per structure.
//!
//! ## Architecture
//!
//! - **Units** ([`unit`]) - Symmetry-placed element groups and their cached derived data
//! - **Construction** ([`builder`], `Structure::of_model`) - Unit assembly with chain groups and single-element deduplication
//! - **Spatial Queries** ([`lookup`], [`pairs`]) - Unit-level k-d tree and nearby unit pair traversal
//! - **Symmetry** ([`symmetry_groups`]) - Units grouped by invariant element sets
//! - **Classification** ([`size`], [`carbohydrates`]) - Size buckets and saccharide annotation
//! - **Selections** ([`loci`], [`properties`]) - Element selections and per-element property accessors
//! - **Projection** ([`view`]) - Borrowed view onto the coordinate-system ancestry

pub mod builder;
pub mod carbohydrates;
pub mod loci;
pub mod lookup;
mod of_model;
pub mod pairs;
pub mod properties;
pub mod size;
#[allow(clippy::module_inception)]
mod structure;
pub mod symmetry_groups;
pub mod unit;
pub mod view;

pub use builder::StructureBuilder;
pub use loci::{LociElement, StructureElementLoci, StructureLoci};
pub use lookup::{StructureLookup3D, StructureLookup3DResult};
pub use of_model::WATER_PARTITION_ATOM_COUNT;
pub use pairs::{UnitPairProps, each_unit_pair};
pub use properties::StructureElementLocation;
pub use size::{StructureSize, get_size};
pub use structure::{Structure, StructureProps};
pub use symmetry_groups::{UnitSymmetryGroup, UnitSymmetryGroups};
pub use unit::{Unit, UnitId, UnitKind, UnitProps, UnitTraits};
pub use view::StructureView;
