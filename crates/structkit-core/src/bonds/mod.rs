//! # Bonds Module
//!
//! Bond inference for units and unit pairs.
//!
//! Sources are tried in order of authority: explicit `struct_conn` connectivity, the model's
//! index-pair table, the chemical-component bond dictionary, and finally distance heuristics
//! on covalent radii.
//!
//! - [`graph`] - Undirected bond graph over a unit-local index space
//! - [`intra`] - Bonds within a unit, cached per model and element set
//! - [`inter`] - Bonds between units of a structure, including symmetry images
//! - [`index_pair`] - Slicing and validating index-pair tables
//! - [`common`] - Thresholds and acceptance rules shared by all passes

pub mod common;
pub mod graph;
pub mod index_pair;
pub mod inter;
pub mod intra;

pub use graph::{BondGraph, BondProps, Edge};
pub use inter::{InterUnitBonds, InterUnitEdge, UnitPairBonds, compute_inter_unit_bonds};
pub use intra::{BondSource, IntraUnitBonds, compute_intra_unit_bonds};
