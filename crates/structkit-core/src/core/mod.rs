//! # Core Module
//!
//! Foundations of the structure model: stateless data types, static chemistry tables and
//! geometric primitives that the [`structure`](crate::structure) and [`bonds`](crate::bonds)
//! layers are built on.
//!
//! ## Architecture
//!
//! - **Collections** ([`collections`]) - Sorted element sets, segmentations and the bounded element-set cache
//! - **Chemistry** ([`chemistry`]) - Elements, covalent radii, residue classification and bond flags
//! - **Geometry** ([`math`], [`spatial`]) - Affine helpers, boundaries and the grid neighbor lookup
//! - **Symmetry** ([`symmetry`]) - Composable operators and lazy conformation mappings
//! - **Input** ([`model`]) - The read-only model tables, bond tables and the model builder

pub mod chemistry;
pub mod collections;
pub mod math;
pub mod model;
pub mod spatial;
pub mod symmetry;
