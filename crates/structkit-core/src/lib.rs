//! # structkit
//!
//! A symmetry-aware molecular structure model with chemical bond inference.
//!
//! ## Architectural Philosophy
//!
//! The library is layered so that each level only depends on the ones below it.
//!
//! - **[`core`]: The Foundation.** Stateless data types: the read-only [`Model`](core::model::Model)
//!   tables and their builder, chemistry tables, sorted element sets, symmetry operators and
//!   spatial primitives.
//!
//! - **[`structure`]: The Structure Model.** Units placed by symmetry operators and the
//!   [`Structure`](structure::Structure) that collects them, with lazily cached aggregates,
//!   spatial lookups, selections and property accessors.
//!
//! - **[`bonds`]: Bond Inference.** Intra-unit and inter-unit bond graphs computed from
//!   connectivity records, index-pair tables, component dictionaries and geometry.
//!
//! Behaviour is tuned through [`config::StructureConfig`], loadable from TOML. Failures are
//! reported through the [`error::StructureError`] family of `thiserror` enums. The library logs
//! through `tracing` and never installs a subscriber.

pub mod bonds;
pub mod config;
pub mod core;
pub mod error;
pub mod structure;
