pub mod boundary;
pub mod grid;

pub use boundary::{Boundary, Box3D, Sphere3D};
pub use grid::{GridLookup3D, Lookup3DResult};
