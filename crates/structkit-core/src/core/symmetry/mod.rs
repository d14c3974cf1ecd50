pub mod mapping;
pub mod operator;

pub use mapping::{ConformationMapping, RadiusSource};
pub use operator::{AssemblyInfo, OperatorInfo, SymmetryOperator, dedup_operators};
