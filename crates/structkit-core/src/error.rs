use crate::core::model::error::ModelError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StructureError {
    #[error("Property only available for atomic models")]
    AtomicOnly,

    #[error("Property only available for coarse models")]
    CoarseOnly,

    #[error("Only rotation and translation transforms are supported")]
    NonRigidTransform,

    #[error(
        "The structure is based on multiple models and has neither a master- nor a representative model"
    )]
    AmbiguousModel,

    #[error("Structure has no units")]
    Empty,

    #[error("Unit {0} not found in structure")]
    UnitNotFound(u32),

    #[error("Loci belongs to a different structure")]
    LociStructureMismatch,

    #[error("Model error: {source}")]
    Model {
        #[from]
        source: ModelError,
    },
}
