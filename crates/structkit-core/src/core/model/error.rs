use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ModelError {
    #[error("Entity '{0}' is not registered")]
    UnknownEntity(String),

    #[error("Chain index {0} does not exist")]
    UnknownChain(u32),

    #[error("Residue index {0} does not exist")]
    UnknownResidue(u32),

    #[error("Out-of-order append: {0} must belong to the most recently added parent")]
    OutOfOrder(&'static str),

    #[error("Chain '{0}' has no atoms")]
    EmptyChain(String),

    #[error("Residue {0} has no atoms")]
    EmptyResidue(u32),

    #[error("Bond endpoint {index} is out of range for {count} elements")]
    BondOutOfRange { index: u32, count: usize },

    #[error("Bond connects element {0} to itself")]
    SelfBond(u32),

    #[error("Source index {0} does not map to any atom")]
    UnknownSourceIndex(u32),

    #[error("Source index {0} is used by more than one atom")]
    DuplicateSourceIndex(u32),

    #[error("Frame has {actual} coordinates but the model has {expected} atoms")]
    FrameSizeMismatch { expected: usize, actual: usize },
}
