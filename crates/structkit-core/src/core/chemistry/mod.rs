pub mod bond_type;
pub mod elements;
pub mod identifiers;
pub mod molecule_type;

pub use bond_type::{BondOrder, BondType, parse_bond_order};
pub use elements::Element;
pub use molecule_type::MoleculeType;
